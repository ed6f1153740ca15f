//! Read-only model of what the board renders.

pub mod card;

pub use card::{BoardMode, CardSnapshot, extract_version, parse_assignee_alt};

#[cfg(test)]
mod tests {
    // Adapters import the parsing helpers from `model::`, same as the types.
    use super::{extract_version, parse_assignee_alt};

    #[test]
    fn parsing_helpers_are_reachable_at_module_level() {
        assert_eq!(parse_assignee_alt("Assignee: Ayşe"), Some("Ayşe"));
        assert_eq!(extract_version("v4.8.6"), Some("4.8.6".to_string()));
    }
}
