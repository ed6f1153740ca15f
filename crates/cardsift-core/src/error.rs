use std::fmt;

/// Machine-readable failure categories for log scraping and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    TransientNetwork,
    RequestTimeout,
    RemoteStatus,
    MalformedPayload,
    BoardContractMismatch,
    SettingsDecode,
    InitializationFailed,
}

impl FailureCode {
    /// Stable code identifier (`F###`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TransientNetwork => "F101",
            Self::RequestTimeout => "F102",
            Self::RemoteStatus => "F103",
            Self::MalformedPayload => "F201",
            Self::BoardContractMismatch => "F301",
            Self::SettingsDecode => "F401",
            Self::InitializationFailed => "F901",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::TransientNetwork => "Transient network failure",
            Self::RequestTimeout => "Remote request timed out",
            Self::RemoteStatus => "Remote returned a non-success status",
            Self::MalformedPayload => "Malformed remote payload",
            Self::BoardContractMismatch => "Expected board element or attribute missing",
            Self::SettingsDecode => "Persisted value failed to decode",
            Self::InitializationFailed => "Overlay initialization failed",
        }
    }

    /// Whether the overlay keeps operating (possibly degraded) past this failure.
    ///
    /// Everything short of an initialization failure is recoverable: the board
    /// itself must stay fully usable even when the overlay is not.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        !matches!(self, Self::InitializationFailed)
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::FailureCode;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            FailureCode::TransientNetwork,
            FailureCode::RequestTimeout,
            FailureCode::RemoteStatus,
            FailureCode::MalformedPayload,
            FailureCode::BoardContractMismatch,
            FailureCode::SettingsDecode,
            FailureCode::InitializationFailed,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = FailureCode::MalformedPayload.code();
        assert_eq!(code.len(), 4);
        assert!(code.starts_with('F'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn only_initialization_is_unrecoverable() {
        assert!(FailureCode::TransientNetwork.is_recoverable());
        assert!(FailureCode::BoardContractMismatch.is_recoverable());
        assert!(!FailureCode::InitializationFailed.is_recoverable());
    }
}
