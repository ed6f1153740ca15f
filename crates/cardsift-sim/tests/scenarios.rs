//! End-to-end scenarios for the overlay against the simulated host.

use cardsift_core::model::BoardMode;
use cardsift_core::settings::{MemoryStore, SettingsStore, keys};
use cardsift_engine::controller::Phase;
use cardsift_remote::sprint::ReviewerAssignments;
use cardsift_remote::transport::FetchError;
use cardsift_sim::net::{issue_page, sprint_page};
use cardsift_sim::{ScriptedTransport, Session, SimBoard, SimCard};
use std::collections::BTreeSet;

const SPRINTS: &str = "board/7/sprint?startAt=0&maxResults=50";
const ISSUES: &str = "sprint/42/issue?maxResults=100&fields=customfield_10100";

fn online_transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .route(SPRINTS, sprint_page(&[(41, "closed"), (42, "active")], true, 0))
        .route(
            ISSUES,
            issue_page("customfield_10100", &[("PROJ-2", Some("Ayşe"))]),
        )
}

fn scrum_board() -> SimBoard {
    let mut board = SimBoard::new(BoardMode::Scrum, 3);
    board.add_card(SimCard::new("PROJ-1", "Ödeme akışı").assignee("Ayşe").badge("5"));
    board.add_card(SimCard::new("PROJ-2", "Login redirect").assignee("Mehmet").badge("3"));
    board.add_card(SimCard::new("PROJ-3", "Backlog grooming").badge("  "));
    board
}

#[test]
fn assignee_filter_uses_avatar_and_reviewer() {
    cardsift_sim::init_test_logging();
    let mut session = Session::new(scrum_board(), online_transport());
    session.boot();
    assert_eq!(session.controller().phase(), Phase::Ready);

    let now = session.now();
    session.controller().set_assignee(Some("Ayşe".to_string()), now);
    session.advance(1);

    // PROJ-1 via avatar, PROJ-2 via reviewer field; PROJ-3 matches neither.
    assert_eq!(
        session.board().visible_keys(),
        vec!["PROJ-1".to_string(), "PROJ-2".to_string()]
    );
    assert_eq!(session.board().highlighted(), Some("Ayşe"));
}

#[test]
fn assignee_without_reviewer_entry_is_hidden() {
    let mut session = Session::new(scrum_board(), online_transport());
    session.boot();

    let now = session.now();
    session.controller().set_assignee(Some("Mehmet".to_string()), now);
    session.advance(1);

    // Mehmet only matches his own avatar; no reviewer entry extends it.
    assert_eq!(session.board().visible_keys(), vec!["PROJ-2".to_string()]);
}

#[test]
fn clearing_assignee_restores_everything() {
    let mut session = Session::new(scrum_board(), online_transport());
    session.boot();

    let now = session.now();
    session.controller().set_assignee(Some("Ayşe".to_string()), now);
    session.advance(1);
    let now = session.now();
    session.controller().set_assignee(None, now);
    session.advance(1);

    assert_eq!(session.board().visible_keys().len(), 3);
    assert_eq!(session.board().highlighted(), None);
}

#[test]
fn unestimated_only_on_scrum_checks_badge_text() {
    let mut session = Session::new(scrum_board(), online_transport());
    session.boot();

    let now = session.now();
    session.controller().set_unestimated_only(true, now);
    session.advance(1);

    // Blank badge counts as unestimated; "5" and "3" are estimates.
    assert_eq!(session.board().visible_keys(), vec!["PROJ-3".to_string()]);
}

#[test]
fn unestimated_only_on_kanban_checks_badge_presence() {
    let mut board = SimBoard::new(BoardMode::Kanban, 2);
    board.add_card(SimCard::new("K-1", "with badge").badge("-"));
    board.add_card(SimCard::new("K-2", "no badge"));

    let mut session = Session::new(board, ScriptedTransport::new());
    session.boot();

    let now = session.now();
    session.controller().set_unestimated_only(true, now);
    session.advance(1);

    // On kanban any badge at all means estimated, even point-less text.
    assert_eq!(session.board().visible_keys(), vec!["K-2".to_string()]);
}

#[test]
fn version_filter_hides_unversioned_cards() {
    let mut board = SimBoard::new(BoardMode::Scrum, 2);
    board.add_card(SimCard::new("V-1", "a").version("4.8.6"));
    board.add_card(SimCard::new("V-2", "b").version("4.9.0"));
    board.add_card(SimCard::new("V-3", "c"));

    let mut session = Session::new(board, ScriptedTransport::new());
    session.boot();

    let now = session.now();
    session
        .controller()
        .set_selected_versions(BTreeSet::from(["4.8.6".to_string()]), now);
    session.advance(1);

    assert_eq!(session.board().visible_keys(), vec!["V-1".to_string()]);
}

#[test]
fn search_matches_key_and_summary_case_insensitively() {
    let mut session = Session::new(scrum_board(), online_transport());
    session.boot();

    let now = session.now();
    session.controller().set_search_query("ÖDEME".to_lowercase(), now);
    session.advance(1);
    assert_eq!(session.board().visible_keys(), vec!["PROJ-1".to_string()]);

    let now = session.now();
    session.controller().set_search_query("proj-2", now);
    session.advance(1);
    assert_eq!(session.board().visible_keys(), vec!["PROJ-2".to_string()]);
}

#[test]
fn all_dimensions_compose_by_and() {
    let mut board = scrum_board();
    board.add_card(
        SimCard::new("PROJ-4", "Ödeme raporu")
            .assignee("Ayşe")
            .badge("   ")
            .version("4.8.6"),
    );

    let mut session = Session::new(board, online_transport());
    session.boot();

    let now = session.now();
    session.controller().set_assignee(Some("Ayşe".to_string()), now);
    session.controller().set_unestimated_only(true, now);
    session
        .controller()
        .set_selected_versions(BTreeSet::from(["4.8.6".to_string()]), now);
    session.controller().set_search_query("ödeme", now);
    session.advance(1);

    assert_eq!(session.board().visible_keys(), vec!["PROJ-4".to_string()]);

    // Relaxing one dimension can only grow the visible set.
    let now = session.now();
    session.controller().set_unestimated_only(false, now);
    session.advance(1);
    assert!(
        session
            .board()
            .visible_keys()
            .contains(&"PROJ-4".to_string())
    );
}

#[test]
fn timeout_without_cache_degrades_to_snapshot() {
    // The sprint listing times out and nothing was ever cached; the overlay
    // must still boot, with reviewers from the last persisted snapshot.
    let mut store = MemoryStore::new();
    let snapshot = ReviewerAssignments {
        entries: [("PROJ-2".to_string(), "Ayşe".to_string())].into(),
        updated_at: "2026-08-01 09:00:00 UTC".to_string(),
    };
    store.set(
        keys::REVIEWER_SNAPSHOT,
        &serde_json::to_string(&snapshot).expect("snapshot serializes"),
    );

    let transport =
        ScriptedTransport::new().fail(SPRINTS, FetchError::Timeout { budget_secs: 30 });
    let mut session = Session::with_store(scrum_board(), transport, store);
    session.boot();

    assert_eq!(session.controller().phase(), Phase::Ready);
    // Sprint resolution failed, so no issue fetch happened; the assignee
    // predicate still extends through the last persisted snapshot.
    assert_eq!(
        session.controller().reviewers().reviewer_for("PROJ-2"),
        Some("Ayşe")
    );

    let now = session.now();
    session.controller().set_assignee(Some("Ayşe".to_string()), now);
    session.advance(1);
    assert_eq!(
        session.board().visible_keys(),
        vec!["PROJ-1".to_string(), "PROJ-2".to_string()]
    );
}

#[test]
fn issue_fetch_failure_falls_back_to_persisted_snapshot() {
    let mut store = MemoryStore::new();
    let snapshot = ReviewerAssignments {
        entries: [("PROJ-2".to_string(), "Ayşe".to_string())].into(),
        updated_at: "2026-08-01 09:00:00 UTC".to_string(),
    };
    store.set(
        keys::REVIEWER_SNAPSHOT,
        &serde_json::to_string(&snapshot).expect("snapshot serializes"),
    );

    // Sprint resolution succeeds but the issue listing is down.
    let transport = ScriptedTransport::new()
        .route(SPRINTS, sprint_page(&[(42, "active")], true, 0))
        .fail(ISSUES, FetchError::Connectivity("reset by peer".to_string()));
    let mut session = Session::with_store(scrum_board(), transport, store);
    session.boot();

    assert_eq!(session.controller().phase(), Phase::Ready);
    assert_eq!(
        session.controller().reviewers().reviewer_for("PROJ-2"),
        Some("Ayşe")
    );
}
