#![forbid(unsafe_code)]

use anyhow::Result;
use cardsift_core::model::BoardMode;
use cardsift_sim::net::{issue_page, sprint_page};
use cardsift_sim::{ScriptedTransport, Session, SimBoard, SimCard};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run one scripted overlay session against the simulated host.
#[derive(Parser, Debug)]
#[command(author, version, about = "cardsift deterministic host simulation")]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cardsift=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut board = SimBoard::new(BoardMode::Scrum, 3);
    board.add_card(SimCard::new("PROJ-1", "Ödeme akışı").assignee("Ayşe").badge("5"));
    board.add_card(SimCard::new("PROJ-2", "Login redirect").assignee("Mehmet").badge("3"));
    board.add_card(SimCard::new("PROJ-3", "Backlog grooming").badge("  "));

    let transport = ScriptedTransport::new()
        .route(
            "board/7/sprint?startAt=0&maxResults=50",
            sprint_page(&[(41, "closed"), (42, "active")], true, 0),
        )
        .route(
            "sprint/42/issue?maxResults=100&fields=customfield_10100",
            issue_page("customfield_10100", &[("PROJ-2", Some("Ayşe"))]),
        );

    let mut session = Session::new(board, transport);
    session.boot();

    let now = session.now();
    session.controller().set_assignee(Some("Ayşe".to_string()), now);
    session.advance(1);

    let phase = session.controller().phase();
    let visible = session.board().visible_keys();
    let highlighted = session.board().highlighted().unwrap_or("-").to_string();
    println!(
        "session complete: phase={phase} visible={} highlighted={highlighted}",
        visible.join(",")
    );

    Ok(())
}
