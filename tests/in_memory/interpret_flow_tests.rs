//! End-to-end interpretation runs, from sentence to card.

use std::sync::Arc;

use kanban_intake::intake::{
    adapters::memory::{InMemoryBoard, InMemoryTaskStore},
    services::{CreationOutcome, IntakeSettings, InterpretOptions, InterpretService},
};
use mockable::Clock;
use rstest::rstest;

use super::helpers::{FixedClock, board, clock, settings};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sentence_becomes_a_card_in_the_fallback_list(
    board: InMemoryBoard,
    clock: FixedClock,
    settings: IntakeSettings,
) -> eyre::Result<()> {
    let store = InMemoryTaskStore::new();
    let interpret = InterpretService::new(
        Arc::new(board.clone()),
        Arc::new(store.clone()),
        Arc::new(clock),
        settings,
    );
    let text = "Please add a task to my planka board that i should test ai input until end of next week";

    let outcome = interpret
        .interpret(text, InterpretOptions::create())
        .await?;

    let proposal = &outcome.interpretation.proposal;
    assert_eq!(proposal.title(), "i should test ai input until end of next week");
    assert_eq!(proposal.list_name(), Some("open llm tasks"));
    assert_eq!(proposal.labels(), ["testing", "llm"]);
    let due = proposal
        .due_date()
        .ok_or_else(|| eyre::eyre!("sentence names a deadline"))?;
    let parsed = chrono::DateTime::parse_from_rfc3339(due)?;
    let local = parsed.with_timezone(&chrono::Local);
    assert_eq!(local.date_naive().to_string(), "2025-11-02");
    assert!(parsed > clock.utc());

    let Some(CreationOutcome::Created(card)) = &outcome.creation else {
        eyre::bail!("expected a created card, got {:?}", outcome.creation);
    };
    let created_labels: Vec<&str> = card
        .labels_created
        .iter()
        .map(|label| label.name.as_str())
        .collect();
    assert_eq!(created_labels, vec!["testing", "llm"]);
    assert_eq!(store.tasks()?.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inference_only_reads_the_board(
    board: InMemoryBoard,
    clock: FixedClock,
    settings: IntakeSettings,
) -> eyre::Result<()> {
    let interpret = InterpretService::new(
        Arc::new(board.clone()),
        Arc::new(InMemoryTaskStore::new()),
        Arc::new(clock),
        settings,
    );

    let outcome = interpret
        .interpret(
            "Kindly update the README in the backlog by 03/11/2025",
            InterpretOptions::infer(),
        )
        .await?;

    let rendered = outcome.to_json();
    assert_eq!(rendered["simulated"], true);
    assert_eq!(rendered["payload"]["listName"], "Backlog");
    assert_eq!(rendered["payload"]["labels"], serde_json::json!(["docs"]));
    assert_eq!(
        outcome.interpretation.date_phrase.as_deref(),
        Some("by 03/11/2025")
    );
    assert!(board.calls()?.is_empty());
    Ok(())
}
