//! End-to-end creation runs against the in-memory board.

use std::sync::Arc;

use kanban_intake::intake::{
    adapters::memory::{BoardCall, BoardOperation, InMemoryBoard, InMemoryTaskStore},
    domain::{MatchedBy, TaskProposal},
    services::{
        CreateOptions, CreationOutcome, IntakeSettings, TaskCreationError, TaskCreationService,
    },
};
use rstest::rstest;
use serde_json::json;

use super::helpers::{FixedClock, board, clock, settings};

type TestService = TaskCreationService<InMemoryBoard, InMemoryTaskStore, FixedClock>;

fn service(
    board: &InMemoryBoard,
    store: &InMemoryTaskStore,
    clock: FixedClock,
    settings: IntakeSettings,
) -> TestService {
    TaskCreationService::new(
        Arc::new(board.clone()),
        Arc::new(store.clone()),
        Arc::new(clock),
        settings,
    )
}

/// Counts recorded board calls of one kind.
///
/// # Errors
///
/// Returns an error if the board state cannot be read.
fn count_calls(board: &InMemoryBoard, operation: BoardOperation) -> eyre::Result<usize> {
    Ok(board
        .calls()?
        .iter()
        .filter(|call| call.operation() == operation)
        .count())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn json_proposal_is_created_once_and_then_recognised(
    board: InMemoryBoard,
    clock: FixedClock,
    settings: IntakeSettings,
) -> eyre::Result<()> {
    let proposal = TaskProposal::from_json(&json!({
        "title": "Publish the changelog",
        "listName": "Backlog",
        "labels": ["docs", "release"],
        "subtasks": ["collect entries", "proofread"],
        "dueDate": "31.10.2025",
    }))?;
    let key = settings.idempotency_key(proposal.title(), proposal.list_name());
    let store = InMemoryTaskStore::new();
    let intake = service(&board, &store, clock, settings);
    let options = CreateOptions::new().with_idempotency_key(key);

    let first = intake.create(&proposal, &options).await?;
    let second = intake.create(&proposal, &options).await?;

    let CreationOutcome::Created(card) = &first else {
        eyre::bail!("expected the first run to create, got {first:?}");
    };
    eyre::ensure!(
        matches!(
            &second,
            CreationOutcome::Existed { card_id, local_task_id, matched_by: MatchedBy::Key }
                if card_id == &card.card_id && local_task_id.as_ref() == Some(&card.task_id)
        ),
        "second run should find the first card, got {second:?}"
    );
    assert_eq!(count_calls(&board, BoardOperation::CreateCard)?, 1);
    assert_eq!(count_calls(&board, BoardOperation::CreateLabel)?, 1);
    assert_eq!(count_calls(&board, BoardOperation::CreateTaskList)?, 1);
    assert_eq!(count_calls(&board, BoardOperation::CreateTaskItem)?, 2);

    let tasks = store.tasks()?;
    assert_eq!(tasks.len(), 1);
    let subtasks: Vec<&str> = tasks
        .first()
        .map(|task| task.subtasks().iter().map(|sub| sub.title.as_str()).collect())
        .unwrap_or_default();
    assert_eq!(subtasks, vec!["collect entries", "proofread"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn iso_due_dates_are_read_in_local_time(
    board: InMemoryBoard,
    clock: FixedClock,
    settings: IntakeSettings,
) -> eyre::Result<()> {
    let proposal = TaskProposal::new("Publish the changelog").with_due_date("2025-10-31");
    let store = InMemoryTaskStore::new();

    service(&board, &store, clock, settings)
        .create(&proposal, &CreateOptions::new())
        .await?;

    let calls = board.calls()?;
    let Some(BoardCall::CreateCard { payload, list_id }) = calls.first() else {
        eyre::bail!("expected a card call first, got {calls:?}");
    };
    let due = payload
        .due_date
        .ok_or_else(|| eyre::eyre!("card should carry a due date"))?;
    let local = due.with_timezone(&chrono::Local);
    assert_eq!(local.date_naive().to_string(), "2025-10-31");
    assert_eq!(list_id.as_str(), "5f2a9c1e0b");
    assert!(clock.instant() < due);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disallowed_label_creation_leaves_the_board_untouched(
    board: InMemoryBoard,
    clock: FixedClock,
    settings: IntakeSettings,
) -> eyre::Result<()> {
    let proposal = TaskProposal::new("Publish the changelog")
        .with_list_name("Backlog")
        .with_labels(vec!["release".to_owned()]);
    let store = InMemoryTaskStore::new();

    let result = service(&board, &store, clock, settings)
        .create(&proposal, &CreateOptions::new().with_disallow_create(true))
        .await;

    eyre::ensure!(
        matches!(&result, Err(TaskCreationError::NotFound { requested, .. }) if requested == "release"),
        "expected a missing label, got {result:?}"
    );
    assert!(board.calls()?.is_empty());
    assert!(store.tasks()?.is_empty());
    Ok(())
}
