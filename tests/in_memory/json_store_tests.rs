//! The `tasks.json` store behind a real creation flow.

use std::sync::Arc;

use kanban_intake::intake::{
    adapters::{json::JsonFileTaskStore, memory::InMemoryBoard},
    domain::{BoardId, EntityId, LocalTask, TaskProposal},
    ports::LocalTaskStore,
    services::{CreateOptions, CreationOutcome, IntakeSettings, TaskCreationService},
};
use rstest::rstest;

use super::helpers::{FixedClock, ScratchDir, board, clock, settings};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_cards_are_written_to_the_document(
    board: InMemoryBoard,
    clock: FixedClock,
    settings: IntakeSettings,
) -> eyre::Result<()> {
    let scratch = ScratchDir::create()?;
    let store = JsonFileTaskStore::for_board(scratch.join("tasks.json"), BoardId::new("board-1"));
    let intake = TaskCreationService::new(
        Arc::new(board),
        Arc::new(store.clone()),
        Arc::new(clock),
        settings,
    );

    let outcome = intake
        .create(
            &TaskProposal::new("Publish the changelog").with_list_name("Backlog"),
            &CreateOptions::new(),
        )
        .await?;

    let CreationOutcome::Created(card) = outcome else {
        eyre::bail!("expected a created card");
    };
    let document: serde_json::Value = serde_json::from_str(&scratch.read("tasks.json")?)?;
    assert_eq!(document["metadata"]["boardId"], "board-1");
    assert_eq!(document["metadata"]["version"], "1.0.0");
    assert_eq!(document["lastSync"], "2025-10-25T09:00:00Z");
    assert_eq!(document["tasks"][0]["plankaCardId"], card.card_id.as_str());
    assert_eq!(document["tasks"][0]["synced"], true);

    let reopened = JsonFileTaskStore::new(scratch.join("tasks.json"));
    let found = reopened.find_by_remote_id(&card.card_id).await?;
    assert_eq!(found.map(|task| task.id().clone()), Some(card.task_id));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_document_reads_as_empty_and_is_created_on_write(
    clock: FixedClock,
) -> eyre::Result<()> {
    let scratch = ScratchDir::create()?;
    let store = JsonFileTaskStore::new(scratch.join("nested/tasks.json"));

    assert!(store.tasks().await?.is_empty());
    let task = LocalTask::from_proposal(&TaskProposal::new("Publish the changelog"), &clock);
    store.record(&task).await?;

    let pending = store.pending_tasks().await?;
    assert_eq!(pending.len(), 1);
    assert!(scratch.read("nested/tasks.json")?.contains("Publish the changelog"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_documents_surface_as_persistence_errors() -> eyre::Result<()> {
    let scratch = ScratchDir::create()?;
    scratch.write("tasks.json", "{ not json")?;
    let store = JsonFileTaskStore::new(scratch.join("tasks.json"));

    let result = store.find_by_remote_id(&EntityId::new("card-1")).await;

    eyre::ensure!(result.is_err(), "malformed document should not parse");
    Ok(())
}

const LEGACY_DOCUMENT: &str = r#"{
  "tasks": [
    {
      "id": "1730000000000",
      "title": "Set up CI",
      "description": "Pipeline for the API",
      "category": "backend",
      "priority": "normal",
      "status": "pending",
      "labels": [],
      "subtasks": [
        {
          "id": "1730000000000k3j9x0q2a",
          "title": "write workflow",
          "completed": false,
          "createdAt": "2024-10-27T03:33:20.000Z"
        }
      ],
      "createdAt": "2024-10-27T03:33:20.000Z",
      "updatedAt": "2024-10-27T03:33:20.000Z",
      "plankaCardId": null,
      "plankaTaskListId": null,
      "synced": false
    }
  ],
  "lastSync": null,
  "metadata": {
    "version": "1.0.0",
    "description": "Task management for Planka integration"
  }
}"#;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn documents_from_older_tools_accept_new_cards(
    board: InMemoryBoard,
    clock: FixedClock,
    settings: IntakeSettings,
) -> eyre::Result<()> {
    let scratch = ScratchDir::create()?;
    scratch.write("tasks.json", LEGACY_DOCUMENT)?;
    let store = JsonFileTaskStore::new(scratch.join("tasks.json"));
    let intake = TaskCreationService::new(
        Arc::new(board.clone()),
        Arc::new(store.clone()),
        Arc::new(clock),
        settings,
    );

    let outcome = intake
        .create(
            &TaskProposal::new("Publish the changelog").with_list_name("Backlog"),
            &CreateOptions::new(),
        )
        .await?;

    eyre::ensure!(
        matches!(outcome, CreationOutcome::Created(_)),
        "expected a created card, got {outcome:?}"
    );
    let document: serde_json::Value = serde_json::from_str(&scratch.read("tasks.json")?)?;
    let legacy = &document["tasks"][0];
    assert_eq!(legacy["id"], "1730000000000");
    assert_eq!(legacy["category"], "backend");
    assert_eq!(legacy["priority"], "normal");
    assert!(legacy.get("plankaTaskListId").is_some_and(serde_json::Value::is_null));
    assert_eq!(legacy["subtasks"][0]["id"], "1730000000000k3j9x0q2a");
    assert_eq!(document["tasks"][1]["synced"], true);
    assert_eq!(store.pending_tasks().await?.len(), 1);
    Ok(())
}
