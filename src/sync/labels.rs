use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::warn;

use crate::providers::BoardApi;

use super::aggregate::{fetch_cards, BoardSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelReport {
    pub attached: usize,
    pub already_labelled: usize,
    pub failed: usize,
}

/// Put the sprint label on every card of the board, at the start of a sprint.
pub async fn add_sprint_label(board_api: &dyn BoardApi, board: &BoardSpec) -> Result<LabelReport> {
    let label = board
        .partition
        .as_ref()
        .map(|s| s.sprint_label())
        .context("No sprint label configured for the sprint board")?;

    let cards = fetch_cards(board_api, board).await?;
    let (labelled, pending): (Vec<_>, Vec<_>) =
        cards.all.iter().partition(|c| c.has_label(&label.name));

    let attaches = pending.iter().map(|card| async move {
        match board_api.attach_label(&card.id, &label.id).await {
            Ok(()) => true,
            Err(err) => {
                warn!(card = %card.id, error = %err, "failed to add sprint label");
                false
            }
        }
    });
    let results = join_all(attaches).await;
    let attached = results.iter().filter(|ok| **ok).count();

    Ok(LabelReport {
        attached,
        already_labelled: labelled.len(),
        failed: results.len() - attached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Label;
    use crate::providers::mock::{card, MockBoard};
    use crate::sync::aggregate::LabelStrategy;

    fn board(partition: Option<LabelStrategy>) -> BoardSpec {
        BoardSpec {
            id: "sprint".into(),
            list_to_exclude: vec!["Backlog".into()],
            partition,
        }
    }

    fn planned() -> Option<LabelStrategy> {
        Some(LabelStrategy::ImplicitUnplannedByAbsence {
            sprint: Label {
                id: "id-Planned".into(),
                name: "Planned".into(),
            },
        })
    }

    #[tokio::test]
    async fn labels_every_card_outside_excluded_lists() {
        let api = MockBoard::new()
            .with_list("sprint", "l1", "To Do", vec![card("a", "a", "l1", &[]), card("b", "b", "l1", &["Planned"])])
            .with_list("sprint", "l2", "Doing", vec![card("c", "c", "l2", &["Bug"])])
            .with_list("sprint", "l3", "Backlog", vec![card("z", "z", "l3", &[])]);

        let report = add_sprint_label(&api, &board(planned())).await.unwrap();
        assert_eq!(
            report,
            LabelReport {
                attached: 2,
                already_labelled: 1,
                failed: 0
            }
        );
        let mut attached = api.attached.lock().unwrap().clone();
        attached.sort();
        assert_eq!(
            attached,
            vec![
                ("a".to_string(), "id-Planned".to_string()),
                ("c".to_string(), "id-Planned".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn attach_failures_are_counted() {
        let api = MockBoard::new()
            .with_list("sprint", "l1", "To Do", vec![card("a", "a", "l1", &[]), card("b", "b", "l1", &[])])
            .failing_attach("a");
        let report = add_sprint_label(&api, &board(planned())).await.unwrap();
        assert_eq!(report.attached, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn requires_a_sprint_label() {
        let api = MockBoard::new();
        let err = add_sprint_label(&api, &board(None)).await.unwrap_err();
        assert!(err.to_string().contains("No sprint label"));
    }
}
