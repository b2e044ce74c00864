use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::model::card::{Card, Label, List, ListNames};
use crate::model::record::NormalizedRecord;
use crate::providers::BoardApi;

use super::normalize::normalize;

/// How cards are split into planned and unplanned work. Chosen once from
/// the shape of the board configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelStrategy {
    /// Unplanned cards carry their own label; cards with neither label are ignored.
    ExplicitUnplannedLabel { sprint: Label, unplanned: Label },
    /// Anything without the sprint label is unplanned.
    ImplicitUnplannedByAbsence { sprint: Label },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Planned,
    Unplanned,
}

impl LabelStrategy {
    pub fn from_labels(sprint: Option<Label>, unplanned: Option<Label>) -> Option<Self> {
        match (sprint, unplanned) {
            (Some(sprint), Some(unplanned)) => {
                Some(LabelStrategy::ExplicitUnplannedLabel { sprint, unplanned })
            }
            (Some(sprint), None) => Some(LabelStrategy::ImplicitUnplannedByAbsence { sprint }),
            (None, _) => None,
        }
    }

    pub fn sprint_label(&self) -> &Label {
        match self {
            LabelStrategy::ExplicitUnplannedLabel { sprint, .. }
            | LabelStrategy::ImplicitUnplannedByAbsence { sprint } => sprint,
        }
    }

    pub fn classify(&self, card: &Card) -> Option<Partition> {
        if card.has_label(&self.sprint_label().name) {
            return Some(Partition::Planned);
        }
        match self {
            LabelStrategy::ExplicitUnplannedLabel { unplanned, .. } => {
                card.has_label(&unplanned.name).then_some(Partition::Unplanned)
            }
            LabelStrategy::ImplicitUnplannedByAbsence { .. } => Some(Partition::Unplanned),
        }
    }
}

/// A board as the sync engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSpec {
    pub id: String,
    pub list_to_exclude: Vec<String>,
    pub partition: Option<LabelStrategy>,
}

#[derive(Debug, Default)]
pub struct PartitionedCards {
    pub all: Vec<Card>,
    pub planned: Vec<NormalizedRecord>,
    pub unplanned: Vec<NormalizedRecord>,
}

/// Lists on the board, minus unnamed lists and the configured exclusions.
pub async fn fetch_lists(board_api: &dyn BoardApi, board: &BoardSpec) -> Result<Vec<List>> {
    let lists = board_api
        .list_lists(&board.id)
        .await
        .with_context(|| format!("Failed to fetch lists on board {}", board.id))?;

    Ok(lists
        .into_iter()
        .filter(|l| !l.name.is_empty() && !board.list_to_exclude.contains(&l.name))
        .collect())
}

pub async fn fetch_list_names(board_api: &dyn BoardApi, board: &BoardSpec) -> Result<ListNames> {
    let lists = fetch_lists(board_api, board).await?;
    Ok(lists.into_iter().map(|l| (l.id, l.name)).collect())
}

/// Fetch every card on the board's surviving lists and partition them.
///
/// A list whose cards cannot be fetched contributes nothing; failing to
/// fetch the lists themselves is an error.
pub async fn fetch_cards(board_api: &dyn BoardApi, board: &BoardSpec) -> Result<PartitionedCards> {
    let lists = fetch_lists(board_api, board).await?;

    let fetches = lists.iter().map(|list| async move {
        match board_api.list_cards(&list.id).await {
            Ok(cards) => cards,
            Err(err) => {
                warn!(list = %list.name, error = %err, "failed to fetch cards, skipping list");
                Vec::new()
            }
        }
    });
    let all: Vec<Card> = join_all(fetches).await.into_iter().flatten().collect();
    debug!(board = %board.id, lists = lists.len(), cards = all.len(), "fetched board");

    let names: ListNames = lists.into_iter().map(|l| (l.id, l.name)).collect();
    Ok(partition(all, &names, board.partition.as_ref()))
}

pub fn partition(
    all: Vec<Card>,
    lists: &ListNames,
    strategy: Option<&LabelStrategy>,
) -> PartitionedCards {
    let mut planned = Vec::new();
    let mut unplanned = Vec::new();

    if let Some(strategy) = strategy {
        for card in &all {
            match strategy.classify(card) {
                Some(Partition::Planned) => planned.push(normalize(card, lists)),
                Some(Partition::Unplanned) => unplanned.push(normalize(card, lists)),
                None => {}
            }
        }
    }

    PartitionedCards {
        all,
        planned,
        unplanned,
    }
}
