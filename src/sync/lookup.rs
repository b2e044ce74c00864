use anyhow::Result;
use tracing::debug;

use crate::model::card::ListNames;
use crate::model::record::NormalizedRecord;
use crate::providers::{BoardApi, CardFetch};

use super::aggregate::{fetch_list_names, BoardSpec};
use super::normalize::normalize;

struct BoardLists {
    board_id: String,
    lists: ListNames,
}

/// Resolves a card id to its current record, trying the sprint board first
/// and the release board second.
pub struct CardLookup<'a> {
    board_api: &'a dyn BoardApi,
    primary: BoardLists,
    secondary: Option<BoardLists>,
}

impl<'a> CardLookup<'a> {
    /// Load the list names of both boards up front so lookups can run concurrently.
    pub async fn prepare(
        board_api: &'a dyn BoardApi,
        primary: &BoardSpec,
        secondary: Option<&BoardSpec>,
    ) -> Result<Self> {
        let secondary_lists = async {
            match secondary {
                Some(board) => fetch_list_names(board_api, board).await.map(Some),
                None => Ok(None),
            }
        };
        let (primary_lists, secondary_lists) =
            tokio::try_join!(fetch_list_names(board_api, primary), secondary_lists)?;

        Ok(Self {
            board_api,
            primary: BoardLists {
                board_id: primary.id.clone(),
                lists: primary_lists,
            },
            secondary: secondary.zip(secondary_lists).map(|(board, lists)| BoardLists {
                board_id: board.id.clone(),
                lists,
            }),
        })
    }

    /// `Ok(None)` when neither board has the card.
    pub async fn lookup(&self, card_id: &str) -> Result<Option<NormalizedRecord>> {
        if let Some(record) = self.lookup_on(&self.primary, card_id).await? {
            return Ok(Some(record));
        }
        let Some(secondary) = &self.secondary else {
            return Ok(None);
        };
        debug!(card = card_id, board = %secondary.board_id, "not on sprint board, trying release board");
        self.lookup_on(secondary, card_id).await
    }

    async fn lookup_on(&self, board: &BoardLists, card_id: &str) -> Result<Option<NormalizedRecord>> {
        match self.board_api.get_card(&board.board_id, card_id).await? {
            CardFetch::Found(card) => Ok(Some(normalize(&card, &board.lists))),
            CardFetch::NotFound => Ok(None),
        }
    }
}
