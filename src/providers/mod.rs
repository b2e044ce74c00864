pub mod google_auth;
pub mod sheets;
pub mod trello;

#[cfg(test)]
pub mod mock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::model::card::{Card, List};
use crate::model::record::SheetRow;

/// Outcome of fetching a single card by id. Transport and auth failures are
/// the `Err` side of the surrounding `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum CardFetch {
    Found(Card),
    NotFound,
}

#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn list_lists(&self, board_id: &str) -> Result<Vec<List>>;
    async fn list_cards(&self, list_id: &str) -> Result<Vec<Card>>;
    async fn get_card(&self, board_id: &str, card_id: &str) -> Result<CardFetch>;
    async fn attach_label(&self, card_id: &str, label_id: &str) -> Result<()>;
}

/// Values for one A1 range in a batched write.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeUpdate {
    pub range: String,
    pub values: Vec<SheetRow>,
}

#[async_trait]
pub trait SheetApi: Send + Sync {
    async fn read_range(&self, range: &str) -> Result<Vec<SheetRow>>;
    async fn write_range(&self, range: &str, rows: &[SheetRow]) -> Result<()>;
    /// Append after the last row of the table found at `range`.
    async fn append_rows(&self, range: &str, rows: &[SheetRow]) -> Result<()>;
    async fn clear_range(&self, range: &str) -> Result<()>;
    async fn batch_update(&self, updates: &[RangeUpdate]) -> Result<()>;
}

/// Turn a non-2xx response into an error carrying the status and body.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    bail!("{what} failed with {status}: {}", body.trim())
}
