//! Turning fetched records into the smallest write against a sheet view.
//!
//! Populate fills an empty backlog once per sprint, append-unseen adds
//! unplanned cards that are not on the sheet yet, and refresh overwrites
//! existing rows with the current state of their cards.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::model::record::{row_identifier, NormalizedRecord, SheetRow, COLUMN_COUNT};
use crate::providers::{RangeUpdate, SheetApi};

use super::lookup::CardLookup;
use super::range::SheetTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { rows: usize },
    NothingToWrite,
}

pub async fn populate(
    sheets: &dyn SheetApi,
    target: &SheetTarget,
    planned: &[NormalizedRecord],
) -> Result<WriteOutcome, SyncError> {
    if planned.is_empty() {
        info!("no planned cards, nothing to write");
        return Ok(WriteOutcome::NothingToWrite);
    }

    let range = target.full_range();
    let existing = sheets.read_range(&range).await?;
    if !existing.is_empty() {
        return Err(SyncError::BacklogNotEmpty { range });
    }

    let rows: Vec<SheetRow> = planned.iter().map(NormalizedRecord::to_row).collect();
    sheets.write_range(&target.anchor(), &rows).await?;
    info!(range = %target.anchor(), rows = rows.len(), "wrote sprint backlog");
    Ok(WriteOutcome::Written { rows: rows.len() })
}

/// Records whose identifier is not already in the identifier column of `existing`.
pub fn unseen<'r>(existing: &[SheetRow], fetched: &'r [NormalizedRecord]) -> Vec<&'r NormalizedRecord> {
    let present: HashSet<&str> = existing.iter().filter_map(row_identifier).collect();
    fetched
        .iter()
        .filter(|r| !present.contains(r.identifier.as_str()))
        .collect()
}

pub async fn append_unseen(
    sheets: &dyn SheetApi,
    target: &SheetTarget,
    unplanned: &[NormalizedRecord],
) -> Result<WriteOutcome, SyncError> {
    if unplanned.is_empty() {
        info!("no unplanned cards, nothing to write");
        return Ok(WriteOutcome::NothingToWrite);
    }

    let existing = sheets.read_range(&target.full_range()).await?;
    let rows: Vec<SheetRow> = unseen(&existing, unplanned)
        .into_iter()
        .map(NormalizedRecord::to_row)
        .collect();
    if rows.is_empty() {
        info!(existing = existing.len(), "every unplanned card is already on the sheet");
        return Ok(WriteOutcome::NothingToWrite);
    }

    sheets.append_rows(&target.anchor(), &rows).await?;
    info!(range = %target.anchor(), rows = rows.len(), "appended unplanned cards");
    Ok(WriteOutcome::Written { rows: rows.len() })
}

/// Overwrite every row of the view with the current record of its card.
///
/// Rows whose card cannot be found, or whose lookup fails, are left as they
/// are. All lookups settle before the single batched write.
pub async fn refresh(
    sheets: &dyn SheetApi,
    lookup: &CardLookup<'_>,
    target: &SheetTarget,
) -> Result<WriteOutcome, SyncError> {
    let existing = sheets.read_range(&target.full_range()).await?;
    if existing.is_empty() {
        info!(range = %target.full_range(), "no rows on the sheet, nothing to update");
        return Ok(WriteOutcome::NothingToWrite);
    }

    let lookups = existing.iter().enumerate().map(|(offset, row)| async move {
        let id = row_identifier(row)?;
        let sheet_row = target.start_row() + offset as u32;
        match lookup.lookup(id).await {
            Ok(Some(record)) => Some(RangeUpdate {
                range: target.row_range(sheet_row, COLUMN_COUNT),
                values: vec![record.to_row()],
            }),
            Ok(None) => {
                debug!(card = id, row = sheet_row, "card not found on any board, keeping row");
                None
            }
            Err(err) => {
                warn!(card = id, row = sheet_row, error = %err, "lookup failed, keeping row");
                None
            }
        }
    });
    let updates: Vec<RangeUpdate> = join_all(lookups).await.into_iter().flatten().collect();

    if updates.is_empty() {
        info!(rows = existing.len(), "no row could be refreshed");
        return Ok(WriteOutcome::NothingToWrite);
    }

    sheets.batch_update(&updates).await?;
    info!(
        updated = updates.len(),
        kept = existing.len() - updates.len(),
        "refreshed sheet rows"
    );
    Ok(WriteOutcome::Written { rows: updates.len() })
}
