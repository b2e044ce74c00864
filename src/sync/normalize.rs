use crate::model::card::{Card, ListNames};
use crate::model::record::{NormalizedRecord, Status};

use super::metadata::parse_title;

/// Flatten a board card into the record written to the sheet.
///
/// `lists` resolves the card's containing list to a name for open cards;
/// closed cards never consult it.
pub fn normalize(card: &Card, lists: &ListNames) -> NormalizedRecord {
    let meta = parse_title(&card.name);

    NormalizedRecord {
        name: card.name.clone(),
        identifier: card.id.clone(),
        url: card.short_url.clone().unwrap_or_default(),
        estimate: meta.estimate,
        consumed: meta.consumed,
        member: meta.member,
        status: status_of(card, lists),
        due: due_of(card),
    }
}

fn status_of(card: &Card, lists: &ListNames) -> Status {
    match (card.closed, card.due.is_some()) {
        (true, true) => Status::Ready,
        (true, false) => Status::Archived,
        (false, _) => card
            .id_list
            .as_ref()
            .and_then(|id| lists.get(id))
            .map(|name| Status::List(name.clone()))
            .unwrap_or(Status::Unlisted),
    }
}

fn due_of(card: &Card) -> Option<chrono::NaiveDate> {
    match card.due {
        Some(due) => Some(due.date_naive()),
        None if card.closed => card.date_last_activity.map(|d| d.date_naive()),
        None => None,
    }
}
