use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// List id to list name, for the lists of one board.
pub type ListNames = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct List {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub id_list: Option<String>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_last_activity: Option<DateTime<Utc>>,
}

impl Card {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_trello_card_payload() {
        let json = r#"{
            "id": "5c9a1b",
            "name": "(3) bob/fix-login [1]",
            "shortUrl": "https://trello.com/c/abc",
            "labels": [{"id": "l1", "name": "Planned", "color": "green"}],
            "idList": "list-1",
            "closed": false,
            "due": "2019-05-10T12:00:00.000Z",
            "dateLastActivity": "2019-05-09T08:30:00.000Z"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.short_url.as_deref(), Some("https://trello.com/c/abc"));
        assert_eq!(card.id_list.as_deref(), Some("list-1"));
        assert!(card.has_label("Planned"));
        assert!(!card.has_label("planned"));
        assert_eq!(card.due.unwrap().to_rfc3339(), "2019-05-10T12:00:00+00:00");
    }

    #[test]
    fn null_due_and_missing_labels_default() {
        let json = r#"{"id": "x", "name": "plain", "due": null}"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert!(card.due.is_none());
        assert!(card.labels.is_empty());
        assert!(!card.closed);
    }
}
