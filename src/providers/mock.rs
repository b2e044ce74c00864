use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{BoardApi, CardFetch, RangeUpdate, SheetApi};
use crate::model::card::{Card, Label, List};
use crate::model::record::SheetRow;

pub fn card(id: &str, name: &str, list_id: &str, labels: &[&str]) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        short_url: Some(format!("https://trello.com/c/{id}")),
        labels: labels
            .iter()
            .map(|l| Label {
                id: format!("id-{l}"),
                name: l.to_string(),
            })
            .collect(),
        id_list: Some(list_id.to_string()),
        closed: false,
        due: None,
        date_last_activity: None,
    }
}

/// In-memory board collaborator. Cards live on lists, lists on boards.
#[derive(Default)]
pub struct MockBoard {
    lists: HashMap<String, Vec<List>>,
    cards: HashMap<String, Vec<Card>>,
    failing_boards: HashSet<String>,
    failing_lists: HashSet<String>,
    failing_cards: HashSet<String>,
    failing_attach: HashSet<String>,
    pub attached: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, board_id: &str, list_id: &str, name: &str, cards: Vec<Card>) -> Self {
        self.lists.entry(board_id.to_string()).or_default().push(List {
            id: list_id.to_string(),
            name: name.to_string(),
        });
        self.cards.insert(list_id.to_string(), cards);
        self
    }

    pub fn failing_board(mut self, board_id: &str) -> Self {
        self.failing_boards.insert(board_id.to_string());
        self
    }

    pub fn failing_list(mut self, list_id: &str) -> Self {
        self.failing_lists.insert(list_id.to_string());
        self
    }

    pub fn failing_card(mut self, card_id: &str) -> Self {
        self.failing_cards.insert(card_id.to_string());
        self
    }

    pub fn failing_attach(mut self, card_id: &str) -> Self {
        self.failing_attach.insert(card_id.to_string());
        self
    }
}

#[async_trait]
impl BoardApi for MockBoard {
    async fn list_lists(&self, board_id: &str) -> Result<Vec<List>> {
        if self.failing_boards.contains(board_id) {
            bail!("Mock failure: lists on {board_id}");
        }
        Ok(self.lists.get(board_id).cloned().unwrap_or_default())
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<Card>> {
        if self.failing_lists.contains(list_id) {
            bail!("Mock failure: cards on {list_id}");
        }
        Ok(self.cards.get(list_id).cloned().unwrap_or_default())
    }

    async fn get_card(&self, board_id: &str, card_id: &str) -> Result<CardFetch> {
        if self.failing_cards.contains(card_id) {
            bail!("Mock failure: card {card_id}");
        }
        let found = self
            .lists
            .get(board_id)
            .into_iter()
            .flatten()
            .filter_map(|list| self.cards.get(&list.id))
            .flatten()
            .find(|c| c.id == card_id)
            .cloned();
        Ok(found.map_or(CardFetch::NotFound, CardFetch::Found))
    }

    async fn attach_label(&self, card_id: &str, label_id: &str) -> Result<()> {
        if self.failing_attach.contains(card_id) {
            bail!("Mock failure: label on {card_id}");
        }
        self.attached
            .lock()
            .unwrap()
            .push((card_id.to_string(), label_id.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetCall {
    Read(String),
    Write(String, Vec<SheetRow>),
    Append(String, Vec<SheetRow>),
    Clear(String),
    BatchUpdate(Vec<RangeUpdate>),
}

/// In-memory sheet that serves a fixed set of rows and records every call.
#[derive(Default)]
pub struct MockSheet {
    rows: Vec<SheetRow>,
    pub calls: Arc<Mutex<Vec<SheetCall>>>,
}

impl MockSheet {
    pub fn with_rows(rows: Vec<SheetRow>) -> Self {
        Self {
            rows,
            calls: Arc::default(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Every call except reads.
    pub fn writes(&self) -> Vec<SheetCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !matches!(c, SheetCall::Read(_)))
            .cloned()
            .collect()
    }

    fn record(&self, call: SheetCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SheetApi for MockSheet {
    async fn read_range(&self, range: &str) -> Result<Vec<SheetRow>> {
        self.record(SheetCall::Read(range.to_string()));
        Ok(self.rows.clone())
    }

    async fn write_range(&self, range: &str, rows: &[SheetRow]) -> Result<()> {
        self.record(SheetCall::Write(range.to_string(), rows.to_vec()));
        Ok(())
    }

    async fn append_rows(&self, range: &str, rows: &[SheetRow]) -> Result<()> {
        self.record(SheetCall::Append(range.to_string(), rows.to_vec()));
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> Result<()> {
        self.record(SheetCall::Clear(range.to_string()));
        Ok(())
    }

    async fn batch_update(&self, updates: &[RangeUpdate]) -> Result<()> {
        self.record(SheetCall::BatchUpdate(updates.to_vec()));
        Ok(())
    }
}

pub fn row(cells: &[&str]) -> SheetRow {
    cells.iter().map(|c| c.to_string()).collect()
}
