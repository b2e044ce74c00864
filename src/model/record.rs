use chrono::NaiveDate;
use std::fmt;

/// One spreadsheet row, cell values in column order.
pub type SheetRow = Vec<String>;

/// Number of columns a record occupies: name, id, url, estimate, consumed, member, status, due.
pub const COLUMN_COUNT: usize = 8;

/// Column holding the card identifier; rows are de-duplicated on it.
pub const IDENTIFIER_COLUMN: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Closed with a due date.
    Ready,
    /// Closed without a due date.
    Archived,
    /// Open, sitting on the named list.
    List(String),
    /// Open, on a list we have no name for (excluded or on another board).
    Unlisted,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => f.write_str("Ready"),
            Status::Archived => f.write_str("Archived"),
            Status::List(name) => f.write_str(name),
            Status::Unlisted => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub name: String,
    pub identifier: String,
    pub url: String,
    pub estimate: Option<f64>,
    pub consumed: Option<f64>,
    pub member: String,
    pub status: Status,
    pub due: Option<NaiveDate>,
}

impl NormalizedRecord {
    pub fn to_row(&self) -> SheetRow {
        vec![
            self.name.clone(),
            self.identifier.clone(),
            self.url.clone(),
            number_cell(self.estimate),
            number_cell(self.consumed),
            self.member.clone(),
            self.status.to_string(),
            self.due
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]
    }
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Identifier cell of an existing row, if the row has one.
pub fn row_identifier(row: &SheetRow) -> Option<&str> {
    row.get(IDENTIFIER_COLUMN)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
