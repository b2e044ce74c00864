use regex::Regex;
use std::sync::LazyLock;

static START_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!?([A-Z]+)(\d+)?").expect("valid cell pattern"));

/// First data row when the range template does not name one.
const DEFAULT_START_ROW: u32 = 2;

/// A sheet view: sheet name plus a range template such as `!A2:H`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    name: String,
    template: String,
    start_column: u32,
    start_row: u32,
}

impl SheetTarget {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        let template = template.into();
        let caps = START_CELL.captures(&template);
        let start_column = caps
            .as_ref()
            .and_then(|c| c.get(1))
            .map_or(1, |m| column_index(m.as_str()));
        let start_row = caps
            .as_ref()
            .and_then(|c| c.get(2))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(DEFAULT_START_ROW);

        Self {
            name: name.into(),
            template,
            start_column,
            start_row,
        }
    }

    /// The whole view, e.g. `Sprint!A2:H`.
    pub fn full_range(&self) -> String {
        format!("{}{}", self.name, self.template)
    }

    /// Top-left data cell, where populate writes and append anchors.
    pub fn anchor(&self) -> String {
        format!(
            "{}!{}{}",
            self.name,
            column_name(self.start_column),
            self.start_row
        )
    }

    pub fn start_row(&self) -> u32 {
        self.start_row
    }

    /// Range covering `width` cells of sheet row `row`.
    pub fn row_range(&self, row: u32, width: usize) -> String {
        let last = self.start_column + width.saturating_sub(1) as u32;
        format!(
            "{name}!{first}{row}:{last}{row}",
            name = self.name,
            first = column_name(self.start_column),
            last = column_name(last),
        )
    }
}

/// `A` -> 1, `Z` -> 26, `AA` -> 27.
fn column_index(letters: &str) -> u32 {
    letters
        .bytes()
        .fold(0, |acc, b| acc * 26 + u32::from(b - b'A' + 1))
}

fn column_name(mut index: u32) -> String {
    let mut name = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        name.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}
