use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::card::Label;
use crate::sync::aggregate::{BoardSpec, LabelStrategy};
use crate::sync::range::SheetTarget;

pub const CONFIG_ENV: &str = "SPRINTSHEET_CONFIG";

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub trello: TrelloConfig,
    pub board: BoardsConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    pub sheets: SheetsConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct TrelloConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct BoardsConfig {
    pub sprint: BoardConfig,
    pub release: Option<BoardConfig>,
}

#[derive(Debug, Deserialize)]
pub struct BoardConfig {
    pub id: String,
    /// Comma separated list names, e.g. `"Backlog,Icebox"`.
    #[serde(default)]
    pub list_to_exclude: String,
    pub sprint_label: Option<Label>,
    pub unplanned_label: Option<Label>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GoogleConfig {
    #[serde(default)]
    pub spreadsheet_id: String,
    pub credentials_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct SheetsConfig {
    pub backlog: SheetConfig,
    pub unplanned: SheetConfig,
}

#[derive(Debug, Deserialize)]
pub struct SheetConfig {
    pub name: String,
    pub range: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SheetView {
    Backlog,
    Unplanned,
}

impl BoardConfig {
    pub fn to_spec(&self) -> BoardSpec {
        BoardSpec {
            id: self.id.clone(),
            list_to_exclude: split_list_names(&self.list_to_exclude),
            partition: LabelStrategy::from_labels(
                self.sprint_label.clone(),
                self.unplanned_label.clone(),
            ),
        }
    }
}

impl SheetsConfig {
    pub fn target(&self, view: SheetView) -> SheetTarget {
        let sheet = match view {
            SheetView::Backlog => &self.backlog,
            SheetView::Unplanned => &self.unplanned,
        };
        SheetTarget::new(sheet.name.clone(), sheet.range.clone())
    }
}

fn split_list_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Environment values take precedence over the file.
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("TRELLO_API_KEY") {
            self.trello.api_key = v;
        }
        if let Some(v) = env("TRELLO_API_TOKEN") {
            self.trello.token = v;
        }
        if let Some(v) = env("GOOGLE_SPREADSHEET_ID") {
            self.google.spreadsheet_id = v;
        }
        if let Some(v) = env("GOOGLE_PRIVATE_KEY_FILE_PATH") {
            self.google.credentials_file = Some(PathBuf::from(v));
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.trello.api_key.is_empty() {
            return Err(ConfigError::MissingValue("TRELLO_API_KEY"));
        }
        if self.trello.token.is_empty() {
            return Err(ConfigError::MissingValue("TRELLO_API_TOKEN"));
        }
        if self.google.spreadsheet_id.is_empty() {
            return Err(ConfigError::MissingValue("GOOGLE_SPREADSHEET_ID"));
        }
        if self.google.credentials_file.is_none() {
            return Err(ConfigError::MissingValue("GOOGLE_PRIVATE_KEY_FILE_PATH"));
        }
        Ok(())
    }

    pub fn credentials_file(&self) -> &Path {
        self.google
            .credentials_file
            .as_deref()
            .unwrap_or_else(|| Path::new(""))
    }
}

/// `--config`, then `$SPRINTSHEET_CONFIG`, then `~/.sprintsheet/config.toml`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sprintsheet")
        .join("config.toml")
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_config_with_env(path, |key| {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    })
}

fn load_config_with_env(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: AppConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.apply_env(env);
    config.validate()?;
    Ok(config)
}
