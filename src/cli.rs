use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use crate::config::{self, AppConfig, SheetView};
use crate::providers::google_auth::ServiceAccountTokens;
use crate::providers::sheets::GoogleSheetsClient;
use crate::providers::trello::TrelloClient;
use crate::providers::SheetApi;
use crate::sync::aggregate::fetch_cards;
use crate::sync::labels::add_sprint_label;
use crate::sync::lookup::CardLookup;
use crate::sync::reconcile::{self, WriteOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "sprintsheet",
    version,
    about = "Keep a sprint tracking spreadsheet in sync with a Trello board"
)]
pub struct Cli {
    /// Operation to perform
    #[arg(short, long, value_enum)]
    pub operation: Operation,

    /// Sheet view used by get, clear and updateSheet
    #[arg(short, long, value_enum, default_value_t = SheetView::Backlog)]
    pub sheet: SheetView,

    /// Config file (defaults to $SPRINTSHEET_CONFIG, then ~/.sprintsheet/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Print the rows of the selected sheet view
    Get,
    /// Clear the selected sheet view
    Clear,
    /// Write this sprint's planned cards to the empty backlog view
    #[value(name = "createBacklog")]
    CreateBacklog,
    /// Append unplanned cards that are not on the unplanned view yet
    #[value(name = "addToUnplanned")]
    AddToUnplanned,
    /// Refresh every row of the selected view from the boards
    #[value(name = "updateSheet")]
    UpdateSheet,
    /// Add the sprint label to every card on the sprint board
    #[value(name = "addSprintLabel")]
    AddSprintLabel,
}

pub async fn run(cli: Cli) -> Result<()> {
    let path = config::config_path(cli.config.as_deref());
    let config = config::load_config(&path)?;

    let trello = TrelloClient::new(config.trello.api_key.clone(), config.trello.token.clone());
    let sprint = config.board.sprint.to_spec();
    let target = config.sheets.target(cli.sheet);

    let outcome = match cli.operation {
        Operation::AddSprintLabel => {
            let report = add_sprint_label(&trello, &sprint).await?;
            println!(
                "Sprint label added to {} cards ({} already labelled, {} failed)",
                report.attached, report.already_labelled, report.failed
            );
            return Ok(());
        }
        Operation::Get => {
            let sheets = sheets_client(&config)?;
            let rows = sheets.read_range(&target.full_range()).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }
        Operation::Clear => {
            let sheets = sheets_client(&config)?;
            sheets.clear_range(&target.full_range()).await?;
            info!(range = %target.full_range(), "cleared sheet view");
            return Ok(());
        }
        Operation::CreateBacklog => {
            let sheets = sheets_client(&config)?;
            let cards = fetch_cards(&trello, &sprint).await?;
            let backlog = config.sheets.target(SheetView::Backlog);
            reconcile::populate(&sheets, &backlog, &cards.planned).await?
        }
        Operation::AddToUnplanned => {
            let sheets = sheets_client(&config)?;
            let cards = fetch_cards(&trello, &sprint).await?;
            let unplanned = config.sheets.target(SheetView::Unplanned);
            reconcile::append_unseen(&sheets, &unplanned, &cards.unplanned).await?
        }
        Operation::UpdateSheet => {
            let sheets = sheets_client(&config)?;
            let release = config.board.release.as_ref().map(|b| b.to_spec());
            let lookup = CardLookup::prepare(&trello, &sprint, release.as_ref()).await?;
            reconcile::refresh(&sheets, &lookup, &target).await?
        }
    };

    match outcome {
        WriteOutcome::Written { rows } => println!("{rows} rows written"),
        WriteOutcome::NothingToWrite => println!("Nothing updated"),
    }
    Ok(())
}

fn sheets_client(config: &AppConfig) -> Result<GoogleSheetsClient> {
    let tokens = ServiceAccountTokens::from_file(config.credentials_file())
        .context("Failed to load Google service account credentials")?;
    Ok(GoogleSheetsClient::new(
        config.google.spreadsheet_id.clone(),
        tokens,
    ))
}
