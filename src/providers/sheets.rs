use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::google_auth::ServiceAccountTokens;
use super::{ensure_success, RangeUpdate, SheetApi};
use crate::model::record::SheetRow;

const BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct GoogleSheetsClient {
    spreadsheet_id: String,
    client: reqwest::Client,
    tokens: ServiceAccountTokens,
}

impl GoogleSheetsClient {
    pub fn new(spreadsheet_id: String, tokens: ServiceAccountTokens) -> Self {
        Self {
            spreadsheet_id,
            client: reqwest::Client::new(),
            tokens,
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{BASE}/{}/values/{}",
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn send(&self, req: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let token = self.tokens.access_token().await?;
        let resp = req
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("{what} failed"))?;
        ensure_success(resp, what).await
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn rows_body(range: &str, rows: &[SheetRow]) -> Value {
    json!({
        "range": range,
        "majorDimension": "ROWS",
        "values": rows,
    })
}

#[async_trait]
impl SheetApi for GoogleSheetsClient {
    async fn read_range(&self, range: &str) -> Result<Vec<SheetRow>> {
        let req = self.client.get(self.values_url(range));
        let body: ValueRange = self
            .send(req, "Sheets read")
            .await?
            .json()
            .await
            .context("Failed to parse Sheets values")?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn write_range(&self, range: &str, rows: &[SheetRow]) -> Result<()> {
        let req = self
            .client
            .put(self.values_url(range))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&rows_body(range, rows));
        self.send(req, "Sheets update").await?;
        Ok(())
    }

    async fn append_rows(&self, range: &str, rows: &[SheetRow]) -> Result<()> {
        let req = self
            .client
            .post(format!("{}:append", self.values_url(range)))
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&rows_body(range, rows));
        self.send(req, "Sheets append").await?;
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> Result<()> {
        let req = self
            .client
            .post(format!("{}:clear", self.values_url(range)))
            .json(&json!({}));
        self.send(req, "Sheets clear").await?;
        Ok(())
    }

    async fn batch_update(&self, updates: &[RangeUpdate]) -> Result<()> {
        let data: Vec<Value> = updates
            .iter()
            .map(|u| rows_body(&u.range, &u.values))
            .collect();
        let req = self
            .client
            .post(format!("{BASE}/{}/values:batchUpdate", self.spreadsheet_id))
            .json(&json!({
                "valueInputOption": "USER_ENTERED",
                "data": data,
            }));
        self.send(req, "Sheets batch update").await?;
        Ok(())
    }
}
