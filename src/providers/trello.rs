use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;

use super::{ensure_success, BoardApi, CardFetch};
use crate::model::card::{Card, List};

const BASE: &str = "https://api.trello.com/1";

const CARD_FIELDS: &str = "id,name,shortUrl,labels,idList,closed,due,dateLastActivity";

/// Response bodies Trello sends for an unknown or foreign card id.
const NOT_FOUND_MESSAGES: &[&str] = &["Could not find the card", "invalid id"];

pub struct TrelloClient {
    api_key: String,
    token: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(api_key: String, token: String) -> Self {
        Self {
            api_key,
            token,
            client: reqwest::Client::new(),
        }
    }

    fn auth_params(&self) -> [(&str, &str); 2] {
        [("key", &self.api_key), ("token", &self.token)]
    }
}

fn is_not_found(status: StatusCode, body: &str) -> bool {
    matches!(status, StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND)
        && NOT_FOUND_MESSAGES.contains(&body.trim())
}

#[async_trait]
impl BoardApi for TrelloClient {
    async fn list_lists(&self, board_id: &str) -> Result<Vec<List>> {
        let resp = self
            .client
            .get(format!("{BASE}/boards/{board_id}/lists"))
            .query(&self.auth_params())
            .query(&[("fields", "id,name")])
            .send()
            .await
            .context("Trello lists request failed")?;

        ensure_success(resp, "Trello lists request")
            .await?
            .json()
            .await
            .context("Failed to parse Trello lists")
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<Card>> {
        let resp = self
            .client
            .get(format!("{BASE}/lists/{list_id}/cards"))
            .query(&self.auth_params())
            .query(&[("fields", CARD_FIELDS)])
            .send()
            .await
            .context("Trello cards request failed")?;

        ensure_success(resp, "Trello cards request")
            .await?
            .json()
            .await
            .context("Failed to parse Trello cards")
    }

    async fn get_card(&self, board_id: &str, card_id: &str) -> Result<CardFetch> {
        let resp = self
            .client
            .get(format!("{BASE}/boards/{board_id}/cards/{card_id}"))
            .query(&self.auth_params())
            .query(&[("fields", CARD_FIELDS)])
            .send()
            .await
            .context("Trello card request failed")?;

        let status = resp.status();
        if status.is_success() {
            let card = resp.json().await.context("Failed to parse Trello card")?;
            return Ok(CardFetch::Found(card));
        }

        let body = resp.text().await.unwrap_or_default();
        if is_not_found(status, &body) {
            return Ok(CardFetch::NotFound);
        }
        bail!("Trello card {card_id} request failed with {status}: {}", body.trim())
    }

    async fn attach_label(&self, card_id: &str, label_id: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{BASE}/cards/{card_id}/idLabels"))
            .query(&self.auth_params())
            .query(&[("value", label_id)])
            .send()
            .await
            .context("Failed to add label to Trello card")?;

        ensure_success(resp, "Trello label request").await?;
        Ok(())
    }
}
