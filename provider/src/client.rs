//! HTTP client for the `/games` endpoints.
//!
//! Every request carries `Authorization: Bearer <token>`. Non-2xx answers are
//! turned into [`ProviderError::Status`] with the backend's own message when
//! the body is `{"error": "..."}` (or Django's `{"detail": "..."}`).

use core::future::Future;
use std::time::Duration;

use quatro_abi::{
    DrawOutcome, Gift, NewTicket, PlayResponse, TicketExistence, TicketId, TicketRecord,
};
use quatro_lib::AppConfig;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::DrawProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::token::{StaticToken, TokenSource};

pub struct HttpClient<T = StaticToken> {
    http: reqwest::Client,
    base_url: String,
    tokens: T,
}

/// Pull the human-readable message out of an error body, if there is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl HttpClient<StaticToken> {
    pub fn from_config(cfg: &AppConfig) -> ProviderResult<Self> {
        Self::new(
            &cfg.api_base_url,
            cfg.request_timeout,
            StaticToken::new(cfg.access_token.clone()),
        )
    }
}

impl<T: TokenSource> HttpClient<T> {
    pub fn new(base_url: &str, timeout: Duration, tokens: T) -> ProviderResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `path` is relative to the base and keeps the backend's trailing slash.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> ProviderResult<RequestBuilder> {
        let token = self
            .tokens
            .access_token()
            .ok_or(ProviderError::NoAccessToken)?;
        Ok(self
            .http
            .request(method, self.endpoint(path))
            .bearer_auth(token))
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> ProviderResult<R> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                code: status.as_u16(),
                message: error_message(&body),
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ProviderError::Decode(err.to_string()))
    }

    /// `POST games/tickets/{id}/play/`: run the draw for a registered ticket.
    pub async fn play(&self, ticket: TicketId) -> ProviderResult<DrawOutcome> {
        let path = format!("games/tickets/{}/play/", ticket);
        debug!("provider: playing ticket {}", ticket);
        let request = self
            .request(Method::POST, &path)?
            .json(&serde_json::json!({}));
        let response: PlayResponse = self.send(request).await?;
        Ok(response.into_outcome()?)
    }

    /// `POST games/tickets/`: register a ticket and the player's numbers.
    pub async fn create_ticket(&self, ticket: &NewTicket) -> ProviderResult<TicketRecord> {
        debug!(
            "provider: creating ticket {} numbers={}",
            ticket.external_ticket_number, ticket.numbers
        );
        let request = self.request(Method::POST, "games/tickets/")?.json(ticket);
        self.send(request).await
    }

    /// `PATCH games/tickets/{id}/` with the winner's phone number.
    pub async fn update_ticket_phone(
        &self,
        ticket: TicketId,
        phone_number: &str,
    ) -> ProviderResult<TicketRecord> {
        let path = format!("games/tickets/{}/", ticket);
        let request = self
            .request(Method::PATCH, &path)?
            .json(&serde_json::json!({ "phone_number": phone_number }));
        self.send(request).await
    }

    /// Whether an external (printed) ticket number was already registered.
    pub async fn ticket_exists(&self, external_ticket_number: &str) -> ProviderResult<bool> {
        let request = self
            .request(Method::GET, "games/tickets/check_external_ticket/")?
            .query(&[("external_ticket_number", external_ticket_number)]);
        let existence: TicketExistence = self.send(request).await?;
        Ok(existence.exists)
    }

    pub async fn fetch_gifts(&self) -> ProviderResult<Vec<Gift>> {
        let request = self.request(Method::GET, "games/gifts/")?;
        self.send(request).await
    }

    /// Prize catalogue, falling back to the static one when unreachable.
    pub async fn gifts_or_fallback(&self) -> Vec<Gift> {
        match self.fetch_gifts().await {
            Ok(gifts) => gifts,
            Err(err) => {
                warn!("provider: gift catalogue unavailable ({}), using static list", err);
                Gift::fallback_catalog()
            }
        }
    }
}

impl<T: TokenSource> DrawProvider for HttpClient<T> {
    fn play_ticket(
        &self,
        ticket: TicketId,
    ) -> impl Future<Output = ProviderResult<DrawOutcome>> + Send {
        self.play(ticket)
    }
}
