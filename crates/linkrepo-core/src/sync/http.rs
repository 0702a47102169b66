//! HTTP transport speaking the Link Repo REST API.

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::transport::{EntryTransport, TransportError, TransportResult};
use crate::config::ClientConfig;
use crate::models::{AccessKey, EntryId, EntryWire, LinkMetadata, RepoMetaPatch, RepoWire};
use crate::util::compact_text;

#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client: Client::builder().timeout(config.timeout()).build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Access keys are ASCII alphanumeric, so they need no escaping in a path.
    fn repo_url(&self, key: &AccessKey) -> String {
        format!("{}/api/repo/{key}", self.base_url)
    }

    fn entries_url(&self, key: &AccessKey) -> String {
        format!("{}/entries", self.repo_url(key))
    }

    async fn send(request: RequestBuilder) -> TransportResult<Response> {
        let response = request.header(ACCEPT, "application/json").send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Api {
            status: status.as_u16(),
            message: parse_api_error(status, &body),
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct NewEntriesBody<'a> {
    new: &'a [EntryWire],
}

#[derive(Serialize)]
struct ChangedEntriesBody<'a> {
    change: &'a [EntryWire],
}

#[derive(Serialize)]
struct DeletedEntriesBody<'a> {
    delete: &'a [EntryId],
}

#[derive(Deserialize)]
struct ScrapeResponse {
    data: LinkMetadata,
}

impl EntryTransport for HttpTransport {
    async fn fetch_repo(&self, key: &AccessKey) -> TransportResult<RepoWire> {
        let response = Self::send(self.client.get(self.repo_url(key))).await?;
        Ok(response.json::<RepoWire>().await?)
    }

    async fn create_entries(&self, key: &AccessKey, entries: &[EntryWire]) -> TransportResult<()> {
        let request = self
            .client
            .post(self.entries_url(key))
            .json(&NewEntriesBody { new: entries });
        Self::send(request).await?;
        Ok(())
    }

    async fn update_entries(&self, key: &AccessKey, entries: &[EntryWire]) -> TransportResult<()> {
        let request = self
            .client
            .patch(self.entries_url(key))
            .json(&ChangedEntriesBody { change: entries });
        Self::send(request).await?;
        Ok(())
    }

    async fn delete_entries(&self, key: &AccessKey, ids: &[EntryId]) -> TransportResult<()> {
        let request = self
            .client
            .delete(self.entries_url(key))
            .json(&DeletedEntriesBody { delete: ids });
        Self::send(request).await?;
        Ok(())
    }

    async fn update_repo(&self, key: &AccessKey, patch: &RepoMetaPatch) -> TransportResult<()> {
        Self::send(self.client.patch(self.repo_url(key)).json(patch)).await?;
        Ok(())
    }

    async fn fetch_link_metadata(&self, url: &str) -> TransportResult<LinkMetadata> {
        let request = self
            .client
            .get(format!("{}/api/scrape", self.base_url))
            .query(&[("url", url)]);
        let response = Self::send(request).await?;
        Ok(response.json::<ScrapeResponse>().await?.data)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return compact_text(&message);
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
    } else {
        compact_text(trimmed)
    }
}
