use linkrepo_core::models::{EntryWire, RepoMeta};
use linkrepo_core::{
    AccessKey, ClientConfig, EntryCollection, EntryTransport, HttpTransport, Repo,
};
use serde::Serialize;

use crate::error::CliError;

/// A repo as printed by `show --json`.
#[derive(Debug, Serialize)]
pub struct RepoOutput {
    pub access_key: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_private: bool,
    pub entries: Vec<EntryWire>,
}

impl RepoOutput {
    pub fn new(access_key: &AccessKey, meta: &RepoMeta, entries: &EntryCollection) -> Self {
        Self {
            access_key: access_key.to_string(),
            title: meta.title.clone(),
            description: meta.description.clone(),
            is_private: meta.is_private,
            entries: entries.iter().map(EntryWire::from).collect(),
        }
    }
}

/// Client configuration from `--api-url`, else from the environment.
pub fn resolve_config(api_url: Option<String>) -> Result<ClientConfig, CliError> {
    let config = match api_url {
        Some(url) => ClientConfig::new(url)?,
        None => ClientConfig::from_env()?,
    };
    Ok(config)
}

pub fn open_transport(api_url: Option<String>) -> Result<HttpTransport, CliError> {
    let config = resolve_config(api_url)?;
    Ok(HttpTransport::new(&config)?)
}

pub async fn open_repo<T: EntryTransport>(transport: &T, key: &str) -> Result<Repo, CliError> {
    let key = AccessKey::parse(key)?;
    Ok(Repo::load(transport, &key).await?)
}

/// Commit pending changes and print the outcome.
pub async fn commit_and_report<T: EntryTransport>(
    repo: &Repo,
    transport: &T,
) -> Result<(), CliError> {
    let outcome = repo.commit(transport).await?;
    println!("{}", outcome.message());
    Ok(())
}

pub fn format_repo_header(key: &AccessKey, meta: &RepoMeta) -> Vec<String> {
    let visibility = if meta.is_private { "private" } else { "public" };
    let mut lines = vec![format!("{} ({key}, {visibility})", meta.display_title())];
    if let Some(description) = meta.description.as_deref() {
        lines.push(description.to_string());
    }
    lines
}

pub fn format_entry_lines(entries: &EntryCollection) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut line = format!(
                "[{index}] {}: {}",
                entry.kind().as_str(),
                entry.variant.title()
            );
            if let Some(url) = entry.variant.url() {
                line.push_str(&format!(" <{url}>"));
            }
            let rating = entry.variant.rating();
            if rating > 0 {
                line.push_str(&format!(" {rating}/5"));
            }
            line
        })
        .collect()
}
