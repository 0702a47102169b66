//! Repo identity and metadata

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{fits_chars, normalize_text_option};

/// Longest repo title the server accepts.
pub const MAX_TITLE_CHARS: usize = 50;
/// Longest repo description the server accepts.
pub const MAX_DESCRIPTION_CHARS: usize = 300;

static ACCESS_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,64}$").expect("Invalid regex"));

/// The immutable key a repo is shared and edited under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessKey(String);

impl AccessKey {
    pub fn parse(raw: &str) -> Result<Self> {
        let key = raw.trim();
        if !ACCESS_KEY_RE.is_match(key) {
            return Err(Error::InvalidInput(format!(
                "access key must be 1-64 letters or digits, got '{key}'"
            )));
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccessKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccessKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<AccessKey> for String {
    fn from(key: AccessKey) -> Self {
        key.0
    }
}

/// Repo-level metadata, edited independently of entry sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_private: bool,
    pub last_visited: Option<NaiveDate>,
}

impl RepoMeta {
    /// Title to show, falling back the way the repo page does
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or("Untitled Repo")
    }

    pub(crate) fn apply(&mut self, patch: &RepoMetaPatch) {
        if let Some(title) = &patch.title {
            self.title = normalize_text_option(Some(title.clone()));
        }
        if let Some(description) = &patch.description {
            self.description = normalize_text_option(Some(description.clone()));
        }
        if let Some(is_private) = patch.is_private {
            self.is_private = is_private;
        }
    }
}

/// Partial update of a repo's metadata, sent as a PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoMetaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

impl RepoMetaPatch {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_private.is_none()
    }

    /// Check the limits the server enforces before spending a request on it.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidInput(
                "repo update must change at least one field".to_string(),
            ));
        }
        if let Some(title) = &self.title {
            if !fits_chars(title.trim(), MAX_TITLE_CHARS) {
                return Err(Error::InvalidInput(format!(
                    "repo title must be at most {MAX_TITLE_CHARS} characters"
                )));
            }
        }
        if let Some(description) = &self.description {
            if !fits_chars(description.trim(), MAX_DESCRIPTION_CHARS) {
                return Err(Error::InvalidInput(format!(
                    "repo description must be at most {MAX_DESCRIPTION_CHARS} characters"
                )));
            }
        }
        Ok(())
    }
}
