//! JSON shapes exchanged with the remote store

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::entry::{Entry, EntryFields, EntryId, EntryKind, EntryPatch, EntryVariant, MAX_RATING};
use super::repo::{AccessKey, RepoMeta};
use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// One entry as sent to and received from the server.
///
/// `id` is negative (or absent) for entries the server has not created yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: u8,
    #[serde(default)]
    pub sequence: Option<usize>,
}

impl From<&Entry> for EntryWire {
    fn from(entry: &Entry) -> Self {
        let fields = entry.variant.to_fields();
        Self {
            id: Some(entry.id),
            title: fields.title,
            description: fields.description,
            image: fields.image,
            url: fields.url,
            kind: entry.kind().as_str().to_string(),
            rating: fields.rating,
            sequence: Some(entry.sequence),
        }
    }
}

impl EntryWire {
    /// Decode an entry reported by the server.
    ///
    /// Entries without a `sequence` sort after every sequenced entry.
    pub fn into_server_entry(self) -> Result<Entry> {
        let id = self
            .id
            .filter(|id| !id.is_placeholder() && id.get() != 0)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "server entry '{}' has no server-assigned id",
                    self.title
                ))
            })?;
        let kind: EntryKind = self.kind.parse()?;
        let variant = EntryVariant::from_fields(
            kind,
            EntryFields {
                title: self.title,
                description: self.description,
                image: self.image,
                url: self.url,
                rating: self.rating.min(MAX_RATING),
            },
        )?;
        Ok(Entry::from_server(
            id,
            variant,
            self.sequence.unwrap_or(usize::MAX),
        ))
    }
}

/// A repo with its entries, as returned by the fetch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoWire {
    pub access_key: AccessKey,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default)]
    pub last_visited: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<EntryWire>,
}

impl RepoWire {
    pub fn meta(&self) -> RepoMeta {
        RepoMeta {
            title: self.title.clone(),
            description: self.description.clone(),
            is_private: self.is_private,
            last_visited: self.last_visited,
        }
    }

    /// Decode every entry; fails on the first entry with an unknown kind.
    pub fn server_entries(self) -> Result<Vec<Entry>> {
        self.entries
            .into_iter()
            .map(EntryWire::into_server_entry)
            .collect()
    }
}

/// Page metadata scraped for a link (Open Graph tags, title, meta description).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl LinkMetadata {
    /// Fields worth copying onto the entry; blank values are ignored.
    ///
    /// The page title wins over the site name.
    pub fn to_patch(&self) -> EntryPatch {
        EntryPatch {
            kind: None,
            title: normalize_text_option(self.title.clone())
                .or_else(|| normalize_text_option(self.site_name.clone())),
            description: normalize_text_option(self.description.clone()),
            image: normalize_text_option(self.image.clone()).map(Some),
            url: normalize_text_option(self.url.clone()).map(Some),
            rating: None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
