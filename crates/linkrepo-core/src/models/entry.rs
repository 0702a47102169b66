//! Entry model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::edit::EditState;
use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// Highest star rating an entry can carry.
pub const MAX_RATING: u8 = 5;

/// Entry identifier: positive once assigned by the server, negative while a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Locally generated id for an entry the server has not created yet
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// The closed set of entry kinds, tagged on the wire as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Link,
    Divider,
    TextBox,
}

impl EntryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Divider => "divider",
            Self::TextBox => "text_box",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "link" => Ok(Self::Link),
            "divider" => Ok(Self::Divider),
            "text_box" => Ok(Self::TextBox),
            other => Err(Error::InvalidVariant(format!("unknown entry type '{other}'"))),
        }
    }
}

/// Flat view of every field any kind may use.
///
/// Used to move an entry between kinds and to and from the wire shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub rating: u8,
}

/// Kind-specific content of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryVariant {
    /// `url` is required when a link is created locally but may be missing
    /// on links the server already stores.
    Link {
        url: Option<String>,
        title: String,
        description: String,
        image: Option<String>,
        rating: u8,
    },
    Divider {
        title: String,
        url: Option<String>,
        rating: u8,
    },
    TextBox {
        title: String,
        description: String,
        image: Option<String>,
        url: Option<String>,
        rating: u8,
    },
}

impl EntryVariant {
    /// A link titled with its own URL until metadata arrives.
    pub fn new_link(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::Link {
            title: url.clone(),
            url: Some(url),
            description: String::new(),
            image: None,
            rating: 0,
        }
    }

    pub fn new_divider() -> Self {
        Self::Divider {
            title: "New Divider".to_string(),
            url: None,
            rating: 0,
        }
    }

    pub fn new_text_box() -> Self {
        Self::TextBox {
            title: "New Text Box".to_string(),
            description: "...".to_string(),
            image: None,
            url: None,
            rating: 0,
        }
    }

    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Link { .. } => EntryKind::Link,
            Self::Divider { .. } => EntryKind::Divider,
            Self::TextBox { .. } => EntryKind::TextBox,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Link { title, .. } | Self::Divider { title, .. } | Self::TextBox { title, .. } => {
                title
            }
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link { url, .. } | Self::Divider { url, .. } | Self::TextBox { url, .. } => {
                url.as_deref()
            }
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Link { description, .. } | Self::TextBox { description, .. } => {
                Some(description)
            }
            Self::Divider { .. } => None,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Link { image, .. } | Self::TextBox { image, .. } => image.as_deref(),
            Self::Divider { .. } => None,
        }
    }

    pub const fn rating(&self) -> u8 {
        match self {
            Self::Link { rating, .. } | Self::Divider { rating, .. } | Self::TextBox { rating, .. } => {
                *rating
            }
        }
    }

    pub fn to_fields(&self) -> EntryFields {
        EntryFields {
            title: self.title().to_string(),
            description: self.description().map(str::to_string),
            image: self.image().map(str::to_string),
            url: self.url().map(str::to_string),
            rating: self.rating(),
        }
    }

    /// Build a variant of `kind` from flat fields, dropping fields the kind does not use.
    pub fn from_fields(kind: EntryKind, fields: EntryFields) -> Result<Self> {
        let rating = validate_rating(fields.rating)?;
        let url = normalize_text_option(fields.url);
        let image = normalize_text_option(fields.image);
        let description = fields.description.unwrap_or_default();

        match kind {
            EntryKind::Link => Ok(Self::Link {
                url,
                title: fields.title,
                description,
                image,
                rating,
            }),
            EntryKind::Divider => Ok(Self::Divider {
                title: fields.title,
                url,
                rating,
            }),
            EntryKind::TextBox => Ok(Self::TextBox {
                title: fields.title,
                description,
                image,
                url,
                rating,
            }),
        }
    }
}

fn validate_rating(rating: u8) -> Result<u8> {
    if rating > MAX_RATING {
        return Err(Error::InvalidInput(format!(
            "rating must be between 0 and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(rating)
}

/// A single content unit in a repo's ordered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub variant: EntryVariant,
    /// Position in display order; always equals the entry's index in its collection
    pub sequence: usize,
    pub state: EditState,
    /// Collection revision of the last local mutation touching this entry
    pub(crate) touched: u64,
}

impl Entry {
    /// An entry as last reported by the server
    pub const fn from_server(id: EntryId, variant: EntryVariant, sequence: usize) -> Self {
        Self {
            id,
            variant,
            sequence,
            state: EditState::Original,
            touched: 0,
        }
    }

    pub(crate) const fn new_local(id: EntryId, variant: EntryVariant, sequence: usize) -> Self {
        Self {
            id,
            variant,
            sequence,
            state: EditState::created(),
            touched: 0,
        }
    }

    pub const fn kind(&self) -> EntryKind {
        self.variant.kind()
    }
}

/// A partial field update for one entry. `None` leaves a field untouched.
///
/// `image` and `url` are doubly optional so a patch can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub kind: Option<EntryKind>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Option<String>>,
    pub url: Option<Option<String>>,
    pub rating: Option<u8>,
}

impl EntryPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.url.is_none()
            && self.rating.is_none()
    }

    /// The variant that results from applying this patch; `current` is left untouched.
    pub fn apply(&self, current: &EntryVariant) -> Result<EntryVariant> {
        let mut fields = current.to_fields();
        if let Some(title) = &self.title {
            fields.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            fields.description = Some(description.clone());
        }
        if let Some(image) = &self.image {
            fields.image.clone_from(image);
        }
        if let Some(url) = &self.url {
            fields.url.clone_from(url);
        }
        if let Some(rating) = self.rating {
            fields.rating = rating;
        }
        let kind = self.kind.unwrap_or_else(|| current.kind());
        let variant = EntryVariant::from_fields(kind, fields)?;

        // A link being made here must point somewhere; stored links may lack a url.
        let touches_url = kind != current.kind() || self.url.is_some();
        if kind == EntryKind::Link && touches_url && variant.url().is_none() {
            return Err(Error::InvalidVariant(
                "link entries require a url".to_string(),
            ));
        }
        Ok(variant)
    }
}
