use clap::{Args, Parser, Subcommand, ValueEnum};
use linkrepo_core::EntryKind;

#[derive(Parser)]
#[command(name = "linkrepo")]
#[command(about = "Edit a Link Repo page from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides LINKREPO_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a repo and its entries
    Show {
        /// Repo access key
        key: String,
        /// Output entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append a link, filled in from the page's metadata
    AddLink {
        /// Repo access key
        key: String,
        /// Link URL
        url: String,
    },
    /// Append a divider
    AddDivider {
        /// Repo access key
        key: String,
    },
    /// Append a text box
    AddText {
        /// Repo access key
        key: String,
    },
    /// Change fields of an entry
    Edit {
        /// Repo access key
        key: String,
        /// Entry position, as printed by `show`
        index: usize,
        #[command(flatten)]
        fields: EditFields,
    },
    /// Move an entry up (negative) or down (positive), wrapping around the ends
    Move {
        /// Repo access key
        key: String,
        /// Entry position, as printed by `show`
        index: usize,
        /// Positions to move by
        #[arg(allow_negative_numbers = true)]
        delta: isize,
    },
    /// Delete an entry
    Delete {
        /// Repo access key
        key: String,
        /// Entry position, as printed by `show`
        index: usize,
    },
    /// Update the repo's title, description or visibility
    Meta {
        /// Repo access key
        key: String,
        #[command(flatten)]
        fields: MetaFields,
    },
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct EditFields {
    /// Switch the entry to another kind
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Image URL; pass an empty string to clear it
    #[arg(long)]
    pub image: Option<String>,
    /// Target URL; pass an empty string to clear it
    #[arg(long)]
    pub url: Option<String>,
    /// Rating from 0 to 5
    #[arg(long)]
    pub rating: Option<u8>,
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct MetaFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Hide the repo from public listing
    #[arg(long, conflicts_with = "public")]
    pub private: bool,
    /// Make the repo public
    #[arg(long)]
    pub public: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Link,
    Divider,
    TextBox,
}

impl From<KindArg> for EntryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Link => Self::Link,
            KindArg::Divider => Self::Divider,
            KindArg::TextBox => Self::TextBox,
        }
    }
}
