use linkrepo_core::util::normalize_text_option;
use linkrepo_core::{EntryPatch, EntryTransport, EntryVariant};

use crate::cli::EditFields;
use crate::commands::common::{commit_and_report, open_repo};
use crate::error::CliError;

pub async fn run_add_link<T: EntryTransport>(
    transport: &T,
    key: &str,
    url: &str,
) -> Result<(), CliError> {
    let repo = open_repo(transport, key).await?;
    repo.add_link(transport, url).await?;
    commit_and_report(&repo, transport).await
}

pub async fn run_add<T: EntryTransport>(
    transport: &T,
    key: &str,
    variant: EntryVariant,
) -> Result<(), CliError> {
    let repo = open_repo(transport, key).await?;
    repo.lock().await.append(variant)?;
    commit_and_report(&repo, transport).await
}

pub async fn run_edit<T: EntryTransport>(
    transport: &T,
    key: &str,
    index: usize,
    fields: &EditFields,
) -> Result<(), CliError> {
    let patch = build_entry_patch(fields)?;
    let repo = open_repo(transport, key).await?;
    repo.lock().await.edit(index, &patch)?;
    commit_and_report(&repo, transport).await
}

pub async fn run_move<T: EntryTransport>(
    transport: &T,
    key: &str,
    index: usize,
    delta: isize,
) -> Result<(), CliError> {
    let repo = open_repo(transport, key).await?;
    let target = repo.lock().await.move_by(index, delta)?;
    tracing::debug!(from = index, to = target, "Moved entry");
    commit_and_report(&repo, transport).await
}

pub async fn run_delete<T: EntryTransport>(
    transport: &T,
    key: &str,
    index: usize,
) -> Result<(), CliError> {
    let repo = open_repo(transport, key).await?;
    repo.lock().await.remove_at(index)?;
    commit_and_report(&repo, transport).await
}

/// Turn edit flags into a patch; an empty `--url`/`--image` clears the field.
pub fn build_entry_patch(fields: &EditFields) -> Result<EntryPatch, CliError> {
    let patch = EntryPatch {
        kind: fields.kind.map(Into::into),
        title: fields.title.clone(),
        description: fields.description.clone(),
        image: fields
            .image
            .clone()
            .map(|image| normalize_text_option(Some(image))),
        url: fields.url.clone().map(|url| normalize_text_option(Some(url))),
        rating: fields.rating,
    };
    if patch.is_empty() {
        return Err(CliError::EmptyEdit);
    }
    Ok(patch)
}
