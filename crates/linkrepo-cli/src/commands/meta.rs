use linkrepo_core::models::RepoMetaPatch;
use linkrepo_core::EntryTransport;

use crate::cli::MetaFields;
use crate::commands::common::{format_repo_header, open_repo};
use crate::error::CliError;

pub async fn run_meta<T: EntryTransport>(
    transport: &T,
    key: &str,
    fields: &MetaFields,
) -> Result<(), CliError> {
    let patch = build_meta_patch(fields)?;
    let mut repo = open_repo(transport, key).await?;
    repo.update_meta(transport, &patch).await?;

    for line in format_repo_header(repo.access_key(), repo.meta()) {
        println!("{line}");
    }
    Ok(())
}

pub fn build_meta_patch(fields: &MetaFields) -> Result<RepoMetaPatch, CliError> {
    let is_private = if fields.private {
        Some(true)
    } else if fields.public {
        Some(false)
    } else {
        None
    };
    let patch = RepoMetaPatch {
        title: fields.title.clone(),
        description: fields.description.clone(),
        is_private,
    };
    if patch.is_empty() {
        return Err(CliError::EmptyEdit);
    }
    Ok(patch)
}
