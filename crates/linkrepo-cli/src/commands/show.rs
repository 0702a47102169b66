use linkrepo_core::EntryTransport;

use crate::commands::common::{format_entry_lines, format_repo_header, open_repo, RepoOutput};
use crate::error::CliError;

pub async fn run_show<T: EntryTransport>(
    transport: &T,
    key: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let repo = open_repo(transport, key).await?;
    let entries = repo.lock().await;

    if as_json {
        let output = RepoOutput::new(repo.access_key(), repo.meta(), &entries);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for line in format_repo_header(repo.access_key(), repo.meta()) {
        println!("{line}");
    }
    if entries.is_empty() {
        println!("No entries yet.");
    }
    for line in format_entry_lines(&entries) {
        println!("{line}");
    }
    Ok(())
}
