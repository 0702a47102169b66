//! Link Repo CLI - edit a repo's ordered entries from the terminal
//!
//! Every mutating command loads the repo, applies one edit and commits it.

mod cli;
mod commands;
mod error;

use clap::Parser;
use linkrepo_core::EntryVariant;

use crate::cli::{Cli, Commands};
use crate::commands::common::open_transport;
use crate::commands::entries::{run_add, run_add_link, run_delete, run_edit, run_move};
use crate::commands::meta::run_meta;
use crate::commands::show::run_show;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive: tracing_subscriber::filter::Directive = "linkrepo=info"
        .parse()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let cli = Cli::parse();
    let transport = open_transport(cli.api_url)?;

    match cli.command {
        Commands::Show { key, json } => run_show(&transport, &key, json).await?,
        Commands::AddLink { key, url } => run_add_link(&transport, &key, &url).await?,
        Commands::AddDivider { key } => {
            run_add(&transport, &key, EntryVariant::new_divider()).await?;
        }
        Commands::AddText { key } => {
            run_add(&transport, &key, EntryVariant::new_text_box()).await?;
        }
        Commands::Edit { key, index, fields } => {
            run_edit(&transport, &key, index, &fields).await?;
        }
        Commands::Move { key, index, delta } => run_move(&transport, &key, index, delta).await?,
        Commands::Delete { key, index } => run_delete(&transport, &key, index).await?,
        Commands::Meta { key, fields } => run_meta(&transport, &key, &fields).await?,
    }

    Ok(())
}
