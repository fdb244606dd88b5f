use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::io::{stdin, stdout};
use tower_lsp_server::ls_types::Position;
use tower_lsp_server::{LspService, Server};

use marko_ls::analysis::{resolve_definition, resolve_scope};
use marko_ls::lsp::{MarkoLs, load_settings};
use marko_ls::taglib::{DiscoveryOptions, TaglibCache, find_project_root};
use marko_ls::text::PositionMapper;
use marko_ls::{LspError, LspResult};

/// A Language Server Protocol (LSP) server for Marko templates
#[derive(Parser)]
#[command(name = "marko-ls")]
#[command(version)]
#[command(about = "A Language Server Protocol (LSP) server for Marko templates")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the scope and definition targets at a position as JSON
    Inspect {
        /// The template file to inspect
        file: PathBuf,

        /// Zero-based line
        #[arg(long)]
        line: u32,

        /// Zero-based UTF-16 column
        #[arg(long)]
        character: u32,
    },
}

#[tokio::main]
async fn main() {
    // stdout carries the protocol; logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect {
            file,
            line,
            character,
        }) => {
            if let Err(e) = inspect(&file, Position::new(line, character)).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            let (service, socket) = LspService::new(MarkoLs::new);
            Server::new(stdin(), stdout(), socket).serve(service).await;
        }
    }
}

async fn inspect(file: &Path, position: Position) -> LspResult<()> {
    let file = std::path::absolute(file)?;
    let text = tokio::fs::read_to_string(&file).await?;
    let offset = PositionMapper::new(&text)
        .position_to_byte(position)
        .ok_or_else(|| {
            LspError::config(format!(
                "line {} is past the end of {}",
                position.line,
                file.display()
            ))
        })?;

    let project_root = file.parent().map(find_project_root);
    let outcome = load_settings(project_root.as_deref(), &[]);
    for event in &outcome.events {
        log::info!(target: "marko_ls::inspect", "{}", event.message);
    }
    let settings = outcome.settings.unwrap_or_default();
    let registry = TaglibCache::new(DiscoveryOptions::from(&settings));
    if let Some(dir) = file.parent() {
        registry.preload(dir).await;
    }

    let scope = resolve_scope(offset, &text);
    let definitions = resolve_definition(&registry, &file, &text, offset, &settings).await?;

    let report = json!({
        "offset": offset,
        "scope": scope,
        "definitions": definitions
            .iter()
            .map(|target| json!({ "uri": target.uri.as_str(), "range": target.range }))
            .collect::<Vec<_>>(),
    });
    match serde_json::to_string_pretty(&report) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => eprintln!("Error: {}", e),
    }
    Ok(())
}
