use anyhow::{Context, Result};
use archiver_core::config;
use archiver_core::config::AppConfig;
use archiver_core::filename;
use archiver_core::search::SearchScope;
use clap::{Parser, Subcommand};
use cli::output::{edit_from_args, parse_status, print_documents};
use cli::session::open_store;
use cli::watch::watch_folders;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Commands::Parse { filename, json } = &cli.command {
        return run_parse(filename, *json);
    }
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::List {
            terms,
            year,
            status,
            json,
        } => run_list(cfg, terms, year, status, json).await,
        Commands::Tags { terms, json } => {
            let store = open_store(&cfg).await?;
            print_tags(&store.available_tags(&terms), json)
        }
        Commands::Similar { tags, json } => {
            let store = open_store(&cfg).await?;
            let found = match tags.as_slice() {
                [tag] => store.similar_tags(tag),
                _ => store.associated_tags(&tags),
            };
            print_tags(&found, json)
        }
        Commands::Next { json } => {
            let store = open_store(&cfg).await?;
            match store.next_untagged() {
                Some(doc) => print_documents(&[doc], json),
                None => {
                    println!("nothing left to tag");
                    Ok(())
                }
            }
        }
        Commands::Archive {
            path,
            date,
            description,
            tags,
        } => {
            let edit = edit_from_args(date.as_deref(), description.as_deref(), tags.as_deref())?;
            let store = open_store(&cfg).await?;
            let doc = store.archive(&absolute(&path)?, &edit)?;
            store.settle().await;
            println!("archived to {}", doc.path().display());
            Ok(())
        }
        Commands::Edit {
            path,
            date,
            description,
            tags,
        } => {
            let edit = edit_from_args(date.as_deref(), description.as_deref(), tags.as_deref())?;
            if edit.is_empty() {
                anyhow::bail!("nothing to change: pass --date, --description or --tags");
            }
            let store = open_store(&cfg).await?;
            let doc = store.update(&absolute(&path)?, &edit)?;
            store.settle().await;
            print_documents(&[doc], false)
        }
        Commands::Delete { path } => {
            let store = open_store(&cfg).await?;
            store.delete(&absolute(&path)?)?;
            store.settle().await;
            println!("deleted {}", path.display());
            Ok(())
        }
        Commands::Download { path } => {
            let store = open_store(&cfg).await?;
            store.download(&absolute(&path)?)?;
            println!("download requested for {}", path.display());
            Ok(())
        }
        Commands::Watch { json } => watch_folders(cfg, json).await,
        Commands::Parse { .. } => Ok(()),
    }
}

#[derive(Parser)]
#[command(name = "archiver")]
#[command(about = "Index, search and archive scanned documents", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents, newest last
    List {
        /// Only documents whose filename contains every term
        terms: Vec<String>,
        /// Restrict to one year folder of the archive
        #[arg(long)]
        year: Option<String>,
        /// tagged|untagged
        #[arg(long)]
        status: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Known tags, optionally only those containing a term
    Tags {
        terms: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Tags that have been used together with all given tags
    Similar {
        #[arg(required = true)]
        tags: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// The next local document that still needs tagging
    Next {
        #[arg(long)]
        json: bool,
    },
    /// Describe a document and move it to <archive>/<year>/
    Archive {
        path: PathBuf,
        /// yyyy-mm-dd
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Change a document's metadata without moving it
    Edit {
        path: PathBuf,
        /// yyyy-mm-dd
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a document (to the trash when providers.use_trash is set)
    Delete { path: PathBuf },
    /// Ask the sync client to download a remote document
    Download { path: PathBuf },
    /// Show what is read from a filename
    Parse {
        filename: String,
        #[arg(long)]
        json: bool,
    },
    /// Keep the index live and report changes until interrupted
    Watch {
        /// One JSON summary per line
        #[arg(long)]
        json: bool,
    },
}

async fn run_list(
    cfg: AppConfig,
    terms: Vec<String>,
    year: Option<String>,
    status: Option<String>,
    json: bool,
) -> Result<()> {
    let status = status.as_deref().map(parse_status).transpose()?;
    let scope = year.map(SearchScope::Year).unwrap_or_default();
    let store = open_store(&cfg).await?;
    let docs = store.query(&scope, &terms, status);
    print_documents(&docs, json)
}

fn print_tags(tags: &BTreeSet<String>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(tags)?);
    } else {
        for tag in tags {
            println!("{tag}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ParsedName {
    date: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    tagged: bool,
    date_from_prefix: bool,
}

fn run_parse(name: &str, json: bool) -> Result<()> {
    let name = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{name:?} has no file name"))?;
    let parsed = filename::parse(&name);
    let view = ParsedName {
        date: parsed.date.map(|d| d.format("%Y-%m-%d").to_string()),
        description: parsed.description,
        tags: parsed.tags.unwrap_or_default(),
        tagged: filename::tagging_status(&name) == archiver_core::TaggingStatus::Tagged,
        date_from_prefix: filename::has_filename_date(&name),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("date:        {}", view.date.as_deref().unwrap_or("-"));
        println!("description: {}", view.description.as_deref().unwrap_or("-"));
        println!("tags:        {}", view.tags.join(", "));
        println!("tagged:      {}", view.tagged);
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("resolving {}", path.display()))
}
