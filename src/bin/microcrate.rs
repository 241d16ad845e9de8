use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use microcrate::Engine;

#[derive(Parser, Debug)]
#[command(
    name = "microcrate",
    about = "A minimal full-text search engine",
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    /// Base directory holding the index, documents and stats.json (defaults
    /// to ~/.microcrate)
    #[arg(short = 'd', long = "dir", global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Index a single JSON document (read from a file, or stdin if omitted)
    Index {
        /// Document id
        #[arg(short = 'i', long = "id")]
        id: String,
        /// Path to a JSON file carrying at least a `text` field
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,
    },
    /// Run a keyword query against the index
    Search {
        /// Query string
        query: String,
        #[arg(short = 'o', long = "offset", default_value_t = 0)]
        offset: usize,
        #[arg(short = 'l', long = "limit", default_value_t = 20)]
        limit: usize,
    },
}

fn default_base_dir() -> PathBuf {
    let mut dir = home::home_dir().unwrap_or_else(|| Path::new(".").to_path_buf());
    dir.push(".microcrate");
    dir
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let base_dir = args.base_dir.unwrap_or_else(default_base_dir);
    let engine = Engine::open(&base_dir)
        .with_context(|| format!("opening engine at {}", base_dir.display()))?;

    match args.command {
        Commands::Index { id, file } => {
            let raw = match file {
                Some(path) => {
                    std::fs::read_to_string(&path).with_context(|| format!("reading {path:?}"))?
                }
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading document from stdin")?;
                    buf
                }
            };
            let document: serde_json::Value =
                serde_json::from_str(&raw).context("parsing document JSON")?;

            engine
                .index(&id, &document)
                .with_context(|| format!("indexing document {id:?}"))?;
            println!("Indexed {id}");
        }
        Commands::Search {
            query,
            offset,
            limit,
        } => {
            let result = engine
                .search(&query, offset, limit)
                .context("running search")?;

            if result.total_hits == 0 {
                eprintln!("No results");
                return Ok(());
            }

            println!("{} total hits", result.total_hits);
            for hit in &result.results {
                println!("{hit}");
            }
        }
    }

    Ok(())
}
