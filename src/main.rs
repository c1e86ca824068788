use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use pblcodec::codec::is_source_entry;
use pblcodec::config::Config;
use pblcodec::store::MemoryStore;
use pblcodec::{CowBuffer, EntryCodec};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pblcodec", version, about = "Export and import library entries")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "PBLCODEC_CONFIG")]
    config: Option<PathBuf>,

    /// Store snapshot, overrides the configured path
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty library
    Init {
        library: String,
        /// Store text as ANSI instead of the configured default
        #[arg(long, conflicts_with = "unicode")]
        ansi: bool,
        /// Store text as UTF-16 instead of the configured default
        #[arg(long)]
        unicode: bool,
    },
    /// List the entries of a library
    List { library: String },
    /// Print an entry, or write its content to a file
    Export {
        library: String,
        entry: String,
        /// Write the raw content here instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the comment instead of the content
        #[arg(long)]
        comment: bool,
    },
    /// Store the contents of a file as an entry
    Import {
        library: String,
        entry: String,
        file: PathBuf,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Remove an entry
    Delete { library: String, entry: String },
}

fn host_text(text: &str, unicode: bool) -> CowBuffer {
    if unicode { CowBuffer::from_wide_str(text) } else { CowBuffer::from_narrow_text(text) }
}

fn run(command: Command, config: &Config, store: Arc<MemoryStore>) -> anyhow::Result<bool> {
    let codec = EntryCodec::new(store.clone());

    match command {
        Command::Init { library, ansi, unicode } => {
            let unicode = unicode || (config.store.unicode && !ansi);
            if !store.create_library(&library, unicode) {
                bail!("Library already exists: {library}");
            }
            tracing::info!(%library, unicode, "Library created");
            Ok(true)
        }
        Command::List { library } => {
            let mut stdout = std::io::stdout().lock();
            for entry in codec.entries(&library)? {
                let kind = if entry.is_source() { "source" } else { "binary" };
                writeln!(stdout, "{}\t{kind}\t{}", entry.mod_time.to_rfc3339(), entry.name_text())?;
            }
            Ok(false)
        }
        Command::Export { library, entry, out, comment } => {
            let exported = codec.export_entry(&library, &entry)?;
            let buffer = if comment { &exported.comment } else { &exported.data };
            match (out, buffer.to_text()) {
                (Some(path), _) => {
                    std::fs::write(&path, buffer.bytes())
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(%entry, path = %path.display(), bytes = buffer.bytes().len(), "Entry exported");
                }
                (None, Some(text)) => println!("{text}"),
                (None, None) => bail!("Entry {entry} holds binary content, use --out"),
            }
            Ok(false)
        }
        Command::Import { library, entry, file, comment } => {
            let unicode = store.library(&library).map(|l| l.unicode).unwrap_or(false);
            let bytes =
                std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let data = if is_source_entry(&entry) {
                let text = String::from_utf8(bytes)
                    .with_context(|| format!("Source file {} is not UTF-8", file.display()))?;
                host_text(&text, unicode)
            } else {
                CowBuffer::from_bytes(pblcodec::Encoding::Binary, &bytes)
            };
            let comment = comment.map(|c| host_text(&c, unicode)).unwrap_or_default();
            codec.import_entry(&library, &entry, data, comment, Some(Utc::now()))?;
            tracing::info!(%library, %entry, "Entry imported");
            Ok(true)
        }
        Command::Delete { library, entry } => {
            codec.delete_entry(&library, &entry)?;
            tracing::info!(%library, %entry, "Entry deleted");
            Ok(true)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let snapshot = cli.snapshot.unwrap_or_else(|| PathBuf::from(&config.store.snapshot_path));
    let store = Arc::new(MemoryStore::load(&snapshot)?);
    tracing::debug!(snapshot = %snapshot.display(), libraries = store.library_names().len(), "Store loaded");

    if run(cli.command, &config, store.clone())? {
        store.save(&snapshot)?;
    }
    Ok(())
}
