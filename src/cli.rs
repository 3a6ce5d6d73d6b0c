//! CLI module - command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use marginalia::anchor::{compare_anchors, Anchor, DocumentSelection, Highlighter};
use marginalia::annotations::{Annotation, AnnotationStore, IdentityProvider};
use marginalia::config::Config;
use marginalia::document::Document;
use marginalia::persistence::{FileKeyValue, PersistenceBridge, QueuedBridge};
use marginalia::sidebar;

/// marginalia - durable highlights and notes for XHTML documents.
#[derive(Parser, Debug)]
#[command(name = "marginalia")]
#[command(
    author,
    version,
    about,
    long_about = r#"marginalia anchors highlights to text spans of an XHTML document and keeps
them, with optional notes, in a JSON annotation store.

Storage location and key come from MARGINALIA_DATA_DIR / MARGINALIA_STORAGE_KEY
(or a .env file) and can be overridden per invocation.

Examples:
    marginalia add chapter1.xhtml --chars 10:42 --note "check this"
    marginalia list --format md --sorted
    marginalia note <ID> "rewritten note"
    marginalia show chapter1.xhtml <ID>
    marginalia remove <ID>
"#
)]
pub struct Cli {
    /// Directory holding the annotation store.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage key the annotation set is saved under.
    #[arg(long, global = true, value_name = "KEY")]
    pub key: Option<String>,

    /// Let add/note/remove replace a stored set that cannot be read.
    #[arg(long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Highlight a character span of a document and store it.
    #[command(
        long_about = "Parse FILE, select the character span START:END of its rendered text\n\
(end exclusive), build an anchor from the selection and add it to the store.\n\n\
The new annotation is printed as JSON.\n\n\
Examples:\n\
  marginalia add chapter1.xhtml --chars 0:5\n\
  marginalia add chapter1.xhtml --chars 120:180 --note \"compare with ch. 3\"\n"
    )]
    Add {
        /// XHTML document to highlight in.
        file: PathBuf,

        /// Character span of the rendered text.
        #[arg(long, value_name = "START:END", value_parser = parse_char_span)]
        chars: CharSpan,

        /// Attach a note to the new annotation.
        #[arg(long)]
        note: Option<String>,
    },

    /// Print stored annotations.
    List {
        /// Output format.
        #[arg(long, value_enum, default_value_t = ListFormat::Json)]
        format: ListFormat,

        /// Order by document position instead of creation order.
        #[arg(long)]
        sorted: bool,
    },

    /// Replace the note of an annotation.
    Note {
        id: String,
        text: String,
    },

    /// Delete an annotation.
    Remove {
        id: String,
    },

    /// Resolve a stored annotation against a document.
    Show {
        /// XHTML document the annotation was made in.
        file: PathBuf,
        id: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Json,
    Md,
}

/// Half-open character span `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

fn parse_char_span(value: &str) -> Result<CharSpan, String> {
    let (start, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", value))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start offset '{}'", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end offset '{}'", end))?;
    if end < start {
        return Err(format!("end {} is before start {}", end, start));
    }
    Ok(CharSpan { start, end })
}

type CliStore = AnnotationStore<QueuedBridge<FileKeyValue>, Box<dyn IdentityProvider>>;

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().with_overrides(cli.data_dir, cli.key);
    info!(
        data_dir = %config.storage.data_dir.display(),
        key = %config.storage.key,
        "Using annotation store"
    );

    let force = cli.force;

    match cli.command {
        Commands::Add { file, chars, note } => {
            let document = read_document(&file)?;
            let anchor = anchor_span(&document, chars)?;

            let mut store = open_store(&config, force)?;
            let id = store.add(anchor)?;
            if let Some(note) = note {
                store.update(&id, note)?;
            }
            store
                .bridge()
                .flush()
                .await
                .context("Failed to save annotations")?;

            let annotation = store
                .get(&id)
                .context("Annotation missing after add")?;
            println!("{}", serde_json::to_string_pretty(annotation)?);
        }

        Commands::List { format, sorted } => {
            let mut list = open_readonly(&config)?;
            if sorted {
                list.sort_by(|a, b| compare_anchors(&a.anchor, &b.anchor));
            }
            match format {
                ListFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
                ListFormat::Md => print!("{}", sidebar::render_markdown(&list)),
            }
        }

        Commands::Note { id, text } => {
            let mut store = open_store(&config, force)?;
            if store.get(&id).is_none() {
                bail!("No annotation with id '{}'", id);
            }
            store.update(&id, text)?;
            store
                .bridge()
                .flush()
                .await
                .context("Failed to save annotations")?;
        }

        Commands::Remove { id } => {
            let mut store = open_store(&config, force)?;
            if store.get(&id).is_none() {
                bail!("No annotation with id '{}'", id);
            }
            store.remove(&id)?;
            store
                .bridge()
                .flush()
                .await
                .context("Failed to save annotations")?;
        }

        Commands::Show { file, id } => {
            let list = open_readonly(&config)?;
            let annotation = list
                .iter()
                .find(|a| a.id() == id)
                .with_context(|| format!("No annotation with id '{}'", id))?;
            let document = read_document(&file)?;

            let current = annotation
                .anchor
                .resolve(&document)
                .and_then(|range| document.text_in_range(&range));
            let report = serde_json::json!({
                "id": annotation.id(),
                "stored": annotation.text(),
                "current": current,
                "resolved": current.is_some(),
                "note": annotation.note(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<Document> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Document::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Select `span` in `document` and turn it into an anchor
fn anchor_span(document: &Document, span: CharSpan) -> Result<Anchor> {
    let mut selection = DocumentSelection::new(document);
    selection
        .select(span.start, span.end)
        .context("Invalid character span")?;

    let mut created = None;
    let handed_off = Highlighter::new(selection, |anchor| created = Some(anchor))
        .trigger()
        .context("Selection is not attached to the document")?;

    match created {
        Some(anchor) if handed_off => Ok(anchor),
        _ => bail!("Selection {}:{} contains no text", span.start, span.end),
    }
}

/// Open the store for a mutating command
///
/// An unreadable stored set would be replaced by the first save, so it is
/// refused unless `force` is set.
fn open_store(config: &Config, force: bool) -> Result<CliStore> {
    let bridge = QueuedBridge::spawn(Arc::new(config.file_store()), config.storage.key.as_str());
    if let Err(e) = bridge.load_strict() {
        if !force {
            return Err(anyhow::Error::new(e).context(format!(
                "Stored annotations in {} are unreadable; pass --force to replace them",
                config.storage.data_dir.display()
            )));
        }
        warn!("Replacing unreadable annotations: {}", e);
    }
    Ok(AnnotationStore::new(bridge, config.identity()))
}

/// Strict read for commands that only inspect the store
fn open_readonly(config: &Config) -> Result<Vec<Annotation>> {
    config.bridge().load_strict().with_context(|| {
        format!(
            "Failed to read annotations from {}",
            config.storage.data_dir.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_char_span() {
        assert_eq!(parse_char_span("3:9"), Ok(CharSpan { start: 3, end: 9 }));
        assert_eq!(parse_char_span("4:4"), Ok(CharSpan { start: 4, end: 4 }));
        assert!(parse_char_span("9:3").is_err());
        assert!(parse_char_span("12").is_err());
        assert!(parse_char_span("a:b").is_err());
    }

    #[test]
    fn test_anchor_span() {
        let doc = Document::parse("<body><p>Hello world</p></body>").unwrap();
        let anchor = anchor_span(&doc, CharSpan { start: 6, end: 11 }).unwrap();

        assert_eq!(anchor.text, "world");
        assert_eq!(anchor.start_path, vec![0, 0, 0]);
        assert_eq!((anchor.start_offset, anchor.end_offset), (6, 11));
    }

    #[test]
    fn test_blank_span_rejected() {
        let doc = Document::parse("<body><p>a   b</p></body>").unwrap();
        assert!(anchor_span(&doc, CharSpan { start: 1, end: 4 }).is_err());
        assert!(anchor_span(&doc, CharSpan { start: 2, end: 2 }).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "marginalia",
            "--data-dir",
            "/tmp/d",
            "add",
            "ch1.xhtml",
            "--chars",
            "0:5",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert!(matches!(
            cli.command,
            Commands::Add { chars: CharSpan { start: 0, end: 5 }, note: None, .. }
        ));
    }
}
