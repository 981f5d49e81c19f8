//! marginalia CLI tool
//!
//! Command-line host for marginalia-core: lists the annotations in a document and prints
//! the render plan a side panel would draw.
//!
//! ## Commands
//!
//! - `parse <path>`: annotation records in document order
//! - `plan <path>`: the render plan as JSON, honoring stored settings and a search query
//! - `settings <file>`: show stored settings, or apply a view action and save them
//! - `watch <path>`: print a fresh plan after every (debounced) change (`service` feature)

use clap::{Parser, Subcommand};
use marginalia_core::{
    config::{MemorySettingsStore, SettingsStore, TomlSettingsStore},
    host::FileDocumentSource,
    parser::parse,
    session::AnnotationSession,
    view_state::ViewAction,
};
use std::path::PathBuf;
#[cfg(feature = "service")]
use std::{sync::mpsc::channel, time::Duration};

#[derive(Parser)]
#[command(name = "marginalia")]
#[command(author, version, about = "List and index highlights, comments and footnotes in a document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the annotations found in a document
    Parse {
        /// Path to the document
        path: PathBuf,

        /// Emit JSON instead of one line per annotation
        #[arg(long)]
        json: bool,
    },

    /// Print the render plan for a document as JSON
    Plan {
        /// Path to the document
        path: PathBuf,

        /// Search query applied before grouping
        #[arg(short, long)]
        query: Option<String>,

        /// Settings file (toml). Defaults are used when omitted.
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Show the stored settings, or apply a view action and save the result
    Settings {
        /// Settings file (toml), created on first save
        path: PathBuf,

        /// View action as JSON, e.g. '{"type":"setFontSize","px":16}'
        action: Option<String>,
    },

    /// Watch a document and print a fresh render plan after each change
    #[cfg(feature = "service")]
    Watch {
        /// Path to the document
        path: PathBuf,

        /// Settings file (toml). Defaults are used when omitted.
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Quiet period in milliseconds before a change is processed
        #[arg(long, default_value_t = 300)]
        delay_ms: u64,

        /// Also refresh on the first change of a burst
        #[arg(long)]
        leading: bool,
    },
}

fn open_store(settings: Option<PathBuf>) -> Box<dyn SettingsStore> {
    match settings {
        Some(path) => Box::new(TomlSettingsStore::new(path)),
        None => Box::new(MemorySettingsStore::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { path, json } => {
            let text = std::fs::read_to_string(&path)?;
            let records = parse(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in records.iter() {
                    println!(
                        "{}:{}\t{}\t{}",
                        record.line + 1,
                        record.column + 1,
                        record.category,
                        record.text
                    );
                }
            }
            Ok(())
        }

        Commands::Plan {
            path,
            query,
            settings,
        } => {
            let source = FileDocumentSource::new(&path);
            let mut session = AnnotationSession::load(open_store(settings));
            if let Some(query) = query {
                let _ = session.apply(ViewAction::SetSearchQuery { query });
            }
            // Read errors surface here instead of becoming a "no document" plan.
            let text = source.read()?;
            let plan = session.render_text(text.as_deref());
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }

        Commands::Settings { path, action } => {
            let mut session = AnnotationSession::load(TomlSettingsStore::new(&path));
            if let Some(action) = action {
                let action: ViewAction = serde_json::from_str(&action)?;
                if session.apply(action).needs_persist() {
                    session.flush()?;
                }
            }
            println!("{}", toml::to_string(&session.state().persisted())?);
            Ok(())
        }

        #[cfg(feature = "service")]
        Commands::Watch {
            path,
            settings,
            delay_ms,
            leading,
        } => {
            use marginalia_core::{
                debounce::DebouncePolicy, event::Event, render::PlanBody, watch::WatchService,
            };
            use parking_lot::Mutex;
            use std::sync::Arc;

            let session = Arc::new(Mutex::new(AnnotationSession::load(open_store(settings))));
            let policy = DebouncePolicy {
                delay: Duration::from_millis(delay_ms),
                leading,
            };
            let (tx, rx) = channel::<Event>();
            let service = WatchService::new(path.clone(), session, policy, tx)?;

            println!(
                "Watching {} for changes. Press Ctrl-C to stop.",
                path.display()
            );

            let running = Arc::new(std::sync::atomic::AtomicBool::new(true));
            let r = running.clone();
            ctrlc::set_handler(move || {
                println!("\nShutting down...");
                r.store(false, std::sync::atomic::Ordering::SeqCst);
            })?;

            while running.load(std::sync::atomic::Ordering::SeqCst) {
                match rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(Event::Plan(plan)) => match &plan.body {
                        PlanBody::Sections { sections } => {
                            for section in sections.iter() {
                                println!("{} ({})", section.label(), section.count);
                                if section.collapsed {
                                    continue;
                                }
                                for record in section.records.iter() {
                                    println!(
                                        "  {}:{}  {}",
                                        record.line + 1,
                                        record.column + 1,
                                        record.text
                                    );
                                }
                            }
                        }
                        body => println!("{}", body.message().unwrap_or_default()),
                    },
                    Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                    Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }

            let refreshes = service.shutdown()?;
            println!("Shutdown complete ({refreshes} refreshes)");
            Ok(())
        }
    }
}
