//! inatindex: supercategory-filtered image datasets from iNaturalist manifests.
//!
//! A split manifest (`train2018.json`, `val2018.json`, `test2018.json`) lists
//! annotation, image and category records in three positionally aligned
//! arrays. This crate indexes the records whose supercategory is selected and
//! serves `(image, label)` pairs by position, loading each image from disk on
//! demand.
//!
//! # Modules
//!
//! - [`manifest`]: manifest record types and JSON reading
//! - [`index`]: the supercategory filter and the resulting [`index::FilteredIndex`]
//! - [`dataset`]: lazy random access to images and labels
//! - [`config`]: splits and config files
//! - [`diagnostics`]: injected sinks for construction diagnostics
//! - [`error`]: error types

pub mod config;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod manifest;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use config::{DatasetConfig, Split};
pub use dataset::{DatasetBuilder, IndexedImageDataset};
pub use error::DatasetError;
pub use index::{FilteredIndex, SupercategoryFilter};

use config::{Preset, SupercategorySelection};
use diagnostics::LogSink;

/// The inatindex CLI application.
#[derive(Parser)]
#[command(name = "inatindex")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print classes and images per supercategory.
    Summary(SummaryArgs),
    /// Write the filtered entries as CSV.
    List(ListArgs),
    /// Load one image and print its label.
    Get(GetArgs),
}

/// Options shared by every subcommand that opens a dataset.
#[derive(clap::Args)]
struct SelectionArgs {
    /// Dataset root directory (overrides `root` from --config).
    root: Option<PathBuf>,

    /// Split to read: train, val or test.
    #[arg(long)]
    split: Option<String>,

    /// Keep this supercategory (repeatable). Defaults to the built-in ten.
    #[arg(long = "supercategory", value_name = "NAME", conflicts_with = "all")]
    supercategories: Vec<String>,

    /// Keep every supercategory.
    #[arg(long)]
    all: bool,

    /// YAML or JSON config file with root, split and supercategories.
    #[arg(long, env = "INATINDEX_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the summary subcommand.
#[derive(clap::Args)]
struct SummaryArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output format for the summary.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// Arguments for the list subcommand.
#[derive(clap::Args)]
struct ListArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Arguments for the get subcommand.
#[derive(clap::Args)]
struct GetArgs {
    /// Position in the filtered index.
    #[arg(long, allow_negative_numbers = true)]
    index: i64,

    #[command(flatten)]
    selection: SelectionArgs,
}

/// Run the inatindex CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DatasetError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Summary(args)) => run_summary(args),
        Some(Commands::List(args)) => run_list(args),
        Some(Commands::Get(args)) => run_get(args),
        None => {
            println!("inatindex {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Supercategory-filtered indexes over iNaturalist manifests.");
            println!();
            println!("Run 'inatindex --help' for usage information.");
            Ok(())
        }
    }
}

/// Merges a config file (if any) with command-line flags; flags win.
fn resolve_selection(args: SelectionArgs) -> Result<DatasetConfig, DatasetError> {
    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_path(path)?,
        None => DatasetConfig::default(),
    };

    if let Some(root) = args.root {
        config.root = Some(root);
    }
    if let Some(split) = args.split {
        config.split = split.parse()?;
    }
    if args.all {
        config.supercategories = Some(SupercategorySelection::Named(Preset::All));
    } else if !args.supercategories.is_empty() {
        config.supercategories = Some(SupercategorySelection::List(args.supercategories));
    }

    Ok(config)
}

fn open_dataset(args: SelectionArgs) -> Result<IndexedImageDataset, DatasetError> {
    let config = resolve_selection(args)?;
    let root = config.root.clone().ok_or_else(|| DatasetError::ConfigParse {
        path: PathBuf::from("<command line>"),
        message: "no dataset root given (pass ROOT or set `root` in --config)".to_string(),
    })?;

    DatasetBuilder::new(root)
        .split(config.split)
        .supercategories(config.filter())
        .diagnostics(LogSink)
        .build()
}

/// Execute the summary subcommand.
fn run_summary(args: SummaryArgs) -> Result<(), DatasetError> {
    let dataset = open_dataset(args.selection)?;
    let summary = dataset.index().summary();

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| DatasetError::Io(e.into()))?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{summary}"),
    }
    Ok(())
}

/// Execute the list subcommand.
fn run_list(args: ListArgs) -> Result<(), DatasetError> {
    let dataset = open_dataset(args.selection)?;

    match &args.out {
        Some(path) => {
            let file = File::create(path).map_err(|source| DatasetError::FileAccess {
                path: path.clone(),
                source,
            })?;
            write_entries_csv(dataset.index(), file).map_err(|source| DatasetError::CsvWrite {
                path: path.clone(),
                source,
            })
        }
        None => write_entries_csv(dataset.index(), io::stdout().lock()).map_err(|source| {
            DatasetError::CsvWrite {
                path: PathBuf::from("<stdout>"),
                source,
            }
        }),
    }
}

/// Writes `index,file_name,class,supercategory` rows in index order.
pub fn write_entries_csv<W: Write>(index: &FilteredIndex, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["index", "file_name", "class", "supercategory"])?;
    for (position, entry) in index.entries().enumerate() {
        wtr.write_record([
            position.to_string().as_str(),
            entry.file_name,
            entry.class_label,
            entry.supercategory,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Execute the get subcommand.
fn run_get(args: GetArgs) -> Result<(), DatasetError> {
    let dataset = open_dataset(args.selection)?;
    let position = dataset.checked_position(args.index)?;
    let (image, label) = dataset.get(position)?;

    println!("index: {}", args.index);
    println!("file: {}", dataset.image_path(position)?.display());
    println!("class: {label}");
    println!("supercategory: {}", dataset.supercategory_target(position)?);
    println!("size: {}x{}", image.width(), image.height());
    Ok(())
}
