//! cwmed CLI
//!
//! Command-line driver for OMOP vocabulary crosswalks:
//! - Listing the vocabularies present in an Athena `CONCEPT.csv`
//! - Printing a source -> target crosswalk
//! - Saving the crosswalk and its failed mappings as CSV
//! - Fetching an Athena vocabulary bundle (feature `download`)

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use cwmed_io::{load_resolver, CrosswalkConfig, TableFormat};
use cwmed_vocab::CrosswalkResolver;
use std::path::{Path, PathBuf};

mod render;

#[derive(Parser)]
#[command(name = "cwmed")]
#[command(author, version, about = "Crosswalk codes between OMOP standardized vocabularies")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the distinct `vocabulary_id` values in a concept file.
    ///
    /// Use these labels as `--source-vocab` / `--target-vocab`.
    Vocabularies {
        /// Athena CONCEPT.csv
        concepts: PathBuf,
        /// Field delimiter of the concept file
        #[arg(long, default_value_t = '\t')]
        delimiter: char,
    },

    /// Print the crosswalk table.
    Show {
        #[command(flatten)]
        run: RunArgs,
        /// Print at most N rows
        #[arg(long)]
        limit: Option<usize>,
        /// Print only failed mappings
        #[arg(long)]
        failed: bool,
    },

    /// Save the crosswalk to CSV.
    Save {
        #[command(flatten)]
        run: RunArgs,
        /// Output CSV
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Save the failed mappings (rows with no target concept) to CSV.
    Failed {
        #[command(flatten)]
        run: RunArgs,
        /// Output CSV
        #[arg(short, long, default_value = "failed_mappings.csv")]
        out: PathBuf,
    },

    /// Download an Athena bundle and extract CONCEPT.csv and CONCEPT_RELATIONSHIP.csv.
    #[cfg(feature = "download")]
    Download {
        /// Bundle link from the Athena notification email
        #[arg(long)]
        url: String,
        /// Output directory
        #[arg(short, long, default_value = "data")]
        out: PathBuf,
    },
}

/// Inputs of one crosswalk run. Flags override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// JSON config file (see `CrosswalkConfig`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Source code list
    #[arg(long)]
    source: Option<PathBuf>,
    /// Column of the source code list holding the codes
    #[arg(long)]
    code_column: Option<String>,
    /// Athena CONCEPT.csv
    #[arg(long)]
    concepts: Option<PathBuf>,
    /// Athena CONCEPT_RELATIONSHIP.csv
    #[arg(long)]
    relationships: Option<PathBuf>,
    /// vocabulary_id of the source codes (e.g. ICD10CM)
    #[arg(long)]
    source_vocab: Option<String>,
    /// vocabulary_id to translate into (e.g. SNOMED)
    #[arg(long)]
    target_vocab: Option<String>,
    /// Field delimiter of the source code list
    #[arg(long)]
    source_delimiter: Option<char>,
    /// Field delimiter of the concept and relationship files
    #[arg(long)]
    vocab_delimiter: Option<char>,
}

impl RunArgs {
    fn into_config(self) -> Result<CrosswalkConfig> {
        let mut config = match &self.config {
            Some(path) => CrosswalkConfig::load(path)?,
            None => CrosswalkConfig::default(),
        };
        if let Some(v) = self.source {
            config.source_path = v;
        }
        if let Some(v) = self.code_column {
            config.source_code_column = v;
        }
        if let Some(v) = self.concepts {
            config.concept_path = v;
        }
        if let Some(v) = self.relationships {
            config.relationship_path = v;
        }
        if let Some(v) = self.source_vocab {
            config.source_vocab = v;
        }
        if let Some(v) = self.target_vocab {
            config.target_vocab = v;
        }
        if let Some(d) = self.source_delimiter {
            config.source_format = config.source_format.with_delimiter(d);
        }
        if let Some(d) = self.vocab_delimiter {
            config.vocabulary_format = config.vocabulary_format.with_delimiter(d);
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "cwmed=debug,cwmed_vocab=debug,cwmed_io=debug"
    } else {
        "cwmed=info,cwmed_vocab=info,cwmed_io=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Vocabularies {
            concepts,
            delimiter,
        } => cmd_vocabularies(&concepts, delimiter),
        Commands::Show { run, limit, failed } => cmd_show(run, limit, failed),
        Commands::Save { run, out } => cmd_save(run, &out),
        Commands::Failed { run, out } => cmd_failed(run, &out),
        #[cfg(feature = "download")]
        Commands::Download { url, out } => cmd_download(&url, &out),
    }
}

fn load(run: RunArgs) -> Result<CrosswalkResolver> {
    let resolver = load_resolver(&run.into_config()?)?;
    tracing::debug!(
        concepts = resolver.concept_index().len(),
        maps_to_edges = resolver.relationship_index().len(),
        "vocabulary indexes ready"
    );
    Ok(resolver)
}

fn cmd_vocabularies(concepts: &Path, delimiter: char) -> Result<()> {
    let table = cwmed_io::read_table(concepts, TableFormat::athena().with_delimiter(delimiter))?;
    for vocab in cwmed_vocab::list_vocabularies(&table)? {
        println!("{vocab}");
    }
    Ok(())
}

fn cmd_show(run: RunArgs, limit: Option<usize>, failed_only: bool) -> Result<()> {
    let resolver = load(run)?;
    let rows: Vec<_> = if failed_only {
        resolver.failed_rows()
    } else {
        resolver.rows().iter().collect()
    };
    let shown = limit.unwrap_or(rows.len()).min(rows.len());

    print!("{}", render::render_table(&resolver.header(), rows.iter().take(shown).copied()));
    if shown < rows.len() {
        println!("{}", format!("... {} more rows", rows.len() - shown).dimmed());
    }
    eprintln!("{}", render::render_summary(&resolver));
    Ok(())
}

fn cmd_save(run: RunArgs, out: &Path) -> Result<()> {
    let resolver = load(run)?;
    let n = cwmed_io::save_crosswalk(&resolver, out)?;
    eprintln!(
        "{} {} ({} rows)",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        n
    );
    eprintln!("{}", render::render_summary(&resolver));
    Ok(())
}

fn cmd_failed(run: RunArgs, out: &Path) -> Result<()> {
    let resolver = load(run)?;
    let n = cwmed_io::save_failed_mappings(&resolver, out)?;
    eprintln!(
        "{} {} ({} failed mappings)",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        n
    );
    Ok(())
}

#[cfg(feature = "download")]
fn cmd_download(url: &str, out: &Path) -> Result<()> {
    eprintln!("{} {}", "Downloading".green().bold(), url);
    let written = cwmed_io::download::download_vocabulary_archive(url, out)?;
    for path in &written {
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
    Ok(())
}
