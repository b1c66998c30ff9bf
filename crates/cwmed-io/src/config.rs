//! Run configuration: which files to read and which vocabularies to walk between.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cwmed_vocab::CrosswalkResolver;
use serde::{Deserialize, Serialize};

use crate::table_io::{read_table, TableFormat};

/// Configuration for one crosswalk run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosswalkConfig {
    /// Caller's code list
    pub source_path: PathBuf,
    /// Column in the code list holding the codes to translate
    pub source_code_column: String,
    /// Athena `CONCEPT.csv`
    pub concept_path: PathBuf,
    /// Athena `CONCEPT_RELATIONSHIP.csv`
    pub relationship_path: PathBuf,
    /// `vocabulary_id` of the codes in the code list (e.g. `ICD10CM`)
    pub source_vocab: String,
    /// `vocabulary_id` to translate into (e.g. `SNOMED`)
    pub target_vocab: String,
    pub source_format: TableFormat,
    /// Layout shared by the concept and relationship files
    pub vocabulary_format: TableFormat,
}

impl Default for CrosswalkConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            source_code_column: String::new(),
            concept_path: PathBuf::from("data/CONCEPT.csv"),
            relationship_path: PathBuf::from("data/CONCEPT_RELATIONSHIP.csv"),
            source_vocab: String::new(),
            target_vocab: String::new(),
            source_format: TableFormat::csv(),
            vocabulary_format: TableFormat::athena(),
        }
    }
}

impl CrosswalkConfig {
    /// Read a JSON config file. Absent keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_path.as_os_str().is_empty() {
            bail!("source_path is not set");
        }
        if self.source_code_column.trim().is_empty() {
            bail!("source_code_column is not set");
        }
        if self.source_vocab.trim().is_empty() || self.target_vocab.trim().is_empty() {
            bail!("source_vocab and target_vocab must both be set");
        }
        Ok(())
    }
}

/// Load the three inputs named by `config` and resolve the crosswalk.
pub fn load_resolver(config: &CrosswalkConfig) -> Result<CrosswalkResolver> {
    config.validate()?;

    let source = read_table(&config.source_path, config.source_format)?;
    let concepts = read_table(&config.concept_path, config.vocabulary_format)?;
    let relationships = read_table(&config.relationship_path, config.vocabulary_format)?;

    let resolver = CrosswalkResolver::from_tables(
        &source,
        &concepts,
        &relationships,
        &config.source_vocab,
        &config.target_vocab,
        &config.source_code_column,
    )?;
    Ok(resolver)
}
