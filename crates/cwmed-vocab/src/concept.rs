//! ConceptIndex: lookups over the concept dictionary (`CONCEPT.csv`).
//!
//! Only the two vocabularies taking part in a crosswalk are indexed. Two access
//! paths are kept over the same record list:
//! - `(vocabulary_id, concept_code) -> [records]`
//! - `concept_id -> [records]`
//!
//! Lookups return every matching record in dictionary order. Duplicate
//! `(vocabulary_id, concept_code)` pairs are kept; they fan out downstream.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{InputKind, Result};
use crate::table::{cell, optional_cell, Table};

pub const COL_CONCEPT_ID: &str = "concept_id";
pub const COL_CONCEPT_CODE: &str = "concept_code";
pub const COL_VOCABULARY_ID: &str = "vocabulary_id";
pub const COL_CONCEPT_NAME: &str = "concept_name";
pub const COL_DOMAIN_ID: &str = "domain_id";
pub const COL_CONCEPT_CLASS_ID: &str = "concept_class_id";
pub const COL_STANDARD_CONCEPT: &str = "standard_concept";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub concept_id: String,
    pub vocabulary_id: String,
    pub concept_code: String,
    pub concept_name: Option<String>,
    pub domain_id: Option<String>,
    pub concept_class_id: Option<String>,
    pub standard_concept: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConceptIndex {
    records: Vec<ConceptRecord>,
    /// `vocabulary_id -> concept_code -> record positions`.
    by_code: AHashMap<String, AHashMap<String, Vec<usize>>>,
    /// `concept_id -> record positions`.
    by_id: AHashMap<String, Vec<usize>>,
}

impl ConceptIndex {
    pub fn build(concepts: &Table, source_vocab: &str, target_vocab: &str) -> Result<Self> {
        let id_col = concepts.require(InputKind::Concept, COL_CONCEPT_ID)?;
        let code_col = concepts.require(InputKind::Concept, COL_CONCEPT_CODE)?;
        let vocab_col = concepts.require(InputKind::Concept, COL_VOCABULARY_ID)?;
        let name_col = concepts.position(COL_CONCEPT_NAME);
        let domain_col = concepts.position(COL_DOMAIN_ID);
        let class_col = concepts.position(COL_CONCEPT_CLASS_ID);
        let standard_col = concepts.position(COL_STANDARD_CONCEPT);

        let mut out = ConceptIndex::default();
        let mut missing_id = 0usize;

        for row in &concepts.rows {
            let vocabulary_id = cell(row, vocab_col);
            if vocabulary_id != source_vocab && vocabulary_id != target_vocab {
                continue;
            }
            let concept_id = cell(row, id_col);
            if concept_id.is_empty() {
                missing_id += 1;
                continue;
            }

            let pos = out.records.len();
            let record = ConceptRecord {
                concept_id: concept_id.to_string(),
                vocabulary_id: vocabulary_id.to_string(),
                concept_code: cell(row, code_col).to_string(),
                concept_name: optional_cell(row, name_col),
                domain_id: optional_cell(row, domain_col),
                concept_class_id: optional_cell(row, class_col),
                standard_concept: optional_cell(row, standard_col),
            };

            out.by_code
                .entry(record.vocabulary_id.clone())
                .or_default()
                .entry(record.concept_code.clone())
                .or_default()
                .push(pos);
            out.by_id
                .entry(record.concept_id.clone())
                .or_default()
                .push(pos);
            out.records.push(record);
        }

        tracing::debug!(
            source_vocab,
            target_vocab,
            scanned = concepts.len(),
            kept = out.records.len(),
            dropped_missing_id = missing_id,
            "built concept index"
        );

        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ConceptRecord] {
        &self.records
    }

    /// Records with `vocabulary_id == vocabulary` and `concept_code == code`.
    /// Exact, case-sensitive match.
    pub fn by_code<'a>(
        &'a self,
        vocabulary: &str,
        code: &str,
    ) -> impl Iterator<Item = &'a ConceptRecord> + 'a {
        let positions = self
            .by_code
            .get(vocabulary)
            .and_then(|codes| codes.get(code))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        positions.iter().map(move |&pos| &self.records[pos])
    }

    /// Records with `concept_id == concept_id`, from either vocabulary.
    pub fn by_id<'a>(&'a self, concept_id: &str) -> impl Iterator<Item = &'a ConceptRecord> + 'a {
        let positions = self
            .by_id
            .get(concept_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        positions.iter().map(move |&pos| &self.records[pos])
    }

    /// `by_id` restricted to one vocabulary.
    pub fn by_id_in<'a>(
        &'a self,
        vocabulary: &'a str,
        concept_id: &str,
    ) -> impl Iterator<Item = &'a ConceptRecord> + 'a {
        self.by_id(concept_id)
            .filter(move |r| r.vocabulary_id == vocabulary)
    }

    pub fn contains_vocabulary(&self, vocabulary: &str) -> bool {
        self.by_code.contains_key(vocabulary)
    }
}

/// Distinct `vocabulary_id` values in a concept dictionary, sorted.
///
/// Used to discover valid source/target labels before building a resolver.
pub fn list_vocabularies(concepts: &Table) -> Result<BTreeSet<String>> {
    let vocab_col = concepts.require(InputKind::Concept, COL_VOCABULARY_ID)?;
    Ok(concepts
        .rows
        .iter()
        .map(|row| cell(row, vocab_col))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrosswalkError;

    fn dictionary() -> Table {
        Table::from_rows(
            [
                "concept_id",
                "concept_name",
                "domain_id",
                "vocabulary_id",
                "concept_class_id",
                "standard_concept",
                "concept_code",
            ],
            [
                ["35205417", "Other intestinal Escherichia coli infections", "Condition", "ICD10CM", "4-char billing code", "", "A04.4"],
                ["192815", "Intestinal infection due to E. coli", "Condition", "SNOMED", "Clinical Finding", "S", "111839008"],
                ["44819", "Something in another vocabulary", "Condition", "ICD9CM", "4-dig billing code", "", "A04.4"],
                ["", "Row without an id", "Condition", "SNOMED", "Clinical Finding", "S", "999"],
                ["35205418", "Duplicate code entry", "Condition", "ICD10CM", "4-char billing code", "", "A04.4"],
            ],
        )
    }

    #[test]
    fn filters_to_source_and_target_vocabularies() {
        let idx = ConceptIndex::build(&dictionary(), "ICD10CM", "SNOMED").unwrap();
        assert_eq!(idx.len(), 3);
        assert!(idx
            .records()
            .iter()
            .all(|r| r.vocabulary_id == "ICD10CM" || r.vocabulary_id == "SNOMED"));
        assert!(!idx.contains_vocabulary("ICD9CM"));
        assert_eq!(idx.by_code("ICD9CM", "A04.4").count(), 0);
    }

    #[test]
    fn duplicate_codes_are_kept_in_dictionary_order() {
        let idx = ConceptIndex::build(&dictionary(), "ICD10CM", "SNOMED").unwrap();
        let ids: Vec<&str> = idx
            .by_code("ICD10CM", "A04.4")
            .map(|r| r.concept_id.as_str())
            .collect();
        assert_eq!(ids, vec!["35205417", "35205418"]);
    }

    #[test]
    fn lookup_by_id_and_optional_columns() {
        let idx = ConceptIndex::build(&dictionary(), "ICD10CM", "SNOMED").unwrap();
        let snomed: Vec<&ConceptRecord> = idx.by_id("192815").collect();
        assert_eq!(snomed.len(), 1);
        assert_eq!(snomed[0].concept_code, "111839008");
        assert_eq!(snomed[0].standard_concept.as_deref(), Some("S"));

        let icd: Vec<&ConceptRecord> = idx.by_id("35205417").collect();
        assert_eq!(icd[0].standard_concept, None);

        assert_eq!(idx.by_id_in("ICD10CM", "192815").count(), 0);
        assert_eq!(idx.by_id_in("SNOMED", "192815").count(), 1);
    }

    #[test]
    fn rows_without_concept_id_are_dropped() {
        let idx = ConceptIndex::build(&dictionary(), "ICD10CM", "SNOMED").unwrap();
        assert_eq!(idx.by_code("SNOMED", "999").count(), 0);
        assert_eq!(idx.by_id("").count(), 0);
    }

    #[test]
    fn code_match_is_case_sensitive() {
        let t = Table::from_rows(
            ["concept_id", "vocabulary_id", "concept_code"],
            [["1", "HCPCS", "a0021"]],
        );
        let idx = ConceptIndex::build(&t, "HCPCS", "SNOMED").unwrap();
        assert_eq!(idx.by_code("HCPCS", "A0021").count(), 0);
        assert_eq!(idx.by_code("HCPCS", "a0021").count(), 1);
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let t = Table::from_rows(["concept_id", "vocabulary_id"], [["1", "SNOMED"]]);
        let err = ConceptIndex::build(&t, "ICD10CM", "SNOMED").unwrap_err();
        assert_eq!(
            err,
            CrosswalkError::Schema {
                input: InputKind::Concept,
                column: "concept_code".to_string(),
            }
        );
    }

    #[test]
    fn list_vocabularies_is_sorted_and_distinct() {
        let vocabs = list_vocabularies(&dictionary()).unwrap();
        let vocabs: Vec<&str> = vocabs.iter().map(String::as_str).collect();
        assert_eq!(vocabs, vec!["ICD10CM", "ICD9CM", "SNOMED"]);
    }
}
