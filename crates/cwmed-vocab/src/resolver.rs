//! CrosswalkResolver: source codes -> target codes through three left-outer joins.
//!
//! ```text
//!  source row ──(code, source vocab)──► ConceptIndex::by_code      stage 1
//!       │
//!       └─ source concept_id ──────────► RelationshipIndex          stage 2
//!                 │                       ("Maps to", concept_id_1)
//!                 └─ concept_id_2 ──────► ConceptIndex::by_id       stage 3
//!                                         (target vocab)
//! ```
//!
//! Each stage keeps its left-hand row when nothing matches (the downstream
//! fields of that branch stay null) and fans one row out into N rows when the
//! right side has N matches. Rows are never dropped, so `rows().len()` is at
//! least the number of source rows, and unmatched codes remain visible as
//! failed mappings.
//!
//! The full join chain runs once in [`CrosswalkResolver::build`]; `rows()`
//! returns the cached result.

use serde::{Deserialize, Serialize};

use crate::concept::{ConceptIndex, ConceptRecord};
use crate::error::{InputKind, Result};
use crate::failed;
use crate::relationship::{RelationshipEdge, RelationshipIndex};
use crate::table::{cell, Table};

/// One pairing of a source code with (at most) one resolved target concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkRow {
    pub source_code: String,
    pub source_label: Option<String>,
    pub source_concept_id: Option<String>,
    pub target_code: Option<String>,
    pub target_label: Option<String>,
    pub target_concept_id: Option<String>,
}

impl CrosswalkRow {
    pub fn is_mapped(&self) -> bool {
        self.target_concept_id.is_some()
    }

    /// Values in [`CrosswalkHeader::columns`] order.
    pub fn fields(&self) -> [Option<&str>; 6] {
        [
            Some(self.source_code.as_str()),
            self.source_label.as_deref(),
            self.source_concept_id.as_deref(),
            self.target_code.as_deref(),
            self.target_label.as_deref(),
            self.target_concept_id.as_deref(),
        ]
    }

    /// Inverse of [`CrosswalkRow::fields`]; a null source code reads as "".
    pub fn from_fields(fields: [Option<String>; 6]) -> Self {
        let [source_code, source_label, source_concept_id, target_code, target_label, target_concept_id] =
            fields;
        Self {
            source_code: source_code.unwrap_or_default(),
            source_label,
            source_concept_id,
            target_code,
            target_label,
            target_concept_id,
        }
    }
}

/// Output column names, parameterized by the vocabulary labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkHeader {
    pub source_vocab: String,
    pub target_vocab: String,
}

impl CrosswalkHeader {
    pub fn new(source_vocab: impl Into<String>, target_vocab: impl Into<String>) -> Self {
        Self {
            source_vocab: source_vocab.into(),
            target_vocab: target_vocab.into(),
        }
    }

    /// `{sv}, {sv}_label, {sv}_omop_id, {tv}, {tv}_label, {tv}_omop_id`
    pub fn columns(&self) -> [String; 6] {
        let (s, t) = (&self.source_vocab, &self.target_vocab);
        [
            s.clone(),
            format!("{s}_label"),
            format!("{s}_omop_id"),
            t.clone(),
            format!("{t}_label"),
            format!("{t}_omop_id"),
        ]
    }
}

/// Counts gathered while resolving.
///
/// An all-unmatched crosswalk and one-to-many mappings are modeled outcomes,
/// not errors; this is where they are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkSummary {
    pub source_rows: usize,
    pub output_rows: usize,
    pub mapped_rows: usize,
    pub failed_rows: usize,
    /// Source rows with no concept in the source vocabulary (stage 1 miss).
    pub unmatched_sources: usize,
    /// Source rows that fanned out into more than one output row.
    pub ambiguous_sources: usize,
}

impl CrosswalkSummary {
    /// No source row matched at stage 1: every output row is a failed mapping.
    pub fn is_empty_result(&self) -> bool {
        self.source_rows > 0 && self.unmatched_sources == self.source_rows
    }
}

#[derive(Debug, Clone)]
pub struct CrosswalkResolver {
    source_vocab: String,
    target_vocab: String,
    concepts: ConceptIndex,
    relationships: RelationshipIndex,
    rows: Vec<CrosswalkRow>,
    summary: CrosswalkSummary,
}

impl CrosswalkResolver {
    /// Build indexes from raw tables, then resolve.
    pub fn from_tables(
        source: &Table,
        concepts: &Table,
        relationships: &Table,
        source_vocab: &str,
        target_vocab: &str,
        source_code_column: &str,
    ) -> Result<Self> {
        // Fail on the caller's table before paying for index construction.
        source.require(InputKind::Source, source_code_column)?;
        let concepts = ConceptIndex::build(concepts, source_vocab, target_vocab)?;
        let relationships = RelationshipIndex::build(relationships)?;
        Self::build(
            source,
            source_code_column,
            concepts,
            relationships,
            source_vocab,
            target_vocab,
        )
    }

    /// Resolve `source` against prebuilt indexes. The resolver takes ownership
    /// of both indexes; they live exactly as long as the cached rows.
    pub fn build(
        source: &Table,
        source_code_column: &str,
        concepts: ConceptIndex,
        relationships: RelationshipIndex,
        source_vocab: &str,
        target_vocab: &str,
    ) -> Result<Self> {
        let code_col = source.require(InputKind::Source, source_code_column)?;

        if !concepts.contains_vocabulary(source_vocab) {
            tracing::warn!(
                source_vocab,
                "source vocabulary has no concepts in the dictionary; every code will fail to map"
            );
        }

        let mut rows = Vec::with_capacity(source.len());
        let mut summary = CrosswalkSummary {
            source_rows: source.len(),
            ..Default::default()
        };

        for source_row in &source.rows {
            let code = cell(source_row, code_col);
            let before = rows.len();

            let source_concepts = stage_source_concepts(&concepts, source_vocab, code);
            if source_concepts.iter().all(Option::is_none) {
                summary.unmatched_sources += 1;
            }

            for source_concept in source_concepts {
                for edge in stage_target_ids(&relationships, source_concept) {
                    for target_concept in stage_target_concepts(&concepts, target_vocab, edge) {
                        rows.push(CrosswalkRow {
                            source_code: code.to_string(),
                            source_label: source_concept.and_then(|c| c.concept_name.clone()),
                            source_concept_id: source_concept.map(|c| c.concept_id.clone()),
                            target_code: target_concept
                                .map(|c| c.concept_code.clone())
                                .filter(|code| !code.is_empty()),
                            target_label: target_concept.and_then(|c| c.concept_name.clone()),
                            target_concept_id: edge.map(|e| e.concept_id_2.clone()),
                        });
                    }
                }
            }

            if rows.len() - before > 1 {
                summary.ambiguous_sources += 1;
            }
        }

        summary.output_rows = rows.len();
        summary.mapped_rows = rows.iter().filter(|r| r.is_mapped()).count();
        summary.failed_rows = summary.output_rows - summary.mapped_rows;

        if summary.is_empty_result() {
            tracing::warn!(
                source_vocab,
                source_rows = summary.source_rows,
                "no source code matched the source vocabulary"
            );
        }
        tracing::info!(
            source_vocab,
            target_vocab,
            source_rows = summary.source_rows,
            output_rows = summary.output_rows,
            mapped = summary.mapped_rows,
            failed = summary.failed_rows,
            ambiguous = summary.ambiguous_sources,
            "resolved crosswalk"
        );

        Ok(Self {
            source_vocab: source_vocab.to_string(),
            target_vocab: target_vocab.to_string(),
            concepts,
            relationships,
            rows,
            summary,
        })
    }

    /// The cached crosswalk, grouped by source row order.
    pub fn rows(&self) -> &[CrosswalkRow] {
        &self.rows
    }

    /// Rows whose target concept id is null.
    pub fn failed_rows(&self) -> Vec<&CrosswalkRow> {
        failed::failed_rows(self)
    }

    pub fn mapped_rows(&self) -> Vec<&CrosswalkRow> {
        failed::mapped_rows(self)
    }

    pub fn header(&self) -> CrosswalkHeader {
        CrosswalkHeader::new(&self.source_vocab, &self.target_vocab)
    }

    pub fn summary(&self) -> &CrosswalkSummary {
        &self.summary
    }

    pub fn source_vocab(&self) -> &str {
        &self.source_vocab
    }

    pub fn target_vocab(&self) -> &str {
        &self.target_vocab
    }

    pub fn concept_index(&self) -> &ConceptIndex {
        &self.concepts
    }

    pub fn relationship_index(&self) -> &RelationshipIndex {
        &self.relationships
    }
}

/// Left-outer join step: all matches, or a single null branch.
fn or_null<T>(matches: impl IntoIterator<Item = T>) -> Vec<Option<T>> {
    let mut out: Vec<Option<T>> = matches.into_iter().map(Some).collect();
    if out.is_empty() {
        out.push(None);
    }
    out
}

// An empty code is a missing value and never joins.
fn stage_source_concepts<'a>(
    concepts: &'a ConceptIndex,
    source_vocab: &str,
    code: &str,
) -> Vec<Option<&'a ConceptRecord>> {
    if code.is_empty() {
        return vec![None];
    }
    or_null(concepts.by_code(source_vocab, code))
}

fn stage_target_ids<'a>(
    relationships: &'a RelationshipIndex,
    source_concept: Option<&ConceptRecord>,
) -> Vec<Option<&'a RelationshipEdge>> {
    match source_concept {
        Some(c) => or_null(relationships.by_source_id(&c.concept_id)),
        None => vec![None],
    }
}

fn stage_target_concepts<'a>(
    concepts: &'a ConceptIndex,
    target_vocab: &'a str,
    edge: Option<&RelationshipEdge>,
) -> Vec<Option<&'a ConceptRecord>> {
    match edge {
        Some(e) => or_null(concepts.by_id_in(target_vocab, &e.concept_id_2)),
        None => vec![None],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrosswalkError;

    fn concepts() -> Table {
        Table::from_rows(
            ["concept_id", "concept_name", "vocabulary_id", "concept_code"],
            [
                ["35205417", "Other intestinal Escherichia coli infections", "ICD10CM", "A04.4"],
                ["192815", "Intestinal infection due to E. coli", "SNOMED", "111839008"],
                ["45548980", "Enterocolitis due to Clostridium difficile", "ICD10CM", "A04.7"],
                ["1", "Ambiguous source", "ICD10CM", "X00"],
                ["10", "First target", "SNOMED", "1000"],
                ["11", "Second target", "SNOMED", "1100"],
                ["2", "Maps outside target vocabulary", "ICD10CM", "Y00"],
            ],
        )
    }

    fn relationships() -> Table {
        Table::from_rows(
            ["concept_id_1", "concept_id_2", "relationship_id"],
            [
                ["35205417", "192815", "Maps to"],
                ["1", "10", "Maps to"],
                ["1", "11", "Maps to"],
                ["2", "99999", "Maps to"],
            ],
        )
    }

    fn resolve(codes: &[&str]) -> CrosswalkResolver {
        let source = Table::from_rows(["icd10"], codes.iter().map(|c| [*c]));
        CrosswalkResolver::from_tables(
            &source,
            &concepts(),
            &relationships(),
            "ICD10CM",
            "SNOMED",
            "icd10",
        )
        .unwrap()
    }

    #[test]
    fn maps_source_code_to_target_code() {
        let r = resolve(&["A04.4"]);
        assert_eq!(
            r.rows(),
            &[CrosswalkRow {
                source_code: "A04.4".to_string(),
                source_label: Some("Other intestinal Escherichia coli infections".to_string()),
                source_concept_id: Some("35205417".to_string()),
                target_code: Some("111839008".to_string()),
                target_label: Some("Intestinal infection due to E. coli".to_string()),
                target_concept_id: Some("192815".to_string()),
            }]
        );
        assert!(r.failed_rows().is_empty());
    }

    #[test]
    fn unknown_code_is_kept_with_null_fields() {
        let r = resolve(&["C78.7"]);
        assert_eq!(r.rows().len(), 1);
        let row = &r.rows()[0];
        assert_eq!(row.source_code, "C78.7");
        assert_eq!(row.source_concept_id, None);
        assert_eq!(row.target_concept_id, None);
        assert_eq!(row.target_code, None);
        assert_eq!(r.failed_rows(), vec![row]);
    }

    #[test]
    fn concept_without_edge_keeps_source_fields() {
        let r = resolve(&["A04.7"]);
        let row = &r.rows()[0];
        assert_eq!(row.source_concept_id.as_deref(), Some("45548980"));
        assert_eq!(row.target_concept_id, None);
        assert_eq!(row.target_code, None);
        assert!(!row.is_mapped());
    }

    #[test]
    fn two_edges_fan_out_into_two_rows() {
        let r = resolve(&["X00"]);
        let targets: Vec<Option<&str>> = r.rows().iter().map(|row| row.target_code.as_deref()).collect();
        assert_eq!(targets, vec![Some("1000"), Some("1100")]);
        assert_eq!(r.summary().ambiguous_sources, 1);
    }

    #[test]
    fn duplicate_dictionary_codes_each_fan_out() {
        let mut concepts = concepts();
        concepts.rows.push(["3", "Duplicate entry one", "ICD10CM", "D00"].map(String::from).to_vec());
        concepts.rows.push(["4", "Duplicate entry two", "ICD10CM", "D00"].map(String::from).to_vec());
        let mut relationships = relationships();
        relationships.rows.push(["3", "10", "Maps to"].map(String::from).to_vec());
        relationships.rows.push(["4", "11", "Maps to"].map(String::from).to_vec());
        let source = Table::from_rows(["icd10"], [["D00"]]);

        let r = CrosswalkResolver::from_tables(
            &source,
            &concepts,
            &relationships,
            "ICD10CM",
            "SNOMED",
            "icd10",
        )
        .unwrap();

        let pairs: Vec<(Option<&str>, Option<&str>)> = r
            .rows()
            .iter()
            .map(|row| (row.source_concept_id.as_deref(), row.target_concept_id.as_deref()))
            .collect();
        assert_eq!(pairs, vec![(Some("3"), Some("10")), (Some("4"), Some("11"))]);
        assert_eq!(r.summary().ambiguous_sources, 1);
        assert_eq!(r.summary().unmatched_sources, 0);
    }

    #[test]
    fn resolver_keeps_indexes_and_vocabularies() {
        let r = resolve(&["A04.4"]);
        assert_eq!(r.source_vocab(), "ICD10CM");
        assert_eq!(r.target_vocab(), "SNOMED");
        assert_eq!(r.concept_index().len(), 7);
        assert_eq!(r.relationship_index().len(), 4);
        assert_eq!(r.concept_index().by_code("ICD10CM", "A04.4").count(), 1);
    }

    #[test]
    fn edge_into_unknown_target_keeps_target_id_only() {
        let r = resolve(&["Y00"]);
        let row = &r.rows()[0];
        assert_eq!(row.target_concept_id.as_deref(), Some("99999"));
        assert_eq!(row.target_code, None);
        assert_eq!(row.target_label, None);
    }

    #[test]
    fn rows_are_grouped_by_source_order() {
        let r = resolve(&["C78.7", "X00", "A04.4", "C78.7"]);
        let codes: Vec<&str> = r.rows().iter().map(|row| row.source_code.as_str()).collect();
        assert_eq!(codes, vec!["C78.7", "X00", "X00", "A04.4", "C78.7"]);

        let s = r.summary();
        assert_eq!(s.source_rows, 4);
        assert_eq!(s.output_rows, 5);
        assert_eq!(s.mapped_rows, 3);
        assert_eq!(s.failed_rows, 2);
        assert_eq!(s.unmatched_sources, 2);
        assert!(!s.is_empty_result());
    }

    #[test]
    fn stage_one_uses_source_vocabulary_only() {
        // "1000" is a SNOMED code, not an ICD10CM one.
        let r = resolve(&["1000"]);
        assert_eq!(r.rows()[0].source_concept_id, None);
    }

    #[test]
    fn empty_code_never_matches() {
        let r = resolve(&[""]);
        assert_eq!(r.rows().len(), 1);
        assert!(!r.rows()[0].is_mapped());
    }

    #[test]
    fn absent_source_vocabulary_yields_all_failed_crosswalk() {
        let source = Table::from_rows(["icd10"], [["A04.4"], ["X00"]]);
        let r = CrosswalkResolver::from_tables(
            &source,
            &concepts(),
            &relationships(),
            "ICD9CM",
            "SNOMED",
            "icd10",
        )
        .unwrap();
        assert_eq!(r.rows().len(), 2);
        assert_eq!(r.failed_rows().len(), 2);
        assert!(r.summary().is_empty_result());
    }

    #[test]
    fn missing_source_column_is_a_schema_error() {
        let source = Table::from_rows(["ndc"], [["00002143380"]]);
        let err = CrosswalkResolver::from_tables(
            &source,
            &concepts(),
            &relationships(),
            "ICD10CM",
            "SNOMED",
            "icd10",
        )
        .unwrap_err();
        assert_eq!(
            err,
            CrosswalkError::Schema {
                input: InputKind::Source,
                column: "icd10".to_string(),
            }
        );
    }

    #[test]
    fn header_uses_vocabulary_labels() {
        let r = resolve(&[]);
        assert_eq!(
            r.header().columns(),
            [
                "ICD10CM",
                "ICD10CM_label",
                "ICD10CM_omop_id",
                "SNOMED",
                "SNOMED_label",
                "SNOMED_omop_id"
            ]
            .map(String::from)
        );
        assert!(!r.summary().is_empty_result());
    }

    #[test]
    fn fields_round_trip_through_from_fields() {
        let r = resolve(&["A04.4", "C78.7"]);
        for row in r.rows() {
            let owned = row.fields().map(|f| f.map(str::to_string));
            assert_eq!(&CrosswalkRow::from_fields(owned), row);
        }
    }
}
