//! RelationshipIndex: `"Maps to"` edges from `CONCEPT_RELATIONSHIP.csv`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{InputKind, Result};
use crate::table::{cell, Table};

/// The equivalence relation connecting a source concept to its standard concept.
pub const MAPS_TO: &str = "Maps to";

pub const COL_CONCEPT_ID_1: &str = "concept_id_1";
pub const COL_CONCEPT_ID_2: &str = "concept_id_2";
pub const COL_RELATIONSHIP_ID: &str = "relationship_id";

/// Directed edge `concept_id_1 -> concept_id_2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub concept_id_1: String,
    pub concept_id_2: String,
    pub relationship_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    /// `concept_id_1 -> outgoing edges`, file order.
    by_source: AHashMap<String, Vec<RelationshipEdge>>,
    edge_count: usize,
}

impl RelationshipIndex {
    pub fn build(relationships: &Table) -> Result<Self> {
        let from_col = relationships.require(InputKind::Relationship, COL_CONCEPT_ID_1)?;
        let to_col = relationships.require(InputKind::Relationship, COL_CONCEPT_ID_2)?;
        let rel_col = relationships.require(InputKind::Relationship, COL_RELATIONSHIP_ID)?;

        let mut out = RelationshipIndex::default();
        let mut incomplete = 0usize;

        for row in &relationships.rows {
            if cell(row, rel_col) != MAPS_TO {
                continue;
            }
            let (from, to) = (cell(row, from_col), cell(row, to_col));
            if from.is_empty() || to.is_empty() {
                incomplete += 1;
                continue;
            }
            out.by_source
                .entry(from.to_string())
                .or_default()
                .push(RelationshipEdge {
                    concept_id_1: from.to_string(),
                    concept_id_2: to.to_string(),
                    relationship_id: MAPS_TO.to_string(),
                });
            out.edge_count += 1;
        }

        tracing::debug!(
            scanned = relationships.len(),
            kept = out.edge_count,
            dropped_incomplete = incomplete,
            "built relationship index"
        );

        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Outgoing `"Maps to"` edges of `concept_id_1`. Ambiguous mappings are
    /// returned in full.
    pub fn by_source_id(&self, concept_id_1: &str) -> &[RelationshipEdge] {
        self.by_source
            .get(concept_id_1)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
