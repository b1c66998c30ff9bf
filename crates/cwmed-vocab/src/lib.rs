//! OMOP vocabulary crosswalk
//!
//! Translates codes in one controlled vocabulary (ICD10CM, NDC, ...) into
//! equivalent codes in another (SNOMED, RxNorm, ...) using the Athena
//! standardized vocabulary files:
//! - `CONCEPT.csv` -> [`ConceptIndex`]
//! - `CONCEPT_RELATIONSHIP.csv` (`"Maps to"` only) -> [`RelationshipIndex`]
//! - source code list -> [`CrosswalkResolver`] -> [`CrosswalkRow`]s
//!
//! Everything here is a pure computation over tables already in memory.
//! Reading and writing files lives in `cwmed-io`.

pub mod concept;
pub mod error;
pub mod failed;
pub mod relationship;
pub mod resolver;
pub mod table;

pub use concept::{list_vocabularies, ConceptIndex, ConceptRecord};
pub use error::{CrosswalkError, InputKind, Result};
pub use failed::{failed_rows, mapped_rows};
pub use relationship::{RelationshipEdge, RelationshipIndex, MAPS_TO};
pub use resolver::{CrosswalkHeader, CrosswalkResolver, CrosswalkRow, CrosswalkSummary};
pub use table::Table;
