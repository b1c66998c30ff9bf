//! Partition of a resolved crosswalk into mapped and failed rows.
//!
//! A row has failed when its target concept id is null, i.e. the chain broke
//! at stage 1 (unknown code) or stage 2 (no `"Maps to"` edge). The two
//! partitions are disjoint and together cover `rows()` in order.

use crate::resolver::{CrosswalkResolver, CrosswalkRow};

pub fn failed_rows(resolver: &CrosswalkResolver) -> Vec<&CrosswalkRow> {
    resolver.rows().iter().filter(|r| !r.is_mapped()).collect()
}

pub fn mapped_rows(resolver: &CrosswalkResolver) -> Vec<&CrosswalkRow> {
    resolver.rows().iter().filter(|r| r.is_mapped()).collect()
}
