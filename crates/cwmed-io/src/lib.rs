//! File-side collaborators of the crosswalk core
//!
//! - [`table_io`]: string-typed delimited loading into `Table`
//! - [`export`]: crosswalk / failed-mapping files and their reload
//! - [`config`]: JSON run configuration and the `load_resolver` driver
//! - `download` (feature `download`): Athena bundle fetch + extraction

pub mod config;
#[cfg(feature = "download")]
pub mod download;
pub mod export;
pub mod table_io;

pub use config::{load_resolver, CrosswalkConfig};
pub use export::{
    read_crosswalk, save_crosswalk, save_failed_mappings, write_crosswalk, write_crosswalk_to,
};
pub use table_io::{read_table, read_table_from, TableFormat};
