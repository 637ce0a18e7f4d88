//! Export of fetched records and overview snapshots.

mod table;

pub use table::*;
