//! Domain models for the OPD dashboard.

mod form;
mod record;
mod row;

pub use form::*;
pub use record::*;
pub use row::*;
