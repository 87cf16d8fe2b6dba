//! Transaction source ingestion
//!
//! Merges the primary (date, amount) source with an optional secondary
//! tabular source whose headers vary between exports ("Value Date" vs
//! "ValueDate" vs "value_date"). Column lookup goes through an explicit
//! alias table resolved once by normalized comparison, never ad hoc
//! conditional branching.

mod aliases;
mod merger;

pub use aliases::AliasTable;
pub use merger::merge_sources;
