//! Analysis modules.
//!
//! The priority filter narrows a record set; the aggregators then derive
//! independent summary views from whatever the filter kept.

pub mod aggregator;
pub mod filter;

pub use aggregator::*;
pub use filter::filter_by_priority;
