//! A Cascades-style planner for predicates over nested and repeated record
//! fields.
//!
//! A [`RecordQuery`](db::RecordQuery) filter is validated against the record
//! descriptor, expanded into quantifiers over a memo of equivalent expressions,
//! explored and implemented by rules, and the cheapest physical plan is run
//! against a [`Storage`](storage::Storage).
pub mod catalog;
pub mod db;
pub mod errors;
pub mod execution;
pub mod expression;
pub mod optimizer;
pub mod planner;
pub mod storage;
pub mod types;
pub mod util;
