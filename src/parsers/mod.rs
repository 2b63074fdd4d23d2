//! Prescription-text parsers.
//!
//! Turns a single free-text line typed by a doctor into a
//! [`StructuredPrescription`](crate::models::prescription::StructuredPrescription).
//! Everything here is pure: no I/O, no shared mutable state.

pub mod extractors;
pub mod heuristic;
pub mod medicine_name;
pub mod vocabulary;

pub use heuristic::HeuristicParser;
pub use vocabulary::{FrequencyKeyword, ParserVocabulary};
