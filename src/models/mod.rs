//! Database models and DTOs for all domain entities.

pub mod combination;
pub mod medicine;
pub mod pagination;
pub mod parsing_rule;
pub mod prescription;
