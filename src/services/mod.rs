//! Business logic services.

pub mod ai_parser;
pub mod combination;
pub mod parsing_rule;
pub mod prescription_parse;
pub mod rule_engine;
pub mod suggestion;
