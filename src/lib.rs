pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use crate::parsers::HeuristicParser;
use crate::services::ai_parser::AiPrescriptionParser;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
    pub parser: Arc<HeuristicParser>,
    pub ai: AiPrescriptionParser,
}

impl AppState {
    /// Assemble state with the default parser vocabulary.
    pub fn new(db: PgPool, config: config::AppConfig) -> Result<Self, regex::Error> {
        let parser = HeuristicParser::new(parsers::ParserVocabulary::default())?;
        let ai = AiPrescriptionParser::new(reqwest::Client::new(), config.ai.clone());
        Ok(Self {
            db,
            config,
            parser: Arc::new(parser),
            ai,
        })
    }
}
