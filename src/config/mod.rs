use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub ai: AiConfig,
}

/// Settings for the AI-assisted prescription parser.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Used when a parse request carries no credential of its own.
    pub default_api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(15),
            default_api_key: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        let ai_defaults = AiConfig::default();
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            ai: AiConfig {
                api_url: env::var("AI_API_URL").unwrap_or(ai_defaults.api_url),
                model: env::var("AI_MODEL").unwrap_or(ai_defaults.model),
                timeout: env::var("AI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(ai_defaults.timeout),
                default_api_key: env::var("AI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            },
        })
    }
}
