use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use super::paths::AppPaths;
use crate::core::errors::ApiError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub rag: RagSettings,
    pub cleanup: CleanupSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_lifetime_minutes: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "insecure-change-me-for-production".to_string(),
            token_lifetime_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Credential for the embedding/generation provider. Empty means the
    /// pipeline stays unavailable.
    pub api_key: String,
    /// Base URL of an OpenAI-compatible provider (no trailing slash).
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub knowledge_base_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            generation_model: "gpt-4o-mini".to_string(),
            knowledge_base_path: PathBuf::from("knowledge_base/faq.txt"),
            chunk_size: 500,
            chunk_overlap: 0,
            top_k: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    pub interval_hours: u64,
    pub retention_days: i64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            interval_hours: 24,
            retention_days: 30,
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Result<Self, ApiError> {
        let config_path = paths.config_path();
        let mut settings = if config_path.exists() {
            let contents = fs::read_to_string(&config_path).map_err(ApiError::internal)?;
            serde_yaml::from_str::<Settings>(&contents).map_err(|e| {
                ApiError::internal(format!("invalid config {}: {}", config_path.display(), e))
            })?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides();

        if settings.rag.knowledge_base_path.is_relative() {
            settings.rag.knowledge_base_path =
                paths.project_root.join(&settings.rag.knowledge_base_path);
        }

        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var("FAQCHAT_RAG_API_KEY") {
            self.rag.api_key = key;
        }
        if let Ok(secret) = env::var("FAQCHAT_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(path) = env::var("FAQCHAT_KNOWLEDGE_BASE") {
            self.rag.knowledge_base_path = PathBuf::from(path);
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
    }
}
