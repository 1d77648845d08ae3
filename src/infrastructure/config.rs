use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::{ChatPrompts, ChatSettings};
use crate::domain::{CompletionOptions, DomainError};

const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";

/// Service settings plus prompt templates, loaded from YAML with env overrides.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:8080".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub documents_file: PathBuf,
    pub upload_dir: PathBuf,
    pub batch_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            documents_file: PathBuf::from("storage/documents.json"),
            upload_dir: PathBuf::from("uploads"),
            batch_dir: PathBuf::from("batch_files"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_base: String,
    /// Only ever populated from `OPENAI_API_KEY`.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub max_tokens: u64,
    pub temperature: f64,
    pub batch_max_tokens: u64,
    pub completion_window: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo-preview".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            max_tokens: 1000,
            temperature: 0.7,
            batch_max_tokens: 500,
            completion_window: "24h".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub batch_threshold: usize,
    pub realtime_context_chars: usize,
    pub batch_context_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            batch_threshold: 5,
            realtime_context_chars: 2000,
            batch_context_chars: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub realtime: PromptTemplate,
    pub batch: BatchPromptTemplate,
    pub messages: MessagesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant that answers questions based on the provided \
                     documents. Always reference the specific documents when answering questions. \
                     If the answer cannot be found in the documents, say so clearly."
                .to_string(),
            user: "Context from uploaded documents:\n{context}\n\nUser question: {question}\n\n\
                   Please answer based on the document content provided above."
                .to_string(),
        }
    }
}

/// Per-document batch prompt. Missing fields take the batch defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchPromptTemplate {
    pub system: String,
    /// Placeholders: `{filename}`, `{content}`, `{question}`.
    pub user: String,
}

impl Default for BatchPromptTemplate {
    fn default() -> Self {
        Self {
            system: "You are a helpful assistant that answers questions based on document content."
                .to_string(),
            user: "Document: {filename}\nContent: {content}\n\nQuestion: {question}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub no_documents: String,
    pub realtime_error: String,
    pub batch_error: String,
    pub batch_processing: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            no_documents: "I don't have any documents to reference. Please upload some documents first."
                .to_string(),
            realtime_error: "I'm sorry, I couldn't process your request at the moment. Please try again later."
                .to_string(),
            batch_error: "I encountered an error while setting up batch processing. Please try again later."
                .to_string(),
            batch_processing: "I'm processing your question across {count} documents. This may take a few moments. Your batch job ID is: {job_id}"
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `CONFIG_PATH` / `PROMPTS_PATH` (or the defaults under `config/`),
    /// then applies environment overrides.
    pub fn load() -> Result<Self, DomainError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let prompts_path =
            std::env::var("PROMPTS_PATH").unwrap_or_else(|_| DEFAULT_PROMPTS_PATH.into());

        let mut config = Self::from_files(Path::new(&config_path), Path::new(&prompts_path))?;
        config.apply_env();
        Ok(config)
    }

    /// Missing files fall back to built-in defaults; malformed ones are errors.
    pub fn from_files(config_path: &Path, prompts_path: &Path) -> Result<Self, DomainError> {
        let config: Config = read_yaml(config_path)?.unwrap_or_default();
        let prompts: PromptsConfig = read_yaml(prompts_path)?.unwrap_or_default();
        Ok(Self { config, prompts })
    }

    pub fn from_yaml(config: &str, prompts: &str) -> Result<Self, DomainError> {
        Ok(Self {
            config: serde_yaml::from_str(config)
                .map_err(|e| DomainError::validation(format!("config: {e}")))?,
            prompts: serde_yaml::from_str(prompts)
                .map_err(|e| DomainError::validation(format!("prompts: {e}")))?,
        })
    }

    pub fn chat_settings(&self) -> ChatSettings {
        let llm = &self.config.llm;
        let prompts = &self.prompts;
        ChatSettings {
            model: llm.model.clone(),
            batch_threshold: self.config.chat.batch_threshold,
            realtime_context_chars: self.config.chat.realtime_context_chars,
            batch_context_chars: self.config.chat.batch_context_chars,
            completion: CompletionOptions {
                max_tokens: llm.max_tokens,
                temperature: llm.temperature,
            },
            batch_max_tokens: llm.batch_max_tokens,
            timeout: Duration::from_secs(llm.timeout_seconds),
            batch_dir: self.config.storage.batch_dir.clone(),
            prompts: ChatPrompts {
                realtime_system: prompts.realtime.system.clone(),
                realtime_user: prompts.realtime.user.clone(),
                batch_system: prompts.batch.system.clone(),
                batch_user: prompts.batch.user.clone(),
                no_documents: prompts.messages.no_documents.clone(),
                realtime_error: prompts.messages.realtime_error.clone(),
                batch_error: prompts.messages.batch_error.clone(),
                batch_processing: prompts.messages.batch_processing.clone(),
            },
        }
    }

    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse().ok()) {
            self.config.server.port = port;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.config.llm.api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Ok(base) = std::env::var("OPENAI_API_BASE") {
            self.config.llm.api_base = base;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.config.llm.model = model;
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            realtime: PromptTemplate::default(),
            batch: BatchPromptTemplate::default(),
            messages: MessagesConfig::default(),
        }
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, DomainError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    serde_yaml::from_str(&raw)
        .map(Some)
        .map_err(|e| DomainError::validation(format!("{}: {e}", path.display())))
}
