use serde::Deserialize;
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use std::time::SystemTime;
use log::info;
use thiserror::Error;

use crate::history::DEFAULT_WELCOME;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt field '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("Prompt file IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Prompt JSON parsing error for '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Every user-visible fixed string of the strategist.
///
/// Fields missing from a prompts file keep their built-in value.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub welcome: String,
    pub system_instruction: String,
    pub empty_answer: String,
    pub error_fallback: String,
    pub trend_prompt: String,
    pub trend_empty_answer: String,
    pub trend_fallback: String,
    #[serde(skip)]
    pub last_loaded: Option<SystemTime>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            welcome: DEFAULT_WELCOME.to_string(),
            system_instruction: "You are the Lead Strategist at NEBULA WEB3, a futuristic digital agency. You specialize in Blockchain, NFTs, DAOs, and AI integration. Provide sharp, futuristic, and professional advice. Use Google Search to find current web3 market trends if the user asks for data. Be concise but deep in your insights.".to_string(),
            empty_answer: "I'm processing the data stream...".to_string(),
            error_fallback: "System error in the neural link. The high-fidelity model is currently recalibrating. Please try re-initializing.".to_string(),
            trend_prompt: "List 3 high-impact Web3 and AI design trends happening right now in 2024-2025. Keep it very brief, under 15 words.".to_string(),
            trend_empty_answer: "Decentralized identity, AI-generative UI, and Spatial Web protocols.".to_string(),
            trend_fallback: "The future is unfolding in real-time.".to_string(),
            last_loaded: None,
        }
    }
}

impl PromptConfig {
    /// Fallback and placeholder texts end up as message text, which must never be empty.
    fn validate(&self) -> Result<(), PromptError> {
        let fields = [
            ("welcome", &self.welcome),
            ("system_instruction", &self.system_instruction),
            ("empty_answer", &self.empty_answer),
            ("error_fallback", &self.error_fallback),
            ("trend_prompt", &self.trend_prompt),
            ("trend_empty_answer", &self.trend_empty_answer),
            ("trend_fallback", &self.trend_fallback),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(PromptError::EmptyField(name));
            }
        }
        Ok(())
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let path = path.as_ref();
    // mtime taken before the read: a write racing the read still compares as newer.
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
    let file_content = fs::read_to_string(path).map_err(|source| PromptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: PromptConfig = serde_json
        ::from_str(&file_content)
        .map_err(|source| PromptError::Json { path: path.to_path_buf(), source })?;
    config.validate()?;
    config.last_loaded = modified;
    info!("Loaded prompts from {}", path.display());
    Ok(Arc::new(config))
}

/// Built-in prompts when no path is configured.
pub fn load_prompts_or_default(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(p) if !p.trim().is_empty() => load_prompts(p),
        _ => {
            info!("No prompts file configured, using built-in prompts");
            Ok(Arc::new(PromptConfig::default()))
        }
    }
}

pub fn reload_prompts_if_changed<P: AsRef<Path>>(
    path: P,
    current_config: &Arc<PromptConfig>
) -> Result<Option<Arc<PromptConfig>>, PromptError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|source| PromptError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Ok(modified) = metadata.modified() {
        match current_config.last_loaded {
            Some(last_loaded) if modified <= last_loaded => {}
            Some(_) => {
                info!("Prompts file changed, reloading...");
                return load_prompts(path).map(Some);
            }
            None => {
                info!("No last_loaded timestamp, reloading prompts...");
                return load_prompts(path).map(Some);
            }
        }
    }
    Ok(None)
}
