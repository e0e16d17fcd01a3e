use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Gemini Provider Args ---
    /// API key used to authenticate generateContent calls
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the Gemini API (defaults to https://generativelanguage.googleapis.com/v1beta)
    #[arg(long, env = "GEMINI_BASE_URL")]
    pub base_url: Option<String>,

    /// Model answering strategy questions
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-3-pro-preview")]
    pub chat_model: String,

    /// Model producing the short trend summary
    #[arg(long, env = "TREND_MODEL", default_value = "gemini-3-flash-preview")]
    pub trend_model: String,

    /// Thinking budget sent with strategy questions. 0 leaves the provider default.
    #[arg(long, env = "THINKING_BUDGET", default_value = "4000")]
    pub thinking_budget: u32,

    /// Client-side timeout for provider calls in seconds. Unset keeps the transport default.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    // --- Prompt Args ---
    /// Optional JSON file overriding persona, welcome and fallback texts (e.g. json/prompts.json)
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- Server Args ---
    /// Host address and port for the WebSocket server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional shared secret. If set, WebSocket clients must sign the handshake with it.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,

    /// Port for the HTTP API. The HTTP API is disabled when unset.
    #[arg(long, env = "HTTP_PORT")]
    pub http_port: Option<u16>,

    // --- General App Args ---
    /// Ask a single question, print the transcript and exit instead of serving.
    #[arg(long)]
    pub ask: Option<String>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_strategy_settings() {
        let args = Args::try_parse_from(["strategy-lab", "--api-key", "k"]).unwrap();
        assert_eq!(args.chat_model, crate::strategist::DEFAULT_CHAT_MODEL);
        assert_eq!(args.trend_model, crate::strategist::DEFAULT_TREND_MODEL);
        assert_eq!(args.thinking_budget, crate::strategist::DEFAULT_THINKING_BUDGET);
        assert_eq!(args.request_timeout(), None);
    }

    #[test]
    fn zero_timeout_means_transport_default() {
        let args = Args::try_parse_from(
            ["strategy-lab", "--request-timeout-secs", "0"]
        ).unwrap();
        assert_eq!(args.request_timeout(), None);

        let args = Args::try_parse_from(
            ["strategy-lab", "--request-timeout-secs", "30"]
        ).unwrap();
        assert_eq!(args.request_timeout(), Some(Duration::from_secs(30)));
    }
}
