pub mod agent;
pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;
pub mod session;
pub mod strategist;

use agent::StrategyAgent;
use cli::Args;
use history::format_transcript;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("HTTP Port: {:?}", args.http_port);
    info!("Chat Model: {}", args.chat_model);
    info!("Trend Model: {}", args.trend_model);
    info!("Thinking Budget: {}", args.thinking_budget);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Request Timeout: {:?}", args.request_timeout());
    info!("-------------------------");

    let agent = Arc::new(StrategyAgent::from_args(&args).await?);

    if let Some(question) = &args.ask {
        println!("{}", ask(&agent, question).await?);
        return Ok(());
    }

    info!("Starting server on: {}", args.server_addr);
    let server = Server::new(
        args.server_addr.clone(),
        agent,
        args.server_api_key.clone(),
        args.http_port
    );
    server.run().await
}

/// One exchange in a throwaway session, rendered as a plain-text transcript.
pub async fn ask(
    agent: &StrategyAgent,
    question: &str
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut session = agent.open_session().await;
    session.submit(question).await?;
    Ok(format_transcript(session.conversation()))
}
