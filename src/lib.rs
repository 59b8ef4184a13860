pub mod models;
pub mod error;
pub mod history;
pub mod llm;
pub mod coordinator;
pub mod server;
pub mod cli;

use cli::{ Args, ChatArgs, Command, ServeArgs };
use coordinator::RequestCoordinator;
use history::ConversationStore;
use llm::proxy::ProxyClient;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Chat(chat_args) => run_chat(chat_args).await,
        Command::Serve(serve_args) => run_server(serve_args).await,
    }
}

async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Proxy Endpoint: {}", args.proxy_url);
    info!("System Prompt: {}", args.system_prompt);
    info!("-------------------------");

    let client = Arc::new(ProxyClient::new(&args.proxy_url)?);
    let store = ConversationStore::new(args.system_prompt);
    let coordinator = Arc::new(RequestCoordinator::new(client, store));
    cli::repl::run_repl(coordinator).await
}

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Upstream URL: {}", args.upstream_url);
    info!("Upstream Model: {}", args.model);
    info!("Upstream API Key Set: {}", !args.upstream_api_key.trim().is_empty());
    info!("Static Directory: {}", args.static_dir);
    info!("Mock Mode: {}", args.use_mock());
    info!("-------------------------");

    let server = Server::new(&args)?;
    server.run().await
}
