pub mod repl;

use clap::{ Parser, Subcommand };

use crate::history::DEFAULT_SYSTEM_PROMPT;
use crate::llm::openrouter::{ DEFAULT_MODEL, DEFAULT_UPSTREAM_URL };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive chat session against a proxy endpoint.
    Chat(ChatArgs),
    /// Run the `/api/chat` proxy in front of the language-model API.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Proxy endpoint that receives the transcript (e.g., http://127.0.0.1:5000/api/chat)
    #[arg(long, env = "CHAT_PROXY_URL", default_value = "http://127.0.0.1:5000/api/chat")]
    pub proxy_url: String,

    /// System message the conversation is seeded with.
    #[arg(long, env = "CHAT_SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host address and port for the proxy server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5000")]
    pub server_addr: String,

    /// Chat-completions URL of the upstream provider.
    #[arg(long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// API key for the upstream provider. Mock replies are served when empty.
    #[arg(long, env = "OPENROUTER_API_KEY", default_value = "", hide_env_values = true)]
    pub upstream_api_key: String,

    /// Model name sent upstream (e.g., deepseek/deepseek-chat-v3.1:free)
    #[arg(long, env = "CHAT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Directory served for any path other than the API routes.
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    pub static_dir: String,

    /// Answer with canned keyword-based replies instead of calling upstream.
    #[arg(long, env = "MOCK_UPSTREAM", default_value = "false")]
    pub mock: bool,
}

impl ServeArgs {
    pub fn use_mock(&self) -> bool {
        self.mock || self.upstream_api_key.trim().is_empty()
    }
}
