pub mod api;
pub mod mock;

use crate::cli::ServeArgs;
use crate::llm::openrouter::OpenRouterClient;
use api::{ AppState, Backend };
use log::{ info, warn };
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Server {
    addr: String,
    static_dir: String,
    state: AppState,
}

impl Server {
    pub fn new(args: &ServeArgs) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let backend = if args.use_mock() {
            warn!("No upstream API key configured or mock mode requested. Serving mock replies.");
            Backend::Mock
        } else {
            let client = OpenRouterClient::new(
                &args.upstream_api_key,
                Some(args.model.clone()),
                Some(args.upstream_url.clone())
            )?;
            info!("Forwarding chat requests to {} (model {})", args.upstream_url, client.model());
            Backend::Upstream(Arc::new(client))
        };

        Ok(Self {
            addr: args.server_addr.clone(),
            static_dir: args.static_dir.clone(),
            state: AppState {
                backend,
                model: args.model.clone(),
            },
        })
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.addr).await.map_err(|e|
            format!("Failed to bind proxy server to {}: {}. Try a different port.", self.addr, e)
        )?;
        info!("Proxy server listening on: http://{}", listener.local_addr()?);

        let app = api::router(self.state.clone(), &self.static_dir);
        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
