//! Server Implementation
//!
//! HTTP 服务器与实时 TCP 服务的启动和管理

use crate::api;
use crate::core::{Config, ServerState};
use crate::realtime::start_realtime_server;
use crate::utils::{AppError, AppResult};

/// HTTP + realtime server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for sharing with tests)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config),
        };

        state.start_background_tasks();

        // 实时 TCP 服务
        let realtime_addr = format!("0.0.0.0:{}", self.config.realtime_tcp_port);
        let hub = state.hub.clone();
        let dispatcher = state.dispatcher.clone();
        let realtime_shutdown = state.shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) =
                start_realtime_server(&realtime_addr, hub, dispatcher, realtime_shutdown).await
            {
                tracing::error!("Realtime server failed: {}", e);
            }
        });

        let app = api::create_router(state.clone());
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("🍽️ Floor Server starting on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("HTTP bind failed: {}", e)))?;

        let shutdown_token = state.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                shutdown_token.cancel();
            })
            .await
            .map_err(|e| AppError::internal(format!("HTTP server failed: {}", e)))?;

        Ok(())
    }
}
