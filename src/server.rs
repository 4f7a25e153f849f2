//! Listener wiring: binds the three endpoints and serves them together.
//!
//! The producer and consumer WebSocket endpoints and the HTTP endpoint each
//! get their own [`TcpListener`]. All three share one [`AppState`], so they
//! see the same connection registry.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::ws::{consumer_router, producer_router};

/// Addresses the listeners actually bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundAddrs {
    /// Producer WebSocket endpoint.
    pub game: SocketAddr,
    /// HTTP endpoint.
    pub web: SocketAddr,
    /// Consumer WebSocket endpoint.
    pub ws: SocketAddr,
}

/// Bound but not yet serving relay.
#[derive(Debug)]
pub struct RelayServer {
    state: AppState,
    game: TcpListener,
    web: TcpListener,
    ws: TcpListener,
    addrs: BoundAddrs,
}

impl RelayServer {
    /// Binds all three listeners for `config`.
    ///
    /// Port `0` binds an ephemeral port; see [`RelayServer::addrs`].
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Io`] if any listener fails to bind.
    pub async fn bind(config: RelayConfig) -> Result<Self, RelayError> {
        let game = TcpListener::bind(config.game_addr()).await?;
        let web = TcpListener::bind(config.web_addr()).await?;
        let ws = TcpListener::bind(config.ws_addr()).await?;
        let addrs = BoundAddrs {
            game: game.local_addr()?,
            web: web.local_addr()?,
            ws: ws.local_addr()?,
        };

        Ok(Self {
            state: AppState::new(config),
            game,
            web,
            ws,
            addrs,
        })
    }

    /// Addresses the listeners are bound to.
    #[must_use]
    pub const fn addrs(&self) -> BoundAddrs {
        self.addrs
    }

    /// Shared state served by every listener.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Serves all listeners until `shutdown` resolves.
    ///
    /// On shutdown the listeners are dropped; connections still open are
    /// cut off when the runtime stops.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Io`] if a listener fails while serving.
    pub async fn run<F>(self, shutdown: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            state,
            game,
            web,
            ws,
            addrs,
        } = self;

        let domain = state.config.domain.clone();
        tracing::info!(addr = %addrs.web, "http server listening");
        tracing::info!(addr = %addrs.game, url = %format!("ws://{domain}:{}", addrs.game.port()), "game websocket listening");
        tracing::info!(addr = %addrs.ws, url = %format!("ws://{domain}:{}", addrs.ws.port()), "web websocket listening");

        let producer_app = producer_router(state.clone()).layer(TraceLayer::new_for_http());
        let consumer_app = consumer_router(state.clone()).layer(TraceLayer::new_for_http());
        let http_app = api::build_router(&state.config)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state);

        let serve_all = async {
            tokio::try_join!(
                async {
                    axum::serve(
                        game,
                        producer_app.into_make_service_with_connect_info::<SocketAddr>(),
                    )
                    .await
                },
                async {
                    axum::serve(
                        ws,
                        consumer_app.into_make_service_with_connect_info::<SocketAddr>(),
                    )
                    .await
                },
                async {
                    axum::serve(web, http_app.into_make_service_with_connect_info::<SocketAddr>())
                        .await
                },
            )
        };

        tokio::select! {
            result = serve_all => {
                result?;
                Ok(())
            }
            () = shutdown => {
                tracing::info!("shutting down listeners");
                Ok(())
            }
        }
    }
}

/// Resolves on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    fn ephemeral_config() -> RelayConfig {
        RelayConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            game_port: 0,
            web_port: 0,
            ws_port: 0,
            ..RelayConfig::default()
        }
    }

    #[tokio::test]
    async fn bind_assigns_distinct_ports() {
        let Ok(server) = RelayServer::bind(ephemeral_config()).await else {
            panic!("ephemeral bind must succeed");
        };
        let addrs = server.addrs();
        assert_ne!(addrs.game.port(), 0);
        assert_ne!(addrs.game.port(), addrs.web.port());
        assert_ne!(addrs.web.port(), addrs.ws.port());
    }

    #[tokio::test]
    async fn run_returns_ok_on_shutdown() {
        let Ok(server) = RelayServer::bind(ephemeral_config()).await else {
            panic!("ephemeral bind must succeed");
        };
        let result = server.run(async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn bind_conflict_is_io_error() {
        let Ok(first) = RelayServer::bind(ephemeral_config()).await else {
            panic!("ephemeral bind must succeed");
        };
        let config = RelayConfig {
            game_port: first.addrs().game.port(),
            ..ephemeral_config()
        };
        let result = RelayServer::bind(config).await;
        assert!(matches!(result, Err(RelayError::Io(_))));
    }
}
