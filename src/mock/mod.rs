//! In-memory SehaMaroc backend for tests and offline demos.
//!
//! Serves the REST contract of all four services from one axum router,
//! seeded with the demo data set. This is a double of the real services,
//! not a second source of truth: behavior follows the backend contract.
//!
//! Lifecycle: bind → spawn background task → return handle with a
//! shutdown channel. Dropping the handle also stops the server.

pub mod error;
pub mod router;
pub mod seed;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;

use tokio::sync::oneshot;

use crate::client::{ApiClient, ApiError};
use crate::config::ServiceEndpoints;
use crate::models::auth::Credentials;
use crate::models::Role;

pub use error::MockError;
pub use router::mock_router;
pub use seed::DEMO_PASSWORD;
pub use state::MockState;

/// Handle to a running mock backend.
pub struct MockServer {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// Start on an ephemeral localhost port with the demo data set.
    pub async fn start() -> Result<Self, MockError> {
        Self::start_on(SocketAddr::from(([127, 0, 0, 1], 0)), MockState::seeded()).await
    }

    pub async fn start_on(addr: SocketAddr, state: MockState) -> Result<Self, MockError> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = mock_router(state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown_signal = async move {
                let _ = shutdown_rx.await;
            };
            tracing::info!(%addr, "Mock backend started");
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal)
                .await
            {
                tracing::error!("Mock backend error: {e}");
            }
            tracing::info!(%addr, "Mock backend stopped");
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every service pointed at this server.
    pub fn endpoints(&self) -> ServiceEndpoints {
        ServiceEndpoints::single(&self.base_url())
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }

    /// Fail the next request with `status`.
    pub fn force_status(&self, status: u16) -> Result<(), MockError> {
        self.state.force_status(status)
    }

    /// Log in as a seeded (or registered) account and return a client
    /// carrying its token.
    pub async fn client_for(&self, email: &str) -> Result<ApiClient, ApiError> {
        let client = ApiClient::new(self.endpoints(), 5)?;
        // One router serves both auth services, so the role only picks a URL.
        let resp = client
            .login(Role::Patient, &Credentials::new(email, DEMO_PASSWORD))
            .await?;
        Ok(client.with_token(resp.token))
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Serve the demo backend on `addr` until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, shutdown: F) -> Result<(), MockError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "Mock backend listening");
    axum::serve(listener, mock_router(MockState::seeded()))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_and_stop_server() {
        let server = MockServer::start().await.unwrap();
        assert!(server.addr().port() > 0);
        assert!(server.base_url().starts_with("http://127.0.0.1:"));

        let resp = reqwest::get(format!("{}/api/requests", server.base_url()))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn forced_status_reaches_client() {
        let server = MockServer::start().await.unwrap();
        let client = server.client_for(seed::PROVIDER_EMAIL).await.unwrap();
        server.force_status(401).unwrap();
        let err = client.list_requests().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(client.list_requests().await.is_ok());
        server.shutdown();
    }
}
