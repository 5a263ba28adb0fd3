//! Listener setup and the serve loop.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::ServerError;
use crate::settings::ServerSettings;

/// Binds the configured address.
pub async fn bind(settings: &ServerSettings) -> Result<TcpListener, ServerError> {
    let addr = settings.socket_addr();
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serves `router` on `listener` until `shutdown` resolves. Handlers see the
/// peer address through [`axum::extract::ConnectInfo`].
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(target: "webterm", addr = %addr, "terminal server listening");

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await?;

    info!(target: "webterm", "terminal server stopped");
    Ok(())
}
