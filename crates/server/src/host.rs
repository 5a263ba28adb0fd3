use std::convert::Infallible;
use std::net::SocketAddr;

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use webterm_core::HostContext;

use crate::routes::AppState;

/// The caller's [`HostContext`]: the user from the trusted header, when one
/// is configured, and the peer address.
#[derive(Debug, Clone)]
pub struct Caller(pub HostContext);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut host = HostContext::anonymous();

        if let Some(header) = state.settings.trusted_user_header.as_deref() {
            let user = parts
                .headers
                .get(header)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|user| !user.is_empty());
            if let Some(user) = user {
                host = host.with_user(user);
            }
        }

        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            host = host.with_remote_addr(*addr);
        }

        Ok(Caller(host))
    }
}
