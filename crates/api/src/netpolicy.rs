//! Optional network-layer gate for the admin surface.
//!
//! A coarse allowlist applied before authentication on admin routes. It is
//! configuration, not code: with no allowlist configured the gate passes
//! everything through, and no address is hardcoded anywhere.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    middleware::Next,
    response::Response,
};

use crate::app::errors;

#[derive(Debug, Clone)]
pub struct NetworkPolicy {
    allowed: Option<Arc<[IpAddr]>>,
}

impl NetworkPolicy {
    /// No gate: every peer passes.
    pub fn allow_all() -> Self {
        Self { allowed: None }
    }

    pub fn allowlist(addrs: Vec<IpAddr>) -> Self {
        Self {
            allowed: Some(addrs.into()),
        }
    }

    pub fn from_config(allowed: Option<Vec<IpAddr>>) -> Self {
        match allowed {
            Some(addrs) => Self::allowlist(addrs),
            None => Self::allow_all(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.allowed.is_some()
    }

    pub fn allows(&self, addr: IpAddr) -> bool {
        match &self.allowed {
            None => true,
            Some(list) => list.contains(&addr),
        }
    }
}

pub async fn network_policy_middleware(
    State(policy): State<NetworkPolicy>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    if !policy.is_enabled() {
        return Ok(next.run(req).await);
    }

    // Requires the server to be driven with connect info; if the peer address
    // is unknown while a policy is configured, fail closed.
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match peer {
        Some(ip) if policy.allows(ip) => Ok(next.run(req).await),
        Some(ip) => {
            tracing::warn!("admin access denied for peer {ip}");
            Err(errors::forbidden("admin access is restricted by network policy"))
        }
        None => {
            tracing::warn!("admin access denied: peer address unavailable");
            Err(errors::forbidden("admin access is restricted by network policy"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_passes_everything() {
        let policy = NetworkPolicy::allow_all();
        assert!(policy.allows("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn allowlist_is_exact() {
        let policy = NetworkPolicy::allowlist(vec![
            "127.0.0.1".parse().unwrap(),
            "::1".parse().unwrap(),
        ]);
        assert!(policy.allows("127.0.0.1".parse().unwrap()));
        assert!(policy.allows("::1".parse().unwrap()));
        assert!(!policy.allows("127.0.0.2".parse().unwrap()));
    }
}
