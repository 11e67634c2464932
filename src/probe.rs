//! Connectivity probe gating sync attempts.

use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::remote::RemoteAuthority;

/// Lightweight reachability check run before every sync cycle.
///
/// Connectivity failure is data, not an exceptional condition: a timeout, a
/// transport error, or a negative health response all come back as `false`
/// and never as an error.
pub struct ConnectivityProbe {
    remote: Arc<dyn RemoteAuthority>,
    timeout: Duration,
}

impl ConnectivityProbe {
    pub fn new(remote: Arc<dyn RemoteAuthority>, timeout: Duration) -> Self {
        Self { remote, timeout }
    }

    /// Whether the remote authority currently looks reachable.
    pub async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, self.remote.health_check()).await {
            Ok(Ok(reachable)) => reachable,
            Ok(Err(e)) => {
                warn!("health check failed: {e}");
                false
            }
            Err(_) => {
                warn!("health check timed out after {:?}", self.timeout);
                false
            }
        }
    }
}
