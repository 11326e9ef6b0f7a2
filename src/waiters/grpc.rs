//! gRPC channel waiter.
//!
//! Only channel establishment is checked; no RPC is issued, so the target
//! does not need to expose any particular service.

use tonic::transport::Endpoint;

use crate::config::Target;

use super::{ProbeError, ProbeResult, Waiter};

/// Ready once a gRPC channel to the target can be established.
///
/// The connection attempt is bounded by the target's own timeout. Each probe
/// drives the dial on a short-lived current-thread runtime so the waiter can
/// be called from plain worker threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrpcWaiter;

impl GrpcWaiter {
    fn endpoint_uri(address: &str) -> String {
        if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        }
    }
}

impl Waiter for GrpcWaiter {
    fn probe(&self, name: &str, target: &Target) -> ProbeResult {
        let uri = Self::endpoint_uri(&target.address);
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ProbeError::transient(format!("invalid endpoint {uri} for {name}: {e}")))?
            .connect_timeout(target.timeout);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ProbeError::transient(format!("could not connect to {name}: {e}")))?;

        runtime.block_on(async {
            match tokio::time::timeout(target.timeout, endpoint.connect()).await {
                Ok(Ok(_channel)) => Ok(()),
                Ok(Err(e)) => Err(ProbeError::transient(format!(
                    "could not connect to {name}: {e}"
                ))),
                Err(_) => Err(ProbeError::transient(format!(
                    "could not connect to {name}: no channel after {:?}",
                    target.timeout
                ))),
            }
        })
    }
}
