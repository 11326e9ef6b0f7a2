//! TCP connect waiter.

use std::net::{TcpStream, ToSocketAddrs};

use crate::config::Target;

use super::{ProbeError, ProbeResult, Waiter};

/// Ready once a TCP connection to the target address succeeds.
///
/// Every resolved address is tried in turn, each bounded by the target's
/// timeout. The connection is closed straight away.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpWaiter;

impl Waiter for TcpWaiter {
    fn probe(&self, name: &str, target: &Target) -> ProbeResult {
        let addrs = target
            .address
            .to_socket_addrs()
            .map_err(|e| ProbeError::transient(format!("could not connect to {name}: {e}")))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, target.timeout) {
                Ok(_stream) => return Ok(()),
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(e) => ProbeError::transient(format!("could not connect to {name}: {e}")),
            None => ProbeError::transient(format!(
                "could not connect to {name}: no addresses for {}",
                target.address
            )),
        })
    }
}
