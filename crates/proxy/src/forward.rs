//! Opaque packet forwarding after authentication.
//!
//! Two symmetric pipes, one per direction, each an unbounded
//! read-one/write-one loop. The first pipe to fail decides the connection's
//! exit status; both transports are then closed. Nothing in this phase
//! inspects or rewrites packets.

use crate::transport::PacketConn;
use ferry_platform::{FerryError, FerryResult};
use std::sync::Arc;
use tracing::debug;

/// The post-authentication relay for one proxied connection.
pub struct Forwarder {
    upstream: Arc<dyn PacketConn>,
    downstream: Arc<dyn PacketConn>,
}

impl Forwarder {
    /// Creates a forwarder over the two authenticated transports.
    pub fn new(upstream: Arc<dyn PacketConn>, downstream: Arc<dyn PacketConn>) -> Self {
        Self {
            upstream,
            downstream,
        }
    }

    /// Relays packets in both directions until either side fails or closes.
    ///
    /// Each direction runs as its own task, so a blocked read on one
    /// transport never stalls the other direction. Returns the first pipe
    /// error; both transports are closed before returning.
    pub async fn run(self) -> FerryResult<()> {
        let up = Arc::clone(&self.upstream);
        let down = Arc::clone(&self.downstream);
        let mut up_to_down = tokio::spawn(async move { pipe(up, down).await });

        let up = Arc::clone(&self.upstream);
        let down = Arc::clone(&self.downstream);
        let mut down_to_up = tokio::spawn(async move { pipe(down, up).await });

        let result = tokio::select! {
            r = &mut up_to_down => {
                down_to_up.abort();
                r
            }
            r = &mut down_to_up => {
                up_to_down.abort();
                r
            }
        };

        self.upstream.close().await;
        self.downstream.close().await;
        debug!("forwarding finished, transports closed");

        match result {
            Ok(status) => status,
            Err(err) => Err(FerryError::Other(Box::new(err))),
        }
    }
}

async fn pipe(src: Arc<dyn PacketConn>, dst: Arc<dyn PacketConn>) -> FerryResult<()> {
    loop {
        let packet = src.read_packet().await?;
        dst.write_packet(&packet).await?;
    }
}
