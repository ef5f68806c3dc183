//! TS tap: reads the sink's transport-stream output into the fan-out ring.
//!
//! Upstream never blocks on slow downstreams; the ring drops oldest chunks
//! in live mode. Downstream consumers (an HLS edge, archivers) pull from
//! the ring out of process scope.

use headend_runtime::TsRingBuffer;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

const READ_CHUNK_BYTES: usize = 32 * 1024;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Connect to the TS endpoint and pump bytes into the ring until aborted.
/// Transport drops reconnect with a fixed delay.
pub async fn run(endpoint: String, ring: Arc<TsRingBuffer>) {
    loop {
        let mut stream = match TcpStream::connect(&endpoint).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(%endpoint, %err, "TS tap connect failed; retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };
        tracing::info!(%endpoint, "TS tap connected");

        let mut buf = vec![0u8; READ_CHUNK_BYTES];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) => {
                    tracing::warn!(%endpoint, "TS source closed; reconnecting");
                    break;
                }
                Ok(n) => ring.put(buf[..n].to_vec()),
                Err(err) => {
                    tracing::warn!(%endpoint, %err, "TS read failed; reconnecting");
                    break;
                }
            }
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
