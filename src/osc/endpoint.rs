use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use super::codec::{self, OscCodecError};
use crate::control::ControlMessage;
use crate::settings::OscNodeSettings;

/// Largest UDP payload we accept
const MAX_DATAGRAM: usize = 65_507;

/// Pause after a failed receive, doubled per consecutive failure up to the cap
const RECEIVE_BACKOFF: Duration = Duration::from_millis(5);
const MAX_RECEIVE_BACKOFF: Duration = Duration::from_secs(1);

/// A decoded message and the node it arrived on
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub node: usize,
    pub message: ControlMessage,
}

/// One configured peer: a local socket for receiving and a fixed remote
/// address for replies and broadcasts.
#[derive(Debug)]
pub struct OscEndpoint {
    node: usize,
    socket: Arc<UdpSocket>,
    remote: SocketAddr,
    colors_as_json: bool,
}

impl OscEndpoint {
    /// Bind the local port and spawn the receive task. Decoded messages are
    /// forwarded to `inbound` until the receiver is dropped.
    pub async fn bind(
        node: usize,
        settings: &OscNodeSettings,
        inbound: mpsc::UnboundedSender<Inbound>,
    ) -> io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(("0.0.0.0", settings.local_port)).await?);
        let remote = tokio::net::lookup_host((settings.remote_host.as_str(), settings.remote_port))
            .await?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address for {}", settings.remote_host),
                )
            })?;

        tokio::spawn(receive_loop(node, Arc::clone(&socket), inbound));

        tracing::info!(
            node,
            local = %socket.local_addr()?,
            %remote,
            "OSC node listening"
        );
        Ok(Self {
            node,
            socket,
            remote,
            colors_as_json: settings.send_colours_as_json,
        })
    }

    pub fn node(&self) -> usize {
        self.node
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Encode and send without waiting. A full socket buffer is an error;
    /// the message is not retried.
    pub fn send(&self, message: &ControlMessage) -> Result<(), OscCodecError> {
        let bytes = codec::encode(message, self.colors_as_json)?;
        self.socket.try_send_to(&bytes, self.remote)?;
        Ok(())
    }
}

async fn receive_loop(node: usize, socket: Arc<UdpSocket>, inbound: mpsc::UnboundedSender<Inbound>) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut failures = 0u32;
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => {
                failures = 0;
                received
            }
            Err(e) => {
                // ICMP port-unreachable from a previous send surfaces here on some platforms
                failures = failures.saturating_add(1);
                tracing::debug!(node, failures, "OSC receive error: {}", e);
                if inbound.is_closed() {
                    return;
                }
                tokio::time::sleep(receive_backoff(failures)).await;
                continue;
            }
        };
        match codec::decode(&buf[..len]) {
            Ok(messages) => {
                for message in messages {
                    if inbound.send(Inbound { node, message }).is_err() {
                        tracing::debug!(node, "inbound channel closed, stopping receiver");
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(node, %from, "Dropping OSC packet: {}", e),
        }
    }
}

fn receive_backoff(failures: u32) -> Duration {
    let factor = 1u32 << failures.saturating_sub(1).min(16);
    RECEIVE_BACKOFF.saturating_mul(factor).min(MAX_RECEIVE_BACKOFF)
}
