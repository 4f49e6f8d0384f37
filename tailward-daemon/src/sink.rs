//! Network delivery sinks.
//!
//! Streams hand formatted messages to an unbounded queue and move on. A
//! background task drains the queue and owns the socket: TCP connects
//! lazily and reconnects with a bounded, fixed-delay retry per message; UDP
//! sends one datagram per message. The task ends once every queue sender
//! has been dropped and the queue is empty.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tailward_core::{Protocol, SinkSettings};
use tailward_stream::Sink;

use crate::error::DaemonError;

/// Start the sink task for `settings` and return the queue to submit into.
pub async fn spawn(
    settings: SinkSettings,
) -> Result<(Arc<dyn Sink>, JoinHandle<()>), DaemonError> {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let handle = match settings.protocol {
        Protocol::Tcp => tokio::spawn(tcp_task(settings, rx)),
        Protocol::Udp => {
            let socket = bind_udp(&settings).await?;
            tokio::spawn(udp_task(settings, socket, rx))
        }
    };
    Ok((Arc::new(tx), handle))
}

// ---------------------------------------------------------------------------
// TCP
// ---------------------------------------------------------------------------

async fn tcp_task(settings: SinkSettings, mut rx: mpsc::UnboundedReceiver<String>) {
    let endpoint = settings.endpoint();
    let mut connection: Option<TcpStream> = None;

    while let Some(message) = rx.recv().await {
        send_tcp(&settings, &endpoint, &mut connection, message.as_bytes()).await;
    }

    if let Some(mut stream) = connection {
        let _ = stream.shutdown().await;
    }
    tracing::debug!(endpoint = %endpoint, "tcp sink closed");
}

/// Deliver one message, reconnecting as needed. Returns whether it was written.
async fn send_tcp(
    settings: &SinkSettings,
    endpoint: &str,
    connection: &mut Option<TcpStream>,
    payload: &[u8],
) -> bool {
    for attempt in 1..=settings.max_connect_attempts {
        let stream = match connection {
            Some(stream) => stream,
            None => match TcpStream::connect(endpoint).await {
                Ok(stream) => {
                    tracing::info!(endpoint = %endpoint, "connected to remote sink");
                    connection.insert(stream)
                }
                Err(err) => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        attempt,
                        max_attempts = settings.max_connect_attempts,
                        error = %err,
                        "error connecting to remote sink"
                    );
                    if attempt < settings.max_connect_attempts {
                        tokio::time::sleep(settings.connect_retry_delay).await;
                    }
                    continue;
                }
            },
        };

        match stream.write_all(payload).await {
            Ok(()) => return true,
            Err(err) => {
                tracing::warn!(endpoint = %endpoint, error = %err, "write to remote sink failed; reconnecting");
                *connection = None;
            }
        }
    }

    tracing::warn!(
        endpoint = %endpoint,
        attempts = settings.max_connect_attempts,
        "dropping message after exhausting connect attempts"
    );
    false
}

// ---------------------------------------------------------------------------
// UDP
// ---------------------------------------------------------------------------

async fn bind_udp(settings: &SinkSettings) -> Result<UdpSocket, DaemonError> {
    let endpoint = settings.endpoint();
    let sink_err = |source| DaemonError::Sink {
        endpoint: endpoint.clone(),
        source,
    };

    let remote = tokio::net::lookup_host(&endpoint)
        .await
        .map_err(sink_err)?
        .next()
        .ok_or_else(|| {
            sink_err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "host resolved to no addresses",
            ))
        })?;
    let local: SocketAddr = if remote.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };

    let socket = UdpSocket::bind(local).await.map_err(sink_err)?;
    socket.connect(remote).await.map_err(sink_err)?;
    Ok(socket)
}

async fn udp_task(
    settings: SinkSettings,
    socket: UdpSocket,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    let endpoint = settings.endpoint();
    while let Some(message) = rx.recv().await {
        if let Err(err) = socket.send(message.as_bytes()).await {
            tracing::warn!(endpoint = %endpoint, error = %err, "udp send failed; message dropped");
        }
    }
    tracing::debug!(endpoint = %endpoint, "udp sink closed");
}
