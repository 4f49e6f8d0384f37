use std::time::Duration;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use tailward_core::{Config, LogFormat};
use tailward_stream::StreamRegistry;

use crate::error::{io_err, DaemonError};
use crate::pidfile::PidFile;
use crate::sink;

const SINK_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Start the forwarder and block the current thread until it exits.
///
/// Tracing is initialised from the config, the pid file (if configured) is
/// held for the lifetime of the call, and all streams share a single-threaded
/// reactor.
pub fn start_blocking(config: Config) -> Result<(), DaemonError> {
    init_tracing(&config.log_level, config.log_format);
    let _pidfile = config.pidfile.as_deref().map(PidFile::create).transpose()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run every configured stream until a signal or an `exit` line arrives.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    let registry = StreamRegistry::from_config(&config);
    let sink_settings = config.sink_settings();
    let endpoint = sink_settings.endpoint();
    let protocol = sink_settings.protocol;
    let (sink, sink_handle) = sink::spawn(sink_settings).await?;
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    tracing::info!(
        streams = registry.len(),
        endpoint = %endpoint,
        protocol = ?protocol,
        "tailward started",
    );

    let streams_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            registry.run(sink, shutdown).await?;
            if let Err(TryRecvError::Empty) = shutdown_rx.try_recv() {
                tracing::warn!("all streams stopped; waiting for a shutdown signal");
                let _ = shutdown_rx.recv().await;
            }
            Ok::<(), DaemonError>(())
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(signal_task(shutdown, shutdown_rx))
    };

    let (streams_result, signal_result) = tokio::join!(streams_handle, signal_handle);
    handle_join("streams", streams_result)?;
    handle_join("signal_handler", signal_result)?;

    drain_sink(sink_handle).await;
    tracing::info!("tailward stopped");
    Ok(())
}

async fn signal_task(
    shutdown: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    tokio::select! {
        _ = shutdown_rx.recv() => return Ok(()),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| DaemonError::Task {
                task: "signal_handler",
                reason: format!("ctrl-c handler failed: {err}"),
            })?;
            tracing::info!("received ctrl-c, shutting down");
        }
        result = terminate() => {
            result?;
            tracing::info!("received SIGTERM, shutting down");
        }
    }
    let _ = shutdown.send(());
    Ok(())
}

#[cfg(unix)]
async fn terminate() -> Result<(), DaemonError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).map_err(|err| DaemonError::Task {
        task: "signal_handler",
        reason: format!("SIGTERM handler failed: {err}"),
    })?;
    term.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> Result<(), DaemonError> {
    std::future::pending().await
}

/// Give queued messages a bounded window to reach the remote end.
async fn drain_sink(handle: JoinHandle<()>) {
    match tokio::time::timeout(SINK_DRAIN_TIMEOUT, handle).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::warn!(error = %err, "sink task failed"),
        Err(_) => tracing::warn!("sink did not drain in time; pending messages dropped"),
    }
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task {
            task,
            reason: format!("join failure: {err}"),
        }),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(false);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
