//! The heartbeat job periodically writes a heartbeat packet on the session connection.
//!
//! It only writes, through the same [`Writer`] as the session loop. A write failure is
//! reported to the session loop through a channel, the job never retries nor closes the
//! connection itself.
use std::{sync::Arc, time::Duration};

use engineio_client_core::{Packet, PacketKind};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{config::HeartbeatMode, errors::TransportError, transport::ws::Writer};

/// Handle to a running heartbeat job.
///
/// Dropping it also stops the job, but only [`Heartbeat::stop`] waits for it to exit.
pub(crate) struct Heartbeat {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Spawn the heartbeat job. Nothing is spawned if the heartbeat is disabled.
    pub(crate) fn spawn<S>(
        writer: Arc<Writer<S>>,
        interval: Duration,
        mode: HeartbeatMode,
        err_tx: mpsc::Sender<TransportError>,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let kind = match mode {
            HeartbeatMode::Ping => PacketKind::Ping,
            HeartbeatMode::Pong => PacketKind::Pong,
            HeartbeatMode::Disabled => {
                return Self {
                    stop_tx: None,
                    handle: None,
                };
            }
        };
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            if let Err(e) = heartbeat_job(&writer, interval, kind, stop_rx).await {
                #[cfg(feature = "tracing")]
                tracing::debug!("heartbeat write failed: {e}");
                err_tx.try_send(e).ok();
            }
        });
        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the job and wait for it to exit.
    ///
    /// Once this returns the job will not write anything anymore.
    pub(crate) async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            stop_tx.send(()).ok();
        }
        if let Some(handle) = self.handle.take() {
            handle.await.ok();
        }
    }
}

async fn heartbeat_job<S>(
    writer: &Writer<S>,
    interval: Duration,
    kind: PacketKind,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    #[cfg(feature = "tracing")]
    tracing::debug!(?interval, ?kind, "heartbeat routine started");

    let mut interval_tick = tokio::time::interval(interval);
    // The first tick completes immediately
    interval_tick.tick().await;
    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = interval_tick.tick() => (),
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("emitting heartbeat");

        writer.send(Packet::empty(kind)).await?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("heartbeat routine stopped");
    Ok(())
}
