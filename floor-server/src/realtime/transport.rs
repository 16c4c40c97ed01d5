//! Framed TCP transport
//!
//! 帧格式: 4 字节小端长度 + JSON 负载。入站负载是 [`ClientEvent`]，
//! 出站是 [`Envelope`]。每个连接一读一写两个任务，写侧消费 hub
//! 注册时拿到的 mpsc 接收端。

use std::sync::Arc;

use shared::message::{ClientEvent, Envelope};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::dispatcher::EventDispatcher;
use crate::hub::BroadcastHub;
use crate::utils::{AppError, AppResult};

/// 单帧上限，超过视为协议违例
const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Accept loop; runs until the shutdown token fires
pub async fn start_realtime_server(
    addr: &str,
    hub: Arc<BroadcastHub>,
    dispatcher: Arc<EventDispatcher>,
    shutdown: CancellationToken,
) -> AppResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Realtime bind {} failed: {}", addr, e)))?;
    info!(addr, "Realtime server listening");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Realtime server shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "Client connected");
                        let hub = hub.clone();
                        let dispatcher = dispatcher.clone();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, hub, dispatcher, shutdown).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "Accept failed"),
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    hub: Arc<BroadcastHub>,
    dispatcher: Arc<EventDispatcher>,
    shutdown: CancellationToken,
) {
    let (reader, writer) = stream.into_split();
    let (conn, rx) = hub.register();
    info!(conn = conn.id(), "Connection registered");

    let write_task = tokio::spawn(write_loop(writer, rx, shutdown.clone()));

    // 读循环：一帧处理到底再读下一帧
    let mut reader = reader;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = read_frame(&mut reader) => {
                match frame {
                    Ok(payload) => match serde_json::from_slice::<ClientEvent>(&payload) {
                        Ok(event) => {
                            if let Err(e) = dispatcher.dispatch(&conn, event).await {
                                warn!(conn = conn.id(), error = %e, "Event failed");
                            }
                        }
                        Err(e) => {
                            warn!(conn = conn.id(), error = %e, "Malformed frame rejected");
                        }
                    },
                    Err(e) => {
                        debug!(conn = conn.id(), error = %e, "Read loop ended");
                        break;
                    }
                }
            }
        }
    }

    hub.unregister(&conn);
    write_task.abort();
    info!(conn = conn.id(), "Connection closed");
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { return };
                match envelope.to_bytes() {
                    Ok(payload) => {
                        if let Err(e) = write_frame(&mut writer, &payload).await {
                            debug!(error = %e, "Write loop ended");
                            return;
                        }
                    }
                    Err(e) => error!(error = %e, "Envelope serialization failed"),
                }
            }
        }
    }
}

async fn read_frame(reader: &mut OwnedReadHalf) -> AppResult<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| AppError::internal(format!("Read len failed: {}", e)))?;

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(AppError::validation(format!("Frame too large: {}", len)));
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| AppError::internal(format!("Read payload failed: {}", e)))?;
    Ok(payload)
}

async fn write_frame(writer: &mut OwnedWriteHalf, payload: &[u8]) -> AppResult<()> {
    let mut data = Vec::with_capacity(4 + payload.len());
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(payload);
    writer
        .write_all(&data)
        .await
        .map_err(|e| AppError::internal(format!("Write failed: {}", e)))
}
