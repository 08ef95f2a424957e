//! Push channel transport.
//!
//! One task per open channel: connect, forward parsed frames as tracker
//! events, answer pings, and stop on error, close, or shutdown signal.
//! Malformed frames are logged and dropped; they never reach the tracker
//! and never crash it.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::error::ChannelError;

use super::event::{ChannelFrame, TrackerEvent};

/// Handshake deadline for opening the channel.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs one push channel session bound to `task_id`, feeding events into the
/// tracker until the connection ends or the shutdown signal fires.
pub(crate) async fn run_channel(
    url: String,
    task_id: String,
    events: mpsc::Sender<TrackerEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    debug!(task_id = %task_id, url = %url, "connecting push channel");

    let connect = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url.as_str()));
    let stream = tokio::select! {
        _ = &mut shutdown => {
            debug!(task_id = %task_id, "channel cancelled during connect");
            return;
        }
        result = connect => match result {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                let error = ChannelError::Connect {
                    task_id: task_id.clone(),
                    message: e.to_string(),
                };
                let _ = events
                    .send(TrackerEvent::ChannelFailed { task_id, error })
                    .await;
                return;
            }
            Err(_) => {
                let error = ChannelError::Connect {
                    task_id: task_id.clone(),
                    message: "handshake timed out".to_string(),
                };
                let _ = events
                    .send(TrackerEvent::ChannelFailed { task_id, error })
                    .await;
                return;
            }
        },
    };

    let _ = events
        .send(TrackerEvent::ChannelOpened {
            task_id: task_id.clone(),
        })
        .await;

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!(task_id = %task_id, "channel shutdown requested");
                // Best effort close, no acknowledgement awaited
                let _ = write.send(Message::Close(None)).await;
                return;
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match ChannelFrame::parse(&text) {
                    Ok(frame) => {
                        let _ = events.send(TrackerEvent::Frame(frame)).await;
                    }
                    Err(e) => {
                        warn!(task_id = %task_id, "dropping malformed frame: {}", e);
                    }
                },
                Some(Ok(Message::Ping(payload))) => {
                    let _ = write.send(Message::Pong(payload)).await;
                }
                Some(Ok(Message::Close(_))) => {
                    debug!(task_id = %task_id, "push channel closed by server");
                    let _ = events
                        .send(TrackerEvent::ChannelClosed { task_id })
                        .await;
                    return;
                }
                Some(Ok(_)) => {
                    // Binary and pong frames carry nothing for the tracker
                }
                Some(Err(e)) => {
                    let error = ChannelError::Transport(e.to_string());
                    let _ = events
                        .send(TrackerEvent::ChannelFailed { task_id, error })
                        .await;
                    return;
                }
                None => {
                    let _ = events
                        .send(TrackerEvent::ChannelClosed { task_id })
                        .await;
                    return;
                }
            }
        }
    }
}
