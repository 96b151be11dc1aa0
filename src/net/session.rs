//! # Interactive Session
//!
//! Two tokio tasks share one connection:
//!
//! ```text
//!            ┌──────────────┐   Action::MessageReceived   ┌──────────┐
//!  socket ──▶│  receiver    │ ──────────────────────────▶ │          │
//!  (read)    └──────────────┘                             │  event   │
//!                   ▲  StopFlag                           │  loop    │
//!                   ▼                                     │          │
//!            ┌──────────────┐   Vec<u8> (Session::send)   │          │
//!  socket ◀──│  writer      │ ◀────────────────────────── │          │
//!  (write)   └──────────────┘                             └──────────┘
//! ```
//!
//! Either task sets the `StopFlag` when it hits the end of the stream or an
//! I/O error. The receiver re-checks the flag after every read timeout, so it
//! notices a stop raised elsewhere within one timeout period.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::core::action::Action;

/// Keep-alive sent by the server. A read returning exactly these bytes is
/// dropped without being displayed.
pub const KEEPALIVE_PAYLOAD: &[u8] = b"ping";
/// Largest chunk handed to the display from a single read.
pub const RECV_BUFFER_SIZE: usize = 1024;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Shared stop signal. Set once, never cleared.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Decode one read for display. Returns `None` for the keep-alive.
///
/// Reads are not framed: a chunk may hold part of a message or several
/// messages at once, and is shown as-is.
pub fn decode_payload(bytes: &[u8]) -> Option<String> {
    if bytes == KEEPALIVE_PAYLOAD {
        return None;
    }
    Some(String::from_utf8_lossy(bytes).into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// How long a single read may block before the stop flag is re-checked.
    pub read_timeout: Duration,
    /// How long shutdown waits for each task before aborting it.
    pub join_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }
}

/// A running session over one connection.
pub struct Session {
    stop: StopFlag,
    outgoing: Option<UnboundedSender<Vec<u8>>>,
    receiver: JoinHandle<()>,
    writer: JoinHandle<()>,
    join_timeout: Duration,
}

impl Session {
    /// Split `stream` and spawn the receiver and writer tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S>(stream: S, options: &SessionOptions, events: UnboundedSender<Action>) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let stop = StopFlag::new();
        let (outgoing, queued) = mpsc::unbounded_channel();

        let receiver = tokio::spawn(receive_loop(
            read_half,
            stop.clone(),
            options.read_timeout,
            events.clone(),
        ));
        let writer = tokio::spawn(send_loop(write_half, queued, stop.clone(), events));

        info!("Session started");
        Self {
            stop,
            outgoing: Some(outgoing),
            receiver,
            writer,
            join_timeout: options.join_timeout,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_set()
    }

    /// Queue bytes for the writer. Returns `false` once the session has
    /// stopped or the writer is gone.
    pub fn send(&self, bytes: Vec<u8>) -> bool {
        if self.stop.is_set() {
            return false;
        }
        match &self.outgoing {
            Some(outgoing) => outgoing.send(bytes).is_ok(),
            None => false,
        }
    }

    /// Stop both tasks and close the connection.
    ///
    /// Queued writes are flushed before the write half is shut down. Both tasks
    /// are awaited together, and one that has not finished once the join
    /// timeout elapses is aborted.
    pub async fn shutdown(mut self) {
        self.stop.set();
        // Closing the queue lets the writer drain and shut the stream down.
        drop(self.outgoing.take());

        // Both tasks share one join window
        let (receiver, writer) = tokio::join!(
            tokio::time::timeout(self.join_timeout, &mut self.receiver),
            tokio::time::timeout(self.join_timeout, &mut self.writer),
        );
        if receiver.is_err() {
            warn!(
                "Receiver did not stop within {:?}, aborting it",
                self.join_timeout
            );
            self.receiver.abort();
        }
        if writer.is_err() {
            warn!(
                "Writer did not stop within {:?}, aborting it",
                self.join_timeout
            );
            self.writer.abort();
        }
        info!("Session closed");
    }
}

async fn receive_loop<R>(
    mut reader: R,
    stop: StopFlag,
    read_timeout: Duration,
    events: UnboundedSender<Action>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    while !stop.is_set() {
        let read = match tokio::time::timeout(read_timeout, reader.read(&mut buf)).await {
            Ok(read) => read,
            // Nothing arrived; loop around to re-check the stop flag.
            Err(_) => continue,
        };

        match read {
            Ok(0) => {
                if !stop.is_set() {
                    info!("Server closed the connection");
                    emit(&events, Action::ServerDisconnected);
                }
                break;
            }
            Ok(n) => match decode_payload(&buf[..n]) {
                Some(text) => {
                    debug!("Received {} bytes", n);
                    emit(&events, Action::MessageReceived(text));
                }
                None => debug!("Keep-alive received"),
            },
            Err(e) => {
                if !stop.is_set() {
                    warn!("Receive failed: {}", e);
                    emit(&events, Action::ReceiveFailed(e.to_string()));
                }
                break;
            }
        }
    }

    stop.set();
    debug!("Receiver exiting");
}

async fn send_loop<W>(
    mut writer: W,
    mut queued: UnboundedReceiver<Vec<u8>>,
    stop: StopFlag,
    events: UnboundedSender<Action>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(bytes) = queued.recv().await {
        if let Err(e) = write_chunk(&mut writer, &bytes).await {
            warn!("Send failed: {}", e);
            emit(&events, Action::SendFailed(e.to_string()));
            stop.set();
            break;
        }
        debug!("Sent {} bytes", bytes.len());
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Write half shutdown failed: {}", e);
    }
    debug!("Writer exiting");
}

async fn write_chunk<W>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    writer.flush().await
}

fn emit(events: &UnboundedSender<Action>, action: Action) {
    if events.send(action).is_err() {
        debug!("Dropping session event: receiver closed");
    }
}
