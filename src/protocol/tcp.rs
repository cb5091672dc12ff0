// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP transport for the matrix telnet control interface.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::command::Command;
use crate::config::{DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_PORT, MatrixConfig};
use crate::error::{Error, ProtocolError};
use crate::event::SessionEvent;
use crate::protocol::{LineParser, Protocol};
use crate::subscription::ListenerSlot;

/// TCP client for the matrix control interface.
///
/// One client owns at most one socket. A background task reads the socket,
/// parses each line, and delivers the resulting events to the attached
/// [`ListenerSlot`]. Commands are written one at a time under a timeout; a
/// command that times out tears the connection down and is reported as a
/// disconnect.
///
/// # Examples
///
/// ```no_run
/// use blustream_lib::protocol::{Protocol, TcpClient};
/// use blustream_lib::command::StatusCommand;
///
/// # async fn example() -> blustream_lib::Result<()> {
/// let client = TcpClient::builder("192.168.1.40").port(23).build()?;
/// client.connect().await?;
/// client.send_command(&StatusCommand).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TcpClient {
    address: String,
    timeout: Duration,
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    listeners: RwLock<Weak<ListenerSlot>>,
    connection: Mutex<Option<Connection>>,
    connected: AtomicBool,
    next_id: AtomicU64,
}

/// Longest line accepted from the matrix, in bytes.
const MAX_LINE_LEN: usize = 4096;

type Writer = Box<dyn AsyncWrite + Unpin + Send>;

struct Connection {
    id: u64,
    writer: Writer,
    reader: JoinHandle<()>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("reader_finished", &self.reader.is_finished())
            .finish_non_exhaustive()
    }
}

impl TcpClient {
    /// Creates a client for a `host:port` address with the default timeout.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Creates a builder for the given host.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> TcpClientBuilder {
        TcpClientBuilder::new(host)
    }

    /// Creates a client from a matrix configuration.
    #[must_use]
    pub fn from_config(config: &MatrixConfig) -> Self {
        Self::new(config.address()).with_timeout(config.command_timeout())
    }

    /// Sets the connect and command timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the `host:port` address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the connect and command timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        let slot = self.listeners.read().upgrade();
        match slot {
            Some(slot) => {
                slot.dispatch(&event);
            }
            None => tracing::trace!(?event, "No listener slot attached"),
        }
    }

    /// Drops the connection held in `slot` and reports the disconnect.
    ///
    /// Returns `false` if there was no connection.
    fn close(&self, slot: &mut Option<Connection>, reason: Option<String>, abort_reader: bool) -> bool {
        let Some(connection) = slot.take() else {
            return false;
        };
        self.connected.store(false, Ordering::SeqCst);
        if abort_reader {
            connection.reader.abort();
        }
        drop(connection);

        if let Some(reason) = reason {
            self.emit(SessionEvent::error(reason));
        }
        self.emit(SessionEvent::Disconnected);
        true
    }
}

impl TcpClient {
    /// Opens the session over the stream produced by `connecting`.
    async fn connect_with<F>(&self, connecting: F) -> Result<(), Error>
    where
        F: Future<Output = io::Result<TcpStream>>,
    {
        let mut slot = self.shared.connection.lock().await;
        if slot.is_some() {
            tracing::debug!(address = %self.address, "Already connected");
            return Ok(());
        }

        tracing::debug!(address = %self.address, "Connecting to matrix");
        let stream = match tokio::time::timeout(self.timeout, connecting).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(
                    ProtocolError::ConnectionFailed(format!("{}: {e}", self.address)).into(),
                );
            }
            Err(_) => return Err(ProtocolError::Timeout(self.timeout_ms()).into()),
        };
        if let Err(e) = stream.set_nodelay(true) {
            tracing::trace!(error = %e, "Could not disable Nagle's algorithm");
        }

        let (reader, writer) = stream.into_split();
        self.start_session(&mut slot, reader, Box::new(writer));
        Ok(())
    }

    /// Marks the session live and spawns its read loop.
    fn start_session<R>(&self, slot: &mut Option<Connection>, reader: R, writer: Writer)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);

        self.shared.connected.store(true, Ordering::SeqCst);
        tracing::info!(address = %self.address, "Connected to matrix");
        self.shared.emit(SessionEvent::Connected);

        let reader = tokio::spawn(read_loop(Arc::clone(&self.shared), id, reader));
        *slot = Some(Connection { id, writer, reader });
    }
}

impl Protocol for TcpClient {
    async fn connect(&self) -> Result<(), Error> {
        self.connect_with(TcpStream::connect(&self.address)).await
    }

    async fn disconnect(&self) {
        let mut slot = self.shared.connection.lock().await;
        if self.shared.close(&mut slot, None, true) {
            tracing::info!(address = %self.address, "Disconnected from matrix");
        }
    }

    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<(), Error> {
        let line = command.to_line();
        let mut slot = self.shared.connection.lock().await;
        let Some(connection) = slot.as_mut() else {
            return Err(Error::NotConnected);
        };

        tracing::debug!(command = command.name(), wire = %command.to_wire(), "Sending matrix command");

        match tokio::time::timeout(self.timeout, connection.writer.write_all(line.as_bytes())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Matrix write failed");
                self.shared.close(&mut slot, Some(e.to_string()), true);
                Err(ProtocolError::Io(e).into())
            }
            Err(_) => {
                let timeout_ms = self.timeout_ms();
                tracing::warn!(timeout_ms, command = command.name(), "Matrix command timed out");
                self.shared.close(&mut slot, None, true);
                Err(ProtocolError::Timeout(timeout_ms).into())
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn attach_listeners(&self, listeners: Weak<ListenerSlot>) {
        *self.shared.listeners.write() = listeners;
    }
}

impl Drop for TcpClient {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.shared.connection.try_lock()
            && let Some(connection) = slot.take()
        {
            connection.reader.abort();
        }
    }
}

/// Reads lines until the socket closes, then tears the connection down.
async fn read_loop<R>(shared: Arc<Shared>, id: u64, reader: R)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut parser = LineParser::new();
    let mut buf = Vec::new();
    let mut overlong = false;

    let reason = loop {
        buf.clear();
        let limit = MAX_LINE_LEN as u64;
        match (&mut reader).take(limit).read_until(b'\n', &mut buf).await {
            Ok(0) => {
                tracing::debug!("Matrix closed the connection");
                break None;
            }
            Ok(_) => {
                let complete = buf.last() == Some(&b'\n');
                if overlong || (!complete && buf.len() >= MAX_LINE_LEN) {
                    // Skip the rest of the line once it exceeded the limit.
                    if !overlong {
                        tracing::warn!(limit = MAX_LINE_LEN, "Matrix line too long, discarding");
                        parser.reset();
                        shared.emit(SessionEvent::error(format!(
                            "line exceeds {MAX_LINE_LEN} bytes"
                        )));
                    }
                    overlong = !complete;
                    continue;
                }

                let text = String::from_utf8_lossy(&buf);
                for line in text.split('\r') {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tracing::trace!(line = %line, "Received line");
                    if let Some(event) = parser.parse_line(line) {
                        shared.emit(event);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Matrix read failed");
                break Some(e.to_string());
            }
        }
    };

    let mut slot = shared.connection.lock().await;
    if slot.as_ref().is_some_and(|connection| connection.id == id) {
        shared.close(&mut slot, reason, false);
    }
}

#[derive(Debug)]
pub struct TcpClientBuilder {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpClientBuilder {
    fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
        }
    }

    /// Sets the TCP port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connect and command timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client. No connection is opened.
    ///
    /// # Errors
    ///
    /// Returns error if the host is empty.
    pub fn build(self) -> Result<TcpClient, ProtocolError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }
        Ok(TcpClient::new(format!("{host}:{}", self.port)).with_timeout(self.timeout))
    }
}
