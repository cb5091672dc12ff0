// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the TCP session against a fake matrix.

use std::sync::Arc;
use std::time::Duration;

use blustream_lib::command::Command;
use blustream_lib::event::SessionEvent;
use blustream_lib::protocol::Protocol;
use blustream_lib::setup::{EntityCollection, setup_entities};
use blustream_lib::types::{InputId, MacAddress, OutputId, PowerState, VolumeDirection};
use blustream_lib::{Error, ListenerSlot, Matrix, MatrixConfig, SessionListener, TcpClient};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Notify, mpsc};

// ============================================================================
// Fake matrix
// ============================================================================

/// A matrix control interface served on a local port.
///
/// Connections are served one after another. Every received command is
/// reported through `commands`, and every connection the client closed
/// through `hung_up`.
struct FakeMatrix {
    port: u16,
    commands: mpsc::UnboundedReceiver<String>,
    hung_up: mpsc::UnboundedReceiver<()>,
    close: Arc<Notify>,
}

impl FakeMatrix {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, commands) = mpsc::unbounded_channel();
        let (eof_tx, hung_up) = mpsc::unbounded_channel();
        let close = Arc::new(Notify::new());
        let close_signal = Arc::clone(&close);

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                if serve(socket, tx.clone(), Arc::clone(&close_signal)).await {
                    let _ = eof_tx.send(());
                }
            }
        });

        Self {
            port,
            commands,
            hung_up,
            close,
        }
    }

    /// Drops the current connection from the matrix side.
    fn hang_up(&self) {
        self.close.notify_one();
    }

    async fn next_command(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.commands.recv())
            .await
            .expect("timed out waiting for command")
            .expect("fake matrix stopped")
    }

    /// Waits until the client closes its end of the connection.
    async fn client_hung_up(&mut self) {
        tokio::time::timeout(Duration::from_secs(2), self.hung_up.recv())
            .await
            .expect("client kept the connection open")
            .expect("fake matrix stopped");
    }
}

/// Serves one connection. Returns `true` if the client closed it.
async fn serve(socket: TcpStream, commands: mpsc::UnboundedSender<String>, close: Arc<Notify>) -> bool {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    if writer.write_all(b"Welcome to Blustream\r\n").await.is_err() {
        return false;
    }

    loop {
        buf.clear();
        tokio::select! {
            () = close.notified() => return false,
            read = reader.read_until(b'\r', &mut buf) => {
                match read {
                    Ok(0) => return true,
                    Ok(_) => {}
                    Err(_) => return false,
                }
            }
        }

        let command = String::from_utf8_lossy(&buf).trim().to_string();
        let reply = respond(&command);
        let _ = commands.send(command);
        if writer.write_all(reply.as_bytes()).await.is_err() {
            return false;
        }
    }
}

fn respond(command: &str) -> String {
    match command {
        "STATUS" => concat!(
            "Power   IR      Key     Beep    LCD\r\n",
            "On      On      On      Off     On\r\n",
            "\r\n",
            "Output  FromIn  HDMIcon  OutputEn\r\n",
            "01      02      On       Yes\r\n",
            "02      01      Off      Yes\r\n",
            "\r\n",
            "Input   Edid    HDMIcon\r\n",
            "01      Default On\r\n",
        )
        .to_string(),
        "PON" => "[SUCCESS]Set system power on\r\n".to_string(),
        "POFF" => "[SUCCESS]Set system power off\r\n".to_string(),
        route if route.starts_with("OUT") && !route.contains(' ') => {
            let (output, input) = route[3..].split_once("FR").unwrap_or(("00", "00"));
            format!("{route}\r\n[SUCCESS]Set output {output} connect from input {input}.\r\n")
        }
        cec if cec.contains(" CEC ") => String::new(),
        _ => "[ERROR]Unknown command\r\n".to_string(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Forwards every session event into a channel.
struct Forward(mpsc::UnboundedSender<SessionEvent>);

impl SessionListener for Forward {
    fn on_source_changed(&self, _output: OutputId, _input: InputId) {}
    fn on_power_changed(&self, _raw: &str) {}
    fn on_connected(&self) {}
    fn on_disconnected(&self) {}
    fn on_error(&self, _message: &str) {}

    fn on_event(&self, event: &SessionEvent) {
        let _ = self.0.send(event.clone());
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn out(n: u8) -> OutputId {
    OutputId::new(n).unwrap()
}

fn inp(n: u8) -> InputId {
    InputId::new(n).unwrap()
}

fn config(port: u16) -> MatrixConfig {
    MatrixConfig::new("127.0.0.1", MacAddress::from_octets([0, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]))
        .with_port(port)
        .with_command_timeout(Duration::from_secs(2))
        .with_input(inp(1), "HDMI1")
        .with_input(inp(2), "HDMI2")
        .with_input(inp(3), "HDMI3")
        .with_output(out(1), "Living Room")
        .with_output(out(2), "Bedroom")
}

fn session(fake: &FakeMatrix) -> (Matrix<TcpClient>, mpsc::UnboundedReceiver<SessionEvent>) {
    let matrix = Matrix::tcp(&config(fake.port)).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    matrix.register_listener(Arc::new(Forward(tx)));
    (matrix, rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("listener dropped")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn connect_emits_connected() {
    init_tracing();
    let fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);

    matrix.connect().await.unwrap();

    assert!(matrix.is_connected());
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);
}

#[tokio::test]
async fn connect_twice_is_a_no_op() {
    init_tracing();
    let fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);

    matrix.connect().await.unwrap();
    matrix.connect().await.unwrap();

    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn status_refresh_reports_power_and_routes() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);
    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    matrix.request_status_refresh().await.unwrap();
    assert_eq!(fake.next_command().await, "STATUS");

    assert_eq!(next_event(&mut events).await, SessionEvent::power_changed("ON"));
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::source_changed(out(1), inp(2))
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::source_changed(out(2), inp(1))
    );
}

#[tokio::test]
async fn switch_source_is_acknowledged() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);
    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    matrix.switch_source(out(1), inp(3)).await.unwrap();
    assert_eq!(fake.next_command().await, "OUT01FR03");

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::SourceChangeRequested {
            output: out(1),
            input: inp(3)
        }
    );
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::source_changed(out(1), inp(3))
    );
}

#[tokio::test]
async fn power_and_cec_commands_reach_the_wire() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);
    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    matrix.set_power(false).await.unwrap();
    assert_eq!(fake.next_command().await, "POFF");
    assert_eq!(next_event(&mut events).await, SessionEvent::power_changed("OFF"));

    matrix.toggle_mute(out(2)).await.unwrap();
    assert_eq!(fake.next_command().await, "OUT02 CEC MUTE");
}

#[tokio::test]
async fn cec_commands_produce_no_events() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);
    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    matrix.set_output_power(out(1), true).await.unwrap();
    assert_eq!(fake.next_command().await, "OUT01 CEC PWRON");
    matrix.step_volume(out(1), VolumeDirection::Up).await.unwrap();
    assert_eq!(fake.next_command().await, "OUT01 CEC VOL+");

    matrix.request_status_refresh().await.unwrap();
    assert_eq!(fake.next_command().await, "STATUS");
    assert_eq!(next_event(&mut events).await, SessionEvent::power_changed("ON"));
}

/// A command the matrix does not understand.
struct Bogus;

impl Command for Bogus {
    fn name(&self) -> &'static str {
        "Bogus"
    }

    fn to_wire(&self) -> String {
        "BOGUS".to_string()
    }
}

#[tokio::test]
async fn rejected_command_becomes_error_event() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let client = TcpClient::new(format!("127.0.0.1:{}", fake.port));
    let slot = Arc::new(ListenerSlot::new());
    let (tx, mut events) = mpsc::unbounded_channel();
    slot.set(Arc::new(Forward(tx)));
    client.attach_listeners(Arc::downgrade(&slot));

    client.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    client.send_command(&Bogus).await.unwrap();
    assert_eq!(fake.next_command().await, "BOGUS");
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::error("Unknown command")
    );
    assert!(client.is_connected());
}

#[tokio::test]
async fn hang_up_emits_disconnected() {
    init_tracing();
    let fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);
    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    fake.hang_up();

    assert_eq!(next_event(&mut events).await, SessionEvent::Disconnected);
    assert!(!matrix.is_connected());
    assert!(matches!(
        matrix.set_power(true).await,
        Err(Error::NotConnected)
    ));
}

#[tokio::test]
async fn reconnect_after_hang_up() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);
    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    fake.hang_up();
    assert_eq!(next_event(&mut events).await, SessionEvent::Disconnected);

    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);
    matrix.set_power(true).await.unwrap();
    assert_eq!(fake.next_command().await, "PON");
    assert_eq!(next_event(&mut events).await, SessionEvent::power_changed("ON"));
}

#[tokio::test]
async fn disconnect_emits_once() {
    init_tracing();
    let fake = FakeMatrix::start().await;
    let (matrix, mut events) = session(&fake);
    matrix.connect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Connected);

    matrix.disconnect().await;
    matrix.disconnect().await;

    assert_eq!(next_event(&mut events).await, SessionEvent::Disconnected);
    assert!(events.try_recv().is_err());
    assert!(!matrix.is_connected());
}

#[tokio::test]
async fn unreachable_matrix_fails_to_connect() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let matrix = Matrix::tcp(&config(port)).unwrap();
    let err = matrix.connect().await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
    assert!(!matrix.is_connected());
}

#[tokio::test]
async fn dropping_every_handle_closes_the_socket() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let matrix = Arc::new(Matrix::tcp(&config(fake.port)).unwrap());
    let released = Arc::downgrade(&matrix);
    matrix.connect().await.unwrap();

    let mut host = EntityCollection::new();
    let setup = setup_entities(matrix, &mut host).await;
    assert_eq!(fake.next_command().await, "STATUS");

    drop(setup);
    drop(host);

    assert!(released.upgrade().is_none());
    fake.client_hung_up().await;
}

#[tokio::test]
async fn entities_follow_the_matrix_over_tcp() {
    init_tracing();
    let mut fake = FakeMatrix::start().await;
    let matrix = Arc::new(Matrix::tcp(&config(fake.port)).unwrap());
    matrix.connect().await.unwrap();

    let mut host = EntityCollection::new();
    let setup = setup_entities(matrix, &mut host).await;
    assert_eq!(fake.next_command().await, "STATUS");

    let mut living_room = setup.output(out(1)).unwrap().subscribe();
    tokio::time::timeout(
        Duration::from_secs(2),
        living_room.wait_for(|state| state.source.as_deref() == Some("HDMI2")),
    )
    .await
    .expect("timed out waiting for status report")
    .unwrap();
    assert_eq!(living_room.borrow().power, PowerState::On);

    setup.unload().await;
    fake.client_hung_up().await;
}
