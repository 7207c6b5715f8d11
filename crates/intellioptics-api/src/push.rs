// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use intellioptics_app::{LiveEvent, detectors_from_value};
use log::{debug, info, warn};
use serde_json::json;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};
use url::Url;

use crate::engineio::{
    DEFAULT_NAMESPACE, EnginePacket, SocketPacket, connect_error_message,
};

pub const UPDATE_EVENT: &str = "update";
pub const UPDATE_REQUEST_EVENT: &str = "update_request";

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Maps the configured push endpoint (`http://host/socket.io`) onto the
/// Engine.IO WebSocket URL.
pub fn websocket_url(socket_url: &str) -> Result<Url> {
    let mut url =
        Url::parse(socket_url).with_context(|| format!("invalid push url {socket_url:?}"))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => bail!("push url {socket_url:?} has unsupported scheme {other:?}; use http(s) or ws(s)"),
    };
    url.set_scheme(scheme)
        .map_err(|()| anyhow!("cannot use scheme {scheme} for push url {socket_url:?}"))?;

    let path = url.path().trim_end_matches('/').to_owned();
    let path = if path.is_empty() {
        "/socket.io/".to_owned()
    } else {
        format!("{path}/")
    };
    url.set_path(&path);
    url.set_query(Some("EIO=4&transport=websocket"));
    url.set_fragment(None);
    Ok(url)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOptions {
    pub url: Url,
    pub connect_timeout: Duration,
}

impl PushOptions {
    pub fn new(socket_url: &str, connect_timeout: Duration) -> Result<Self> {
        Ok(Self {
            url: websocket_url(socket_url)?,
            connect_timeout,
        })
    }
}

/// Live push-update channel. The worker thread owns the socket; dropping the
/// subscription shuts the socket down and waits for the worker. A worker that
/// is still resolving or connecting is detached instead.
pub struct Subscription {
    control: Arc<Control>,
    requests: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn start<F>(options: PushOptions, on_event: F) -> Result<Self>
    where
        F: FnMut(LiveEvent) + Send + 'static,
    {
        let control = Arc::new(Control::default());
        let (requests, request_rx) = mpsc::channel();
        let worker_control = Arc::clone(&control);

        let worker = thread::Builder::new()
            .name("intellioptics-push".to_owned())
            .spawn(move || run_worker(options, worker_control, request_rx, on_event))
            .context("spawn push subscriber thread")?;

        Ok(Self {
            control,
            requests,
            worker: Some(worker),
        })
    }

    /// Asks the server for a fresh snapshot. Returns false once the worker
    /// has exited.
    pub fn request_update(&self) -> bool {
        self.requests.send(()).is_ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let reached_socket = self.control.shutdown();
        let Some(worker) = self.worker.take() else {
            return;
        };
        if !reached_socket && !worker.is_finished() {
            debug!("detaching push subscriber that is still connecting");
            return;
        }
        if worker.join().is_err() {
            warn!("push subscriber thread panicked");
        }
    }
}

/// Stop flag plus a handle on the worker's TCP socket.
#[derive(Default)]
struct Control {
    stop: AtomicBool,
    socket: Mutex<Option<TcpStream>>,
}

impl Control {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, Option<TcpStream>> {
        self.socket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fails when a stop arrived while the worker was connecting.
    fn register(&self, stream: &TcpStream) -> Result<()> {
        let handle = stream.try_clone().context("clone push socket")?;
        let mut socket = self.lock();
        if self.stopped() {
            bail!("push subscriber stopped while connecting");
        }
        *socket = Some(handle);
        Ok(())
    }

    fn release(&self) {
        self.lock().take();
    }

    /// Sets the stop flag and unblocks any pending socket I/O. Returns
    /// whether the worker had a socket to shut down.
    fn shutdown(&self) -> bool {
        let socket = self.lock();
        self.stop.store(true, Ordering::Release);
        match socket.as_ref() {
            Some(stream) => {
                if let Err(error) = stream.shutdown(Shutdown::Both) {
                    debug!("push socket already closed: {error}");
                }
                true
            }
            None => false,
        }
    }
}

fn run_worker<F>(options: PushOptions, control: Arc<Control>, requests: Receiver<()>, mut on_event: F)
where
    F: FnMut(LiveEvent),
{
    info!("connecting push channel {}", options.url);
    let outcome = connect(&options, &control).and_then(|socket| {
        let mut session = Session {
            socket,
            connected: false,
            pending_request: false,
        };
        session.run(&control.stop, &requests, &mut on_event)
    });
    control.release();

    match outcome {
        Ok(()) => {
            info!("push channel closed");
            on_event(LiveEvent::Closed(None));
        }
        Err(error) if control.stopped() => {
            debug!("push channel stopped: {error:#}");
            on_event(LiveEvent::Closed(None));
        }
        Err(error) => {
            warn!("push channel failed: {error:#}");
            on_event(LiveEvent::Closed(Some(format!("{error:#}"))));
        }
    }
}

fn connect(options: &PushOptions, control: &Control) -> Result<WebSocket<MaybeTlsStream<TcpStream>>> {
    let url = &options.url;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("push url {url} has no host"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| anyhow!("push url {url} has no port"))?;
    let addresses: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .with_context(|| format!("resolve {host}:{port}"))?
        .collect();
    if control.stopped() {
        bail!("push subscriber stopped while resolving {host}:{port}");
    }

    let stream = connect_any(&addresses, options.connect_timeout)?;
    control.register(&stream)?;
    stream
        .set_read_timeout(Some(options.connect_timeout))
        .context("set handshake read timeout")?;
    stream
        .set_write_timeout(Some(options.connect_timeout))
        .context("set handshake write timeout")?;
    let poll = stream.try_clone().context("clone push socket")?;

    let (socket, _response) = tungstenite::client_tls(url.as_str(), stream)
        .map_err(|error| anyhow!("websocket handshake with {url} failed: {error}"))?;

    // Short reads let the worker notice stop requests and outbound updates.
    poll.set_read_timeout(Some(POLL_INTERVAL))
        .context("set push poll interval")?;
    Ok(socket)
}

/// Tries each resolved address in turn and keeps the last failure.
fn connect_any(addresses: &[SocketAddr], timeout: Duration) -> Result<TcpStream> {
    let mut last_error = None;
    for address in addresses {
        match TcpStream::connect_timeout(address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                debug!("push connect to {address} failed: {error}");
                last_error = Some(anyhow::Error::new(error).context(format!("connect to {address}")));
            }
        }
    }
    Err(last_error.unwrap_or_else(|| anyhow!("no addresses resolved")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct Session {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    connected: bool,
    pending_request: bool,
}

impl Session {
    fn run<F>(&mut self, stop: &AtomicBool, requests: &Receiver<()>, on_event: &mut F) -> Result<()>
    where
        F: FnMut(LiveEvent),
    {
        loop {
            if stop.load(Ordering::Acquire) {
                debug!("push subscriber stopping");
                let _ = self.socket.close(None);
                let _ = self.socket.flush();
                return Ok(());
            }

            while requests.try_recv().is_ok() {
                self.pending_request = true;
            }
            if self.connected && self.pending_request {
                self.pending_request = false;
                self.request_update()?;
            }

            match self.socket.read() {
                Ok(Message::Text(frame)) => {
                    if self.handle_frame(&frame, on_event)? == Flow::Stop {
                        return Ok(());
                    }
                }
                Ok(Message::Close(_)) => return Ok(()),
                Ok(_) => {}
                Err(tungstenite::Error::Io(error))
                    if matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(());
                }
                Err(error) => return Err(error).context("read push frame"),
            }
        }
    }

    fn handle_frame<F>(&mut self, frame: &str, on_event: &mut F) -> Result<Flow>
    where
        F: FnMut(LiveEvent),
    {
        let packet = match EnginePacket::decode(frame) {
            Ok(packet) => packet,
            Err(error) => {
                warn!("ignoring malformed push frame: {error:#}");
                return Ok(Flow::Continue);
            }
        };

        match packet {
            EnginePacket::Open(handshake) => {
                debug!(
                    "engine.io session {} (ping interval {}ms)",
                    handshake.sid, handshake.ping_interval
                );
                self.send(SocketPacket::connect(DEFAULT_NAMESPACE).to_frame())?;
            }
            EnginePacket::Ping(data) => self.send(EnginePacket::Pong(data).encode())?,
            EnginePacket::Close => return Ok(Flow::Stop),
            EnginePacket::Message(payload) => return self.handle_message(&payload, on_event),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
        }
        Ok(Flow::Continue)
    }

    fn handle_message<F>(&mut self, payload: &str, on_event: &mut F) -> Result<Flow>
    where
        F: FnMut(LiveEvent),
    {
        let packet = match SocketPacket::decode(payload) {
            Ok(packet) => packet,
            Err(error) => {
                warn!("ignoring malformed socket.io packet: {error:#}");
                return Ok(Flow::Continue);
            }
        };

        match packet {
            SocketPacket::Connect { .. } => {
                info!("push channel connected");
                self.connected = true;
                on_event(LiveEvent::Connected);
                self.request_update()?;
            }
            SocketPacket::ConnectError { data, .. } => {
                bail!(
                    "push server refused connection: {}",
                    connect_error_message(data.as_ref())
                );
            }
            SocketPacket::Disconnect { .. } => bail!("push server ended the session"),
            SocketPacket::Event { name, args, .. } if name == UPDATE_EVENT => {
                let Some(payload) = args.into_iter().next() else {
                    warn!("ignoring {UPDATE_EVENT} event without a payload");
                    return Ok(Flow::Continue);
                };
                match detectors_from_value(payload) {
                    Ok(detectors) => {
                        debug!("push snapshot with {} detectors", detectors.len());
                        on_event(LiveEvent::Snapshot(detectors));
                    }
                    Err(error) => warn!("ignoring malformed {UPDATE_EVENT} payload: {error}"),
                }
            }
            SocketPacket::Event { name, .. } => debug!("ignoring push event {name:?}"),
            SocketPacket::Ack { .. } => {}
        }
        Ok(Flow::Continue)
    }

    fn request_update(&mut self) -> Result<()> {
        debug!("emitting {UPDATE_REQUEST_EVENT}");
        self.send(SocketPacket::event(UPDATE_REQUEST_EVENT, vec![json!({})]).to_frame())
    }

    fn send(&mut self, frame: String) -> Result<()> {
        self.socket
            .send(Message::Text(frame))
            .context("write push frame")
    }
}
