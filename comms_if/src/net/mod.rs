//! # Network Module
//!
//! Networking abstractions over ZMQ.
//!
//! Every socket used by the navigation software is a [`MonitoredSocket`], which tracks whether
//! its peer is connected using the zmq socket monitor. Socket options are described by
//! [`SocketOptions`], which can be loaded from `net.toml` alongside the endpoints. Omitted options
//! fall back to a preset suited to the role of the socket.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use log::{debug, warn};
use serde::Deserialize;
use zmq::{Context, Socket, SocketEvent, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

/// Set a list of options on a socket, naming the failing option in the error.
macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| MonitoredSocketError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Counter used to give each monitor a unique inproc endpoint.
static NUM_MONITORS: AtomicUsize = AtomicUsize::new(0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network endpoints and socket options used by the navigation executable.
///
/// Loaded from `net.toml`. The socket tables are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Endpoint of the sensor data publisher (the middleware bridge), which the executable
    /// subscribes to.
    pub sens_endpoint: String,

    /// Endpoint on which the executable publishes yaw commands and affordances.
    pub cmd_endpoint: String,

    /// Endpoint of the flight mode service.
    pub mode_endpoint: String,

    /// Options of the sensor data subscriber
    #[serde(default = "SocketOptions::subscriber")]
    pub sens_socket: SocketOptions,

    /// Options of the command publisher
    #[serde(default = "SocketOptions::publisher")]
    pub cmd_socket: SocketOptions,

    /// Options of the flight mode requester
    #[serde(default = "SocketOptions::requester")]
    pub mode_socket: SocketOptions,
}

/// A zmq socket with a background monitor tracking its connection state.
///
/// The socket dereferences to the underlying [`zmq::Socket`].
pub struct MonitoredSocket {
    socket: Socket,

    monitor_handle: Option<thread::JoinHandle<()>>,

    shutdown: Arc<AtomicBool>,

    connected: Arc<AtomicBool>
}

/// Options applied to a [`MonitoredSocket`].
///
/// The zmq options mirror those in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation, all times are in
/// milliseconds. Options missing from a deserialised table take the zmq defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SocketOptions {

    /// Bind to the endpoint instead of connecting to it. Servers bind, clients connect.
    ///
    /// The default value is `false`.
    pub bind: bool,

    /// Block in [`MonitoredSocket::new`] until the socket connects, failing with
    /// [`MonitoredSocketError::CouldNotConnect`] if `connect_timeout` elapses first.
    ///
    /// The default value is `true`.
    pub block_on_first_connect: bool,

    /// `ZMQ_REQ_CORRELATE`: Match replies with requests
    pub req_correlate: bool,

    /// `ZMQ_REQ_RELAXED`: relax strict alternation between request and reply
    pub req_relaxed: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RECONNECT_IVL`: Set reconnection interval
    pub reconnect_ivl: i32,

    /// `ZMQ_RECONNECT_IVL_MAX`: Set maximum reconnection interval
    pub reconnect_ivl_max: i32,

    /// `ZMQ_CONNECT_TIMEOUT`: Set `connect()` timeout
    pub connect_timeout: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,

    /// `ZMQ_HEARTBEAT_IVL`: Set interval between sending ZMTP heartbeats
    pub heartbeat_ivl: i32,

    /// `ZMQ_HEARTBEAT_TIMEOUT`: Set timeout for ZMTP heartbeats
    pub heartbeat_timeout: i32,

    /// `ZMQ_HEARTBEAT_TTL`: Set the TTL (time to live) value for ZMTP heartbeats
    pub heartbeat_ttl: i32
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MonitoredSocketError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Error enabling monitoring for the socket: {0}")]
    MonitoringEnableError(zmq::Error),

    #[error("Could not connect the socket: {0:?}")]
    CouldNotConnect(Option<zmq::Error>),

    #[error("Could not read event from monitor socket: {0}")]
    EventReadError(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MonitoredSocket {
    /// Create a new monitored socket, then bind or connect it to `endpoint`.
    ///
    /// The monitor is attached before the socket connects so that no connection event is missed.
    /// Unless `block_on_first_connect` is set the connection completes in the background and can be
    /// checked with [`MonitoredSocket::connected`].
    pub fn new(
        ctx: &Context,
        socket_type: SocketType,
        socket_options: SocketOptions,
        endpoint: &str
    ) -> Result<Self, MonitoredSocketError> {
        let socket = ctx.socket(socket_type)
            .map_err(MonitoredSocketError::CreateSocketError)?;

        // Attach the monitor over a unique inproc endpoint
        let monitor_endpoint = format!(
            "inproc://monitor_{}",
            NUM_MONITORS.fetch_add(1, Ordering::Relaxed)
        );
        socket.monitor(&monitor_endpoint, SocketEvent::ALL as i32)
            .map_err(MonitoredSocketError::MonitoringEnableError)?;
        let monitor = ctx.socket(zmq::PAIR)
            .map_err(MonitoredSocketError::CreateSocketError)?;
        monitor.connect(&monitor_endpoint)
            .map_err(|e| MonitoredSocketError::CouldNotConnect(Some(e)))?;

        socket_options.set(&socket)?;

        if socket_options.bind {
            socket.bind(endpoint)
        } else {
            socket.connect(endpoint)
        }.map_err(|e| MonitoredSocketError::CouldNotConnect(Some(e)))?;

        let connected = Arc::new(AtomicBool::new(false));

        if socket_options.block_on_first_connect {
            wait_for_connection(&monitor)?;
            connected.store(true, Ordering::Relaxed);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let monitor_handle = {
            let shutdown = shutdown.clone();
            let connected = connected.clone();

            thread::spawn(move || monitor_socket(monitor, monitor_endpoint, shutdown, connected))
        };

        debug!("Socket {:?} ready on {}", socket_type, endpoint);

        Ok(Self {
            socket,
            monitor_handle: Some(monitor_handle),
            shutdown,
            connected
        })
    }

    /// Return if the socket is connected or not.
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Drop for MonitoredSocket {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The monitor thread blocks on the next event, so it is detached rather than joined.
        self.monitor_handle.take();
    }
}

impl std::ops::Deref for MonitoredSocket {
    type Target = Socket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl std::ops::DerefMut for MonitoredSocket {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.socket
    }
}

impl SocketOptions {
    /// Preset for a client subscribing to a publisher which may not be up yet.
    pub fn subscriber() -> Self {
        Self {
            block_on_first_connect: false,
            recv_timeout: 10,
            ..Self::with_heartbeat()
        }
    }

    /// Preset for a server publishing to any number of subscribers.
    pub fn publisher() -> Self {
        Self {
            bind: true,
            block_on_first_connect: false,
            ..Self::with_heartbeat()
        }
    }

    /// Preset for a client sending requests to a service which may not be up yet.
    ///
    /// Replies are correlated with requests and a request may be resent after a timeout.
    pub fn requester() -> Self {
        Self {
            block_on_first_connect: false,
            recv_timeout: 50,
            req_correlate: true,
            req_relaxed: true,
            ..Self::with_heartbeat()
        }
    }

    /// Short timeouts and ZMTP heartbeats, shared by all presets.
    fn with_heartbeat() -> Self {
        Self {
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        }
    }

    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), MonitoredSocketError> {
        set_sockopts!(
            socket,
            (set_connect_timeout, self.connect_timeout),
            (set_heartbeat_ivl, self.heartbeat_ivl),
            (set_heartbeat_timeout, self.heartbeat_timeout),
            (set_heartbeat_ttl, self.heartbeat_ttl),
            (set_linger, self.linger),
            (set_reconnect_ivl, self.reconnect_ivl),
            (set_reconnect_ivl_max, self.reconnect_ivl_max),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout)
        );

        // REQ only options
        if let Ok(SocketType::REQ) = socket.get_socket_type() {
            set_sockopts!(
                socket,
                (set_req_correlate, self.req_correlate),
                (set_req_relaxed, self.req_relaxed)
            );
        }

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // zmq defaults, see http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            block_on_first_connect: true,
            connect_timeout: 0,
            heartbeat_ivl: 0,
            heartbeat_timeout: 0,
            heartbeat_ttl: 0,
            linger: 30_000,
            reconnect_ivl: 100,
            reconnect_ivl_max: 0,
            recv_timeout: -1,
            req_correlate: false,
            req_relaxed: false,
            send_timeout: 0
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Block until the monitor reports a connection.
fn wait_for_connection(monitor: &Socket) -> Result<(), MonitoredSocketError> {
    loop {
        match read_event(monitor).map_err(MonitoredSocketError::EventReadError)? {
            SocketEvent::CONNECTED => return Ok(()),
            SocketEvent::CONNECT_DELAYED => continue,
            _ => return Err(MonitoredSocketError::CouldNotConnect(None))
        }
    }
}

/// Read an event from a monitor socket.
fn read_event(socket: &Socket) -> Result<SocketEvent, zmq::Error> {
    let msg = socket.recv_msg(0)?;

    if msg.len() < 2 {
        return Err(zmq::Error::EINVAL);
    }

    let event = u16::from_ne_bytes([msg[0], msg[1]]);

    // Second frame carries the peer address
    if socket.get_rcvmore()? {
        socket.recv_msg(0)?;
    }

    Ok(SocketEvent::from_raw(event))
}

/// Monitor thread, keeps the connected flag up to date until shutdown.
fn monitor_socket(
    monitor: Socket,
    monitor_endpoint: String,
    shutdown: Arc<AtomicBool>,
    connected: Arc<AtomicBool>
) {
    while !shutdown.load(Ordering::Relaxed) {
        match read_event(&monitor) {
            Ok(SocketEvent::CONNECTED) => connected.store(true, Ordering::Relaxed),
            Ok(SocketEvent::DISCONNECTED) => connected.store(false, Ordering::Relaxed),
            Ok(_) => (),
            Err(e) => {
                warn!("Error reading event from monitor {}: {}", monitor_endpoint, e);
                break;
            }
        }
    }
}
