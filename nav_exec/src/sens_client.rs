//! # Sensor Client
//!
//! The SensClient subscribes to the sensor data published by the middleware bridge. Messages are
//! received on a background thread and forwarded over a channel, which the control loop drains
//! once at the start of each cycle. Each message is applied as a whole, so the loop never sees a
//! partially updated pose.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};
use log::{error, warn};

use comms_if::{
    eqpt::{
        decode_frame,
        nav::{NavSensData, SENS_TOPIC},
    },
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SensClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    rx: Receiver<NavSensData>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SensClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to the sensor topic: {0}")]
    SubscribeError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SensClient {
    /// Create a new instance of the SensClient.
    ///
    /// With the default socket options this function will not block until the publisher is
    /// available.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, SensClientError> {

        // Connect the socket
        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            params.sens_socket.clone(),
            &params.sens_endpoint
        ).map_err(SensClientError::SocketError)?;

        socket.set_subscribe(SENS_TOPIC.as_bytes())
            .map_err(SensClientError::SubscribeError)?;

        let bg_run = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::channel();

        let bg_run_clone = bg_run.clone();

        // Start BG thread
        let bg_jh = Some(thread::spawn(move || {
            bg_thread(socket, bg_run_clone, tx)
        }));

        Ok(Self {
            bg_jh,
            bg_run,
            rx,
        })
    }

    /// Take all messages received since the last call, oldest first.
    pub fn drain(&self) -> Vec<NavSensData> {
        self.rx.try_iter().collect()
    }
}

impl Drop for SensClient {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                error!("SensClient background thread panicked");
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, forwards each message published by the bridge to the control loop.
fn bg_thread(
    socket: MonitoredSocket,
    run: Arc<AtomicBool>,
    tx: Sender<NavSensData>,
) {
    while run.load(Ordering::Relaxed) {
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message from the sensor publisher");
                continue
            },
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                error!("Error receiving message from the sensor publisher: {:?}", e);
                break
            }
        };

        let data = match parse_frame(&msg) {
            Some(d) => d,
            None => continue
        };

        // Receiver gone means the executable is stopping
        if tx.send(data).is_err() {
            break
        }
    }
}

/// Parse a sensor frame, warning and returning `None` if it is invalid.
fn parse_frame(frame: &str) -> Option<NavSensData> {
    match decode_frame(SENS_TOPIC, frame) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("Invalid message from the sensor publisher: {}", e);
            None
        }
    }
}
