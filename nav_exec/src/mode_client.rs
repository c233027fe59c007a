//! # Flight Mode Client
//!
//! Safety port of the executable, used to ask the flight mode service to switch the vehicle into a
//! safe mode.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::mode::{SetModeRequest, SetModeResponse},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams},
};

use crate::cmd_filter::ModeRequest;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ModeClient {
    socket: MonitoredSocket,

    /// Autopilot mode name used for [`ModeRequest::PositionHold`]
    position_hold_mode: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ModeClientError {

    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the flight mode service")]
    NotConnected,

    #[error("Could not send the request to the service: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a response from the service: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the request: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the service: {0}")]
    DeserializeError(serde_json::Error),

}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ModeClient {
    /// Create a new instance of the flight mode client.
    ///
    /// `position_hold_mode` is the autopilot mode name requested for
    /// [`ModeRequest::PositionHold`], for example `"POSCTL"`.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        position_hold_mode: &str
    ) -> Result<Self, ModeClientError> {

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            params.mode_socket.clone(),
            &params.mode_endpoint
        ).map_err(ModeClientError::SocketError)?;

        Ok(Self {
            socket,
            position_hold_mode: position_hold_mode.into()
        })
    }

    /// Send a mode request to the service.
    ///
    /// If the service responds within the configured timeout its response is returned, otherwise
    /// an `Err()` is returned.
    pub fn request(
        &mut self,
        request: ModeRequest
    ) -> Result<SetModeResponse, ModeClientError> {
        if !self.socket.connected() {
            return Err(ModeClientError::NotConnected)
        }

        let req_str = serde_json::to_string(&self.build_request(request))
            .map_err(ModeClientError::SerializationError)?;

        self.socket.send(&req_str, 0)
            .map_err(ModeClientError::SendError)?;

        let msg = self.socket.recv_msg(0)
            .map_err(ModeClientError::RecvError)?;

        serde_json::from_str(msg.as_str().unwrap_or(""))
            .map_err(ModeClientError::DeserializeError)
    }

    fn build_request(&self, request: ModeRequest) -> SetModeRequest {
        match request {
            ModeRequest::PositionHold => SetModeRequest {
                custom_mode: self.position_hold_mode.clone()
            }
        }
    }
}
