//! # Command Server
//!
//! Publishes the yaw rate command and the estimated affordance every running cycle, each on its
//! own topic.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::{
        afford::{AFFORD_TOPIC, YAW_CMD_TOPIC},
        encode_frame, FrameError,
    },
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams},
};

use crate::nav_ctrl::OutputData;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command publisher
pub struct CmdServer {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the message: {0}")]
    SendError(zmq::Error),

    #[error("Could not encode the message: {0}")]
    FrameError(FrameError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Create a new instance of the command server.
    ///
    /// With the default socket options this function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdServerError> {

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            params.cmd_socket.clone(),
            &params.cmd_endpoint
        ).map_err(CmdServerError::SocketError)?;

        Ok(Self {
            socket
        })
    }

    /// Publish the outputs of one cycle. Absent outputs are not published.
    pub fn send(&mut self, output: &OutputData) -> Result<(), CmdServerError> {
        for frame in output_frames(output)? {
            self.socket.send(&frame, 0)
                .map_err(CmdServerError::SendError)?;
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Encode the frames to publish for the given output, affordance first.
fn output_frames(output: &OutputData) -> Result<Vec<String>, CmdServerError> {
    let mut frames = Vec::with_capacity(2);

    if let Some(ref aff) = output.affordance {
        frames.push(encode_frame(AFFORD_TOPIC, aff).map_err(CmdServerError::FrameError)?);
    }

    if let Some(ref cmd) = output.yaw_cmd {
        frames.push(encode_frame(YAW_CMD_TOPIC, cmd).map_err(CmdServerError::FrameError)?);
    }

    Ok(frames)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use comms_if::eqpt::afford::YawCmd;

    #[test]
    fn test_output_frames() {
        assert!(output_frames(&OutputData::default()).unwrap().is_empty());

        let output = OutputData {
            yaw_cmd: Some(YawCmd {
                timestamp: Utc.timestamp_millis(1_000),
                yaw_rate_rads: 0.5,
            }),
            ..Default::default()
        };

        let frames = output_frames(&output).unwrap();
        assert_eq!(frames, vec![r#"yaw_cmd {"timestamp":1000,"yaw_rate_rads":0.5}"#.to_string()]);
    }
}
