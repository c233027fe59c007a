//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the middleware bridge.
//!
//! Every message travels as a single zmq frame of the form `"<topic> <json>"`. Subscribers can
//! filter on the topic using `set_subscribe()`.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod afford;
pub mod mode;
pub mod nav;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Serialize};

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Errors which occur while encoding or decoding a message frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Frame has no topic separator")]
    MissingTopic,

    #[error("Expected topic \"{expected}\", found \"{found}\"")]
    UnexpectedTopic { expected: String, found: String },

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the message: {0}")]
    DeserializeError(serde_json::Error),
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Encode a message into a `"<topic> <json>"` frame.
pub fn encode_frame<T: Serialize>(topic: &str, msg: &T) -> Result<String, FrameError> {
    let json = serde_json::to_string(msg).map_err(FrameError::SerializationError)?;

    Ok(format!("{} {}", topic, json))
}

/// Split a frame into its topic and payload.
pub fn split_frame(frame: &str) -> Result<(&str, &str), FrameError> {
    let idx = frame.find(' ').ok_or(FrameError::MissingTopic)?;

    Ok((&frame[..idx], &frame[idx + 1..]))
}

/// Decode a frame which must carry the given topic.
pub fn decode_frame<T: DeserializeOwned>(topic: &str, frame: &str) -> Result<T, FrameError> {
    let (found, payload) = split_frame(frame)?;

    if found != topic {
        return Err(FrameError::UnexpectedTopic {
            expected: topic.into(),
            found: found.into(),
        });
    }

    serde_json::from_str(payload).map_err(FrameError::DeserializeError)
}

#[cfg(test)]
mod test {
    use super::*;
    use nav::{GeodeticPosition, NavSensData, SENS_TOPIC};

    #[test]
    fn test_frame_topic() {
        let msg = NavSensData::Compass { heading_deg: 90.0 };
        let frame = encode_frame(SENS_TOPIC, &msg).unwrap();

        assert!(frame.starts_with("nav_sens {"));
        assert_eq!(split_frame(&frame).unwrap().0, SENS_TOPIC);

        let decoded: NavSensData = decode_frame(SENS_TOPIC, &frame).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_frame_errors() {
        assert!(matches!(split_frame("no_separator"), Err(FrameError::MissingTopic)));

        let frame = encode_frame("other", &GeodeticPosition::new(1.0, 2.0, 3.0)).unwrap();
        assert!(matches!(
            decode_frame::<NavSensData>(SENS_TOPIC, &frame),
            Err(FrameError::UnexpectedTopic { .. })
        ));

        assert!(matches!(
            decode_frame::<NavSensData>(SENS_TOPIC, "nav_sens {not json"),
            Err(FrameError::DeserializeError(_))
        ));
    }
}
