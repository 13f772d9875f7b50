//! Inbound chat payloads and the envelopes pushed to recipients.

use serde::Serialize;
use serde_json::Value;

use super::{MessageContent, error::ValueObjectError};

/// A chat message parsed from a request body.
///
/// Lives for one request: constructed from the body, consumed by one fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub message: MessageContent,
}

impl InboundMessage {
    /// Parse a raw request body.
    ///
    /// The body must be a JSON object whose `message` field is a non-empty
    /// string. Any other field is ignored. Everything else is rejected.
    pub fn parse(body: &str) -> Result<Self, ValueObjectError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ValueObjectError::MalformedPayload(e.to_string()))?;

        let Value::Object(mut fields) = value else {
            return Err(ValueObjectError::MalformedPayload(
                "body is not a JSON object".to_string(),
            ));
        };

        match fields.remove("message") {
            None | Some(Value::Null) => Err(ValueObjectError::MessageContentEmpty),
            Some(Value::String(text)) => Ok(Self {
                message: MessageContent::new(text)?,
            }),
            Some(other) => Err(ValueObjectError::MalformedPayload(format!(
                "`message` must be a string (got {other})"
            ))),
        }
    }
}

/// Value of the `type` discriminator on non-chat envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Err,
    Info,
}

/// Structured payload pushed to one recipient connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundEnvelope {
    /// `{ "message": .., "from": .. }`
    Chat { message: String, from: String },
    /// `{ "message": .., "type": "err" }`
    Error {
        message: String,
        #[serde(rename = "type")]
        kind: EnvelopeKind,
    },
    /// `{ "message": .., "roomCode": .., "type": "info" }`
    Joined {
        message: String,
        #[serde(rename = "roomCode")]
        room_code: String,
        #[serde(rename = "type")]
        kind: EnvelopeKind,
    },
}

impl OutboundEnvelope {
    pub fn chat(message: impl Into<String>, from: impl Into<String>) -> Self {
        Self::Chat {
            message: message.into(),
            from: from.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            kind: EnvelopeKind::Err,
        }
    }

    pub fn joined(room_code: impl Into<String>) -> Self {
        let room_code = room_code.into();
        Self::Joined {
            message: format!("You have joined room {room_code}"),
            room_code,
            kind: EnvelopeKind::Info,
        }
    }

    /// Serialize to the JSON text frame sent over the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
