/// The six types of `relay -> client` communications.
///
///  - `["EVENT", subscription_id, event_JSON]`: an event matching a
///    subscription previously opened by the client.
///
///  - `["EOSE", subscription_id]`: marks the End Of Stored Events and the
///    beginning of events newly received in real-time.
///
///  - `["NOTICE", message]`: a human-readable message, usually an error.
///
///  - `["OK", event_id, accepted, message]`: acknowledges a previously
///    published event.
///
///  - `["AUTH", challenge]` (NIP-42): invites the client to authenticate.
///
///  - `["COUNT", subscription_id, {"count": n}]` (NIP-45): answers a COUNT
///    request.
///
// internal modules
pub mod auth;
pub mod count;
pub mod eose;
pub mod event;
pub mod notice;
pub mod ok;

use serde_json::Value;

use self::{
  auth::RelayToClientCommAuth, count::RelayToClientCommCount, eose::RelayToClientCommEose,
  event::RelayToClientCommEvent, notice::RelayToClientCommNotice, ok::RelayToClientCommOk,
};

/// [`RelayToClientCommunication`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// Error serializing or deserializing JSON data
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error(transparent)]
  Event(#[from] crate::event::Error),
  #[error("Invalid data")]
  InvalidData,
}

/// Tagged union over every inbound frame shape, discriminated by the
/// first element of the wire array. Dispatch replaces a runtime type
/// test: callers match on the variant instead of inspecting raw JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
  Event(RelayToClientCommEvent),
  Notice(RelayToClientCommNotice),
  Ok(RelayToClientCommOk),
  Eose(RelayToClientCommEose),
  Auth(RelayToClientCommAuth),
  Count(RelayToClientCommCount),
}

impl RelayMessage {
  /// Parses a raw inbound text frame, dispatching on its first array
  /// element. Any frame that doesn't parse as one of the six known
  /// shapes is reported as [`Error::InvalidData`] — the caller is
  /// expected to drop it silently rather than propagate the error.
  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    let msg: String = msg.into();
    let value: Value = serde_json::from_str(&msg)?;
    Self::from_value(value)
  }

  pub fn from_value(value: Value) -> Result<Self, Error> {
    let code = value
      .as_array()
      .and_then(|v| v.first())
      .and_then(Value::as_str)
      .ok_or(Error::InvalidData)?;

    match code {
      "EVENT" => Ok(Self::Event(RelayToClientCommEvent::from_value(value)?)),
      "NOTICE" => Ok(Self::Notice(RelayToClientCommNotice::from_value(value)?)),
      "OK" => Ok(Self::Ok(RelayToClientCommOk::from_value(value)?)),
      "EOSE" => Ok(Self::Eose(RelayToClientCommEose::from_value(value)?)),
      "AUTH" => Ok(Self::Auth(RelayToClientCommAuth::from_value(value)?)),
      "COUNT" => Ok(Self::Count(RelayToClientCommCount::from_value(value)?)),
      _ => Err(Error::InvalidData),
    }
  }
}
