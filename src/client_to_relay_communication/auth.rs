use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::event::Event;

use super::Error;

/// `["AUTH", event_JSON]` (NIP-42). Sent in response to the relay's own
/// `["AUTH", challenge]` message, carrying a signed kind-22242 event that
/// proves control of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToRelayCommAuth {
  pub code: String, // "AUTH"
  pub event: Event,
}

impl ClientToRelayCommAuth {
  pub fn new_auth(event: Event) -> Self {
    Self {
      code: "AUTH".to_string(),
      event,
    }
  }

  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }

  pub fn from_json<S>(msg: S) -> Result<Self, Error>
  where
    S: Into<String>,
  {
    let msg: &str = &msg.into();

    if msg.is_empty() {
      return Err(Error::InvalidData);
    }

    let value: Value = serde_json::from_str(msg)?;
    Self::from_value(value)
  }

  pub fn as_value(&self) -> Value {
    json!(["AUTH", self.event])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    if v.len() != 2 || v[0] != "AUTH" {
      return Err(Error::InvalidData);
    }

    let event: Event = serde_json::from_value(v[1].clone())?;
    Ok(Self::new_auth(event))
  }
}

impl Default for ClientToRelayCommAuth {
  fn default() -> Self {
    Self {
      code: String::from("AUTH"),
      event: Event::default(),
    }
  }
}

impl Serialize for ClientToRelayCommAuth {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ClientToRelayCommAuth {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value = Value::deserialize(deserializer)?;
    ClientToRelayCommAuth::from_value(json_value).map_err(serde::de::Error::custom)
  }
}
