use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use super::Error;

/// `["AUTH", challenge]` (NIP-42): the relay's invitation to authenticate.
/// The client answers with a signed kind-22242 event wrapped in its own
/// outbound `["AUTH", event_JSON]` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayToClientCommAuth {
  pub code: String, // "AUTH"
  pub challenge: String,
}

impl RelayToClientCommAuth {
  pub fn new_auth(challenge: String) -> Self {
    Self {
      code: "AUTH".to_string(),
      challenge,
    }
  }

  pub fn as_value(&self) -> Value {
    json!(["AUTH", self.challenge])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    if v.len() != 2 || v[0] != "AUTH" {
      return Err(Error::InvalidData);
    }

    let challenge = serde_json::from_value(v[1].clone())?;
    Ok(Self::new_auth(challenge))
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

    let json_value: Value = serde_json::from_str(msg)?;
    Self::from_value(json_value)
  }
}

impl Default for RelayToClientCommAuth {
  fn default() -> Self {
    Self {
      code: String::from("AUTH"),
      challenge: String::new(),
    }
  }
}

impl Serialize for RelayToClientCommAuth {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for RelayToClientCommAuth {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value: Value = Value::deserialize(deserializer)?;
    RelayToClientCommAuth::from_value(json_value).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn auth_round_trips_through_json() {
    let auth = RelayToClientCommAuth::new_auth("challenge-string".to_string());
    let result = RelayToClientCommAuth::from_json(auth.as_json()).unwrap();
    assert_eq!(auth, result);
  }
}
