use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use super::Error;

/// `["COUNT", subscription_id, {"count": n}]` (NIP-45): the relay's answer
/// to a `COUNT` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayToClientCommCount {
  pub code: String, // "COUNT"
  pub subscription_id: String,
  pub count: u64,
}

impl RelayToClientCommCount {
  pub fn new_count(subscription_id: String, count: u64) -> Self {
    Self {
      code: "COUNT".to_string(),
      subscription_id,
      count,
    }
  }

  pub fn as_value(&self) -> Value {
    json!(["COUNT", self.subscription_id, { "count": self.count }])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    if v.len() != 3 || v[0] != "COUNT" {
      return Err(Error::InvalidData);
    }

    let subscription_id = serde_json::from_value(v[1].clone())?;
    let count = v[2]
      .as_object()
      .and_then(|obj| obj.get("count"))
      .and_then(Value::as_u64)
      .ok_or(Error::InvalidData)?;

    Ok(Self::new_count(subscription_id, count))
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

impl Default for RelayToClientCommCount {
  fn default() -> Self {
    Self {
      code: String::from("COUNT"),
      subscription_id: String::new(),
      count: 0,
    }
  }
}

impl Serialize for RelayToClientCommCount {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for RelayToClientCommCount {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value: Value = Value::deserialize(deserializer)?;
    RelayToClientCommCount::from_value(json_value).map_err(serde::de::Error::custom)
  }
}
