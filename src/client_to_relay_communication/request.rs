use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::filter::{Filter, FilterList};

use super::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToRelayCommRequest {
  pub code: String, // "REQ"
  pub subscription_id: String,
  pub filters: FilterList,
}

impl ClientToRelayCommRequest {
  /// Create new `REQ` message
  pub fn new_req(subscription_id: String, filters: Vec<Filter>) -> Self {
    Self {
      code: "REQ".to_string(),
      subscription_id,
      filters: FilterList(filters),
    }
  }

  /// Get request as JSON string
  pub fn as_json(&self) -> String {
    self.as_value().to_string()
  }

  /// Deserialize [`ClientToRelayCommRequest`] from JSON string
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

  /// Serialize as [`Value`]
  pub fn as_value(&self) -> Value {
    let mut json = json!(["REQ", self.subscription_id]);

    if let Some(json) = json.as_array_mut() {
      json.append(&mut self.filters.as_vec());
    }

    json
  }

  /// Deserialize from [`Value`]
  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    if v.is_empty() {
      return Err(Error::InvalidData);
    }

    let v_len: usize = v.len();

    // Req
    // ["REQ", <subscription_id>, <filter JSON>, <filter JSON>...]
    if v[0] == "REQ" {
      // A client can choose to only connect to a relay, without
      // querying any data
      if v_len == 2 {
        let subscription_id = serde_json::from_value(v[1].clone())?;
        return Ok(Self::new_req(subscription_id, Vec::new()));
      } else if v_len >= 3 {
        let subscription_id = serde_json::from_value(v[1].clone())?;
        let filters: Vec<Filter> = v[2..]
          .iter()
          .cloned()
          .map(Filter::from_value)
          .collect::<Result<Vec<_>, _>>()?;
        return Ok(Self::new_req(subscription_id, filters));
      }
    }

    Err(Error::InvalidData)
  }
}

impl Default for ClientToRelayCommRequest {
  fn default() -> Self {
    Self {
      code: String::from("REQ"),
      subscription_id: String::new(),
      filters: FilterList::default(),
    }
  }
}

impl Serialize for ClientToRelayCommRequest {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let json_value: Value = self.as_value();
    json_value.serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ClientToRelayCommRequest {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    // We don't know what we're receiving. So just try to deserialize it
    // to some value
    let json_value = Value::deserialize(deserializer)?;

    // If the deserialization happens correctly (i.e.: is a valid JSON),
    // We verify if this JSON is the one we want, namely `ClientToRelayCommRequest`
    ClientToRelayCommRequest::from_value(json_value).map_err(serde::de::Error::custom)
  }
}
