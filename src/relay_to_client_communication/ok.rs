use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use super::Error;

/// `["OK", event_id, accepted, message]`: acknowledges a previously
/// published event. `accepted` is specified as a JSON boolean, but some
/// relays send it as the literal string `"true"`/`"false"`; both are
/// accepted on parse, and both are preserved on the wire by re-emitting a
/// real JSON boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayToClientCommOk {
  pub code: String, // "OK"
  pub event_id: String,
  pub accepted: bool,
  pub message: String,
}

impl RelayToClientCommOk {
  pub fn new_ok(event_id: String, accepted: bool, message: String) -> Self {
    Self {
      code: "OK".to_string(),
      event_id,
      accepted,
      message,
    }
  }

  pub fn as_value(&self) -> Value {
    json!(["OK", self.event_id, self.accepted, self.message])
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    if v.len() != 4 || v[0] != "OK" {
      return Err(Error::InvalidData);
    }

    let event_id = v[1].as_str().ok_or(Error::InvalidData)?.to_string();
    let accepted = match &v[2] {
      Value::Bool(b) => *b,
      Value::String(s) if s == "true" => true,
      Value::String(s) if s == "false" => false,
      _ => return Err(Error::InvalidData),
    };
    let message = v[3].as_str().ok_or(Error::InvalidData)?.to_string();

    Ok(Self::new_ok(event_id, accepted, message))
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

impl Default for RelayToClientCommOk {
  fn default() -> Self {
    Self {
      code: String::from("OK"),
      event_id: String::new(),
      accepted: false,
      message: String::new(),
    }
  }
}

impl Serialize for RelayToClientCommOk {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for RelayToClientCommOk {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value: Value = Value::deserialize(deserializer)?;
    RelayToClientCommOk::from_value(json_value).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn ok_accepts_json_boolean() {
    let ok = RelayToClientCommOk::from_json(r#"["OK","id1",false,"blocked: not on white-list"]"#)
      .unwrap();
    assert_eq!(
      ok,
      RelayToClientCommOk::new_ok(
        "id1".to_string(),
        false,
        "blocked: not on white-list".to_string()
      )
    );
  }

  #[test]
  fn ok_leniently_accepts_stringified_boolean() {
    let ok = RelayToClientCommOk::from_json(r#"["OK","id1","true",""]"#).unwrap();
    assert!(ok.accepted);
  }

  #[test]
  fn ok_rejects_three_element_frame() {
    let result = RelayToClientCommOk::from_json(r#"["OK","id1",true]"#);
    assert!(result.is_err());
  }
}
