use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::filter::{Filter, FilterList};

use super::Error;

/// `["COUNT", subscription_id, filters_JSON...]` (NIP-45). Asks a relay
/// for the count of events matching the filters, without the events
/// themselves; the relay answers with a `RelayToClientCommCount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToRelayCommCount {
  pub code: String, // "COUNT"
  pub subscription_id: String,
  pub filters: FilterList,
}

impl ClientToRelayCommCount {
  pub fn new_count(subscription_id: String, filters: Vec<Filter>) -> Self {
    Self {
      code: "COUNT".to_string(),
      subscription_id,
      filters: FilterList(filters),
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
    let mut json = json!(["COUNT", self.subscription_id]);

    if let Some(json) = json.as_array_mut() {
      json.append(&mut self.filters.as_vec());
    }

    json
  }

  pub fn from_value(msg: Value) -> Result<Self, Error> {
    let v = msg.as_array().ok_or(Error::InvalidData)?;

    if v.len() < 3 || v[0] != "COUNT" {
      return Err(Error::InvalidData);
    }

    let subscription_id = serde_json::from_value(v[1].clone())?;
    let filters: Vec<Filter> = v[2..]
      .iter()
      .cloned()
      .map(Filter::from_value)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self::new_count(subscription_id, filters))
  }
}

impl Default for ClientToRelayCommCount {
  fn default() -> Self {
    Self {
      code: String::from("COUNT"),
      subscription_id: String::new(),
      filters: FilterList::default(),
    }
  }
}

impl Serialize for ClientToRelayCommCount {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for ClientToRelayCommCount {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let json_value = Value::deserialize(deserializer)?;
    ClientToRelayCommCount::from_value(json_value).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn count_round_trips_through_json() {
    let count = ClientToRelayCommCount::new_count(
      "sub1".to_string(),
      vec![Filter::default().tag('p', vec!["abc".to_string()])],
    );
    let result = ClientToRelayCommCount::from_json(count.as_json()).unwrap();
    assert_eq!(count, result);
  }

  #[test]
  fn count_rejects_missing_filters() {
    let result = ClientToRelayCommCount::from_json(r#"["COUNT","sub1"]"#);
    assert!(result.is_err());
  }
}
