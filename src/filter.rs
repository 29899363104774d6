use std::collections::HashMap;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::event::{id::EventId, kind::EventKind, Event, PubKey, Timestamp};

/// [`Filter`]/[`FilterList`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("tag filter key must be a single letter, got `{0}`")]
  InvalidTagFilterKey(String),
}

///
/// Filters are data structures that clients send to relays (being the first on the first connection)
/// to request data from other clients.
/// The attributes of a Filter work as `&&` (in other words, all the conditions set must be present
/// in the event in order to pass the filter).
/// P.S.: a "REQ" communication from the client can have multiple filters. In this case, all filters will be
/// used as `||` operator: anything that matches any of the filters will be sent.
///
/// - ids: a list of events of prefixes
/// - authors: a list of publickeys or prefixes, the pubkey of an event must be one of these
/// - kinds: a list of kind numbers
/// - tags: single-letter tag filters (`e`, `p`, or any other letter), the event must have at
///   least one matching tag for every key present
/// - since: a timestamp. Events must be newer than this to pass
/// - until: a timestamp. Events must be older than this to pass
/// - limit: maximum number of events to be returned in the initial query (it can be ignored afterwards)
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Filter {
  pub ids: Option<Vec<EventId>>,
  pub authors: Option<Vec<PubKey>>,
  pub kinds: Option<Vec<EventKind>>,
  /// Single-letter tag filters, keyed by the raw letter (`'e'`, `'p'`, …)
  /// with no `#` prefix; the prefix is only a wire-serialization detail.
  pub tags: HashMap<char, Vec<String>>,
  pub since: Option<Timestamp>,
  pub until: Option<Timestamp>,
  pub limit: Option<Timestamp>,
}

impl Filter {
  pub fn tag(mut self, letter: char, values: Vec<String>) -> Self {
    self.tags.insert(letter, values);
    self
  }

  /// Every present field matches the event: ids/kinds/authors membership,
  /// since/until bounds, and every tag filter key has at least one
  /// matching `[k, v, ...]` tag on the event.
  pub fn matches(&self, event: &Event) -> bool {
    if let Some(ids) = &self.ids {
      if !ids.iter().any(|id| id.0 == event.id) {
        return false;
      }
    }
    if let Some(kinds) = &self.kinds {
      if !kinds.contains(&event.kind) {
        return false;
      }
    }
    if let Some(authors) = &self.authors {
      if !authors.contains(&event.pubkey) {
        return false;
      }
    }
    if let Some(since) = self.since {
      if event.created_at < since {
        return false;
      }
    }
    if let Some(until) = self.until {
      if event.created_at > until {
        return false;
      }
    }
    for (letter, values) in &self.tags {
      let matches_any = event
        .get_tag_list(&letter.to_string())
        .iter()
        .any(|tag| tag.len() > 1 && values.contains(&tag[1]));
      if !matches_any {
        return false;
      }
    }
    true
  }

  pub fn as_value(&self) -> Value {
    let mut map = Map::new();
    if let Some(ids) = &self.ids {
      map.insert("ids".to_string(), Value::from(ids.iter().map(|id| id.0.clone()).collect::<Vec<_>>()));
    }
    if let Some(authors) = &self.authors {
      map.insert("authors".to_string(), Value::from(authors.clone()));
    }
    if let Some(kinds) = &self.kinds {
      map.insert(
        "kinds".to_string(),
        Value::from(kinds.iter().map(|k| u64::from(*k)).collect::<Vec<_>>()),
      );
    }
    for (letter, values) in &self.tags {
      map.insert(format!("#{letter}"), Value::from(values.clone()));
    }
    if let Some(since) = self.since {
      map.insert("since".to_string(), Value::from(since));
    }
    if let Some(until) = self.until {
      map.insert("until".to_string(), Value::from(until));
    }
    if let Some(limit) = self.limit {
      map.insert("limit".to_string(), Value::from(limit));
    }
    Value::Object(map)
  }

  pub fn from_value(value: Value) -> Result<Self, Error> {
    let map = value.as_object().ok_or_else(|| {
      Error::Json(serde_json::Error::io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        "filter is not a JSON object",
      )))
    })?;

    let mut filter = Filter::default();
    for (key, val) in map {
      if let Some(letter) = key.strip_prefix('#') {
        let mut chars = letter.chars();
        let c = chars
          .next()
          .filter(|_| chars.next().is_none())
          .ok_or_else(|| Error::InvalidTagFilterKey(letter.to_string()))?;
        let values: Vec<String> = serde_json::from_value(val.clone())?;
        filter.tags.insert(c, values);
        continue;
      }
      match key.as_str() {
        "ids" => {
          let ids: Vec<String> = serde_json::from_value(val.clone())?;
          filter.ids = Some(ids.into_iter().map(EventId).collect());
        }
        "authors" => filter.authors = Some(serde_json::from_value(val.clone())?),
        "kinds" => {
          let kinds: Vec<u64> = serde_json::from_value(val.clone())?;
          filter.kinds = Some(kinds.into_iter().map(EventKind::from).collect());
        }
        "since" => filter.since = Some(serde_json::from_value(val.clone())?),
        "until" => filter.until = Some(serde_json::from_value(val.clone())?),
        "limit" => filter.limit = Some(serde_json::from_value(val.clone())?),
        _ => {}
      }
    }

    Ok(filter)
  }

  pub fn as_str(&self) -> String {
    self.as_value().to_string()
  }

  pub fn from_string(data: String) -> Result<Self, Error> {
    let value: Value = serde_json::from_str(&data)?;
    Self::from_value(value)
  }
}

impl Serialize for Filter {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    self.as_value().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for Filter {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let value = Value::deserialize(deserializer)?;
    Self::from_value(value).map_err(DeError::custom)
  }
}

/// Ordered sequence of [`Filter`]s. A REQ/COUNT frame carries one or more;
/// an event matches the list iff it matches any contained filter.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterList(pub Vec<Filter>);

impl FilterList {
  pub fn matches(&self, event: &Event) -> bool {
    self.0.iter().any(|filter| filter.matches(event))
  }

  pub fn as_vec(&self) -> Vec<Value> {
    self.0.iter().map(Filter::as_value).collect()
  }
}

impl From<Vec<Filter>> for FilterList {
  fn from(filters: Vec<Filter>) -> Self {
    Self(filters)
  }
}
