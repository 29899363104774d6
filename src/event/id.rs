use bitcoin_hashes::{sha256, Hash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{kind::EventKind, tag::Tag, PubKey, Timestamp};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EventId(pub String);

impl EventId {
  ///
  /// This is the way used to serialize and get the SHA256. This will equal to `event.id`.
  /// 32-bytes lowercase hex-encoded sha256 of the the serialized event data
  ///
  /// Canonical form is `[0,pubkey,created_at,kind,tags,content]` serialized
  /// as compact JSON (no whitespace, no ASCII-escaping of non-ASCII content,
  /// tag order preserved) — the cross-implementation interop contract, so
  /// this goes through `serde_json::Value` rather than any ad-hoc string
  /// building.
  ///
  /// <https://github.com/nostr-protocol/nips/blob/master/01.md>
  ///
  pub(crate) fn new(
    pubkey: PubKey,
    created_at: Timestamp,
    kind: EventKind,
    tags: Vec<Tag>,
    content: String,
  ) -> Self {
    let tags_value: Vec<Value> = tags
      .iter()
      .map(|tag| Value::from(tag.as_vec()))
      .collect();

    let canonical = Value::from(vec![
      Value::from(0),
      Value::from(pubkey),
      Value::from(created_at),
      Value::from(u64::from(kind)),
      Value::from(tags_value),
      Value::from(content),
    ]);

    let data = serde_json::to_string(&canonical).expect("canonical event array is always valid JSON");

    let hash = sha256::Hash::hash(data.as_bytes());
    Self(hash.to_string())
  }
}

#[cfg(test)]
mod tests {

  use crate::event::{marker::Marker, tag::UncheckedRecommendRelayURL};

  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn creates_id() {
    let mock_pub_key: PubKey = String::from("mockpubkey");
    let mock_created_at: Timestamp = 161500343030;
    let mock_kind: EventKind = EventKind::Text;
    let mock_tags: Vec<Tag> = vec![Tag::Event(
      EventId(String::from("event_im_replying_to")),
      Some(UncheckedRecommendRelayURL(String::from(
        "wss://recommended.relay.com",
      ))),
      Some(Marker::Reply),
    )];
    let mock_content: String = String::from("mockcontent");

    let event_id = EventId::new(
      mock_pub_key.clone(),
      mock_created_at,
      mock_kind,
      mock_tags.clone(),
      mock_content.clone(),
    );

    let expected_json = format!(
      r#"[0,"{}",{},1,[["e","event_im_replying_to","wss://recommended.relay.com","reply"]],"{}"]"#,
      mock_pub_key, mock_created_at, mock_content
    );
    let expected = EventId(sha256::Hash::hash(expected_json.as_bytes()).to_string());

    assert_eq!(expected, event_id);
  }

  #[test]
  fn matches_the_nip01_fixture_vector() {
    // pynostr's own fixture (original_source/tests/test_event.py
    // `test_note_event`): secret key
    // 964b29795d621cdacf05fd94fb23206c88742db1fa50b34d7545f3a2221d8124,
    // content "Hello Nostr!", created_at 1671406583, kind 1, empty tags.
    let keys = crate::keys::Keys::from_secret_key_hex(
      "964b29795d621cdacf05fd94fb23206c88742db1fa50b34d7545f3a2221d8124",
    )
    .unwrap();

    let mut event = crate::event::Event::new_without_signature(
      keys.public_key_hex(),
      1671406583,
      EventKind::Text,
      vec![],
      "Hello Nostr!".to_string(),
    );
    event.sign(&keys).unwrap();

    assert_eq!(
      event.id,
      "23411895658d374ec922adf774a70172290b2c738ae67815bd8945e5d8fff3bb"
    );
    assert_eq!(event.verify(), Ok(true));
  }

  #[test]
  fn differs_when_any_field_changes() {
    let pubkey = "mockpubkey".to_string();
    let base = EventId::new(pubkey.clone(), 100, EventKind::Text, vec![], "hi".to_string());
    let different_content =
      EventId::new(pubkey.clone(), 100, EventKind::Text, vec![], "bye".to_string());
    let different_kind =
      EventId::new(pubkey, 100, EventKind::Metadata, vec![], "hi".to_string());

    assert_ne!(base, different_content);
    assert_ne!(base, different_kind);
  }
}
