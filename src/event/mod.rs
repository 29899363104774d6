use serde::{Deserialize, Serialize};

// Event Modules
pub mod id;
pub mod kind;
mod marker;
pub mod tag;

use self::id::EventId;
use self::kind::EventKind;
use self::marker::Marker;
use self::tag::{Tag, TagKind};
use crate::keys::Keys;

pub type PubKey = String;
pub type Timestamp = u64;

/// [`Event`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error(transparent)]
  Keys(#[from] crate::keys::Error),
  #[error("missing required field: {0}")]
  MissingField(&'static str),
  #[error("content is not allowed on kind {0}")]
  ContentNotAllowedForKind(EventKind),
  #[error("event signature failed to verify")]
  SignatureVerificationFailed,
}

///
/// Event is the only object that exists in the Nostr protocol.
///
/// Example (id's and other hashes are not valid for the information presented):
///   ```json
///   {
///     "id": "ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb",
///     "pubkey": "02c7e1b1e9c175ab2d100baf1d5a66e73ecc044e9f8093d0c965741f26aa3abf76",
///     "created_at": 1673002822,
///     "kind": 1,
///     "tags": [
///       ["e", "688787d8ff144c502c7f5cffaafe2cc588d86079f9de88304c26b0cb99ce91c6", "wss://relay.damus.io", "root"],
///       ["p", "02c7e1b1e9c175ab2d100baf1d5a66e73ecc044e9f8093d0c965741f26aa3abf76", ""],
///     ],
///     "content": "Lorem ipsum dolor sit amet",
///     "sig": "e8551d85f530113366e8da481354c2756605e3f58149cedc1fb9385d35251712b954af8ef891cb0467d50ddc6685063d4190c97e9e131f903e6e4176dc13ce7c"
///   }
///   ```
///
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Event {
  /// 32-bytes SHA256 of the serialized event data
  pub id: String,
  /// 32-bytes hex-encoded public key of the event creator  
  pub pubkey: PubKey,
  /// Unix timestamp in seconds
  pub created_at: Timestamp,
  /// Kind of event
  pub kind: EventKind,
  /// An array of arrays with more info about the event,
  /// like, for example, if it is replying to someone.
  /// The kind of event will change its tags and contents.
  pub tags: Vec<Tag>,
  /// Arbitrary string. Meaning depends on the kind of the event.
  pub content: String,
  /// 64-bytes hex signature of the id field
  pub sig: String,
}

impl Event {
  pub fn new_without_signature(
    pubkey: PubKey,
    created_at: Timestamp,
    kind: EventKind,
    tags: Vec<Tag>,
    content: String,
  ) -> Self {
    let id = EventId::new(
      pubkey.clone(),
      created_at,
      kind,
      tags.clone(),
      content.clone(),
    );
    Self {
      id: id.0,
      pubkey,
      created_at,
      kind,
      tags,
      content,
      ..Default::default()
    }
  }

  pub fn from_serialized(data: &str) -> Result<Self, Error> {
    Ok(serde_json::from_str::<Self>(data)?)
  }

  pub fn as_str(&self) -> Result<String, Error> {
    Ok(serde_json::to_string(self)?)
  }

  /// Recomputes `id` from the event's current fields. Called whenever a
  /// tag is added so `id` never goes stale relative to the data it hashes.
  fn recompute_id(&mut self) {
    self.id = EventId::new(
      self.pubkey.clone(),
      self.created_at,
      self.kind,
      self.tags.clone(),
      self.content.clone(),
    )
    .0;
  }

  /// Signs the event with `keys`, setting `pubkey`, `id`, and `sig`.
  /// Kind-4 (encrypted direct message) events must carry a `p` tag
  /// identifying the recipient and are rejected otherwise.
  pub fn sign(&mut self, keys: &Keys) -> Result<(), Error> {
    if matches!(self.kind, EventKind::EncryptedDirectMessage) && !self.has_tag("p") {
      return Err(Error::MissingField("p"));
    }

    self.pubkey = keys.public_key_hex();
    self.recompute_id();
    self.sig = keys.sign_event_id(&self.id)?;
    Ok(())
  }

  /// Recomputes `id` and verifies `sig` against `pubkey`. A mutated event
  /// therefore cannot verify under a signature produced before the
  /// mutation.
  pub fn verify(&self) -> Result<bool, Error> {
    let recomputed = EventId::new(
      self.pubkey.clone(),
      self.created_at,
      self.kind,
      self.tags.clone(),
      self.content.clone(),
    );
    if recomputed.0 != self.id {
      return Ok(false);
    }

    let keys = Keys::from_public_key_hex(&self.pubkey)?;
    Ok(keys.verify_event_id(&self.id, &self.sig)?)
  }

  /// Appends `tag` and recomputes `id`.
  pub fn add_tag(&mut self, tag: Tag) {
    self.tags.push(tag);
    self.recompute_id();
  }

  /// True iff the event carries at least one tag of the given single-letter
  /// kind (`"e"`, `"p"`, or a custom letter).
  pub fn has_tag(&self, tag_kind: &str) -> bool {
    self.get_tag_count(tag_kind) > 0
  }

  /// All tags of the given single-letter kind, each as its wire-form vector
  /// (`["e", id, relay, marker]`-shaped).
  pub fn get_tag_list(&self, tag_kind: &str) -> Vec<Vec<String>> {
    self
      .tags
      .iter()
      .filter(|tag| TagKind::from((*tag).clone()).to_string() == tag_kind)
      .map(Tag::as_vec)
      .collect()
  }

  pub fn get_tag_count(&self, tag_kind: &str) -> usize {
    self
      .tags
      .iter()
      .filter(|tag| TagKind::from((*tag).clone()).to_string() == tag_kind)
      .count()
  }

  /// Unique set of tag-kind letters present on this event, in first-seen
  /// order.
  pub fn get_tag_types(&self) -> Vec<TagKind> {
    let mut seen = Vec::new();
    for tag in &self.tags {
      let kind = TagKind::from(tag.clone());
      if !seen.contains(&kind) {
        seen.push(kind);
      }
    }
    seen
  }

  pub fn add_pubkey_ref(&mut self, pubkey: PubKey) {
    self.add_tag(Tag::PubKey(vec![pubkey], None));
  }

  pub fn has_pubkey_ref(&self, pubkey: &str) -> bool {
    self.tags.iter().any(|tag| match tag {
      Tag::PubKey(pubkeys, _) => pubkeys.iter().any(|p| p == pubkey),
      _ => false,
    })
  }

  pub fn add_event_ref(&mut self, event_id: String) {
    self.add_tag(Tag::Event(EventId(event_id), None, None));
  }

  pub fn has_event_ref(&self, event_id: &str) -> bool {
    self.tags.iter().any(|tag| match tag {
      Tag::Event(id, _, _) => id.0 == event_id,
      _ => false,
    })
  }
}
