use serde::de::{Deserialize, Deserializer, Error, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Defines the type of the event.
/// Different types will change the meaning of different keys
/// of event object.
/// `Text` is the default.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
  /// The content is set to a stringfied JSON object
  /// `{name: <username>, about: <string>, picture: <url, string>}`
  /// describing the user who created the event.
  /// A relay may delete past `Metadata` events once it gets a new one
  /// from the same pubkey.
  Metadata,
  /// The content is set to the plaintext content of a note
  /// (anything the user wants to say). Markdown links (`[]()` stuff)
  /// are not plaintext.
  #[default]
  Text,
  /// The content is set to the URL (e.g.: `wss://somerelay.com`) of a relay
  /// the event creator wants to recommend to its followers.
  RecommendRelay,
  /// Content is ignored; `p` tags list the pubkeys of the contacts being
  /// followed, optionally with a relay url and petname.
  Contacts,
  /// Content is the NIP-04 ciphertext; recipient is carried in a `p` tag.
  EncryptedDirectMessage,
  /// Content is an optional deletion reason; `e` tags list the events to
  /// be deleted by relays that honor the request.
  Delete,
  /// Content is a reaction string (commonly `+`/`-`/an emoji); `e`/`p`
  /// tags reference the reacted-to event and its author.
  Reaction,
  /// Content is an empty string; `a` tag identifies the badge definition
  /// and `p` tags the recipients.
  BadgeAward,
  /// Creates a public or private channel, content is a Metadata-shaped
  /// stringified JSON object.
  ChannelCreate,
  /// Updates channel metadata, `e` tag references the ChannelCreate event.
  ChannelMeta,
  /// A message sent to a channel, `e` tag references the channel.
  ChannelMessage,
  /// Hides a message in a channel from a moderator's perspective.
  ChannelHide,
  /// Mutes a user in a channel from a moderator's perspective.
  ChannelMute,
  /// NIP-56 report; content is an optional free-text reason.
  Report,
  /// NIP-57 zap request, relayed through a zap-accepting service.
  ZapRequest,
  /// NIP-57 zap receipt, issued by the zap-accepting service.
  Zapper,
  /// Replaceable event listing the relays a user reads/writes from.
  RelayListMetadata,
  /// Parameterized replaceable event listing a user's badges.
  ProfileBadges,
  /// Parameterized replaceable event defining a badge.
  BadgeDefinition,
  /// Parameterized replaceable event holding long-form (article) content.
  LongFormContent,
  /// A custom kind that we haven't implemented yet.
  Custom(u64),
}

impl FromStr for EventKind {
  type Err = ParseIntError;
  fn from_str(event_kind: &str) -> Result<Self, Self::Err> {
    let event_kind: u64 = event_kind.parse()?;
    Ok(Self::from(event_kind))
  }
}

impl From<u64> for EventKind {
  fn from(u: u64) -> Self {
    match u {
      0 => Self::Metadata,
      1 => Self::Text,
      2 => Self::RecommendRelay,
      3 => Self::Contacts,
      4 => Self::EncryptedDirectMessage,
      5 => Self::Delete,
      7 => Self::Reaction,
      8 => Self::BadgeAward,
      40 => Self::ChannelCreate,
      41 => Self::ChannelMeta,
      42 => Self::ChannelMessage,
      43 => Self::ChannelHide,
      44 => Self::ChannelMute,
      1984 => Self::Report,
      9734 => Self::ZapRequest,
      9735 => Self::Zapper,
      10002 => Self::RelayListMetadata,
      30008 => Self::ProfileBadges,
      30009 => Self::BadgeDefinition,
      30023 => Self::LongFormContent,
      x => Self::Custom(x),
    }
  }
}

impl From<EventKind> for u64 {
  fn from(e: EventKind) -> u64 {
    match e {
      EventKind::Metadata => 0,
      EventKind::Text => 1,
      EventKind::RecommendRelay => 2,
      EventKind::Contacts => 3,
      EventKind::EncryptedDirectMessage => 4,
      EventKind::Delete => 5,
      EventKind::Reaction => 7,
      EventKind::BadgeAward => 8,
      EventKind::ChannelCreate => 40,
      EventKind::ChannelMeta => 41,
      EventKind::ChannelMessage => 42,
      EventKind::ChannelHide => 43,
      EventKind::ChannelMute => 44,
      EventKind::Report => 1984,
      EventKind::ZapRequest => 9734,
      EventKind::Zapper => 9735,
      EventKind::RelayListMetadata => 10002,
      EventKind::ProfileBadges => 30008,
      EventKind::BadgeDefinition => 30009,
      EventKind::LongFormContent => 30023,
      EventKind::Custom(u) => u,
    }
  }
}

impl EventKind {
  /// NIP-16: kinds in this range replace earlier events from the same
  /// pubkey+kind; relays only need to store the latest one.
  pub fn is_replaceable(&self) -> bool {
    matches!(self, Self::Metadata | Self::Contacts | Self::RelayListMetadata)
      || matches!(u64::from(*self), 10_000..=19_999)
  }

  /// NIP-33: kinds in this range replace earlier events from the same
  /// pubkey+kind+`d` tag value.
  pub fn is_parameterized_replaceable(&self) -> bool {
    matches!(u64::from(*self), 30_000..=39_999)
  }
}

impl Serialize for EventKind {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_u64(From::from(*self))
  }
}

struct EventKindVisitor;

impl Visitor<'_> for EventKindVisitor {
  type Value = EventKind;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "an unsigned number of maximum length of 64 bits")
  }

  fn visit_u64<E>(self, v: u64) -> Result<EventKind, E>
  where
    E: Error,
  {
    Ok(From::<u64>::from(v))
  }
}

impl<'de> Deserialize<'de> for EventKind {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_u64(EventKindVisitor)
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", u64::from(*self))
  }
}
