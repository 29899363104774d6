use crate::event::{kind::EventKind, tag::Tag, Event};
use crate::keys::Keys;
use crate::util::now_timestamp;

/// NIP-56 report reason, carried as the third element of a `p`/`e` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
  Nudity,
  Profanity,
  Illegal,
  Spam,
  Impersonation,
}

impl ReportType {
  fn as_str(&self) -> &'static str {
    match self {
      Self::Nudity => "nudity",
      Self::Profanity => "profanity",
      Self::Illegal => "illegal",
      Self::Spam => "spam",
      Self::Impersonation => "impersonation",
    }
  }
}

impl std::fmt::Display for ReportType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// [`Report`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("reports require the pubkey of the user being reported")]
  MissingReportedPubkey,
  #[error(transparent)]
  Event(#[from] crate::event::Error),
}

/// NIP-56 reporting event. Reports a pubkey, optionally anchored to a
/// specific note (`note_id`), with an optional secondary "victim" pubkey
/// (e.g. the author being impersonated).
#[derive(Debug, Clone, Default)]
pub struct Report {
  pub content: String,
  pub reported_pubkey: Option<String>,
  pub note_id: Option<String>,
  pub report_type: Option<ReportType>,
  pub victim_pubkey: Option<String>,
}

impl Report {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn reporting(mut self, pubkey: String, report_type: ReportType) -> Self {
    self.reported_pubkey = Some(pubkey);
    self.report_type = Some(report_type);
    self
  }

  /// Builds and signs the kind-1984 event. Tag layout mirrors
  /// `pynostr/report.py`'s `Report.to_event`: a `note_id`-anchored report
  /// tags the note (with the reason on the `e` tag) and the reported
  /// pubkey bare; an author-level report carries the reason on the `p`
  /// tag and may add a second bare `p` tag for the victim.
  pub fn to_event(&self, keys: &Keys) -> Result<Event, Error> {
    let reported_pubkey = self
      .reported_pubkey
      .clone()
      .ok_or(Error::MissingReportedPubkey)?;
    let report_type = self.report_type.ok_or(Error::MissingReportedPubkey)?;

    let mut event = Event::new_without_signature(
      keys.public_key_hex(),
      now_timestamp(),
      EventKind::Report,
      vec![],
      self.content.clone(),
    );

    if let Some(note_id) = &self.note_id {
      event.add_tag(Tag::Generic(
        crate::event::tag::TagKind::Event,
        vec![note_id.clone(), report_type.to_string()],
      ));
      event.add_pubkey_ref(reported_pubkey);
    } else {
      event.add_tag(Tag::Generic(
        crate::event::tag::TagKind::PubKey,
        vec![reported_pubkey, report_type.to_string()],
      ));
      if let Some(victim) = &self.victim_pubkey {
        event.add_pubkey_ref(victim.clone());
      }
    }

    event.sign(keys)?;
    Ok(event)
  }
}
