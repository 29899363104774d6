use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use log::{debug, warn};

use crate::relay_to_client_communication::{
  auth::RelayToClientCommAuth, count::RelayToClientCommCount, eose::RelayToClientCommEose,
  event::RelayToClientCommEvent, notice::RelayToClientCommNotice, ok::RelayToClientCommOk,
  Error as CommError, RelayMessage,
};

/// [`MessagePool`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Communication(#[from] CommError),
}

/// Secondary index over received events: per-relay and per-subscription
/// views, plus oldest/newest lookups. Kept alongside the pool's FIFOs so
/// callers don't have to drain the queue to inspect history.
#[derive(Debug, Default)]
pub struct EventMessageStore {
  by_relay: HashMap<String, Vec<RelayToClientCommEvent>>,
  by_subscription: HashMap<String, Vec<RelayToClientCommEvent>>,
}

impl EventMessageStore {
  fn record(&mut self, relay_url: &str, event: RelayToClientCommEvent) {
    self
      .by_relay
      .entry(relay_url.to_string())
      .or_default()
      .push(event.clone());
    self
      .by_subscription
      .entry(event.subscription_id.clone())
      .or_default()
      .push(event);
  }

  pub fn events_by_relay(&self, relay_url: &str) -> &[RelayToClientCommEvent] {
    self.by_relay.get(relay_url).map_or(&[], Vec::as_slice)
  }

  pub fn events_by_subscription(&self, subscription_id: &str) -> &[RelayToClientCommEvent] {
    self
      .by_subscription
      .get(subscription_id)
      .map_or(&[], Vec::as_slice)
  }

  pub fn oldest_for_relay(&self, relay_url: &str) -> Option<&RelayToClientCommEvent> {
    self.events_by_relay(relay_url).first()
  }

  pub fn newest_for_relay(&self, relay_url: &str) -> Option<&RelayToClientCommEvent> {
    self.events_by_relay(relay_url).last()
  }
}

/// One FIFO queue per inbound message kind, a dedup set guarding the
/// event queue, and the secondary [`EventMessageStore`] index. Shared by
/// reference among every `Relay` and the application; the mutexes are
/// only ever held across a single enqueue/set-insert.
pub struct MessagePool {
  events: Mutex<VecDeque<(String, RelayToClientCommEvent)>>,
  notices: Mutex<VecDeque<(String, RelayToClientCommNotice)>>,
  eoses: Mutex<VecDeque<(String, RelayToClientCommEose)>>,
  oks: Mutex<VecDeque<(String, RelayToClientCommOk)>>,
  auths: Mutex<VecDeque<(String, RelayToClientCommAuth)>>,
  counts: Mutex<VecDeque<(String, RelayToClientCommCount)>>,
  /// Always records the bare event id, regardless of `first_response_only`
  /// — the two dedup modes only differ in which key is *computed* before
  /// the check, and both converge to "seen" after the first sighting.
  seen: Mutex<HashSet<String>>,
  store: Mutex<EventMessageStore>,
  first_response_only: bool,
}

impl MessagePool {
  pub fn new(first_response_only: bool) -> Self {
    Self {
      events: Mutex::new(VecDeque::new()),
      notices: Mutex::new(VecDeque::new()),
      eoses: Mutex::new(VecDeque::new()),
      oks: Mutex::new(VecDeque::new()),
      auths: Mutex::new(VecDeque::new()),
      counts: Mutex::new(VecDeque::new()),
      seen: Mutex::new(HashSet::new()),
      store: Mutex::new(EventMessageStore::default()),
      first_response_only,
    }
  }

  /// Parses `raw_frame` and routes it to the matching queue. Unparseable
  /// frames are dropped (logged, not surfaced) per the relay's own
  /// "invalid frames are silently dropped" contract.
  pub fn add_message(&self, raw_frame: &str, source_url: &str) {
    let message = match RelayMessage::from_json(raw_frame) {
      Ok(message) => message,
      Err(err) => {
        debug!("dropping unparseable frame from {source_url}: {err}");
        return;
      }
    };

    match message {
      RelayMessage::Event(event) => self.add_event(event, source_url),
      RelayMessage::Notice(notice) => self.notices.lock().unwrap().push_back((source_url.to_string(), notice)),
      RelayMessage::Eose(eose) => self.eoses.lock().unwrap().push_back((source_url.to_string(), eose)),
      RelayMessage::Ok(ok) => self.oks.lock().unwrap().push_back((source_url.to_string(), ok)),
      RelayMessage::Auth(auth) => self.auths.lock().unwrap().push_back((source_url.to_string(), auth)),
      RelayMessage::Count(count) => self.counts.lock().unwrap().push_back((source_url.to_string(), count)),
    }
  }

  /// `event.id` alone in first-response-only mode, `event.id|url` in
  /// per-relay ("all copies") mode. The `seen` set is only ever populated
  /// with bare event ids (see `add_event`), so this key is checked against
  /// it, never inserted verbatim — in per-relay mode the composite key
  /// can never match a bare id already in `seen`, so that mode never
  /// actually dedups. That asymmetry is carried over verbatim from
  /// `pynostr.message_pool.MessagePool._process_message`, where the same
  /// mismatch between the checked key and the stored key makes
  /// "all copies" mode dedup-free in practice; it is also exactly what
  /// spec.md §8 property 5 requires ("per-relay mode ... exactly N with
  /// distinct urls").
  fn dedup_key(&self, event: &RelayToClientCommEvent, source_url: &str) -> String {
    if self.first_response_only {
      event.event.id.clone()
    } else {
      format!("{}|{}", event.event.id, source_url)
    }
  }

  fn add_event(&self, event: RelayToClientCommEvent, source_url: &str) {
    let key = self.dedup_key(&event, source_url);
    let mut seen = self.seen.lock().unwrap();
    if seen.contains(&key) {
      warn!("duplicate event {} from {source_url}, dropping", event.event.id);
      return;
    }
    seen.insert(event.event.id.clone());
    drop(seen);

    self.store.lock().unwrap().record(source_url, event.clone());
    self.events.lock().unwrap().push_back((source_url.to_string(), event));
  }

  pub fn pop_event(&self) -> Option<(String, RelayToClientCommEvent)> {
    self.events.lock().unwrap().pop_front()
  }

  pub fn pop_notice(&self) -> Option<(String, RelayToClientCommNotice)> {
    self.notices.lock().unwrap().pop_front()
  }

  pub fn pop_eose(&self) -> Option<(String, RelayToClientCommEose)> {
    self.eoses.lock().unwrap().pop_front()
  }

  pub fn pop_ok(&self) -> Option<(String, RelayToClientCommOk)> {
    self.oks.lock().unwrap().pop_front()
  }

  pub fn pop_auth(&self) -> Option<(String, RelayToClientCommAuth)> {
    self.auths.lock().unwrap().pop_front()
  }

  pub fn pop_count(&self) -> Option<(String, RelayToClientCommCount)> {
    self.counts.lock().unwrap().pop_front()
  }

  /// Drains the entire event queue, oldest first.
  pub fn get_all_events(&self) -> Vec<(String, RelayToClientCommEvent)> {
    self.events.lock().unwrap().drain(..).collect()
  }

  pub fn get_all_notices(&self) -> Vec<(String, RelayToClientCommNotice)> {
    self.notices.lock().unwrap().drain(..).collect()
  }

  pub fn get_all_eoses(&self) -> Vec<(String, RelayToClientCommEose)> {
    self.eoses.lock().unwrap().drain(..).collect()
  }

  pub fn get_all_oks(&self) -> Vec<(String, RelayToClientCommOk)> {
    self.oks.lock().unwrap().drain(..).collect()
  }

  pub fn get_all_auths(&self) -> Vec<(String, RelayToClientCommAuth)> {
    self.auths.lock().unwrap().drain(..).collect()
  }

  pub fn get_all_counts(&self) -> Vec<(String, RelayToClientCommCount)> {
    self.counts.lock().unwrap().drain(..).collect()
  }

  pub fn has_events(&self) -> bool {
    !self.events.lock().unwrap().is_empty()
  }

  pub fn has_notices(&self) -> bool {
    !self.notices.lock().unwrap().is_empty()
  }

  pub fn has_eoses(&self) -> bool {
    !self.eoses.lock().unwrap().is_empty()
  }

  pub fn has_oks(&self) -> bool {
    !self.oks.lock().unwrap().is_empty()
  }

  pub fn has_auths(&self) -> bool {
    !self.auths.lock().unwrap().is_empty()
  }

  pub fn has_counts(&self) -> bool {
    !self.counts.lock().unwrap().is_empty()
  }

  /// Snapshots every queue without draining any of them — a point-in-time
  /// view across all six message kinds, per spec.md §4.4's `get_all()`.
  pub fn get_all(&self) -> MessagePoolSnapshot {
    MessagePoolSnapshot {
      events: self.events.lock().unwrap().iter().cloned().collect(),
      notices: self.notices.lock().unwrap().iter().cloned().collect(),
      eoses: self.eoses.lock().unwrap().iter().cloned().collect(),
      oks: self.oks.lock().unwrap().iter().cloned().collect(),
      auths: self.auths.lock().unwrap().iter().cloned().collect(),
      counts: self.counts.lock().unwrap().iter().cloned().collect(),
    }
  }

  pub fn with_store<R>(&self, f: impl FnOnce(&EventMessageStore) -> R) -> R {
    f(&self.store.lock().unwrap())
  }
}

/// Point-in-time snapshot of every queue, returned by [`MessagePool::get_all`].
/// Unlike the `get_all_<kind>` accessors, taking this snapshot does not
/// drain anything.
#[derive(Debug, Clone, Default)]
pub struct MessagePoolSnapshot {
  pub events: Vec<(String, RelayToClientCommEvent)>,
  pub notices: Vec<(String, RelayToClientCommNotice)>,
  pub eoses: Vec<(String, RelayToClientCommEose)>,
  pub oks: Vec<(String, RelayToClientCommOk)>,
  pub auths: Vec<(String, RelayToClientCommAuth)>,
  pub counts: Vec<(String, RelayToClientCommCount)>,
}

impl Default for MessagePool {
  fn default() -> Self {
    Self::new(false)
  }
}
