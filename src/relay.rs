//! A single relay connection: the protocol state machine of spec.md §4.5.
//!
//! Grounded in `pynostr/relay.py` + `pynostr/base_relay.py` for the state
//! machine, thresholds, and `_is_valid_message` validation, and in the
//! teacher's `client/src/pool.rs` `RelayData::connect` for the Rust-native
//! connection plumbing (a single task split into a write-then-read loop
//! over a `tokio-tungstenite` socket). NIP-11 metadata fetch is grounded in
//! the pack's `rust-nostr` nip11 module, adapted down to the fields
//! spec.md §6 actually names.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

use crate::client_to_relay_communication::{
  close::ClientToRelayCommClose, event::ClientToRelayCommEvent, request::ClientToRelayCommRequest,
};
use crate::event::Event;
use crate::filter::FilterList;
use crate::pool::MessagePool;
use crate::relay_to_client_communication::RelayMessage;
use crate::subscription::Subscription;
use crate::util::relay_url_to_http;

/// [`Relay`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
  #[error(transparent)]
  Http(#[from] reqwest::Error),
  #[error("{url} is not a websocket url")]
  NotAWebSocketUrl { url: String },
}

/// `{read, write}`: which directions of traffic this relay is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayPolicy {
  pub read: bool,
  pub write: bool,
}

impl Default for RelayPolicy {
  fn default() -> Self {
    Self { read: true, write: true }
  }
}

/// Outbound WebSocket proxy configuration, named in spec.md §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
  pub host: String,
  pub port: u16,
  pub proxy_type: String,
}

/// spec.md §4.5: `Idle`, `Connecting`, `Open`, `Closing`, `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
  Idle,
  Connecting,
  Open,
  Closing,
  Closed,
}

/// NIP-11 relay information document, trimmed to the fields spec.md §6
/// names as "keys of interest": `supported_nips`, `limitation.payment_required`,
/// and `fees.admission[0].amount`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayInformationDocument {
  pub name: Option<String>,
  pub description: Option<String>,
  pub pubkey: Option<String>,
  pub contact: Option<String>,
  pub supported_nips: Option<Vec<u32>>,
  pub software: Option<String>,
  pub version: Option<String>,
  pub limitation: Option<Limitation>,
  pub fees: Option<FeeSchedules>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Limitation {
  pub payment_required: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedules {
  #[serde(default)]
  pub admission: Vec<Fee>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fee {
  pub amount: Option<u64>,
  pub unit: Option<String>,
}

impl RelayInformationDocument {
  /// True iff this document's `supported_nips` lists NIP `n`.
  pub fn check_nip(&self, n: u32) -> bool {
    self
      .supported_nips
      .as_ref()
      .is_some_and(|nips| nips.contains(&n))
  }
}

/// Per-relay configurable thresholds, spec.md §9's `Configuration` block.
#[derive(Debug, Clone)]
pub struct RelayConfig {
  pub timeout_secs: u64,
  pub close_on_eose: bool,
  pub error_threshold: u32,
  pub timeout_error_threshold: u32,
  pub ping_interval_secs: u64,
  pub ping_timeout_secs: u64,
  pub proxy: Option<ProxyConfig>,
  pub first_response_only: bool,
}

impl Default for RelayConfig {
  fn default() -> Self {
    Self {
      timeout_secs: 2,
      close_on_eose: true,
      error_threshold: 3,
      timeout_error_threshold: 10,
      ping_interval_secs: 60,
      ping_timeout_secs: 120,
      proxy: None,
      first_response_only: false,
    }
  }
}

enum Attempt {
  /// The open loop ran and ended on its own (EOSE-close, explicit close,
  /// remote close) — not a fault.
  Ended,
  HandshakeTimeout,
  Faulted(Error),
}

/// A single relay connection: owns its subscriptions map, outgoing queue,
/// and fault counters exclusively; shares the [`MessagePool`] by reference
/// with every other relay and the application.
pub struct Relay {
  pub url: String,
  pub policy: RelayPolicy,
  config: RelayConfig,
  pool: std::sync::Arc<MessagePool>,
  state: Mutex<ConnectionState>,
  subscriptions: Mutex<HashMap<String, Subscription>>,
  outgoing: Mutex<VecDeque<String>>,
  error_counter: Mutex<u32>,
  timeout_error_counter: Mutex<u32>,
  eose_counter: Mutex<u32>,
  eose_threshold: Mutex<u32>,
  num_sent_events: Mutex<u32>,
  metadata: Mutex<Option<RelayInformationDocument>>,
  message_callback: Option<std::sync::Arc<dyn Fn(&str, &str) + Send + Sync>>,
  message_callback_url: bool,
}

impl Relay {
  pub fn new(url: String, pool: std::sync::Arc<MessagePool>, policy: RelayPolicy, config: RelayConfig) -> Self {
    Self {
      url,
      policy,
      config,
      pool,
      state: Mutex::new(ConnectionState::Idle),
      subscriptions: Mutex::new(HashMap::new()),
      outgoing: Mutex::new(VecDeque::new()),
      error_counter: Mutex::new(0),
      timeout_error_counter: Mutex::new(0),
      eose_counter: Mutex::new(0),
      eose_threshold: Mutex::new(0),
      num_sent_events: Mutex::new(0),
      metadata: Mutex::new(None),
      message_callback: None,
      message_callback_url: false,
    }
  }

  /// Attaches a callback invoked with `(raw_frame, url)` just before a
  /// valid frame is forwarded into the pool. `with_url` controls whether
  /// the callback actually receives the url or an empty string, mirroring
  /// spec.md §9's `message_callback_url` knob.
  pub fn with_message_callback(
    mut self,
    callback: std::sync::Arc<dyn Fn(&str, &str) + Send + Sync>,
    with_url: bool,
  ) -> Self {
    self.message_callback = Some(callback);
    self.message_callback_url = with_url;
    self
  }

  pub fn state(&self) -> ConnectionState {
    *self.state.lock().unwrap()
  }

  pub fn is_connected(&self) -> bool {
    self.state() == ConnectionState::Open
  }

  pub fn error_count(&self) -> u32 {
    *self.error_counter.lock().unwrap()
  }

  pub fn timeout_error_count(&self) -> u32 {
    *self.timeout_error_counter.lock().unwrap()
  }

  pub fn num_sent_events(&self) -> u32 {
    *self.num_sent_events.lock().unwrap()
  }

  pub fn metadata(&self) -> Option<RelayInformationDocument> {
    self.metadata.lock().unwrap().clone()
  }

  pub fn check_nip(&self, n: u32) -> bool {
    self.metadata().is_some_and(|m| m.check_nip(n))
  }

  /// Fetches the relay's NIP-11 information document and caches it.
  pub async fn update_metadata(&self) -> Result<(), Error> {
    let http_url =
      relay_url_to_http(&self.url).ok_or_else(|| Error::NotAWebSocketUrl { url: self.url.clone() })?;

    let client = reqwest::Client::new();
    let response = client
      .get(http_url)
      .header("Accept", "application/nostr+json")
      .send()
      .await?;
    let document: RelayInformationDocument = response.json().await?;
    *self.metadata.lock().unwrap() = Some(document);
    Ok(())
  }

  /// Inserts `id -> Subscription(filters)`, enqueues a REQ frame, and
  /// increments `eose_threshold` — a lifetime count of add/update calls
  /// per spec.md §4.5, not the number of currently-open subscriptions
  /// (see DESIGN.md's resolution of spec.md §9 Open Question 2).
  pub fn add_subscription(&self, id: String, filters: FilterList) {
    let req = ClientToRelayCommRequest::new_req(id.clone(), filters.0.clone());
    self.subscriptions.lock().unwrap().insert(id, Subscription::new(req.subscription_id.clone(), filters));
    self.outgoing.lock().unwrap().push_back(req.as_json());
    *self.eose_threshold.lock().unwrap() += 1;
  }

  /// Replaces an existing subscription's filters and re-emits REQ.
  pub fn update_subscription(&self, id: String, filters: FilterList) {
    let req = ClientToRelayCommRequest::new_req(id.clone(), filters.0.clone());
    if let Some(sub) = self.subscriptions.lock().unwrap().get_mut(&id) {
      sub.filters = filters;
    }
    self.outgoing.lock().unwrap().push_back(req.as_json());
    *self.eose_threshold.lock().unwrap() += 1;
  }

  /// Removes the subscription locally. The caller (the `RelayManager`) is
  /// responsible for enqueuing the CLOSE frame.
  pub fn close_subscription(&self, id: &str) {
    self.subscriptions.lock().unwrap().remove(id);
  }

  pub fn has_subscription(&self, id: &str) -> bool {
    self.subscriptions.lock().unwrap().contains_key(id)
  }

  /// Enqueues a raw outbound frame with no acknowledgment semantics;
  /// delivery confirmation comes from an inbound OK frame matched by the
  /// application, not from this call.
  pub fn publish_raw(&self, frame: String) {
    self.outgoing.lock().unwrap().push_back(frame);
  }

  pub fn publish_event(&self, event: &Event) {
    self.publish_raw(ClientToRelayCommEvent::new_event(event.clone()).as_json());
  }

  pub fn enqueue_close(&self, id: &str) {
    let close = ClientToRelayCommClose { code: "CLOSE".to_string(), subscription_id: id.to_string() };
    self.publish_raw(close.as_str().unwrap_or_default());
  }

  fn pop_outgoing(&self) -> Option<String> {
    self.outgoing.lock().unwrap().pop_front()
  }

  /// Idempotent: marks the relay for closing. The connect task observes
  /// this on its next read and completes without scheduling a reconnect.
  pub fn close(&self) {
    let mut state = self.state.lock().unwrap();
    if *state != ConnectionState::Closed {
      *state = ConnectionState::Closing;
    }
  }

  /// spec.md §4.3: a frame is valid iff it parses as a known message
  /// type and, for EVENT, its subscription is registered, the event
  /// verifies cryptographically, and the subscription's filters match.
  /// Invalid frames are dropped silently (not surfaced, not counted).
  fn validate(&self, message: &RelayMessage) -> bool {
    match message {
      RelayMessage::Event(event_msg) => {
        let subs = self.subscriptions.lock().unwrap();
        let sub = match subs.get(&event_msg.subscription_id) {
          Some(sub) => sub.clone(),
          None => return false,
        };
        drop(subs);

        match event_msg.event.verify() {
          Ok(true) => sub.matches(&event_msg.event),
          _ => false,
        }
      }
      // OK leniency (bool or "true"/"false") and length checks already
      // happened while parsing `RelayMessage::from_json`.
      _ => true,
    }
  }

  /// The sole connect task for this relay: retries the handshake up to
  /// its thresholds, then drives the write/read loop until the socket or
  /// an explicit/EOSE close ends it.
  pub async fn connect(self: std::sync::Arc<Self>) {
    loop {
      *self.state.lock().unwrap() = ConnectionState::Connecting;

      match self.run_one_connection().await {
        Attempt::Ended => return,
        Attempt::HandshakeTimeout => {
          let mut counter = self.timeout_error_counter.lock().unwrap();
          *counter += 1;
          let count = *counter;
          drop(counter);
          warn!("timeout connecting to {}", self.url);
          if count <= self.config.timeout_error_threshold {
            tokio::time::sleep(Duration::from_secs(1)).await;
            continue;
          }
          *self.state.lock().unwrap() = ConnectionState::Closed;
          return;
        }
        Attempt::Faulted(err) => {
          let mut counter = self.error_counter.lock().unwrap();
          *counter += 1;
          let count = *counter;
          drop(counter);
          warn!("error connecting to {}: {err}", self.url);
          if count <= self.config.error_threshold {
            tokio::time::sleep(Duration::from_secs(1)).await;
            continue;
          }
          *self.state.lock().unwrap() = ConnectionState::Closed;
          return;
        }
      }
    }
  }

  async fn run_one_connection(&self) -> Attempt {
    let handshake = tokio_tungstenite::connect_async(&self.url);

    let connection = if self.config.timeout_secs > 0 {
      match tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), handshake).await {
        Ok(result) => result,
        Err(_elapsed) => return Attempt::HandshakeTimeout,
      }
    } else {
      handshake.await
    };

    let (ws_stream, _response) = match connection {
      Ok(ok) => ok,
      Err(err) => return Attempt::Faulted(Error::WebSocket(err)),
    };

    info!("connected to {}", self.url);
    *self.error_counter.lock().unwrap() = 0;
    *self.timeout_error_counter.lock().unwrap() = 0;
    *self.state.lock().unwrap() = ConnectionState::Open;

    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    loop {
      if let Some(frame) = self.pop_outgoing() {
        if let Err(err) = ws_tx.send(Message::Text(frame)).await {
          return Attempt::Faulted(Error::WebSocket(err));
        }
        *self.num_sent_events.lock().unwrap() += 1;
      }

      let message = match ws_rx.next().await {
        Some(Ok(message)) => message,
        Some(Err(err)) => return Attempt::Faulted(Error::WebSocket(err)),
        None => break, // socket drained and closed
      };

      match message.to_text() {
        Ok(text) if !text.is_empty() => self.handle_frame(text),
        _ => continue,
      }

      if self.state() != ConnectionState::Open {
        break;
      }
    }

    *self.state.lock().unwrap() = ConnectionState::Closing;
    let _ = ws_tx.close().await;
    *self.state.lock().unwrap() = ConnectionState::Closed;
    Attempt::Ended
  }

  fn handle_frame(&self, raw: &str) {
    let parsed = match RelayMessage::from_json(raw) {
      Ok(parsed) => parsed,
      Err(err) => {
        debug!("dropping unparseable frame from {}: {err}", self.url);
        return;
      }
    };

    if !self.validate(&parsed) {
      debug!("dropping invalid frame from {}", self.url);
      return;
    }

    if let Some(callback) = &self.message_callback {
      let url = if self.message_callback_url { self.url.as_str() } else { "" };
      callback(raw, url);
    }

    self.pool.add_message(raw, &self.url);

    if matches!(parsed, RelayMessage::Eose(_)) {
      let mut eose_counter = self.eose_counter.lock().unwrap();
      *eose_counter += 1;
      let reached_threshold = *eose_counter >= *self.eose_threshold.lock().unwrap();
      drop(eose_counter);

      if self.config.close_on_eose && reached_threshold {
        self.close();
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::{kind::EventKind, Event};
  use crate::filter::Filter;
  use crate::keys::Keys;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  fn relay() -> Relay {
    Relay::new(
      "wss://relay.example".to_string(),
      std::sync::Arc::new(MessagePool::default()),
      RelayPolicy::default(),
      RelayConfig::default(),
    )
  }

  #[test]
  fn add_subscription_enqueues_req_matching_filter_list() {
    let relay = relay();
    let filters = FilterList(vec![Filter { authors: Some(vec!["a".to_string()]), ..Default::default() }]);
    relay.add_subscription("sub1".to_string(), filters.clone());

    let frame = relay.pop_outgoing().unwrap();
    let expected = ClientToRelayCommRequest::new_req("sub1".to_string(), filters.0.clone()).as_json();
    assert_eq!(frame, expected);
    assert!(relay.has_subscription("sub1"));
  }

  #[test]
  fn close_subscription_removes_it_from_the_map() {
    let relay = relay();
    relay.add_subscription("sub1".to_string(), FilterList::default());
    relay.close_subscription("sub1");
    assert!(!relay.has_subscription("sub1"));
  }

  #[test]
  fn eose_threshold_counts_every_add_and_update_call() {
    let relay = relay();
    relay.add_subscription("sub1".to_string(), FilterList::default());
    relay.update_subscription("sub1".to_string(), FilterList::default());
    assert_eq!(*relay.eose_threshold.lock().unwrap(), 2);
  }

  #[test]
  fn validate_rejects_event_on_unknown_subscription() {
    let relay = relay();
    let keys = Keys::generate();
    let mut event = Event::new_without_signature(keys.public_key_hex(), 1, EventKind::Text, vec![], "hi".to_string());
    event.sign(&keys).unwrap();

    let message = RelayMessage::Event(crate::relay_to_client_communication::event::RelayToClientCommEvent::new_event(
      "unknown-sub".to_string(),
      event,
    ));
    assert!(!relay.validate(&message));
  }

  #[test]
  fn validate_rejects_event_failing_filter_match() {
    let relay = relay();
    let keys = Keys::generate();
    relay.add_subscription(
      "sub1".to_string(),
      FilterList(vec![Filter { authors: Some(vec!["someone-else".to_string()]), ..Default::default() }]),
    );

    let mut event = Event::new_without_signature(keys.public_key_hex(), 1, EventKind::Text, vec![], "hi".to_string());
    event.sign(&keys).unwrap();

    let message = RelayMessage::Event(crate::relay_to_client_communication::event::RelayToClientCommEvent::new_event(
      "sub1".to_string(),
      event,
    ));
    assert!(!relay.validate(&message));
  }

  #[test]
  fn validate_accepts_event_matching_its_subscription() {
    let relay = relay();
    let keys = Keys::generate();
    relay.add_subscription(
      "sub1".to_string(),
      FilterList(vec![Filter { authors: Some(vec![keys.public_key_hex()]), ..Default::default() }]),
    );

    let mut event = Event::new_without_signature(keys.public_key_hex(), 1, EventKind::Text, vec![], "hi".to_string());
    event.sign(&keys).unwrap();

    let message = RelayMessage::Event(crate::relay_to_client_communication::event::RelayToClientCommEvent::new_event(
      "sub1".to_string(),
      event,
    ));
    assert!(relay.validate(&message));
  }

  #[test]
  fn check_nip_reads_cached_metadata() {
    let relay = relay();
    assert!(!relay.check_nip(11));
    *relay.metadata.lock().unwrap() = Some(RelayInformationDocument {
      supported_nips: Some(vec![1, 11, 42]),
      ..Default::default()
    });
    assert!(relay.check_nip(11));
    assert!(!relay.check_nip(4));
  }

  #[tokio::test]
  async fn connect_stops_retrying_once_error_count_exceeds_threshold() {
    // Port 1 refuses connections immediately, exercising the handshake
    // error (not timeout) path without any real delay. error_threshold 0
    // means the very first failed attempt is already past threshold, so
    // this returns without sleeping.
    let config = RelayConfig { timeout_secs: 0, error_threshold: 0, ..RelayConfig::default() };
    let relay = std::sync::Arc::new(Relay::new(
      "ws://127.0.0.1:1".to_string(),
      std::sync::Arc::new(MessagePool::default()),
      RelayPolicy::default(),
      config,
    ));
    relay.clone().connect().await;
    assert_eq!(relay.state(), ConnectionState::Closed);
    assert_eq!(relay.error_count(), 1);
  }
}
