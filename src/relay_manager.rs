//! The fleet controller of spec.md §4.6: owns every [`Relay`], fans out
//! subscribe/publish calls, and gathers each relay's connect task into one
//! cooperative run.
//!
//! Grounded in `pynostr/relay_manager.py`; `prepare_relays`/`run_sync`'s
//! Tornado `gen.with_timeout`/`io_loop` gather is translated to a
//! `tokio::task::JoinSet`, per SPEC_FULL.md §5's implementation note.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{info, warn};
use uuid::Uuid;

use crate::event::Event;
use crate::filter::FilterList;
use crate::pool::MessagePool;
use crate::relay::{Relay, RelayConfig, RelayPolicy};

/// [`RelayManager`] error. The two caller-visible categories from spec.md
/// §7: a relay/manager contract violation ("protocol error") for
/// operating on an unknown or mis-policied relay or publishing an
/// unverifiable event.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("no relay registered for url: {0}")]
  UnknownRelay(String),
  #[error("{url} is not configured to read from")]
  NotReadable { url: String },
  #[error("could not publish {event_id}: must be signed")]
  Unsigned { event_id: String },
  #[error("could not publish {event_id}: failed to verify signature {sig}")]
  VerificationFailed { event_id: String, sig: String },
  #[error(transparent)]
  Event(#[from] crate::event::Error),
}

/// Manager-level threshold overrides applied to every relay it adds,
/// matching `pynostr.RelayManager`'s three optional override fields.
#[derive(Debug, Clone, Default)]
pub struct RelayManagerOverrides {
  pub error_threshold: Option<u32>,
  pub timeout_error_threshold: Option<u32>,
  pub timeout: Option<u64>,
}

/// Owns the `url -> Relay` map exclusively; the map is only ever mutated
/// by `add_relay`/`remove_relay`, which run on the caller's task.
pub struct RelayManager {
  relays: Mutex<HashMap<String, Arc<Relay>>>,
  pool: Arc<MessagePool>,
  overrides: RelayManagerOverrides,
}

impl RelayManager {
  pub fn new(first_response_only: bool) -> Self {
    Self::with_overrides(first_response_only, RelayManagerOverrides::default())
  }

  pub fn with_overrides(first_response_only: bool, overrides: RelayManagerOverrides) -> Self {
    Self {
      relays: Mutex::new(HashMap::new()),
      pool: Arc::new(MessagePool::new(first_response_only)),
      overrides,
    }
  }

  pub fn pool(&self) -> &MessagePool {
    &self.pool
  }

  /// Instantiates a `Relay` wired to the shared pool, applies any
  /// manager-level threshold overrides, and registers it. `get_metadata`
  /// eagerly fetches the NIP-11 document before returning.
  pub async fn add_relay(
    &self,
    url: String,
    policy: RelayPolicy,
    timeout_secs: u64,
    close_on_eose: bool,
    get_metadata: bool,
  ) {
    let mut config = RelayConfig {
      timeout_secs,
      close_on_eose,
      ..RelayConfig::default()
    };
    if let Some(error_threshold) = self.overrides.error_threshold {
      config.error_threshold = error_threshold;
    }
    if let Some(timeout_error_threshold) = self.overrides.timeout_error_threshold {
      config.timeout_error_threshold = timeout_error_threshold;
    }
    if let Some(timeout) = self.overrides.timeout {
      config.timeout_secs = timeout;
    }

    let relay = Arc::new(Relay::new(url.clone(), self.pool.clone(), policy, config));

    if get_metadata {
      if let Err(err) = relay.update_metadata().await {
        warn!("failed to fetch NIP-11 metadata for {url}: {err}");
      }
    }

    self.relays.lock().unwrap().insert(url, relay);
  }

  /// Applies `add_relay` with the same settings to every entry of a
  /// relay list.
  pub async fn add_relay_list(
    &self,
    relay_list: Vec<(String, RelayPolicy)>,
    timeout_secs: u64,
    close_on_eose: bool,
    get_metadata: bool,
  ) {
    for (url, policy) in relay_list {
      self.add_relay(url, policy, timeout_secs, close_on_eose, get_metadata).await;
    }
  }

  pub fn remove_relay(&self, url: &str) {
    if let Some(relay) = self.relays.lock().unwrap().remove(url) {
      relay.close();
    }
  }

  /// Sweeps relays whose `is_connected` flag is false.
  pub fn remove_closed_relays(&self) {
    let dead: Vec<String> = self
      .connection_statuses()
      .into_iter()
      .filter(|(_, connected)| !connected)
      .map(|(url, _)| url)
      .collect();

    for url in dead {
      info!("{url} is not connected... removing relay.");
      self.remove_relay(&url);
    }
  }

  pub fn connection_statuses(&self) -> HashMap<String, bool> {
    self
      .relays
      .lock()
      .unwrap()
      .iter()
      .map(|(url, relay)| (url.clone(), relay.is_connected()))
      .collect()
  }

  fn relay(&self, url: &str) -> Option<Arc<Relay>> {
    self.relays.lock().unwrap().get(url).cloned()
  }

  fn all_relays(&self) -> Vec<Arc<Relay>> {
    self.relays.lock().unwrap().values().cloned().collect()
  }

  /// Targets one relay; raises when it isn't registered or is write-only.
  pub fn add_subscription_on_relay(&self, url: &str, id: String, filters: FilterList) -> Result<(), Error> {
    let relay = self.relay(url).ok_or_else(|| Error::UnknownRelay(url.to_string()))?;
    if !relay.policy.read {
      return Err(Error::NotReadable { url: url.to_string() });
    }
    relay.add_subscription(id, filters);
    Ok(())
  }

  pub fn update_subscription_on_relay(&self, url: &str, id: String, filters: FilterList) -> Result<(), Error> {
    let relay = self.relay(url).ok_or_else(|| Error::UnknownRelay(url.to_string()))?;
    if !relay.policy.read {
      return Err(Error::NotReadable { url: url.to_string() });
    }
    relay.update_subscription(id, filters);
    Ok(())
  }

  pub fn add_subscription_on_all_relays(&self, id: String, filters: FilterList) {
    for relay in self.all_relays() {
      if relay.policy.read {
        relay.add_subscription(id.clone(), filters.clone());
      }
    }
  }

  /// Convenience over `add_subscription_on_all_relays` that mints a
  /// fresh subscription id, matching the teacher's
  /// `Client::subscribe`-equivalent `Uuid::new_v4()` idiom.
  pub fn subscribe_on_all_relays(&self, filters: FilterList) -> String {
    let id = Uuid::new_v4().to_string();
    self.add_subscription_on_all_relays(id.clone(), filters);
    id
  }

  pub fn close_subscription_on_relay(&self, url: &str, id: &str) -> Result<(), Error> {
    let relay = self.relay(url).ok_or_else(|| Error::UnknownRelay(url.to_string()))?;
    relay.close_subscription(id);
    relay.enqueue_close(id);
    Ok(())
  }

  pub fn close_subscription_on_all_relays(&self, id: &str) {
    for relay in self.all_relays() {
      relay.close_subscription(id);
      relay.enqueue_close(id);
    }
  }

  pub fn close_all_relay_connections(&self) {
    for relay in self.all_relays() {
      relay.close();
    }
  }

  /// Rejects unsigned events and events whose signature does not verify,
  /// then fans out the EVENT frame to every writable relay's outgoing
  /// queue.
  pub fn publish_event(&self, event: &Event) -> Result<(), Error> {
    if event.sig.is_empty() {
      return Err(Error::Unsigned { event_id: event.id.clone() });
    }
    match event.verify() {
      Ok(true) => {}
      _ => {
        return Err(Error::VerificationFailed {
          event_id: event.id.clone(),
          sig: event.sig.clone(),
        })
      }
    }

    for relay in self.all_relays() {
      if relay.policy.write {
        relay.publish_event(event);
      }
    }
    Ok(())
  }

  /// Gathers each relay's connect task into a single cooperative group
  /// and blocks until every one completes — independent failures, a
  /// timed-out or errored relay never cancels its peers.
  pub async fn run_sync(&self) {
    let mut join_set = tokio::task::JoinSet::new();
    for relay in self.all_relays() {
      let url = relay.url.clone();
      join_set.spawn(async move {
        relay.connect().await;
        url
      });
    }

    while let Some(result) = join_set.join_next().await {
      match result {
        Ok(url) => info!("connect task for {url} finished"),
        Err(err) => warn!("connect task panicked: {err}"),
      }
    }
  }

  pub fn get_relay_information(&self, url: &str) -> Option<crate::relay::RelayInformationDocument> {
    self.relay(url).and_then(|relay| relay.metadata())
  }
}
