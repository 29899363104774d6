//! Crate-level error composing every per-module `thiserror` enum, per
//! spec.md §7's error taxonomy: a `RelayException`-equivalent (protocol
//! errors raised by a `RelayManager` contract violation) and a
//! `NIPValidationException`-equivalent (NIP-compliance validation
//! failures), grounded in `pynostr/exception.py`'s two exception
//! families. Connection faults and malformed frames never reach this
//! type — they're isolated to the `Relay` that hit them, per spec.md §7.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  RelayManager(#[from] crate::relay_manager::Error),
  #[error(transparent)]
  Event(#[from] crate::event::Error),
  #[error(transparent)]
  Filter(#[from] crate::filter::Error),
  #[error(transparent)]
  ClientMessage(#[from] crate::client_to_relay_communication::Error),
  #[error(transparent)]
  ServerMessage(#[from] crate::relay_to_client_communication::Error),
  #[error(transparent)]
  Pool(#[from] crate::pool::Error),
  #[error(transparent)]
  Relay(#[from] crate::relay::Error),
  #[error(transparent)]
  Keys(#[from] crate::keys::Error),
  #[error(transparent)]
  Nip04(#[from] crate::nip04::Error),
  #[error(transparent)]
  Nip19(#[from] crate::nip19::Error),
  #[error(transparent)]
  Report(#[from] crate::report::Error),
}
