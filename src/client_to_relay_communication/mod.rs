/// The five types of `client -> relay` communications.
///
///  - `["EVENT", event_JSON]`: used to publish events, and (NIP-42) to send a
///    signed authentication event.
///
///  - `["REQ", subscription_id, filters_JSON]`: used to request events and subscribe to new updates.
///       A REQ message may contain multiple filters. In this case, events that match any of the filters are to be returned,
///       i.e., multiple filters are to be interpreted as `||` conditions.
///
///  - `["CLOSE", subscription_id]`: used to stop previous subscriptions. `subscription_id` is a random string used to represent a subscription.
///
///  - `["COUNT", subscription_id, filters_JSON]`: used to ask a relay for the count of events matching filters (NIP-45), without the events themselves.
///
///  - `["AUTH", event_JSON]`: used to send a signed NIP-42 authentication event back to the relay.
///
// Internal `client_to_relay_communication` modules
pub mod auth;
pub mod close;
pub mod count;
pub mod event;
pub mod request;

/// [`ClientToRelayCommunication`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// Error serializing or deserializing JSON data
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error(transparent)]
  Event(#[from] crate::event::Error),
  #[error(transparent)]
  Filter(#[from] crate::filter::Error),
  #[error("Invalid data")]
  InvalidData,
}

impl serde::de::Error for Error {
  fn custom<T>(_msg: T) -> Self
  where
    T: std::fmt::Display,
  {
    Self::InvalidData
  }
}
