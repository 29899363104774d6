use std::time::{SystemTime, UNIX_EPOCH};

use crate::event::Timestamp;

/// Current Unix timestamp in seconds, used as the default `created_at`
/// for events and relay-facing timing. Mirrors the teacher's
/// `Client::get_timestamp_in_seconds`.
pub fn now_timestamp() -> Timestamp {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .expect("system clock is before the Unix epoch")
    .as_secs()
}

/// Rewrites a relay's `ws://`/`wss://` URL into the `http://`/`https://`
/// equivalent used to fetch its NIP-11 information document.
pub fn relay_url_to_http(relay_url: &str) -> Option<String> {
  if let Some(rest) = relay_url.strip_prefix("wss://") {
    Some(format!("https://{rest}"))
  } else {
    relay_url.strip_prefix("ws://").map(|rest| format!("http://{rest}"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[cfg(test)]
  use pretty_assertions::assert_eq;

  #[test]
  fn now_timestamp_is_plausible() {
    assert!(now_timestamp() > 1_600_000_000);
  }

  #[test]
  fn relay_url_to_http_rewrites_known_schemes() {
    assert_eq!(
      relay_url_to_http("wss://relay.damus.io"),
      Some("https://relay.damus.io".to_string())
    );
    assert_eq!(
      relay_url_to_http("ws://127.0.0.1:8080"),
      Some("http://127.0.0.1:8080".to_string())
    );
    assert_eq!(relay_url_to_http("ftp://example.com"), None);
  }
}
