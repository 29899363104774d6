//! NIP-19 bech32-encoded identifiers beyond the plain `npub`/`nsec` keypair
//! forms already covered by [`crate::keys::Keys`]: `note` (event id) and
//! `nprofile` (a TLV-framed pubkey + relay hint list).
//!
//! Grounded in `pynostr/key.py`'s bech32 helpers for which fields carry
//! which human-readable prefix. The checksum/base32 math itself is the
//! `bech32` crate's job, per spec.md's "bech32/TLV codecs are out of
//! scope as a hand-rolled implementation detail" — this module only adds
//! the Nostr-specific framing on top.

use crate::keys::{decode_bech32, encode_bech32};

pub const NOTE_PREFIX: &str = "note";
pub const NPROFILE_PREFIX: &str = "nprofile";

const TLV_TYPE_PUBKEY: u8 = 0;
const TLV_TYPE_RELAY: u8 = 1;

/// [`nip19`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Keys(#[from] crate::keys::Error),
  #[error("nprofile TLV payload is malformed")]
  MalformedTlv,
  #[error("nprofile is missing its mandatory pubkey (TLV type 0) entry")]
  MissingPubKey,
}

/// A decoded `nprofile`: the profile's pubkey plus zero or more relay URLs
/// the client might find it advertised on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nprofile {
  pub pubkey_hex: String,
  pub relays: Vec<String>,
}

/// Encodes a 32-byte event id as `note1...`.
pub fn encode_note(event_id_hex: &str) -> Result<String, Error> {
  let bytes = hex::decode(event_id_hex).map_err(crate::keys::Error::Hex)?;
  Ok(encode_bech32(NOTE_PREFIX, &bytes)?)
}

/// Decodes a `note1...` identifier back to its 32-byte hex event id.
pub fn decode_note(note: &str) -> Result<String, Error> {
  let bytes = decode_bech32(NOTE_PREFIX, note)?;
  Ok(hex::encode(bytes))
}

/// Encodes a pubkey and its relay hints as `nprofile1...`.
///
/// TLV layout (NIP-19): repeated `(type: u8, length: u8, value: [u8])`
/// entries — type 0 is the mandatory pubkey (32 raw bytes), type 1 is a
/// relay url (raw ASCII bytes), repeatable in declaration order.
pub fn encode_nprofile(profile: &Nprofile) -> Result<String, Error> {
  let pubkey_bytes = hex::decode(&profile.pubkey_hex).map_err(crate::keys::Error::Hex)?;

  let mut tlv = Vec::new();
  push_tlv(&mut tlv, TLV_TYPE_PUBKEY, &pubkey_bytes);
  for relay in &profile.relays {
    push_tlv(&mut tlv, TLV_TYPE_RELAY, relay.as_bytes());
  }

  Ok(encode_bech32(NPROFILE_PREFIX, &tlv)?)
}

/// Decodes an `nprofile1...` identifier back to its pubkey and relay hints.
pub fn decode_nprofile(nprofile: &str) -> Result<Nprofile, Error> {
  let tlv = decode_bech32(NPROFILE_PREFIX, nprofile)?;

  let mut pubkey_hex = None;
  let mut relays = Vec::new();
  let mut rest = tlv.as_slice();

  while !rest.is_empty() {
    if rest.len() < 2 {
      return Err(Error::MalformedTlv);
    }
    let entry_type = rest[0];
    let len = rest[1] as usize;
    let value = rest.get(2..2 + len).ok_or(Error::MalformedTlv)?;

    match entry_type {
      TLV_TYPE_PUBKEY => pubkey_hex = Some(hex::encode(value)),
      TLV_TYPE_RELAY => {
        relays.push(String::from_utf8(value.to_vec()).map_err(|_| Error::MalformedTlv)?)
      }
      _ => {} // unknown TLV types are skipped, not rejected
    }

    rest = &rest[2 + len..];
  }

  Ok(Nprofile {
    pubkey_hex: pubkey_hex.ok_or(Error::MissingPubKey)?,
    relays,
  })
}

fn push_tlv(buf: &mut Vec<u8>, entry_type: u8, value: &[u8]) {
  buf.push(entry_type);
  buf.push(value.len() as u8);
  buf.extend_from_slice(value);
}
