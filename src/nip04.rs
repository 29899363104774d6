#![allow(dead_code)]

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use secp256k1::ecdh::SharedSecret;

use crate::event::{kind::EventKind, Event};
use crate::keys::Keys;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// [`EncryptedDirectMessage`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Keys(#[from] crate::keys::Error),
  #[error(transparent)]
  Event(#[from] crate::event::Error),
  #[error("malformed encrypted payload: missing `?iv=` separator")]
  MissingIv,
  #[error("malformed base64 payload: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("ciphertext padding is invalid")]
  InvalidPadding,
}

/// Shared secret for NIP-04 is the raw X-coordinate of the ECDH point
/// (no hashing) — matches pynostr's `copy_x` callback, not the default
/// sha256-of-point `SharedSecret::new`.
fn shared_secret(keys: &Keys, their_pubkey_hex: &str) -> Result<[u8; 32], Error> {
  let their_full = Keys::from_public_key_hex(their_pubkey_hex)?.full_public_key();
  let secret_key = keys.secret_key().ok_or(crate::keys::Error::MissingSecretKey)?;

  let point = SharedSecret::new_with_hash_fn(&their_full, secret_key, |x, _y| {
    let mut out = [0u8; 32];
    out.copy_from_slice(x);
    out
  });

  let mut out = [0u8; 32];
  out.copy_from_slice(point.as_ref());
  Ok(out)
}

/// Encrypts `plaintext` for `recipient_pubkey_hex` using `keys`'s secret
/// key, returning the `base64(ciphertext)?iv=base64(iv)` wire encoding.
pub fn encrypt(keys: &Keys, recipient_pubkey_hex: &str, plaintext: &str) -> Result<String, Error> {
  let secret = shared_secret(keys, recipient_pubkey_hex)?;

  let mut iv = [0u8; 16];
  rand::thread_rng().fill_bytes(&mut iv);

  let ciphertext = Aes256CbcEnc::new(&secret.into(), &iv.into())
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

  Ok(format!("{}?iv={}", STANDARD.encode(ciphertext), STANDARD.encode(iv)))
}

/// Decrypts a `base64(ciphertext)?iv=base64(iv)` payload sent by
/// `sender_pubkey_hex`, using `keys`'s secret key.
pub fn decrypt(keys: &Keys, sender_pubkey_hex: &str, payload: &str) -> Result<String, Error> {
  let (ciphertext_b64, iv_b64) = payload.split_once("?iv=").ok_or(Error::MissingIv)?;

  let ciphertext = STANDARD.decode(ciphertext_b64)?;
  let iv = STANDARD.decode(iv_b64)?;

  let secret = shared_secret(keys, sender_pubkey_hex)?;

  let plaintext = Aes256CbcDec::new(&secret.into(), iv.as_slice().into())
    .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
    .map_err(|_| Error::InvalidPadding)?;

  Ok(String::from_utf8_lossy(&plaintext).into_owned())
}

/// Builds a signed kind-4 event carrying `encrypted_content` addressed to
/// `recipient_pubkey_hex`, optionally referencing a prior event.
pub fn build_event(
  keys: &Keys,
  recipient_pubkey_hex: &str,
  encrypted_content: String,
  reference_event_id: Option<String>,
) -> Result<Event, Error> {
  let mut event = Event::new_without_signature(
    keys.public_key_hex(),
    crate::util::now_timestamp(),
    EventKind::EncryptedDirectMessage,
    vec![],
    encrypted_content,
  );
  event.add_pubkey_ref(recipient_pubkey_hex.to_string());
  if let Some(reference) = reference_event_id {
    event.add_event_ref(reference);
  }
  event.sign(keys)?;
  Ok(event)
}
