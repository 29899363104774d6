#![allow(dead_code)]

use bech32::{FromBase32, ToBase32, Variant};
use secp256k1::{All, KeyPair, Parity, PublicKey, Secp256k1, SecretKey, XOnlyPublicKey};

use crate::schnorr;

pub const NPUB_PREFIX: &str = "npub";
pub const NSEC_PREFIX: &str = "nsec";

/// [`Keys`] error
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid hex: {0}")]
  Hex(#[from] hex::FromHexError),
  #[error(transparent)]
  Secp256k1(#[from] secp256k1::Error),
  #[error(transparent)]
  Bech32(#[from] bech32::Error),
  #[error("unexpected bech32 human-readable prefix: expected `{expected}`, got `{actual}`")]
  WrongPrefix { expected: String, actual: String },
  #[error("this key pair has no secret key")]
  MissingSecretKey,
}

/// An asymmetric key pair usable for signing (Schnorr) and NIP-04 key
/// agreement (ECDH). A `Keys` built from a public key alone can verify but
/// not sign.
///
/// Grounded in `pynostr/key.py`'s `PrivateKey`/`PublicKey` pair, adapted to
/// the teacher's `schnorr::AsymmetricKeys` shape and to secp256k1's x-only
/// public key representation (Nostr pubkeys are 32-byte x-only hex, assuming
/// even parity per BIP-340).
pub struct Keys {
  secp: Secp256k1<All>,
  secret_key: Option<SecretKey>,
  public_key: XOnlyPublicKey,
}

impl Keys {
  pub fn generate() -> Self {
    let secp = Secp256k1::new();
    let keys = schnorr::generate_keys();
    let (xonly, _parity) = keys.public_key.x_only_public_key();
    Self {
      secp,
      secret_key: Some(keys.private_key),
      public_key: xonly,
    }
  }

  pub fn from_secret_key_hex(hex_key: &str) -> Result<Self, Error> {
    let secp = Secp256k1::new();
    let bytes = hex::decode(hex_key)?;
    let secret_key = SecretKey::from_slice(&bytes)?;
    let keypair = KeyPair::from_secret_key(&secp, &secret_key);
    let (public_key, _parity) = XOnlyPublicKey::from_keypair(&keypair);
    Ok(Self {
      secp,
      secret_key: Some(secret_key),
      public_key,
    })
  }

  pub fn from_public_key_hex(hex_key: &str) -> Result<Self, Error> {
    let bytes = hex::decode(hex_key)?;
    let public_key = XOnlyPublicKey::from_slice(&bytes)?;
    Ok(Self {
      secp: Secp256k1::new(),
      secret_key: None,
      public_key,
    })
  }

  pub fn public_key_hex(&self) -> String {
    hex::encode(self.public_key.serialize())
  }

  pub fn secret_key_hex(&self) -> Option<String> {
    self.secret_key.map(|sk| hex::encode(sk.secret_bytes()))
  }

  pub fn secret_key(&self) -> Option<&SecretKey> {
    self.secret_key.as_ref()
  }

  pub fn x_only_public_key(&self) -> XOnlyPublicKey {
    self.public_key
  }

  /// Full (33-byte, even-parity) public key, used by ECDH which needs a
  /// curve point rather than an x-coordinate alone.
  pub fn full_public_key(&self) -> PublicKey {
    self.public_key.public_key(Parity::Even)
  }

  pub fn sign_event_id(&self, event_id_hex: &str) -> Result<String, Error> {
    let secret_key = self.secret_key.ok_or(Error::MissingSecretKey)?;
    let id_bytes = hex::decode(event_id_hex)?;
    let id: [u8; 32] = id_bytes
      .try_into()
      .map_err(|_| secp256k1::Error::InvalidMessage)?;
    let sig = schnorr::sign_event_id(&self.secp, id, secret_key.secret_bytes())?;
    Ok(sig.to_string())
  }

  pub fn verify_event_id(&self, event_id_hex: &str, sig_hex: &str) -> Result<bool, Error> {
    let id_bytes = hex::decode(event_id_hex)?;
    let id: [u8; 32] = id_bytes
      .try_into()
      .map_err(|_| secp256k1::Error::InvalidMessage)?;
    let sig_bytes = hex::decode(sig_hex)?;
    let sig = secp256k1::schnorr::Signature::from_slice(&sig_bytes)?;
    Ok(schnorr::verify_event_id(&self.secp, id, sig, self.public_key)?)
  }

  pub fn to_bech32_public(&self) -> Result<String, Error> {
    encode_bech32(NPUB_PREFIX, &self.public_key.serialize())
  }

  pub fn to_bech32_secret(&self) -> Result<String, Error> {
    let secret_key = self.secret_key.ok_or(Error::MissingSecretKey)?;
    encode_bech32(NSEC_PREFIX, &secret_key.secret_bytes())
  }

  pub fn from_bech32_public(bech32_key: &str) -> Result<Self, Error> {
    let bytes = decode_bech32(NPUB_PREFIX, bech32_key)?;
    Self::from_public_key_hex(&hex::encode(bytes))
  }

  pub fn from_bech32_secret(bech32_key: &str) -> Result<Self, Error> {
    let bytes = decode_bech32(NSEC_PREFIX, bech32_key)?;
    Self::from_secret_key_hex(&hex::encode(bytes))
  }
}

pub(crate) fn encode_bech32(hrp: &str, data: &[u8]) -> Result<String, Error> {
  Ok(bech32::encode(hrp, data.to_base32(), Variant::Bech32)?)
}

pub(crate) fn decode_bech32(expected_hrp: &str, s: &str) -> Result<Vec<u8>, Error> {
  let (hrp, data, _variant) = bech32::decode(s)?;
  if hrp != expected_hrp {
    return Err(Error::WrongPrefix {
      expected: expected_hrp.to_string(),
      actual: hrp,
    });
  }
  Ok(Vec::<u8>::from_base32(&data)?)
}
