//! Ephemeral P-521 ECDH handshake → HMAC-SHA256 shared key
//!
//! Both ends generate a fresh keypair, swap SEC1-encoded public points, and
//! reduce the raw ECDH x-coordinate with `HMAC-SHA256(secret, KEY_CONTEXT)`.
//! Remote points are decoded onto the curve before use; the identity and
//! off-curve coordinates are rejected.

use hmac::{Hmac, Mac};
use p521::{ecdh::EphemeralSecret, elliptic_curve::sec1::ToEncodedPoint, PublicKey};
use rand::rngs::OsRng;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::SharedKey;
use crate::KEY_SIZE;

/// Message fed to the keyed hash when deriving the symmetric key.
pub const KEY_CONTEXT: &[u8] = b"encryption key";

/// Length of an uncompressed SEC1 P-521 point: 0x04 || x (66) || y (66)
pub const PUBLIC_KEY_SIZE: usize = 133;

/// One side of a handshake in progress. The private scalar lives only here and
/// is consumed by [`Handshake::complete`].
pub struct Handshake {
    secret: EphemeralSecret,
    public: Vec<u8>,
}

impl Handshake {
    /// Generate a fresh ephemeral keypair.
    pub fn begin() -> Self {
        let secret = EphemeralSecret::random(&mut OsRng);
        let public = secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec();
        Self { secret, public }
    }

    /// Our public point, uncompressed SEC1.
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Combine our private scalar with the peer's public point.
    pub fn complete(self, remote_public: &[u8]) -> CryptoResult<SharedKey> {
        let remote =
            PublicKey::from_sec1_bytes(remote_public).map_err(|_| CryptoError::InvalidPublicKey)?;
        let shared = self.secret.diffie_hellman(&remote);
        derive_shared_key(shared.raw_secret_bytes().as_slice())
    }
}

impl std::fmt::Debug for Handshake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handshake")
            .field("public_len", &self.public.len())
            .finish_non_exhaustive()
    }
}

/// Responder side in one step: validate the initiator's point, answer with a
/// fresh public point, and return the derived key.
pub fn respond(remote_public: &[u8]) -> CryptoResult<(Vec<u8>, SharedKey)> {
    let handshake = Handshake::begin();
    let public = handshake.public_key().to_vec();
    let key = handshake.complete(remote_public)?;
    Ok((public, key))
}

fn derive_shared_key(raw_secret: &[u8]) -> CryptoResult<SharedKey> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(raw_secret)
        .map_err(|_| CryptoError::KeyDerivation)?;
    mac.update(KEY_CONTEXT);
    let digest = mac.finalize().into_bytes();

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&digest);
    Ok(SharedKey::from_bytes(bytes))
}
