//! AES-256-GCM file envelopes
//!
//! An envelope is three independent fields, never concatenated:
//! ```text
//! iv      16 bytes, random per seal
//! data    ciphertext, same length as the plaintext
//! authTag 16 bytes, GCM tag (no AAD)
//! ```
//!
//! A 128-bit GCM nonce is unusual but matches what browser clients produce
//! with `createCipheriv('aes-256-gcm', key, randomBytes(16))`.

use aes_gcm::{
    aead::{consts::U16, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm, Nonce, Tag,
};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::SharedKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// AES-256-GCM with a 16-byte nonce and the default 16-byte tag.
type Aes256Gcm128 = AesGcm<Aes256, U16>;

/// A sealed payload. Only meaningful together with the key that sealed it.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl Envelope {
    /// Assemble an envelope from wire fields of unchecked length.
    ///
    /// A wrong-sized nonce or tag is reported as `Decryption`, the same as a
    /// bad tag, so callers cannot tell malformed input from tampered input.
    pub fn from_parts(nonce: &[u8], ciphertext: Vec<u8>, tag: &[u8]) -> CryptoResult<Self> {
        let nonce: [u8; NONCE_SIZE] = nonce.try_into().map_err(|_| CryptoError::Decryption)?;
        let tag: [u8; TAG_SIZE] = tag.try_into().map_err(|_| CryptoError::Decryption)?;
        Ok(Self {
            nonce,
            ciphertext,
            tag,
        })
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("nonce_len", &self.nonce.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Encrypt `plaintext` under `key` with a freshly drawn random nonce.
pub fn seal(plaintext: &[u8], key: &SharedKey) -> CryptoResult<Envelope> {
    let cipher = Aes256Gcm128::new(key.as_bytes().into());

    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| {
            buffer.zeroize();
            CryptoError::Encryption
        })?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(Envelope {
        nonce,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Verify and decrypt an envelope. No plaintext is released unless the tag
/// checks out.
pub fn open(envelope: &Envelope, key: &SharedKey) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm128::new(key.as_bytes().into());

    let mut buffer = envelope.ciphertext.clone();
    match cipher.decrypt_in_place_detached(
        Nonce::<U16>::from_slice(&envelope.nonce),
        b"",
        &mut buffer,
        Tag::<U16>::from_slice(&envelope.tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(CryptoError::Decryption)
        }
    }
}
