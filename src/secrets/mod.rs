//! # Secret Codec
//!
//! Encrypts and decrypts short opaque strings (private-key passwords) with
//! AES-256-GCM and a unique nonce per value. Stored values are prefixed with
//! a fixed marker so encrypted and legacy plaintext values can be told apart
//! by inspection.
//!
//! The codec is invoked explicitly at the serialization boundary of the
//! configuration record: the repository calls [`SecretCodec::seal`] before
//! writing and [`SecretCodec::open`] after reading. Decryption failures
//! degrade the read to the marker-stripped raw value and are logged, never
//! propagated as fatal.
//!
//! The master key is a base64-encoded 32-byte key, normally supplied via the
//! `TLSREG_SECRET_KEY` environment variable (generate one with
//! `openssl rand -base64 32`).

use crate::config::SecretsConfig;
use crate::errors::{Result, TlsRegError};
use base64::Engine;
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;
use tracing::warn;
use zeroize::Zeroizing;

/// Marker prefixed to encrypted values at rest, allowing encrypted and
/// non-encrypted legacy data to be filtered with vanilla queries.
pub const MARKER_PREFIX: &str = "___";

/// Column capacity of encrypted secret fields in the store.
pub const MAX_STORED_LEN: usize = 255;

/// Size of AES-256-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Size of AES-256-GCM tag in bytes
const TAG_SIZE: usize = 16;

/// Single-use nonce sequence for AES-GCM
struct SingleNonce {
    nonce: Option<[u8; NONCE_SIZE]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_SIZE]) -> Self {
        Self { nonce: Some(nonce_bytes) }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.nonce.take().map(Nonce::assume_unique_for_key).ok_or(ring::error::Unspecified)
    }
}

/// Result of reading a stored secret value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenedSecret {
    /// Marker was present and the token decrypted cleanly.
    Decrypted(String),
    /// No marker; a legacy value stored before encryption was enabled.
    Plaintext(String),
    /// Marker was present but the token could not be decrypted; carries the
    /// marker-stripped raw value so the read path can proceed degraded.
    Undecryptable(String),
}

impl OpenedSecret {
    pub fn value(&self) -> &str {
        match self {
            OpenedSecret::Decrypted(v)
            | OpenedSecret::Plaintext(v)
            | OpenedSecret::Undecryptable(v) => v,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            OpenedSecret::Decrypted(v)
            | OpenedSecret::Plaintext(v)
            | OpenedSecret::Undecryptable(v) => v,
        }
    }

    /// True when the stored value claimed to be encrypted but was not
    /// decryptable with the current key.
    pub fn is_degraded(&self) -> bool {
        matches!(self, OpenedSecret::Undecryptable(_))
    }
}

/// Secret encryption codec
#[derive(Clone)]
pub struct SecretCodec {
    key_bytes: Arc<[u8; 32]>,
    enforce_max_length: bool,
    rng: Arc<SystemRandom>,
}

impl SecretCodec {
    /// Create a new codec from configuration
    pub fn new(config: &SecretsConfig) -> Result<Self> {
        let key_bytes = Zeroizing::new(
            base64::engine::general_purpose::STANDARD
                .decode(&config.master_key_base64)
                .map_err(|e| {
                    TlsRegError::config(format!("Invalid base64 in secret master key: {}", e))
                })?,
        );

        if key_bytes.len() != 32 {
            return Err(TlsRegError::config(format!(
                "Secret master key must be 32 bytes (256 bits), got {} bytes",
                key_bytes.len()
            )));
        }

        let mut key_array = [0u8; 32];
        key_array.copy_from_slice(&key_bytes);

        Ok(Self {
            key_bytes: Arc::new(key_array),
            enforce_max_length: config.enforce_max_length,
            rng: Arc::new(SystemRandom::new()),
        })
    }

    /// Prepare a secret for persistence.
    ///
    /// Empty values are stored as-is; anything else is encrypted and marker
    /// prefixed. With length enforcement enabled, a stored value exceeding
    /// [`MAX_STORED_LEN`] is rejected with a storage error naming the field
    /// and the encrypted length, before anything is persisted.
    pub fn seal(&self, field: &str, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let token = self.encrypt(plaintext.as_bytes())?;
        let stored = format!("{}{}", MARKER_PREFIX, token);

        if self.enforce_max_length && stored.len() > MAX_STORED_LEN {
            return Err(TlsRegError::StorageLimit {
                field: field.to_string(),
                max_length: MAX_STORED_LEN,
                encrypted_length: stored.len(),
            });
        }

        Ok(stored)
    }

    /// Read back a stored secret.
    ///
    /// Values without the marker are returned unchanged. Marked values are
    /// decrypted; if decryption fails the read degrades to the
    /// marker-stripped raw value with a warning rather than failing the read
    /// path.
    pub fn open(&self, stored: &str) -> OpenedSecret {
        let Some(token) = stored.strip_prefix(MARKER_PREFIX) else {
            return OpenedSecret::Plaintext(stored.to_string());
        };

        match self.decrypt(token) {
            Ok(plaintext) => OpenedSecret::Decrypted(plaintext),
            Err(reason) => {
                warn!(reason, "Could not decrypt stored secret; read degrades to raw value");
                OpenedSecret::Undecryptable(token.to_string())
            }
        }
    }

    /// Encrypt plaintext into a base64 token of `nonce || ciphertext || tag`.
    fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| TlsRegError::crypto("Failed to generate random nonce for encryption"))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, &*self.key_bytes)
            .map_err(|_| TlsRegError::crypto("Failed to create encryption key"))?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut sealing_key = aead::SealingKey::new(unbound_key, nonce_sequence);

        let mut buffer = Vec::with_capacity(NONCE_SIZE + plaintext.len() + TAG_SIZE);
        buffer.extend_from_slice(&nonce_bytes);
        buffer.extend_from_slice(plaintext);

        // Seal everything after the nonce in place, appending the tag.
        let mut in_out = buffer.split_off(NONCE_SIZE);
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| TlsRegError::crypto("Failed to encrypt secret value"))?;
        buffer.extend_from_slice(&in_out);

        Ok(base64::engine::general_purpose::STANDARD.encode(&buffer))
    }

    /// Decrypt a base64 token produced by [`Self::encrypt`]. The error is a
    /// short reason string for logging only.
    fn decrypt(&self, token: &str) -> std::result::Result<String, &'static str> {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(token)
            .map_err(|_| "token is not valid base64")?;

        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err("token too short to carry nonce and tag");
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(&raw[..NONCE_SIZE]);

        let unbound_key = UnboundKey::new(&AES_256_GCM, &*self.key_bytes)
            .map_err(|_| "failed to create decryption key")?;
        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut opening_key = aead::OpeningKey::new(unbound_key, nonce_sequence);

        let mut in_out = Zeroizing::new(raw[NONCE_SIZE..].to_vec());
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| "authentication failed; token is not a product of this key")?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| "decrypted value is not valid UTF-8")
    }
}

impl std::fmt::Debug for SecretCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCodec")
            .field("enforce_max_length", &self.enforce_max_length)
            .field("key_bytes", &"[REDACTED]")
            .finish()
    }
}
