//! Secret encryption for credentials at rest.
//!
//! SMTP profile secrets are stored AES-256-GCM encrypted; the key is
//! derived from a process-wide passphrase. The wire format is
//! `base64(nonce || ciphertext)`.

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

use crate::prelude::*;

const NONCE_LEN: usize = 12;

/// Cipher handle derived from the configured passphrase.
///
/// Cheap to clone; adapters hold one and use it on every profile
/// read/write.
#[derive(Clone)]
pub struct SecretCipher {
	key: [u8; 32],
}

impl std::fmt::Debug for SecretCipher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("SecretCipher(..)")
	}
}

impl SecretCipher {
	pub fn new(passphrase: &str) -> MdResult<Self> {
		if passphrase.is_empty() {
			return Err(Error::ConfigError("Encryption passphrase is not set".to_string()));
		}
		let mut key = [0u8; 32];
		key.copy_from_slice(Sha256::digest(passphrase.as_bytes()).as_slice());
		Ok(Self { key })
	}

	pub fn encrypt(&self, plaintext: &str) -> MdResult<String> {
		if plaintext.is_empty() {
			return Err(Error::ValidationError("Text to encrypt cannot be empty".to_string()));
		}
		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
		let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
		let ciphertext = cipher
			.encrypt(&nonce, plaintext.as_bytes())
			.map_err(|_| Error::Internal("Encryption failed".to_string()))?;

		let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
		out.extend_from_slice(nonce.as_slice());
		out.extend_from_slice(&ciphertext);
		Ok(STANDARD.encode(out))
	}

	pub fn decrypt(&self, encoded: &str) -> MdResult<String> {
		if encoded.is_empty() {
			return Err(Error::ValidationError("Ciphertext to decrypt cannot be empty".to_string()));
		}
		let raw = STANDARD.decode(encoded).map_err(|_| Error::Parse)?;
		if raw.len() <= NONCE_LEN {
			return Err(Error::Parse);
		}
		let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
		let plaintext = cipher
			.decrypt(Nonce::from_slice(nonce), ciphertext)
			.map_err(|_| Error::Internal("Decryption failed".to_string()))?;

		String::from_utf8(plaintext).map_err(|_| Error::Parse)
	}
}


// vim: ts=4
