//! Key derivation and bulk XOR decryption for the meta database and for
//! individual container assets (spec §4.1).

pub mod xor;

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::UmaVoiceError;

/// Derive the ciphered meta-DB key: `raw_key[i] ^ base_key[i % base_key.len()]`.
///
/// Returned as lowercase hex, ready to hand to the cipher engine's `hexkey`
/// pragma verbatim.
pub fn derive_meta_key_hex(base_key: &[u8], raw_key: &[u8]) -> String {
    let derived: Vec<u8> = raw_key
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ base_key[i % base_key.len()])
        .collect();
    hex::encode(derived)
}

/// Decrypts asset blobs using the rolling XOR stream described in §4.1.
#[derive(Debug, Clone)]
pub struct Cipher {
    ab_key: Vec<u8>,
    header_size: usize,
}

impl Cipher {
    pub fn new(config: &Config) -> Self {
        Self {
            ab_key: config.ab_key.clone(),
            header_size: config.header_size,
        }
    }

    /// Read `path` and decrypt it according to `encryption_key`. Missing files
    /// surface as [`UmaVoiceError::NotFound`].
    pub fn decrypt_file(
        &self,
        path: &Path,
        encryption_key: u64,
    ) -> Result<Vec<u8>, UmaVoiceError> {
        let data = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UmaVoiceError::NotFound(path.to_owned())
            } else {
                UmaVoiceError::Io(format!("reading asset {}", path.display()), e)
            }
        })?;
        Ok(self.decrypt_bytes(data, encryption_key))
    }

    /// Decrypt an already-loaded buffer in place and return it.
    ///
    /// `encryption_key == 0` means "not encrypted"; the buffer is returned
    /// untouched, matching the source's handling of unencrypted audio assets.
    pub fn decrypt_bytes(&self, mut data: Vec<u8>, encryption_key: u64) -> Vec<u8> {
        if encryption_key == 0 {
            return data;
        }
        let stream = self.key_stream(encryption_key);
        xor::xor_in_place(&mut data, self.header_size, &stream);
        data
    }

    /// Build the rolling key stream: `stream[(i * 8) + j] = ab_key[i] ^ key_bytes[j]`.
    fn key_stream(&self, encryption_key: u64) -> Vec<u8> {
        let key_bytes = encryption_key.to_le_bytes();
        let mut stream = vec![0u8; self.ab_key.len() * 8];
        for (i, base_byte) in self.ab_key.iter().enumerate() {
            for (j, key_byte) in key_bytes.iter().enumerate() {
                stream[(i * 8) + j] = base_byte ^ key_byte;
            }
        }
        stream
    }
}
