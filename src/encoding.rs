// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! A versioned, fixed-width, big-endian byte encoding for keys and ciphertexts.
//!
//! Every encoding starts with a two-byte header, [`FORMAT_VERSION`] followed by a kind tag,
//! and continues with the big-endian bytes of each field at its full type width:
//!
//! | kind            | tag    | fields                                   |
//! |-----------------|--------|------------------------------------------|
//! | encryption key  | `0x01` | $ N $ (256 bytes)                        |
//! | decryption key  | `0x02` | $ N $, $ \lambda $ (256 bytes each)      |
//! | ciphertext      | `0x03` | $ c $ (512 bytes)                        |
//!
//! Decoding re-runs the same validation as the corresponding constructor.

use crypto_bigint::Encoding;
use zeroize::Zeroize;

use crate::{
    Ciphertext, DecryptionKey, EncryptionKey, Error, LargeBiPrimeSizedNumber,
    PaillierModulusSizedNumber, Result,
};

pub const FORMAT_VERSION: u8 = 1;

const ENCRYPTION_KEY_TAG: u8 = 0x01;
const DECRYPTION_KEY_TAG: u8 = 0x02;
const CIPHERTEXT_TAG: u8 = 0x03;

const HEADER_LENGTH: usize = 2;

fn header(tag: u8, body_length: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LENGTH + body_length);
    bytes.push(FORMAT_VERSION);
    bytes.push(tag);

    bytes
}

/// Checks the header and length of `bytes` and returns the body.
fn body(bytes: &[u8], tag: u8, body_length: usize) -> Result<&[u8]> {
    match bytes {
        [version, kind, body @ ..]
            if *version == FORMAT_VERSION && *kind == tag && body.len() == body_length =>
        {
            Ok(body)
        }
        _ => Err(Error::InvalidEncoding),
    }
}

impl EncryptionKey {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = header(ENCRYPTION_KEY_TAG, LargeBiPrimeSizedNumber::BYTES);
        bytes.extend_from_slice(&self.n().to_be_bytes());

        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let body = body(bytes, ENCRYPTION_KEY_TAG, LargeBiPrimeSizedNumber::BYTES)?;

        EncryptionKey::new(LargeBiPrimeSizedNumber::from_be_slice(body))
    }
}

impl DecryptionKey {
    /// Encodes the secret key. The returned buffer holds secret material; zeroize it after use.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = header(DECRYPTION_KEY_TAG, 2 * LargeBiPrimeSizedNumber::BYTES);
        bytes.extend_from_slice(&self.encryption_key().n().to_be_bytes());

        let mut lambda = self.lambda().to_be_bytes();
        bytes.extend_from_slice(&lambda);
        lambda.zeroize();

        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let body = body(bytes, DECRYPTION_KEY_TAG, 2 * LargeBiPrimeSizedNumber::BYTES)?;
        let (n, lambda) = body.split_at(LargeBiPrimeSizedNumber::BYTES);

        let mut lambda = LargeBiPrimeSizedNumber::from_be_slice(lambda);
        let decryption_key = EncryptionKey::new(LargeBiPrimeSizedNumber::from_be_slice(n))
            .and_then(|encryption_key| DecryptionKey::new(encryption_key, lambda));
        lambda.zeroize();

        decryption_key
    }
}

impl Ciphertext {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = header(CIPHERTEXT_TAG, PaillierModulusSizedNumber::BYTES);
        bytes.extend_from_slice(&self.value().to_be_bytes());

        bytes
    }

    /// Decodes a ciphertext. Its range is checked against a key only when it is used.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let body = body(bytes, CIPHERTEXT_TAG, PaillierModulusSizedNumber::BYTES)?;

        Ok(Ciphertext::new(PaillierModulusSizedNumber::from_be_slice(
            body,
        )))
    }
}
