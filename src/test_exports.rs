// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! Helpers for exercising the homomorphic properties of a key pair from tests and benchmarks.
//! There is no SemVer support for this module.

use crate::{
    Ciphertext, DecryptionKey, EncryptionKey, LargeBiPrimeSizedNumber, Result, SanityCheckError,
};

/// Multiplies `lhs` and `rhs` under `encryption_key` and decrypts the product with
/// `decryption_key`, yielding $ m_1 + m_2 \mod N $.
///
/// Fails with [`SanityCheckError::MismatchedKeyPair`] if `decryption_key` does not belong to
/// `encryption_key`.
pub fn verify_additive_homomorphism(
    encryption_key: &EncryptionKey,
    decryption_key: &DecryptionKey,
    lhs: &Ciphertext,
    rhs: &Ciphertext,
) -> Result<LargeBiPrimeSizedNumber> {
    if decryption_key.encryption_key() != encryption_key {
        return Err(SanityCheckError::MismatchedKeyPair().into());
    }

    decryption_key.decrypt(&encryption_key.add(lhs, rhs)?)
}
