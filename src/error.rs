// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("key generation failed: the prime search was exhausted")]
    KeyGenerationFailed,
    #[error("the plaintext must lie in [0, N)")]
    InvalidPlaintext,
    #[error("the ciphertext is not an element of the ciphertext space [1, N^2)")]
    InvalidCiphertext,
    #[error("L(g^lambda mod N^2) has no inverse modulo N")]
    ModularInverseUndefined,
    #[error("no blinding factor co-prime to N was found")]
    BlindingFactorSearchExhausted,
    #[error("invalid encoding")]
    InvalidEncoding,
    #[error("the following sanity-check error occurred: {0}")]
    SanityCheckError(SanityCheckError),
    #[error("an internal error that should never have happened and signifies a bug")]
    InternalError,
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum SanityCheckError {
    #[error("invalid Params")]
    InvalidParams(),
    #[error("the decryption key does not belong to the encryption key")]
    MismatchedKeyPair(),
}

impl From<SanityCheckError> for Error {
    fn from(value: SanityCheckError) -> Self {
        Error::SanityCheckError(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
