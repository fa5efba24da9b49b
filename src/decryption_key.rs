// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::{
    arithmetic::{gcd, modular_inverse, widen_bi_prime},
    AsNaturalNumber, AsRingElement, Ciphertext, EncryptionKey, Error, LargeBiPrimeSizedNumber,
    PaillierModulusSizedNumber, Result, SanityCheckError,
};

/// Bases $ b $ for which a decryption key must satisfy $ b^{\lambda N} \equiv 1 \mod N^2 $.
const KEY_PAIR_VALIDATION_BASES: [u8; 8] = [2, 3, 5, 7, 11, 13, 17, 19];

/// A Paillier decryption (private) key $ \lambda = lcm(P - 1, Q - 1) $.
///
/// The key embeds the encryption key it was generated with, so decrypting under a foreign
/// public key is impossible by construction. It also caches
/// $ \mu = L(g^\lambda \mod N^2)^{-1} \mod N $.
///
/// Secret values are zeroized on drop.
#[derive(PartialEq, Eq, Clone)]
pub struct DecryptionKey {
    encryption_key: EncryptionKey,
    lambda: LargeBiPrimeSizedNumber,
    mu: LargeBiPrimeSizedNumber,
}

impl DecryptionKey {
    /// Instantiates the decryption key `lambda` of `encryption_key`.
    ///
    /// Fails with [`SanityCheckError::MismatchedKeyPair`] unless
    /// $ b^{\lambda N} \equiv 1 \mod N^2 $ for each of a fixed set of small prime bases $ b $,
    /// and with [`Error::ModularInverseUndefined`] if $ L(g^\lambda \mod N^2) $ is not
    /// invertible mod $ N $.
    pub fn new(encryption_key: EncryptionKey, lambda: LargeBiPrimeSizedNumber) -> Result<Self> {
        if lambda == LargeBiPrimeSizedNumber::ZERO || &lambda >= encryption_key.n() {
            return Err(SanityCheckError::InvalidParams().into());
        }

        let exponent_bits = encryption_key.n().bits_vartime();

        // Decryption needs $ (r^N)^\lambda \equiv 1 \mod N^2 $ for every blinding factor $ r $.
        let is_consistent = KEY_PAIR_VALIDATION_BASES.iter().all(|base| {
            encryption_key
                .mod_n2(&PaillierModulusSizedNumber::from(*base))
                .pow_bounded_exp(&lambda, exponent_bits)
                .pow_bounded_exp(encryption_key.n(), exponent_bits)
                .as_natural_number()
                == PaillierModulusSizedNumber::ONE
        });
        if !is_consistent {
            return Err(SanityCheckError::MismatchedKeyPair().into());
        }

        // $ u = L(g^\lambda mod N^2) $
        let g_to_the_lambda = encryption_key
            .mod_n2(&widen_bi_prime(encryption_key.g()))
            .pow_bounded_exp(&lambda, exponent_bits)
            .as_natural_number();
        let u = encryption_key
            .l(&g_to_the_lambda)
            .ok_or(Error::ModularInverseUndefined)?;

        if gcd(&u, encryption_key.n()) != LargeBiPrimeSizedNumber::ONE {
            return Err(Error::ModularInverseUndefined);
        }

        let mu = modular_inverse(&u, encryption_key.n_mod_params())
            .ok_or(Error::ModularInverseUndefined)?;

        Ok(DecryptionKey {
            encryption_key,
            lambda,
            mu,
        })
    }

    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.encryption_key
    }

    pub fn lambda(&self) -> &LargeBiPrimeSizedNumber {
        &self.lambda
    }

    /// Decrypts `ciphertext`: $ m = L(c^\lambda \mod N^2) \cdot \mu \mod N $.
    ///
    /// Returns [`Error::InvalidCiphertext`] if `ciphertext` is outside $ [1, N^2) $ or is not an
    /// element of the ciphertext group (i.e. $ c^\lambda \not\equiv 1 \mod N $).
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<LargeBiPrimeSizedNumber> {
        self.encryption_key.check_ciphertext(ciphertext)?;

        let exponent_bits = self.encryption_key.n().bits_vartime();

        let c_to_the_lambda = self
            .encryption_key
            .mod_n2(&ciphertext.0)
            .pow_bounded_exp(&self.lambda, exponent_bits) // $ c^\lambda mod N^2 = 1 + m\lambda N $
            .as_natural_number();

        let l = self
            .encryption_key
            .l(&c_to_the_lambda) // $ L(1 + m\lambda N) = m\lambda mod N $
            .ok_or(Error::InvalidCiphertext)?;

        let n_mod_params = self.encryption_key.n_mod_params();

        Ok(
            (l.as_ring_element(n_mod_params) * self.mu.as_ring_element(n_mod_params))
                .as_natural_number(), // $ m\lambda \cdot \lambda^{-1} = m mod N $
        )
    }

    /// Decrypts every ciphertext of `ciphertexts`, in parallel with the `parallel` feature.
    pub fn decrypt_batch(
        &self,
        ciphertexts: &[Ciphertext],
    ) -> Result<Vec<LargeBiPrimeSizedNumber>> {
        #[cfg(not(feature = "parallel"))]
        let iter = ciphertexts.iter();
        #[cfg(feature = "parallel")]
        let iter = ciphertexts.par_iter();

        iter.map(|ciphertext| self.decrypt(ciphertext)).collect()
    }
}

impl Drop for DecryptionKey {
    fn drop(&mut self) {
        self.lambda.zeroize();
        self.mu.zeroize();
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("encryption_key", &self.encryption_key)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize)]
struct DecryptionKeyValue {
    n: LargeBiPrimeSizedNumber,
    lambda: LargeBiPrimeSizedNumber,
}

impl Serialize for DecryptionKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        DecryptionKeyValue {
            n: *self.encryption_key.n(),
            lambda: self.lambda,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DecryptionKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = DecryptionKeyValue::deserialize(deserializer)?;

        let decryption_key = EncryptionKey::new(value.n)
            .and_then(|encryption_key| DecryptionKey::new(encryption_key, value.lambda))
            .map_err(D::Error::custom);
        value.lambda.zeroize();

        decryption_key
    }
}
