// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use serde::{Deserialize, Serialize};
use subtle::{Choice, ConstantTimeEq};

use crypto_bigint::U4096;

use crate::PaillierModulusSizedNumber;

/// A Paillier ciphertext $ c \in \mathbb{Z}_{N^2}^* $.
///
/// A `Ciphertext` is not bound to a key; every operation that consumes one checks it lies in the
/// ciphertext space of the key at hand.
#[derive(PartialEq, Eq, Clone, Debug, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ciphertext(pub(crate) PaillierModulusSizedNumber);

impl Ciphertext {
    pub fn new(value: PaillierModulusSizedNumber) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &PaillierModulusSizedNumber {
        &self.0
    }
}

impl From<U4096> for Ciphertext {
    fn from(value: U4096) -> Self {
        Self(value)
    }
}

impl From<Ciphertext> for U4096 {
    fn from(value: Ciphertext) -> Self {
        value.0
    }
}

impl ConstantTimeEq for Ciphertext {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}
