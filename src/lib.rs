// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

//! The Paillier cryptosystem: key generation, probabilistic encryption, decryption and the
//! additive homomorphism of its ciphertext space.
//!
//! Every operation that samples randomness takes a caller-supplied cryptographically secure
//! generator; there is no ambient key material or default generator.

use crypto_bigint::modular::runtime_mod::{DynResidue, DynResidueParams};
use crypto_bigint::{Concat, Uint, U1024};

pub use ciphertext::Ciphertext;
pub use decryption_key::DecryptionKey;
pub use encryption_key::EncryptionKey;
pub use error::{Error, Result, SanityCheckError};
pub use key_generation::generate_keypair;
pub use primes::find_coprime_blinding_factor;

mod arithmetic;
mod ciphertext;
mod decryption_key;
pub mod encoding;
mod encryption_key;
mod error;
mod key_generation;
mod primes;

#[cfg(any(test, feature = "test_exports"))]
pub mod test_exports;

/* Types & Trait (impls) around `crypto_bigint` for internal use */

pub type LargePrimeSizedNumber = U1024;
pub type LargeBiPrimeSizedNumber = <LargePrimeSizedNumber as Concat>::Output;
pub type PaillierModulusSizedNumber = <LargeBiPrimeSizedNumber as Concat>::Output;

pub(crate) type PlaintextRingElement = DynResidue<{ LargeBiPrimeSizedNumber::LIMBS }>;
pub(crate) type PaillierRingElement = DynResidue<{ PaillierModulusSizedNumber::LIMBS }>;

/// The prime size used when the caller has no reason to pick another one.
pub const DEFAULT_PRIME_BIT_LENGTH: usize = 256;
/// The smallest supported prime size.
pub const MIN_PRIME_BIT_LENGTH: usize = 16;
/// The largest supported prime size, bounded by the width of [`LargePrimeSizedNumber`].
pub const MAX_PRIME_BIT_LENGTH: usize = LargePrimeSizedNumber::BITS;

/// Upper bound on fresh candidates drawn while searching for a single prime (or for `q != p`).
pub const MAX_PRIME_SEARCH_ATTEMPTS: usize = 1 << 10;
/// Upper bound on candidates drawn while searching for a blinding factor co-prime to `N`.
pub const MAX_BLINDING_FACTOR_ATTEMPTS: usize = 1 << 10;

pub(crate) trait AsNaturalNumber<const LIMBS: usize> {
    fn as_natural_number(&self) -> Uint<LIMBS>;
}

pub(crate) trait AsRingElement<const LIMBS: usize> {
    fn as_ring_element(&self, params: &DynResidueParams<LIMBS>) -> DynResidue<LIMBS>;
}

impl<const LIMBS: usize> AsNaturalNumber<LIMBS> for DynResidue<LIMBS> {
    fn as_natural_number(&self) -> Uint<LIMBS> {
        self.retrieve()
    }
}

impl<const LIMBS: usize> AsRingElement<LIMBS> for Uint<LIMBS> {
    fn as_ring_element(&self, params: &DynResidueParams<LIMBS>) -> DynResidue<LIMBS> {
        DynResidue::new(self, *params)
    }
}
