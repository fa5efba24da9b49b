// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::{rand_core::CryptoRngCore, Random};
use crypto_primes::{hazmat::Sieve, is_prime_with_rng};

use crate::{
    arithmetic::{gcd, widen_prime},
    Error, LargeBiPrimeSizedNumber, LargePrimeSizedNumber, Result, SanityCheckError,
    MAX_BLINDING_FACTOR_ATTEMPTS, MAX_PRIME_BIT_LENGTH, MAX_PRIME_SEARCH_ATTEMPTS,
    MIN_PRIME_BIT_LENGTH,
};

pub(crate) fn check_bit_length(bit_length: usize) -> Result<()> {
    if (MIN_PRIME_BIT_LENGTH..=MAX_PRIME_BIT_LENGTH).contains(&bit_length) {
        Ok(())
    } else {
        Err(SanityCheckError::InvalidParams().into())
    }
}

/// Samples a uniformly random `bit_length`-bit number with its most significant bit set (so it has
/// exactly `bit_length` bits) and its least significant bit set (so it is odd).
///
/// Assumes `1 <= bit_length <= MAX_PRIME_BIT_LENGTH`.
pub(crate) fn random_odd_candidate(
    bit_length: usize,
    rng: &mut impl CryptoRngCore,
) -> LargePrimeSizedNumber {
    let candidate =
        LargePrimeSizedNumber::random(rng).shr_vartime(LargePrimeSizedNumber::BITS - bit_length);

    candidate
        | LargePrimeSizedNumber::ONE
        | LargePrimeSizedNumber::ONE.shl_vartime(bit_length - 1)
}

/// The first probable prime at or above `start` that still has at most `bit_length` bits.
///
/// Candidates are sieved by small primes before the (probabilistic) primality test.
/// Returns `None` if the search runs past `bit_length` bits.
pub(crate) fn next_probable_prime(
    start: &LargePrimeSizedNumber,
    bit_length: usize,
    rng: &mut impl CryptoRngCore,
) -> Option<LargePrimeSizedNumber> {
    Sieve::new(start, bit_length, false).find(|candidate| is_prime_with_rng(&mut *rng, candidate))
}

/// A random probable prime of exactly `bit_length` bits.
pub(crate) fn generate_prime(
    bit_length: usize,
    rng: &mut impl CryptoRngCore,
) -> Result<LargePrimeSizedNumber> {
    check_bit_length(bit_length)?;

    for attempt in 1..=MAX_PRIME_SEARCH_ATTEMPTS {
        let candidate = random_odd_candidate(bit_length, rng);

        if let Some(prime) = next_probable_prime(&candidate, bit_length, rng) {
            return Ok(prime);
        }

        tracing::trace!(attempt, bit_length, "prime search ran out of range, redrawing");
    }

    Err(Error::KeyGenerationFailed)
}

/// Finds a blinding factor $ r $ co-prime to `modulus`.
///
/// Each attempt samples a `bit_length`-bit odd candidate, advances it to the next probable prime
/// and accepts it if $ gcd(r, modulus) = 1 $. For a Paillier modulus built from two other primes
/// the first attempt succeeds with overwhelming probability; the loop is nonetheless bounded by
/// [`MAX_BLINDING_FACTOR_ATTEMPTS`].
pub fn find_coprime_blinding_factor(
    bit_length: usize,
    modulus: &LargeBiPrimeSizedNumber,
    rng: &mut impl CryptoRngCore,
) -> Result<LargeBiPrimeSizedNumber> {
    check_bit_length(bit_length)?;

    for attempt in 1..=MAX_BLINDING_FACTOR_ATTEMPTS {
        let candidate = random_odd_candidate(bit_length, rng);

        let Some(candidate) = next_probable_prime(&candidate, bit_length, rng) else {
            continue;
        };
        let candidate = widen_prime(&candidate);

        if gcd(&candidate, modulus) == LargeBiPrimeSizedNumber::ONE {
            return Ok(candidate);
        }

        tracing::trace!(attempt, "blinding factor candidate shares a factor with the modulus");
    }

    Err(Error::BlindingFactorSearchExhausted)
}
