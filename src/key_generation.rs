// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::{rand_core::CryptoRngCore, Concat};
use zeroize::Zeroize;

use crate::{
    arithmetic::lcm,
    primes::{check_bit_length, generate_prime},
    DecryptionKey, EncryptionKey, Error, LargePrimeSizedNumber, Result,
    MAX_PRIME_SEARCH_ATTEMPTS,
};

/// Generates a Paillier key pair from two independent random primes $ P \ne Q $ of exactly
/// `bit_length` bits each.
///
/// Both primes having the same bit length is the precondition for the generator $ g = N + 1 $.
/// The primes are zeroized before returning; only $ N $ and $ \lambda $ survive.
pub fn generate_keypair(
    bit_length: usize,
    rng: &mut impl CryptoRngCore,
) -> Result<(EncryptionKey, DecryptionKey)> {
    check_bit_length(bit_length)?;

    let mut p = generate_prime(bit_length, rng)?;
    let mut q = generate_prime(bit_length, rng)?;

    let mut attempt = 1;
    while q == p {
        if attempt == MAX_PRIME_SEARCH_ATTEMPTS {
            p.zeroize();
            q.zeroize();

            return Err(Error::KeyGenerationFailed);
        }

        tracing::debug!(bit_length, "sampled P = Q, redrawing Q");
        q = generate_prime(bit_length, rng)?;
        attempt += 1;
    }

    let keypair = keypair_from_primes(&p, &q);
    p.zeroize();
    q.zeroize();

    if keypair.is_ok() {
        tracing::debug!(bit_length, "generated a Paillier key pair");
    }

    keypair
}

/// $ N = PQ $, $ \lambda = lcm(P - 1, Q - 1) $.
pub(crate) fn keypair_from_primes(
    p: &LargePrimeSizedNumber,
    q: &LargePrimeSizedNumber,
) -> Result<(EncryptionKey, DecryptionKey)> {
    let (lo, hi) = p.mul_wide(q);
    let encryption_key = EncryptionKey::new(hi.concat(&lo))?;

    let mut p_minus_one = p.wrapping_sub(&LargePrimeSizedNumber::ONE);
    let mut q_minus_one = q.wrapping_sub(&LargePrimeSizedNumber::ONE);
    let lambda = lcm(&p_minus_one, &q_minus_one);
    p_minus_one.zeroize();
    q_minus_one.zeroize();

    let decryption_key = DecryptionKey::new(
        encryption_key.clone(),
        lambda.ok_or(Error::KeyGenerationFailed)?,
    )?;

    Ok((encryption_key, decryption_key))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rand_core::{CryptoRng, OsRng, RngCore};
    use rstest::rstest;

    use super::*;
    use crate::{
        arithmetic::gcd,
        tests::{from_hex, lambda, n, P, Q},
        LargeBiPrimeSizedNumber, SanityCheckError, DEFAULT_PRIME_BIT_LENGTH,
        MAX_PRIME_BIT_LENGTH, MIN_PRIME_BIT_LENGTH,
    };

    /// A generator stuck at zero, so every prime search lands on the same prime.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    #[test]
    fn derives_keys_from_primes() {
        let (encryption_key, decryption_key) =
            keypair_from_primes(&from_hex(P), &from_hex(Q)).unwrap();

        assert_eq!(encryption_key.n(), &n());
        assert_eq!(decryption_key.lambda(), &lambda());
        assert_eq!(decryption_key.encryption_key(), &encryption_key);
    }

    #[rstest]
    #[case(MIN_PRIME_BIT_LENGTH)]
    #[case(64)]
    #[case(DEFAULT_PRIME_BIT_LENGTH)]
    fn generates_keypairs(#[case] bit_length: usize) {
        let (encryption_key, decryption_key) = generate_keypair(bit_length, &mut OsRng).unwrap();

        let n_bits = encryption_key.n().bits_vartime();
        assert!(n_bits == 2 * bit_length || n_bits == 2 * bit_length - 1);
        assert_eq!(encryption_key.prime_bit_length(), bit_length);
        assert_eq!(decryption_key.encryption_key(), &encryption_key);
        assert!(decryption_key.lambda() < encryption_key.n());
        assert_eq!(
            gcd(decryption_key.lambda(), encryption_key.n()),
            LargeBiPrimeSizedNumber::ONE
        );
    }

    #[test]
    fn key_generation_is_randomized() {
        let (first, _) = generate_keypair(DEFAULT_PRIME_BIT_LENGTH, &mut OsRng).unwrap();
        let (second, _) = generate_keypair(DEFAULT_PRIME_BIT_LENGTH, &mut OsRng).unwrap();

        assert_ne!(first.n(), second.n());
    }

    #[test]
    fn key_generation_is_reproducible_from_a_seed() {
        let (first, _) = generate_keypair(64, &mut StdRng::seed_from_u64(1981)).unwrap();
        let (second, _) = generate_keypair(64, &mut StdRng::seed_from_u64(1981)).unwrap();

        assert_eq!(first, second);
    }

    #[rstest]
    #[case(0)]
    #[case(MIN_PRIME_BIT_LENGTH - 1)]
    #[case(MAX_PRIME_BIT_LENGTH + 1)]
    fn rejects_unsupported_bit_lengths(#[case] bit_length: usize) {
        assert_eq!(
            generate_keypair(bit_length, &mut OsRng),
            Err(Error::SanityCheckError(SanityCheckError::InvalidParams()))
        );
    }

    #[test]
    fn gives_up_when_q_keeps_equalling_p() {
        assert_eq!(
            generate_keypair(MIN_PRIME_BIT_LENGTH, &mut ZeroRng),
            Err(Error::KeyGenerationFailed)
        );
    }

    #[test]
    fn roundtrips_with_generated_keys() {
        let (encryption_key, decryption_key) =
            generate_keypair(DEFAULT_PRIME_BIT_LENGTH, &mut OsRng).unwrap();
        let plaintext = LargeBiPrimeSizedNumber::from(1981u16);

        let ciphertext = encryption_key.encrypt(&plaintext, &mut OsRng).unwrap();

        assert_eq!(decryption_key.decrypt(&ciphertext), Ok(plaintext));
    }
}
