// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::{modular::runtime_mod::DynResidueParams, rand_core::CryptoRngCore, NonZero};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    arithmetic::{l_function, widen_bi_prime},
    primes::find_coprime_blinding_factor,
    AsNaturalNumber, AsRingElement, Ciphertext, Error, LargeBiPrimeSizedNumber,
    PaillierModulusSizedNumber, PaillierRingElement, Result, SanityCheckError,
    MIN_PRIME_BIT_LENGTH,
};

/// A Paillier encryption (public) key $ (N, N^2, g) $.
///
/// The generator is fixed to $ g = N + 1 $, which is a valid choice when the two prime factors of
/// $ N $ have the same bit length (guaranteed by [`crate::generate_keypair`]).
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct EncryptionKey {
    n: LargeBiPrimeSizedNumber,
    n2: PaillierModulusSizedNumber,
    g: LargeBiPrimeSizedNumber,
    n_mod_params: DynResidueParams<{ LargeBiPrimeSizedNumber::LIMBS }>,
    n2_mod_params: DynResidueParams<{ PaillierModulusSizedNumber::LIMBS }>,
}

impl EncryptionKey {
    /// Instantiates the encryption key of the Paillier modulus `n`.
    ///
    /// `n` must be odd and large enough to be the product of two primes of at least
    /// [`MIN_PRIME_BIT_LENGTH`] bits each.
    pub fn new(n: LargeBiPrimeSizedNumber) -> Result<EncryptionKey> {
        if !n.bit_vartime(0) || n.bits_vartime() < 2 * MIN_PRIME_BIT_LENGTH - 1 {
            return Err(SanityCheckError::InvalidParams().into());
        }

        let g = n.wrapping_add(&LargeBiPrimeSizedNumber::ONE);
        if g == LargeBiPrimeSizedNumber::ZERO {
            return Err(SanityCheckError::InvalidParams().into());
        }

        let n2: PaillierModulusSizedNumber = n.square();

        Ok(EncryptionKey {
            n,
            n2,
            g,
            n_mod_params: DynResidueParams::new(&n),
            n2_mod_params: DynResidueParams::new(&n2),
        })
    }

    /// The Paillier modulus $ N = PQ $.
    pub fn n(&self) -> &LargeBiPrimeSizedNumber {
        &self.n
    }

    /// $ N^2 $, the modulus of the ciphertext space.
    pub fn n_squared(&self) -> &PaillierModulusSizedNumber {
        &self.n2
    }

    /// The generator $ g = N + 1 $.
    pub fn g(&self) -> &LargeBiPrimeSizedNumber {
        &self.g
    }

    /// The bit length of each of the two prime factors of $ N $.
    pub fn prime_bit_length(&self) -> usize {
        (self.n.bits_vartime() + 1) / 2
    }

    /// Encrypts `plaintext` under a fresh blinding factor sampled from `rng`.
    ///
    /// Returns [`Error::InvalidPlaintext`] unless $ 0 \le m < N $; use
    /// [`EncryptionKey::encrypt_reduced`] to opt into reduction modulo $ N $ instead.
    pub fn encrypt(
        &self,
        plaintext: &LargeBiPrimeSizedNumber,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Ciphertext> {
        if plaintext >= &self.n {
            return Err(Error::InvalidPlaintext);
        }

        let randomness = find_coprime_blinding_factor(self.prime_bit_length(), &self.n, rng)?;

        Ok(self.encrypt_with_randomness(plaintext, &randomness))
    }

    /// Encrypts $ m \mod N $.
    ///
    /// This changes the represented value whenever $ m \ge N $, which is logged as a warning.
    pub fn encrypt_reduced(
        &self,
        plaintext: &LargeBiPrimeSizedNumber,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Ciphertext> {
        let reduced = *plaintext % self.n_nonzero()?;

        if &reduced != plaintext {
            tracing::warn!("plaintext exceeds the modulus, reduced it modulo N before encryption");
        }

        self.encrypt(&reduced, rng)
    }

    /// Encrypts every plaintext of `plaintexts`, each under its own blinding factor.
    ///
    /// Blinding factors are sampled sequentially from `rng`; the exponentiations run in
    /// parallel with the `parallel` feature.
    pub fn encrypt_batch(
        &self,
        plaintexts: &[LargeBiPrimeSizedNumber],
        rng: &mut impl CryptoRngCore,
    ) -> Result<Vec<Ciphertext>> {
        if plaintexts.iter().any(|plaintext| plaintext >= &self.n) {
            return Err(Error::InvalidPlaintext);
        }

        let bit_length = self.prime_bit_length();
        let randomizers = plaintexts
            .iter()
            .map(|_| find_coprime_blinding_factor(bit_length, &self.n, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let iter = plaintexts.iter().zip(randomizers.iter());
        #[cfg(feature = "parallel")]
        let iter = plaintexts.par_iter().zip(randomizers.par_iter());

        Ok(iter
            .map(|(plaintext, randomness)| self.encrypt_with_randomness(plaintext, randomness))
            .collect())
    }

    /// $ c = g^m \cdot r^N \mod N^2 $.
    pub(crate) fn encrypt_with_randomness(
        &self,
        plaintext: &LargeBiPrimeSizedNumber,
        randomness: &LargeBiPrimeSizedNumber,
    ) -> Ciphertext {
        let exponent_bits = self.n.bits_vartime();
        let g = self.mod_n2(&widen_bi_prime(&self.g));
        let r = self.mod_n2(&widen_bi_prime(randomness));

        Ciphertext(
            (
                g.pow_bounded_exp(plaintext, exponent_bits) // $ g^m $
                * r.pow_bounded_exp(&self.n, exponent_bits)
                // $ * r^N mod N^2 $
            )
            .as_natural_number(),
        )
    }

    /// Homomorphic addition: $ E(m_1) \cdot E(m_2) \mod N^2 = E(m_1 + m_2 \mod N) $.
    pub fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Result<Ciphertext> {
        self.check_ciphertext(lhs)?;
        self.check_ciphertext(rhs)?;

        Ok(Ciphertext(
            (self.mod_n2(&lhs.0) * self.mod_n2(&rhs.0)).as_natural_number(),
        ))
    }

    /// Homomorphic multiplication by a plaintext scalar: $ E(m)^k \mod N^2 = E(k \cdot m \mod N) $.
    pub fn scalar_mul(
        &self,
        ciphertext: &Ciphertext,
        scalar: &LargeBiPrimeSizedNumber,
    ) -> Result<Ciphertext> {
        self.check_ciphertext(ciphertext)?;

        Ok(Ciphertext(
            self.mod_n2(&ciphertext.0).pow(scalar).as_natural_number(),
        ))
    }

    /// Checks that `ciphertext` lies in $ [1, N^2) $.
    pub(crate) fn check_ciphertext(&self, ciphertext: &Ciphertext) -> Result<()> {
        if ciphertext.0 == PaillierModulusSizedNumber::ZERO || ciphertext.0 >= self.n2 {
            return Err(Error::InvalidCiphertext);
        }

        Ok(())
    }

    /// $ L(x) = (x - 1) / N $, defined only for $ x \equiv 1 \mod N $.
    pub(crate) fn l(&self, x: &PaillierModulusSizedNumber) -> Option<LargeBiPrimeSizedNumber> {
        let n: NonZero<PaillierModulusSizedNumber> =
            Option::from(NonZero::new(widen_bi_prime(&self.n)))?;

        l_function(x, &n)
    }

    pub(crate) fn mod_n2(&self, x: &PaillierModulusSizedNumber) -> PaillierRingElement {
        x.as_ring_element(&self.n2_mod_params)
    }

    pub(crate) fn n_mod_params(&self) -> &DynResidueParams<{ LargeBiPrimeSizedNumber::LIMBS }> {
        &self.n_mod_params
    }

    fn n_nonzero(&self) -> Result<NonZero<LargeBiPrimeSizedNumber>> {
        Option::from(NonZero::new(self.n)).ok_or(Error::InternalError)
    }
}

impl Serialize for EncryptionKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.n.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EncryptionKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = LargeBiPrimeSizedNumber::deserialize(deserializer)?;

        EncryptionKey::new(n).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rand_core::OsRng;
    use rstest::rstest;

    use super::*;
    use crate::tests::{from_hex, keypair, n, CIPHERTEXT, PLAINTEXT, RANDOMNESS};

    #[test]
    fn encrypts() {
        let encryption_key = EncryptionKey::new(n()).unwrap();

        assert_eq!(
            encryption_key.encrypt_with_randomness(
                &LargeBiPrimeSizedNumber::from(PLAINTEXT),
                &from_hex(RANDOMNESS)
            ),
            Ciphertext(from_hex(CIPHERTEXT))
        );
    }

    #[test]
    fn derives_public_values_from_the_modulus() {
        let encryption_key = EncryptionKey::new(n()).unwrap();

        assert_eq!(encryption_key.n_squared(), &n().square());
        assert_eq!(
            encryption_key.g(),
            &n().wrapping_add(&LargeBiPrimeSizedNumber::ONE)
        );
        assert_eq!(encryption_key.prime_bit_length(), 256);
    }

    #[rstest]
    #[case::even(LargeBiPrimeSizedNumber::from(1u64 << 40))]
    #[case::too_small(LargeBiPrimeSizedNumber::from(15u8))]
    #[case::zero(LargeBiPrimeSizedNumber::ZERO)]
    #[case::max(LargeBiPrimeSizedNumber::MAX)]
    fn rejects_invalid_moduli(#[case] n: LargeBiPrimeSizedNumber) {
        assert_eq!(
            EncryptionKey::new(n),
            Err(Error::SanityCheckError(SanityCheckError::InvalidParams()))
        );
    }

    #[test]
    fn ciphertexts_lie_in_the_ciphertext_space() {
        let (encryption_key, _) = keypair();

        let ciphertext = encryption_key
            .encrypt(&LargeBiPrimeSizedNumber::from(PLAINTEXT), &mut OsRng)
            .unwrap();

        assert!(encryption_key.check_ciphertext(&ciphertext).is_ok());
    }

    #[test]
    fn encryption_is_probabilistic() {
        let (encryption_key, _) = keypair();
        let plaintext = LargeBiPrimeSizedNumber::from(PLAINTEXT);

        let ciphertexts: Vec<Ciphertext> = (0..4)
            .map(|_| encryption_key.encrypt(&plaintext, &mut OsRng).unwrap())
            .collect();

        for (i, lhs) in ciphertexts.iter().enumerate() {
            for rhs in &ciphertexts[i + 1..] {
                assert_ne!(lhs, rhs);
            }
        }
    }

    #[rstest]
    #[case::n(n())]
    #[case::above_n(n().wrapping_add(&LargeBiPrimeSizedNumber::from(2u8)))]
    #[case::max(LargeBiPrimeSizedNumber::MAX)]
    fn rejects_plaintexts_outside_the_plaintext_space(#[case] plaintext: LargeBiPrimeSizedNumber) {
        let (encryption_key, _) = keypair();

        assert_eq!(
            encryption_key.encrypt(&plaintext, &mut OsRng),
            Err(Error::InvalidPlaintext)
        );
        assert_eq!(
            encryption_key.encrypt_batch(&[LargeBiPrimeSizedNumber::ONE, plaintext], &mut OsRng),
            Err(Error::InvalidPlaintext)
        );
    }

    #[test]
    fn encrypt_reduced_encrypts_the_residue() {
        let (encryption_key, decryption_key) = keypair();
        let plaintext = n().wrapping_add(&LargeBiPrimeSizedNumber::from(PLAINTEXT));

        let ciphertext = encryption_key
            .encrypt_reduced(&plaintext, &mut OsRng)
            .unwrap();

        assert_eq!(
            decryption_key.decrypt(&ciphertext),
            Ok(LargeBiPrimeSizedNumber::from(PLAINTEXT))
        );
    }

    #[test]
    fn adds_homomorphically() {
        let (encryption_key, decryption_key) = keypair();
        let c1 = encryption_key
            .encrypt(&LargeBiPrimeSizedNumber::from(1981u16), &mut OsRng)
            .unwrap();
        let c2 = encryption_key
            .encrypt(&LargeBiPrimeSizedNumber::from(1983u16), &mut OsRng)
            .unwrap();

        let sum = encryption_key.add(&c1, &c2).unwrap();

        assert_eq!(
            decryption_key.decrypt(&sum),
            Ok(LargeBiPrimeSizedNumber::from(3964u16))
        );
    }

    #[test]
    fn addition_wraps_around_the_modulus() {
        let (encryption_key, decryption_key) = keypair();
        let n_minus_one = n().wrapping_sub(&LargeBiPrimeSizedNumber::ONE);
        let c1 = encryption_key.encrypt(&n_minus_one, &mut OsRng).unwrap();
        let c2 = encryption_key
            .encrypt(&LargeBiPrimeSizedNumber::from(3u8), &mut OsRng)
            .unwrap();

        let sum = encryption_key.add(&c1, &c2).unwrap();

        assert_eq!(
            decryption_key.decrypt(&sum),
            Ok(LargeBiPrimeSizedNumber::from(2u8))
        );
    }

    #[test]
    fn multiplies_by_scalar_homomorphically() {
        let (encryption_key, decryption_key) = keypair();
        let ciphertext = Ciphertext(from_hex(CIPHERTEXT));

        let product = encryption_key
            .scalar_mul(&ciphertext, &LargeBiPrimeSizedNumber::from(3u8))
            .unwrap();

        assert_eq!(
            decryption_key.decrypt(&product),
            Ok(LargeBiPrimeSizedNumber::from(3 * PLAINTEXT))
        );
    }

    #[test]
    fn homomorphic_operations_reject_ciphertexts_outside_the_ciphertext_space() {
        let (encryption_key, _) = keypair();
        let valid = Ciphertext(from_hex(CIPHERTEXT));
        let zero = Ciphertext(PaillierModulusSizedNumber::ZERO);
        let n2 = Ciphertext(*encryption_key.n_squared());

        assert_eq!(encryption_key.add(&valid, &zero), Err(Error::InvalidCiphertext));
        assert_eq!(encryption_key.add(&n2, &valid), Err(Error::InvalidCiphertext));
        assert_eq!(
            encryption_key.scalar_mul(&n2, &LargeBiPrimeSizedNumber::ONE),
            Err(Error::InvalidCiphertext)
        );
    }

    #[test]
    fn encrypts_batches() {
        let (encryption_key, decryption_key) = keypair();
        let plaintexts: Vec<LargeBiPrimeSizedNumber> =
            (0u16..5).map(LargeBiPrimeSizedNumber::from).collect();

        let ciphertexts = encryption_key
            .encrypt_batch(&plaintexts, &mut OsRng)
            .unwrap();

        assert_eq!(ciphertexts.len(), plaintexts.len());
        assert_eq!(decryption_key.decrypt_batch(&ciphertexts), Ok(plaintexts));
    }

    #[test]
    fn serializes_as_the_modulus() {
        let encryption_key = EncryptionKey::new(n()).unwrap();

        let serialized = serde_json::to_string(&encryption_key).unwrap();

        assert_eq!(serialized, serde_json::to_string(&n()).unwrap());
        assert_eq!(
            serde_json::from_str::<EncryptionKey>(&serialized).unwrap(),
            encryption_key
        );
    }

    #[test]
    fn deserialization_validates_the_modulus() {
        let even = serde_json::to_string(&LargeBiPrimeSizedNumber::from(1u64 << 40)).unwrap();

        assert!(serde_json::from_str::<EncryptionKey>(&even).is_err());
    }
}
