// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use crypto_bigint::modular::runtime_mod::DynResidueParams;
use crypto_bigint::{Concat, NonZero, Split, Uint};

use crate::{
    AsNaturalNumber, AsRingElement, LargeBiPrimeSizedNumber, LargePrimeSizedNumber,
    PaillierModulusSizedNumber, PlaintextRingElement,
};

pub(crate) fn widen_prime(x: &LargePrimeSizedNumber) -> LargeBiPrimeSizedNumber {
    LargePrimeSizedNumber::ZERO.concat(x)
}

pub(crate) fn widen_bi_prime(x: &LargeBiPrimeSizedNumber) -> PaillierModulusSizedNumber {
    LargeBiPrimeSizedNumber::ZERO.concat(x)
}

/// Takes the lower half of `x`, or `None` if `x` does not fit in it.
pub(crate) fn narrow_to_bi_prime(
    x: &PaillierModulusSizedNumber,
) -> Option<LargeBiPrimeSizedNumber> {
    let (hi, lo) = x.split();

    (hi == LargeBiPrimeSizedNumber::ZERO).then_some(lo)
}

/// Euclid's algorithm. Variable time.
pub(crate) fn gcd<const LIMBS: usize>(a: &Uint<LIMBS>, b: &Uint<LIMBS>) -> Uint<LIMBS> {
    let (mut a, mut b) = (*a, *b);

    while let Some(divisor) = Option::<NonZero<Uint<LIMBS>>>::from(NonZero::new(b)) {
        (a, b) = (b, a % divisor);
    }

    a
}

/// $ lcm(a, b) = ab / gcd(a, b) $, or `None` if both are zero.
pub(crate) fn lcm(
    a: &LargePrimeSizedNumber,
    b: &LargePrimeSizedNumber,
) -> Option<LargeBiPrimeSizedNumber> {
    let divisor: NonZero<LargeBiPrimeSizedNumber> =
        Option::from(NonZero::new(widen_prime(&gcd(a, b))))?;

    let (lo, hi) = a.mul_wide(b);

    Some(hi.concat(&lo) / divisor)
}

/// $ L(x) = (x - 1) / N $.
///
/// Returns `None` unless `N` divides `x - 1` exactly, which holds for every $ x \equiv 1 \mod N $,
/// i.e. for $ c^\lambda $ of every element $ c $ of the ciphertext group.
pub(crate) fn l_function(
    x: &PaillierModulusSizedNumber,
    n: &NonZero<PaillierModulusSizedNumber>,
) -> Option<LargeBiPrimeSizedNumber> {
    if *x == PaillierModulusSizedNumber::ZERO {
        return None;
    }

    let x_minus_one = x.wrapping_sub(&PaillierModulusSizedNumber::ONE);

    if x_minus_one % *n != PaillierModulusSizedNumber::ZERO {
        return None;
    }

    narrow_to_bi_prime(&(x_minus_one / *n))
}

/// The inverse of `x` modulo the (odd) modulus of `params`, or `None` if it does not exist.
pub(crate) fn modular_inverse(
    x: &LargeBiPrimeSizedNumber,
    params: &DynResidueParams<{ LargeBiPrimeSizedNumber::LIMBS }>,
) -> Option<LargeBiPrimeSizedNumber> {
    let element = x.as_ring_element(params);
    let (inverse, _) = element.invert();

    // `invert()` yields garbage when no inverse exists, so check the result instead of trusting
    // the choice bit.
    (element * inverse == PlaintextRingElement::one(*params)).then(|| inverse.as_natural_number())
}
