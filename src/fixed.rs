use core::fmt;
use core::iter::{Product, Sum};
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use num_traits::{AsPrimitive, PrimInt};
use num_traits::ops::bytes::{FromBytes, ToBytes};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::FixedPointError;
use crate::storage::{Accumulator, SignedStorage, Storage};

/// Binary fixed-point number stored in `S`, with `INT_BITS` integer bits and
/// `S::BITS - INT_BITS` fractional bits.
///
/// The real value is `raw / 2^FRAC_BITS`. Multiplication and division run in the
/// accumulator `W` and are narrowed back to `S` afterwards.
///
/// Add, subtract and negate wrap at the storage width. Division by a zero value
/// panics the same way integer division does. Nothing else is checked at runtime.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FixedPoint<S, W, const INT_BITS: u32> {
    value: S,
    _accumulator: PhantomData<W>,
}

// ============================================================================
// Layout
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// Whether the storage integer is signed.
    pub const IS_SIGNED: bool = S::SIGNED;

    /// Total width of the storage in bits.
    pub const NUM_BITS: u32 = S::BITS;

    /// Bits above the binary point (including the sign bit for signed storage).
    pub const INTEGER_BITS: u32 = INT_BITS;

    /// Bits below the binary point.
    pub const FRAC_BITS: u32 = {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_LAYOUT;
        S::BITS - INT_BITS
    };

    // Evaluated wherever `FRAC_BITS` or `from_bits` is used.
    const VALID_LAYOUT: () = assert!(
        INT_BITS < S::BITS,
        "INT_BITS must leave at least one fractional bit"
    );

    /// `2^FRAC_BITS` narrowed to the storage, the raw value of `1.0`.
    ///
    /// Layouts without room for `1.0` (`INT_BITS = 1` signed, `INT_BITS = 0`)
    /// get the wrapped bit pattern, e.g. `i16::MIN` for Q1.15.
    #[inline(always)]
    pub fn scale_factor() -> S {
        Self::wide_scale().narrow()
    }

    /// Mask selecting the fractional bits.
    #[inline(always)]
    pub fn frac_mask() -> S {
        (Self::wide_scale() - W::one()).narrow()
    }

    /// Mask selecting the integer bits.
    #[inline(always)]
    pub fn int_mask() -> S {
        !Self::frac_mask()
    }

    #[inline(always)]
    fn wide_scale() -> W {
        W::one() << Self::FRAC_BITS as usize
    }

    #[inline(always)]
    fn scale_f32() -> f32 {
        (1u64 << Self::FRAC_BITS) as f32
    }

    #[inline(always)]
    fn scale_f64() -> f64 {
        (1u64 << Self::FRAC_BITS) as f64
    }
}

// ============================================================================
// Constructors and Raw Access
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> Default for FixedPoint<S, W, INT_BITS> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// Creates a value from its raw bit pattern, bypassing scaling.
    #[inline(always)]
    pub fn from_bits(raw: S) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_LAYOUT;
        Self {
            value: raw,
            _accumulator: PhantomData,
        }
    }

    /// Returns the raw bit pattern (the value scaled by `2^FRAC_BITS`).
    #[inline(always)]
    pub fn to_bits(self) -> S {
        self.value
    }

    /// Zero, same as `Default`.
    #[inline(always)]
    pub fn new() -> Self {
        Self::zero()
    }

    /// Creates a value from an integer.
    ///
    /// The shift happens in the accumulator, then the result is narrowed to the
    /// storage width. Integers that do not fit in `INT_BITS` lose their high bits.
    #[inline(always)]
    pub fn from_int<T: PrimInt + AsPrimitive<W>>(value: T) -> Self {
        let wide: W = value.as_();
        Self::from_bits((wide << Self::FRAC_BITS as usize).narrow())
    }

    /// Creates a value from an `f32`, truncating toward zero.
    ///
    /// Out-of-range input saturates at the storage bounds and NaN becomes zero.
    #[inline(always)]
    pub fn from_f32(value: f32) -> Self {
        Self::from_bits(S::trunc_from_f32(value * Self::scale_f32()))
    }

    /// Creates a value from an `f64`, truncating toward zero.
    ///
    /// Out-of-range input saturates at the storage bounds and NaN becomes zero.
    #[inline(always)]
    pub fn from_f64(value: f64) -> Self {
        Self::from_bits(S::trunc_from_f64(value * Self::scale_f64()))
    }
}

// ============================================================================
// Constants
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// 0.0
    #[inline(always)]
    pub fn zero() -> Self {
        Self::from_bits(S::zero())
    }

    /// 0.5
    #[inline(always)]
    pub fn half() -> Self {
        Self::from_bits(S::one() << (Self::FRAC_BITS - 1) as usize)
    }

    /// 1.0
    #[inline(always)]
    pub fn pos_one() -> Self {
        Self::from_bits(Self::scale_factor())
    }

    #[inline(always)]
    fn neg_one_bits() -> S {
        S::zero().wrapping_sub(&Self::scale_factor())
    }
}

impl<S: SignedStorage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// -1.0, only defined for signed storage.
    #[inline(always)]
    pub fn neg_one() -> Self {
        Self::from_bits(Self::neg_one_bits())
    }
}

// ============================================================================
// Float Conversions
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// Converts to f32.
    ///
    /// Note: wide storage may lose precision in the f32 mantissa.
    #[inline(always)]
    pub fn to_f32(self) -> f32 {
        <S as AsPrimitive<f32>>::as_(self.value) / Self::scale_f32()
    }

    /// Converts to f64. Exact for every supported storage width.
    #[inline(always)]
    pub fn to_f64(self) -> f64 {
        <S as AsPrimitive<f64>>::as_(self.value) / Self::scale_f64()
    }

    /// Creates a value from an f64, returning an error instead of saturating.
    ///
    /// The fractional remainder below one quantum is still truncated.
    pub fn try_from_f64(value: f64) -> crate::Result<Self> {
        if !value.is_finite() {
            return Err(FixedPointError::InvalidFormat);
        }

        let scaled = value * Self::scale_f64();
        let max = <S as AsPrimitive<f64>>::as_(S::max_value());
        let min = <S as AsPrimitive<f64>>::as_(S::min_value());

        if scaled >= max + 1.0 {
            return Err(FixedPointError::Overflow);
        }
        if scaled <= min - 1.0 {
            return Err(FixedPointError::Underflow);
        }

        Ok(Self::from_bits(S::trunc_from_f64(scaled)))
    }

    /// Creates a value from an f32, returning an error instead of saturating.
    #[inline(always)]
    pub fn try_from_f32(value: f32) -> crate::Result<Self> {
        Self::try_from_f64(value as f64)
    }
}

// ============================================================================
// Sign Operations
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// Top bit of the raw value for signed storage, always `false` for unsigned.
    #[inline(always)]
    pub fn sign_bit(self) -> bool {
        S::SIGNED && self.value < S::zero()
    }

    /// `-1.0` if the sign bit is set, otherwise `1.0`.
    ///
    /// Zero counts as positive for signed storage. Unsigned storage returns `0.0`
    /// for zero and `1.0` for everything else.
    #[inline(always)]
    pub fn sign(self) -> Self {
        if S::SIGNED {
            if self.sign_bit() {
                Self::from_bits(Self::neg_one_bits())
            } else {
                Self::pos_one()
            }
        } else if self.value.is_zero() {
            Self::zero()
        } else {
            Self::pos_one()
        }
    }

    /// Absolute value. Identity for unsigned storage.
    ///
    /// The negation runs in the accumulator, so the most negative value comes back
    /// unchanged after narrowing.
    #[inline(always)]
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn abs(self) -> Self {
        if self.sign_bit() {
            Self::from_bits(W::widen(self.value).wrapping_neg().narrow())
        } else {
            self
        }
    }
}

// ============================================================================
// Integer and Fractional Parts
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// Integer part as a plain integer.
    ///
    /// Uses an arithmetic shift, so negative values round toward negative
    /// infinity: `-2.25` gives `-3`.
    #[inline(always)]
    pub fn int_part(self) -> S {
        (W::widen(self.value) >> Self::FRAC_BITS as usize).narrow()
    }

    /// Fractional part of the magnitude, always non-negative.
    ///
    /// This is the distance from the integer boundary toward zero: `-2.25` gives
    /// `0.25`. It does not pair with [`int_part`](Self::int_part) to rebuild a
    /// negative value.
    #[inline(always)]
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn frac_part(self) -> Self {
        Self::from_bits(self.abs().value & Self::frac_mask())
    }
}

// ============================================================================
// Binary Layout
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FixedPoint<S, W, INT_BITS> {
    /// Size in bytes, identical to the storage integer.
    pub const BYTES: usize = core::mem::size_of::<S>();

    #[inline(always)]
    pub fn to_le_bytes(self) -> <S as ToBytes>::Bytes {
        self.value.to_le_bytes()
    }

    #[inline(always)]
    pub fn to_be_bytes(self) -> <S as ToBytes>::Bytes {
        self.value.to_be_bytes()
    }

    #[inline(always)]
    pub fn from_le_bytes(bytes: &<S as FromBytes>::Bytes) -> Self {
        Self::from_bits(<S as FromBytes>::from_le_bytes(bytes))
    }

    #[inline(always)]
    pub fn from_be_bytes(bytes: &<S as FromBytes>::Bytes) -> Self {
        Self::from_bits(<S as FromBytes>::from_be_bytes(bytes))
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> Add for FixedPoint<S, W, INT_BITS> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.value.wrapping_add(&rhs.value))
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> Sub for FixedPoint<S, W, INT_BITS> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.value.wrapping_sub(&rhs.value))
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> Mul for FixedPoint<S, W, INT_BITS> {
    type Output = Self;

    /// `(a * b) >> FRAC_BITS` in the accumulator, arithmetic shift for signed.
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        let product = W::widen(self.value).wrapping_mul(&W::widen(rhs.value));
        Self::from_bits((product >> Self::FRAC_BITS as usize).narrow())
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> Div for FixedPoint<S, W, INT_BITS> {
    type Output = Self;

    /// `(a << FRAC_BITS) / b` in the accumulator, truncating toward zero.
    ///
    /// # Panics
    /// Panics if `rhs` is zero.
    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        let dividend = W::widen(self.value) << Self::FRAC_BITS as usize;
        let divisor = W::widen(rhs.value);
        Self::from_bits((dividend / divisor).narrow())
    }
}

impl<S: SignedStorage, W: Accumulator<S>, const INT_BITS: u32> Neg for FixedPoint<S, W, INT_BITS> {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self::from_bits(self.value.wrapping_neg())
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> AddAssign for FixedPoint<S, W, INT_BITS> {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> SubAssign for FixedPoint<S, W, INT_BITS> {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> MulAssign for FixedPoint<S, W, INT_BITS> {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> DivAssign for FixedPoint<S, W, INT_BITS> {
    #[inline(always)]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

// ============================================================================
// Standard Library Trait Implementations
// ============================================================================

macro_rules! from_int_impl {
    ($($T:ty),*) => {
        $(
            impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> From<$T>
                for FixedPoint<S, W, INT_BITS>
            where
                $T: AsPrimitive<W>,
            {
                #[inline(always)]
                fn from(value: $T) -> Self {
                    Self::from_int(value)
                }
            }
        )*
    };
}

from_int_impl!(i8, i16, i32, i64, u8, u16, u32, u64);

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> From<FixedPoint<S, W, INT_BITS>> for f64 {
    #[inline(always)]
    fn from(value: FixedPoint<S, W, INT_BITS>) -> Self {
        value.to_f64()
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> From<FixedPoint<S, W, INT_BITS>> for f32 {
    #[inline(always)]
    fn from(value: FixedPoint<S, W, INT_BITS>) -> Self {
        value.to_f32()
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> TryFrom<f64> for FixedPoint<S, W, INT_BITS> {
    type Error = FixedPointError;

    #[inline(always)]
    fn try_from(value: f64) -> crate::Result<Self> {
        Self::try_from_f64(value)
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> TryFrom<f32> for FixedPoint<S, W, INT_BITS> {
    type Error = FixedPointError;

    #[inline(always)]
    fn try_from(value: f32) -> crate::Result<Self> {
        Self::try_from_f32(value)
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> FromStr for FixedPoint<S, W, INT_BITS> {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| FixedPointError::InvalidFormat)?;
        Self::try_from_f64(value)
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> fmt::Display for FixedPoint<S, W, INT_BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f64(), f)
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> fmt::Debug for FixedPoint<S, W, INT_BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // {:#?} shows raw internals
            f.debug_struct("FixedPoint").field("value", &self.value).finish()
        } else {
            write!(f, "FixedPoint({})", self)
        }
    }
}

// ============================================================================
// Iterator Trait Implementations
// ============================================================================

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> Sum for FixedPoint<S, W, INT_BITS> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<'a, S: Storage, W: Accumulator<S>, const INT_BITS: u32> Sum<&'a FixedPoint<S, W, INT_BITS>>
    for FixedPoint<S, W, INT_BITS>
{
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + *x)
    }
}

impl<S: Storage, W: Accumulator<S>, const INT_BITS: u32> Product for FixedPoint<S, W, INT_BITS> {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::pos_one(), |acc, x| acc * x)
    }
}

impl<'a, S: Storage, W: Accumulator<S>, const INT_BITS: u32> Product<&'a FixedPoint<S, W, INT_BITS>>
    for FixedPoint<S, W, INT_BITS>
{
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::pos_one(), |acc, x| acc * *x)
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl<S, W, const INT_BITS: u32> Serialize for FixedPoint<S, W, INT_BITS>
where
    S: Storage + Serialize,
    W: Accumulator<S>,
{
    fn serialize<Ser>(&self, serializer: Ser) -> core::result::Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        if serializer.is_human_readable() {
            // JSON, TOML, etc. - f64 holds every supported storage exactly
            serializer.serialize_f64(self.to_f64())
        } else {
            // Bincode, MessagePack, etc. - raw storage bits
            self.value.serialize(serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, S, W, const INT_BITS: u32> Deserialize<'de> for FixedPoint<S, W, INT_BITS>
where
    S: Storage + Deserialize<'de>,
    W: Accumulator<S>,
{
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let value = f64::deserialize(deserializer)?;
            Self::try_from_f64(value).map_err(de::Error::custom)
        } else {
            let value = S::deserialize(deserializer)?;
            Ok(Self::from_bits(value))
        }
    }
}





#[cfg(test)]
mod byte_tests {
    use super::*;
    use crate::{Q16x16, UQ8x8};

    #[test]
    fn test_size_matches_storage() {
        assert_eq!(Q16x16::BYTES, 4);
        assert_eq!(core::mem::size_of::<Q16x16>(), 4);
        assert_eq!(core::mem::align_of::<Q16x16>(), core::mem::align_of::<i32>());
        assert_eq!(UQ8x8::BYTES, 2);
    }

    #[test]
    fn test_le_bytes() {
        let x = Q16x16::from_f64(1.5);
        assert_eq!(x.to_le_bytes(), 98_304i32.to_le_bytes());
        assert_eq!(Q16x16::from_le_bytes(&x.to_le_bytes()), x);
    }

    #[test]
    fn test_be_bytes() {
        let x = Q16x16::from_f64(-2.25);
        assert_eq!(x.to_be_bytes(), (-147_456i32).to_be_bytes());
        assert_eq!(Q16x16::from_be_bytes(&x.to_be_bytes()), x);
    }

    #[test]
    fn test_unsigned_bytes() {
        let x = UQ8x8::from_f64(1.5);
        assert_eq!(x.to_le_bytes(), [0x80, 0x01]);
        assert_eq!(x.to_be_bytes(), [0x01, 0x80]);
    }
}


#[cfg(test)]
mod iterator_tests {
    use super::*;
    use crate::Q16x16;

    #[test]
    fn test_sum() {
        let values = [
            Q16x16::from_f64(1.5),
            Q16x16::from_f64(2.25),
            Q16x16::from_f64(-0.75),
        ];
        assert_eq!(values.iter().sum::<Q16x16>(), Q16x16::from_int(3));
        assert_eq!(values.into_iter().sum::<Q16x16>(), Q16x16::from_int(3));
    }

    #[test]
    fn test_product() {
        let values = [
            Q16x16::from_int(2),
            Q16x16::from_f64(1.5),
            Q16x16::half(),
        ];
        assert_eq!(values.iter().product::<Q16x16>(), Q16x16::from_f64(1.5));
        assert_eq!(values.into_iter().product::<Q16x16>(), Q16x16::from_f64(1.5));
    }

    #[test]
    fn test_empty() {
        let empty: [Q16x16; 0] = [];
        assert_eq!(empty.iter().sum::<Q16x16>(), Q16x16::zero());
        assert_eq!(empty.iter().product::<Q16x16>(), Q16x16::pos_one());
    }
}
