//! Integer abstractions the fixed-point type is generic over.
//!
//! [`Storage`] is implemented for the primitive integers up to 32 bits, and
//! [`Accumulator`] only for the pairs where the wide type is strictly larger, has
//! the same signedness, and is at most 64 bits. An invalid pairing therefore never
//! type-checks.

use core::fmt::Debug;
use core::hash::Hash;

use num_traits::ops::bytes::{FromBytes, ToBytes};
use num_traits::{AsPrimitive, PrimInt, Signed, WrappingAdd, WrappingMul, WrappingNeg, WrappingSub};

mod sealed {
    pub trait Sealed {}
}

/// Integer type holding the raw bits of a fixed-point value.
pub trait Storage:
    PrimInt
    + WrappingAdd
    + WrappingSub
    + WrappingNeg
    + AsPrimitive<f32>
    + AsPrimitive<f64>
    + ToBytes
    + FromBytes
    + Hash
    + Default
    + Debug
    + sealed::Sealed
    + 'static
{
    /// Width in bits.
    const BITS: u32;

    /// Whether the integer is signed.
    const SIGNED: bool;

    /// Float to integer cast, truncating toward zero (saturates, NaN maps to 0).
    fn trunc_from_f32(value: f32) -> Self;

    /// Float to integer cast, truncating toward zero (saturates, NaN maps to 0).
    fn trunc_from_f64(value: f64) -> Self;
}

/// A signed [`Storage`]. Negation and `-1.0` are only available for these.
pub trait SignedStorage: Storage + Signed {}

impl<T: Storage + Signed> SignedStorage for T {}

/// Intermediate integer wide enough for the full product of two `S` values.
pub trait Accumulator<S: Storage>:
    PrimInt + WrappingMul + WrappingNeg + Hash + Debug + sealed::Sealed + 'static
{
    /// Sign- or zero-extends `raw` into the accumulator.
    fn widen(raw: S) -> Self;

    /// Keeps the low `S::BITS` bits.
    fn narrow(self) -> S;
}

macro_rules! storage_impl {
    ($($T:ty => $signed:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for $T {}

            impl Storage for $T {
                const BITS: u32 = <$T>::BITS;
                const SIGNED: bool = $signed;

                #[inline(always)]
                fn trunc_from_f32(value: f32) -> Self {
                    value as $T
                }

                #[inline(always)]
                fn trunc_from_f64(value: f64) -> Self {
                    value as $T
                }
            }
        )*
    };
}

macro_rules! accumulator_impl {
    ($S:ty => $($W:ty),+) => {
        $(
            impl Accumulator<$S> for $W {
                #[inline(always)]
                fn widen(raw: $S) -> Self {
                    raw as $W
                }

                #[inline(always)]
                fn narrow(self) -> $S {
                    self as $S
                }
            }
        )+
    };
}

storage_impl!(
    i8 => true,
    i16 => true,
    i32 => true,
    u8 => false,
    u16 => false,
    u32 => false,
);

impl sealed::Sealed for i64 {}
impl sealed::Sealed for u64 {}

accumulator_impl!(i8 => i16, i32, i64);
accumulator_impl!(i16 => i32, i64);
accumulator_impl!(i32 => i64);
accumulator_impl!(u8 => u16, u32, u64);
accumulator_impl!(u16 => u32, u64);
accumulator_impl!(u32 => u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_widths() {
        assert_eq!(<i8 as Storage>::BITS, 8);
        assert_eq!(<u16 as Storage>::BITS, 16);
        assert_eq!(<i32 as Storage>::BITS, 32);
        assert!(<i16 as Storage>::SIGNED);
        assert!(!<u32 as Storage>::SIGNED);
    }

    #[test]
    fn test_widen_sign_extends() {
        assert_eq!(<i64 as Accumulator<i32>>::widen(-1), -1i64);
        assert_eq!(<i32 as Accumulator<i8>>::widen(i8::MIN), -128i32);
        assert_eq!(<u64 as Accumulator<u32>>::widen(u32::MAX), 0xFFFF_FFFFu64);
    }

    #[test]
    fn test_narrow_keeps_low_bits() {
        assert_eq!(<i64 as Accumulator<i32>>::narrow(0x1_0000_0001), 1i32);
        assert_eq!(<i32 as Accumulator<i16>>::narrow(0x8000), i16::MIN);
        assert_eq!(<u16 as Accumulator<u8>>::narrow(0x1FF), 0xFFu8);
    }

    #[test]
    fn test_float_cast_truncates_toward_zero() {
        assert_eq!(i32::trunc_from_f64(2.9), 2);
        assert_eq!(i32::trunc_from_f64(-2.9), -2);
        assert_eq!(u16::trunc_from_f32(7.99), 7);
    }

    #[test]
    fn test_float_cast_saturates() {
        assert_eq!(i16::trunc_from_f64(1e9), i16::MAX);
        assert_eq!(i16::trunc_from_f64(-1e9), i16::MIN);
        assert_eq!(u32::trunc_from_f64(-5.0), 0);
        assert_eq!(i32::trunc_from_f64(f64::NAN), 0);
    }
}
