//! Binary fixed-point numbers with a compile-time layout
//!
//! [`FixedPoint<S, W, INT_BITS>`](FixedPoint) stores a real number as an integer `S`
//! scaled by `2^FRAC_BITS`, where `FRAC_BITS = S::BITS - INT_BITS`. Multiplication
//! and division are carried out in the wider accumulator `W` and narrowed back.
//!
//! - **Storage**: `i8`, `i16`, `i32`, `u8`, `u16`, `u32`
//! - **Accumulator**: any strictly wider integer of the same signedness, up to 64 bits
//! - **Layout**: `#[repr(transparent)]`, exactly the size and alignment of `S`
//!
//! ## Features
//!
//! - **No floating-point hardware needed** for arithmetic; floats are only used
//!   when converting in or out
//! - **Zero overhead**: add, subtract and negate wrap like the storage integer,
//!   nothing is checked at runtime
//! - **Invalid layouts do not compile**: mismatched signedness, a narrow
//!   accumulator, or a missing fractional bit are rejected at compile time
//! - **no_std compatible**
//! - **Serde support** behind the `serde` feature
//!
//! ## Example
//!
//! ```rust
//! use fixpoint::{Q16x16, UQ14x18};
//!
//! let a = Q16x16::from_f64(2.5);
//! let b = Q16x16::from_f64(1.25);
//! assert_eq!((a * b).to_f64(), 3.125);
//! assert_eq!(Q16x16::from_f64(-2.25).int_part(), -3);
//! assert_eq!(Q16x16::from_f64(-2.25).frac_part().to_f64(), 0.25);
//!
//! // 12-bit ADC reading to volts
//! let volts = UQ14x18::from_int(3185) / UQ14x18::from_int(4095) * UQ14x18::from_f64(3.3);
//! assert!(volts.to_f64() > 2.5 && volts.to_f64() < 2.6);
//! ```
//!
//! ## Rejected layouts
//!
//! Negation is only defined for signed storage:
//!
//! ```compile_fail
//! use fixpoint::UQ16x16;
//! let x = -UQ16x16::pos_one();
//! ```
//!
//! ```compile_fail
//! use fixpoint::UQ16x16;
//! let x = UQ16x16::neg_one();
//! ```
//!
//! Storage and accumulator must share signedness:
//!
//! ```compile_fail
//! use fixpoint::FixedPoint;
//! let x = FixedPoint::<i32, u64, 16>::zero();
//! ```
//!
//! The accumulator must be strictly wider:
//!
//! ```compile_fail
//! use fixpoint::FixedPoint;
//! let x = FixedPoint::<i32, i32, 16>::zero();
//! ```
//!
//! Nothing wider than 64 bits is used as an accumulator:
//!
//! ```compile_fail
//! use fixpoint::FixedPoint;
//! let x = FixedPoint::<i64, i128, 32>::zero();
//! ```
//!
//! At least one fractional bit is required:
//!
//! ```compile_fail
//! use fixpoint::FixedPoint;
//! let x = FixedPoint::<i32, i64, 32>::zero();
//! ```
//!
//! The layout is checked by the masks too, not only by values:
//!
//! ```compile_fail
//! use fixpoint::FixedPoint;
//! let mask = FixedPoint::<u32, u64, 32>::frac_mask();
//! ```
//!
//! Purely fractional layouts such as Q1.15 compile; only `1.0` itself is out of
//! range there:
//!
//! ```rust
//! use fixpoint::Q1x15;
//! let half = Q1x15::from_f64(0.5);
//! assert_eq!(half * half, Q1x15::from_f64(0.25));
//! assert_eq!(Q1x15::from_int(-1).int_part(), -1);
//! ```
//!
//! `from_int` only takes integers; floats go through `from_f64`:
//!
//! ```compile_fail
//! use fixpoint::Q16x16;
//! let x = Q16x16::from_int(2.75f64);
//! ```

#![no_std]
#![cfg_attr(test, allow(unused_imports))]

#[cfg(test)]
extern crate std;

mod fixed;
pub mod storage;

pub use fixed::FixedPoint;
pub use storage::{Accumulator, SignedStorage, Storage};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("overflow: value too large to represent")]
    Overflow,

    #[error("underflow: value too small to represent")]
    Underflow,

    #[error("invalid format: not a finite number")]
    InvalidFormat,
}

pub type Result<T> = core::result::Result<T, FixedPointError>;

/// Signed Q4.4 in an `i8`.
pub type Q4x4 = FixedPoint<i8, i16, 4>;
/// Unsigned Q4.4 in a `u8`.
pub type UQ4x4 = FixedPoint<u8, u16, 4>;
/// Signed Q8.8 in an `i16`.
pub type Q8x8 = FixedPoint<i16, i32, 8>;
/// Unsigned Q8.8 in a `u16`.
pub type UQ8x8 = FixedPoint<u16, u32, 8>;
/// Signed Q1.15 in an `i16`, for values in `[-1, 1)`.
pub type Q1x15 = FixedPoint<i16, i32, 1>;
/// Signed Q2.14 in an `i16`, for values in `[-2, 2)`.
pub type Q2x14 = FixedPoint<i16, i32, 2>;
/// Signed Q16.16 in an `i32`.
pub type Q16x16 = FixedPoint<i32, i64, 16>;
/// Signed Q1.31 in an `i32`, for values in `[-1, 1)`.
pub type Q1x31 = FixedPoint<i32, i64, 1>;
/// Unsigned Q16.16 in a `u32`.
pub type UQ16x16 = FixedPoint<u32, u64, 16>;
/// Signed Q14.18 in an `i32`.
pub type Q14x18 = FixedPoint<i32, i64, 14>;
/// Unsigned Q14.18 in a `u32`.
pub type UQ14x18 = FixedPoint<u32, u64, 14>;
