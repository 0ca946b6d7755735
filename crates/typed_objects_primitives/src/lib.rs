#![no_std]

//! Alignment-safe scalar wrappers and the store conversions of typed views.
//!
//! Layout buffers are flat byte slices with alignment 1, so multi-byte scalars
//! are held as little-endian byte arrays. Every wrapper implements [`Scalar`],
//! which maps it to a [`ScalarKind`] and to the `f64` number model used by the
//! layout engine.

pub mod convert;
mod kind;

use bytemuck::Pod;
use bytemuck::Zeroable;
pub use kind::ScalarKind;

/// A scalar that can be stored in a layout buffer.
///
/// `from_number` applies the kind's store conversion (wrapping, clamping or
/// rounding); `to_number` is always exact.
pub trait Scalar: Pod {
	const KIND: ScalarKind;

	fn from_number(value: f64) -> Self;
	fn to_number(self) -> f64;
}

/// The standard `bool` is not a `Pod`, define a replacement that is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodBool(pub u8);

impl PodBool {
	pub const fn from_bool(b: bool) -> Self {
		Self(if b { 1 } else { 0 })
	}
}

impl From<bool> for PodBool {
	fn from(b: bool) -> Self {
		Self::from_bool(b)
	}
}

impl From<PodBool> for bool {
	fn from(b: PodBool) -> Self {
		b.0 != 0
	}
}

/// Byte that saturates instead of wrapping when stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodClampedU8(pub u8);

impl From<PodClampedU8> for u8 {
	fn from(pod: PodClampedU8) -> Self {
		pod.0
	}
}

/// Implements bidirectional conversion between a `Pod*` wrapper type and its
/// corresponding standard number.
///
/// For a given pair `($P, $I)`, this generates:
/// - `$P::from_primitive($I) -> $P` (const)
/// - `From<$I> for $P`
/// - `From<$P> for $I`
#[macro_export]
macro_rules! impl_number_conversion {
	($P:ty, $I:ty) => {
		impl $P {
			pub const fn from_primitive(n: $I) -> Self {
				Self(n.to_le_bytes())
			}
		}
		impl From<$I> for $P {
			fn from(n: $I) -> Self {
				Self::from_primitive(n)
			}
		}
		impl From<$P> for $I {
			fn from(pod: $P) -> Self {
				Self::from_le_bytes(pod.0)
			}
		}
	};
}

/// `u16` type that can be used in `Pod`s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodU16(pub [u8; 2]);
impl_number_conversion!(PodU16, u16);

/// `i16` type that can be used in `Pod`s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodI16(pub [u8; 2]);
impl_number_conversion!(PodI16, i16);

/// `u32` type that can be used in `Pod`s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodU32(pub [u8; 4]);
impl_number_conversion!(PodU32, u32);

/// `i32` type that can be used in `Pod`s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodI32(pub [u8; 4]);
impl_number_conversion!(PodI32, i32);

/// `f32` type that can be used in `Pod`s. Equality is bitwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodF32(pub [u8; 4]);
impl_number_conversion!(PodF32, f32);

/// `f64` type that can be used in `Pod`s. Equality is bitwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct PodF64(pub [u8; 8]);
impl_number_conversion!(PodF64, f64);

macro_rules! impl_scalar {
	($P:ty, $I:ty, $kind:ident, $convert:path) => {
		impl Scalar for $P {
			const KIND: ScalarKind = ScalarKind::$kind;

			fn from_number(value: f64) -> Self {
				Self::from_primitive($convert(value))
			}

			fn to_number(self) -> f64 {
				f64::from(<$I>::from(self))
			}
		}
	};
}

impl_scalar!(PodU16, u16, Uint16, convert::to_uint16);
impl_scalar!(PodI16, i16, Int16, convert::to_int16);
impl_scalar!(PodU32, u32, Uint32, convert::to_uint32);
impl_scalar!(PodI32, i32, Int32, convert::to_int32);
impl_scalar!(PodF32, f32, Float32, convert::to_float32);

impl Scalar for PodF64 {
	const KIND: ScalarKind = ScalarKind::Float64;

	fn from_number(value: f64) -> Self {
		Self::from_primitive(value)
	}

	fn to_number(self) -> f64 {
		f64::from(self)
	}
}

impl Scalar for u8 {
	const KIND: ScalarKind = ScalarKind::Uint8;

	fn from_number(value: f64) -> Self {
		convert::to_uint8(value)
	}

	fn to_number(self) -> f64 {
		f64::from(self)
	}
}

impl Scalar for i8 {
	const KIND: ScalarKind = ScalarKind::Int8;

	fn from_number(value: f64) -> Self {
		convert::to_int8(value)
	}

	fn to_number(self) -> f64 {
		f64::from(self)
	}
}

impl Scalar for PodBool {
	const KIND: ScalarKind = ScalarKind::BOOLEAN;

	fn from_number(value: f64) -> Self {
		Self(convert::to_uint8(value))
	}

	fn to_number(self) -> f64 {
		f64::from(self.0)
	}
}

impl Scalar for PodClampedU8 {
	const KIND: ScalarKind = ScalarKind::Uint8Clamped;

	fn from_number(value: f64) -> Self {
		Self(convert::to_uint8_clamp(value))
	}

	fn to_number(self) -> f64 {
		f64::from(self.0)
	}
}

#[cfg(test)]
extern crate std;
