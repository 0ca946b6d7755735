use crate::PodClampedU8;
use crate::PodF32;
use crate::PodF64;
use crate::PodI16;
use crate::PodI32;
use crate::PodU16;
use crate::PodU32;
use crate::Scalar;

/// The closed set of scalar view kinds a layout can be built from.
///
/// Adding a kind means extending this enum; array and string layouts only see
/// the byte width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScalarKind {
	Uint8,
	Uint8Clamped,
	Int8,
	Uint16,
	Int16,
	Uint32,
	Int32,
	Float32,
	Float64,
}

impl ScalarKind {
	/// Every kind, in registry order.
	pub const ALL: [Self; 9] = [
		Self::Uint8,
		Self::Uint8Clamped,
		Self::Int8,
		Self::Uint16,
		Self::Int16,
		Self::Uint32,
		Self::Int32,
		Self::Float32,
		Self::Float64,
	];
	/// Booleans are stored as plain bytes.
	pub const BOOLEAN: Self = Self::Uint8;

	pub const fn byte_length(self) -> usize {
		match self {
			Self::Uint8 | Self::Uint8Clamped | Self::Int8 => 1,
			Self::Uint16 | Self::Int16 => 2,
			Self::Uint32 | Self::Int32 | Self::Float32 => 4,
			Self::Float64 => 8,
		}
	}

	/// `log2` of the byte width, used to turn byte offsets into element
	/// indices.
	pub const fn shift(self) -> u32 {
		self.byte_length().trailing_zeros()
	}

	pub const fn name(self) -> &'static str {
		match self {
			Self::Uint8 => "uint8",
			Self::Uint8Clamped => "uint8clamped",
			Self::Int8 => "int8",
			Self::Uint16 => "uint16",
			Self::Int16 => "int16",
			Self::Uint32 => "uint32",
			Self::Int32 => "int32",
			Self::Float32 => "float32",
			Self::Float64 => "float64",
		}
	}

	/// Writes `value` into the first `byte_length()` bytes of `out`, applying
	/// this kind's store conversion.
	///
	/// Panics if `out` is shorter than the kind's width.
	pub fn encode(self, value: f64, out: &mut [u8]) {
		match self {
			Self::Uint8 => store::<u8>(value, out),
			Self::Uint8Clamped => store::<PodClampedU8>(value, out),
			Self::Int8 => store::<i8>(value, out),
			Self::Uint16 => store::<PodU16>(value, out),
			Self::Int16 => store::<PodI16>(value, out),
			Self::Uint32 => store::<PodU32>(value, out),
			Self::Int32 => store::<PodI32>(value, out),
			Self::Float32 => store::<PodF32>(value, out),
			Self::Float64 => store::<PodF64>(value, out),
		}
	}

	/// Reads the scalar held in the first `byte_length()` bytes of `bytes`.
	///
	/// Panics if `bytes` is shorter than the kind's width.
	pub fn decode(self, bytes: &[u8]) -> f64 {
		match self {
			Self::Uint8 => load::<u8>(bytes),
			Self::Uint8Clamped => load::<PodClampedU8>(bytes),
			Self::Int8 => load::<i8>(bytes),
			Self::Uint16 => load::<PodU16>(bytes),
			Self::Int16 => load::<PodI16>(bytes),
			Self::Uint32 => load::<PodU32>(bytes),
			Self::Int32 => load::<PodI32>(bytes),
			Self::Float32 => load::<PodF32>(bytes),
			Self::Float64 => load::<PodF64>(bytes),
		}
	}

	/// The number a store of `value` reads back as.
	pub fn coerce(self, value: f64) -> f64 {
		let mut scratch = [0u8; 8];
		self.encode(value, &mut scratch);
		self.decode(&scratch)
	}
}

fn store<T: Scalar>(value: f64, out: &mut [u8]) {
	let width = size_of::<T>();
	out[..width].copy_from_slice(bytemuck::bytes_of(&T::from_number(value)));
}

fn load<T: Scalar>(bytes: &[u8]) -> f64 {
	bytemuck::pod_read_unaligned::<T>(&bytes[..size_of::<T>()]).to_number()
}
