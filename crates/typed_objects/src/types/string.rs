use core::ops::Deref;
use std::sync::Arc;
use std::sync::LazyLock;

use typed_objects_primitives::PodU16;

use super::ArrayExtension;
use super::ArrayOptions;
use super::ArraySource;
use super::ArrayType;
use super::ArrayValue;
use super::TypeDescriptor;
use super::Value;
use super::clamp_range;
use super::uint16;
use crate::BufferSource;
use crate::BufferSourceMut;
use crate::Handle;
use crate::LayoutError;
use crate::LayoutResult;
use crate::buffers::try_bytes;
use crate::buffers::try_bytes_mut;
use crate::ensure;

/// Construction from native text and rendering back to it.
#[derive(Debug)]
struct StringExtension;

impl ArrayExtension for StringExtension {
	fn initialize(
		&self,
		array_type: &ArrayType,
		buffers: &mut dyn BufferSourceMut,
		value: &mut ArrayValue,
		source: &ArraySource<'_>,
	) -> LayoutResult<()> {
		match *source {
			ArraySource::Text {
				text,
				offset,
				length,
			} => {
				let units: Vec<u16> = text.encode_utf16().collect();
				let (offset, length) = clamp_range(units.len(), offset, length);
				value.set_length(buffers, length)?;
				if length > 0 {
					let pods: Vec<PodU16> = units[offset..offset + length]
						.iter()
						.copied()
						.map(PodU16::from)
						.collect();
					try_bytes_mut(buffers, value.handle(), value.byte_span())?
						.copy_from_slice(bytemuck::cast_slice(&pods));
				}
				Ok(())
			}
			ArraySource::Copy { source: other, .. } => {
				ensure(
					other.array_type() == array_type,
					LayoutError::incompatible(array_type.name(), other.array_type().name()),
					"strings only copy from other strings",
				)?;
				array_type.initialize_default(buffers, value, source)
			}
			_ => array_type.initialize_default(buffers, value, source),
		}
	}

	/// Storage that is unmaterialized or no longer covers the value renders
	/// as the empty string.
	fn render(&self, value: &ArrayValue, buffers: &dyn BufferSource) -> Option<String> {
		let Ok(stored) = try_bytes(buffers, value.handle(), value.byte_span()) else {
			return Some(String::new());
		};

		let units: Vec<u16> = stored
			.chunks_exact(2)
			.map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
			.collect();
		Some(String::from_utf16_lossy(&units))
	}
}

static STRING: LazyLock<StringType> = LazyLock::new(|| {
	let options = ArrayOptions::builder()
		.name("string")
		.extension(Arc::new(StringExtension) as Arc<dyn ArrayExtension>)
		.build();
	StringType(ArrayType::build(&uint16(), options, 0))
});

/// The shared string type.
pub fn string() -> StringType {
	STRING.clone()
}

/// Unbounded array of UTF-16 code units.
#[derive(Clone, Debug, PartialEq)]
pub struct StringType(ArrayType);

impl StringType {
	pub fn array_type(&self) -> &ArrayType {
		&self.0
	}

	pub fn descriptor(&self) -> &TypeDescriptor {
		self.0.descriptor()
	}

	/// Creates a string at `handle` with room for `capacity` code units.
	///
	/// `source` may be a length, native text or another string; slices are
	/// clamped to the source.
	pub fn create(
		&self,
		buffers: &mut dyn BufferSourceMut,
		handle: Handle,
		capacity: usize,
		source: ArraySource<'_>,
	) -> LayoutResult<StringValue> {
		self.0
			.create(buffers, handle, capacity, source)
			.map(StringValue)
	}

	/// Copies all of `text` into storage at `handle`, sized to fit.
	pub fn from_text(
		&self,
		buffers: &mut dyn BufferSourceMut,
		handle: Handle,
		text: &str,
	) -> LayoutResult<StringValue> {
		let capacity = text.encode_utf16().count();
		self.create(buffers, handle, capacity, ArraySource::text(text))
	}

	/// A zero-length string with no storage behind it.
	pub fn empty(&self) -> StringValue {
		StringValue(ArrayValue::inline(self.0.clone(), Handle::UNALLOCATED))
	}
}

/// A live string value.
#[derive(Clone, Debug, PartialEq)]
pub struct StringValue(ArrayValue);

impl StringValue {
	pub fn into_inner(self) -> ArrayValue {
		self.0
	}

	/// The stored code units, unpaired surrogates included.
	pub fn code_units(&self, buffers: &dyn BufferSource) -> LayoutResult<Vec<u16>> {
		Ok(self
			.0
			.read_scalars::<PodU16>(buffers)?
			.into_iter()
			.map(u16::from)
			.collect())
	}

	/// Decodes the value into native text. Unpaired surrogates become
	/// U+FFFD; an unmaterialized buffer renders as the empty string.
	pub fn render(&self, buffers: &dyn BufferSource) -> String {
		self.0.render(buffers).unwrap_or_default()
	}

	/// Compares code units exactly, so strings differing only in unpaired
	/// surrogates are not equal. Unreadable storage never equals anything.
	pub fn equals(&self, buffers: &dyn BufferSource, other: &StringValue) -> bool {
		match (self.code_units(buffers), other.code_units(buffers)) {
			(Ok(left), Ok(right)) => left == right,
			_ => false,
		}
	}

	pub fn equals_text(&self, buffers: &dyn BufferSource, text: &str) -> bool {
		self.code_units(buffers)
			.is_ok_and(|units| units.iter().copied().eq(text.encode_utf16()))
	}

	/// Substring search on the rendered text.
	pub fn contains(&self, buffers: &dyn BufferSource, needle: &str) -> bool {
		self.render(buffers).contains(needle)
	}

	/// Copies a clamped slice of this string into new storage at `handle`.
	pub fn slice(
		&self,
		buffers: &mut dyn BufferSourceMut,
		handle: Handle,
		offset: usize,
		length: Option<usize>,
	) -> LayoutResult<StringValue> {
		let (_, count) = clamp_range(self.len(), offset, length);
		string().create(
			buffers,
			handle,
			count,
			ArraySource::copy_slice(&self.0, offset, length),
		)
	}
}

impl Deref for StringValue {
	type Target = ArrayValue;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl TryFrom<ArrayValue> for StringValue {
	type Error = LayoutError;

	fn try_from(value: ArrayValue) -> Result<Self, Self::Error> {
		let string = string();
		ensure(
			value.array_type() == string.array_type(),
			LayoutError::incompatible(string.array_type().name(), value.array_type().name()),
			"array value is not a string",
		)?;
		Ok(Self(value))
	}
}

impl From<StringValue> for Value {
	fn from(value: StringValue) -> Self {
		Self::Array(value.0)
	}
}
