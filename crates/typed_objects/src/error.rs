/// Errors reported while building types or constructing values.
///
/// Shape violations are reported at construction time and never coerced.
/// Out-of-bounds addressing in the unchecked accessors is a caller bug and
/// panics instead; only the `try_*` accessors map it to
/// [`LayoutError::OutOfBounds`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LayoutError {
	#[error("component `{name}` is {width} bytes wide, shift addressing needs a power of two")]
	NonPowerOfTwoWidth { name: String, width: usize },

	#[error("component `{name}` has no fixed inline size")]
	UnsizedComponent { name: String },

	#[error("invalid array length {length}")]
	InvalidLength { length: String },

	#[error("cannot initialize `{expected}` from `{found}`")]
	IncompatibleSource { expected: String, found: String },

	#[error("{requested} elements requested but storage holds {capacity}")]
	CapacityExceeded { requested: usize, capacity: usize },

	#[error("array index {index} out of bounds for length {length}")]
	IndexOutOfBounds { index: usize, length: usize },

	#[error("buffer {buffer_index} is not allocated")]
	BufferNotAllocated { buffer_index: usize },

	#[error("{len} bytes at offset {byte_offset} exceed buffer {buffer_index}")]
	OutOfBounds {
		buffer_index: usize,
		byte_offset: usize,
		len: usize,
	},

	#[error("offset {byte_offset} is not a multiple of the required alignment {alignment}")]
	Misaligned { byte_offset: usize, alignment: usize },

	#[error("field `{name}` is declared twice")]
	DuplicateField { name: String },

	#[error("type `{type_name}` has no field `{name}`")]
	UnknownField { type_name: String, name: String },
}

impl LayoutError {
	pub(crate) fn incompatible(expected: impl Into<String>, found: impl Into<String>) -> Self {
		Self::IncompatibleSource {
			expected: expected.into(),
			found: found.into(),
		}
	}
}

pub type LayoutResult<T> = Result<T, LayoutError>;
