use core::fmt;
use std::sync::Arc;

use typed_builder::TypedBuilder;
use typed_objects_primitives::Scalar;

use super::Getter;
use super::Layout;
use super::LayoutKind;
use super::Setter;
use super::TypeDescriptor;
use super::Value;
use crate::BufferSource;
use crate::BufferSourceMut;
use crate::Handle;
use crate::LayoutError;
use crate::LayoutResult;
use crate::buffers::copy_bytes;
use crate::buffers::try_bytes;
use crate::ensure;
use crate::ilog2;

/// Extra behaviour attached to an array type: a custom constructor and a
/// native rendering.
///
/// Both methods have defaults, so an extension only overrides what it needs.
pub trait ArrayExtension: fmt::Debug + Send + Sync {
	/// Fills a freshly created `value` from `source`.
	fn initialize(
		&self,
		array_type: &ArrayType,
		buffers: &mut dyn BufferSourceMut,
		value: &mut ArrayValue,
		source: &ArraySource<'_>,
	) -> LayoutResult<()> {
		array_type.initialize_default(buffers, value, source)
	}

	/// Renders `value` as a native string, if this kind of array has one.
	fn render(&self, _value: &ArrayValue, _buffers: &dyn BufferSource) -> Option<String> {
		None
	}
}

/// Options for [`TypeDescriptor::array`].
#[derive(Clone, Debug, TypedBuilder)]
pub struct ArrayOptions {
	/// Fixed element count. Only fixed-capacity arrays have an inline size
	/// and can be nested in other arrays or structs.
	#[builder(default, setter(strip_option))]
	pub capacity: Option<usize>,
	/// Type name; derived from the component when absent.
	#[builder(default, setter(strip_option, into))]
	pub name: Option<String>,
	#[builder(default, setter(strip_option))]
	pub extension: Option<Arc<dyn ArrayExtension>>,
}

impl Default for ArrayOptions {
	fn default() -> Self {
		Self::builder().build()
	}
}

/// Where the contents of a new array value come from.
#[derive(Clone, Copy, Debug)]
pub enum ArraySource<'a> {
	Empty,
	/// That many elements in their initial state. Negative lengths are
	/// rejected.
	Length(i64),
	/// A slice of another array with a compatible component. `offset` and
	/// `length` are clamped to the source.
	Copy {
		source: &'a ArrayValue,
		offset: usize,
		length: Option<usize>,
	},
	/// A slice of native text, counted in UTF-16 code units. Only string
	/// arrays accept it.
	Text {
		text: &'a str,
		offset: usize,
		length: Option<usize>,
	},
}

impl<'a> ArraySource<'a> {
	/// A length given as an arbitrary number. Negative, fractional and
	/// non-finite values are rejected.
	pub fn from_length(length: f64) -> LayoutResult<Self> {
		ensure(
			length.is_finite() && length >= 0.0 && length.fract() == 0.0 && length <= i64::MAX as f64,
			LayoutError::InvalidLength {
				length: length.to_string(),
			},
			"array length must be a non-negative integer",
		)?;

		Ok(Self::Length(length as i64))
	}

	pub fn copy(source: &'a ArrayValue) -> Self {
		Self::Copy {
			source,
			offset: 0,
			length: None,
		}
	}

	pub fn copy_slice(source: &'a ArrayValue, offset: usize, length: Option<usize>) -> Self {
		Self::Copy {
			source,
			offset,
			length,
		}
	}

	pub fn text(text: &'a str) -> Self {
		Self::Text {
			text,
			offset: 0,
			length: None,
		}
	}

	pub fn text_slice(text: &'a str, offset: usize, length: Option<usize>) -> Self {
		Self::Text {
			text,
			offset,
			length,
		}
	}
}

/// Clamps a requested `(offset, length)` slice to a source of `source_len`
/// elements.
pub(crate) fn clamp_range(source_len: usize, offset: usize, length: Option<usize>) -> (usize, usize) {
	let offset = offset.min(source_len);
	let length = length.unwrap_or(source_len).min(source_len - offset);
	(offset, length)
}

#[derive(Debug)]
pub(crate) struct ArrayLayout {
	pub(crate) component: TypeDescriptor,
	pub(crate) capacity: Option<usize>,
	element_shift: u32,
	element_getter: Getter,
	element_setter: Setter,
	extension: Option<Arc<dyn ArrayExtension>>,
}

/// Extensions compare by identity: an array only matches another built with
/// the very same extension instance.
impl PartialEq for ArrayLayout {
	fn eq(&self, other: &Self) -> bool {
		let same_extension = match (&self.extension, &other.extension) {
			(None, None) => true,
			(Some(left), Some(right)) => Arc::ptr_eq(left, right),
			_ => false,
		};

		same_extension && self.capacity == other.capacity && self.component == other.component
	}
}

/// A type describing a contiguous run of one component type.
#[derive(Clone, Debug)]
pub struct ArrayType {
	descriptor: TypeDescriptor,
	layout: Arc<ArrayLayout>,
}

impl ArrayType {
	/// Builds "array of `component`".
	///
	/// The component must have a fixed inline size that is a power of two,
	/// because elements are addressed by shifting the index.
	pub fn new(component: &TypeDescriptor, options: ArrayOptions) -> LayoutResult<Self> {
		let width = component.reference_length();
		ensure(
			component.is_sized(),
			LayoutError::UnsizedComponent {
				name: component.name().to_owned(),
			},
			"array component has no inline size",
		)?;
		ensure(
			width.is_power_of_two(),
			LayoutError::NonPowerOfTwoWidth {
				name: component.name().to_owned(),
				width,
			},
			"array component width is not a power of two",
		)?;

		let inline_length = options
			.capacity
			.map_or(Some(0), |capacity| capacity.checked_mul(width));
		ensure(
			inline_length.is_some(),
			LayoutError::InvalidLength {
				length: format!("{:?}", options.capacity),
			},
			"array capacity overflows the address space",
		)?;

		Ok(Self::build(component, options, inline_length.unwrap_or_default()))
	}

	/// Assembles the type once the component has been validated.
	pub(crate) fn build(
		component: &TypeDescriptor,
		options: ArrayOptions,
		inline_length: usize,
	) -> Self {
		let ArrayOptions {
			capacity,
			name,
			extension,
		} = options;
		let name = name.unwrap_or_else(|| {
			match capacity {
				Some(capacity) => format!("{}[{capacity}]", component.name()),
				None => format!("{}[]", component.name()),
			}
		});

		let layout = Arc::new(ArrayLayout {
			component: component.clone(),
			capacity,
			element_shift: ilog2(component.reference_length()),
			element_getter: component.create_getter(0),
			element_setter: component.create_setter(0),
			extension,
		});
		let descriptor = TypeDescriptor::from_layout(Layout {
			name,
			byte_length: inline_length,
			reference_length: inline_length,
			alignment: component.alignment(),
			kind: LayoutKind::Array(layout.clone()),
		});

		Self { descriptor, layout }
	}

	pub(crate) fn from_parts(descriptor: TypeDescriptor, layout: Arc<ArrayLayout>) -> Self {
		Self { descriptor, layout }
	}

	pub fn descriptor(&self) -> &TypeDescriptor {
		&self.descriptor
	}

	pub fn name(&self) -> &str {
		self.descriptor.name()
	}

	pub fn component(&self) -> &TypeDescriptor {
		&self.layout.component
	}

	/// The declared fixed element count, if any.
	pub fn capacity(&self) -> Option<usize> {
		self.layout.capacity
	}

	/// `log2` of the component stride.
	pub fn element_shift(&self) -> u32 {
		self.layout.element_shift
	}

	/// Bytes needed to store `count` elements.
	///
	/// Values made by [`ArrayType::create`] keep every count up to their
	/// capacity addressable, so this never wraps for them.
	pub fn byte_span(&self, count: usize) -> usize {
		count << self.layout.element_shift
	}

	/// Byte offset of element `index` for an array starting at `byte_offset`.
	pub fn element_address(&self, byte_offset: usize, index: usize) -> usize {
		byte_offset + (index << self.layout.element_shift)
	}

	/// The type "array of this array type". Requires a fixed capacity.
	pub fn array(&self, options: ArrayOptions) -> LayoutResult<ArrayType> {
		self.descriptor.array(options)
	}

	/// Creates a value at `handle` whose storage holds `capacity` elements,
	/// filled from `source`.
	///
	/// A declared fixed capacity further limits `capacity`, and a capacity
	/// whose storage would run past `usize::MAX` is rejected. The storage is
	/// only touched for the elements actually initialized, so an empty value
	/// may point at an unmaterialized buffer.
	pub fn create(
		&self,
		buffers: &mut dyn BufferSourceMut,
		handle: Handle,
		capacity: usize,
		source: ArraySource<'_>,
	) -> LayoutResult<ArrayValue> {
		let alignment = self.descriptor.alignment();
		ensure(
			handle.byte_offset % alignment == 0,
			LayoutError::Misaligned {
				byte_offset: handle.byte_offset,
				alignment,
			},
			"array storage is not aligned to its component",
		)?;

		let capacity = self
			.layout
			.capacity
			.map_or(capacity, |declared| declared.min(capacity));
		let addressable = (usize::MAX - handle.byte_offset) >> self.layout.element_shift;
		ensure(
			capacity <= addressable,
			LayoutError::CapacityExceeded {
				requested: capacity,
				capacity: addressable,
			},
			"array storage runs past the end of the address space",
		)?;

		let mut value = ArrayValue {
			ty: self.clone(),
			handle,
			length: 0,
			capacity,
		};

		match &self.layout.extension {
			Some(extension) => extension.initialize(self, buffers, &mut value, &source)?,
			None => self.initialize_default(buffers, &mut value, &source)?,
		}

		Ok(value)
	}

	/// The constructor used when no extension overrides it: lengths and
	/// copies of compatible arrays.
	pub fn initialize_default(
		&self,
		buffers: &mut dyn BufferSourceMut,
		value: &mut ArrayValue,
		source: &ArraySource<'_>,
	) -> LayoutResult<()> {
		match *source {
			ArraySource::Empty => Ok(()),
			ArraySource::Length(length) => {
				ensure(
					length >= 0,
					LayoutError::InvalidLength {
						length: length.to_string(),
					},
					"array length is negative",
				)?;
				value.set_length(buffers, length as usize)
			}
			ArraySource::Copy {
				source,
				offset,
				length,
			} => value.copy_from(buffers, source, offset, length),
			ArraySource::Text { .. } => {
				ensure(
					false,
					LayoutError::incompatible(self.name(), "text"),
					"only string arrays are created from text",
				)
			}
		}
	}
}

impl PartialEq for ArrayType {
	fn eq(&self, other: &Self) -> bool {
		self.descriptor == other.descriptor
	}
}

/// One live array: storage location, element count and capacity.
///
/// The value does not own its storage; it is only valid while the buffer
/// behind its handle is allocated.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayValue {
	ty: ArrayType,
	handle: Handle,
	length: usize,
	capacity: usize,
}

impl ArrayValue {
	/// The fixed-capacity array stored inline at `handle`, with every slot
	/// counted as an element.
	pub fn inline(ty: ArrayType, handle: Handle) -> Self {
		let capacity = ty.capacity().unwrap_or(0);
		Self {
			ty,
			handle,
			length: capacity,
			capacity,
		}
	}

	pub fn array_type(&self) -> &ArrayType {
		&self.ty
	}

	pub fn handle(&self) -> Handle {
		self.handle
	}

	pub fn len(&self) -> usize {
		self.length
	}

	pub fn is_empty(&self) -> bool {
		self.length == 0
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Bytes covered by the current elements.
	pub fn byte_span(&self) -> usize {
		self.ty.byte_span(self.length)
	}

	/// The buffer holding this value, `None` while it is unmaterialized.
	pub fn get_array_buffer<'b>(&self, buffers: &'b dyn BufferSource) -> Option<&'b [u8]> {
		buffers.array_buffer(self.handle.buffer_index)
	}

	/// Handle of element `index`. Does not check bounds.
	pub fn element_handle(&self, index: usize) -> Handle {
		Handle::new(
			self.handle.buffer_index,
			self.ty.element_address(self.handle.byte_offset, index),
		)
	}

	fn check_index(&self, index: usize) -> LayoutResult<()> {
		ensure(
			index < self.length,
			LayoutError::IndexOutOfBounds {
				index,
				length: self.length,
			},
			"array index out of bounds",
		)
	}

	/// Reads element `index`. Storage that no longer backs the element is
	/// reported, never a panic.
	pub fn get(&self, buffers: &dyn BufferSource, index: usize) -> LayoutResult<Value> {
		self.check_index(index)?;
		let element = self.element_handle(index);
		self.ty
			.layout
			.element_getter
			.try_get(buffers, element.buffer_index, element.byte_offset)
	}

	pub fn set(
		&self,
		buffers: &mut dyn BufferSourceMut,
		index: usize,
		value: impl Into<Value>,
	) -> LayoutResult<()> {
		self.check_index(index)?;
		let element = self.element_handle(index);
		self.ty
			.layout
			.element_setter
			.try_set(buffers, element.buffer_index, element.byte_offset, value)
	}

	/// Every element in order.
	pub fn to_values(&self, buffers: &dyn BufferSource) -> LayoutResult<Vec<Value>> {
		(0..self.length).map(|index| self.get(buffers, index)).collect()
	}

	/// Copies the elements out as scalars of type `T`, which must match the
	/// component kind.
	pub fn read_scalars<T: Scalar>(&self, buffers: &dyn BufferSource) -> LayoutResult<Vec<T>> {
		ensure(
			self.ty.component().scalar_kind() == Some(T::KIND),
			LayoutError::incompatible(self.ty.component().name(), T::KIND.name()),
			"scalar type does not match the array component",
		)?;

		if self.length == 0 {
			return Ok(Vec::new());
		}

		let bytes = try_bytes(buffers, self.handle, self.byte_span())?;
		Ok(bytes
			.chunks_exact(size_of::<T>())
			.map(bytemuck::pod_read_unaligned::<T>)
			.collect())
	}

	/// Changes the element count within the capacity. Slots entering or
	/// leaving the array are reset to their initial state.
	pub fn set_length(
		&mut self,
		buffers: &mut dyn BufferSourceMut,
		new_length: usize,
	) -> LayoutResult<()> {
		ensure(
			new_length <= self.capacity,
			LayoutError::CapacityExceeded {
				requested: new_length,
				capacity: self.capacity,
			},
			"array length exceeds its storage",
		)?;

		let (start, count) = if new_length > self.length {
			(self.length, new_length - self.length)
		} else {
			(new_length, self.length - new_length)
		};
		self.ty
			.component()
			.write_initial(buffers, self.element_handle(start), count)?;
		self.length = new_length;

		Ok(())
	}

	/// Replaces the contents with a clamped slice of `source`, copying
	/// buffer to buffer.
	pub fn copy_from(
		&mut self,
		buffers: &mut dyn BufferSourceMut,
		source: &ArrayValue,
		offset: usize,
		length: Option<usize>,
	) -> LayoutResult<()> {
		ensure(
			source.ty.component() == self.ty.component(),
			LayoutError::incompatible(self.ty.name(), source.ty.name()),
			"array component types differ",
		)?;

		let (offset, length) = clamp_range(source.length, offset, length);
		ensure(
			length <= self.capacity,
			LayoutError::CapacityExceeded {
				requested: length,
				capacity: self.capacity,
			},
			"copied slice exceeds the array storage",
		)?;

		copy_bytes(
			buffers,
			source.element_handle(offset),
			self.handle,
			self.ty.byte_span(length),
		)?;
		self.length = length;

		Ok(())
	}

	/// Overwrites every slot from `source`; slots past its length go back to
	/// their initial state. Used when an inline array field is assigned.
	pub(crate) fn assign(
		&mut self,
		buffers: &mut dyn BufferSourceMut,
		source: &ArrayValue,
	) -> LayoutResult<()> {
		let capacity = self.capacity;
		self.copy_from(buffers, source, 0, None)?;
		self.set_length(buffers, capacity)
	}

	/// Native rendering provided by the array type's extension.
	pub fn render(&self, buffers: &dyn BufferSource) -> Option<String> {
		self.ty
			.layout
			.extension
			.as_ref()
			.and_then(|extension| extension.render(self, buffers))
	}
}
