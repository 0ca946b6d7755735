//! Type descriptors and the accessors derived from them.
//!
//! A [`TypeDescriptor`] is immutable, cheap to clone and carries no
//! per-instance state. Values are addressed through a [`Handle`]; a getter or
//! setter produced by [`TypeDescriptor::create_getter`] /
//! [`TypeDescriptor::create_setter`] resolves a field relative to the handle
//! of its containing value.

mod arrays;
mod objects;
mod primitives;
mod string;

use core::fmt;
use std::sync::Arc;

pub use arrays::*;
pub use objects::*;
pub use primitives::*;
pub use string::*;
use typed_objects_primitives::ScalarKind;

use crate::BufferSource;
use crate::BufferSourceMut;
use crate::Handle;
use crate::LayoutError;
use crate::LayoutResult;
use crate::buffers::bytes;
use crate::buffers::bytes_mut;
use crate::buffers::copy_bytes;
use crate::buffers::try_bytes;
use crate::buffers::try_bytes_mut;
use crate::ensure;

/// Immutable description of a storage shape.
#[derive(Clone)]
pub struct TypeDescriptor {
	layout: Arc<Layout>,
}

#[derive(Debug)]
struct Layout {
	name: String,
	byte_length: usize,
	reference_length: usize,
	alignment: usize,
	kind: LayoutKind,
}

#[derive(Debug)]
enum LayoutKind {
	Primitive(ScalarKind),
	Array(Arc<ArrayLayout>),
	Struct(Arc<StructLayout>),
}

impl TypeDescriptor {
	fn from_layout(layout: Layout) -> Self {
		Self {
			layout: Arc::new(layout),
		}
	}

	pub fn name(&self) -> &str {
		&self.layout.name
	}

	/// Bytes occupied by one inline instance. Unbounded arrays report `0`;
	/// use [`ArrayType::byte_span`] for their storage.
	pub fn byte_length(&self) -> usize {
		self.layout.byte_length
	}

	/// Stride of this type when it is an array element or a field.
	pub fn reference_length(&self) -> usize {
		self.layout.reference_length
	}

	/// Byte offsets of this type must be a multiple of this.
	pub fn alignment(&self) -> usize {
		self.layout.alignment
	}

	/// Whether the type has a fixed inline size and can be nested.
	pub fn is_sized(&self) -> bool {
		self.layout.reference_length > 0
	}

	/// What a zero-filled instance reads back as. Only scalars have one.
	pub fn initial_value(&self) -> Option<Value> {
		self.scalar_kind().map(|_| Value::Number(0.0))
	}

	pub fn scalar_kind(&self) -> Option<ScalarKind> {
		match self.layout.kind {
			LayoutKind::Primitive(kind) => Some(kind),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<ArrayType> {
		match &self.layout.kind {
			LayoutKind::Array(layout) => Some(ArrayType::from_parts(self.clone(), layout.clone())),
			_ => None,
		}
	}

	pub fn as_struct(&self) -> Option<StructType> {
		match &self.layout.kind {
			LayoutKind::Struct(layout) => {
				Some(StructType::from_parts(self.clone(), layout.clone()))
			}
			_ => None,
		}
	}

	/// A getter for a field of this type placed `offset` bytes into its
	/// container.
	pub fn create_getter(&self, offset: usize) -> Getter {
		Getter {
			ty: self.clone(),
			offset,
		}
	}

	/// A setter for a field of this type placed `offset` bytes into its
	/// container.
	pub fn create_setter(&self, offset: usize) -> Setter {
		Setter {
			ty: self.clone(),
			offset,
		}
	}

	/// The type "array of this type".
	pub fn array(&self, options: ArrayOptions) -> LayoutResult<ArrayType> {
		ArrayType::new(self, options)
	}

	pub fn layout_info(&self) -> LayoutInfo {
		let kind = match &self.layout.kind {
			LayoutKind::Primitive(kind) => LayoutInfoKind::Scalar(*kind),
			LayoutKind::Array(layout) => {
				LayoutInfoKind::Array {
					component: Box::new(layout.component.layout_info()),
					capacity: layout.capacity,
				}
			}
			LayoutKind::Struct(layout) => {
				LayoutInfoKind::Struct {
					fields: layout
						.fields
						.iter()
						.map(|field| {
							FieldInfo {
								name: field.name().to_owned(),
								offset: field.offset(),
								layout: field.field_type().layout_info(),
							}
						})
						.collect(),
				}
			}
		};

		LayoutInfo {
			name: self.name().to_owned(),
			byte_length: self.byte_length(),
			reference_length: self.reference_length(),
			alignment: self.alignment(),
			kind,
		}
	}

	/// Where a field at `field_offset` lives for a container at
	/// `(buffer_index, byte_offset)`.
	///
	/// Scalars resolve through element indices: both offsets are shifted down
	/// by `log2(width)` and the sum shifted back, exactly like indexing a typed
	/// view of the buffer.
	fn resolve(&self, buffer_index: usize, byte_offset: usize, field_offset: usize) -> Handle {
		match self.layout.kind {
			LayoutKind::Primitive(kind) => {
				let shift = kind.shift();
				let index = (byte_offset >> shift) + (field_offset >> shift);
				Handle::new(buffer_index, index << shift)
			}
			_ => Handle::new(buffer_index, byte_offset + field_offset),
		}
	}

	fn read(&self, buffers: &dyn BufferSource, handle: Handle) -> Value {
		match &self.layout.kind {
			LayoutKind::Primitive(kind) => {
				Value::Number(kind.decode(bytes(buffers, handle, kind.byte_length())))
			}
			LayoutKind::Array(layout) => {
				let array_type = ArrayType::from_parts(self.clone(), layout.clone());
				Value::Array(ArrayValue::inline(array_type, handle))
			}
			LayoutKind::Struct(layout) => {
				let struct_type = StructType::from_parts(self.clone(), layout.clone());
				Value::Object(ObjectValue::new(struct_type, handle))
			}
		}
	}

	fn write(
		&self,
		buffers: &mut dyn BufferSourceMut,
		handle: Handle,
		value: &Value,
	) -> LayoutResult<()> {
		match (&self.layout.kind, value) {
			(LayoutKind::Primitive(kind), Value::Number(number)) => {
				kind.encode(*number, bytes_mut(buffers, handle, kind.byte_length()));
				Ok(())
			}
			(LayoutKind::Array(layout), Value::Array(source)) => {
				let array_type = ArrayType::from_parts(self.clone(), layout.clone());
				let mut target = ArrayValue::inline(array_type, handle);
				target.assign(buffers, source)
			}
			(LayoutKind::Struct(_), Value::Object(source)) => {
				ensure(
					source.struct_type().descriptor() == self,
					LayoutError::incompatible(self.name(), source.struct_type().name()),
					"struct values only copy between identical layouts",
				)?;
				copy_bytes(buffers, source.handle(), handle, self.byte_length())
			}
			_ => {
				ensure(
					false,
					LayoutError::incompatible(self.name(), value.type_name()),
					"value does not match the field type",
				)
			}
		}
	}

	/// Resets `count` consecutive instances at `handle` to their initial
	/// state. Every initial value is stored as zero bytes.
	fn write_initial(
		&self,
		buffers: &mut dyn BufferSourceMut,
		handle: Handle,
		count: usize,
	) -> LayoutResult<()> {
		let len = count
			.checked_mul(self.reference_length())
			.ok_or(LayoutError::OutOfBounds {
				buffer_index: handle.buffer_index,
				byte_offset: handle.byte_offset,
				len: usize::MAX,
			})?;
		if len > 0 {
			try_bytes_mut(buffers, handle, len)?.fill(0);
		}

		Ok(())
	}
}

/// Two descriptors are equal when they share a layout or describe the same
/// storage shape: same name, sizes and alignment, and recursively the same
/// scalar kind, array component, or placed fields.
impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.layout, &other.layout) || *self.layout == *other.layout
	}
}

impl PartialEq for Layout {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
			&& self.byte_length == other.byte_length
			&& self.reference_length == other.reference_length
			&& self.alignment == other.alignment
			&& self.kind == other.kind
	}
}

impl PartialEq for LayoutKind {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Primitive(left), Self::Primitive(right)) => left == right,
			(Self::Array(left), Self::Array(right)) => Arc::ptr_eq(left, right) || left == right,
			(Self::Struct(left), Self::Struct(right)) => Arc::ptr_eq(left, right) || left == right,
			_ => false,
		}
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeDescriptor")
			.field("name", &self.layout.name)
			.field("byte_length", &self.layout.byte_length)
			.field("reference_length", &self.layout.reference_length)
			.finish()
	}
}

/// Reads a field of a fixed type at a fixed offset inside its container.
#[derive(Clone, Debug)]
pub struct Getter {
	ty: TypeDescriptor,
	offset: usize,
}

impl Getter {
	pub fn field_type(&self) -> &TypeDescriptor {
		&self.ty
	}

	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Reads the field of the container at `(buffer_index, byte_offset)`.
	///
	/// Panics when the address is outside an allocated buffer.
	#[track_caller]
	pub fn get(&self, buffers: &dyn BufferSource, buffer_index: usize, byte_offset: usize) -> Value {
		self.ty
			.read(buffers, self.ty.resolve(buffer_index, byte_offset, self.offset))
	}

	/// Like [`Getter::get`], reporting bad addresses instead of panicking.
	pub fn try_get(
		&self,
		buffers: &dyn BufferSource,
		buffer_index: usize,
		byte_offset: usize,
	) -> LayoutResult<Value> {
		let handle = self.ty.resolve(buffer_index, byte_offset, self.offset);
		try_bytes(buffers, handle, self.ty.byte_length())?;
		Ok(self.ty.read(buffers, handle))
	}
}

/// Writes a field of a fixed type at a fixed offset inside its container.
#[derive(Clone, Debug)]
pub struct Setter {
	ty: TypeDescriptor,
	offset: usize,
}

impl Setter {
	pub fn field_type(&self) -> &TypeDescriptor {
		&self.ty
	}

	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Writes the field of the container at `(buffer_index, byte_offset)`.
	///
	/// Numbers are converted with the scalar kind's store rule. A value of the
	/// wrong shape is rejected; an address outside an allocated buffer panics.
	#[track_caller]
	pub fn set(
		&self,
		buffers: &mut dyn BufferSourceMut,
		buffer_index: usize,
		byte_offset: usize,
		value: impl Into<Value>,
	) -> LayoutResult<()> {
		let handle = self.ty.resolve(buffer_index, byte_offset, self.offset);
		self.ty.write(buffers, handle, &value.into())
	}

	/// Like [`Setter::set`], reporting bad addresses instead of panicking.
	pub fn try_set(
		&self,
		buffers: &mut dyn BufferSourceMut,
		buffer_index: usize,
		byte_offset: usize,
		value: impl Into<Value>,
	) -> LayoutResult<()> {
		let handle = self.ty.resolve(buffer_index, byte_offset, self.offset);
		try_bytes(&*buffers, handle, self.ty.byte_length())?;
		self.ty.write(buffers, handle, &value.into())
	}
}

/// A value read from or written to a layout.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Number(f64),
	Array(ArrayValue),
	Object(ObjectValue),
}

impl Value {
	pub fn as_number(&self) -> Option<f64> {
		match self {
			Self::Number(number) => Some(*number),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&ArrayValue> {
		match self {
			Self::Array(array) => Some(array),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectValue> {
		match self {
			Self::Object(object) => Some(object),
			_ => None,
		}
	}

	fn type_name(&self) -> &str {
		match self {
			Self::Number(_) => "number",
			Self::Array(array) => array.array_type().name(),
			Self::Object(object) => object.struct_type().name(),
		}
	}
}

impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}

impl From<i32> for Value {
	fn from(number: i32) -> Self {
		Self::Number(f64::from(number))
	}
}

impl From<u32> for Value {
	fn from(number: u32) -> Self {
		Self::Number(f64::from(number))
	}
}

impl From<bool> for Value {
	fn from(flag: bool) -> Self {
		Self::Number(if flag { 1.0 } else { 0.0 })
	}
}

impl From<ArrayValue> for Value {
	fn from(array: ArrayValue) -> Self {
		Self::Array(array)
	}
}

impl From<ObjectValue> for Value {
	fn from(object: ObjectValue) -> Self {
		Self::Object(object)
	}
}

/// Plain description of a layout, for components that share the buffers
/// without linking against this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayoutInfo {
	pub name: String,
	pub byte_length: usize,
	pub reference_length: usize,
	pub alignment: usize,
	pub kind: LayoutInfoKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LayoutInfoKind {
	Scalar(ScalarKind),
	Array {
		component: Box<LayoutInfo>,
		capacity: Option<usize>,
	},
	Struct {
		fields: Vec<FieldInfo>,
	},
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldInfo {
	pub name: String,
	pub offset: usize,
	pub layout: LayoutInfo,
}

impl LayoutInfo {
	fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize, label: &str) -> fmt::Result {
		writeln!(
			f,
			"{:indent$}{label}{} size={} stride={} align={}",
			"",
			self.name,
			self.byte_length,
			self.reference_length,
			self.alignment,
			indent = depth * 2
		)?;

		match &self.kind {
			LayoutInfoKind::Scalar(_) => Ok(()),
			LayoutInfoKind::Array { component, .. } => component.write_tree(f, depth + 1, "[] "),
			LayoutInfoKind::Struct { fields } => {
				for field in fields {
					let label = format!("+{} {}: ", field.offset, field.name);
					field.layout.write_tree(f, depth + 1, &label)?;
				}
				Ok(())
			}
		}
	}
}

impl fmt::Display for LayoutInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.write_tree(f, 0, "")
	}
}
