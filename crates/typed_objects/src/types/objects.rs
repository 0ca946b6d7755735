use std::sync::Arc;

use super::ArrayOptions;
use super::ArrayType;
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
use crate::buffers::try_bytes_mut;
use crate::ensure;
use crate::next_pow2;

/// One placed field of a struct type.
#[derive(Clone, Debug)]
pub struct FieldLayout {
	name: String,
	offset: usize,
	getter: Getter,
	setter: Setter,
}

impl FieldLayout {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Byte offset inside the containing struct.
	pub fn offset(&self) -> usize {
		self.offset
	}

	pub fn field_type(&self) -> &TypeDescriptor {
		self.getter.field_type()
	}

	pub fn getter(&self) -> &Getter {
		&self.getter
	}

	pub fn setter(&self) -> &Setter {
		&self.setter
	}
}

impl PartialEq for FieldLayout {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name
			&& self.offset == other.offset
			&& self.field_type() == other.field_type()
	}
}

#[derive(Debug, PartialEq)]
pub(crate) struct StructLayout {
	/// Fields in placement order.
	pub(crate) fields: Vec<FieldLayout>,
}

/// A fixed set of named fields stored inline, one after another.
#[derive(Clone, Debug)]
pub struct StructType {
	descriptor: TypeDescriptor,
	layout: Arc<StructLayout>,
}

impl StructType {
	pub fn builder() -> StructTypeBuilder {
		StructTypeBuilder::default()
	}

	pub(crate) fn from_parts(descriptor: TypeDescriptor, layout: Arc<StructLayout>) -> Self {
		Self { descriptor, layout }
	}

	pub fn descriptor(&self) -> &TypeDescriptor {
		&self.descriptor
	}

	pub fn name(&self) -> &str {
		self.descriptor.name()
	}

	pub fn byte_length(&self) -> usize {
		self.descriptor.byte_length()
	}

	/// Fields in placement order, largest first.
	pub fn fields(&self) -> &[FieldLayout] {
		&self.layout.fields
	}

	pub fn field(&self, name: &str) -> LayoutResult<&FieldLayout> {
		self.layout
			.fields
			.iter()
			.find(|field| field.name == name)
			.ok_or_else(|| {
				LayoutError::UnknownField {
					type_name: self.name().to_owned(),
					name: name.to_owned(),
				}
			})
	}

	/// The type "array of this struct".
	pub fn array(&self, options: ArrayOptions) -> LayoutResult<ArrayType> {
		self.descriptor.array(options)
	}

	/// Places a zeroed instance at `handle`.
	pub fn create(
		&self,
		buffers: &mut dyn BufferSourceMut,
		handle: Handle,
	) -> LayoutResult<ObjectValue> {
		let value = self.view(handle)?;
		value.initialize(buffers)?;
		Ok(value)
	}

	/// An instance already stored at `handle`, left as is.
	pub fn view(&self, handle: Handle) -> LayoutResult<ObjectValue> {
		let alignment = self.descriptor.alignment();
		ensure(
			handle.byte_offset % alignment == 0,
			LayoutError::Misaligned {
				byte_offset: handle.byte_offset,
				alignment,
			},
			"struct storage is not aligned to its widest field",
		)?;

		Ok(ObjectValue::new(self.clone(), handle))
	}
}

impl PartialEq for StructType {
	fn eq(&self, other: &Self) -> bool {
		self.descriptor == other.descriptor
	}
}

/// Collects fields in declaration order for [`StructType`].
#[derive(Clone, Debug, Default)]
pub struct StructTypeBuilder {
	name: Option<String>,
	fields: Vec<(String, TypeDescriptor)>,
}

impl StructTypeBuilder {
	/// Type name; derived from the fields when absent.
	#[must_use]
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	#[must_use]
	pub fn field(mut self, name: impl Into<String>, ty: &TypeDescriptor) -> Self {
		self.fields.push((name.into(), ty.clone()));
		self
	}

	/// Places the fields and freezes the type.
	///
	/// Wider fields go first so every field lands on a multiple of its own
	/// alignment; fields of equal width keep their declaration order.
	pub fn build(self) -> LayoutResult<StructType> {
		for (index, (name, ty)) in self.fields.iter().enumerate() {
			ensure(
				!self.fields[..index].iter().any(|(other, _)| other == name),
				LayoutError::DuplicateField { name: name.clone() },
				"struct field declared twice",
			)?;
			ensure(
				ty.is_sized(),
				LayoutError::UnsizedComponent {
					name: ty.name().to_owned(),
				},
				"struct field has no inline size",
			)?;
		}

		let name = self.name.unwrap_or_else(|| {
			let fields: Vec<String> = self
				.fields
				.iter()
				.map(|(name, ty)| format!("{name}:{}", ty.name()))
				.collect();
			format!("{{{}}}", fields.join(","))
		});

		let mut ordered = self.fields;
		ordered.sort_by_key(|(_, ty)| core::cmp::Reverse(ty.reference_length()));

		let mut end = 0usize;
		let mut alignment = 1usize;
		let fields: Vec<FieldLayout> = ordered
			.into_iter()
			.map(|(name, ty)| {
				let offset = end.next_multiple_of(ty.alignment());
				end = offset + ty.reference_length();
				alignment = alignment.max(ty.alignment());
				FieldLayout {
					name,
					offset,
					getter: ty.create_getter(offset),
					setter: ty.create_setter(offset),
				}
			})
			.collect();

		let byte_length = end.next_multiple_of(alignment);
		let layout = Arc::new(StructLayout { fields });
		let descriptor = TypeDescriptor::from_layout(Layout {
			name,
			byte_length,
			reference_length: next_pow2(byte_length),
			alignment,
			kind: LayoutKind::Struct(layout.clone()),
		});

		Ok(StructType { descriptor, layout })
	}
}

/// A live struct instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectValue {
	ty: StructType,
	handle: Handle,
}

impl ObjectValue {
	pub(crate) fn new(ty: StructType, handle: Handle) -> Self {
		Self { ty, handle }
	}

	pub fn struct_type(&self) -> &StructType {
		&self.ty
	}

	pub fn handle(&self) -> Handle {
		self.handle
	}

	pub fn get(&self, buffers: &dyn BufferSource, name: &str) -> LayoutResult<Value> {
		self.ty.field(name)?.getter.try_get(
			buffers,
			self.handle.buffer_index,
			self.handle.byte_offset,
		)
	}

	pub fn set(
		&self,
		buffers: &mut dyn BufferSourceMut,
		name: &str,
		value: impl Into<Value>,
	) -> LayoutResult<()> {
		self.ty.field(name)?.setter.try_set(
			buffers,
			self.handle.buffer_index,
			self.handle.byte_offset,
			value,
		)
	}

	/// Writes every field's initial value.
	pub fn initialize(&self, buffers: &mut dyn BufferSourceMut) -> LayoutResult<()> {
		try_bytes_mut(buffers, self.handle, self.ty.byte_length())?.fill(0);
		Ok(())
	}
}
