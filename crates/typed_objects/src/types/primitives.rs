use std::sync::LazyLock;

use typed_objects_primitives::Scalar;
use typed_objects_primitives::ScalarKind;

use super::Layout;
use super::LayoutKind;
use super::TypeDescriptor;

/// Builds the descriptor of one scalar kind. Byte length, stride and
/// alignment all equal the kind's width.
pub fn define_primitive(kind: ScalarKind) -> TypeDescriptor {
	let width = kind.byte_length();
	TypeDescriptor::from_layout(Layout {
		name: kind.name().to_owned(),
		byte_length: width,
		reference_length: width,
		alignment: width,
		kind: LayoutKind::Primitive(kind),
	})
}

static REGISTRY: LazyLock<[TypeDescriptor; 9]> =
	LazyLock::new(|| ScalarKind::ALL.map(define_primitive));

/// The shared descriptor of `kind`.
pub fn primitive(kind: ScalarKind) -> TypeDescriptor {
	REGISTRY[kind as usize].clone()
}

/// The descriptor matching a scalar wrapper type.
pub fn scalar_type<T: Scalar>() -> TypeDescriptor {
	primitive(T::KIND)
}

pub fn uint8() -> TypeDescriptor {
	primitive(ScalarKind::Uint8)
}

/// Booleans are stored as plain bytes.
pub fn boolean() -> TypeDescriptor {
	primitive(ScalarKind::BOOLEAN)
}

pub fn uint8_clamped() -> TypeDescriptor {
	primitive(ScalarKind::Uint8Clamped)
}

pub fn int8() -> TypeDescriptor {
	primitive(ScalarKind::Int8)
}

pub fn uint16() -> TypeDescriptor {
	primitive(ScalarKind::Uint16)
}

pub fn int16() -> TypeDescriptor {
	primitive(ScalarKind::Int16)
}

pub fn uint32() -> TypeDescriptor {
	primitive(ScalarKind::Uint32)
}

pub fn int32() -> TypeDescriptor {
	primitive(ScalarKind::Int32)
}

pub fn float32() -> TypeDescriptor {
	primitive(ScalarKind::Float32)
}

pub fn float64() -> TypeDescriptor {
	primitive(ScalarKind::Float64)
}
