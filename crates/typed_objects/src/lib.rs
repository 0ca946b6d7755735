#![allow(clippy::inline_always)]

//! Fixed-layout typed values stored in externally owned byte buffers.
//!
//! A [`TypeDescriptor`] describes a storage shape: a scalar from the
//! primitive registry, an array of another type, the UTF-16 [`string`] type
//! or a struct of named fields. Values are addressed by a [`Handle`] (buffer
//! index plus byte offset) into a [`BufferSource`], so a handle and a
//! descriptor are all that is needed to read or write every field.
//!
//! ```
//! use typed_objects::ArrayOptions;
//! use typed_objects::ArraySource;
//! use typed_objects::Handle;
//! use typed_objects::SegmentedBuffers;
//!
//! let mut buffers = SegmentedBuffers::new();
//! let index = buffers.add_buffer(16);
//! let array_type = typed_objects::uint16()
//! 	.array(ArrayOptions::builder().capacity(5).build())
//! 	.unwrap_or_else(|e| panic!("{e}"));
//! let value = array_type
//! 	.create(&mut buffers, Handle::new(index, 0), 5, ArraySource::Length(5))
//! 	.unwrap_or_else(|e| panic!("{e}"));
//!
//! for (i, n) in [10, 20, 30, 40, 50].into_iter().enumerate() {
//! 	value.set(&mut buffers, i, n).unwrap_or_else(|e| panic!("{e}"));
//! }
//! let third = value.get(&buffers, 2).unwrap_or_else(|e| panic!("{e}"));
//! assert_eq!(third.as_number(), Some(30.0));
//! assert_eq!(value.byte_span(), 10);
//! ```

mod buffers;
mod error;
mod traits;
mod types;
mod utils;

pub use bytemuck;
#[cfg(feature = "logs")]
#[doc(hidden)]
pub use ::log as __log;
pub use typed_builder;
pub use typed_objects_primitives::*;

pub use crate::buffers::Handle;
pub use crate::buffers::SegmentedBuffers;
pub use crate::buffers::try_bytes;
pub use crate::buffers::try_bytes_mut;
pub use crate::error::*;
pub use crate::traits::*;
pub use crate::types::*;
pub use crate::utils::*;

#[cfg(feature = "logs")]
#[macro_export]
macro_rules! log {
	($($arg:tt)*) => {
		$crate::__log::debug!($($arg)*);
	};
}

#[cfg(not(feature = "logs"))]
#[macro_export]
macro_rules! log {
	($($arg:tt)*) => {};
}

/// Make sure all traits are available.
pub mod prelude {
	pub use crate::traits::*;
	pub use crate::types::ArrayExtension;
	pub use typed_objects_primitives::Scalar;
}
