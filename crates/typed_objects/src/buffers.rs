//! The buffer addressing scheme.
//!
//! Every value lives at a [`Handle`]: a buffer index selecting one physical
//! buffer out of an ordered collection, plus a byte offset inside it. When a
//! logical collection outgrows one buffer its values move to additional
//! buffers and only the index changes; the addressing shape stays the same.

use crate::BufferSource;
use crate::BufferSourceMut;
use crate::LayoutError;
use crate::LayoutResult;

/// Location of one value: which buffer, and where inside it.
///
/// A handle never owns its buffer and is only meaningful while the buffer at
/// `buffer_index` is still allocated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Handle {
	pub buffer_index: usize,
	pub byte_offset: usize,
}

impl Handle {
	/// A handle whose buffer never resolves. Empty values that were never
	/// given storage point here.
	pub const UNALLOCATED: Self = Self {
		buffer_index: usize::MAX,
		byte_offset: 0,
	};

	pub const fn new(buffer_index: usize, byte_offset: usize) -> Self {
		Self {
			buffer_index,
			byte_offset,
		}
	}

	/// The same buffer, `bytes` further in.
	pub const fn offset_by(self, bytes: usize) -> Self {
		Self {
			buffer_index: self.buffer_index,
			byte_offset: self.byte_offset + bytes,
		}
	}
}

/// A plain ordered collection of buffers where slots may be unmaterialized.
///
/// This is the simplest [`BufferSource`]: it hands out indices and never
/// moves data. Anything smarter (free lists, size classes) belongs in the
/// caller's allocator.
#[derive(Clone, Debug, Default)]
pub struct SegmentedBuffers {
	buffers: Vec<Option<Box<[u8]>>>,
}

impl SegmentedBuffers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a zero-filled buffer and returns its index.
	pub fn add_buffer(&mut self, byte_length: usize) -> usize {
		self.push(vec![0; byte_length])
	}

	/// Appends an existing buffer and returns its index.
	pub fn push(&mut self, buffer: Vec<u8>) -> usize {
		self.buffers.push(Some(buffer.into_boxed_slice()));
		self.buffers.len() - 1
	}

	/// Appends a slot with no buffer behind it yet.
	pub fn reserve_slot(&mut self) -> usize {
		self.buffers.push(None);
		self.buffers.len() - 1
	}

	/// Gives an empty slot a zero-filled buffer. Returns `false` when the slot
	/// does not exist or is already materialized.
	pub fn materialize(&mut self, buffer_index: usize, byte_length: usize) -> bool {
		match self.buffers.get_mut(buffer_index) {
			Some(slot @ None) => {
				*slot = Some(vec![0; byte_length].into_boxed_slice());
				true
			}
			_ => false,
		}
	}

	/// Takes the buffer out of its slot. The index stays reserved so other
	/// handles keep their meaning.
	pub fn release(&mut self, buffer_index: usize) -> Option<Box<[u8]>> {
		self.buffers.get_mut(buffer_index)?.take()
	}

	pub fn is_materialized(&self, buffer_index: usize) -> bool {
		self.array_buffer(buffer_index).is_some()
	}
}

impl From<Vec<Vec<u8>>> for SegmentedBuffers {
	fn from(buffers: Vec<Vec<u8>>) -> Self {
		Self {
			buffers: buffers
				.into_iter()
				.map(|buffer| Some(buffer.into_boxed_slice()))
				.collect(),
		}
	}
}

impl BufferSource for SegmentedBuffers {
	fn array_buffer(&self, buffer_index: usize) -> Option<&[u8]> {
		self.buffers.get(buffer_index)?.as_deref()
	}

	fn buffer_count(&self) -> usize {
		self.buffers.len()
	}
}

impl BufferSourceMut for SegmentedBuffers {
	fn array_buffer_mut(&mut self, buffer_index: usize) -> Option<&mut [u8]> {
		self.buffers.get_mut(buffer_index)?.as_deref_mut()
	}
}

/// Resolves `len` bytes at `handle`.
pub fn try_bytes(buffers: &dyn BufferSource, handle: Handle, len: usize) -> LayoutResult<&[u8]> {
	let buffer = buffers
		.array_buffer(handle.buffer_index)
		.ok_or(LayoutError::BufferNotAllocated {
			buffer_index: handle.buffer_index,
		})?;

	handle
		.byte_offset
		.checked_add(len)
		.and_then(|end| buffer.get(handle.byte_offset..end))
		.ok_or(LayoutError::OutOfBounds {
			buffer_index: handle.buffer_index,
			byte_offset: handle.byte_offset,
			len,
		})
}

/// Resolves `len` writable bytes at `handle`.
pub fn try_bytes_mut(
	buffers: &mut dyn BufferSourceMut,
	handle: Handle,
	len: usize,
) -> LayoutResult<&mut [u8]> {
	let buffer = buffers
		.array_buffer_mut(handle.buffer_index)
		.ok_or(LayoutError::BufferNotAllocated {
			buffer_index: handle.buffer_index,
		})?;

	handle
		.byte_offset
		.checked_add(len)
		.and_then(|end| buffer.get_mut(handle.byte_offset..end))
		.ok_or(LayoutError::OutOfBounds {
			buffer_index: handle.buffer_index,
			byte_offset: handle.byte_offset,
			len,
		})
}

/// Like [`try_bytes`], but addressing outside an allocated buffer is a caller
/// bug and panics.
#[track_caller]
pub(crate) fn bytes(buffers: &dyn BufferSource, handle: Handle, len: usize) -> &[u8] {
	match try_bytes(buffers, handle, len) {
		Ok(bytes) => bytes,
		Err(err) => panic!("{err}"),
	}
}

#[track_caller]
pub(crate) fn bytes_mut(
	buffers: &mut dyn BufferSourceMut,
	handle: Handle,
	len: usize,
) -> &mut [u8] {
	match try_bytes_mut(buffers, handle, len) {
		Ok(bytes) => bytes,
		Err(err) => panic!("{err}"),
	}
}

/// Copies `len` bytes from `source` to `target`. The ranges may overlap or
/// live in different buffers.
pub(crate) fn copy_bytes(
	buffers: &mut dyn BufferSourceMut,
	source: Handle,
	target: Handle,
	len: usize,
) -> LayoutResult<()> {
	if len == 0 {
		return Ok(());
	}

	if source.buffer_index == target.buffer_index {
		// Validate both ranges before moving anything.
		try_bytes(&*buffers, source, len)?;
		try_bytes(&*buffers, target, len)?;
		if let Some(buffer) = buffers.array_buffer_mut(source.buffer_index) {
			buffer.copy_within(source.byte_offset..source.byte_offset + len, target.byte_offset);
		}
		return Ok(());
	}

	let staged = try_bytes(&*buffers, source, len)?.to_vec();
	try_bytes_mut(buffers, target, len)?.copy_from_slice(&staged);
	Ok(())
}
