/// Read access to an externally owned, ordered collection of byte buffers.
///
/// A value is addressed by `(buffer_index, byte_offset)`. `None` means the
/// slot exists in the addressing scheme but its buffer has not been
/// materialized (or was released). Allocation, growth and reclamation belong
/// to whoever implements this trait; the layout engine only reads through it.
pub trait BufferSource {
	/// The buffer stored at `buffer_index`, if it is materialized.
	fn array_buffer(&self, buffer_index: usize) -> Option<&[u8]>;

	/// Number of buffer slots, materialized or not.
	fn buffer_count(&self) -> usize;
}

/// Write access to the buffers of a [`BufferSource`].
pub trait BufferSourceMut: BufferSource {
	fn array_buffer_mut(&mut self, buffer_index: usize) -> Option<&mut [u8]>;
}

impl BufferSource for [Vec<u8>] {
	fn array_buffer(&self, buffer_index: usize) -> Option<&[u8]> {
		self.get(buffer_index).map(Vec::as_slice)
	}

	fn buffer_count(&self) -> usize {
		self.len()
	}
}

impl BufferSourceMut for [Vec<u8>] {
	fn array_buffer_mut(&mut self, buffer_index: usize) -> Option<&mut [u8]> {
		self.get_mut(buffer_index).map(Vec::as_mut_slice)
	}
}

impl BufferSource for Vec<Vec<u8>> {
	fn array_buffer(&self, buffer_index: usize) -> Option<&[u8]> {
		self.as_slice().array_buffer(buffer_index)
	}

	fn buffer_count(&self) -> usize {
		self.len()
	}
}

impl BufferSourceMut for Vec<Vec<u8>> {
	fn array_buffer_mut(&mut self, buffer_index: usize) -> Option<&mut [u8]> {
		self.as_mut_slice().array_buffer_mut(buffer_index)
	}
}

impl BufferSource for [Option<Vec<u8>>] {
	fn array_buffer(&self, buffer_index: usize) -> Option<&[u8]> {
		self.get(buffer_index)?.as_deref()
	}

	fn buffer_count(&self) -> usize {
		self.len()
	}
}

impl BufferSourceMut for [Option<Vec<u8>>] {
	fn array_buffer_mut(&mut self, buffer_index: usize) -> Option<&mut [u8]> {
		self.get_mut(buffer_index)?.as_deref_mut()
	}
}
