use typed_objects::ArrayOptions;
use typed_objects::ArraySource;
use typed_objects::ArrayType;
use typed_objects::Handle;
use typed_objects::LayoutError;
use typed_objects::PodU16;
use typed_objects::SegmentedBuffers;
use typed_objects::StructType;
use typed_objects::Value;
use typed_objects::float64;
use typed_objects::int32;
use typed_objects::uint8;
use typed_objects::uint16;

fn fixed(component: &typed_objects::TypeDescriptor, capacity: usize) -> ArrayType {
	component
		.array(ArrayOptions::builder().capacity(capacity).build())
		.unwrap_or_else(|e| panic!("array type: {e}"))
}

fn unbounded(component: &typed_objects::TypeDescriptor) -> ArrayType {
	component
		.array(ArrayOptions::default())
		.unwrap_or_else(|e| panic!("array type: {e}"))
}

#[test]
fn uint16_array_end_to_end() {
	let mut buffers = SegmentedBuffers::new();
	let index = buffers.add_buffer(16);
	let ty = fixed(&uint16(), 5);
	assert_eq!(ty.name(), "uint16[5]");
	assert_eq!(ty.descriptor().byte_length(), 10);

	let value = ty
		.create(&mut buffers, Handle::new(index, 0), 5, ArraySource::Length(5))
		.unwrap_or_else(|e| panic!("create: {e}"));
	for (i, n) in [10, 20, 30, 40, 50].into_iter().enumerate() {
		value
			.set(&mut buffers, i, n)
			.unwrap_or_else(|e| panic!("set {i}: {e}"));
	}

	assert_eq!(value.get(&buffers, 2), Ok(Value::Number(30.0)));
	assert_eq!(value.byte_span(), 10);
	assert_eq!(value.len(), 5);
	let scalars = value
		.read_scalars::<PodU16>(&buffers)
		.unwrap_or_else(|e| panic!("read: {e}"));
	let numbers: Vec<u16> = scalars.into_iter().map(u16::from).collect();
	assert_eq!(numbers, [10, 20, 30, 40, 50]);
}

#[test]
fn element_address_is_base_plus_stride() {
	let ty = unbounded(&float64());
	assert_eq!(ty.element_shift(), 3);
	for index in 0..10 {
		assert_eq!(ty.element_address(24, index), 24 + index * 8);
	}
	assert_eq!(ty.byte_span(3), 24);
}

#[test]
fn distinct_indices_do_not_alias() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 32]]);
	let ty = unbounded(&int32());
	let value = ty
		.create(&mut buffers, Handle::new(0, 4), 6, ArraySource::Length(6))
		.unwrap_or_else(|e| panic!("create: {e}"));

	for written in 0..6 {
		value
			.set(&mut buffers, written, -1)
			.unwrap_or_else(|e| panic!("set: {e}"));
		for read in (0..6).filter(|read| *read != written) {
			assert_eq!(value.get(&buffers, read), Ok(Value::Number(0.0)));
		}
		value
			.set(&mut buffers, written, 0)
			.unwrap_or_else(|e| panic!("reset: {e}"));
	}
}

#[test]
fn arrays_thread_the_buffer_index() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0xFF; 4], vec![0xFF; 4]]);
	let ty = unbounded(&uint8());
	let value = ty
		.create(&mut buffers, Handle::new(1, 1), 2, ArraySource::Length(2))
		.unwrap_or_else(|e| panic!("create: {e}"));
	value
		.set(&mut buffers, 1, 7)
		.unwrap_or_else(|e| panic!("set: {e}"));

	assert_eq!(
		value.get_array_buffer(&buffers),
		Some(&[0xFF, 0, 7, 0xFF][..])
	);
	assert_eq!(
		typed_objects::try_bytes(&buffers, Handle::new(0, 0), 4),
		Ok(&[0xFF; 4][..])
	);
}

#[test]
fn bad_lengths_are_rejected() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 8]]);
	let ty = unbounded(&uint16());

	let negative = ty.create(&mut buffers, Handle::new(0, 0), 4, ArraySource::Length(-1));
	assert!(matches!(negative, Err(LayoutError::InvalidLength { .. })));

	let too_long = ty.create(&mut buffers, Handle::new(0, 0), 4, ArraySource::Length(5));
	assert_eq!(
		too_long,
		Err(LayoutError::CapacityExceeded {
			requested: 5,
			capacity: 4
		})
	);

	assert!(ArraySource::from_length(f64::NAN).is_err());
	assert!(ArraySource::from_length(-0.5).is_err());
}

#[test]
fn out_of_range_index_is_rejected() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 8]]);
	let value = unbounded(&uint16())
		.create(&mut buffers, Handle::new(0, 0), 4, ArraySource::Length(2))
		.unwrap_or_else(|e| panic!("create: {e}"));

	assert_eq!(
		value.get(&buffers, 2),
		Err(LayoutError::IndexOutOfBounds {
			index: 2,
			length: 2
		})
	);
	assert!(value.set(&mut buffers, 3, 1).is_err());
}

#[test]
fn misaligned_storage_is_rejected() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 8]]);
	let result = unbounded(&int32()).create(&mut buffers, Handle::new(0, 2), 1, ArraySource::Empty);
	assert_eq!(
		result,
		Err(LayoutError::Misaligned {
			byte_offset: 2,
			alignment: 4
		})
	);
}

#[test]
fn copies_clamp_to_the_source() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 32]]);
	let ty = unbounded(&uint16());
	let source = ty
		.create(&mut buffers, Handle::new(0, 0), 4, ArraySource::Length(4))
		.unwrap_or_else(|e| panic!("create: {e}"));
	for i in 0..4 {
		source
			.set(&mut buffers, i, i as f64 + 1.0)
			.unwrap_or_else(|e| panic!("set: {e}"));
	}

	let copy = ty
		.create(
			&mut buffers,
			Handle::new(0, 16),
			8,
			ArraySource::copy_slice(&source, 1, Some(10)),
		)
		.unwrap_or_else(|e| panic!("copy: {e}"));
	assert_eq!(copy.len(), 3);
	assert_eq!(
		copy.to_values(&buffers),
		Ok(vec![
			Value::Number(2.0),
			Value::Number(3.0),
			Value::Number(4.0)
		])
	);
}

#[test]
fn incompatible_copy_is_rejected() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 32]]);
	let source = unbounded(&uint8())
		.create(&mut buffers, Handle::new(0, 0), 4, ArraySource::Length(4))
		.unwrap_or_else(|e| panic!("create: {e}"));

	let result = unbounded(&uint16()).create(
		&mut buffers,
		Handle::new(0, 16),
		4,
		ArraySource::copy(&source),
	);
	assert!(matches!(result, Err(LayoutError::IncompatibleSource { .. })));

	let text = unbounded(&uint16()).create(
		&mut buffers,
		Handle::new(0, 16),
		4,
		ArraySource::text("abc"),
	);
	assert!(matches!(text, Err(LayoutError::IncompatibleSource { .. })));
}

#[test]
fn set_length_grows_and_shrinks_within_capacity() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 16]]);
	let mut value = unbounded(&uint16())
		.create(&mut buffers, Handle::new(0, 0), 4, ArraySource::Empty)
		.unwrap_or_else(|e| panic!("create: {e}"));
	assert!(value.is_empty());

	value
		.set_length(&mut buffers, 3)
		.unwrap_or_else(|e| panic!("grow: {e}"));
	value
		.set(&mut buffers, 2, 9)
		.unwrap_or_else(|e| panic!("set: {e}"));
	value
		.set_length(&mut buffers, 2)
		.unwrap_or_else(|e| panic!("shrink: {e}"));
	value
		.set_length(&mut buffers, 3)
		.unwrap_or_else(|e| panic!("regrow: {e}"));

	assert_eq!(value.get(&buffers, 2), Ok(Value::Number(0.0)));
	assert!(value.set_length(&mut buffers, 5).is_err());
	assert_eq!(value.len(), 3);
}

#[test]
fn nested_arrays_use_the_inner_stride() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 64]]);
	let row = fixed(&uint16(), 4);
	let grid = fixed(row.descriptor(), 3);
	assert_eq!(grid.name(), "uint16[4][3]");
	assert_eq!(grid.element_shift(), 3);
	assert_eq!(grid.descriptor().byte_length(), 24);

	let value = grid
		.create(&mut buffers, Handle::new(0, 8), 3, ArraySource::Length(3))
		.unwrap_or_else(|e| panic!("create: {e}"));
	let second = value
		.get(&buffers, 1)
		.unwrap_or_else(|e| panic!("get row: {e}"));
	let second = second
		.as_array()
		.unwrap_or_else(|| panic!("row is not an array"));
	assert_eq!(second.handle(), Handle::new(0, 16));
	assert_eq!(second.len(), 4);
	second
		.set(&mut buffers, 3, 77)
		.unwrap_or_else(|e| panic!("set cell: {e}"));

	assert_eq!(
		typed_objects::try_bytes(&buffers, Handle::new(0, 22), 2),
		Ok(&[77, 0][..])
	);
}

#[test]
fn assigning_an_inline_array_copies_and_resets() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 64]]);
	let row = fixed(&uint16(), 4);
	let grid = fixed(row.descriptor(), 2);
	let value = grid
		.create(&mut buffers, Handle::new(0, 0), 2, ArraySource::Length(2))
		.unwrap_or_else(|e| panic!("create: {e}"));

	let short = unbounded(&uint16())
		.create(&mut buffers, Handle::new(0, 32), 2, ArraySource::Length(2))
		.unwrap_or_else(|e| panic!("create short: {e}"));
	short
		.set(&mut buffers, 0, 5)
		.unwrap_or_else(|e| panic!("set: {e}"));
	short
		.set(&mut buffers, 1, 6)
		.unwrap_or_else(|e| panic!("set: {e}"));
	buffers_fill_row(&mut buffers, &value);

	value
		.set(&mut buffers, 0, short)
		.unwrap_or_else(|e| panic!("assign: {e}"));
	let row = value
		.get(&buffers, 0)
		.unwrap_or_else(|e| panic!("get: {e}"));
	let cells = row
		.as_array()
		.map(|row| row.to_values(&buffers))
		.unwrap_or_else(|| panic!("row is not an array"));
	assert_eq!(
		cells,
		Ok(vec![
			Value::Number(5.0),
			Value::Number(6.0),
			Value::Number(0.0),
			Value::Number(0.0)
		])
	);
}

fn buffers_fill_row(buffers: &mut SegmentedBuffers, grid: &typed_objects::ArrayValue) {
	let row = grid
		.get(&*buffers, 0)
		.unwrap_or_else(|e| panic!("get: {e}"));
	let row = row
		.as_array()
		.unwrap_or_else(|| panic!("row is not an array"));
	for i in 0..4 {
		row.set(buffers, i, 99)
			.unwrap_or_else(|e| panic!("fill: {e}"));
	}
}

#[test]
fn invalid_components_are_rejected() {
	let three_bytes = StructType::builder()
		.name("rgb")
		.field("r", &uint8())
		.field("g", &uint8())
		.field("b", &uint8())
		.build()
		.unwrap_or_else(|e| panic!("struct: {e}"));
	assert_eq!(three_bytes.byte_length(), 3);
	assert_eq!(three_bytes.descriptor().reference_length(), 4);
	assert!(three_bytes.array(ArrayOptions::default()).is_ok());

	let row = fixed(&uint8(), 3);
	assert_eq!(
		row.array(ArrayOptions::default()),
		Err(LayoutError::NonPowerOfTwoWidth {
			name: "uint8[3]".to_owned(),
			width: 3
		})
	);

	let open = unbounded(&uint16());
	assert_eq!(
		open.array(ArrayOptions::default()),
		Err(LayoutError::UnsizedComponent {
			name: "uint16[]".to_owned()
		})
	);
}

#[test]
fn custom_names_are_kept() {
	let ty = uint16()
		.array(ArrayOptions::builder().name("ports").capacity(2).build())
		.unwrap_or_else(|e| panic!("array type: {e}"));
	assert_eq!(ty.name(), "ports");
	assert_eq!(ty.capacity(), Some(2));
}

#[test]
fn capacities_past_the_address_space_are_rejected() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 16]]);
	let wide = unbounded(&uint16()).create(
		&mut buffers,
		Handle::new(0, 0),
		usize::MAX,
		ArraySource::Empty,
	);
	assert_eq!(
		wide,
		Err(LayoutError::CapacityExceeded {
			requested: usize::MAX,
			capacity: usize::MAX >> 1
		})
	);

	let mut narrow = unbounded(&uint8())
		.create(&mut buffers, Handle::new(0, 0), usize::MAX, ArraySource::Empty)
		.unwrap_or_else(|e| panic!("create: {e}"));
	let huge = usize::MAX / 2 + 3;
	assert!(matches!(
		narrow.set_length(&mut buffers, huge),
		Err(LayoutError::OutOfBounds { .. })
	));
	assert!(narrow.is_empty());
}

#[test]
fn storage_released_under_an_array_is_reported() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 16]]);
	let value = unbounded(&int32())
		.create(&mut buffers, Handle::new(0, 0), 4, ArraySource::Length(4))
		.unwrap_or_else(|e| panic!("create: {e}"));

	let _ = buffers.release(0);
	assert_eq!(
		value.get(&buffers, 1),
		Err(LayoutError::BufferNotAllocated { buffer_index: 0 })
	);

	assert!(buffers.materialize(0, 4));
	assert_eq!(value.get(&buffers, 0), Ok(Value::Number(0.0)));
	assert_eq!(
		value.get(&buffers, 1),
		Err(LayoutError::OutOfBounds {
			buffer_index: 0,
			byte_offset: 4,
			len: 4
		})
	);
	assert!(matches!(
		value.set(&mut buffers, 3, 1),
		Err(LayoutError::OutOfBounds { .. })
	));
}
