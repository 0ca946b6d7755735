use typed_objects::BufferSource;
use typed_objects::LayoutError;
use typed_objects::ScalarKind;
use typed_objects::SegmentedBuffers;
use typed_objects::Value;
use typed_objects::primitive;

fn store_and_load(kind: ScalarKind, value: f64) -> f64 {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 16], vec![0; 16]]);
	let ty = primitive(kind);
	ty.create_setter(8)
		.set(&mut buffers, 1, 0, value)
		.unwrap_or_else(|e| panic!("set {}: {e}", kind.name()));
	ty.create_getter(8)
		.get(&buffers, 1, 0)
		.as_number()
		.unwrap_or_else(|| panic!("{} read back a non-number", kind.name()))
}

#[test]
fn clamped_byte_saturates() {
	assert_eq!(store_and_load(ScalarKind::Uint8Clamped, 300.0), 255.0);
	assert_eq!(store_and_load(ScalarKind::Uint8Clamped, -4.0), 0.0);
	assert_eq!(store_and_load(ScalarKind::Uint8Clamped, 2.5), 2.0);
	assert_eq!(store_and_load(ScalarKind::Uint8Clamped, 3.5), 4.0);
}

#[test]
fn integers_wrap_to_their_width() {
	assert_eq!(store_and_load(ScalarKind::Uint16, 65_537.0), 1.0);
	assert_eq!(store_and_load(ScalarKind::Int16, 32_768.0), -32_768.0);
	assert_eq!(store_and_load(ScalarKind::Uint8, 257.0), 1.0);
	assert_eq!(store_and_load(ScalarKind::Int8, -129.0), 127.0);
	assert_eq!(store_and_load(ScalarKind::Uint32, -1.0), 4_294_967_295.0);
	assert_eq!(store_and_load(ScalarKind::Int32, 2_147_483_648.0), -2_147_483_648.0);
}

#[test]
fn integers_truncate_toward_zero() {
	assert_eq!(store_and_load(ScalarKind::Int32, -7.9), -7.0);
	assert_eq!(store_and_load(ScalarKind::Uint16, 7.9), 7.0);
	assert_eq!(store_and_load(ScalarKind::Uint32, f64::NAN), 0.0);
	assert_eq!(store_and_load(ScalarKind::Int8, f64::INFINITY), 0.0);
}

#[test]
fn floats_keep_their_precision() {
	assert_eq!(store_and_load(ScalarKind::Float32, 0.1), f64::from(0.1f32));
	assert_eq!(store_and_load(ScalarKind::Float64, 0.1), 0.1);
	assert!(store_and_load(ScalarKind::Float64, f64::NAN).is_nan());
}

#[test]
fn fresh_storage_reads_initial_value() {
	let buffers = SegmentedBuffers::from(vec![vec![0; 8]]);
	for kind in ScalarKind::ALL {
		let ty = primitive(kind);
		assert_eq!(ty.create_getter(0).get(&buffers, 0, 0), Value::Number(0.0));
		assert_eq!(ty.initial_value(), Some(Value::Number(0.0)));
	}
}

#[test]
fn buffer_index_selects_the_buffer() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 4], vec![0; 4]]);
	let ty = typed_objects::uint16();
	ty.create_setter(2)
		.set(&mut buffers, 1, 0, 513)
		.unwrap_or_else(|e| panic!("set: {e}"));

	assert_eq!(buffers.array_buffer(0), Some(&[0, 0, 0, 0][..]));
	assert_eq!(buffers.array_buffer(1), Some(&[0, 0, 1, 2][..]));
}

#[test]
fn try_accessors_report_out_of_bounds() {
	let mut buffers = SegmentedBuffers::from(vec![vec![0; 4]]);
	let ty = typed_objects::float64();
	assert_eq!(
		ty.create_getter(0).try_get(&buffers, 0, 0),
		Err(LayoutError::OutOfBounds {
			buffer_index: 0,
			byte_offset: 0,
			len: 8
		})
	);
	assert!(ty.create_setter(0).try_set(&mut buffers, 0, 0, 1.0).is_err());
}

#[test]
#[should_panic(expected = "exceed buffer 0")]
fn unchecked_get_panics_out_of_bounds() {
	let buffers = SegmentedBuffers::from(vec![vec![0; 4]]);
	let _ = typed_objects::uint32().create_getter(4).get(&buffers, 0, 0);
}
