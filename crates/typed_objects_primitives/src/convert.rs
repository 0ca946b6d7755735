//! Number conversions applied when a scalar is stored into a typed view.
//!
//! These follow the typed-array store rules: integer kinds truncate toward
//! zero and wrap modulo their bit width, the clamped byte saturates and rounds
//! half to even, and non-finite input stores as zero for every integer kind.

const TWO_POW_32: f64 = 4_294_967_296.0;

/// Truncates `value` toward zero and reduces it modulo 2^32.
pub fn to_uint32(value: f64) -> u32 {
	if !value.is_finite() {
		return 0;
	}

	// `%` keeps the sign of the dividend, so the remainder lies strictly inside
	// (-2^32, 2^32) and fits an `i64` without saturating.
	let reduced = value % TWO_POW_32;
	(reduced as i64) as u32
}

pub fn to_int32(value: f64) -> i32 {
	to_uint32(value) as i32
}

pub fn to_uint16(value: f64) -> u16 {
	to_uint32(value) as u16
}

pub fn to_int16(value: f64) -> i16 {
	to_uint16(value) as i16
}

pub fn to_uint8(value: f64) -> u8 {
	to_uint32(value) as u8
}

pub fn to_int8(value: f64) -> i8 {
	to_uint8(value) as i8
}

/// Saturates `value` into `0..=255`, rounding ties to the even neighbour.
pub fn to_uint8_clamp(value: f64) -> u8 {
	if value.is_nan() || value <= 0.0 {
		return 0;
	}

	if value >= 255.0 {
		return u8::MAX;
	}

	let floor = value as u8;
	let fraction = value - f64::from(floor);
	if fraction > 0.5 || (fraction == 0.5 && floor % 2 == 1) {
		floor + 1
	} else {
		floor
	}
}

/// Rounds to the nearest representable `f32`.
pub fn to_float32(value: f64) -> f32 {
	value as f32
}
