#[cfg(feature = "logs")]
use core::panic::Location;

use crate::LayoutError;
use crate::LayoutResult;
use crate::log;

/// Position of the highest set bit, `0` for `0` and `1`.
///
/// ```
/// assert_eq!(typed_objects::ilog2(1), 0);
/// assert_eq!(typed_objects::ilog2(8), 3);
/// assert_eq!(typed_objects::ilog2(12), 3);
/// ```
pub const fn ilog2(num: usize) -> u32 {
	if num == 0 { 0 } else { num.ilog2() }
}

/// Rounds up to the next power of two. `0` stays `0`.
///
/// ```
/// assert_eq!(typed_objects::next_pow2(0), 0);
/// assert_eq!(typed_objects::next_pow2(5), 8);
/// assert_eq!(typed_objects::next_pow2(16), 16);
/// ```
pub const fn next_pow2(num: usize) -> usize {
	if num == 0 { 0 } else { num.next_power_of_two() }
}

/// Returns `err` when `condition` is false, logging `msg` and the caller
/// location first.
///
/// Used for every shape check performed while building types or values.
///
/// ```
/// use typed_objects::LayoutError;
///
/// typed_objects::ensure(true, LayoutError::BufferNotAllocated { buffer_index: 0 }, "ok")
/// 	.unwrap_or_else(|e| panic!("unexpected: {e}"));
///
/// let result = typed_objects::ensure(
/// 	false,
/// 	LayoutError::BufferNotAllocated { buffer_index: 3 },
/// 	"buffer missing",
/// );
/// assert_eq!(result, Err(LayoutError::BufferNotAllocated { buffer_index: 3 }));
/// ```
#[track_caller]
#[inline(always)]
pub fn ensure(condition: bool, err: LayoutError, msg: &str) -> LayoutResult<()> {
	if condition {
		Ok(())
	} else {
		#[cfg(not(feature = "logs"))]
		let _ = msg;

		log!("{}: {}", msg, err);
		log_caller();
		Err(err)
	}
}

/// Logs caller file/line/column when the `logs` feature is enabled.
#[cfg(feature = "logs")]
#[track_caller]
#[inline(always)]
pub fn log_caller() {
	let caller = Location::caller();
	log!(
		"location: {}:{}:{}",
		caller.file(),
		caller.line(),
		caller.column()
	);
}

/// No-op variant used when the `logs` feature is disabled.
#[cfg(not(feature = "logs"))]
#[inline(always)]
pub fn log_caller() {}
