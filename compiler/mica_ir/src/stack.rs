//! Stack headroom for the recursive passes.
//!
//! The parser, resolver, pretty printer and flow builder all recurse once per
//! nesting level. Each recursive entry point runs through [`grow_if_needed`],
//! which switches to a freshly allocated segment when less than
//! [`HEADROOM`] bytes of stack remain.

/// Remaining stack below which a new segment is allocated.
pub const HEADROOM: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if headroom is low.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn grow_if_needed<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(HEADROOM, SEGMENT, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn grow_if_needed<R>(f: impl FnOnce() -> R) -> R {
    f()
}
