//! Assigns a stable, dense integer id to each component type on first use.
//!
//! Each monomorphization of `component_id::<T>` gets its own `OnceLock`, so
//! the first call for a given `T` mints a fresh id from the shared counter
//! and every later call for that same `T` returns the cached value.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

pub fn component_id<T: 'static>() -> u32 {
    static CELL: OnceLock<u32> = OnceLock::new();
    *CELL.get_or_init(|| NEXT_ID.fetch_add(1, Ordering::Relaxed))
}
