//! Global memory allocator configuration.
//!
//! Uses `mimalloc` in place of the system allocator; chunk buffers are
//! allocated and released once per chunk, which mimalloc handles with less
//! fragmentation.

use mimalloc::MiMalloc;

/// The global allocator instance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
