//! Pooled memory allocation.
//!
//! Four cooperating pieces: the size-class table ([`size_class`]), the
//! fixed-size page-based allocator ([`block`]), the general-heap fallback
//! for oversized requests ([`heap`]), and the manager that routes between
//! them by request size ([`manager`]).

pub mod block;
pub mod heap;
pub mod manager;
pub mod size_class;
