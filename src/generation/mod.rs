//! Party allocation and invoice emission.

pub mod allocator;
pub mod config;
pub mod emitter;
