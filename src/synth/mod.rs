//! Synthesizer core
//!
//! Voice allocation ([`allocator`]), the chip registry and switching
//! protocol ([`manager`]), and the top-level message dispatcher
//! ([`dispatcher`]) that ties parser, allocator and chip together.

pub mod allocator;
pub mod dispatcher;
pub mod manager;

pub use dispatcher::Synthesizer;
pub use manager::ChipManager;
