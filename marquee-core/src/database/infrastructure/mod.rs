//! Storage adapters implementing the repository ports.

pub mod memory;
pub mod postgres;
