//! Knowledge store implementations.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryRepository;

#[cfg(feature = "postgres")]
pub use postgres::PostgresRepository;
