//! Core trait abstractions.

pub mod fetch_tier;
pub mod fixtures;
pub mod repository;

pub use fetch_tier::FetchTier;
pub use fixtures::{FixtureProvider, NoFixtures};
pub use repository::{KnowledgeRepository, UpsertOutcome};
