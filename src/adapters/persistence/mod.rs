//! Local persistence adapters.

pub mod memory_repo;

pub use memory_repo::InMemoryQuotationRepository;
