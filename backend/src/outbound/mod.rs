//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: in-memory repositories for development and tests
//! - **password**: Argon2id password hashing
//! - **avatar_storage**: avatar files on the local filesystem
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod avatar_storage;
pub mod memory;
pub mod password;
pub mod persistence;
