//! Post service that keeps a Postgres record store, an in-process read cache and a search
//! index consistent.
//!
//! Postgres is the source of truth. The cache and the index are projections of it: writes go
//! to Postgres first, reads go through the cache, and the index is refreshed after every write.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
