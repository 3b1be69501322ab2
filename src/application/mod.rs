//! Application services layer.

pub mod cache;
pub mod error;
pub mod posts;
pub mod repos;
pub mod search;
