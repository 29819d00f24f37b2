//! Configuration for the yumrepo metadata reader.
//!
//! A [`config::Config`] is loaded once from TOML and resolved into an immutable
//! [`config::CacheSettings`] that is passed to whatever needs the cache policy.

pub mod annotations;
pub mod config;
pub mod error;
pub mod repository;
