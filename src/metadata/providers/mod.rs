//! Concrete poster provider implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`PosterProvider`](super::PosterProvider) trait.

pub mod tmdb;

pub use tmdb::TmdbProvider;
