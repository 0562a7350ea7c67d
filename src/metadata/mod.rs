//! Poster lookups against external metadata services.
//!
//! # Module layout
//!
//! - [`media`] -- Media types, poster sizes and media references.
//! - [`provider`] -- The [`PosterProvider`] trait.
//! - [`providers`] -- Concrete provider implementations (TMDB).

pub mod media;
pub mod provider;
pub mod providers;

pub use media::{MediaReference, MediaType, PosterSize, UnknownPosterSize};
pub use provider::PosterProvider;
pub use providers::TmdbProvider;
