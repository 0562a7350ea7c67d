//! Identifiers for the media a poster is requested for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of media a poster is requested for.
///
/// The type selects the provider endpoint. Unknown values are kept verbatim
/// in [`MediaType::Other`] so they still produce stable cache keys; they
/// never resolve to a poster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    Movie,
    Episode,
    LiveEpisode,
    Other(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Movie => "movie",
            Self::Episode => "episode",
            Self::LiveEpisode => "live_episode",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for MediaType {
    fn from(s: &str) -> Self {
        match s {
            "movie" => Self::Movie,
            "episode" => Self::Episode,
            "live_episode" => Self::LiveEpisode,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for MediaType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl FromStr for MediaType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Poster size token understood by the TMDB image CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterSize {
    W92,
    W154,
    W185,
    W342,
    W500,
    W780,
    Original,
}

impl PosterSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W92 => "w92",
            Self::W154 => "w154",
            Self::W185 => "w185",
            Self::W342 => "w342",
            Self::W500 => "w500",
            Self::W780 => "w780",
            Self::Original => "original",
        }
    }

    /// Returns all size tokens, smallest first.
    pub fn all() -> &'static [PosterSize] {
        &[
            Self::W92,
            Self::W154,
            Self::W185,
            Self::W342,
            Self::W500,
            Self::W780,
            Self::Original,
        ]
    }
}

/// A size token outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown poster size '{0}' (expected one of w92, w154, w185, w342, w500, w780, original)")]
pub struct UnknownPosterSize(pub String);

impl FromStr for PosterSize {
    type Err = UnknownPosterSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| UnknownPosterSize(s.to_string()))
    }
}

impl fmt::Display for PosterSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media item a poster is requested for.
///
/// For [`MediaType::Episode`] and [`MediaType::LiveEpisode`] the identifier
/// must be the show's provider ID, not the episode's.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaReference {
    pub identifier: String,
    pub media_type: MediaType,
}

impl MediaReference {
    pub fn new(identifier: impl Into<String>, media_type: impl Into<MediaType>) -> Self {
        Self {
            identifier: identifier.into(),
            media_type: media_type.into(),
        }
    }
}
