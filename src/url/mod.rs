//! URL handling module for Drivelog
//!
//! This module classifies site URLs into page kinds by the shape of their
//! path, and provides link normalization and host helpers used while
//! routing discovered links.

mod domain;
mod normalize;
mod patterns;

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_site};
pub use normalize::{normalize_url, visit_key};
pub use patterns::{PathShape, Segment, Tail, RULES};

/// What a fetched page represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    /// A user's profile page, listing vehicles and albums
    UserProfile,
    /// A user's personal blog listing
    UserJournal,
    /// A vehicle page
    Vehicle,
    /// A vehicle's logbook listing
    VehicleLogbook,
    /// A photo album listing
    PhotoAlbum,
    /// A single image; emitted inline, never fetched
    Photo,
    /// A page showing one photo with its caption
    PhotoPost,
    /// A logbook entry or personal blog post
    BlogPost,
}

impl PageKind {
    /// Every kind, in declaration order
    pub const ALL: [PageKind; 8] = [
        Self::UserProfile,
        Self::UserJournal,
        Self::Vehicle,
        Self::VehicleLogbook,
        Self::PhotoAlbum,
        Self::Photo,
        Self::PhotoPost,
        Self::BlogPost,
    ];

    /// Returns true for kinds whose pages form a paginated collection
    pub fn is_paginated(&self) -> bool {
        matches!(
            self,
            Self::UserProfile | Self::UserJournal | Self::PhotoAlbum | Self::VehicleLogbook
        )
    }

    /// Returns true for the user's top-level listings
    pub fn is_listing(&self) -> bool {
        matches!(self, Self::UserProfile | Self::UserJournal)
    }

    /// Returns true for entities that start their own context when reached
    /// from a listing
    pub fn is_owning_entity(&self) -> bool {
        matches!(self, Self::Vehicle | Self::PhotoAlbum)
    }

    /// Returns true for kinds a vehicle page owns
    pub fn is_owned_by_vehicle(&self) -> bool {
        matches!(self, Self::VehicleLogbook | Self::PhotoAlbum | Self::Photo)
    }

    /// Converts the kind to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::UserProfile => "UserProfile",
            Self::UserJournal => "UserJournal",
            Self::Vehicle => "Vehicle",
            Self::VehicleLogbook => "VehicleLogbook",
            Self::PhotoAlbum => "PhotoAlbum",
            Self::Photo => "Photo",
            Self::PhotoPost => "PhotoPost",
            Self::BlogPost => "BlogPost",
        }
    }

    /// Parses a kind from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.to_db_string() == s)
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// Classifies a URL by the shape of its path
///
/// Scheme, host, query and fragment are ignored. Rules are evaluated in
/// the fixed order of [`RULES`] and the first match wins.
///
/// # Examples
///
/// ```
/// use drivelog::url::{classify, PageKind};
/// use url::Url;
///
/// let url = Url::parse("https://www.drive2.ru/r/john/mycar/42/logbook").unwrap();
/// assert_eq!(classify(&url), Some(PageKind::VehicleLogbook));
///
/// let url = Url::parse("https://www.drive2.ru/about/").unwrap();
/// assert_eq!(classify(&url), None);
/// ```
pub fn classify(url: &Url) -> Option<PageKind> {
    classify_path(url.path())
}

/// Classifies a bare path such as `/s/a/Xyz123`
pub fn classify_path(path: &str) -> Option<PageKind> {
    RULES
        .iter()
        .find(|(shape, _)| shape.matches(path))
        .map(|(_, kind)| *kind)
}
