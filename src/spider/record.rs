//! Records emitted by the page handlers

use crate::url::PageKind;
use serde::{Deserialize, Serialize};
use url::Url;

/// One structured record per extracted page (or inline photo)
///
/// Serialized with an explicit `kind` tag so payloads stay self-describing
/// once they leave the crawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Record {
    UserProfile {
        url: Url,
        title: Option<String>,
        description: Option<String>,
    },
    UserJournal {
        url: Url,
        title: Option<String>,
    },
    Vehicle {
        url: Url,
        title: String,
        description: Option<String>,
        published: Option<String>,
    },
    VehicleLogbook {
        url: Url,
        title: Option<String>,
        parent: Option<Url>,
    },
    PhotoAlbum {
        url: Url,
        title: Option<String>,
        parent: Option<Url>,
    },
    Photo {
        url: Url,
        parent: Option<Url>,
        origin: Option<Url>,
    },
    PhotoPost {
        url: Url,
        description: Option<String>,
        published: Option<String>,
        author: Option<String>,
        parent: Option<Url>,
        origin: Option<Url>,
    },
    BlogPost {
        url: Url,
        title: String,
        published: Option<String>,
        content: Option<String>,
        tag: Option<String>,
        cost: Option<String>,
        mileage: Option<String>,
        parent: Option<Url>,
        origin: Option<Url>,
    },
}

impl Record {
    pub fn url(&self) -> &Url {
        match self {
            Self::UserProfile { url, .. }
            | Self::UserJournal { url, .. }
            | Self::Vehicle { url, .. }
            | Self::VehicleLogbook { url, .. }
            | Self::PhotoAlbum { url, .. }
            | Self::Photo { url, .. }
            | Self::PhotoPost { url, .. }
            | Self::BlogPost { url, .. } => url,
        }
    }

    pub fn kind(&self) -> PageKind {
        match self {
            Self::UserProfile { .. } => PageKind::UserProfile,
            Self::UserJournal { .. } => PageKind::UserJournal,
            Self::Vehicle { .. } => PageKind::Vehicle,
            Self::VehicleLogbook { .. } => PageKind::VehicleLogbook,
            Self::PhotoAlbum { .. } => PageKind::PhotoAlbum,
            Self::Photo { .. } => PageKind::Photo,
            Self::PhotoPost { .. } => PageKind::PhotoPost,
            Self::BlogPost { .. } => PageKind::BlogPost,
        }
    }

    /// The owning vehicle, for kinds that carry one
    pub fn parent(&self) -> Option<&Url> {
        match self {
            Self::VehicleLogbook { parent, .. }
            | Self::PhotoAlbum { parent, .. }
            | Self::Photo { parent, .. }
            | Self::PhotoPost { parent, .. }
            | Self::BlogPost { parent, .. } => parent.as_ref(),
            Self::UserProfile { .. } | Self::UserJournal { .. } | Self::Vehicle { .. } => None,
        }
    }

    /// The collection's first page, for kinds that carry one
    pub fn origin(&self) -> Option<&Url> {
        match self {
            Self::Photo { origin, .. }
            | Self::PhotoPost { origin, .. }
            | Self::BlogPost { origin, .. } => origin.as_ref(),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::UserProfile { title, .. }
            | Self::UserJournal { title, .. }
            | Self::VehicleLogbook { title, .. }
            | Self::PhotoAlbum { title, .. } => title.as_deref(),
            Self::Vehicle { title, .. } | Self::BlogPost { title, .. } => Some(title),
            Self::Photo { .. } | Self::PhotoPost { .. } => None,
        }
    }

    pub fn published(&self) -> Option<&str> {
        match self {
            Self::Vehicle { published, .. }
            | Self::PhotoPost { published, .. }
            | Self::BlogPost { published, .. } => published.as_deref(),
            _ => None,
        }
    }
}
