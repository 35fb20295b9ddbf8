//! Path shapes the classifier matches against
//!
//! A shape is a fixed sequence of segment matchers plus two switches: whether
//! a slash must follow the last matched segment, and whether anything may
//! come after it. Matching only ever looks at the path component.

use super::PageKind;

/// One path segment matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Exactly this text
    Literal(&'static str),
    /// `[a-z0-9_]+`
    Slug,
    /// `[A-Za-z0-9_.-]+`
    Name,
    /// `[0-9]+`
    Digits,
    /// `[A-Za-z0-9]+`
    Alnum,
}

impl Segment {
    fn matches(&self, part: &str) -> bool {
        if part.is_empty() {
            return false;
        }
        match self {
            Self::Literal(text) => part == *text,
            Self::Slug => part
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'),
            Self::Name => part
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-')),
            Self::Digits => part.bytes().all(|b| b.is_ascii_digit()),
            Self::Alnum => part.bytes().all(|b| b.is_ascii_alphanumeric()),
        }
    }
}

/// What may follow the last matched segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// Exactly one trailing slash and nothing else
    Slash,
    /// Nothing, or a single trailing slash
    OptionalSlash,
    /// Anything at all (prefix match)
    Open,
}

/// A path shape
#[derive(Debug, Clone, Copy)]
pub struct PathShape {
    pub segments: &'static [Segment],
    pub tail: Tail,
}

impl PathShape {
    /// Checks a URL path such as `/r/bmw/x5/42/` against this shape
    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() < self.segments.len() {
            return false;
        }

        let (head, remainder) = parts.split_at(self.segments.len());
        if !self
            .segments
            .iter()
            .zip(head)
            .all(|(segment, part)| segment.matches(part))
        {
            return false;
        }

        // `remainder` is what follows the last segment, split on '/'. A single
        // empty element means exactly one trailing slash.
        match self.tail {
            Tail::Slash => remainder == [""],
            Tail::OptionalSlash => remainder.is_empty() || remainder == [""],
            Tail::Open => true,
        }
    }
}

use Segment::{Alnum, Digits, Literal, Name, Slug};

/// The ordered classification table
///
/// Earlier rules win. The logbook shape sits before the vehicle shape it
/// extends, and the album shape sits before the broader photo post shape
/// (`/s/a/X` is also a valid `/s/<alnum>` prefix).
pub const RULES: &[(PathShape, PageKind)] = &[
    (
        PathShape {
            segments: &[Literal("r"), Slug, Slug, Digits, Literal("logbook")],
            tail: Tail::OptionalSlash,
        },
        PageKind::VehicleLogbook,
    ),
    (
        PathShape {
            segments: &[Literal("r"), Slug, Slug, Digits],
            tail: Tail::Slash,
        },
        PageKind::Vehicle,
    ),
    (
        PathShape {
            segments: &[Literal("s"), Literal("a"), Alnum],
            tail: Tail::Open,
        },
        PageKind::PhotoAlbum,
    ),
    (
        PathShape {
            segments: &[Literal("s"), Alnum],
            tail: Tail::Open,
        },
        PageKind::PhotoPost,
    ),
    (
        PathShape {
            segments: &[Literal("l"), Digits],
            tail: Tail::OptionalSlash,
        },
        PageKind::BlogPost,
    ),
    (
        PathShape {
            segments: &[Literal("b"), Digits],
            tail: Tail::OptionalSlash,
        },
        PageKind::BlogPost,
    ),
    (
        PathShape {
            segments: &[Literal("users"), Name, Literal("blog")],
            tail: Tail::OptionalSlash,
        },
        PageKind::UserJournal,
    ),
    (
        PathShape {
            segments: &[Literal("users"), Name],
            tail: Tail::OptionalSlash,
        },
        PageKind::UserProfile,
    ),
];
