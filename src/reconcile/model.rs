use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};

/// Granularity of a release date as reported by the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

impl DatePrecision {
    fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            _ => None,
        }
    }
}

/// A release date with variable precision.
///
/// Partial dates are anchored at their earliest possible day, so `1999`
/// sorts as `1999-01-01` and `1999-05` as `1999-05-01`. Two dates with the
/// same anchor compare as a tie regardless of their precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDate {
    anchor: NaiveDate,
    precision: DatePrecision,
}

impl ReleaseDate {
    /// Parses `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    ///
    /// `precision` is the catalog's own hint (`year`, `month`, `day`). When it
    /// is missing or unknown the precision is inferred from the number of
    /// components. Returns `None` for empty or malformed input.
    pub fn parse(raw: &str, precision: Option<&str>) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let mut parts = raw.split('-');
        let year: i32 = parts.next()?.parse().ok()?;
        let month: Option<u32> = match parts.next() {
            Some(m) => Some(m.parse().ok()?),
            None => None,
        };
        let day: Option<u32> = match parts.next() {
            Some(d) => Some(d.parse().ok()?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }

        let inferred = match (month, day) {
            (None, _) => DatePrecision::Year,
            (Some(_), None) => DatePrecision::Month,
            (Some(_), Some(_)) => DatePrecision::Day,
        };
        let precision = precision
            .and_then(DatePrecision::from_hint)
            .unwrap_or(inferred);

        // a hint coarser than the string wins; finer components are dropped
        let (month, day) = match precision {
            DatePrecision::Year => (1, 1),
            DatePrecision::Month => (month.unwrap_or(1), 1),
            DatePrecision::Day => (month.unwrap_or(1), day.unwrap_or(1)),
        };

        let anchor = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Self { anchor, precision })
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn precision(&self) -> DatePrecision {
        self.precision
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            DatePrecision::Year => write!(f, "{}", self.anchor.format("%Y")),
            DatePrecision::Month => write!(f, "{}", self.anchor.format("%Y-%m")),
            DatePrecision::Day => write!(f, "{}", self.anchor.format("%Y-%m-%d")),
        }
    }
}

/// One entry of a playlist snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Catalog identifier (a track URI). Not unique within a playlist.
    pub track_id: String,
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub release_date: Option<ReleaseDate>,
    pub added_at: Option<DateTime<Utc>>,
    /// Zero-based index within the snapshot it was read from.
    pub position: usize,
}

impl Track {
    /// Entries the catalog no longer resolves (removed or region-locked
    /// tracks) come back without a title. They keep their slot but take no
    /// part in duplicate detection.
    pub fn is_unavailable(&self) -> bool {
        self.title.is_empty()
    }
}

/// A complete, consistent read of a playlist.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub playlist_id: String,
    pub playlist_name: String,
    pub version: String,
    pub tracks: Vec<Track>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Tracks sharing the same title and the same set of artists.
///
/// `positions` is ascending; the first entry is the keeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub title: String,
    pub artists: Vec<String>,
    pub albums: Vec<String>,
    pub positions: Vec<usize>,
    pub track_ids: Vec<String>,
}

impl DuplicateGroup {
    pub fn keeper(&self) -> usize {
        self.positions[0]
    }

    pub fn redundant(&self) -> &[usize] {
        &self.positions[1..]
    }

    pub fn count(&self) -> usize {
        self.positions.len()
    }

    /// True when the very same catalog id shows up more than once in the
    /// group, as opposed to the same song from different releases.
    pub fn has_identical_ids(&self) -> bool {
        let mut ids: Vec<&String> = self.track_ids.iter().collect();
        ids.sort();
        ids.windows(2).any(|w| w[0] == w[1])
    }
}

/// A single remote mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Move the track at `from` so that it lands in front of the track that
    /// currently sits at `insert_before` (indices taken before the move).
    Reorder {
        from: usize,
        insert_before: usize,
        track_id: String,
    },
    /// Remove the single occurrence of `track_id` at `index`.
    RemoveAt { index: usize, track_id: String },
}

impl Operation {
    pub fn track_id(&self) -> &str {
        match self {
            Operation::Reorder { track_id, .. } | Operation::RemoveAt { track_id, .. } => track_id,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Reorder {
                from,
                insert_before,
                track_id,
            } => write!(f, "move {track_id} from {from} before {insert_before}"),
            Operation::RemoveAt { index, track_id } => write!(f, "remove {track_id} at {index}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Newest => f.write_str("newest"),
            SortOrder::Oldest => f.write_str("oldest"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "new" | "desc" => Ok(SortOrder::Newest),
            "oldest" | "old" | "asc" => Ok(SortOrder::Oldest),
            other => Err(format!(
                "unknown sort order '{}', expected 'newest' or 'oldest'",
                other
            )),
        }
    }
}
