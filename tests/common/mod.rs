#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use playtidy::reconcile::{GatewayError, Page, PlaylistGateway, ReleaseDate, Track};

/// Builds a track; `position` is reassigned by whoever stores it.
pub fn track(id: &str, title: &str, artists: &[&str], album: &str, released: Option<&str>) -> Track {
    Track {
        track_id: id.to_string(),
        title: title.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        album: album.to_string(),
        release_date: released.and_then(|d| ReleaseDate::parse(d, None)),
        added_at: None,
        position: 0,
    }
}

/// A playlist entry the catalog can no longer resolve.
pub fn unavailable(position: usize) -> Track {
    Track {
        track_id: String::new(),
        title: String::new(),
        artists: Vec::new(),
        album: String::new(),
        release_date: None,
        added_at: None,
        position,
    }
}

/// `n` distinct dated tracks `t0..t{n-1}`, released on consecutive days.
pub fn dated_tracks(n: usize) -> Vec<Track> {
    (0..n)
        .map(|i| {
            let day = chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
                + chrono::Duration::days(((i * 7919) % 5000) as i64);
            track(
                &format!("t{}", i),
                &format!("Song {}", i),
                &["Artist"],
                "Album",
                Some(&day.format("%Y-%m-%d").to_string()),
            )
        })
        .collect()
}

/// In-memory playlist with Spotify-like version tokens and scripted faults.
pub struct MockGateway {
    pub name: String,
    tracks: RefCell<Vec<Track>>,
    version: Cell<u64>,
    pub fetch_calls: Cell<usize>,
    pub fetch_offsets: RefCell<Vec<usize>>,
    pub move_calls: Cell<usize>,
    pub remove_calls: Cell<usize>,
    /// Mutations after this many successful ones fail as unavailable.
    pub fail_mutations_after: Cell<Option<usize>>,
    /// Error returned for every read.
    pub read_error: RefCell<Option<GatewayError>>,
    /// Pages at a non-zero offset that report one track too many.
    pub total_glitches: Cell<usize>,
    /// Pages at a non-zero offset that report a version nobody wrote.
    pub version_glitches: Cell<usize>,
    /// Pages at a non-zero offset that come back without items.
    pub empty_page_glitches: Cell<usize>,
    /// Someone else edits the list right after this many mutations.
    pub external_edit_after: Cell<Option<usize>>,
}

impl MockGateway {
    pub fn new(name: &str, tracks: Vec<Track>) -> Self {
        let gateway = Self {
            name: name.to_string(),
            tracks: RefCell::new(Vec::new()),
            version: Cell::new(1),
            fetch_calls: Cell::new(0),
            fetch_offsets: RefCell::new(Vec::new()),
            move_calls: Cell::new(0),
            remove_calls: Cell::new(0),
            fail_mutations_after: Cell::new(None),
            read_error: RefCell::new(None),
            total_glitches: Cell::new(0),
            version_glitches: Cell::new(0),
            empty_page_glitches: Cell::new(0),
            external_edit_after: Cell::new(None),
        };
        gateway.replace_tracks(tracks);
        gateway
    }

    pub fn version(&self) -> String {
        format!("v{}", self.version.get())
    }

    pub fn ids(&self) -> Vec<String> {
        self.tracks.borrow().iter().map(|t| t.track_id.clone()).collect()
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.tracks.borrow().clone()
    }

    pub fn mutations(&self) -> usize {
        self.move_calls.get() + self.remove_calls.get()
    }

    pub fn reset_counters(&self) {
        self.fetch_calls.set(0);
        self.fetch_offsets.borrow_mut().clear();
        self.move_calls.set(0);
        self.remove_calls.set(0);
    }

    fn replace_tracks(&self, tracks: Vec<Track>) {
        let mut stored = self.tracks.borrow_mut();
        *stored = tracks;
        for (i, t) in stored.iter_mut().enumerate() {
            t.position = i;
        }
    }

    fn bump(&self) {
        self.version.set(self.version.get() + 1);
    }

    fn begin_mutation(&self, expected_version: &str) -> Result<(), GatewayError> {
        if let Some(limit) = self.fail_mutations_after.get() {
            if self.mutations() >= limit {
                return Err(GatewayError::Unavailable("503 Service Unavailable".to_string()));
            }
        }
        if expected_version != self.version() {
            return Err(GatewayError::Conflict(format!(
                "snapshot {} is stale, list is at {}",
                expected_version,
                self.version()
            )));
        }
        Ok(())
    }

    fn finish_mutation(&self) -> String {
        self.bump();
        let written = self.version();
        if self.external_edit_after.get() == Some(self.mutations()) {
            self.bump();
        }
        let tracks = self.tracks();
        self.replace_tracks(tracks);
        written
    }
}

fn take_glitch(counter: &Cell<usize>) -> bool {
    if counter.get() == 0 {
        return false;
    }
    counter.set(counter.get() - 1);
    true
}

impl PlaylistGateway for MockGateway {
    fn fetch_page(
        &self,
        _playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page, GatewayError> {
        self.fetch_calls.set(self.fetch_calls.get() + 1);
        self.fetch_offsets.borrow_mut().push(offset);

        if let Some(err) = self.read_error.borrow().clone() {
            return Err(err);
        }

        let tracks = self.tracks.borrow();
        let end = (offset + limit).min(tracks.len());
        let mut page: Vec<Track> = tracks.get(offset..end).map(<[Track]>::to_vec).unwrap_or_default();

        let mut total = tracks.len();
        let mut version = self.version();
        if offset > 0 {
            if take_glitch(&self.total_glitches) {
                total += 1;
            }
            if take_glitch(&self.version_glitches) {
                version = format!("{}-elsewhere", version);
            }
            if take_glitch(&self.empty_page_glitches) {
                page.clear();
            }
        }

        Ok(Page {
            playlist_name: self.name.clone(),
            tracks: page,
            total,
            version,
        })
    }

    fn move_track(
        &self,
        _playlist_id: &str,
        from: usize,
        insert_before: usize,
        expected_version: &str,
    ) -> Result<String, GatewayError> {
        self.begin_mutation(expected_version)?;
        {
            let mut tracks = self.tracks.borrow_mut();
            if from >= tracks.len() || insert_before > tracks.len() {
                return Err(GatewayError::Conflict("index out of range".to_string()));
            }
            let item = tracks.remove(from);
            let dest = if insert_before > from {
                insert_before - 1
            } else {
                insert_before
            };
            tracks.insert(dest, item);
        }
        self.move_calls.set(self.move_calls.get() + 1);
        Ok(self.finish_mutation())
    }

    fn remove_track_at(
        &self,
        _playlist_id: &str,
        index: usize,
        track_id: &str,
        expected_version: &str,
    ) -> Result<String, GatewayError> {
        self.begin_mutation(expected_version)?;
        {
            let mut tracks = self.tracks.borrow_mut();
            match tracks.get(index) {
                Some(t) if t.track_id == track_id => {
                    tracks.remove(index);
                }
                _ => {
                    return Err(GatewayError::Conflict(format!(
                        "{} is not at position {}",
                        track_id, index
                    )));
                }
            }
        }
        self.remove_calls.set(self.remove_calls.get() + 1);
        Ok(self.finish_mutation())
    }
}
