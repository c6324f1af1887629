use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
};

use super::model::{DuplicateGroup, SortOrder, Track};

/// Target order by release date, as snapshot positions.
///
/// Dated tracks come first, newest or oldest first depending on `order`.
/// Tracks without a release date follow in their original relative order.
/// Ties keep their original relative order as well.
pub fn release_order(tracks: &[Track], order: SortOrder) -> Vec<usize> {
    let mut sorted: Vec<&Track> = tracks.iter().collect();

    // slice::sort_by is stable, which is what keeps ties in place
    sorted.sort_by(|a, b| match (&a.release_date, &b.release_date) {
        (Some(x), Some(y)) => match order {
            SortOrder::Newest => y.anchor().cmp(&x.anchor()),
            SortOrder::Oldest => x.anchor().cmp(&y.anchor()),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    sorted.into_iter().map(|t| t.position).collect()
}

/// Result of grouping a snapshot by duplicate identity.
#[derive(Debug, Clone)]
pub struct DuplicatePlan {
    /// Groups with more than one member, ordered by keeper position.
    pub groups: Vec<DuplicateGroup>,
    /// The snapshot minus every non-keeper member, as positions.
    pub target: Vec<usize>,
}

impl DuplicatePlan {
    pub fn removal_count(&self) -> usize {
        self.groups.iter().map(|g| g.redundant().len()).sum()
    }
}

type DuplicateKey<'a> = (&'a str, BTreeSet<&'a str>);

/// Groups tracks by title and artist set and keeps the first occurrence of
/// each group.
///
/// Titles and artist names are compared byte for byte. Artist order does not
/// matter, albums are ignored. Unavailable entries are never grouped.
pub fn duplicate_plan(tracks: &[Track]) -> DuplicatePlan {
    let mut index: HashMap<DuplicateKey<'_>, usize> = HashMap::new();
    let mut members: Vec<Vec<&Track>> = Vec::new();

    for track in tracks.iter().filter(|t| !t.is_unavailable()) {
        let key = (
            track.title.as_str(),
            track.artists.iter().map(String::as_str).collect(),
        );
        match index.get(&key) {
            Some(&slot) => members[slot].push(track),
            None => {
                index.insert(key, members.len());
                members.push(vec![track]);
            }
        }
    }

    let groups: Vec<DuplicateGroup> = members
        .into_iter()
        .filter(|m| m.len() > 1)
        .map(|mut m| {
            m.sort_by_key(|t| t.position);
            DuplicateGroup {
                title: m[0].title.clone(),
                artists: m[0].artists.clone(),
                albums: m.iter().map(|t| t.album.clone()).collect(),
                positions: m.iter().map(|t| t.position).collect(),
                track_ids: m.iter().map(|t| t.track_id.clone()).collect(),
            }
        })
        .collect();

    let redundant: BTreeSet<usize> = groups
        .iter()
        .flat_map(|g| g.redundant().iter().copied())
        .collect();

    let target = tracks
        .iter()
        .map(|t| t.position)
        .filter(|p| !redundant.contains(p))
        .collect();

    DuplicatePlan { groups, target }
}
