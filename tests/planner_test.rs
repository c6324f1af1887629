mod common;

use chrono::NaiveDate;
use common::{track, unavailable};
use playtidy::reconcile::{DatePrecision, ReleaseDate, SortOrder, Track, planner};

fn positioned(mut tracks: Vec<Track>) -> Vec<Track> {
    for (i, t) in tracks.iter_mut().enumerate() {
        t.position = i;
    }
    tracks
}

#[test]
fn test_release_date_parse_anchors_partial_dates() {
    let year = ReleaseDate::parse("1999", None).unwrap();
    assert_eq!(year.anchor(), NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
    assert_eq!(year.precision(), DatePrecision::Year);
    assert_eq!(year.to_string(), "1999");

    let month = ReleaseDate::parse("1999-05", None).unwrap();
    assert_eq!(month.anchor(), NaiveDate::from_ymd_opt(1999, 5, 1).unwrap());
    assert_eq!(month.precision(), DatePrecision::Month);
    assert_eq!(month.to_string(), "1999-05");

    let day = ReleaseDate::parse("1999-05-17", Some("day")).unwrap();
    assert_eq!(day.anchor(), NaiveDate::from_ymd_opt(1999, 5, 17).unwrap());
    assert_eq!(day.to_string(), "1999-05-17");
}

#[test]
fn test_release_date_precision_hint_wins() {
    let date = ReleaseDate::parse("2010-07-04", Some("year")).unwrap();
    assert_eq!(date.precision(), DatePrecision::Year);
    assert_eq!(date.anchor(), NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());

    let unknown_hint = ReleaseDate::parse("2010-07", Some("decade")).unwrap();
    assert_eq!(unknown_hint.precision(), DatePrecision::Month);
}

#[test]
fn test_release_date_rejects_garbage() {
    assert_eq!(ReleaseDate::parse("", None), None);
    assert_eq!(ReleaseDate::parse("   ", None), None);
    assert_eq!(ReleaseDate::parse("soon", None), None);
    assert_eq!(ReleaseDate::parse("2001-13", None), None);
    assert_eq!(ReleaseDate::parse("2001-02-30", None), None);
    assert_eq!(ReleaseDate::parse("2001-01-01-01", None), None);
}

#[test]
fn test_release_order_newest_and_oldest() {
    let tracks = positioned(vec![
        track("a", "A", &["X"], "", Some("2005")),
        track("b", "B", &["X"], "", Some("2010-03-01")),
        track("c", "C", &["X"], "", Some("1990-12")),
    ]);

    assert_eq!(planner::release_order(&tracks, SortOrder::Newest), vec![1, 0, 2]);
    assert_eq!(planner::release_order(&tracks, SortOrder::Oldest), vec![2, 0, 1]);
}

#[test]
fn test_release_order_is_stable_for_equal_anchors() {
    let tracks = positioned(vec![
        track("a", "A", &["X"], "", Some("1999")),
        track("b", "B", &["X"], "", Some("1999-01")),
        track("c", "C", &["X"], "", Some("1999-01-01")),
    ]);

    assert_eq!(planner::release_order(&tracks, SortOrder::Newest), vec![0, 1, 2]);
    assert_eq!(planner::release_order(&tracks, SortOrder::Oldest), vec![0, 1, 2]);
}

#[test]
fn test_release_order_puts_undated_last_in_both_orders() {
    let tracks = positioned(vec![
        unavailable(0),
        track("a", "A", &["X"], "", Some("2000")),
        track("b", "B", &["X"], "", None),
        track("c", "C", &["X"], "", Some("2001")),
    ]);

    assert_eq!(planner::release_order(&tracks, SortOrder::Newest), vec![3, 1, 0, 2]);
    assert_eq!(planner::release_order(&tracks, SortOrder::Oldest), vec![1, 3, 0, 2]);
}

#[test]
fn test_release_order_of_empty_list() {
    assert!(planner::release_order(&[], SortOrder::Newest).is_empty());
}

#[test]
fn test_duplicate_plan_scenario() {
    let tracks = positioned(vec![
        track("a1", "Song A", &["Artist X"], "Album1", None),
        track("b", "Song B", &["Artist Y"], "AlbumZ", None),
        track("a2", "Song A", &["Artist X"], "Album2", None),
    ]);

    let plan = planner::duplicate_plan(&tracks);

    assert_eq!(plan.groups.len(), 1);
    let group = &plan.groups[0];
    assert_eq!(group.title, "Song A");
    assert_eq!(group.artists, vec!["Artist X".to_string()]);
    assert_eq!(group.albums, vec!["Album1".to_string(), "Album2".to_string()]);
    assert_eq!(group.count(), 2);
    assert_eq!(group.keeper(), 0);
    assert_eq!(group.redundant(), &[2]);
    assert!(!group.has_identical_ids());
    assert_eq!(plan.target, vec![0, 1]);
    assert_eq!(plan.removal_count(), 1);
}

#[test]
fn test_duplicate_plan_ignores_artist_order_but_not_artist_set() {
    let tracks = positioned(vec![
        track("1", "Duet", &["A", "B"], "", None),
        track("2", "Duet", &["B", "A"], "", None),
        track("3", "Duet", &["A"], "", None),
        track("4", "Duet", &["A", "B", "C"], "", None),
    ]);

    let plan = planner::duplicate_plan(&tracks);

    assert_eq!(plan.groups.len(), 1);
    assert_eq!(plan.groups[0].positions, vec![0, 1]);
    assert_eq!(plan.target, vec![0, 2, 3]);
}

#[test]
fn test_duplicate_plan_compares_exact_strings() {
    let tracks = positioned(vec![
        track("1", "Intro", &["Band"], "", None),
        track("2", "intro", &["Band"], "", None),
        track("3", "Intro ", &["Band"], "", None),
        track("4", "Intro", &["band"], "", None),
    ]);

    let plan = planner::duplicate_plan(&tracks);

    assert!(plan.groups.is_empty());
    assert_eq!(plan.target, vec![0, 1, 2, 3]);
}

#[test]
fn test_duplicate_plan_orders_groups_by_keeper() {
    let tracks = positioned(vec![
        track("b1", "B", &["X"], "", None),
        track("a1", "A", &["X"], "", None),
        track("a2", "A", &["X"], "", None),
        track("b2", "B", &["X"], "", None),
        track("a3", "A", &["X"], "", None),
    ]);

    let plan = planner::duplicate_plan(&tracks);

    let keepers: Vec<usize> = plan.groups.iter().map(|g| g.keeper()).collect();
    assert_eq!(keepers, vec![0, 1]);
    assert_eq!(plan.groups[1].positions, vec![1, 2, 4]);
    assert_eq!(plan.target, vec![0, 1]);
    assert_eq!(plan.removal_count(), 3);
}

#[test]
fn test_duplicate_plan_flags_identical_ids() {
    let tracks = positioned(vec![
        track("same", "Loop", &["X"], "", None),
        track("same", "Loop", &["X"], "", None),
    ]);

    let plan = planner::duplicate_plan(&tracks);

    assert!(plan.groups[0].has_identical_ids());
}

#[test]
fn test_duplicate_plan_skips_unavailable_entries() {
    let tracks = positioned(vec![unavailable(0), unavailable(1), unavailable(2)]);

    let plan = planner::duplicate_plan(&tracks);

    assert!(plan.groups.is_empty());
    assert_eq!(plan.target, vec![0, 1, 2]);
}
