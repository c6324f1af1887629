use playtidy::types::{
    GetUserPlaylistsResponse, PlaylistItemsResponse, PlaylistMeta, RemoveTracksRequest,
    ReorderTracksRequest, TrackOccurrence,
};

#[test]
fn test_playlist_items_with_missing_tracks() {
    let body = r#"{
        "total": 3,
        "items": [
            {
                "added_at": "2024-03-01T10:00:00Z",
                "track": {
                    "uri": "spotify:track:1",
                    "name": "First",
                    "artists": [{"name": "A"}, {"name": "B"}],
                    "album": {"name": "Alb", "release_date": "1999", "release_date_precision": "year"}
                }
            },
            {"added_at": "2024-03-02T10:00:00Z", "track": null},
            {"added_at": null, "track": {"uri": "spotify:local:x", "name": "Local", "album": null}}
        ]
    }"#;

    let page: PlaylistItemsResponse = serde_json::from_str(body).unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 3);

    let first = page.items[0].track.as_ref().unwrap();
    assert_eq!(first.artists.len(), 2);
    let album = first.album.as_ref().unwrap();
    assert_eq!(album.release_date.as_deref(), Some("1999"));
    assert_eq!(album.release_date_precision.as_deref(), Some("year"));

    assert!(page.items[1].track.is_none());

    let local = page.items[2].track.as_ref().unwrap();
    assert!(local.artists.is_empty());
    assert!(local.album.is_none());
    assert!(page.items[2].added_at.is_none());
}

#[test]
fn test_playlist_meta() {
    let body = r#"{"name": "Road Trip", "snapshot_id": "MTAsZDVm", "tracks": {"total": 42}}"#;

    let meta: PlaylistMeta = serde_json::from_str(body).unwrap();

    assert_eq!(meta.name, "Road Trip");
    assert_eq!(meta.snapshot_id, "MTAsZDVm");
    assert_eq!(meta.tracks.total, 42);
}

#[test]
fn test_user_playlists_page() {
    let body = r#"{
        "items": [{
            "id": "37i9dQZF1DXcBWIGoYBM5M",
            "name": "Mine",
            "snapshot_id": "abc",
            "owner": {"id": "me", "display_name": null},
            "tracks": {"total": 5}
        }],
        "next": null,
        "total": 1
    }"#;

    let page: GetUserPlaylistsResponse = serde_json::from_str(body).unwrap();

    assert!(page.next.is_none());
    assert_eq!(page.items[0].owner.id, "me");
    assert!(!page.items[0].collaborative);
}

#[test]
fn test_mutation_bodies() {
    let reorder = ReorderTracksRequest {
        range_start: 4,
        insert_before: 0,
        range_length: 1,
        snapshot_id: "v9".to_string(),
    };
    let remove = RemoveTracksRequest {
        tracks: vec![TrackOccurrence {
            uri: "spotify:track:1".to_string(),
            positions: vec![2],
        }],
        snapshot_id: "v9".to_string(),
    };

    assert_eq!(
        serde_json::to_value(&reorder).unwrap(),
        serde_json::json!({"range_start": 4, "insert_before": 0, "range_length": 1, "snapshot_id": "v9"})
    );
    assert_eq!(
        serde_json::to_value(&remove).unwrap(),
        serde_json::json!({"tracks": [{"uri": "spotify:track:1", "positions": [2]}], "snapshot_id": "v9"})
    );
}
