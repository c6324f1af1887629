mod common;

use common::track;
use playtidy::reconcile::{Operation, Track, diff};

fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| Track {
            position: i,
            ..track(id, id, &["X"], "", None)
        })
        .collect()
}

/// Deterministic shuffles of `0..n`.
fn permutation(n: usize, seed: usize) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    let mut state = (seed as u64).wrapping_mul(2654435761) | 1;
    for i in (1..n).rev() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = ((state >> 33) % (i as u64 + 1)) as usize;
        perm.swap(i, j);
    }
    perm
}

fn lis_len(seq: &[usize]) -> usize {
    let mut tails: Vec<usize> = Vec::new();
    for &x in seq {
        let k = tails.partition_point(|&t| t < x);
        if k == tails.len() {
            tails.push(x);
        } else {
            tails[k] = x;
        }
    }
    tails.len()
}

#[test]
fn test_two_swaps_need_two_moves() {
    let current = tracks(&["A", "B", "C", "D"]);

    let ops = diff::plan_moves(&current, &[1, 0, 3, 2]).unwrap();

    assert_eq!(ops.len(), 2);
    assert_eq!(diff::simulate(4, &ops), vec![1, 0, 3, 2]);
}

#[test]
fn test_identity_needs_no_moves() {
    let current = tracks(&["A", "B", "C"]);

    let ops = diff::plan_moves(&current, &[0, 1, 2]).unwrap();

    assert!(ops.is_empty());
}

#[test]
fn test_rotation_needs_one_move() {
    let current = tracks(&["A", "B", "C", "D", "E"]);

    let ops = diff::plan_moves(&current, &[4, 0, 1, 2, 3]).unwrap();

    assert_eq!(
        ops,
        vec![Operation::Reorder {
            from: 4,
            insert_before: 0,
            track_id: "E".to_string(),
        }]
    );
}

#[test]
fn test_reversal_needs_n_minus_one_moves() {
    let current = tracks(&["A", "B", "C", "D", "E", "F"]);
    let target = vec![5, 4, 3, 2, 1, 0];

    let ops = diff::plan_moves(&current, &target).unwrap();

    assert_eq!(ops.len(), 5);
    assert_eq!(diff::simulate(6, &ops), target);
}

#[test]
fn test_moves_reach_target_with_fewest_moves() {
    for n in [2usize, 3, 7, 25, 120] {
        let ids: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let current = tracks(&refs);

        for seed in 0..20 {
            let target = permutation(n, seed);
            let ops = diff::plan_moves(&current, &target).unwrap();

            assert_eq!(diff::simulate(n, &ops), target, "n={} seed={}", n, seed);

            let mut rank = vec![0; n];
            for (k, &pos) in target.iter().enumerate() {
                rank[pos] = k;
            }
            assert_eq!(ops.len(), n - lis_len(&rank), "n={} seed={}", n, seed);
            assert!(ops.len() < n);
        }
    }
}

#[test]
fn test_moves_name_the_moved_track() {
    let current = tracks(&["A", "B", "C", "D"]);
    let target = vec![3, 2, 1, 0];

    let ops = diff::plan_moves(&current, &target).unwrap();

    for (i, op) in ops.iter().enumerate() {
        let Operation::Reorder { from, .. } = op else {
            panic!("unexpected {:?}", op);
        };
        let model = diff::simulate(4, &ops[..i]);
        assert_eq!(op.track_id(), current[model[*from]].track_id);
    }
}

#[test]
fn test_invalid_targets_are_rejected() {
    let current = tracks(&["A", "B", "C"]);

    assert!(diff::plan_moves(&current, &[0, 1]).is_none());
    assert!(diff::plan_moves(&current, &[0, 1, 1]).is_none());
    assert!(diff::plan_moves(&current, &[0, 1, 3]).is_none());

    let mut shifted = tracks(&["A", "B", "C"]);
    shifted[1].position = 7;
    assert!(diff::plan_moves(&shifted, &[0, 1, 2]).is_none());
}

#[test]
fn test_removals_run_from_the_back() {
    let current = tracks(&["A", "B", "C", "D", "E"]);

    let ops = diff::plan_removals(&current, [1, 4, 2, 4]);

    assert_eq!(
        ops,
        vec![
            Operation::RemoveAt {
                index: 4,
                track_id: "E".to_string()
            },
            Operation::RemoveAt {
                index: 2,
                track_id: "C".to_string()
            },
            Operation::RemoveAt {
                index: 1,
                track_id: "B".to_string()
            },
        ]
    );
    assert_eq!(diff::simulate(5, &ops), vec![0, 3]);
}

#[test]
fn test_removals_skip_positions_outside_the_snapshot() {
    let current = tracks(&["A", "B"]);

    let ops = diff::plan_removals(&current, [5, 1]);

    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].track_id(), "B");
}

#[test]
fn test_operations_display() {
    let reorder = Operation::Reorder {
        from: 3,
        insert_before: 0,
        track_id: "spotify:track:x".to_string(),
    };
    let remove = Operation::RemoveAt {
        index: 2,
        track_id: "spotify:track:y".to_string(),
    };

    assert_eq!(reorder.to_string(), "move spotify:track:x from 3 before 0");
    assert_eq!(remove.to_string(), "remove spotify:track:y at 2");
}
