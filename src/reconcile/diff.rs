use super::model::{Operation, Track};

/// Plans the single-track moves that turn `current` into `target`.
///
/// `current` is a snapshot in playlist order (`track.position == index`),
/// `target` the wanted order as snapshot positions. Returns `None` when
/// `target` is not a permutation of those positions.
///
/// Tracks on a longest increasing run of target ranks stay where they are;
/// every other track is moved once, in target order, to sit right behind its
/// target predecessor. That is `len - LIS` moves, the fewest single-track
/// moves that reach the target, and never more than `len - 1`.
pub fn plan_moves(current: &[Track], target: &[usize]) -> Option<Vec<Operation>> {
    let n = current.len();
    if target.len() != n || current.iter().enumerate().any(|(i, t)| t.position != i) {
        return None;
    }

    let mut rank = vec![usize::MAX; n];
    for (k, &pos) in target.iter().enumerate() {
        if pos >= n || rank[pos] != usize::MAX {
            return None;
        }
        rank[pos] = k;
    }

    let anchored = longest_increasing(&rank);
    let mut model: Vec<usize> = (0..n).collect();
    let mut ops = Vec::new();

    for (k, &pos) in target.iter().enumerate() {
        if anchored[pos] {
            continue;
        }

        let from = index_of(&model, pos);
        let insert_before = match k {
            0 => 0,
            _ => index_of(&model, target[k - 1]) + 1,
        };
        if insert_before == from || insert_before == from + 1 {
            continue;
        }

        ops.push(Operation::Reorder {
            from,
            insert_before,
            track_id: current[pos].track_id.clone(),
        });
        apply_move(&mut model, from, insert_before);
    }

    Some(ops)
}

/// Plans removals of every position in `redundant`, highest index first so
/// earlier removals never shift the indices of later ones.
pub fn plan_removals(current: &[Track], redundant: impl IntoIterator<Item = usize>) -> Vec<Operation> {
    let mut positions: Vec<usize> = redundant.into_iter().collect();
    positions.sort_unstable_by(|a, b| b.cmp(a));
    positions.dedup();

    positions
        .into_iter()
        .filter_map(|index| {
            current.get(index).map(|t| Operation::RemoveAt {
                index,
                track_id: t.track_id.clone(),
            })
        })
        .collect()
}

/// Replays `ops` on the identity order `0..len` and returns the resulting
/// order as snapshot positions.
pub fn simulate(len: usize, ops: &[Operation]) -> Vec<usize> {
    let mut model: Vec<usize> = (0..len).collect();
    for op in ops {
        match *op {
            Operation::Reorder {
                from,
                insert_before,
                ..
            } => apply_move(&mut model, from, insert_before),
            Operation::RemoveAt { index, .. } => {
                if index < model.len() {
                    model.remove(index);
                }
            }
        }
    }
    model
}

pub(crate) fn apply_move(model: &mut Vec<usize>, from: usize, insert_before: usize) {
    if from >= model.len() {
        return;
    }
    let item = model.remove(from);
    let dest = if insert_before > from {
        insert_before - 1
    } else {
        insert_before
    };
    model.insert(dest.min(model.len()), item);
}

fn index_of(model: &[usize], pos: usize) -> usize {
    model
        .iter()
        .position(|&p| p == pos)
        .unwrap_or(model.len())
}

/// Marks the members of one longest strictly increasing subsequence.
fn longest_increasing(seq: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for i in 0..seq.len() {
        let k = tails.partition_point(|&j| seq[j] < seq[i]);
        prev[i] = k.checked_sub(1).map(|k| tails[k]);
        if k == tails.len() {
            tails.push(i);
        } else {
            tails[k] = i;
        }
    }

    let mut marked = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        marked[i] = true;
        cursor = prev[i];
    }
    marked
}
