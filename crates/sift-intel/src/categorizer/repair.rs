use super::{Bucket, Buckets};

/// Posts moved into each empty bucket: `max(1, input_count / 10)`.
pub(super) fn repair_quota(input_count: usize) -> usize {
    (input_count / 10).max(1)
}

/// Fill empty buckets from the others so every bucket has something to show.
///
/// Each move takes the last post of the currently larger donor. A donor is
/// never reduced below one post, so a single categorized post stays where it
/// is. Returns the number of posts moved.
pub(super) fn ensure_non_empty(buckets: &mut Buckets, input_count: usize) -> usize {
    if input_count == 0 {
        return 0;
    }
    let quota = repair_quota(input_count);
    let mut total_moved = 0;

    for target in Bucket::ALL {
        if !buckets.get(target).is_empty() {
            continue;
        }
        let mut moved = 0;
        while moved < quota {
            let Some(donor) = Bucket::ALL
                .into_iter()
                .filter(|b| *b != target)
                .max_by_key(|b| buckets.get(*b).len())
            else {
                break;
            };
            if buckets.get(donor).len() <= 1 {
                break;
            }
            let Some(post) = buckets.get_mut(donor).pop() else {
                break;
            };
            buckets.get_mut(target).push(post);
            moved += 1;
        }
        if moved > 0 {
            tracing::debug!(bucket = target.label(), moved, "repaired empty bucket");
        }
        total_moved += moved;
    }
    total_moved
}
