//! Descending partition sort for group and region tables.
//!
//! Pivot is the middle element. Runs equal to the pivot are skipped by
//! both recursive calls, so tables full of equal sizes stay O(n log n).

/// Sort `items` by `key` in descending order
///
/// **Public** - used for every displayed table
///
/// Not stable in general; equal elements only keep their order when
/// they end up in the same pivot-equal run.
pub fn sort_descending_by<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> u64 + Copy,
{
    let size = items.len();
    if size < 2 {
        return;
    }
    if size == 2 {
        if key(&items[0]) < key(&items[1]) {
            items.swap(0, 1);
        }
        return;
    }

    let mut beg = 0;
    let mut end = size - 1;
    let mut pos = size / 2;
    let threshold = key(&items[pos]);

    while beg < end {
        while beg < end && key(&items[beg]) > threshold {
            beg += 1;
        }
        while beg < end && key(&items[end]) <= threshold {
            end -= 1;
        }
        if beg < end {
            items.swap(beg, end);

            // The pivot may move; keep track of it for the run handling below
            if beg == pos {
                pos = end;
            } else if end == pos {
                pos = beg;
            }
        }
    }

    if key(&items[end]) < threshold {
        items.swap(end, pos);
    }
    while end < size && key(&items[end]) == threshold {
        end += 1;
    }

    let (head, tail) = items.split_at_mut(end);
    sort_descending_by(&mut head[..beg], key);
    sort_descending_by(tail, key);
}
