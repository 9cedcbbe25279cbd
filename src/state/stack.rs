// Stacking order arithmetic over the open windows of one store.
//
// The working list is kept sorted by z-index, highest first, with pairwise
// distinct values. Nothing here touches the store; callers apply the result.

use super::window::WindowKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackEntry {
    pub z_index: i32,
    pub key: WindowKey,
}

impl StackEntry {
    pub fn new(z_index: i32, key: WindowKey) -> Self {
        Self { z_index, key }
    }
}

/// Insert `key` on top with `z_max`, pushing colliding entries down one step
/// each until the first gap. Returns the key that fell below `z_min`, if any.
///
/// `key` must not already be in `entries`.
pub fn admit(
    entries: &mut Vec<StackEntry>,
    key: WindowKey,
    z_min: i32,
    z_max: i32,
) -> Option<WindowKey> {
    entries.insert(0, StackEntry::new(z_max, key));

    for i in 1..entries.len() {
        let ceiling = entries[i - 1].z_index;
        if entries[i].z_index < ceiling {
            // First gap: everything below is already distinct
            break;
        }
        match ceiling.checked_sub(1).filter(|z| *z >= z_min) {
            Some(z) => entries[i].z_index = z,
            None => {
                // Only the lowest entry can be pushed past the floor
                let evicted = entries.remove(i);
                return Some(evicted.key);
            }
        }
    }

    None
}

/// Move `key` to the top. Equivalent to `remove` followed by `admit`, so a
/// promotion can still evict when the range is exhausted.
pub fn promote(
    entries: &mut Vec<StackEntry>,
    key: WindowKey,
    z_min: i32,
    z_max: i32,
) -> Option<WindowKey> {
    remove(entries, &key);
    admit(entries, key, z_min, z_max)
}

/// Drop `key` from the list. Remaining z-indices are not compacted.
pub fn remove(entries: &mut Vec<StackEntry>, key: &WindowKey) -> bool {
    match entries.iter().position(|e| &e.key == key) {
        Some(index) => {
            entries.remove(index);
            true
        }
        None => false,
    }
}
