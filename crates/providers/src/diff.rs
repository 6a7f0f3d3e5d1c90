//! Snapshot diffing: turns two path-ordered listings into change events.

use crate::types::{FileChangeEvent, FileDetails};
use std::cmp::Ordering;

/// Compare two snapshots sorted by path.
///
/// A path only in `new` is `Added`, a path only in `old` is `Removed`, and a
/// path in both whose attributes changed is `Updated` with the new details, so
/// the index keeps the document (and its user metadata) instead of recreating
/// it. Events come out in path order.
pub fn diff(old: &[FileDetails], new: &[FileDetails]) -> Vec<FileChangeEvent> {
    let mut events = Vec::new();
    let mut old_iter = old.iter().peekable();
    let mut new_iter = new.iter().peekable();

    loop {
        match (old_iter.peek(), new_iter.peek()) {
            (Some(o), Some(n)) => match o.path.cmp(&n.path) {
                Ordering::Less => {
                    events.push(FileChangeEvent::Removed(o.path.clone()));
                    old_iter.next();
                }
                Ordering::Greater => {
                    events.push(FileChangeEvent::Added((*n).clone()));
                    new_iter.next();
                }
                Ordering::Equal => {
                    if o.differs_from(n) {
                        events.push(FileChangeEvent::Updated((*n).clone()));
                    }
                    old_iter.next();
                    new_iter.next();
                }
            },
            (Some(o), None) => {
                events.push(FileChangeEvent::Removed(o.path.clone()));
                old_iter.next();
            }
            (None, Some(n)) => {
                events.push(FileChangeEvent::Added((*n).clone()));
                new_iter.next();
            }
            (None, None) => break,
        }
    }

    events
}
