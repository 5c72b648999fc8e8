//! Cross-reference engine
//!
//! Pure graph computation over a [`NoteStore`]: scan bodies for UID-shaped
//! tokens, build transient forward/reverse adjacency maps, and synchronize
//! the `refers_to`/`referred_from` header fields across the collection.

use std::collections::HashMap;

use crate::error::{Result, ResultExt};
use crate::note::uid_regex;
use crate::store::NoteStore;

/// Transient adjacency map from UID to a sorted, deduplicated UID list.
/// Rebuilt from scratch on every linking run; never persisted.
pub type ReferenceMap = HashMap<String, Vec<String>>;

/// All UIDs found in the text, in order of first occurrence, duplicates
/// included.
pub fn find_uids(text: &str) -> Vec<String> {
    uid_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Map every note to the UIDs its body references. Notes whose bodies
/// reference nothing are omitted from the map entirely, which is what lets
/// [`link_notes`] leave them untouched.
pub fn find_references(store: &dyn NoteStore) -> Result<ReferenceMap> {
    let mut refers_to = ReferenceMap::new();

    for uid in store.list().context("cannot list note uids")? {
        let note = store
            .get(&uid)
            .context(format!("cannot load note with UID '{}'", uid))?;
        let mut body_refs = find_uids(&note.body);
        if body_refs.is_empty() {
            continue;
        }
        body_refs.sort();
        body_refs.dedup();
        refers_to.insert(uid, body_refs);
    }

    Ok(refers_to)
}

/// Invert a reference map by swapping keys with values. A value appearing
/// under many keys collects all of them, sorted and deduplicated.
pub fn reverse_references(refers_to: &ReferenceMap) -> ReferenceMap {
    let mut referred_from = ReferenceMap::new();

    for (source, targets) in refers_to {
        for target in targets {
            referred_from
                .entry(target.clone())
                .or_insert_with(Vec::new)
                .push(source.clone());
        }
    }

    for sources in referred_from.values_mut() {
        sources.sort();
        sources.dedup();
    }

    referred_from
}

/// Seek references between notes and adjust their headers with `refers_to`
/// and `referred_from`. Notes present in neither map are not re-saved, so a
/// note whose references all disappeared keeps its old header entries. The
/// sweep aborts at the first load or save failure; writes already done stay.
pub fn link_notes(store: &mut dyn NoteStore) -> Result<()> {
    let all_refers_to = find_references(&*store)?;
    let all_referred_from = reverse_references(&all_refers_to);

    for uid in store.list().context("cannot list note uids")? {
        let refers_to = all_refers_to.get(&uid);
        let referred_from = all_referred_from.get(&uid);

        if refers_to.is_none() && referred_from.is_none() {
            continue;
        }

        let mut note = store
            .get(&uid)
            .context(format!("cannot load note with UID '{}'", uid))?;

        if let Some(refers_to) = refers_to {
            note.header.refers_to = refers_to.clone();
        }
        if let Some(referred_from) = referred_from {
            note.header.referred_from = referred_from.clone();
        }

        store
            .put(note)
            .context(format!("cannot save note with UID '{}'", uid))?;
    }

    Ok(())
}
