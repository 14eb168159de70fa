//! Deduplicated warnings for tolerated contract violations.
//!
//! Layout contract violations abort debug builds through `debug_assert!`.
//! Release builds keep going with best-effort geometry and report each unique
//! violation once, so a malformed tree does not flood the log.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Report a problem once per unique `component`/`message` pair.
///
/// The first report is emitted as a `tracing` warning event; repeats are
/// dropped until [`clear_warnings`] is called.
///
/// # Example
/// ```ignore
/// warn_once("Layout", "box #7 is not a descendant of box #2");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if should_emit {
        tracing::warn!(component, "{message}");
    }
}

/// Whether `message` has already been reported for `component`.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Clear all recorded warnings (call between independent layout runs).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
