//! Event selection from a subscription path.

use strum::IntoEnumIterator;
use tracing::warn;

use super::SUBSCRIBE_TARGET;
use crate::events::EventKind;

const SUBSCRIBE_PATH: &str = "/subscribe";

/// Event kinds requested by `/subscribe/<name>+<name>...`.
///
/// Empty segments are skipped and unknown names are logged and skipped.
/// Repeated names are kept once, at their first position. A path naming no
/// event at all subscribes to every kind.
pub(crate) fn select_events(path: &str) -> Vec<EventKind> {
    let names = path
        .strip_prefix(SUBSCRIBE_PATH)
        .unwrap_or(path)
        .trim_start_matches('/');
    let segments: Vec<&str> = names.split('+').filter(|name| !name.is_empty()).collect();
    if segments.is_empty() {
        return EventKind::iter().collect();
    }

    let mut kinds = Vec::new();
    for name in segments {
        match name.parse::<EventKind>() {
            Ok(kind) if !kinds.contains(&kind) => kinds.push(kind),
            Ok(_) => {}
            Err(_) => warn!(target: SUBSCRIBE_TARGET, event = name, "unknown event"),
        }
    }
    kinds
}
