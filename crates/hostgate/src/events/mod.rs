//! Host events relayed to subscribers, and their wire representation.
//!
//! Every event is flattened into a string-keyed parameter map and wrapped in
//! an envelope of the form `{"event": "<name>", "params": {...}}`.

mod hub;

use std::collections::BTreeMap;

use serde_json::json;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::host::{HostEvent, InputContextInfo};

pub use self::hub::{EventHandler, EventHub, EventSource, WatchGuard};

/// Event types a client can subscribe to, by wire name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// `input_context_focus_in`
    InputContextFocusIn,
    /// `input_context_focus_out`
    InputContextFocusOut,
    /// `input_context_switch_input_method`
    InputContextSwitchInputMethod,
}

impl EventKind {
    /// Kind of a host event.
    #[must_use]
    pub const fn of(event: &HostEvent) -> Self {
        match event {
            HostEvent::FocusIn(_) => Self::InputContextFocusIn,
            HostEvent::FocusOut(_) => Self::InputContextFocusOut,
            HostEvent::SwitchInputMethod { .. } => Self::InputContextSwitchInputMethod,
        }
    }

    /// Wire name of the event.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Flattens an event into its parameter map.
#[must_use]
pub fn extract_params(event: &HostEvent) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    match event {
        HostEvent::FocusIn(context) | HostEvent::FocusOut(context) => {
            insert_context_params(context, &mut params);
        }
        HostEvent::SwitchInputMethod {
            context,
            input_method,
        } => {
            insert_context_params(context, &mut params);
            params.insert("input_method".to_owned(), input_method.clone());
        }
    }
    params
}

fn insert_context_params(context: &InputContextInfo, params: &mut BTreeMap<String, String>) {
    params.insert("uuid".to_owned(), uuid_hex(&context.uuid));
    params.insert("program".to_owned(), context.program.clone());
    params.insert("frontend".to_owned(), context.frontend.clone());
}

fn uuid_hex(uuid: &[u8; 16]) -> String {
    uuid.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Serialises the message sent to subscribers.
#[must_use]
pub fn envelope(kind: EventKind, params: &BTreeMap<String, String>) -> String {
    json!({ "event": kind.name(), "params": params }).to_string()
}
