//! Named RPC handlers reachable under `/controller/<method>[/<params>]`.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::host::Host;

/// Handler invoked on the host thread with the raw parameter string.
pub type ControllerHandler<H> = fn(&str, &H) -> Value;

/// Method name to handler table.
pub struct ControllerTable<H> {
    routes: BTreeMap<&'static str, ControllerHandler<H>>,
}

impl<H: Host> Default for ControllerTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> ControllerTable<H> {
    /// Table holding the built-in methods.
    #[must_use]
    pub fn new() -> Self {
        Self::empty().with_route("current_input_method", current_input_method::<H>)
    }

    /// Table without any method.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Adds or replaces a method.
    #[must_use]
    pub fn with_route(mut self, method: &'static str, handler: ControllerHandler<H>) -> Self {
        self.routes.insert(method, handler);
        self
    }

    /// Splits `path` at its first `/` into method and parameters and runs the
    /// method.
    ///
    /// Unknown methods yield `{"ERROR": "no such method: <method>"}`.
    #[must_use]
    pub fn dispatch(&self, path: &str, host: &H) -> Value {
        let (method, params) = path.split_once('/').unwrap_or((path, ""));
        match self.routes.get(method) {
            Some(handler) => handler(params, host),
            None => json!({ "ERROR": format!("no such method: {method}") }),
        }
    }
}

/// `current_input_method`: `{"input_method": "<name>"}`.
fn current_input_method<H: Host>(_params: &str, host: &H) -> Value {
    json!({ "input_method": host.current_input_method() })
}
