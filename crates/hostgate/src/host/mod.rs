//! Contract between the gateway and the application embedding it.
//!
//! Everything behind [`Host`] belongs to the host's own single-threaded loop.
//! The gateway never calls these methods from its I/O thread; requests cross
//! over through [`crate::dispatch::HostDispatcher`] and run on the host thread.

pub mod memory;
mod raw;

pub use self::raw::RawConfig;

/// Snapshot of one host configuration: its schema and its current values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    /// Schema dump: groups named `Path$...$TypeName`, each listing options
    /// with their `Type`, `Description`, `DefaultValue` and type-specific keys.
    pub description: RawConfig,
    /// Current values, mirroring (a subset of) the schema's option paths.
    pub values: RawConfig,
}

impl ConfigDocument {
    /// Pairs a schema dump with a value dump.
    #[must_use]
    pub const fn new(description: RawConfig, values: RawConfig) -> Self {
        Self {
            description,
            values,
        }
    }
}

/// Registry facts about an addon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddonInfo {
    /// Whether the addon exposes a configuration.
    pub configurable: bool,
}

/// Registry facts about an input method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMethodInfo {
    /// Whether the input method exposes a configuration.
    pub configurable: bool,
}

/// A loaded component that owns a configuration.
pub trait Configurable {
    /// Current configuration, if the component has one.
    fn config(&self) -> Option<ConfigDocument>;

    /// Named sub-configuration.
    fn sub_config(&self, path: &str) -> Option<ConfigDocument> {
        let _ = path;
        None
    }

    /// Applies a partial value tree and persists it.
    fn set_config(&mut self, patch: &RawConfig);

    /// Applies a partial value tree to a named sub-configuration.
    fn set_sub_config(&mut self, path: &str, patch: &RawConfig) {
        let _ = (path, patch);
    }
}

/// An input method engine able to configure the input methods it serves.
pub trait InputMethodConfig {
    /// Configuration of `input_method`.
    fn config_for(&self, input_method: &str) -> Option<ConfigDocument>;

    /// Applies a partial value tree to `input_method`'s configuration.
    fn set_config_for(&mut self, input_method: &str, patch: &RawConfig);
}

/// Host-side state reachable from gateway requests.
///
/// Implementations run exclusively on the host thread.
pub trait Host: 'static {
    /// Global settings of the host.
    fn global_config(&self) -> ConfigDocument;

    /// Loads `patch` into the global settings, persists them and asks the host
    /// to reload. Returns `false` when persisting fails.
    fn apply_global_config(&mut self, patch: &RawConfig) -> bool;

    /// Looks up an addon in the registry without loading it.
    fn addon_info(&self, name: &str) -> Option<AddonInfo>;

    /// Loads the addon on demand.
    fn addon(&mut self, name: &str) -> Option<&mut dyn Configurable>;

    /// Looks up an input method entry.
    fn input_method(&self, name: &str) -> Option<InputMethodInfo>;

    /// Engine serving the input method, loading it on demand.
    fn input_method_engine(&mut self, name: &str) -> Option<&mut dyn InputMethodConfig>;

    /// Name of the input method active in the focused input context.
    fn current_input_method(&self) -> String;
}

/// Identity of an input context as seen by event subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputContextInfo {
    /// Stable identifier of the input context.
    pub uuid: [u8; 16],
    /// Program owning the input context.
    pub program: String,
    /// Frontend the input context arrived through.
    pub frontend: String,
}

/// Host events the gateway can relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// An input context gained focus.
    FocusIn(InputContextInfo),
    /// An input context lost focus.
    FocusOut(InputContextInfo),
    /// The input method of an input context changed.
    SwitchInputMethod {
        /// The affected input context.
        context: InputContextInfo,
        /// Name of the input method now active for `context`.
        input_method: String,
    },
}
