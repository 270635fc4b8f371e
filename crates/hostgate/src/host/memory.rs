//! In-memory [`Host`] used by the demo binary and the test-suite.

use std::collections::BTreeMap;

use super::{
    AddonInfo, ConfigDocument, Configurable, Host, InputMethodConfig, InputMethodInfo, RawConfig,
};

/// An addon held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAddon {
    configurable: bool,
    loadable: bool,
    config: Option<ConfigDocument>,
    sub_configs: BTreeMap<String, ConfigDocument>,
}

impl MemoryAddon {
    /// A loadable, configurable addon.
    #[must_use]
    pub const fn configurable(config: ConfigDocument) -> Self {
        Self {
            configurable: true,
            loadable: true,
            config: Some(config),
            sub_configs: BTreeMap::new(),
        }
    }

    /// A loadable addon without configuration.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            configurable: false,
            loadable: true,
            config: None,
            sub_configs: BTreeMap::new(),
        }
    }

    /// Registers a named sub-configuration.
    #[must_use]
    pub fn with_sub_config(mut self, path: impl Into<String>, config: ConfigDocument) -> Self {
        self.sub_configs.insert(path.into(), config);
        self
    }

    /// Marks the addon as failing to load.
    #[must_use]
    pub const fn unloadable(mut self) -> Self {
        self.loadable = false;
        self
    }

    /// Current configuration, for assertions.
    #[must_use]
    pub const fn current(&self) -> Option<&ConfigDocument> {
        self.config.as_ref()
    }
}

impl Configurable for MemoryAddon {
    fn config(&self) -> Option<ConfigDocument> {
        self.config.clone()
    }

    fn sub_config(&self, path: &str) -> Option<ConfigDocument> {
        self.sub_configs.get(path).cloned()
    }

    fn set_config(&mut self, patch: &RawConfig) {
        if let Some(config) = self.config.as_mut() {
            config.values.merge(patch);
        }
    }

    fn set_sub_config(&mut self, path: &str, patch: &RawConfig) {
        if let Some(config) = self.sub_configs.get_mut(path) {
            config.values.merge(patch);
        }
    }
}

/// Engine configuration for the input methods it serves.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    configs: BTreeMap<String, ConfigDocument>,
}

impl MemoryEngine {
    /// An engine with no per-input-method configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            configs: BTreeMap::new(),
        }
    }

    /// Registers the configuration of one input method.
    #[must_use]
    pub fn with_config(mut self, input_method: impl Into<String>, config: ConfigDocument) -> Self {
        self.configs.insert(input_method.into(), config);
        self
    }
}

impl InputMethodConfig for MemoryEngine {
    fn config_for(&self, input_method: &str) -> Option<ConfigDocument> {
        self.configs.get(input_method).cloned()
    }

    fn set_config_for(&mut self, input_method: &str, patch: &RawConfig) {
        if let Some(config) = self.configs.get_mut(input_method) {
            config.values.merge(patch);
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryInputMethod {
    configurable: bool,
    engine: Option<MemoryEngine>,
}

/// A complete host kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    global: ConfigDocument,
    global_saves_fail: bool,
    global_reloads: usize,
    addons: BTreeMap<String, MemoryAddon>,
    input_methods: BTreeMap<String, MemoryInputMethod>,
    current_input_method: String,
}

impl MemoryHost {
    /// A host whose global settings are `global`.
    #[must_use]
    pub fn new(global: ConfigDocument) -> Self {
        Self {
            global,
            ..Self::default()
        }
    }

    /// Registers an addon.
    #[must_use]
    pub fn with_addon(mut self, name: impl Into<String>, addon: MemoryAddon) -> Self {
        self.addons.insert(name.into(), addon);
        self
    }

    /// Registers an input method; `engine` is `None` when its engine cannot
    /// be loaded.
    #[must_use]
    pub fn with_input_method(
        mut self,
        name: impl Into<String>,
        configurable: bool,
        engine: Option<MemoryEngine>,
    ) -> Self {
        self.input_methods.insert(
            name.into(),
            MemoryInputMethod {
                configurable,
                engine,
            },
        );
        self
    }

    /// Sets the input method reported as current.
    pub fn set_current_input_method(&mut self, name: impl Into<String>) {
        self.current_input_method = name.into();
    }

    /// Makes every later global save fail.
    pub const fn fail_global_saves(&mut self) {
        self.global_saves_fail = true;
    }

    /// Number of reloads triggered by successful global saves.
    #[must_use]
    pub const fn global_reloads(&self) -> usize {
        self.global_reloads
    }

    /// Registered addon, for assertions.
    #[must_use]
    pub fn addon_state(&self, name: &str) -> Option<&MemoryAddon> {
        self.addons.get(name)
    }

    /// A small but representative host: global behaviour settings, a few
    /// addons in every registry state and three input methods.
    #[must_use]
    pub fn sample() -> Self {
        let mut host = Self::new(sample_global())
            .with_addon("clipboard", MemoryAddon::configurable(sample_clipboard()))
            .with_addon(
                "quickphrase",
                MemoryAddon::configurable(sample_clipboard())
                    .with_sub_config("editor", sample_editor()),
            )
            .with_addon("xcb", MemoryAddon::plain())
            .with_addon(
                "cloudpinyin",
                MemoryAddon::configurable(sample_clipboard()).unloadable(),
            )
            .with_input_method(
                "pinyin",
                true,
                Some(MemoryEngine::new().with_config("pinyin", sample_pinyin())),
            )
            .with_input_method("keyboard-us", false, Some(MemoryEngine::new()))
            .with_input_method("mozc", true, None)
            .with_input_method("anthy", true, Some(MemoryEngine::new()));
        host.set_current_input_method("keyboard-us");
        host
    }
}

impl Host for MemoryHost {
    fn global_config(&self) -> ConfigDocument {
        self.global.clone()
    }

    fn apply_global_config(&mut self, patch: &RawConfig) -> bool {
        if self.global_saves_fail {
            return false;
        }
        self.global.values.merge(patch);
        self.global_reloads += 1;
        true
    }

    fn addon_info(&self, name: &str) -> Option<AddonInfo> {
        self.addons.get(name).map(|addon| AddonInfo {
            configurable: addon.configurable,
        })
    }

    fn addon(&mut self, name: &str) -> Option<&mut dyn Configurable> {
        self.addons
            .get_mut(name)
            .filter(|addon| addon.loadable)
            .map(|addon| addon as &mut dyn Configurable)
    }

    fn input_method(&self, name: &str) -> Option<InputMethodInfo> {
        self.input_methods.get(name).map(|entry| InputMethodInfo {
            configurable: entry.configurable,
        })
    }

    fn input_method_engine(&mut self, name: &str) -> Option<&mut dyn InputMethodConfig> {
        self.input_methods
            .get_mut(name)
            .and_then(|entry| entry.engine.as_mut())
            .map(|engine| engine as &mut dyn InputMethodConfig)
    }

    fn current_input_method(&self) -> String {
        self.current_input_method.clone()
    }
}

fn option(kind: &str, description: &str, default: &str) -> RawConfig {
    RawConfig::new()
        .with_value("Type", kind)
        .with_value("Description", description)
        .with_value("DefaultValue", default)
}

fn sample_global() -> ConfigDocument {
    let share_state = option("Enum", "Share Input State", "No").with(
        "Enum",
        RawConfig::new()
            .with_value("0", "All")
            .with_value("1", "Program")
            .with_value("2", "No"),
    );
    let description = RawConfig::new()
        .with(
            "GlobalConfig",
            RawConfig::new().with(
                "Behavior",
                RawConfig::new()
                    .with_value("Type", "Behavior")
                    .with_value("Description", "Behavior"),
            ),
        )
        .with(
            "Behavior$Behavior",
            RawConfig::new()
                .with(
                    "ActiveByDefault",
                    option("Boolean", "Active By Default", "False"),
                )
                .with("ShareInputState", share_state),
        );
    let values = RawConfig::new().with(
        "Behavior",
        RawConfig::new()
            .with_value("ActiveByDefault", "False")
            .with_value("ShareInputState", "No"),
    );
    ConfigDocument::new(description, values)
}

fn sample_clipboard() -> ConfigDocument {
    let entries = option("Integer", "Number of entries", "5")
        .with_value("IntMin", "3")
        .with_value("IntMax", "30");
    let description = RawConfig::new().with(
        "Clipboard",
        RawConfig::new()
            .with("NumberOfEntries", entries)
            .with("PastePrimaryKey", option("List|Key", "Paste Primary", "")),
    );
    let values = RawConfig::new()
        .with_value("NumberOfEntries", "5")
        .with("PastePrimaryKey", RawConfig::new());
    ConfigDocument::new(description, values)
}

fn sample_editor() -> ConfigDocument {
    let description = RawConfig::new().with(
        "QuickPhraseEditor",
        RawConfig::new().with("File", option("String", "File", "default")),
    );
    let values = RawConfig::new().with_value("File", "default");
    ConfigDocument::new(description, values)
}

fn sample_pinyin() -> ConfigDocument {
    let description = RawConfig::new().with(
        "PinyinEngineConfig",
        RawConfig::new()
            .with("PageSize", option("Integer", "Page size", "7"))
            .with("CloudPinyinEnabled", option("Boolean", "Enable Cloud Pinyin", "False")),
    );
    let values = RawConfig::new()
        .with_value("PageSize", "7")
        .with_value("CloudPinyinEnabled", "False");
    ConfigDocument::new(description, values)
}
