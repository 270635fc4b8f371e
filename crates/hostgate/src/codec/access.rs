//! Reads and writes of live host configurations addressed by URI.
//!
//! Everything here runs on the host thread.

use serde_json::{Value, json};
use tracing::{debug, error};

use super::errors::ERROR_KEY;
use super::json::config_to_json;
use super::patch::json_to_raw;
use super::{CONFIG_TARGET, ConfigError, ConfigUri, SetConfigError};
use crate::host::{ConfigDocument, Configurable, Host, RawConfig};

/// Addon whose configuration the gateway serves itself instead of the host's
/// addon registry.
pub struct OwnAddon<'a> {
    name: &'a str,
    config: &'a mut dyn Configurable,
}

impl<'a> OwnAddon<'a> {
    /// Serves `config` under the addon name `name`.
    pub fn new(name: &'a str, config: &'a mut dyn Configurable) -> Self {
        Self { name, config }
    }
}

/// Resolves `uri` and renders the addressed configuration.
///
/// # Errors
///
/// Returns the [`ConfigError`] describing why the configuration cannot be
/// produced.
pub fn get_config<H>(host: &mut H, own: OwnAddon<'_>, uri: &str) -> Result<Value, ConfigError>
where
    H: Host + ?Sized,
{
    debug!(target: CONFIG_TARGET, uri, "get config");
    let document = match ConfigUri::parse(uri)? {
        ConfigUri::Global => host.global_config(),
        ConfigUri::Addon { name, sub_path } if name == own.name => {
            addon_document(&*own.config, name, sub_path)?
        }
        ConfigUri::Addon { name, sub_path } => {
            let info = host.addon_info(name).ok_or_else(|| ConfigError::UnknownAddon {
                name: name.to_owned(),
            })?;
            if !info.configurable {
                return Err(ConfigError::AddonNotConfigurable {
                    name: name.to_owned(),
                });
            }
            let addon = host
                .addon(name)
                .ok_or_else(|| ConfigError::AddonConfigUnavailable {
                    name: name.to_owned(),
                })?;
            addon_document(&*addon, name, sub_path)?
        }
        ConfigUri::InputMethod { name } => input_method_document(host, name)?,
    };
    Ok(config_to_json(&document))
}

/// Renders the result of [`get_config`] as a response body.
#[must_use]
pub fn render_get(result: &Result<Value, ConfigError>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(error) => error.to_json().to_string(),
    }
}

fn addon_document(
    addon: &dyn Configurable,
    name: &str,
    sub_path: Option<&str>,
) -> Result<ConfigDocument, ConfigError> {
    let document = match sub_path {
        Some(path) => addon.sub_config(path),
        None => addon.config(),
    };
    document.ok_or_else(|| ConfigError::AddonConfigUnavailable {
        name: name.to_owned(),
    })
}

fn input_method_document<H>(host: &mut H, name: &str) -> Result<ConfigDocument, ConfigError>
where
    H: Host + ?Sized,
{
    let entry = host
        .input_method(name)
        .ok_or_else(|| ConfigError::UnknownInputMethod {
            name: name.to_owned(),
        })?;
    if !entry.configurable {
        return Err(ConfigError::InputMethodNotConfigurable {
            name: name.to_owned(),
        });
    }
    let engine = host
        .input_method_engine(name)
        .ok_or_else(|| ConfigError::EngineUnavailable {
            name: name.to_owned(),
        })?;
    engine
        .config_for(name)
        .ok_or_else(|| ConfigError::InputMethodConfigUnavailable {
            name: name.to_owned(),
        })
}

/// Applies a JSON patch to the configuration addressed by `uri`.
///
/// Returns whether the host accepted the patch. A patch containing anything
/// other than strings and objects aborts the process: such input cannot come
/// from a well-behaved client and there is no partial state worth keeping.
///
/// # Errors
///
/// Returns [`SetConfigError::InvalidJson`] when `body` is not JSON.
pub fn set_config<H>(
    host: &mut H,
    own: OwnAddon<'_>,
    uri: &str,
    body: &[u8],
) -> Result<bool, SetConfigError>
where
    H: Host + ?Sized,
{
    debug!(target: CONFIG_TARGET, uri, "set config");
    let json: Value = serde_json::from_slice(body)?;
    let patch = match json_to_raw(&json) {
        Ok(patch) => patch,
        Err(shape) => {
            error!(target: CONFIG_TARGET, uri, error = %shape, "malformed configuration patch");
            std::process::abort();
        }
    };
    Ok(apply_patch(host, own, uri, &patch))
}

fn apply_patch<H>(host: &mut H, own: OwnAddon<'_>, uri: &str, patch: &RawConfig) -> bool
where
    H: Host + ?Sized,
{
    let Ok(target) = ConfigUri::parse(uri) else {
        return false;
    };
    match target {
        ConfigUri::Global => host.apply_global_config(patch),
        ConfigUri::Addon { name, sub_path } if name == own.name => {
            store_addon_patch(own.config, sub_path, patch);
            true
        }
        ConfigUri::Addon { name, sub_path } => match host.addon(name) {
            Some(addon) => {
                debug!(target: CONFIG_TARGET, uri, "saving addon config");
                store_addon_patch(addon, sub_path, patch);
                true
            }
            None => {
                error!(target: CONFIG_TARGET, addon = name, "failed to get addon");
                false
            }
        },
        ConfigUri::InputMethod { name } => {
            if host.input_method(name).is_none() {
                error!(target: CONFIG_TARGET, input_method = name, "failed to get input method");
                return false;
            }
            match host.input_method_engine(name) {
                Some(engine) => {
                    debug!(target: CONFIG_TARGET, uri, "saving input method config");
                    engine.set_config_for(name, patch);
                    true
                }
                None => {
                    error!(target: CONFIG_TARGET, input_method = name, "failed to get input method engine");
                    false
                }
            }
        }
    }
}

fn store_addon_patch(addon: &mut dyn Configurable, sub_path: Option<&str>, patch: &RawConfig) {
    match sub_path {
        Some(path) => addon.set_sub_config(path, patch),
        None => addon.set_config(patch),
    }
}

/// Renders the outcome of [`set_config`] as a response body.
#[must_use]
pub fn render_set(applied: bool) -> String {
    if applied {
        json!({}).to_string()
    } else {
        json!({ ERROR_KEY: "Failed to set config" }).to_string()
    }
}
