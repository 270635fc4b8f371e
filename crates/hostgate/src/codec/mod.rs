//! Configuration tree ⇄ JSON codec.
//!
//! Host configurations are addressed by URI (see [`ConfigUri`]) and rendered
//! as option trees merged from the schema and value dumps. Writes accept a
//! JSON patch of strings and objects and hand it to the addressed owner.
//! Configuration-domain failures are reported in the response payload as
//! `{"ERROR": "<message>"}`; the HTTP status stays 200.

mod access;
mod errors;
pub mod json;
mod patch;
mod uri;

pub use self::access::{OwnAddon, get_config, render_get, render_set, set_config};
pub use self::errors::{ConfigError, PatchShapeError, SetConfigError};
pub use self::patch::json_to_raw;
pub use self::uri::{
    ADDON_CONFIG_PREFIX, ConfigUri, GLOBAL_CONFIG_URI, INPUT_METHOD_CONFIG_PREFIX, from_http_path,
};

const CONFIG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::config");
