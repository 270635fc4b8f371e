//! Conversion of client JSON patches into host configuration trees.

use serde_json::Value;

use super::PatchShapeError;
use crate::host::RawConfig;

/// Converts a JSON patch into a raw configuration tree.
///
/// Strings become leaf values and objects become option groups whose members
/// are converted recursively.
///
/// # Errors
///
/// Returns [`PatchShapeError`] for any other JSON kind, anywhere in the
/// document.
pub fn json_to_raw(patch: &Value) -> Result<RawConfig, PatchShapeError> {
    let mut raw = RawConfig::new();
    fill(patch, &mut raw)?;
    Ok(raw)
}

fn fill(patch: &Value, node: &mut RawConfig) -> Result<(), PatchShapeError> {
    match patch {
        Value::String(text) => {
            node.set_value(text.as_str());
            Ok(())
        }
        Value::Object(members) => members
            .iter()
            .try_for_each(|(key, member)| fill(member, node.get_or_insert(key))),
        other => Err(PatchShapeError {
            kind: kind_name(other),
            json: other.to_string(),
        }),
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
