//! Reading and writing the JSON interchange files.

use std::{fs, path::Path};

use log::debug;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};

use crate::common::error::{Error, Result};

/// Parse a file into an untyped document; shape checks are left to the caller.
pub fn read(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let value = serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;
    debug!("read {}", path.display());
    Ok(value)
}

/// Like [`read`], but the top level has to be a JSON object.
pub fn read_object(path: &Path) -> Result<serde_json::Map<String, Value>> {
    match read(path)? {
        Value::Object(object) => Ok(object),
        other => Err(Error::format(path, format!("expected a JSON object, found {}", kind(&other)))),
    }
}

/// Pretty-print `value` with four-space indentation, the layout the editors have always
/// written. The file is only replaced once serialization succeeded.
pub fn write<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser).map_err(|e| Error::json(path, e))?;
    fs::write(path, buf).map_err(|e| Error::io(path, e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
