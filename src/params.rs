//! Declarative parameter schemas and boundary validation.
//!
//! Each connector lists its accepted parameters as a static slice of
//! [`ParamSpec`]. The same data drives two things: the OpenAI
//! function-calling schema served to LLM tool layers, and validation of
//! incoming parameters before they are deserialized into a connector's
//! typed filter struct.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// JSON type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

/// One accepted parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    /// Legal values; empty means unrestricted.
    pub allowed: &'static [&'static str],
    pub default: Option<&'static str>,
}

impl ParamSpec {
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamType::String,
            description,
            allowed: &[],
            default: None,
        }
    }

    pub const fn integer(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamType::Integer,
            description,
            allowed: &[],
            default: None,
        }
    }

    pub const fn one_of(self, allowed: &'static [&'static str]) -> Self {
        Self { allowed, ..self }
    }

    pub const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    fn to_json(self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), Value::from(self.kind.as_str()));
        prop.insert("description".into(), Value::from(self.description));
        if !self.allowed.is_empty() {
            prop.insert(
                "enum".into(),
                Value::Array(self.allowed.iter().map(|v| Value::from(*v)).collect()),
            );
        }
        if let Some(default) = self.default {
            prop.insert("default".into(), Value::from(default));
        }
        Value::Object(prop)
    }
}

/// Types raw `key=value` strings by the declared parameter list.
///
/// Integer and boolean parameters are parsed when the text allows it;
/// everything else stays a string so `validate_params` reports mismatches.
/// Undeclared keys are kept as strings.
pub fn coerce_pairs(specs: &[ParamSpec], pairs: Vec<(String, String)>) -> Value {
    let mut map = Map::new();
    for (key, raw) in pairs {
        let kind = specs.iter().find(|s| s.name == key).map(|s| s.kind);
        let value = match kind {
            Some(ParamType::Integer) => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(raw)),
            Some(ParamType::Boolean) => raw
                .trim()
                .parse::<bool>()
                .map(Value::from)
                .unwrap_or(Value::String(raw)),
            _ => Value::String(raw),
        };
        map.insert(key, value);
    }
    Value::Object(map)
}

/// Sort parameters shared by every source.
pub const SORT_ORDER: ParamSpec =
    ParamSpec::string("sort_order", "Sort direction").one_of(&["asc", "desc"]).with_default("desc");

/// An LLM function-calling schema entry for one source.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSchema {
    /// `query_<source>`.
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Builds the JSON Schema object for a parameter list.
pub fn parameters_schema(specs: &[ParamSpec]) -> Value {
    let properties: Map<String, Value> = specs
        .iter()
        .map(|spec| (spec.name.to_string(), spec.to_json()))
        .collect();

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": []
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validates `params` against `specs` and returns only the declared keys.
///
/// Undeclared keys, `null` values and empty strings are dropped. Enum values match
/// case-insensitively and are replaced by their canonical spelling.
/// Declared defaults are injected for absent keys.
pub fn validate_params(specs: &[ParamSpec], params: &Value) -> Result<Map<String, Value>> {
    let empty = Map::new();
    let params_obj = match params {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => bail!("parameters must be an object, got {}", json_type_name(other)),
    };

    let mut result = Map::new();

    for spec in specs {
        let given = params_obj
            .get(spec.name)
            .filter(|v| !v.is_null() && v.as_str() != Some(""));
        match given {
            Some(value) => {
                if !spec.kind.accepts(value) {
                    bail!(
                        "parameter '{}' must be of type '{}', got {}",
                        spec.name,
                        spec.kind.as_str(),
                        json_type_name(value)
                    );
                }

                let value = match (spec.allowed.is_empty(), value.as_str()) {
                    (false, Some(given)) => {
                        let canonical = spec
                            .allowed
                            .iter()
                            .find(|allowed| allowed.eq_ignore_ascii_case(given));
                        match canonical {
                            Some(c) => Value::from(*c),
                            None => bail!(
                                "parameter '{}' must be one of [{}], got \"{}\"",
                                spec.name,
                                spec.allowed.join(", "),
                                given
                            ),
                        }
                    }
                    _ => value.clone(),
                };

                result.insert(spec.name.to_string(), value);
            }
            None => {
                if let Some(default) = spec.default {
                    result.insert(spec.name.to_string(), Value::from(default));
                }
            }
        }
    }

    Ok(result)
}
