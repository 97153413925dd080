//! Opcode line codec.
//!
//! One command serializes to one line of the form
//! `Tag&key1=value1&key2=value2`. Values are percent-encoded so the
//! separators `&`, `=` and `@` never appear inside them. Numbers use nine
//! decimals, vectors are `x,y,z` and name lists are joined with `@`.

use easel_core::{ScriptError, SphereVector};
use nalgebra::Vector3;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Separates the tag and the fields of a line.
pub const FIELD_SEPARATOR: char = '&';
/// Separates a key from its value.
pub const KEY_VALUE_SEPARATOR: char = '=';
/// Joins the entries of a name list.
pub const LIST_SEPARATOR: char = '@';
/// Fixed precision of serialized numbers.
pub const DECIMAL_PLACES: usize = 9;

const RESERVED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'&')
    .add(b'/')
    .add(b'=')
    .add(b'@');

/// Percent-encodes every reserved character of `value`.
pub fn escape(value: &str) -> String {
    utf8_percent_encode(value, RESERVED).to_string()
}

/// Reverses [`escape`].
pub fn unescape(value: &str) -> Result<String, ScriptError> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| ScriptError::InvalidValue {
            field: String::new(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

pub fn format_number(value: f64) -> String {
    format!("{:.*}", DECIMAL_PLACES, value)
}

pub fn format_vector(v: &SphereVector) -> String {
    format!(
        "{},{},{}",
        format_number(v.x),
        format_number(v.y),
        format_number(v.z)
    )
}

/// A decoded or under-construction opcode line.
///
/// Field values are held in escaped form; accessors unescape on read.
#[derive(Debug, Clone, PartialEq)]
pub struct OpcodeRecord {
    tag: String,
    fields: Vec<(String, String)>,
}

impl OpcodeRecord {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    fn push_raw(mut self, key: &str, escaped: String) -> Self {
        self.fields.retain(|(k, _)| k != key);
        self.fields.push((key.to_string(), escaped));
        self
    }

    pub fn with_text(self, key: &str, value: &str) -> Self {
        self.push_raw(key, escape(value))
    }

    pub fn with_number(self, key: &str, value: f64) -> Self {
        self.push_raw(key, format_number(value))
    }

    pub fn with_integer(self, key: &str, value: usize) -> Self {
        self.push_raw(key, value.to_string())
    }

    pub fn with_flag(self, key: &str, value: bool) -> Self {
        self.push_raw(key, value.to_string())
    }

    pub fn with_vector(self, key: &str, value: &SphereVector) -> Self {
        self.push_raw(key, format_vector(value))
    }

    pub fn with_names<S: AsRef<str>>(self, key: &str, names: &[S]) -> Self {
        let joined = names
            .iter()
            .map(|n| escape(n.as_ref()))
            .collect::<Vec<_>>()
            .join(&LIST_SEPARATOR.to_string());
        self.push_raw(key, joined)
    }

    /// Stores a JSON-serialized value as text.
    pub fn with_json<T: Serialize>(self, key: &str, value: &T) -> Result<Self, ScriptError> {
        let json = serde_json::to_string(value).map_err(|e| ScriptError::InvalidValue {
            field: key.to_string(),
            value: String::new(),
            reason: e.to_string(),
        })?;
        Ok(self.with_text(key, &json))
    }

    /// Renders the record as one opcode line.
    pub fn encode(&self) -> String {
        let mut line = self.tag.clone();
        for (key, value) in &self.fields {
            line.push(FIELD_SEPARATOR);
            line.push_str(key);
            line.push(KEY_VALUE_SEPARATOR);
            line.push_str(value);
        }
        line
    }

    /// Parses one opcode line.
    pub fn decode(line: &str) -> Result<Self, ScriptError> {
        let malformed = |reason: &str| ScriptError::Malformed {
            line_number: 0,
            reason: reason.to_string(),
        };

        let line = line.trim();
        let mut parts = line.split(FIELD_SEPARATOR);
        let tag = parts.next().unwrap_or_default();
        if tag.is_empty() || tag.contains(KEY_VALUE_SEPARATOR) {
            return Err(malformed("missing command tag"));
        }

        let mut record = OpcodeRecord::new(tag);
        for part in parts {
            let (key, value) = part
                .split_once(KEY_VALUE_SEPARATOR)
                .ok_or_else(|| malformed(&format!("field '{}' has no value", part)))?;
            if key.is_empty() {
                return Err(malformed("empty field name"));
            }
            if record.raw(key).is_some() {
                return Err(malformed(&format!("duplicate field '{}'", key)));
            }
            record.fields.push((key.to_string(), value.to_string()));
        }
        Ok(record)
    }

    /// Escaped value of `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required(&self, key: &str) -> Result<&str, ScriptError> {
        self.raw(key).ok_or_else(|| ScriptError::MissingField {
            tag: self.tag.clone(),
            field: key.to_string(),
        })
    }

    fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ScriptError {
        ScriptError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    pub fn text(&self, key: &str) -> Result<String, ScriptError> {
        let raw = self.required(key)?;
        unescape(raw).map_err(|e| match e {
            ScriptError::InvalidValue { value, reason, .. } => Self::invalid(key, &value, reason),
            other => other,
        })
    }

    pub fn optional_text(&self, key: &str) -> Result<Option<String>, ScriptError> {
        if self.has(key) {
            self.text(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn number(&self, key: &str) -> Result<f64, ScriptError> {
        let text = self.text(key)?;
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(Self::invalid(key, &text, "not a finite number")),
            Err(e) => Err(Self::invalid(key, &text, e.to_string())),
        }
    }

    pub fn integer(&self, key: &str) -> Result<usize, ScriptError> {
        let text = self.text(key)?;
        text.trim()
            .parse::<usize>()
            .map_err(|e| Self::invalid(key, &text, e.to_string()))
    }

    pub fn flag(&self, key: &str) -> Result<bool, ScriptError> {
        let text = self.text(key)?;
        match text.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Self::invalid(key, &text, "expected true or false")),
        }
    }

    pub fn optional_flag(&self, key: &str) -> Result<Option<bool>, ScriptError> {
        if self.has(key) {
            self.flag(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn vector(&self, key: &str) -> Result<SphereVector, ScriptError> {
        let text = self.text(key)?;
        let components = text
            .split(',')
            .map(|c| c.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Self::invalid(key, &text, e.to_string()))?;
        match components.as_slice() {
            [x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => {
                Ok(Vector3::new(*x, *y, *z))
            }
            _ => Err(Self::invalid(key, &text, "expected three finite components")),
        }
    }

    pub fn names(&self, key: &str) -> Result<Vec<String>, ScriptError> {
        let raw = self.required(key)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        raw.split(LIST_SEPARATOR)
            .map(|name| {
                unescape(name).map_err(|e| match e {
                    ScriptError::InvalidValue { value, reason, .. } => {
                        Self::invalid(key, &value, reason)
                    }
                    other => other,
                })
            })
            .collect()
    }

    pub fn json<T: DeserializeOwned>(&self, key: &str) -> Result<T, ScriptError> {
        let text = self.text(key)?;
        serde_json::from_str(&text).map_err(|e| Self::invalid(key, &text, e.to_string()))
    }
}
