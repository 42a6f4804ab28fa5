//! Request body parsing and field validation
//!
//! Bodies arrive as raw bytes and are read field by field so that every
//! problem in a request is reported at once, keyed by field name.

use sea_orm::{ConnectionTrait, EntityTrait, PrimaryKeyTrait};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult, FieldErrors};

/// Maximum length of every string column
pub const MAX_NAME_LEN: usize = 50;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_INVALID_INT: &str = "A valid integer is required.";
pub const MSG_INVALID_STR: &str = "Not a valid string.";

/// PUT/POST carry every writable field; PATCH only the ones to change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

/// A decoded request body plus the errors found while reading it
pub struct Payload {
    fields: Map<String, Value>,
    mode: Mode,
    errors: FieldErrors,
}

impl Payload {
    /// Decode a JSON object body. An empty body reads as `{}`.
    pub fn parse(body: &[u8], mode: Mode) -> AppResult<Self> {
        let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice(body)?
        };

        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                mode,
                errors: FieldErrors::new(),
            }),
            other => {
                let mut errors = FieldErrors::new();
                errors.add(
                    NON_FIELD_ERRORS,
                    format!(
                        "Invalid data. Expected a dictionary, but got {}.",
                        json_type_name(&other)
                    ),
                );
                Err(AppError::Validation(errors))
            }
        }
    }

    /// Look a field up, recording missing/null errors. `None` means skip it.
    fn take(&mut self, name: &str) -> Option<Value> {
        match self.fields.remove(name) {
            None => {
                if self.mode == Mode::Full {
                    self.errors.add(name, MSG_REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.errors.add(name, MSG_NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Integer field. Accepts JSON integers, integral floats and numeric strings.
    pub fn integer(&mut self, name: &str) -> Option<i32> {
        let value = self.take(name)?;
        let parsed = match &value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => parse_int_str(s),
            _ => None,
        };

        match parsed.and_then(|n| i32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.errors.add(name, MSG_INVALID_INT);
                None
            }
        }
    }

    /// String field, trimmed, non-blank and at most `max_len` characters
    pub fn string(&mut self, name: &str, max_len: usize) -> Option<String> {
        let value = self.take(name)?;
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.errors.add(name, MSG_INVALID_STR);
                return None;
            }
        };

        if text.is_empty() {
            self.errors.add(name, MSG_BLANK);
            return None;
        }
        if text.chars().count() > max_len {
            self.errors.add(
                name,
                format!("Ensure this field has no more than {} characters.", max_len),
            );
            return None;
        }
        Some(text)
    }

    /// Foreign-key field holding the parent's primary key
    pub fn pk(&mut self, name: &str) -> Option<i32> {
        let value = self.take(name)?;
        let parsed = match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => parse_int_str(s),
            _ => None,
        };

        match parsed {
            Some(id) => match i32::try_from(id) {
                Ok(id) => Some(id),
                Err(_) => {
                    self.errors.add(name, does_not_exist(&id.to_string()));
                    None
                }
            },
            None => {
                self.errors.add(
                    name,
                    format!(
                        "Incorrect type. Expected pk value, received {}.",
                        json_type_name(&value)
                    ),
                );
                None
            }
        }
    }

    /// Check that `id` names an existing row of `E`, recording an error otherwise
    pub async fn require_exists<E, C>(&mut self, db: &C, name: &str, id: i32) -> AppResult<()>
    where
        E: EntityTrait,
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
        C: ConnectionTrait,
    {
        if E::find_by_id(id).one(db).await?.is_none() {
            self.errors.add(name, does_not_exist(&id.to_string()));
        }
        Ok(())
    }

    /// Finish reading: fails with every recorded field error
    pub fn finish(self) -> AppResult<()> {
        self.errors.into_result()
    }
}

/// Integer text, optionally followed by a decimal point and zeros ("7.0")
fn parse_int_str(s: &str) -> Option<i64> {
    let s = s.trim();
    let digits = match s.split_once('.') {
        Some((int, frac)) if frac.bytes().all(|b| b == b'0') => int,
        Some(_) => return None,
        None => s,
    };
    digits.parse::<i64>().ok()
}

fn does_not_exist(pk: &str) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
