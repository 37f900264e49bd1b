//! Medication alternatives and the JSON interpreter for them

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::sync::LazyLock;

use crate::error::InterpretError;

/// Code-fence markers with an optional language tag (```` ```json ````)
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+-]*[ \t]*\r?\n?").unwrap());

/// Type assumed when the model leaves it out
const DEFAULT_TYPE: &str = "Generic";

/// One market alternative for a medication
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternativeRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
    pub manufacturer: String,
    pub note: String,
}

impl AlternativeRecord {
    /// All fields except `note` must be present
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.kind.is_empty()
            && !self.price.is_empty()
            && !self.manufacturer.is_empty()
    }

    pub fn is_generic(&self) -> bool {
        self.kind.eq_ignore_ascii_case("generic")
    }

    pub fn is_brand(&self) -> bool {
        self.kind.eq_ignore_ascii_case("brand")
    }

    fn from_json(obj: &Map<String, JsonValue>) -> Self {
        let kind = text_field(obj, "type");
        Self {
            name: text_field(obj, "name"),
            kind: if kind.is_empty() {
                DEFAULT_TYPE.to_string()
            } else {
                kind
            },
            price: text_field(obj, "price"),
            manufacturer: text_field(obj, "manufacturer"),
            note: text_field(obj, "note"),
        }
    }
}

/// Scalar field as text; absent, null and nested values read as empty
fn text_field(obj: &Map<String, JsonValue>, key: &str) -> String {
    match obj.get(key) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(JsonValue::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Alternatives found for one queried medication
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativesRecord {
    medication_name: String,
    alternatives: Vec<AlternativeRecord>,
}

impl AlternativesRecord {
    pub fn new(medication_name: impl Into<String>, alternatives: Vec<AlternativeRecord>) -> Self {
        Self {
            medication_name: medication_name.into(),
            alternatives,
        }
    }

    /// Interpret the model's JSON answer for `medication_name`.
    ///
    /// Code fences around the payload are removed first. An empty
    /// `alternatives` list is not an error here.
    pub fn from_model_output(raw: &str, medication_name: &str) -> Result<Self, InterpretError> {
        let sanitized = strip_code_fences(raw);

        let json: JsonValue =
            serde_json::from_str(&sanitized).map_err(|source| InterpretError::InvalidJson {
                raw: sanitized.clone(),
                source,
            })?;

        let Some(root) = json.as_object() else {
            return Err(InterpretError::UnexpectedShape {
                raw: sanitized,
                reason: "top-level value is not an object".to_string(),
            });
        };

        let items = match root.get("alternatives") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| item.as_object().map(AlternativeRecord::from_json))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| InterpretError::UnexpectedShape {
                    raw: sanitized.clone(),
                    reason: "`alternatives` contains a non-object entry".to_string(),
                })?,
            Some(_) => {
                return Err(InterpretError::UnexpectedShape {
                    raw: sanitized,
                    reason: "`alternatives` is not an array".to_string(),
                });
            }
        };

        Ok(Self::new(medication_name, items))
    }

    pub fn medication_name(&self) -> &str {
        &self.medication_name
    }

    pub fn alternatives(&self) -> &[AlternativeRecord] {
        &self.alternatives
    }

    pub fn count(&self) -> usize {
        self.alternatives.len()
    }

    pub fn generics(&self) -> impl Iterator<Item = &AlternativeRecord> {
        self.alternatives.iter().filter(|a| a.is_generic())
    }

    pub fn brands(&self) -> impl Iterator<Item = &AlternativeRecord> {
        self.alternatives.iter().filter(|a| a.is_brand())
    }

    pub fn has_alternatives(&self) -> bool {
        !self.alternatives.is_empty()
    }

    /// True when every contained alternative is valid
    pub fn is_valid(&self) -> bool {
        self.alternatives.iter().all(AlternativeRecord::is_valid)
    }
}

/// Remove every code-fence marker and trim. Purely textual.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}
