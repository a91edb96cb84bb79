//! The canonical field set and the ordered field mapping produced by the
//! schema normalizer.
//!
//! The canonical fields are the fixed attributes the structuring service is
//! asked to populate for every license-renewal form. The prompt contract
//! requires the service to emit `"N/A"` for fields absent from the document
//! rather than omitting the key; the normalizer does **not** backfill missing
//! keys itself. A reply missing canonical keys parses successfully but is
//! flagged by [`FieldMapping::missing_canonical`] so the orchestrator can
//! record a schema-incomplete warning.

use serde::Serialize;
use serde_json::Value;

/// Sentinel value the structuring service uses for data absent from the form.
pub const ABSENT_VALUE: &str = "N/A";

/// The fixed set of attributes extracted from every license-renewal form, in
/// canonical order. The structuring service may add further fields beyond
/// these; it must never omit one of them.
pub const CANONICAL_FIELDS: [&str; 14] = [
    "applicant_name",
    "license_number",
    "license_type",
    "expiry_date",
    "renewal_date",
    "address",
    "contact_number",
    "email",
    "payment_status",
    "payment_amount",
    "transaction_id",
    "date_of_birth",
    "previous_violations",
    "additional_notes",
];

/// An ordered mapping from field name to string value.
///
/// Order is the structuring service's insertion order, preserved all the way
/// through to spreadsheet column order. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    fields: Vec<(String, String)>,
}

impl FieldMapping {
    /// Build a mapping from a parsed JSON object, preserving key order.
    ///
    /// String values are taken as-is; any other JSON value (number, bool,
    /// nested structure) is rendered in its compact JSON form so nothing the
    /// service returned is silently dropped.
    pub fn from_json_object(object: serde_json::Map<String, Value>) -> Self {
        let fields = object
            .into_iter()
            .map(|(name, value)| {
                let rendered = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, rendered)
            })
            .collect();
        Self { fields }
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields in the mapping.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the mapping holds no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical fields the structuring service failed to include.
    ///
    /// Non-empty output means the reply violated the prompt contract; the
    /// orchestrator surfaces this as a warning, not a failure.
    pub fn missing_canonical(&self) -> Vec<&'static str> {
        CANONICAL_FIELDS
            .iter()
            .filter(|&&canonical| self.get(canonical).is_none())
            .copied()
            .collect()
    }

    /// Render the mapping as an ordered JSON object.
    pub fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (name, value) in &self.fields {
            object.insert(name.clone(), Value::String(value.clone()));
        }
        Value::Object(object)
    }
}
