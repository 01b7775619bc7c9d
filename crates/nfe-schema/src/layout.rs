use nfe_model::RecordCode;
use serde::Serialize;

use crate::error::SchemaError;

/// Ordered attribute names bound from one record type's positional values.
///
/// Stored in the pipe-delimited form `C|XNome|XFant|IE|`: the first segment
/// is the code and segment `i` names positional value `i`. An empty name
/// keeps its position but is never bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordLayout {
    code: RecordCode,
    fields: Vec<String>,
}

impl RecordLayout {
    pub fn parse(definition: &str) -> Result<Self, SchemaError> {
        let mut segments: Vec<&str> = definition.trim().split('|').collect();
        let raw_code = segments.remove(0);
        let code = RecordCode::normalize(raw_code);
        if code.is_empty() {
            return Err(SchemaError::InvalidLayout {
                code: definition.to_string(),
                message: "layout has no record code".to_string(),
            });
        }
        if segments.last().is_some_and(|last| last.trim().is_empty()) {
            segments.pop();
        }
        let fields = segments
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect();
        Ok(Self { code, fields })
    }

    pub fn new(code: RecordCode, fields: Vec<String>) -> Self {
        Self { code, fields }
    }

    pub fn code(&self) -> &RecordCode {
        &self.code
    }

    /// Attribute names by position; index 0 names positional value 1.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of positional values the layout declares.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Attribute names that are actually bound.
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// 1-based position of `name` in the record.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field == name)
            .map(|index| index + 1)
    }
}
