use crate::{
    db::codec::{KIND_FIELD, Record},
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error as ThisError;

///
/// SelectorError
///

#[derive(Debug, ThisError)]
pub enum SelectorError {
    #[error("invalid selector query: {0}")]
    Parse(String),

    #[error("selector field name must not be empty")]
    EmptyField,

    #[error("selector field '{0}' must not start with '$'")]
    OperatorAsField(String),

    #[error("failed to encode selector query: {0}")]
    Encode(String),
}

impl From<SelectorError> for InternalError {
    fn from(err: SelectorError) -> Self {
        Self::new(ErrorClass::MalformedQuery, ErrorOrigin::Query, err.to_string())
    }
}

///
/// IndexHint
///
/// `use_index` value: an index name or a `[design_doc, index_name]` pair.
/// Hosts may use it to pick an index; results never depend on it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndexHint {
    Name(String),
    DesignDoc([String; 2]),
}

///
/// Selector
///
/// Rich query of the shape `{"selector": {...}, "use_index": ...}`.
///
/// Field predicates are passed to the host as-is; plain equality is the
/// only portable form, operators such as `$gte` are host extensions.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Selector {
    selector: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    use_index: Option<IndexHint>,
}

impl Selector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector pinned to one record kind.
    #[must_use]
    pub fn for_kind<R: Record>() -> Self {
        let mut selector = Self::new();
        selector
            .selector
            .insert(KIND_FIELD.to_string(), Value::String(R::KIND.to_string()));

        selector
    }

    /// Parse a caller-supplied query string.
    pub fn parse(query: &str) -> Result<Self, SelectorError> {
        let selector: Self =
            serde_json::from_str(query).map_err(|err| SelectorError::Parse(err.to_string()))?;

        for field in selector.selector.keys() {
            if field.is_empty() {
                return Err(SelectorError::EmptyField);
            }
        }

        Ok(selector)
    }

    /// Add an equality predicate.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Result<Self, SelectorError> {
        check_field(field)?;
        self.selector.insert(field.to_string(), value.into());

        Ok(self)
    }

    /// Add a half-open range predicate `start <= field < end`.
    /// An empty bound is left open.
    pub fn range(mut self, field: &str, start: &str, end: &str) -> Result<Self, SelectorError> {
        check_field(field)?;

        let mut bounds = Map::new();
        if !start.is_empty() {
            bounds.insert("$gte".to_string(), Value::String(start.to_string()));
        }
        if !end.is_empty() {
            bounds.insert("$lt".to_string(), Value::String(end.to_string()));
        }
        if bounds.is_empty() {
            bounds.insert("$exists".to_string(), Value::Bool(true));
        }
        self.selector.insert(field.to_string(), Value::Object(bounds));

        Ok(self)
    }

    /// Add an inclusive range predicate `low <= field <= high`.
    pub fn between(mut self, field: &str, low: &str, high: &str) -> Result<Self, SelectorError> {
        check_field(field)?;

        let mut bounds = Map::new();
        bounds.insert("$gte".to_string(), Value::String(low.to_string()));
        bounds.insert("$lte".to_string(), Value::String(high.to_string()));
        self.selector.insert(field.to_string(), Value::Object(bounds));

        Ok(self)
    }

    #[must_use]
    pub fn use_index(mut self, hint: IndexHint) -> Self {
        self.use_index = Some(hint);
        self
    }

    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.selector
    }

    #[must_use]
    pub const fn index_hint(&self) -> Option<&IndexHint> {
        self.use_index.as_ref()
    }

    /// Render the query string handed to the host.
    pub fn to_query_string(&self) -> Result<String, SelectorError> {
        serde_json::to_string(self).map_err(|err| SelectorError::Encode(err.to_string()))
    }
}

fn check_field(field: &str) -> Result<(), SelectorError> {
    if field.is_empty() {
        return Err(SelectorError::EmptyField);
    }
    if field.starts_with('$') {
        return Err(SelectorError::OperatorAsField(field.to_string()));
    }

    Ok(())
}
