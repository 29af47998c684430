use thiserror::Error as ThisError;

/// Delimiter framing composite-key namespaces and attribute values.
pub const COMPOSITE_KEY_DELIMITER: char = '\u{0}';

/// Highest scalar value; appended to a prefix to bound a prefix scan.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

///
/// CompositeKeyError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompositeKeyError {
    #[error("composite key namespace must not be empty")]
    EmptyNamespace,

    #[error("composite key component '{component}' contains a reserved character")]
    ReservedCharacter { component: String },

    #[error("key is not a composite key")]
    NotComposite,
}

///
/// CompositeKey
///
/// Index-entry key: `\0namespace\0value\0value\0...`.
///
/// Every component is terminated by the delimiter, so a key built from a
/// value prefix is a byte prefix of exactly the keys sharing those leading
/// values (`Security-Org` never prefixes `Security-Org2`).
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Build a full or partial composite key.
    pub fn new<S: AsRef<str>>(namespace: &str, values: &[S]) -> Result<Self, CompositeKeyError> {
        if namespace.is_empty() {
            return Err(CompositeKeyError::EmptyNamespace);
        }
        check_component(namespace)?;

        let mut key = String::with_capacity(
            namespace.len() + values.iter().map(|v| v.as_ref().len() + 1).sum::<usize>() + 2,
        );
        key.push(COMPOSITE_KEY_DELIMITER);
        key.push_str(namespace);
        key.push(COMPOSITE_KEY_DELIMITER);

        for value in values {
            let value = value.as_ref();
            check_component(value)?;
            key.push_str(value);
            key.push(COMPOSITE_KEY_DELIMITER);
        }

        Ok(Self(key))
    }

    /// Parse a raw ledger key back into a composite key.
    pub fn from_raw(raw: &str) -> Result<Self, CompositeKeyError> {
        if !is_composite(raw) || !raw.ends_with(COMPOSITE_KEY_DELIMITER) || raw.len() < 3 {
            return Err(CompositeKeyError::NotComposite);
        }

        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Split into namespace and attribute values.
    #[must_use]
    pub fn split(&self) -> (&str, Vec<&str>) {
        // Framing: leading delimiter, then one delimiter-terminated component each.
        let body = &self.0[COMPOSITE_KEY_DELIMITER.len_utf8()..];
        let mut parts = body.split_terminator(COMPOSITE_KEY_DELIMITER);
        let namespace = parts.next().unwrap_or_default();

        (namespace, parts.collect())
    }

    /// Last attribute value (the dereferenced primary key for index entries).
    #[must_use]
    pub fn last_value(&self) -> Option<&str> {
        self.split().1.last().copied()
    }

    /// Exclusive upper bound for a prefix scan over this key.
    #[must_use]
    pub fn prefix_end(&self) -> String {
        let mut end = self.0.clone();
        end.push(MAX_UNICODE_RUNE);
        end
    }
}

impl AsRef<str> for CompositeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a raw ledger key lives in the composite-key space.
#[must_use]
pub fn is_composite(raw: &str) -> bool {
    raw.starts_with(COMPOSITE_KEY_DELIMITER)
}

/// Reject components that would break key framing or prefix bounds.
pub fn check_component(component: &str) -> Result<(), CompositeKeyError> {
    if component.contains(COMPOSITE_KEY_DELIMITER) || component.contains(MAX_UNICODE_RUNE) {
        return Err(CompositeKeyError::ReservedCharacter {
            component: component.escape_debug().to_string(),
        });
    }

    Ok(())
}
