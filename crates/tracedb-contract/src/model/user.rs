use serde::{Deserialize, Serialize};
use tracedb_core::prelude::*;

///
/// User
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub username: String,

    #[serde(default)]
    pub name: String,
}

impl User {
    pub fn new(username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
        }
    }
}

impl Record for User {
    const KIND: &'static str = "user";
    const INDEX: IndexDescriptor = IndexDescriptor::new("users-by-name", &["name", "username"]);

    fn primary_key(&self) -> &str {
        &self.username
    }

    fn index_values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.username.as_str()]
    }

    fn validate(&self) -> Result<(), RecordError> {
        require_field(Self::KIND, "name", &self.name)
    }

    fn tombstone(primary_key: &str) -> Self {
        Self {
            username: primary_key.to_string(),
            name: String::new(),
        }
    }
}
