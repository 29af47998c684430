use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// `class` is the caller-facing taxonomy; `origin` names the component that
/// raised it.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a store-origin not-found error for one primary key.
    pub fn not_found(key: impl AsRef<str>) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Store,
            format!("the record {} does not exist", key.as_ref()),
        )
    }

    /// Construct a store-origin duplicate-key error for one primary key.
    pub fn already_exists(key: impl AsRef<str>) -> Self {
        Self::new(
            ErrorClass::AlreadyExists,
            ErrorOrigin::Store,
            format!("the record {} already exists", key.as_ref()),
        )
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unauthorized, ErrorOrigin::Access, message)
    }

    pub(crate) fn codec_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::MalformedRecord, ErrorOrigin::Codec, message)
    }

    pub(crate) fn store_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::MalformedRecord, ErrorOrigin::Store, message)
    }

    pub(crate) fn query_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::MalformedQuery, ErrorOrigin::Query, message)
    }

    pub(crate) fn cursor_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::MalformedQuery, ErrorOrigin::Cursor, message)
    }

    pub(crate) fn index_inconsistent(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::IndexInconsistent, ErrorOrigin::Index, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self.class, ErrorClass::AlreadyExists)
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.class, ErrorClass::Unauthorized)
    }

    /// Business errors are always reported to the caller and never retried.
    #[must_use]
    pub const fn is_business(&self) -> bool {
        self.class.is_business()
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
///
/// Caller-facing error taxonomy.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    NotFound,
    AlreadyExists,
    Unauthorized,
    MalformedRecord,
    MalformedQuery,
    StoreUnavailable,
    IndexInconsistent,
}

impl ErrorClass {
    #[must_use]
    pub const fn is_business(self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::AlreadyExists
                | Self::Unauthorized
                | Self::MalformedRecord
                | Self::MalformedQuery
        )
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Unauthorized => "unauthorized",
            Self::MalformedRecord => "malformed_record",
            Self::MalformedQuery => "malformed_query",
            Self::StoreUnavailable => "store_unavailable",
            Self::IndexInconsistent => "index_inconsistent",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Codec,
    Access,
    Store,
    Index,
    Query,
    Cursor,
    History,
    Ledger,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Codec => "codec",
            Self::Access => "access",
            Self::Store => "store",
            Self::Index => "index",
            Self::Query => "query",
            Self::Cursor => "cursor",
            Self::History => "history",
            Self::Ledger => "ledger",
        };
        write!(f, "{label}")
    }
}
