//! Pagination over the three query shapes.
//!
//! Selector pages are driven by the host: its bookmark is passed through
//! untouched. Range and attribute pages are driven here: the bookmark is a
//! signed continuation token naming the last key emitted, and the next page
//! resumes strictly after it.

mod token;


pub use token::TokenWireError;

use crate::{
    db::{
        codec::{COMPOSITE_KEY_DELIMITER, Record},
        ledger::{KeyValue, LedgerState},
        query::{self, Selector},
    },
    error::{ErrorClass, InternalError},
    obs::sink::{ExecKind, Span},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use token::{ContinuationToken, PageSignature};

const SHAPE_RANGE: u8 = 0x01;
const SHAPE_ATTRIBUTE: u8 = 0x02;

///
/// PageQuery
///

#[derive(Clone, Debug, PartialEq)]
pub enum PageQuery {
    /// Primary keys in `[start, end)`; empty bounds are open.
    Range { start: String, end: String },

    /// Index entries sharing `(namespace, values...)`.
    Attribute {
        namespace: String,
        values: Vec<String>,
    },

    Selector(Selector),
}

impl PageQuery {
    #[must_use]
    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Range {
            start: start.into(),
            end: end.into(),
        }
    }

    #[must_use]
    pub fn attribute(namespace: impl Into<String>, values: &[&str]) -> Self {
        Self::Attribute {
            namespace: namespace.into(),
            values: values.iter().map(ToString::to_string).collect(),
        }
    }
}

///
/// Bookmark
///
/// Opaque continuation string. Empty means "first page" on input and
/// "no further pages" on output; otherwise echo it back unchanged.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bookmark(String);

impl Bookmark {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub const fn first() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Bookmark {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for Bookmark {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

///
/// PaginatedResult
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<R> {
    pub records: Vec<R>,
    pub fetched_records_count: u32,
    pub bookmark: Bookmark,
}

impl<R> PaginatedResult<R> {
    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        !self.bookmark.is_empty()
    }
}

///
/// Paginator
///

pub struct Paginator<'a, S: ?Sized> {
    state: &'a S,
}

impl<'a, S: LedgerState + ?Sized> Paginator<'a, S> {
    pub const fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Fetch one page of at most `page_size` records of kind `R`.
    ///
    /// Threading each returned bookmark into the next call walks the full
    /// result set once, in unpaginated order, as long as the matching
    /// records are not mutated between calls.
    pub fn page<R: Record>(
        &self,
        query: &PageQuery,
        page_size: u32,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<R>, InternalError> {
        let mut span = Span::new(ExecKind::Page, R::KIND);

        if page_size == 0 {
            return Err(InternalError::cursor_malformed(
                "page size must be a positive integer",
            ));
        }

        let result = match query {
            PageQuery::Selector(selector) => self.selector_page(selector, page_size, bookmark)?,
            PageQuery::Range { start, end } => {
                let signature =
                    PageSignature::compute(R::KIND, SHAPE_RANGE, &[start.as_str(), end.as_str()]);
                self.scan_page(signature, start, end, page_size, bookmark, |_, entry| {
                    query::primary_hit::<R>(entry)
                })?
            }
            PageQuery::Attribute { namespace, values } => {
                let values: Vec<&str> = values.iter().map(String::as_str).collect();
                let prefix = query::attribute_prefix::<R>(namespace, &values)?;

                let mut components = vec![namespace.as_str()];
                components.extend(values.iter().copied());
                let signature = PageSignature::compute(R::KIND, SHAPE_ATTRIBUTE, &components);

                self.scan_page(
                    signature,
                    prefix.as_str(),
                    &prefix.prefix_end(),
                    page_size,
                    bookmark,
                    |state, entry| query::dereference::<R, S>(state, &entry.key).map(Some),
                )?
            }
        };

        log::debug!(
            "cursor: page of {} ({} rows, more: {})",
            R::KIND,
            result.fetched_records_count,
            result.has_more()
        );
        span.set_rows(u64::from(result.fetched_records_count));

        Ok(result)
    }

    fn selector_page<R: Record>(
        &self,
        selector: &Selector,
        page_size: u32,
        bookmark: &Bookmark,
    ) -> Result<PaginatedResult<R>, InternalError> {
        let query = selector.to_query_string()?;
        let (hits, metadata) = self
            .state
            .rich_query_paginated(&query, page_size, bookmark.as_str())?;

        let mut records = Vec::new();
        for entry in hits {
            if let Some(record) = query::primary_hit::<R>(&entry?)? {
                records.push(record);
            }
        }

        Ok(PaginatedResult {
            fetched_records_count: count(&records),
            records,
            bookmark: Bookmark::new(metadata.bookmark),
        })
    }

    // Shared core of range and attribute pages: scan `[start, end)` after the
    // token's last key, keep `page_size` hits, and probe for one more.
    fn scan_page<R, F>(
        &self,
        signature: PageSignature,
        start: &str,
        end: &str,
        page_size: u32,
        bookmark: &Bookmark,
        hit: F,
    ) -> Result<PaginatedResult<R>, InternalError>
    where
        R: Record,
        F: Fn(&S, &KeyValue) -> Result<Option<R>, InternalError>,
    {
        let resume_from = if bookmark.is_empty() {
            start.to_string()
        } else {
            let token = ContinuationToken::decode(bookmark.as_str(), signature)?;
            successor(token.last_key())
        };

        let limit = usize::try_from(page_size).unwrap_or(usize::MAX);
        let mut records = Vec::new();
        let mut last_key = None;
        let mut more = false;
        let mut scanned = 0u64;

        for entry in self.state.range_scan(&resume_from, end)? {
            let entry = entry?;
            scanned += 1;

            // Look-ahead past a full page only decides `more`; a dangling
            // marker there belongs to the next page and fails it instead.
            if records.len() == limit {
                match hit(self.state, &entry) {
                    Ok(None) => continue,
                    Ok(Some(_)) => {}
                    Err(err) if err.class != ErrorClass::IndexInconsistent => return Err(err),
                    Err(_) => {}
                }
                more = true;
                break;
            }

            let Some(record) = hit(self.state, &entry)? else {
                continue;
            };
            records.push(record);
            last_key = Some(entry.key);
        }

        query::record_scanned::<R>(scanned);

        let bookmark = match last_key {
            Some(last_key) if more => {
                Bookmark::new(ContinuationToken::new(signature, last_key).encode()?)
            }
            _ => Bookmark::first(),
        };

        Ok(PaginatedResult {
            fetched_records_count: count(&records),
            records,
            bookmark,
        })
    }
}

// Smallest key strictly greater than `key`.
fn successor(key: &str) -> String {
    let mut next = String::with_capacity(key.len() + 1);
    next.push_str(key);
    next.push(COMPOSITE_KEY_DELIMITER);
    next
}

fn count<R>(records: &[R]) -> u32 {
    u32::try_from(records.len()).unwrap_or(u32::MAX)
}
