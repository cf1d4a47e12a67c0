use std::fmt;

use serde::{Deserialize, Serialize};

/// Tenant/workspace scope every collaborator call is issued against.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(pub String);

impl Scope {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self(workspace.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query parameters for a paged, query-filterable search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text filter; an empty string matches everything.
    #[serde(default)]
    pub q: String,
    /// Zero-based page index.
    #[serde(default)]
    pub page: usize,
    pub page_size: usize,
}

impl SearchParams {
    pub fn new(q: impl Into<String>, page: usize, page_size: usize) -> Self {
        Self {
            q: q.into(),
            page,
            page_size,
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<R> {
    pub results: Vec<R>,
    #[serde(default)]
    pub page: usize,
    /// Total matching records across all pages, when the service reports it.
    #[serde(default)]
    pub total: Option<usize>,
}

impl<R> Page<R> {
    pub fn empty(page: usize) -> Self {
        Self {
            results: Vec::new(),
            page,
            total: Some(0),
        }
    }
}

impl<R> Default for Page<R> {
    fn default() -> Self {
        Self::empty(0)
    }
}
