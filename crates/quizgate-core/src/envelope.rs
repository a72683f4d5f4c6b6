//! Generic API envelopes shared by every endpoint.

use serde::{Deserialize, Serialize};

/// Success/error wrapper around a payload.
///
/// By convention a failed response carries an `error` or a `message`; the
/// constructors uphold this and [`ApiResponse::is_well_formed`] checks it on
/// values that arrived over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// `false` only for a failure that explains nothing.
    pub fn is_well_formed(&self) -> bool {
        self.success || self.error.is_some() || self.message.is_some()
    }
}

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    /// Build a page, deriving `total_pages` from `total` and `limit`.
    pub fn new(data: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        Self {
            data,
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }

    /// Whether `total_pages` agrees with `total` and `limit`.
    pub fn is_consistent(&self) -> bool {
        self.total_pages == total_pages(self.total, self.limit)
    }

    /// Transform every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// `ceil(total / limit)`, or 0 for a zero limit.
fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        0
    } else {
        total.div_ceil(limit)
    }
}
