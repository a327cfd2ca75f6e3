use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Offset pagination over a stable store ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    offset: u32,
    limit: u32,
}

impl PageRequest {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 100;
    /// Largest page size a caller may request.
    pub const MAX_LIMIT: u32 = 500;

    /// Creates a validated page request.
    pub fn new(offset: u32, limit: u32) -> AppResult<Self> {
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                Self::MAX_LIMIT
            )));
        }

        Ok(Self { offset, limit })
    }

    /// Returns the number of rows skipped.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Returns the maximum number of rows returned.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
