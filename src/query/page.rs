use super::error::QueryError;
use serde::Serialize;

/// Requested page; both values stay signed so nonsense input can be
/// reported instead of wrapping around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Defaults to the total match count, i.e. one page with everything.
    pub page_size: Option<i64>,
    /// 1-based, defaults to 1.
    pub page_number: Option<i64>,
}

/// Pagination metadata returned with every result window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page_number: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ValidatedPage {
    pub size: Option<usize>,
    pub number: usize,
}

impl PageRequest {
    pub(crate) fn validate(&self) -> Result<ValidatedPage, QueryError> {
        let size = match self.page_size {
            None => None,
            Some(size) if size <= 0 => {
                return Err(QueryError::pagination(
                    "page_size",
                    format!("must be a positive integer, got {}", size),
                ))
            }
            Some(size) => Some(
                usize::try_from(size)
                    .map_err(|_| QueryError::pagination("page_size", "value too large"))?,
            ),
        };
        let number = match self.page_number {
            None => 1,
            Some(number) if number < 1 => {
                return Err(QueryError::pagination(
                    "page_number",
                    format!("must be 1 or greater, got {}", number),
                ))
            }
            Some(number) => usize::try_from(number)
                .map_err(|_| QueryError::pagination("page_number", "value too large"))?,
        };
        Ok(ValidatedPage { size, number })
    }
}

impl ValidatedPage {
    /// Offset and limit to request from the store.
    pub fn window(&self) -> (usize, Option<usize>) {
        match self.size {
            Some(size) => ((self.number - 1).saturating_mul(size), Some(size)),
            // A single page holds everything; later pages are empty
            None if self.number == 1 => (0, None),
            None => (0, Some(0)),
        }
    }

    pub fn page_info(&self, total_count: usize) -> PageInfo {
        let page_size = self.size.unwrap_or(total_count);
        let has_previous = self.number > 1;
        let has_next = total_count > self.number.saturating_mul(page_size);
        PageInfo {
            page_number: self.number,
            page_size,
            total_count,
            has_previous,
            has_next,
            previous_page: has_previous.then(|| self.number - 1),
            next_page: has_next.then(|| self.number + 1),
        }
    }
}
