// Pagination and listing order
// Pure slicing over an already filtered and ordered candidate set

use serde::Serialize;

use crate::domain::entity::Entity;
use crate::domain::errors::ValidationError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validated page/size pair
///
/// # Invariants
/// - `page >= 1`
/// - `1 <= size <= 100`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Validates the requested page, falling back to defaults for absent values
    ///
    /// # Example
    /// ```
    /// use keystone_api::domain::pagination::PageRequest;
    ///
    /// let request = PageRequest::new(Some(2), Some(10)).expect("valid page");
    /// assert_eq!(request.offset(), 10);
    /// ```
    pub fn new(page: Option<u32>, size: Option<u32>) -> Result<Self, ValidationError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(ValidationError::new("page must be greater than or equal to 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(ValidationError::new(format!(
                "size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page, size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Zero-based offset of the first item on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus totals across all pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u64,
}

impl<T> Page<T> {
    /// Assembles a page from an already sliced set of items
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let size = u64::from(request.size());
        Self {
            items,
            total,
            page: request.page(),
            size: request.size(),
            pages: total.div_ceil(size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            pages: self.pages,
        }
    }
}

/// Slices a fully materialized, ordered set into the requested page
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let slice = items
        .into_iter()
        .skip(offset)
        .take(request.size() as usize)
        .collect();

    Page::new(slice, total, request)
}

/// Sorts entities into listing order: newest first, ties broken by id
pub fn sort_for_listing<E: Entity>(items: &mut [E]) {
    items.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// Filters, orders and paginates entities in memory
pub fn list_entities<E: Entity>(
    candidates: impl IntoIterator<Item = E>,
    filter: &E::Filter,
    request: PageRequest,
) -> Page<E> {
    let mut matching: Vec<E> = candidates
        .into_iter()
        .filter(|entity| entity.matches(filter))
        .collect();
    sort_for_listing(&mut matching);
    paginate(matching, request)
}
