use crate::domain::model::{SearchFilterSpec, ServiceListing, SortKey};
use crate::domain::ports::ListingSource;
use crate::utils::error::Result;

pub const SEARCH_PAGE_SIZE: usize = 12;

fn matches_query(listing: &ServiceListing, query: &str) -> bool {
    let needle = query.to_lowercase();
    listing.title.to_lowercase().contains(&needle)
        || listing.description.to_lowercase().contains(&needle)
}

/// A NaN or non-positive minimum means no rating restriction.
fn has_rating_floor(spec: &SearchFilterSpec) -> bool {
    spec.min_rating.is_finite() && spec.min_rating > 0.0
}

/// Filters then sorts a copy of `listings`. The stages run in a fixed order:
/// query, categories, city, minimum rating, price range, sort.
pub fn apply_filters(listings: &[ServiceListing], spec: &SearchFilterSpec) -> Vec<ServiceListing> {
    let mut results: Vec<ServiceListing> = listings
        .iter()
        .filter(|l| spec.query.is_empty() || matches_query(l, &spec.query))
        .filter(|l| spec.categories.is_empty() || spec.categories.contains(&l.category))
        .filter(|l| spec.city.as_ref().map_or(true, |city| &l.city == city))
        .filter(|l| !has_rating_floor(spec) || l.rating.unwrap_or(0.0) >= spec.min_rating)
        .filter(|l| spec.price_range.contains_range(l.price_min, l.price_max))
        .cloned()
        .collect();

    sort_listings(&mut results, spec.sort_by);
    results
}

/// Stable, so listings that tie keep their source order.
pub fn sort_listings(listings: &mut [ServiceListing], key: SortKey) {
    match key {
        SortKey::PriceAsc => listings.sort_by(|a, b| a.price_min.cmp(&b.price_min)),
        SortKey::PriceDesc => listings.sort_by(|a, b| b.price_max.cmp(&a.price_max)),
        SortKey::Rating => listings.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0))
        }),
        SortKey::Distance => listings.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(0.0)
                .total_cmp(&b.distance_km.unwrap_or(0.0))
        }),
        SortKey::Recent => listings.sort_by(|a, b| b.created_on.cmp(&a.created_on)),
    }
}

/// Fixed-size pages over an owned sequence. Pages are 1-based.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    items: Vec<T>,
    page_size: usize,
    current_page: usize,
}

impl<T> Paginated<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Swaps in a new sequence and goes back to page 1.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.current_page = 1;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    pub fn page_items(&self) -> &[T] {
        let start = (self.current_page - 1) * self.page_size;
        if start >= self.items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    /// Returns false and stays put when `page` is out of range.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to(self.current_page.saturating_sub(1))
    }
}

/// State behind the search results view: the active filter and the
/// paginated matches it produced.
#[derive(Debug, Clone)]
pub struct SearchResults {
    filters: SearchFilterSpec,
    results: Paginated<ServiceListing>,
}

impl Default for SearchResults {
    fn default() -> Self {
        Self::new(SEARCH_PAGE_SIZE)
    }
}

impl SearchResults {
    pub fn new(page_size: usize) -> Self {
        Self {
            filters: SearchFilterSpec::default(),
            results: Paginated::new(page_size),
        }
    }

    pub fn filters(&self) -> &SearchFilterSpec {
        &self.filters
    }

    pub fn results(&self) -> &Paginated<ServiceListing> {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut Paginated<ServiceListing> {
        &mut self.results
    }

    pub fn apply(&mut self, listings: &[ServiceListing], filters: SearchFilterSpec) -> usize {
        let matches = apply_filters(listings, &filters);
        let count = matches.len();
        self.results.replace(matches);
        self.filters = filters;
        count
    }

    /// Loads listings from `source` and applies `filters`. On failure the
    /// previous results and filter stay in place.
    pub async fn search<S>(&mut self, source: &S, filters: SearchFilterSpec) -> Result<usize>
    where
        S: ListingSource + ?Sized,
    {
        let listings = source.fetch_listings().await?;
        let count = self.apply(&listings, filters);
        tracing::debug!(
            "Search matched {} of {} listings ({} pages)",
            count,
            listings.len(),
            self.results.total_pages()
        );
        Ok(count)
    }
}
