//! Product sort options offered on search and collection pages.

use crate::shopify::ProductSortKey;

/// A sort option selectable through the `sort` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortFilterItem {
    /// Label shown in the sort menu.
    pub title: &'static str,
    /// Value of the `sort` parameter; `None` for the default.
    pub slug: Option<&'static str>,
    /// Upstream sort key.
    pub sort_key: ProductSortKey,
    /// Whether to reverse the upstream order.
    pub reverse: bool,
}

/// Relevance, used when no (or an unknown) slug is given.
pub const DEFAULT_SORT: SortFilterItem = SortFilterItem {
    title: "Relevance",
    slug: None,
    sort_key: ProductSortKey::Relevance,
    reverse: false,
};

/// Every sort option, in menu order.
pub const SORTING: [SortFilterItem; 5] = [
    DEFAULT_SORT,
    SortFilterItem {
        title: "Trending",
        slug: Some("trending-desc"),
        sort_key: ProductSortKey::BestSelling,
        reverse: false,
    },
    SortFilterItem {
        title: "Latest arrivals",
        slug: Some("latest-desc"),
        sort_key: ProductSortKey::CreatedAt,
        reverse: true,
    },
    SortFilterItem {
        title: "Price: Low to high",
        slug: Some("price-asc"),
        sort_key: ProductSortKey::Price,
        reverse: false,
    },
    SortFilterItem {
        title: "Price: High to low",
        slug: Some("price-desc"),
        sort_key: ProductSortKey::Price,
        reverse: true,
    },
];

/// Resolve a `sort` parameter, falling back to [`DEFAULT_SORT`].
#[must_use]
pub fn sort_for_slug(slug: Option<&str>) -> SortFilterItem {
    let Some(slug) = slug.filter(|s| !s.is_empty()) else {
        return DEFAULT_SORT;
    };
    SORTING
        .into_iter()
        .find(|item| item.slug == Some(slug))
        .unwrap_or(DEFAULT_SORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_slugs() {
        let latest = sort_for_slug(Some("latest-desc"));
        assert_eq!(latest.sort_key, ProductSortKey::CreatedAt);
        assert!(latest.reverse);

        let cheap = sort_for_slug(Some("price-asc"));
        assert_eq!(cheap.sort_key, ProductSortKey::Price);
        assert!(!cheap.reverse);

        assert_eq!(
            sort_for_slug(Some("trending-desc")).sort_key,
            ProductSortKey::BestSelling
        );
    }

    #[test]
    fn test_missing_or_unknown_slug_is_relevance() {
        assert_eq!(sort_for_slug(None), DEFAULT_SORT);
        assert_eq!(sort_for_slug(Some("")), DEFAULT_SORT);
        assert_eq!(sort_for_slug(Some("cheapest-first")), DEFAULT_SORT);
        assert_eq!(DEFAULT_SORT.sort_key, ProductSortKey::Relevance);
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<_> = SORTING.iter().filter_map(|item| item.slug).collect();
        let count = slugs.len();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), count);
    }
}
