//! Product listing queries.

use std::{cmp::Reverse, fmt, str::FromStr};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use storefront::products::Product;

/// Page size used when none is given.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Largest accepted page size.
pub const MAX_PER_PAGE: usize = 100;

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Most reviewed first, then by name.
    #[default]
    Featured,

    /// Cheapest first.
    PriceAsc,

    /// Most expensive first.
    PriceDesc,

    /// Alphabetical.
    Name,

    /// Most recently added first.
    Newest,

    /// Highest average rating first.
    TopRated,
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Name => "name",
            Self::Newest => "newest",
            Self::TopRated => "top-rated",
        })
    }
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "featured" => Ok(Self::Featured),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            "newest" => Ok(Self::Newest),
            "top-rated" => Ok(Self::TopRated),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filters, order and page for a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Category slug
    pub category: Option<String>,

    /// Free text matched against name, brand, category and description
    pub search: Option<String>,

    /// Lowest price, inclusive
    pub min_price: Option<Decimal>,

    /// Highest price, inclusive
    pub max_price: Option<Decimal>,

    /// Only products with stock
    pub in_stock_only: bool,

    /// Listing order
    pub sort: ProductSort,

    /// Page number, starting at 1
    pub page: usize,

    /// Products per page
    pub per_page: usize,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            min_price: None,
            max_price: None,
            in_stock_only: false,
            sort: ProductSort::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ProductQuery {
    /// Whether a product passes the filters.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category.as_deref()
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }

        if self.min_price.is_some_and(|min| product.price < min)
            || self.max_price.is_some_and(|max| product.price > max)
        {
            return false;
        }

        if self.in_stock_only && product.total_stock() == 0 {
            return false;
        }

        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        else {
            return true;
        };

        let needle = needle.to_lowercase();

        [
            Some(product.name.as_str()),
            product.brand.as_deref(),
            Some(product.category.as_str()),
            Some(product.description.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Filter, sort and paginate listed products.
    ///
    /// Unlisted products are never returned. Out-of-range pages are empty.
    pub fn run(&self, products: Vec<Product>) -> ProductPage {
        let mut matching: Vec<Product> = products
            .into_iter()
            .filter(|product| product.is_active() && self.matches(product))
            .collect();

        sort_products(&mut matching, self.sort);

        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        let page = self.page.max(1);
        let total = matching.len();

        let products = matching
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        ProductPage {
            products,
            total,
            page,
            per_page,
        }
    }
}

fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::Featured => products.sort_by(|a, b| {
            b.rating
                .count
                .cmp(&a.rating.count)
                .then_with(|| a.name.cmp(&b.name))
        }),
        ProductSort::PriceAsc => {
            products.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.name.cmp(&b.name)));
        }
        ProductSort::PriceDesc => {
            products.sort_by(|a, b| b.price.cmp(&a.price).then_with(|| a.name.cmp(&b.name)));
        }
        ProductSort::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        ProductSort::Newest => products.sort_by_key(|product| Reverse(product.created_at)),
        ProductSort::TopRated => products.sort_by(|a, b| {
            b.rating
                .average
                .cmp(&a.rating.average)
                .then_with(|| b.rating.count.cmp(&a.rating.count))
        }),
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page
    pub products: Vec<Product>,

    /// Products matching the filters across all pages
    pub total: usize,

    /// Page number, starting at 1
    pub page: usize,

    /// Page size
    pub per_page: usize,
}

impl ProductPage {
    /// Number of pages.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.per_page.max(1))
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Category with the number of listed products in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category slug
    pub slug: String,

    /// Listed products
    pub product_count: usize,
}

/// Categories of listed products, alphabetically.
pub fn categories(products: &[Product]) -> Vec<CategorySummary> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();

    for product in products.iter().filter(|product| product.is_active()) {
        *counts.entry(product.category.as_str()).or_default() += 1;
    }

    let mut summaries: Vec<CategorySummary> = counts
        .into_iter()
        .map(|(slug, product_count)| CategorySummary {
            slug: slug.to_string(),
            product_count,
        })
        .collect();

    summaries.sort_by(|a, b| a.slug.cmp(&b.slug));

    summaries
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::helpers::sample_fixture;

    use super::*;

    fn slugs(page: &ProductPage) -> Vec<&str> {
        page.products.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn drafts_are_never_listed() -> TestResult {
        let fixture = sample_fixture()?;

        let page = ProductQuery {
            per_page: MAX_PER_PAGE,
            ..ProductQuery::default()
        }
        .run(fixture.products().to_vec());

        assert!(!slugs(&page).contains(&"smart-watch"));
        assert_eq!(page.total, fixture.products().len() - 1);

        Ok(())
    }

    #[test]
    fn category_and_price_filters_combine() -> TestResult {
        let fixture = sample_fixture()?;

        let page = ProductQuery {
            category: Some("Electronics".to_string()),
            max_price: Some(Decimal::new(1500, 0)),
            sort: ProductSort::PriceAsc,
            ..ProductQuery::default()
        }
        .run(fixture.products().to_vec());

        assert_eq!(slugs(&page), vec!["usb-c-charger", "wireless-earbuds"]);

        Ok(())
    }

    #[test]
    fn search_matches_brand_case_insensitively() -> TestResult {
        let fixture = sample_fixture()?;

        let page = ProductQuery {
            search: Some("  sierra ".to_string()),
            sort: ProductSort::Name,
            ..ProductQuery::default()
        }
        .run(fixture.products().to_vec());

        assert_eq!(slugs(&page), vec!["canvas-sneaker", "trail-runner"]);

        Ok(())
    }

    #[test]
    fn in_stock_only_hides_sold_out_products() -> TestResult {
        let fixture = sample_fixture()?;

        let page = ProductQuery {
            category: Some("home".to_string()),
            in_stock_only: true,
            sort: ProductSort::Name,
            ..ProductQuery::default()
        }
        .run(fixture.products().to_vec());

        assert_eq!(slugs(&page), vec!["ceramic-mug", "linen-throw"]);

        Ok(())
    }

    #[test]
    fn pagination_splits_results() -> TestResult {
        let fixture = sample_fixture()?;
        let query = ProductQuery {
            sort: ProductSort::Name,
            per_page: 5,
            ..ProductQuery::default()
        };

        let first = query.run(fixture.products().to_vec());
        let third = ProductQuery { page: 3, ..query.clone() }.run(fixture.products().to_vec());
        let beyond = ProductQuery { page: 9, ..query }.run(fixture.products().to_vec());

        assert_eq!(first.total, 11);
        assert_eq!(first.total_pages(), 3);
        assert!(first.has_next());
        assert_eq!(first.products.len(), 5);
        assert_eq!(third.products.len(), 1);
        assert!(!third.has_next());
        assert!(beyond.products.is_empty());

        Ok(())
    }

    #[test]
    fn featured_puts_most_reviewed_first() -> TestResult {
        let fixture = sample_fixture()?;

        let page = ProductQuery::default().run(fixture.products().to_vec());

        assert_eq!(slugs(&page).first(), Some(&"wireless-earbuds"));

        Ok(())
    }

    #[test]
    fn categories_count_listed_products() -> TestResult {
        let fixture = sample_fixture()?;

        let summaries = categories(fixture.products());
        let electronics = summaries
            .iter()
            .find(|summary| summary.slug == "electronics")
            .ok_or("electronics missing")?;

        assert_eq!(electronics.product_count, 3);
        assert_eq!(
            summaries.iter().map(|s| s.slug.as_str()).collect::<Vec<_>>(),
            vec!["apparel", "electronics", "footwear", "home", "stationery"]
        );

        Ok(())
    }

    #[test]
    fn sort_parses_cli_spellings() {
        assert_eq!("price_desc".parse(), Ok(ProductSort::PriceDesc));
        assert_eq!("Top-Rated".parse(), Ok(ProductSort::TopRated));
        assert!("cheapest".parse::<ProductSort>().is_err());
    }
}
