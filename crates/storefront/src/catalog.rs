//! Product list page: search, price filter, sort and pagination, plus the
//! add-to-cart rules of the product page.

use std::cmp::Ordering;
use std::str::FromStr;

use tracing::instrument;

use cue_shop_core::{CartItem, ParseEnumError, Price, Product};

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::error::{AppError, Result};
use crate::notify::Notifier;
use crate::session::SessionStore;

/// Products per page.
pub const PAGE_SIZE: usize = 8;

/// Upper end of the default price range, in đồng.
pub const MAX_PRICE_DONG: i64 = 500_000_000;

/// Sort order of the product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Backend order.
    #[default]
    Default,
    PriceLow,
    PriceHigh,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::NameAsc => compare_names(&a.name, &b.name),
            Self::NameDesc => compare_names(&b.name, &a.name),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "default" | "" => Ok(Self::Default),
            "price-low" | "pricelow" => Ok(Self::PriceLow),
            "price-high" | "pricehigh" => Ok(Self::PriceHigh),
            "name-asc" | "nameasc" => Ok(Self::NameAsc),
            "name-desc" | "namedesc" => Ok(Self::NameDesc),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Filters of the product list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Search text; when set the backend search endpoint is used.
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Price,
    pub max_price: Price,
    pub sort: SortOrder,
    /// 1-based page number.
    pub page: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            min_price: Price::ZERO,
            max_price: Price::from_dong(MAX_PRICE_DONG),
            sort: SortOrder::Default,
            page: 1,
        }
    }
}

impl CatalogQuery {
    fn search_text(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// One page of the filtered product list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    /// Products matching the filters across all pages.
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    /// Distinct categories of the unfiltered list.
    pub categories: Vec<String>,
}

/// Distinct category names in first-seen order; missing ones are "Other".
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for product in products {
        let name = product.category_name();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// Filter, sort and paginate `products`.
///
/// Text matching against name and description only happens when the list
/// did not already come from the search endpoint.
#[must_use]
pub fn apply(products: &[Product], query: &CatalogQuery, server_searched: bool) -> CatalogPage {
    let all_categories = categories(products);
    let needle = if server_searched {
        None
    } else {
        query.search_text().map(str::to_lowercase)
    };

    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|p| {
            needle.as_deref().is_none_or(|q| {
                p.name.to_lowercase().contains(q)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(q))
            })
        })
        .filter(|p| query.category.as_deref().is_none_or(|c| p.category_name() == c))
        .filter(|p| p.price >= query.min_price && p.price <= query.max_price)
        .collect();

    // Stable, so the default order keeps the backend order
    matched.sort_by(|a, b| query.sort.compare(a, b));

    let total = matched.len();
    let total_pages = total.div_ceil(PAGE_SIZE);
    let page = query.page.max(1);
    let page_products = matched
        .into_iter()
        .skip((page - 1).saturating_mul(PAGE_SIZE))
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    CatalogPage {
        products: page_products,
        total,
        page,
        total_pages,
        categories: all_categories,
    }
}

/// Fetch and filter the product list.
///
/// # Errors
///
/// Returns error if the product list cannot be fetched.
#[instrument(skip(api))]
pub async fn browse(api: &ApiClient, query: &CatalogQuery) -> Result<CatalogPage> {
    match query.search_text() {
        Some(text) => {
            let found = api.search_products(text).await?;
            Ok(apply(&found, query, true))
        }
        None => {
            let all = api.products().await?;
            Ok(apply(&all, query, false))
        }
    }
}

/// Add `quantity` units of `product` to the cart the way the product page
/// does: signed-in shoppers only, nothing out of stock, never more than the
/// stock on hand.
///
/// # Errors
///
/// Returns [`AppError::NotAuthenticated`] when signed out and
/// [`AppError::Rejected`] when stock does not allow the quantity. The
/// reason is also sent to `notifier`.
pub fn add_product_to_cart(
    session: &SessionStore,
    cart: &CartStore,
    notifier: &dyn Notifier,
    product: &Product,
    quantity: u32,
) -> Result<()> {
    if session.user().is_none() {
        notifier.error("Vui lòng đăng nhập để thêm sản phẩm vào giỏ hàng!");
        return Err(AppError::NotAuthenticated);
    }

    let reject = |message: String| {
        notifier.error(&message);
        Err(AppError::Rejected(message))
    };

    if !product.in_stock() {
        return reject("Sản phẩm đã hết hàng!".to_string());
    }
    if quantity == 0 {
        return reject("Số lượng phải lớn hơn 0".to_string());
    }
    if i64::from(quantity) > product.quantity_in_stock {
        return reject(format!(
            "Chỉ còn {} sản phẩm trong kho!",
            product.quantity_in_stock
        ));
    }

    cart.add_to_cart(CartItem::from_product(product, quantity));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cue_shop_core::ProductId;

    use super::*;

    fn product(id: i64, name: &str, price: i64, category: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: Some(format!("Mô tả {name}")),
            price: Price::from_dong(price),
            original_price: None,
            quantity_in_stock: 5,
            image_url: None,
            category: category.map(String::from),
            category_id: None,
            supplier_id: None,
            supplier: None,
            rating: None,
            review_count: None,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product(1, "Cơ Predator", 9_000_000, Some("Cơ")),
            product(2, "Bi Aramith", 3_500_000, Some("Bi")),
            product(3, "Phấn Master", 50_000, None),
            product(4, "bao cơ", 700_000, Some("Phụ kiện")),
        ]
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("price-low".parse::<SortOrder>().unwrap(), SortOrder::PriceLow);
        assert_eq!("nameDesc".parse::<SortOrder>().unwrap(), SortOrder::NameDesc);
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_default_keeps_backend_order() {
        let page = apply(&sample(), &CatalogQuery::default(), false);
        let ids: Vec<i64> = page.products.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, [1, 2, 3, 4]);
        assert_eq!(page.categories, ["Cơ", "Bi", "Other", "Phụ kiện"]);
    }

    #[test]
    fn test_price_filter_and_sort() {
        let query = CatalogQuery {
            max_price: Price::from_dong(5_000_000),
            sort: SortOrder::PriceHigh,
            ..CatalogQuery::default()
        };
        let page = apply(&sample(), &query, false);
        let ids: Vec<i64> = page.products.iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, [2, 4, 3]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let query = CatalogQuery {
            sort: SortOrder::NameAsc,
            ..CatalogQuery::default()
        };
        let names: Vec<String> = apply(&sample(), &query, false)
            .products
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["bao cơ", "Bi Aramith", "Cơ Predator", "Phấn Master"]);
    }

    #[test]
    fn test_client_search_only_without_server_search() {
        let query = CatalogQuery {
            search: Some("  CƠ ".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(apply(&sample(), &query, false).total, 2);
        assert_eq!(apply(&sample(), &query, true).total, 4);
    }

    #[test]
    fn test_pagination() {
        let products: Vec<Product> = (1..=19)
            .map(|i| product(i, &format!("Sản phẩm {i}"), 1000, None))
            .collect();
        let query = CatalogQuery {
            page: 3,
            ..CatalogQuery::default()
        };
        let page = apply(&products, &query, false);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.products.len(), 3);
        assert_eq!(page.products[0].id, ProductId::new(17));

        let page = apply(&products, &CatalogQuery { page: 0, ..query }, false);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_huge_page_number_is_empty() {
        let query = CatalogQuery {
            page: usize::MAX,
            ..CatalogQuery::default()
        };
        assert!(apply(&[], &query, false).products.is_empty());

        let page = apply(&sample(), &query, false);
        assert!(page.products.is_empty());
        assert_eq!(page.total, 4);
    }
}
