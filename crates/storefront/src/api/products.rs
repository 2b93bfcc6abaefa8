//! `/products` endpoints and the catalog cache.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use cue_shop_core::{Product, ProductId};

use super::{ApiClient, ApiError};

/// Curated product lists shown on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductSection {
    FlashSales,
    BestSelling,
    NewArrivals,
    Explore,
}

impl ProductSection {
    pub const ALL: [Self; 4] = [
        Self::FlashSales,
        Self::BestSelling,
        Self::NewArrivals,
        Self::Explore,
    ];

    /// Path of the section endpoint.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::FlashSales => "/products/flash-sales",
            Self::BestSelling => "/products/best-selling",
            Self::NewArrivals => "/products/new-arrivals",
            Self::Explore => "/products/explore",
        }
    }

    /// Heading shown above the section.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::FlashSales => "Flash Sales",
            Self::BestSelling => "Sản phẩm bán chạy",
            Self::NewArrivals => "Hàng mới về",
            Self::Explore => "Khám phá sản phẩm",
        }
    }
}

/// The four home page sections. A section whose request failed is empty.
#[derive(Debug, Clone, Default)]
pub struct HomeSections {
    pub flash_sales: Vec<Product>,
    pub best_selling: Vec<Product>,
    pub new_arrivals: Vec<Product>,
    pub explore: Vec<Product>,
}

impl HomeSections {
    /// Sections in display order.
    #[must_use]
    pub fn iter(&self) -> [(ProductSection, &[Product]); 4] {
        [
            (ProductSection::FlashSales, &self.flash_sales),
            (ProductSection::BestSelling, &self.best_selling),
            (ProductSection::NewArrivals, &self.new_arrivals),
            (ProductSection::Explore, &self.explore),
        ]
    }
}

impl ApiClient {
    /// All products (`GET /products`), served from the catalog cache when warm.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_list("/products").await
    }

    /// Server-side product search (`GET /products/search?q=`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint("/products/search")?;
        url.query_pairs_mut().append_pair("q", query);
        self.execute_json(self.request(reqwest::Method::GET, url, None))
            .await
    }

    /// One product (`GET /products/:id`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with 404 if the product does not exist.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_json(&format!("/products/{id}"), None).await
    }

    /// One curated section.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn product_section(&self, section: ProductSection) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_list(section.path()).await
    }

    /// Fetch the four home page sections concurrently.
    ///
    /// Each section fails on its own: an error is logged and the section is
    /// left empty.
    #[instrument(skip(self))]
    pub async fn home_sections(&self) -> HomeSections {
        let (flash_sales, best_selling, new_arrivals, explore) = tokio::join!(
            self.product_section(ProductSection::FlashSales),
            self.product_section(ProductSection::BestSelling),
            self.product_section(ProductSection::NewArrivals),
            self.product_section(ProductSection::Explore),
        );

        HomeSections {
            flash_sales: section_or_empty(ProductSection::FlashSales, flash_sales),
            best_selling: section_or_empty(ProductSection::BestSelling, best_selling),
            new_arrivals: section_or_empty(ProductSection::NewArrivals, new_arrivals),
            explore: section_or_empty(ProductSection::Explore, explore),
        }
    }

    /// Drop every cached product list. Call after the catalog changes.
    pub fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.catalog {
            cache.invalidate_all();
            debug!("Catalog cache invalidated");
        }
    }

    async fn cached_list(&self, path: &str) -> Result<Arc<Vec<Product>>, ApiError> {
        let Some(cache) = &self.inner.catalog else {
            return Ok(Arc::new(self.get_json(path, None).await?));
        };

        if let Some(hit) = cache.get(path).await {
            debug!(path, "Catalog cache hit");
            return Ok(hit);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.get_json(path, None).await?);
        cache.insert(path.to_owned(), Arc::clone(&products)).await;
        Ok(products)
    }
}

fn section_or_empty(section: ProductSection, result: Result<Arc<Vec<Product>>, ApiError>) -> Vec<Product> {
    match result {
        Ok(products) => products.as_ref().clone(),
        Err(e) => {
            warn!(section = section.path(), error = %e, "Failed to fetch home section");
            Vec::new()
        }
    }
}
