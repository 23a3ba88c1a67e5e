//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use byte_mtaani_core::{Product, ProductId};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{ProductPage, ProductQuery};
use crate::error::Result;
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub url_key: Option<String>,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub category: Option<String>,
    pub in_stock: bool,
    pub rating: Option<String>,
    pub reviews: Option<u32>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            url_key: product.url_key.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            in_stock: product.in_stock,
            rating: product.rating.map(|r| format!("{r:.1}")),
            reviews: product.reviews,
        }
    }
}

/// Product listing display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListView {
    pub products: Vec<ProductView>,
    pub count: u64,
    pub current_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
    /// Set when the catalog was unreachable and built-in products are shown.
    pub fallback: bool,
}

impl ProductListView {
    fn new(page: &ProductPage, current_page: u32) -> Self {
        Self {
            products: page.products.iter().map(ProductView::from).collect(),
            count: page.count,
            current_page,
            has_next: page.has_next,
            has_previous: page.has_previous,
            fallback: page.fallback,
        }
    }
}

/// Product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListView>> {
    let page = state.catalog().products_or_fallback(&query).await?;
    Ok(Json(ProductListView::new(&page, query.page())))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id = ProductId::parse(&id)?;
    let product = state.catalog().product_or_fallback(&id).await?;
    Ok(Json(ProductView::from(&product)))
}
