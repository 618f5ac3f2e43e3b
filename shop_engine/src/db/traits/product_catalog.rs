use crate::{
    db::traits::OrderFlowError,
    db_types::{Product, ProductId},
};

/// Read access to the product catalog. Catalog editing lives outside the engine.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, OrderFlowError>;
}
