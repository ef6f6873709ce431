use std::sync::Arc;

use crate::{errors::ServiceError, models::Product, store::StateStore};

/// Read-only access to the seed catalog.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<StateStore>,
}

impl ProductService {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self { store }
    }

    pub fn list_products(&self) -> Vec<Product> {
        self.store.products()
    }

    pub fn get_product(&self, product_id: &str) -> Result<Product, ServiceError> {
        self.store
            .product(product_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn lists_seeded_catalog() {
        let service = ProductService::new(Arc::new(StateStore::new(3)));
        let products = service.list_products();
        assert_eq!(products.len(), 5);
        assert!(products.iter().any(|p| p.name == "Keyboard"));
    }

    #[test]
    fn unknown_product_is_not_found() {
        let service = ProductService::new(Arc::new(StateStore::new(3)));
        assert_matches!(
            service.get_product("product999"),
            Err(ServiceError::NotFound(_))
        );
    }
}
