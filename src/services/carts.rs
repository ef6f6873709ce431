use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Cart, CartSnapshot},
    store::StateStore,
};

/// Cart lifecycle and item management.
///
/// Quantity positivity is enforced here rather than in the `Cart` model, and
/// prices are snapshotted from the catalog at add time; the cart never
/// re-reads live catalog prices afterwards.
#[derive(Clone)]
pub struct CartService {
    store: Arc<StateStore>,
    event_sender: Arc<EventSender>,
}

/// Input for creating (or re-fetching) a cart.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCartInput {
    /// When given and known, the existing cart is returned instead of
    /// creating a new one.
    pub cart_id: Option<Uuid>,
}

/// Input for adding an item to a cart.
#[derive(Debug, Deserialize)]
pub struct AddItemInput {
    pub product_id: String,
    pub quantity: i32,
}

impl CartService {
    pub fn new(store: Arc<StateStore>, event_sender: Arc<EventSender>) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    /// Get-or-create: returns the existing cart when the supplied id is
    /// known, otherwise creates a cart under the supplied id or a fresh one.
    #[instrument(skip(self))]
    pub async fn create_cart(&self, input: CreateCartInput) -> Result<CartSnapshot, ServiceError> {
        let mut inner = self.store.lock().await;

        if let Some(id) = input.cart_id {
            if let Some(cart) = inner.carts.get(&id) {
                return Ok(cart.snapshot());
            }
        }

        let cart = Cart::new(input.cart_id.unwrap_or_else(Uuid::new_v4));
        let snapshot = cart.snapshot();
        inner.carts.insert(cart.id, cart);
        drop(inner);

        self.event_sender
            .send_or_log(Event::CartCreated(snapshot.id))
            .await;
        info!("Created cart: {}", snapshot.id);
        Ok(snapshot)
    }

    /// Adds an item to an existing cart, merging quantities for a product
    /// already present. The merged line keeps its originally captured price.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        input: AddItemInput,
    ) -> Result<CartSnapshot, ServiceError> {
        let mut inner = self.store.lock().await;

        let cart = inner
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        let product = self
            .store
            .product(&input.product_id)
            .cloned()
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        if input.quantity <= 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be positive".to_string(),
            ));
        }

        if !cart.add_item(&product.id, input.quantity, product.price) {
            return Err(ServiceError::InvalidInput(
                "Quantity exceeds the maximum supported line quantity".to_string(),
            ));
        }
        let snapshot = cart.snapshot();
        drop(inner);

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id,
                product_id: product.id.clone(),
                quantity: input.quantity,
            })
            .await;
        info!(
            "Added {} of {} to cart {}",
            input.quantity, product.name, cart_id
        );
        Ok(snapshot)
    }

    /// Removes an item from an existing cart. An absent product id is a
    /// no-op; the cart itself must exist.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        cart_id: Uuid,
        product_id: &str,
    ) -> Result<CartSnapshot, ServiceError> {
        let mut inner = self.store.lock().await;

        let cart = inner
            .carts
            .get_mut(&cart_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        cart.remove_item(product_id);
        let snapshot = cart.snapshot();
        drop(inner);

        self.event_sender
            .send_or_log(Event::CartItemRemoved {
                cart_id,
                product_id: product_id.to_string(),
            })
            .await;
        Ok(snapshot)
    }

    /// Snapshot of an existing cart.
    pub async fn get_cart(&self, cart_id: Uuid) -> Result<CartSnapshot, ServiceError> {
        let inner = self.store.lock().await;
        inner
            .carts
            .get(&cart_id)
            .map(Cart::snapshot)
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn service() -> CartService {
        let (tx, _rx) = mpsc::channel(16);
        CartService::new(
            Arc::new(StateStore::new(3)),
            Arc::new(EventSender::new(tx)),
        )
    }

    #[tokio::test]
    async fn create_cart_returns_existing_cart_for_known_id() {
        let service = service();
        let first = service.create_cart(CreateCartInput::default()).await.unwrap();
        let again = service
            .create_cart(CreateCartInput {
                cart_id: Some(first.id),
            })
            .await
            .unwrap();
        assert_eq!(first.id, again.id);
    }

    #[tokio::test]
    async fn add_item_snapshots_catalog_price() {
        let service = service();
        let cart = service.create_cart(CreateCartInput::default()).await.unwrap();

        let snapshot = service
            .add_item(
                cart.id,
                AddItemInput {
                    product_id: "product2".to_string(),
                    quantity: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].unit_price, dec!(25.50));
        assert_eq!(snapshot.total, dec!(51.00));
    }

    #[tokio::test]
    async fn add_item_rejects_unknown_cart_and_product() {
        let service = service();

        assert_matches!(
            service
                .add_item(
                    Uuid::new_v4(),
                    AddItemInput {
                        product_id: "product1".to_string(),
                        quantity: 1,
                    },
                )
                .await,
            Err(ServiceError::NotFound(_))
        );

        let cart = service.create_cart(CreateCartInput::default()).await.unwrap();
        assert_matches!(
            service
                .add_item(
                    cart.id,
                    AddItemInput {
                        product_id: "product999".to_string(),
                        quantity: 1,
                    },
                )
                .await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn add_item_rejects_non_positive_quantity() {
        let service = service();
        let cart = service.create_cart(CreateCartInput::default()).await.unwrap();

        for quantity in [0, -3] {
            assert_matches!(
                service
                    .add_item(
                        cart.id,
                        AddItemInput {
                            product_id: "product1".to_string(),
                            quantity,
                        },
                    )
                    .await,
                Err(ServiceError::InvalidInput(_))
            );
        }

        let snapshot = service.get_cart(cart.id).await.unwrap();
        assert!(snapshot.items.is_empty());
    }

    #[tokio::test]
    async fn add_item_rejects_merge_overflow() {
        let service = service();
        let cart = service.create_cart(CreateCartInput::default()).await.unwrap();

        service
            .add_item(
                cart.id,
                AddItemInput {
                    product_id: "product1".to_string(),
                    quantity: i32::MAX,
                },
            )
            .await
            .unwrap();

        assert_matches!(
            service
                .add_item(
                    cart.id,
                    AddItemInput {
                        product_id: "product1".to_string(),
                        quantity: 1,
                    },
                )
                .await,
            Err(ServiceError::InvalidInput(_))
        );

        // The failed add mutates nothing.
        let snapshot = service.get_cart(cart.id).await.unwrap();
        assert_eq!(snapshot.items[0].quantity, i32::MAX);
    }

    #[tokio::test]
    async fn remove_item_tolerates_absent_product() {
        let service = service();
        let cart = service.create_cart(CreateCartInput::default()).await.unwrap();

        let snapshot = service.remove_item(cart.id, "product1").await.unwrap();
        assert!(snapshot.items.is_empty());

        assert_matches!(
            service.remove_item(Uuid::new_v4(), "product1").await,
            Err(ServiceError::NotFound(_))
        );
    }
}
