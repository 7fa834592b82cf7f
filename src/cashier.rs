use std::collections::BTreeMap;

use tracing::info;

use crate::error::{CartError, StoreError};
use crate::records::{round_2dp, CartItem, Category, PaymentMethod, Product, SaleRecord};
use crate::store::RecordStore;

/// Paying by card takes 10% off the cart total.
const CARD_DISCOUNT: f64 = 0.9;

/// One cashier session: catalog queries plus an in-memory cart keyed by
/// product id. The cart lives only as long as the session and is never
/// persisted.
pub struct CashierSession {
    store: RecordStore,
    cart: BTreeMap<String, u32>,
}

impl CashierSession {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            cart: BTreeMap::new(),
        }
    }

    /// `Ok(false)` means no cashier record matched; `Err` is reserved for
    /// store failures.
    pub fn login(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let cashiers = self.store.read_cashiers()?;
        Ok(cashiers.iter().any(|c| c.matches(username, password)))
    }

    pub fn get_product(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        let products = self.store.read_products()?;
        Ok(products.into_iter().find(|p| p.id == product_id))
    }

    pub fn list_products(&self, category: Option<Category>) -> Result<Vec<Product>, StoreError> {
        let mut products = self.store.read_products()?;
        if let Some(category) = category {
            products.retain(|p| p.category == category);
        }
        Ok(products)
    }

    /// Accumulates into any existing cart quantity. Stock is re-read from the
    /// store at call time and the increment is checked against it; the
    /// all-or-nothing batch check at checkout is the enforcing backstop.
    pub fn add_to_cart(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let Some(product) = self.get_product(product_id)? else {
            return Err(CartError::ProductNotFound(product_id.to_owned()));
        };
        if product.quantity < quantity {
            return Err(CartError::InsufficientStock {
                requested: quantity,
                available: product.quantity,
            });
        }

        *self.cart.entry(product_id.to_owned()).or_insert(0) += quantity;
        Ok(())
    }

    /// Overwrites the cart quantity; zero delegates to removal.
    pub fn update_cart_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_from_cart(product_id);
        }
        let Some(product) = self.get_product(product_id)? else {
            return Err(CartError::ProductNotFound(product_id.to_owned()));
        };
        if product.quantity < quantity {
            return Err(CartError::InsufficientStock {
                requested: quantity,
                available: product.quantity,
            });
        }

        self.cart.insert(product_id.to_owned(), quantity);
        Ok(())
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> Result<(), CartError> {
        if self.cart.remove(product_id).is_none() {
            return Err(CartError::NotInCart(product_id.to_owned()));
        }
        Ok(())
    }

    /// Cart entries joined live against the catalog. An entry whose product
    /// has meanwhile been removed from the catalog drops out silently.
    pub fn cart_items(&self) -> Result<Vec<CartItem>, StoreError> {
        let products = self.store.read_products()?;
        let mut items = Vec::new();
        for (product_id, &quantity) in &self.cart {
            if let Some(product) = products.iter().find(|p| &p.id == product_id) {
                items.push(CartItem {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    category: product.category,
                    price: product.price,
                    quantity,
                });
            }
        }
        Ok(items)
    }

    /// Sum of price times quantity over resolvable cart entries, discounted
    /// for card payment, rounded to two decimal places.
    pub fn calculate_total(&self, payment_method: PaymentMethod) -> Result<f64, StoreError> {
        let items = self.cart_items()?;
        let mut total: f64 = items.iter().map(CartItem::line_total).sum();
        if payment_method == PaymentMethod::Card {
            total *= CARD_DISCOUNT;
        }
        Ok(round_2dp(total))
    }

    /// Commits the sale: decrements stock for every cart entry, appends one
    /// sales-log record, and clears the cart. The whole batch is validated
    /// against the freshly read catalog before anything is written, so a
    /// failure leaves both files untouched.
    pub fn checkout(&mut self, payment_method: PaymentMethod) -> Result<f64, CartError> {
        if self.cart.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let total = self.calculate_total(payment_method)?;

        let mut products = self.store.read_products()?;
        for (product_id, &quantity) in &self.cart {
            let Some(product) = products.iter_mut().find(|p| &p.id == product_id) else {
                return Err(CartError::ProductNotFound(product_id.clone()));
            };
            product.quantity = product.quantity.checked_sub(quantity).ok_or(
                CartError::InsufficientStock {
                    requested: quantity,
                    available: product.quantity,
                },
            )?;
        }

        self.store.rewrite_products(&products)?;
        self.store.append_sale(&SaleRecord::now(total))?;
        let items = self.cart.len();
        self.cart.clear();

        info!(total, items, "sale committed");
        Ok(total)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn open_session() -> (TempDir, CashierSession) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        store
            .rewrite_products(&[
                Product::new("E001", "Smartphone", Category::Electronics, 599.99, 10),
                Product::new("G001", "Milk", Category::Groceries, 3.99, 50),
                Product::new("G002", "Bread", Category::Groceries, 2.99, 30),
            ])
            .unwrap();
        (dir, CashierSession::new(store))
    }

    #[test]
    fn login_scans_cashier_records() {
        let (_dir, session) = open_session();
        session
            .store
            .rewrite_cashiers(&[
                crate::records::Credential::new("cashier1", "pass123"),
                crate::records::Credential::new("cashier2", "pass123"),
            ])
            .unwrap();

        assert!(session.login("cashier2", "pass123").unwrap());
        assert!(!session.login("cashier2", "wrong").unwrap());
        assert!(!session.login("ghost", "pass123").unwrap());
    }

    #[test]
    fn add_to_cart_accumulates_quantities() {
        let (_dir, mut session) = open_session();

        session.add_to_cart("G001", 2).unwrap();
        session.add_to_cart("G001", 3).unwrap();

        let items = session.cart_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn add_to_cart_beyond_stock_fails_and_cart_is_unchanged() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("E001", 5).unwrap();

        assert!(matches!(
            session.add_to_cart("E001", 11),
            Err(CartError::InsufficientStock {
                requested: 11,
                available: 10,
            })
        ));
        assert!(matches!(
            session.add_to_cart("E001", 0),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            session.add_to_cart("E999", 1),
            Err(CartError::ProductNotFound(_))
        ));

        let items = session.cart_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn update_cart_quantity_overwrites_and_zero_removes() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("G001", 2).unwrap();
        session.add_to_cart("G002", 1).unwrap();

        session.update_cart_quantity("G001", 4).unwrap();
        session.update_cart_quantity("G002", 0).unwrap();

        let items = session.cart_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "G001");
        assert_eq!(items[0].quantity, 4);

        assert!(matches!(
            session.update_cart_quantity("G001", 51),
            Err(CartError::InsufficientStock { .. })
        ));
        assert!(matches!(
            session.update_cart_quantity("G002", 0),
            Err(CartError::NotInCart(_))
        ));
    }

    #[test]
    fn remove_from_cart_requires_presence() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("G001", 2).unwrap();

        session.remove_from_cart("G001").unwrap();

        assert!(matches!(
            session.remove_from_cart("G001"),
            Err(CartError::NotInCart(_))
        ));
        assert!(session.cart_items().unwrap().is_empty());
    }

    #[test]
    fn cart_items_drop_products_removed_from_catalog() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("E001", 1).unwrap();
        session.add_to_cart("G001", 2).unwrap();

        // Another terminal deletes the product between add and listing.
        session
            .store
            .rewrite_products(&[Product::new("G001", "Milk", Category::Groceries, 3.99, 50)])
            .unwrap();

        let items = session.cart_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "G001");
    }

    #[test]
    fn card_total_is_discounted_cash_total() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("E001", 1).unwrap();
        session.add_to_cart("G002", 3).unwrap();

        let cash = session.calculate_total(PaymentMethod::Cash).unwrap();
        let card = session.calculate_total(PaymentMethod::Card).unwrap();

        assert_eq!(cash, 608.96);
        assert_eq!(card, round_2dp(cash * 0.9));
    }

    #[test]
    fn checkout_decrements_stock_and_appends_one_sale() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("E001", 5).unwrap();

        let total = session.checkout(PaymentMethod::Cash).unwrap();

        assert_eq!(total, 2999.95);
        assert_eq!(session.get_product("E001").unwrap().unwrap().quantity, 5);
        let sales = session.store.read_sales().unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].total, 2999.95);
        // A successful checkout empties the cart.
        assert!(session.cart_items().unwrap().is_empty());
        assert!(matches!(
            session.checkout(PaymentMethod::Cash),
            Err(CartError::EmptyCart)
        ));
    }

    #[test]
    fn checkout_underflow_leaves_catalog_bytes_unchanged() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("E001", 5).unwrap();
        session.add_to_cart("G001", 2).unwrap();

        // Stock drops under the requested quantity after the items were
        // added, as a second terminal would cause.
        session
            .store
            .rewrite_products(&[
                Product::new("E001", "Smartphone", Category::Electronics, 599.99, 3),
                Product::new("G001", "Milk", Category::Groceries, 3.99, 50),
            ])
            .unwrap();
        let path = session.store.path(crate::store::PRODUCTS_FILE);
        let before = fs::read(&path).unwrap();

        assert!(matches!(
            session.checkout(PaymentMethod::Cash),
            Err(CartError::InsufficientStock {
                requested: 5,
                available: 3,
            })
        ));

        assert_eq!(fs::read(&path).unwrap(), before);
        assert!(session.store.read_sales().unwrap().is_empty());
        // The cart survives a failed checkout.
        assert_eq!(session.cart_items().unwrap().len(), 2);
    }

    #[test]
    fn checkout_fails_when_cart_product_left_catalog() {
        let (_dir, mut session) = open_session();
        session.add_to_cart("E001", 1).unwrap();
        session
            .store
            .rewrite_products(&[Product::new("G001", "Milk", Category::Groceries, 3.99, 50)])
            .unwrap();

        assert!(matches!(
            session.checkout(PaymentMethod::Cash),
            Err(CartError::ProductNotFound(_))
        ));
        assert!(session.store.read_sales().unwrap().is_empty());
    }

    #[test]
    fn clear_cart_is_unconditional() {
        let (_dir, mut session) = open_session();
        session.clear_cart();
        session.add_to_cart("G001", 2).unwrap();

        session.clear_cart();

        assert!(session.cart_items().unwrap().is_empty());
    }
}
