use tracing::info;

use crate::error::{AdminError, StoreError};
use crate::records::{Category, Credential, Product, SaleRecord};
use crate::store::RecordStore;

/// Administrator operations: catalog and cashier-account maintenance over an
/// injected record store.
pub struct Admin {
    store: RecordStore,
}

impl Admin {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// `Ok(false)` means the credentials did not match; `Err` is reserved for
    /// store failures.
    pub fn login(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let stored = self.store.read_admin()?;
        Ok(stored.matches(username, password))
    }

    /// Inserts the product, or replaces the record with the same id.
    pub fn upsert_product(&self, product: &Product) -> Result<(), AdminError> {
        if product.id.trim().is_empty() || product.name.trim().is_empty() {
            return Err(AdminError::EmptyField);
        }
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(AdminError::InvalidPrice(product.price));
        }

        let mut products = self.store.read_products()?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => products.push(product.clone()),
        }
        self.store.rewrite_products(&products)?;

        info!(id = %product.id, "product saved");
        Ok(())
    }

    pub fn remove_product(&self, product_id: &str) -> Result<(), AdminError> {
        let mut products = self.store.read_products()?;
        let before = products.len();
        products.retain(|p| p.id != product_id);
        if products.len() == before {
            return Err(AdminError::ProductNotFound(product_id.to_owned()));
        }
        self.store.rewrite_products(&products)?;

        info!(id = %product_id, "product removed");
        Ok(())
    }

    pub fn get_product(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        let products = self.store.read_products()?;
        Ok(products.into_iter().find(|p| p.id == product_id))
    }

    /// Full catalog in file order, optionally filtered by category.
    pub fn list_products(&self, category: Option<Category>) -> Result<Vec<Product>, StoreError> {
        let mut products = self.store.read_products()?;
        if let Some(category) = category {
            products.retain(|p| p.category == category);
        }
        Ok(products)
    }

    pub fn update_product_quantity(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), AdminError> {
        let Some(mut product) = self.get_product(product_id)? else {
            return Err(AdminError::ProductNotFound(product_id.to_owned()));
        };
        product.quantity = quantity;
        self.upsert_product(&product)
    }

    pub fn add_cashier(&self, username: &str, password: &str) -> Result<(), AdminError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(AdminError::EmptyField);
        }
        let cashiers = self.store.read_cashiers()?;
        if cashiers.iter().any(|c| c.username == username) {
            return Err(AdminError::CashierExists(username.to_owned()));
        }
        self.store.append_cashier(&Credential::new(username, password))?;

        info!(username, "cashier added");
        Ok(())
    }

    pub fn remove_cashier(&self, username: &str) -> Result<(), AdminError> {
        let mut cashiers = self.store.read_cashiers()?;
        let before = cashiers.len();
        cashiers.retain(|c| c.username != username);
        if cashiers.len() == before {
            return Err(AdminError::CashierNotFound(username.to_owned()));
        }
        self.store.rewrite_cashiers(&cashiers)?;

        info!(username, "cashier removed");
        Ok(())
    }

    pub fn list_cashiers(&self) -> Result<Vec<String>, StoreError> {
        let cashiers = self.store.read_cashiers()?;
        Ok(cashiers.into_iter().map(|c| c.username).collect())
    }

    /// The append-only sales log, oldest first.
    pub fn list_sales(&self) -> Result<Vec<SaleRecord>, StoreError> {
        self.store.read_sales()
    }

    pub fn change_password(&self, old_password: &str, new_password: &str) -> Result<(), AdminError> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(AdminError::EmptyField);
        }
        let stored = self.store.read_admin()?;
        if !stored.password_matches(old_password) {
            return Err(AdminError::PasswordMismatch);
        }
        self.store
            .write_admin(&Credential::new(stored.username, new_password))?;

        info!("administrator password changed");
        Ok(())
    }
}
