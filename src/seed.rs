use tracing::info;

use crate::error::StoreError;
use crate::records::{Category, Credential, Product};
use crate::store::RecordStore;

/// Resets the store to the demo fixture: default admin, two cashiers, a
/// fifteen-product catalog, and an empty sales log.
pub fn seed_sample_data(store: &RecordStore) -> Result<(), StoreError> {
    store.write_admin(&Credential::default_admin())?;
    store.rewrite_cashiers(&[
        Credential::new("cashier1", "pass123"),
        Credential::new("cashier2", "pass123"),
    ])?;
    store.rewrite_products(&sample_products())?;
    store.rewrite_sales(&[])?;

    info!("sample data initialized");
    Ok(())
}

fn sample_products() -> Vec<Product> {
    vec![
        Product::new("E001", "Smartphone", Category::Electronics, 599.99, 10),
        Product::new("E002", "Laptop", Category::Electronics, 999.99, 5),
        Product::new("E003", "Headphones", Category::Electronics, 79.99, 20),
        Product::new("G001", "Milk", Category::Groceries, 3.99, 50),
        Product::new("G002", "Bread", Category::Groceries, 2.99, 30),
        Product::new("G003", "Eggs", Category::Groceries, 4.99, 40),
        Product::new("C001", "T-Shirt", Category::Clothing, 19.99, 25),
        Product::new("C002", "Jeans", Category::Clothing, 49.99, 15),
        Product::new("C003", "Socks", Category::Clothing, 9.99, 50),
        Product::new("H001", "Blender", Category::HomeKitchen, 79.99, 8),
        Product::new("H002", "Coffee Maker", Category::HomeKitchen, 49.99, 12),
        Product::new("H003", "Toaster", Category::HomeKitchen, 29.99, 10),
        Product::new("S001", "Basketball", Category::Sports, 24.99, 15),
        Product::new("S002", "Yoga Mat", Category::Sports, 19.99, 20),
        Product::new("S003", "Dumbbells", Category::Sports, 39.99, 10),
    ]
}
