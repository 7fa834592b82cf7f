//! Flat-file record store: credentials, catalog, and sales log, one
//! delimited record per line. Reads are whole-file scans; mutations rewrite
//! the full record set through a sibling temp file so the backing file is
//! either untouched or fully updated, never partial.

use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::records::{Credential, Product, SaleRecord};

pub const ADMIN_FILE: &str = "admin.txt";
pub const CASHIERS_FILE: &str = "cashiers.txt";
pub const PRODUCTS_FILE: &str = "products.txt";
pub const BILLS_FILE: &str = "bills.txt";

#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    /// Opens the store, creating the data directory and any missing files.
    /// A missing administrator file is seeded with the default credentials.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            data_dir: data_dir.into(),
        };
        fs::create_dir_all(&store.data_dir)?;

        if !store.path(ADMIN_FILE).exists() {
            store.rewrite_records(ADMIN_FILE, &[Credential::default_admin()])?;
        }
        for file in [CASHIERS_FILE, PRODUCTS_FILE, BILLS_FILE] {
            let path = store.path(file);
            if !path.exists() {
                File::create(&path)?;
            }
        }

        debug!(data_dir = %store.data_dir.display(), "record store opened");
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn read_admin(&self) -> Result<Credential, StoreError> {
        let mut records: Vec<Credential> = self.read_records(ADMIN_FILE)?;
        if records.is_empty() {
            return Err(StoreError::MissingAdmin);
        }
        Ok(records.remove(0))
    }

    pub fn write_admin(&self, credential: &Credential) -> Result<(), StoreError> {
        self.rewrite_records(ADMIN_FILE, std::slice::from_ref(credential))
    }

    pub fn read_cashiers(&self) -> Result<Vec<Credential>, StoreError> {
        self.read_records(CASHIERS_FILE)
    }

    pub fn append_cashier(&self, credential: &Credential) -> Result<(), StoreError> {
        self.append_record(CASHIERS_FILE, credential)
    }

    pub fn rewrite_cashiers(&self, cashiers: &[Credential]) -> Result<(), StoreError> {
        self.rewrite_records(CASHIERS_FILE, cashiers)
    }

    pub fn read_products(&self) -> Result<Vec<Product>, StoreError> {
        self.read_records(PRODUCTS_FILE)
    }

    pub fn rewrite_products(&self, products: &[Product]) -> Result<(), StoreError> {
        self.rewrite_records(PRODUCTS_FILE, products)
    }

    pub fn read_sales(&self) -> Result<Vec<SaleRecord>, StoreError> {
        self.read_records(BILLS_FILE)
    }

    pub fn append_sale(&self, sale: &SaleRecord) -> Result<(), StoreError> {
        self.append_record(BILLS_FILE, sale)
    }

    pub fn rewrite_sales(&self, sales: &[SaleRecord]) -> Result<(), StoreError> {
        self.rewrite_records(BILLS_FILE, sales)
    }

    fn read_records<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let file = File::open(self.path(file))?;
        // The CSV reader is buffered internally, so the file handle does not
        // need an io::BufReader wrapper.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(file);

        // One malformed line fails the whole read.
        let records: Result<Vec<T>, _> = rdr.deserialize().collect();
        Ok(records?)
    }

    fn rewrite_records<T: Serialize>(&self, file: &str, records: &[T]) -> Result<(), StoreError> {
        let target = self.path(file);
        let tmp = self.path(&format!("{file}.tmp"));

        let written = write_records(&tmp, records)
            .and_then(|()| fs::rename(&tmp, &target).map_err(StoreError::from));
        if written.is_err() {
            // The target has not been replaced yet; only the temp file needs
            // cleaning up.
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(tmp = %tmp.display(), error = %cleanup, "failed to remove temp file");
            }
            return written;
        }

        debug!(file, records = records.len(), "store file rewritten");
        Ok(())
    }

    fn append_record<T: Serialize>(&self, file: &str, record: &T) -> Result<(), StoreError> {
        let file = OpenOptions::new().append(true).open(self.path(file))?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        wtr.serialize(record)?;
        wtr.flush()?;
        Ok(())
    }
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Category;
    use tempfile::TempDir;

    fn open_test_store() -> (TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn open_bootstraps_files_and_default_admin() {
        let (_dir, store) = open_test_store();

        for file in [ADMIN_FILE, CASHIERS_FILE, PRODUCTS_FILE, BILLS_FILE] {
            assert!(store.path(file).exists(), "{file} should exist");
        }
        assert_eq!(store.read_admin().unwrap(), Credential::default_admin());
        assert!(store.read_cashiers().unwrap().is_empty());
        assert!(store.read_products().unwrap().is_empty());
        assert!(store.read_sales().unwrap().is_empty());
    }

    #[test]
    fn open_preserves_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        store
            .write_admin(&Credential::new("admin", "changed456"))
            .unwrap();

        let reopened = RecordStore::open(dir.path()).unwrap();

        assert_eq!(
            reopened.read_admin().unwrap(),
            Credential::new("admin", "changed456")
        );
    }

    #[test]
    fn rewrite_replaces_whole_file_and_leaves_no_temp() {
        let (_dir, store) = open_test_store();
        let first = vec![Product::new("E001", "Smartphone", Category::Electronics, 599.99, 10)];
        let second = vec![
            Product::new("G001", "Milk", Category::Groceries, 3.99, 50),
            Product::new("G002", "Bread", Category::Groceries, 2.99, 30),
        ];

        store.rewrite_products(&first).unwrap();
        store.rewrite_products(&second).unwrap();

        assert_eq!(store.read_products().unwrap(), second);
        assert!(!store.path(&format!("{PRODUCTS_FILE}.tmp")).exists());
    }

    #[test]
    fn malformed_line_fails_whole_read() {
        let (_dir, store) = open_test_store();
        fs::write(
            store.path(PRODUCTS_FILE),
            "E001,Smartphone,Electronics,599.99,10\nG001,Milk\n",
        )
        .unwrap();

        assert!(matches!(
            store.read_products(),
            Err(StoreError::Malformed(_))
        ));
    }

    #[test]
    fn append_sale_adds_one_line_per_call() {
        let (_dir, store) = open_test_store();

        store
            .append_sale(&SaleRecord {
                timestamp: "2026-08-06 10:15:00".to_owned(),
                total: 19.99,
            })
            .unwrap();
        store
            .append_sale(&SaleRecord {
                timestamp: "2026-08-06 10:20:00".to_owned(),
                total: 3.99,
            })
            .unwrap();

        let sales = store.read_sales().unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].total, 19.99);
        assert_eq!(sales[1].total, 3.99);
    }

    #[test]
    fn missing_admin_record_is_reported() {
        let (_dir, store) = open_test_store();
        fs::write(store.path(ADMIN_FILE), "").unwrap();

        assert!(matches!(store.read_admin(), Err(StoreError::MissingAdmin)));
    }
}
