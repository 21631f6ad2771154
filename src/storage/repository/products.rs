// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Product repository. Products belong to an enterprise and may be
//! assigned to an employee; SKUs are unique when present.

use chrono::Utc;
use redb::ReadableTable;

use crate::models::Product;
use crate::storage::{next_id, Database, StorageError, StorageResult, PRODUCTS, PRODUCTS_BY_SKU};

/// Fields accepted when creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub enterprise_id: u64,
    pub employee_id: Option<u64>,
}

/// Repository for product operations.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

impl<'a> ProductRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a product. Fails with `AlreadyExists` when the SKU is taken.
    /// Enterprise/employee existence is checked by the caller.
    pub fn create(&self, new: NewProduct) -> StorageResult<Product> {
        let write_txn = self.db.begin_write()?;
        let product = {
            let mut by_sku = write_txn.open_table(PRODUCTS_BY_SKU)?;
            if let Some(sku) = &new.sku {
                if by_sku.get(sku.as_str())?.is_some() {
                    return Err(StorageError::AlreadyExists("SKU".to_string()));
                }
            }

            let id = next_id(&write_txn, "products")?;
            let now = Utc::now();
            let product = Product {
                id,
                name: new.name,
                sku: new.sku,
                price: new.price,
                category: new.category,
                enterprise_id: new.enterprise_id,
                employee_id: new.employee_id,
                created_at: now,
                updated_at: now,
            };

            let mut table = write_txn.open_table(PRODUCTS)?;
            table.insert(id, serde_json::to_vec(&product)?.as_slice())?;
            if let Some(sku) = &product.sku {
                by_sku.insert(sku.as_str(), id)?;
            }
            product
        };
        write_txn.commit()?;
        Ok(product)
    }

    /// Look up a product by id.
    pub fn get(&self, id: u64) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All products, newest first.
    pub fn list(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS)?;
        let mut products = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            products.push(serde_json::from_slice::<Product>(value.value())?);
        }
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    /// Products of one enterprise, newest first.
    pub fn list_by_enterprise(&self, enterprise_id: u64) -> StorageResult<Vec<Product>> {
        let mut products = self.list()?;
        products.retain(|p| p.enterprise_id == enterprise_id);
        Ok(products)
    }

    /// Products assigned to one employee, newest first.
    pub fn list_by_employee(&self, employee_id: u64) -> StorageResult<Vec<Product>> {
        let mut products = self.list()?;
        products.retain(|p| p.employee_id == Some(employee_id));
        Ok(products)
    }

    /// Persist an updated product, repairing the SKU index when it changed.
    pub fn update(&self, product: &Product) -> StorageResult<()> {
        let mut product = product.clone();
        product.updated_at = Utc::now();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRODUCTS)?;
            let old: Product = {
                let existing = table
                    .get(product.id)?
                    .ok_or_else(|| StorageError::NotFound("Product".to_string()))?;
                serde_json::from_slice(existing.value())?
            };

            if old.sku != product.sku {
                let mut by_sku = write_txn.open_table(PRODUCTS_BY_SKU)?;
                if let Some(new_sku) = &product.sku {
                    if let Some(existing) = by_sku.get(new_sku.as_str())? {
                        if existing.value() != product.id {
                            return Err(StorageError::AlreadyExists("SKU".to_string()));
                        }
                    }
                }
                if let Some(old_sku) = &old.sku {
                    by_sku.remove(old_sku.as_str())?;
                }
                if let Some(new_sku) = &product.sku {
                    by_sku.insert(new_sku.as_str(), product.id)?;
                }
            }

            table.insert(product.id, serde_json::to_vec(&product)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Delete a product and its SKU index entry.
    pub fn delete(&self, id: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRODUCTS)?;
            let product: Product = {
                let existing = table
                    .get(id)?
                    .ok_or_else(|| StorageError::NotFound("Product".to_string()))?;
                serde_json::from_slice(existing.value())?
            };
            table.remove(id)?;

            if let Some(sku) = &product.sku {
                let mut by_sku = write_txn.open_table(PRODUCTS_BY_SKU)?;
                by_sku.remove(sku.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Total product count, optionally scoped to one enterprise.
    pub fn count(&self, enterprise_id: Option<u64>) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS)?;
        let mut count = 0;
        for entry in table.iter()? {
            let (_, value) = entry?;
            match enterprise_id {
                None => count += 1,
                Some(eid) => {
                    let product: Product = serde_json::from_slice(value.value())?;
                    if product.enterprise_id == eid {
                        count += 1;
                    }
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn sample(name: &str, sku: Option<&str>, enterprise_id: u64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            sku: sku.map(String::from),
            price: Some(9.99),
            category: Some("widgets".to_string()),
            enterprise_id,
            employee_id: None,
        }
    }

    #[test]
    fn create_and_get() {
        let (db, _dir) = temp_db();
        let repo = db.products();

        let product = repo.create(sample("Widget", Some("W-1"), 1)).unwrap();
        let loaded = repo.get(product.id).unwrap().unwrap();
        assert_eq!(loaded.sku.as_deref(), Some("W-1"));
    }

    #[test]
    fn duplicate_sku_rejected() {
        let (db, _dir) = temp_db();
        let repo = db.products();
        repo.create(sample("Widget", Some("W-1"), 1)).unwrap();

        let result = repo.create(sample("Gadget", Some("W-1"), 1));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        // Products without a SKU never conflict.
        repo.create(sample("Gadget", None, 1)).unwrap();
        repo.create(sample("Gizmo", None, 1)).unwrap();
    }

    #[test]
    fn sku_change_reindexes() {
        let (db, _dir) = temp_db();
        let repo = db.products();
        let mut product = repo.create(sample("Widget", Some("W-1"), 1)).unwrap();

        product.sku = Some("W-2".to_string());
        repo.update(&product).unwrap();

        // Old SKU is free again.
        repo.create(sample("Other", Some("W-1"), 1)).unwrap();
    }

    #[test]
    fn scoped_listings() {
        let (db, _dir) = temp_db();
        let repo = db.products();
        let mut assigned = sample("Widget", None, 1);
        assigned.employee_id = Some(42);
        repo.create(assigned).unwrap();
        repo.create(sample("Gadget", None, 1)).unwrap();
        repo.create(sample("Gizmo", None, 2)).unwrap();

        assert_eq!(repo.list_by_enterprise(1).unwrap().len(), 2);
        assert_eq!(repo.list_by_employee(42).unwrap().len(), 1);
        assert_eq!(repo.count(Some(2)).unwrap(), 1);
        assert_eq!(repo.count(None).unwrap(), 3);
    }

    #[test]
    fn delete_frees_sku() {
        let (db, _dir) = temp_db();
        let repo = db.products();
        let product = repo.create(sample("Widget", Some("W-1"), 1)).unwrap();

        repo.delete(product.id).unwrap();
        assert!(repo.get(product.id).unwrap().is_none());
        repo.create(sample("Widget2", Some("W-1"), 1)).unwrap();
    }
}
