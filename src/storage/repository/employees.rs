// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Employee repository. Every employee belongs to exactly one enterprise.

use chrono::Utc;
use redb::ReadableTable;

use crate::models::Employee;
use crate::storage::{next_id, Database, StorageError, StorageResult, EMPLOYEES};

/// Fields accepted when creating an employee.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub department: Option<String>,
    pub role: Option<String>,
    pub salary: Option<f64>,
    pub enterprise_id: u64,
}

/// Repository for employee operations.
pub struct EmployeeRepository<'a> {
    db: &'a Database,
}

impl<'a> EmployeeRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create an employee. Enterprise existence is checked by the caller.
    pub fn create(&self, new: NewEmployee) -> StorageResult<Employee> {
        let write_txn = self.db.begin_write()?;
        let employee = {
            let id = next_id(&write_txn, "employees")?;
            let now = Utc::now();
            let employee = Employee {
                id,
                name: new.name,
                department: new.department,
                role: new.role,
                salary: new.salary,
                status: "active".to_string(),
                enterprise_id: new.enterprise_id,
                created_at: now,
                updated_at: now,
            };

            let mut table = write_txn.open_table(EMPLOYEES)?;
            table.insert(id, serde_json::to_vec(&employee)?.as_slice())?;
            employee
        };
        write_txn.commit()?;
        Ok(employee)
    }

    /// Look up an employee by id.
    pub fn get(&self, id: u64) -> StorageResult<Option<Employee>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EMPLOYEES)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Whether an employee with this id exists.
    pub fn exists(&self, id: u64) -> StorageResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// All employees, newest first.
    pub fn list(&self) -> StorageResult<Vec<Employee>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EMPLOYEES)?;
        let mut employees = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            employees.push(serde_json::from_slice::<Employee>(value.value())?);
        }
        employees.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(employees)
    }

    /// Employees of one enterprise, newest first.
    pub fn list_by_enterprise(&self, enterprise_id: u64) -> StorageResult<Vec<Employee>> {
        let mut employees = self.list()?;
        employees.retain(|e| e.enterprise_id == enterprise_id);
        Ok(employees)
    }

    /// Persist an updated employee record.
    pub fn update(&self, employee: &Employee) -> StorageResult<()> {
        let mut employee = employee.clone();
        employee.updated_at = Utc::now();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(EMPLOYEES)?;
            if table.get(employee.id)?.is_none() {
                return Err(StorageError::NotFound("Employee".to_string()));
            }
            table.insert(employee.id, serde_json::to_vec(&employee)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Delete an employee.
    pub fn delete(&self, id: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(EMPLOYEES)?;
            if table.remove(id)?.is_none() {
                return Err(StorageError::NotFound("Employee".to_string()));
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Total employee count, optionally scoped to one enterprise.
    pub fn count(&self, enterprise_id: Option<u64>) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EMPLOYEES)?;
        let mut count = 0;
        for entry in table.iter()? {
            let (_, value) = entry?;
            match enterprise_id {
                None => count += 1,
                Some(eid) => {
                    let employee: Employee = serde_json::from_slice(value.value())?;
                    if employee.enterprise_id == eid {
                        count += 1;
                    }
                }
            }
        }
        Ok(count)
    }
}
