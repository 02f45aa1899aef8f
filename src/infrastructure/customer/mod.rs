// src/infrastructure/customer/mod.rs
use std::collections::HashMap;
use async_trait::async_trait;

use crate::domain::errors::RepositoryError;
use crate::domain::model::Customer;
use crate::domain::repository::CustomerRepository;

#[derive(Debug, Default)]
pub struct InMemoryCustomerRepository {
    customers: HashMap<String, Customer>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, customer: Customer) {
        self.customers.insert(customer.id.clone(), customer);
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn get_customer(&self, id: &str) -> Result<Customer, RepositoryError> {
        self.customers
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("customer {}", id)))
    }

    async fn adjust_points(&mut self, id: &str, delta: i64) -> Result<Customer, RepositoryError> {
        let customer = self
            .customers
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("customer {}", id)))?;

        let updated = if delta >= 0 {
            customer.loyalty_points.checked_add(delta.unsigned_abs())
        } else {
            customer.loyalty_points.checked_sub(delta.unsigned_abs())
        };

        customer.loyalty_points = updated.ok_or_else(|| {
            RepositoryError::Storage(format!(
                "Loyalty balance of {} cannot change by {}",
                id, delta
            ))
        })?;
        Ok(customer.clone())
    }
}
