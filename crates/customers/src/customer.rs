use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{CustomerId, DomainError, DomainResult};

/// The customer record as persisted and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: CustomerId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or fully replacing a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewCustomer {
    pub fn validate(&self) -> DomainResult<()> {
        if self.email.trim().is_empty() {
            return Err(DomainError::validation("email cannot be empty"));
        }
        if self.first_name.trim().is_empty() {
            return Err(DomainError::validation("firstName cannot be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::validation("lastName cannot be empty"));
        }
        Ok(())
    }

    pub fn into_customer(
        self,
        customer_id: CustomerId,
        now: DateTime<Utc>,
    ) -> DomainResult<Customer> {
        self.validate()?;
        Ok(Customer {
            customer_id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            created_at: now,
            updated_at: now,
        })
    }

    /// Full replace: identity and `created_at` come from the existing record.
    pub fn apply_to(self, existing: &Customer, now: DateTime<Utc>) -> DomainResult<Customer> {
        self.validate()?;
        Ok(Customer {
            customer_id: existing.customer_id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            created_at: existing.created_at,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewCustomer {
        NewCustomer {
            email: "jo@example.com".to_string(),
            first_name: "Jo".to_string(),
            last_name: "Bloggs".to_string(),
            phone: None,
            address: None,
        }
    }

    #[test]
    fn create_assigns_identity_and_timestamps() {
        let id = CustomerId::new();
        let c = input().into_customer(id, Utc::now()).unwrap();
        assert_eq!(c.customer_id, id);
        assert_eq!(c.created_at, c.updated_at);
    }

    #[test]
    fn create_rejects_blank_email() {
        let mut bad = input();
        bad.email = "  ".to_string();
        assert!(matches!(
            bad.validate().unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn update_preserves_identity_and_created_at() {
        let c = input().into_customer(CustomerId::new(), Utc::now()).unwrap();
        let mut replacement = input();
        replacement.email = "new@example.com".to_string();
        let updated = replacement.apply_to(&c, Utc::now()).unwrap();
        assert_eq!(updated.customer_id, c.customer_id);
        assert_eq!(updated.created_at, c.created_at);
        assert_eq!(updated.email, "new@example.com");
    }
}
