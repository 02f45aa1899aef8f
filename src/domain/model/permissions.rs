// src/domain/model/permissions.rs
// Role based permissions for register operations

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, PermissionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Cashier,
    Manager,
    Admin,
    Custom,
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cashier" => Ok(UserRole::Cashier),
            "manager" => Ok(UserRole::Manager),
            "admin" => Ok(UserRole::Admin),
            "custom" => Ok(UserRole::Custom),
            _ => Err(DomainError::UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    PosAccess,
    Sales,
    Refunds,
    Discounts,
    InventoryView,
    InventoryEdit,
    ProductCreation,
    CustomerView,
    CustomerCreation,
    DailyReports,
    FinancialReports,
    Settings,
    UserManagement,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Permission::PosAccess => "POS access",
            Permission::Sales => "sales",
            Permission::Refunds => "refunds",
            Permission::Discounts => "discounts",
            Permission::InventoryView => "inventory view",
            Permission::InventoryEdit => "inventory edit",
            Permission::ProductCreation => "product creation",
            Permission::CustomerView => "customer view",
            Permission::CustomerCreation => "customer creation",
            Permission::DailyReports => "daily reports",
            Permission::FinancialReports => "financial reports",
            Permission::Settings => "settings",
            Permission::UserManagement => "user management",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub enable_pos_access: bool,
    pub enable_sales_access: bool,
    pub enable_refunds_access: bool,
    pub enable_discount_access: bool,
    pub enable_inventory_view: bool,
    pub enable_inventory_edit: bool,
    pub enable_product_creation: bool,
    pub enable_customer_view: bool,
    pub enable_customer_creation: bool,
    pub enable_daily_reports: bool,
    pub enable_financial_reports: bool,
    pub enable_settings_access: bool,
    pub enable_user_management: bool,
    /// Largest discount, as a share of the subtotal, this role may give
    pub max_discount_percent: Decimal,
}

impl PermissionSet {
    pub fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Cashier | UserRole::Custom => Self::cashier(),
            UserRole::Manager => Self {
                enable_refunds_access: true,
                enable_discount_access: true,
                enable_inventory_edit: true,
                enable_product_creation: true,
                enable_daily_reports: true,
                max_discount_percent: dec!(20),
                ..Self::cashier()
            },
            UserRole::Admin => Self {
                enable_pos_access: true,
                enable_sales_access: true,
                enable_refunds_access: true,
                enable_discount_access: true,
                enable_inventory_view: true,
                enable_inventory_edit: true,
                enable_product_creation: true,
                enable_customer_view: true,
                enable_customer_creation: true,
                enable_daily_reports: true,
                enable_financial_reports: true,
                enable_settings_access: true,
                enable_user_management: true,
                max_discount_percent: Decimal::ONE_HUNDRED,
            },
        }
    }

    fn cashier() -> Self {
        Self {
            enable_pos_access: true,
            enable_sales_access: true,
            enable_refunds_access: false,
            enable_discount_access: false,
            enable_inventory_view: true,
            enable_inventory_edit: false,
            enable_product_creation: false,
            enable_customer_view: true,
            enable_customer_creation: true,
            enable_daily_reports: false,
            enable_financial_reports: false,
            enable_settings_access: false,
            enable_user_management: false,
            max_discount_percent: Decimal::ZERO,
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::PosAccess => self.enable_pos_access,
            Permission::Sales => self.enable_sales_access,
            Permission::Refunds => self.enable_refunds_access,
            Permission::Discounts => self.enable_discount_access,
            Permission::InventoryView => self.enable_inventory_view,
            Permission::InventoryEdit => self.enable_inventory_edit,
            Permission::ProductCreation => self.enable_product_creation,
            Permission::CustomerView => self.enable_customer_view,
            Permission::CustomerCreation => self.enable_customer_creation,
            Permission::DailyReports => self.enable_daily_reports,
            Permission::FinancialReports => self.enable_financial_reports,
            Permission::Settings => self.enable_settings_access,
            Permission::UserManagement => self.enable_user_management,
        }
    }

    pub fn ensure(&self, permission: Permission) -> Result<(), PermissionError> {
        if self.allows(permission) {
            Ok(())
        } else {
            Err(PermissionError::Denied(permission))
        }
    }

    /// Check a discount worth `percent` of the subtotal against this role
    pub fn ensure_discount(&self, percent: Decimal) -> Result<(), PermissionError> {
        self.ensure(Permission::Discounts)?;
        if percent > self.max_discount_percent {
            return Err(PermissionError::DiscountTooLarge {
                requested: percent,
                allowed: self.max_discount_percent,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cashier_cannot_discount() {
        let cashier = PermissionSet::for_role(UserRole::Cashier);
        assert!(cashier.allows(Permission::PosAccess));
        assert_eq!(
            cashier.ensure_discount(dec!(5)),
            Err(PermissionError::Denied(Permission::Discounts))
        );
    }

    #[test]
    fn test_manager_discount_is_capped() {
        let manager = PermissionSet::for_role(UserRole::Manager);
        assert!(manager.ensure_discount(dec!(20)).is_ok());
        assert_eq!(
            manager.ensure_discount(dec!(25)),
            Err(PermissionError::DiscountTooLarge {
                requested: dec!(25),
                allowed: dec!(20),
            })
        );
        assert!(!manager.allows(Permission::UserManagement));
    }

    #[test]
    fn test_admin_has_everything() {
        let admin = PermissionSet::for_role(UserRole::Admin);
        assert!(admin.ensure(Permission::UserManagement).is_ok());
        assert!(admin.ensure_discount(dec!(100)).is_ok());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Manager".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert!("owner".parse::<UserRole>().is_err());
    }
}
