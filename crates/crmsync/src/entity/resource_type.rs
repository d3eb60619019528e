//! Resource type enum for type-safe handling of CRM collections.
//!
//! Each value maps statically to a remote collection path, the response
//! envelope key carrying the records array, and a destination table. Behavior
//! is never selected by building strings at runtime.

use serde::{Deserialize, Serialize};

/// CRM entity categories synchronized independently of each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Sales deal / opportunity
    Deal,
    /// Person contact
    Contact,
    /// Company account
    Account,
    /// Catalog product
    Product,
    /// Logged sales activity (call, meeting, ...)
    SalesActivity,
}

impl ResourceType {
    /// All resource types, in the order a full sync processes them.
    ///
    /// Contacts, accounts and products come before deals so a fresh database
    /// receives referenced entities before the records pointing at them.
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Contact,
        ResourceType::Account,
        ResourceType::Product,
        ResourceType::Deal,
        ResourceType::SalesActivity,
    ];

    /// Remote collection path under the API base URL.
    ///
    /// This doubles as the envelope key under which the listing endpoint
    /// nests its records array.
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            ResourceType::Deal => "deals",
            ResourceType::Contact => "contacts",
            ResourceType::Account => "sales_accounts",
            ResourceType::Product => "products",
            ResourceType::SalesActivity => "sales_activities",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Deal => write!(f, "deal"),
            ResourceType::Contact => write!(f, "contact"),
            ResourceType::Account => write!(f, "account"),
            ResourceType::Product => write!(f, "product"),
            ResourceType::SalesActivity => write!(f, "sales_activity"),
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deal" | "deals" => Ok(ResourceType::Deal),
            "contact" | "contacts" => Ok(ResourceType::Contact),
            "account" | "accounts" | "sales_account" | "sales_accounts" => {
                Ok(ResourceType::Account)
            }
            "product" | "products" => Ok(ResourceType::Product),
            "sales_activity" | "sales_activities" | "activity" | "activities" => {
                Ok(ResourceType::SalesActivity)
            }
            _ => Err(format!("Unknown resource type: {}", s)),
        }
    }
}
