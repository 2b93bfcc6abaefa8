//! Supplier records for the admin panel.

use serde::{Deserialize, Serialize};

use crate::types::SupplierId;

/// A supplier as returned by `GET /suppliers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    #[serde(default)]
    pub contact_info: Option<String>,
}

/// Create/update payload for suppliers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierForm {
    pub name: String,
    pub contact_info: String,
}
