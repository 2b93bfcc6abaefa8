//! Supplier CRUD (`/suppliers`).

use reqwest::Method;
use tracing::{info, instrument};

use cue_shop_core::{Supplier, SupplierForm, SupplierId};

use crate::client::AdminClient;
use crate::error::{AdminError, Result};

fn validate_supplier(form: &SupplierForm) -> Result<()> {
    if form.name.trim().is_empty() {
        return Err(AdminError::BadRequest("Tên nhà cung cấp không được để trống".to_string()));
    }
    Ok(())
}

impl AdminClient {
    /// All suppliers.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn suppliers(&self) -> Result<Vec<Supplier>> {
        self.get("/suppliers").await
    }

    /// Create a supplier.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or the backend rejects it.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_supplier(&self, form: &SupplierForm) -> Result<()> {
        validate_supplier(form)?;
        let url = self.endpoint("/suppliers")?;
        self.send(self.request(Method::POST, url).json(form)).await?;
        info!("Supplier created");
        Ok(())
    }

    /// Replace a supplier's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or the backend rejects it.
    #[instrument(skip(self, form))]
    pub async fn update_supplier(&self, id: SupplierId, form: &SupplierForm) -> Result<()> {
        validate_supplier(form)?;
        let url = self.endpoint(&format!("/suppliers/{id}"))?;
        self.send(self.request(Method::PUT, url).json(form)).await?;
        info!("Supplier updated");
        Ok(())
    }

    /// Delete a supplier. The backend refuses while products reference it.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the deletion.
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: SupplierId) -> Result<()> {
        let url = self.endpoint(&format!("/suppliers/{id}"))?;
        self.send(self.request(Method::DELETE, url)).await?;
        info!("Supplier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_name_required() {
        let blank = SupplierForm {
            name: " ".to_string(),
            contact_info: "0909".to_string(),
        };
        assert!(validate_supplier(&blank).is_err());
        let named = SupplierForm {
            name: "Predator VN".to_string(),
            ..blank
        };
        assert!(validate_supplier(&named).is_ok());
    }
}
