//! Role, order status and payment method enums.
//!
//! All three travel over the wire in `SCREAMING_SNAKE_CASE`. Labels are the
//! Vietnamese strings shown to shoppers.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    #[must_use]
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Account role assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Shop administrator; sees only the admin panel.
    Admin,
    /// Regular shopper.
    Customer,
    /// Any role this client does not know about.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Customer => "CUSTOMER",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "CUSTOMER" => Ok(Self::Customer),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses an administrator can assign from the order table.
    pub const ASSIGNABLE: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire representation (also used as the `status` query parameter).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Label shown to shoppers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Chờ xử lý",
            Self::Confirmed => "Đã xác nhận",
            Self::Processing => "Đang xử lý",
            Self::Shipped => "Đang giao",
            Self::Delivered | Self::Completed => "Hoàn thành",
            Self::Cancelled => "Đã hủy",
            Self::Unknown => "Không rõ",
        }
    }

    /// Only orders nobody has started working on can be cancelled by the shopper.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError::new("order status", s)),
        }
    }
}

/// How the shopper pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    BankTransfer,
    Paypal,
}

impl PaymentMethod {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Paypal => "PAYPAL",
        }
    }

    /// Label shown to shoppers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cod => "Thanh toán khi nhận hàng",
            Self::BankTransfer => "Chuyển khoản ngân hàng",
            Self::Paypal => "PayPal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "COD" => Ok(Self::Cod),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "PAYPAL" => Ok(Self::Paypal),
            _ => Err(ParseEnumError::new("payment method", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"CUSTOMER\"");
    }

    #[test]
    fn test_unknown_role_does_not_fail() {
        let role: Role = serde_json::from_str("\"WAREHOUSE\"").unwrap();
        assert_eq!(role, Role::Unknown);
    }

    #[test]
    fn test_order_status_parse_is_case_insensitive() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_labels() {
        assert_eq!(OrderStatus::Pending.label(), "Chờ xử lý");
        assert_eq!(OrderStatus::Cancelled.label(), "Đã hủy");
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(
            "bank-transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Cod).unwrap(),
            "\"COD\""
        );
    }
}
