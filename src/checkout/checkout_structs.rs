// src/checkout/checkout_structs.rs

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Faixas de horário de entrega aceitas no checkout.
pub const DELIVERY_SLOTS: [&str; 3] = ["9:00 AM - 12:00 PM", "12:00 PM - 3:00 PM", "3:00 PM - 6:00 PM"];

/// Estrutura para receber o formulário de checkout como veio da requisição.
/// Todos os campos são opcionais aqui; a validação decide o que é obrigatório.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_date: Option<String>,
    pub delivery_time: Option<String>,
    pub special_instructions: Option<String>,
    pub payment_method: Option<String>,
}

/// Erro de validação de um campo do formulário.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

/// Dados do formulário já validados e tipados.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub delivery_address: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: String,
    pub special_instructions: Option<String>,
    pub payment_method: PaymentMethod,
}

/// Erro ao converter texto do banco em um dos enums do pedido.
#[derive(Debug, thiserror::Error)]
#[error("valor desconhecido para {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// Gera as conversões texto <-> enum usadas no banco e no formulário.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant { kind: $kind, value: s.to_string() }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    CashOnDelivery,
}

text_enum!(PaymentMethod, "payment_method", {
    CreditCard => "credit_card",
    Paypal => "paypal",
    CashOnDelivery => "cash_on_delivery",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

text_enum!(PaymentStatus, "payment_status", {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Delivered,
    Cancelled,
}

text_enum!(OrderStatus, "status", {
    Pending => "pending",
    Preparing => "preparing",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

/// Pedido a ser gravado, montado a partir do carrinho e do formulário.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: String,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub total: BigDecimal,
    pub details: CheckoutDetails,
}

/// Item de pedido a ser gravado.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_subtotal: BigDecimal,
    pub customization: Option<String>,
}

/// Pedido gravado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub status: OrderStatus,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub total: BigDecimal,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub delivery_address: String,
    pub delivery_date: NaiveDate,
    pub delivery_time: String,
    pub special_instructions: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Item de um pedido gravado.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_subtotal: BigDecimal,
    pub customization: Option<String>,
}

/// Pedido com seus itens, para a página de confirmação.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderConfirmation {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Resposta de sucesso do checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
    pub order_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_text() {
        assert_eq!("cash_on_delivery".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashOnDelivery);
        assert_eq!(PaymentStatus::Paid.as_str(), "paid");
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn form_accepts_missing_fields() {
        let form: CheckoutForm = serde_json::from_str(r#"{"customer_name": "Ana"}"#).unwrap();
        assert_eq!(form.customer_name.as_deref(), Some("Ana"));
        assert!(form.payment_method.is_none());
    }
}
