// src/checkout/numero_pedido.rs

use chrono::Local;
use rand::Rng;

/// Prefixo fixo dos números de pedido.
pub const ORDER_PREFIX: &str = "SD";

/// Gera candidatos a número de pedido.
///
/// A unicidade não é garantida aqui: o repositório de pedidos rejeita duplicados e o
/// checkout pede outro número.
pub trait OrderNumberSource: Send + Sync {
    fn next_number(&self) -> String;
}

/// Prefixo + data/hora local (AAAAMMDDhhmmss) + sufixo aleatório de 3 dígitos (100-999).
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampOrderNumbers;

impl OrderNumberSource for TimestampOrderNumbers {
    fn next_number(&self) -> String {
        let timestamp = Local::now().format("%Y%m%d%H%M%S");
        let sufixo: u16 = rand::rng().random_range(100..=999);
        format!("{}{}{}", ORDER_PREFIX, timestamp, sufixo)
    }
}
