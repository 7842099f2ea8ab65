// src/produtos/produtos_structs.rs

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Estrutura que representa um produto (bolo, pão, doce) do catálogo.
/// Deriva FromRow para mapeamento direto de resultados de query SQL.
/// O núcleo de carrinho/checkout só lê produtos, nunca os altera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub image: String,
    pub is_featured: bool,
}
