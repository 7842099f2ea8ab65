// src/checkout/mod.rs

pub mod checkout_structs;
pub mod checkout_validacao;
// Geração do número do pedido
pub mod numero_pedido;
// Gravação transacional de pedidos (Postgres ou memória)
pub mod pedidos_repo;
pub mod checkout_processor;
pub mod checkout_router;
