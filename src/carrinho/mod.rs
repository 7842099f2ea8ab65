// src/carrinho/mod.rs

// Carrinho e itens (valores puros, totais derivados)
pub mod carrinho_structs;
// Persistência do carrinho por sessão
pub mod sessao_store;
// Operações do carrinho com carga/gravação na sessão
pub mod carrinho_store;
pub mod carrinho_router;
