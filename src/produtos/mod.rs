// src/produtos/mod.rs

pub mod produtos_structs;
// Fonte do catálogo (Postgres ou memória)
pub mod produtos_repo;
pub mod produtos_router;
