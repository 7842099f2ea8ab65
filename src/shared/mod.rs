// src/shared/mod.rs

// Envelope padrão das respostas JSON
pub mod shared_structs;
// Inicialização de logs
pub mod bootstrap;
// Sessão do navegador (cookie -> identificador)
pub mod sessao;
