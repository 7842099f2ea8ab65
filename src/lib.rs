// src/lib.rs

//! Confeitaria: catálogo, carrinho por sessão e checkout de uma loja de bolos.

use std::sync::Arc;

use actix_web::web;
use sqlx::PgPool;

pub mod carrinho; // Módulo do carrinho
pub mod checkout; // Módulo de checkout e pedidos
pub mod config;
pub mod produtos; // Módulo de produtos (catálogo)
pub mod shared; // Módulo shared

use carrinho::carrinho_store::CartStore;
use carrinho::sessao_store::{MemorySessionStore, SessionStore};
use config::SessionConfig;
use checkout::checkout_processor::CheckoutProcessor;
use checkout::numero_pedido::TimestampOrderNumbers;
use checkout::pedidos_repo::{MemoryOrderStore, OrderStore, PgOrderStore};
use produtos::produtos_repo::{MemoryProductCatalog, PgProductCatalog, ProductCatalog};

// Estado compartilhado entre as rotas: catálogo, carrinhos e checkout.
pub struct AppState {
    pub catalogo: Arc<dyn ProductCatalog>,
    pub carrinhos: Arc<CartStore>,
    pub checkout: CheckoutProcessor,
    pub cookie_name: String,
}

impl AppState {
    /// Monta o estado a partir das peças de armazenamento.
    pub fn new(
        catalogo: Arc<dyn ProductCatalog>,
        sessoes: Arc<dyn SessionStore>,
        pedidos: Arc<dyn OrderStore>,
        cookie_name: impl Into<String>,
    ) -> Self {
        let carrinhos = Arc::new(CartStore::new(sessoes));
        let checkout = CheckoutProcessor::new(carrinhos.clone(), pedidos, Arc::new(TimestampOrderNumbers));

        AppState {
            catalogo,
            carrinhos,
            checkout,
            cookie_name: cookie_name.into(),
        }
    }

    /// Catálogo e pedidos no PostgreSQL; sessões em memória.
    pub fn postgres(pool: PgPool, sessao: &SessionConfig) -> Self {
        Self::new(
            Arc::new(PgProductCatalog::new(pool.clone())),
            Arc::new(MemorySessionStore::with_idle_timeout(sessao.idle_timeout())),
            Arc::new(PgOrderStore::new(pool)),
            sessao.cookie_name.clone(),
        )
    }

    /// Tudo em memória, com o catálogo da vitrine.
    pub fn in_memory(sessao: &SessionConfig) -> Self {
        Self::new(
            Arc::new(MemoryProductCatalog::seeded()),
            Arc::new(MemorySessionStore::with_idle_timeout(sessao.idle_timeout())),
            Arc::new(MemoryOrderStore::new()),
            sessao.cookie_name.clone(),
        )
    }
}

/// Registra todas as rotas da API.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Módulo de Produtos ("destaques" antes de "{id}")
        .service(produtos::produtos_router::buscar_produtos)
        .service(produtos::produtos_router::buscar_destaques)
        .service(produtos::produtos_router::buscar_produto_por_id)
        // Módulo do Carrinho
        .service(carrinho::carrinho_router::ver_carrinho)
        .service(carrinho::carrinho_router::adicionar_item)
        .service(carrinho::carrinho_router::atualizar_item)
        .service(carrinho::carrinho_router::remover_item)
        .service(carrinho::carrinho_router::limpar_carrinho)
        // Módulo de Checkout
        .service(checkout::checkout_router::iniciar_checkout)
        .service(checkout::checkout_router::processar_checkout)
        .service(checkout::checkout_router::confirmacao);
}
