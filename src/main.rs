// src/main.rs

use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use confeitaria::config::{Config, StorageBackend};
use confeitaria::shared::bootstrap::init_tracing;
use confeitaria::{configure_routes, AppState};

// Função principal da aplicação Actix Web.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = Config::load().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // Cria o estado compartilhado conforme o armazenamento configurado.
    let app_state = match config.storage.backend {
        StorageBackend::Postgres => {
            // Conecta ao banco de dados PostgreSQL usando um pool de conexões.
            // As colunas de preço devem ser NUMERIC para casar com bigdecimal::BigDecimal.
            let db_pool = PgPoolOptions::new()
                .max_connections(config.storage.max_connections)
                .connect(&config.storage.database_url)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Falha ao conectar ao banco PostgreSQL");
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
                })?;
            AppState::postgres(db_pool, &config.session)
        }
        StorageBackend::Memory => {
            tracing::warn!("Armazenamento em memória: pedidos e carrinhos se perdem ao reiniciar");
            AppState::in_memory(&config.session)
        }
    };
    // web::Data é usado para compartilhar o estado entre as rotas.
    let app_state = web::Data::new(app_state);

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Iniciando API da Confeitaria"
    );

    // Configura e inicia o servidor HTTP.
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            // .clone() é necessário porque a closure é movida
            // e pode ser executada várias vezes.
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    // Vincula o servidor ao endereço IP e porta. O '?' propaga erros.
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
