// src/shared/bootstrap.rs

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Inicializa o tracing lendo o filtro da variável CONFEITARIA_LOG.
///
/// Usa o nível "info" quando a variável não está definida.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("CONFEITARIA_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
