// src/carrinho/sessao_store.rs

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Tempo padrão sem uso até uma sessão expirar (2 horas).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120 * 60);

/// Armazenamento chave-valor opaco, escopado por sessão de navegação.
/// Guarda o carrinho serializado entre uma requisição e outra.
pub trait SessionStore: Send + Sync {
    fn load(&self, session_id: &str) -> Option<String>;
    fn save(&self, session_id: &str, blob: String);
    fn forget(&self, session_id: &str);
}

struct Entrada {
    blob: String,
    tocada_em: Instant,
}

/// Sessões mantidas em memória do processo.
/// RwLock permite múltiplos leitores ou um único escritor.
///
/// Sessões sem gravação há mais de `idle_timeout` deixam de existir: a leitura as ignora
/// e cada gravação varre as expiradas.
pub struct MemorySessionStore {
    sessoes: RwLock<HashMap<String, Entrada>>,
    idle_timeout: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        MemorySessionStore {
            sessoes: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.sessoes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessoes.read().is_empty()
    }

    fn expirada(&self, entrada: &Entrada, agora: Instant) -> bool {
        agora.duration_since(entrada.tocada_em) >= self.idle_timeout
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, session_id: &str) -> Option<String> {
        let agora = Instant::now();
        self.sessoes
            .read()
            .get(session_id)
            .filter(|entrada| !self.expirada(entrada, agora))
            .map(|entrada| entrada.blob.clone())
    }

    fn save(&self, session_id: &str, blob: String) {
        let agora = Instant::now();
        let mut sessoes = self.sessoes.write();

        let antes = sessoes.len();
        sessoes.retain(|_, entrada| !self.expirada(entrada, agora));
        let removidas = antes - sessoes.len();
        if removidas > 0 {
            tracing::debug!(removidas, "Sessões expiradas removidas");
        }

        sessoes.insert(
            session_id.to_string(),
            Entrada {
                blob,
                tocada_em: agora,
            },
        );
    }

    fn forget(&self, session_id: &str) {
        self.sessoes.write().remove(session_id);
    }
}
