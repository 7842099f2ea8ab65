// src/shared/sessao.rs

use actix_web::{
    cookie::{Cookie, SameSite},
    dev::Payload,
    web, FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder, ResponseError,
};

use futures::future::{ready, Ready};
use uuid::Uuid;

// Importa o AppState do módulo raiz (lib.rs)
use crate::AppState;

/// Nome padrão do cookie de sessão, usado quando o AppState não está disponível.
pub const DEFAULT_COOKIE_NAME: &str = "confeitaria_sessao";

/// Identifica a sessão de navegação dona de um carrinho.
/// Será extraída de todas as requisições de carrinho e checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    id: String,
    cookie_name: String,
    // true quando a requisição não trouxe cookie e a sessão foi criada agora
    is_new: bool,
}

impl SessionId {
    /// Sessão já conhecida (útil fora do HTTP, ex.: testes do núcleo).
    pub fn existing(id: impl Into<String>) -> Self {
        SessionId {
            id: id.into(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            is_new: false,
        }
    }

    /// Abre uma sessão nova com identificador aleatório.
    pub fn fresh(cookie_name: impl Into<String>) -> Self {
        SessionId {
            id: Uuid::new_v4().to_string(),
            cookie_name: cookie_name.into(),
            is_new: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    fn cookie(&self) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone(), self.id.clone())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }

    /// Anexa o cookie de sessão à resposta quando a sessão acabou de ser criada.
    pub fn attach(&self, mut builder: HttpResponseBuilder) -> HttpResponseBuilder {
        if self.is_new {
            builder.cookie(self.cookie());
        }
        builder
    }

    /// Resposta de erro com o cookie de sessão, como nas respostas de sucesso.
    pub fn error_response(&self, erro: &dyn ResponseError) -> HttpResponse {
        let mut resposta = erro.error_response();
        if self.is_new {
            if let Err(e) = resposta.add_cookie(&self.cookie()) {
                tracing::warn!(error = %e, "Falha ao anexar cookie de sessão à resposta de erro");
            }
        }
        resposta
    }
}

/// Extrator de sessão para Actix Web.
/// Lê o cookie de sessão; se ele não existir (ou estiver vazio), inicia uma sessão nova.
impl FromRequest for SessionId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Acessa o AppState para obter o nome do cookie configurado
        let cookie_name = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.cookie_name.clone(),
            None => {
                tracing::warn!("AppState não disponível no extrator de sessão; usando cookie padrão");
                DEFAULT_COOKIE_NAME.to_string()
            }
        };

        let sessao = match req.cookie(&cookie_name) {
            Some(cookie) if !cookie.value().trim().is_empty() => SessionId {
                id: cookie.value().to_string(),
                cookie_name,
                is_new: false,
            },
            _ => SessionId::fresh(cookie_name),
        };

        ready(Ok(sessao))
    }
}
