// src/produtos/produtos_router.rs

use actix_web::{get, web, HttpResponse};

// Importa o envelope padrão das respostas
use crate::shared::shared_structs::GenericResponse;
// Importa o AppState do módulo raiz (lib.rs)
use crate::AppState;

/// Rota para listar todos os produtos do catálogo.
#[get("/produtos")]
pub async fn buscar_produtos(data: web::Data<AppState>) -> HttpResponse {
    match data.catalogo.list().await {
        Ok(produtos) => HttpResponse::Ok().json(GenericResponse::success(
            "Produtos listados com sucesso!",
            produtos,
        )),
        Err(e) => {
            tracing::error!(error = %e, "Erro ao buscar produtos");
            HttpResponse::InternalServerError()
                .json(GenericResponse::<()>::error("Erro ao buscar produtos"))
        }
    }
}

/// Rota para listar os produtos em destaque (vitrine da página inicial).
///
/// Registrada antes de `/produtos/{id}` para que "destaques" não seja lido como id.
#[get("/produtos/destaques")]
pub async fn buscar_destaques(data: web::Data<AppState>) -> HttpResponse {
    match data.catalogo.featured().await {
        Ok(produtos) => HttpResponse::Ok().json(GenericResponse::success(
            "Produtos em destaque",
            produtos,
        )),
        Err(e) => {
            tracing::error!(error = %e, "Erro ao buscar produtos em destaque");
            HttpResponse::InternalServerError()
                .json(GenericResponse::<()>::error("Erro ao buscar produtos"))
        }
    }
}

/// Rota para buscar um produto por ID.
#[get("/produtos/{id}")]
pub async fn buscar_produto_por_id(
    data: web::Data<AppState>,
    path: web::Path<i32>,
) -> HttpResponse {
    let id = path.into_inner();

    match data.catalogo.get(id).await {
        Ok(Some(produto)) => HttpResponse::Ok().json(GenericResponse::success(
            format!("Produto com ID {} encontrado.", id),
            produto,
        )),
        Ok(None) => HttpResponse::NotFound().json(GenericResponse::<()>::error(format!(
            "Produto com ID {} não encontrado.",
            id
        ))),
        Err(e) => {
            tracing::error!(error = %e, id, "Erro ao buscar produto por ID");
            HttpResponse::InternalServerError()
                .json(GenericResponse::<()>::error("Erro ao buscar produto"))
        }
    }
}
