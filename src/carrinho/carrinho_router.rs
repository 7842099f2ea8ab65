// src/carrinho/carrinho_router.rs

use actix_web::{delete, get, http::StatusCode, patch, post, web, HttpResponse, ResponseError};

// Importa o AppState do módulo raiz (lib.rs)
use crate::AppState;
use crate::shared::sessao::SessionId;
use crate::shared::shared_structs::GenericResponse;

use super::carrinho_store::CartError;
use super::carrinho_structs::{AddItemRequest, UpdateItemRequest, MAX_LINE_QUANTITY};

impl ResponseError for CartError {
    fn status_code(&self) -> StatusCode {
        match self {
            CartError::InvalidQuantity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(GenericResponse::<()>::error(format!(
                "A quantidade de cada item deve ficar entre 1 e {}.",
                MAX_LINE_QUANTITY
            )))
    }
}

/// Rota para visualizar o conteúdo atual do carrinho.
#[get("/carrinho")]
pub async fn ver_carrinho(data: web::Data<AppState>, sessao: SessionId) -> HttpResponse {
    let cart = data.carrinhos.get_cart(&sessao);

    sessao
        .attach(HttpResponse::Ok())
        .json(GenericResponse::success("Conteúdo do carrinho", cart))
}

/// Rota para adicionar um produto ao carrinho.
/// Recebe a quantidade e a personalização (opcional) no corpo da requisição.
#[post("/carrinho/adicionar/{produto_id}")]
pub async fn adicionar_item(
    data: web::Data<AppState>,
    sessao: SessionId,
    path: web::Path<i32>,
    item: web::Json<AddItemRequest>,
) -> HttpResponse {
    let produto_id = path.into_inner();

    // Verifica se o produto existe no catálogo
    let produto = match data.catalogo.get(produto_id).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return sessao.attach(HttpResponse::NotFound()).json(GenericResponse::<()>::error(format!(
                "Produto com ID {} não encontrado para adicionar ao carrinho.",
                produto_id
            )));
        }
        Err(e) => {
            tracing::error!(error = %e, produto_id, "Erro ao verificar produto para adicionar ao carrinho");
            return sessao
                .attach(HttpResponse::InternalServerError())
                .json(GenericResponse::<()>::error("Erro interno ao verificar produto"));
        }
    };

    let AddItemRequest { quantity, customization } = item.into_inner();
    match data.carrinhos.add_item(&sessao, &produto, quantity, customization) {
        Ok(cart) => sessao.attach(HttpResponse::Ok()).json(GenericResponse::success(
            format!("{} adicionado ao seu carrinho!", produto.name),
            cart,
        )),
        Err(e) => sessao.error_response(&e),
    }
}

/// Rota para alterar a quantidade de um item (pela posição no carrinho).
#[patch("/carrinho/atualizar/{index}")]
pub async fn atualizar_item(
    data: web::Data<AppState>,
    sessao: SessionId,
    path: web::Path<usize>,
    item: web::Json<UpdateItemRequest>,
) -> HttpResponse {
    match data
        .carrinhos
        .update_item_quantity(&sessao, path.into_inner(), item.quantity)
    {
        Ok(cart) => sessao
            .attach(HttpResponse::Ok())
            .json(GenericResponse::success("Carrinho atualizado com sucesso!", cart)),
        Err(e) => sessao.error_response(&e),
    }
}

/// Rota para remover um item do carrinho (pela posição).
#[delete("/carrinho/remover/{index}")]
pub async fn remover_item(
    data: web::Data<AppState>,
    sessao: SessionId,
    path: web::Path<usize>,
) -> HttpResponse {
    let cart = data.carrinhos.remove_item(&sessao, path.into_inner());

    sessao
        .attach(HttpResponse::Ok())
        .json(GenericResponse::success("Item removido do carrinho!", cart))
}

/// Rota para esvaziar o carrinho.
#[delete("/carrinho/limpar")]
pub async fn limpar_carrinho(data: web::Data<AppState>, sessao: SessionId) -> HttpResponse {
    let cart = data.carrinhos.clear(&sessao);

    sessao
        .attach(HttpResponse::Ok())
        .json(GenericResponse::success("Carrinho esvaziado!", cart))
}
