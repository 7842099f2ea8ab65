// src/checkout/checkout_router.rs

use actix_web::{get, http::StatusCode, post, web, HttpResponse, ResponseError};

// Importa o AppState do módulo raiz (lib.rs)
use crate::AppState;
use crate::shared::sessao::SessionId;
use crate::shared::shared_structs::GenericResponse;

use super::checkout_processor::CheckoutError;
use super::checkout_structs::CheckoutForm;

impl ResponseError for CheckoutError {
    fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
            CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CheckoutError::NotFound(_) => StatusCode::NOT_FOUND,
            CheckoutError::Processing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut resposta = HttpResponse::build(self.status_code());
        match self {
            // Devolve a lista de campos inválidos para o formulário
            CheckoutError::Validation(erros) => {
                resposta.json(GenericResponse::error_with(self.to_string(), erros))
            }
            _ => resposta.json(GenericResponse::<()>::error(self.to_string())),
        }
    }
}

/// Rota que abre o checkout: devolve o carrinho para revisão, ou erro se estiver vazio.
#[get("/checkout")]
pub async fn iniciar_checkout(
    data: web::Data<AppState>,
    sessao: SessionId,
) -> HttpResponse {
    match data.checkout.begin_checkout(&sessao) {
        Ok(cart) => sessao
            .attach(HttpResponse::Ok())
            .json(GenericResponse::success("Revise seu pedido", cart)),
        Err(e) => sessao.error_response(&e),
    }
}

/// Rota para finalizar o pedido.
///
/// Recebe os dados de entrega e pagamento; em caso de sucesso o carrinho é esvaziado
/// e o número do pedido é devolvido.
#[post("/checkout/processar")]
pub async fn processar_checkout(
    data: web::Data<AppState>,
    sessao: SessionId,
    form: web::Json<CheckoutForm>,
) -> HttpResponse {
    match data.checkout.place_order(&sessao, &form).await {
        Ok(pedido) => sessao.attach(HttpResponse::Ok()).json(GenericResponse::success(
            format!("Pedido {} realizado com sucesso!", pedido.order_number),
            pedido,
        )),
        Err(e) => sessao.error_response(&e),
    }
}

/// Rota de confirmação: pedido e itens pelo número do pedido.
#[get("/checkout/confirmacao/{numero}")]
pub async fn confirmacao(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, CheckoutError> {
    let numero = path.into_inner();
    let confirmacao = data.checkout.get_confirmation(&numero).await?;

    Ok(HttpResponse::Ok().json(GenericResponse::success(
        format!("Pedido {} confirmado.", numero),
        confirmacao,
    )))
}
