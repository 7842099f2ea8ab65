// src/checkout/checkout_processor.rs

use std::sync::Arc;

use chrono::Local;
use uuid::Uuid;

use crate::carrinho::carrinho_store::CartStore;
use crate::carrinho::carrinho_structs::Cart;
use crate::shared::sessao::SessionId;

use super::checkout_structs::{
    CheckoutDetails, CheckoutForm, FieldError, NewOrder, NewOrderItem, OrderConfirmation, PlacedOrder,
};
use super::checkout_validacao::validate_checkout;
use super::numero_pedido::OrderNumberSource;
use super::pedidos_repo::{OrderStore, OrderTransaction, StoreError};

/// Quantas vezes um número de pedido repetido é gerado de novo antes de desistir.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 5;

/// Erros do checkout. As mensagens são as que o cliente vê.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Seu carrinho está vazio!")]
    EmptyCart,

    #[error("Verifique os dados do formulário.")]
    Validation(Vec<FieldError>),

    #[error("Pedido {0} não encontrado.")]
    NotFound(String),

    // O detalhe da falha fica só no log
    #[error("Ocorreu um erro ao processar seu pedido. Tente novamente.")]
    Processing,
}

/// Converte o carrinho de uma sessão em pedido gravado.
pub struct CheckoutProcessor {
    carrinhos: Arc<CartStore>,
    pedidos: Arc<dyn OrderStore>,
    numeros: Arc<dyn OrderNumberSource>,
}

impl CheckoutProcessor {
    pub fn new(
        carrinhos: Arc<CartStore>,
        pedidos: Arc<dyn OrderStore>,
        numeros: Arc<dyn OrderNumberSource>,
    ) -> Self {
        CheckoutProcessor {
            carrinhos,
            pedidos,
            numeros,
        }
    }

    /// Abre o checkout: só segue se o carrinho tiver itens.
    pub fn begin_checkout(&self, sessao: &SessionId) -> Result<Cart, CheckoutError> {
        let cart = self.carrinhos.get_cart(sessao);
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(cart)
    }

    /// Fecha o pedido.
    ///
    /// Passos:
    /// 1. Confere de novo se o carrinho não está vazio.
    /// 2. Valida o formulário (todos os campos de uma vez).
    /// 3. Gera o número do pedido.
    /// 4. Numa transação: grava o pedido, os itens e o pagamento simulado.
    /// 5. Comita, esvazia o carrinho e devolve o número.
    ///
    /// Qualquer falha de gravação desfaz a transação e mantém o carrinho como estava.
    pub async fn place_order(&self, sessao: &SessionId, form: &CheckoutForm) -> Result<PlacedOrder, CheckoutError> {
        let cart = self.carrinhos.get_cart(sessao);
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let detalhes = validate_checkout(form, Local::now().date_naive()).map_err(CheckoutError::Validation)?;

        for tentativa in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = self.numeros.next_number();

            match self.persist(&cart, &detalhes, &order_number).await {
                Ok(()) => {
                    self.carrinhos.clear(sessao);
                    tracing::info!(
                        order_number = %order_number,
                        items = cart.items().len(),
                        total = %cart.total(),
                        "Pedido realizado com sucesso"
                    );
                    return Ok(PlacedOrder { order_number });
                }
                Err(StoreError::DuplicateOrderNumber(numero)) => {
                    tracing::warn!(
                        order_number = %numero,
                        tentativa,
                        "Número de pedido já existe; gerando outro"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, order_number = %order_number, "Erro ao gravar pedido");
                    return Err(CheckoutError::Processing);
                }
            }
        }

        tracing::error!(
            tentativas = MAX_ORDER_NUMBER_ATTEMPTS,
            "Não foi possível gerar um número de pedido único"
        );
        Err(CheckoutError::Processing)
    }

    /// Pedido com seus itens, pelo número.
    pub async fn get_confirmation(&self, order_number: &str) -> Result<OrderConfirmation, CheckoutError> {
        match self.pedidos.find_by_number(order_number).await {
            Ok(Some(confirmacao)) => Ok(confirmacao),
            Ok(None) => Err(CheckoutError::NotFound(order_number.to_string())),
            Err(e) => {
                tracing::error!(error = %e, order_number, "Erro ao buscar pedido");
                Err(CheckoutError::Processing)
            }
        }
    }

    // Abre a transação, grava tudo e comita; em qualquer erro faz rollback.
    async fn persist(&self, cart: &Cart, detalhes: &CheckoutDetails, order_number: &str) -> Result<(), StoreError> {
        let mut tx = self.pedidos.begin().await?;

        match write_order(tx.as_mut(), cart, detalhes, order_number).await {
            Ok(()) => tx.commit().await,
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    tracing::warn!(error = %rb, "Erro ao desfazer transação do pedido");
                }
                Err(e)
            }
        }
    }
}

async fn write_order(
    tx: &mut dyn OrderTransaction,
    cart: &Cart,
    detalhes: &CheckoutDetails,
    order_number: &str,
) -> Result<(), StoreError> {
    let order_id = tx
        .insert_order(&NewOrder {
            order_number: order_number.to_string(),
            subtotal: cart.subtotal().clone(),
            tax: cart.tax().clone(),
            total: cart.total().clone(),
            details: detalhes.clone(),
        })
        .await?;

    for linha in cart.items() {
        tx.insert_item(&NewOrderItem {
            order_id,
            product_id: linha.product_id,
            quantity: linha.quantity,
            unit_price: linha.unit_price.clone(),
            line_subtotal: linha.line_subtotal.clone(),
            customization: linha.customization.clone(),
        })
        .await?;
    }

    // Pagamento simulado: sempre aprovado
    let transaction_id = format!("SIMULADO_{}", Uuid::new_v4().simple());
    tx.mark_paid(order_id, &transaction_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrinho::sessao_store::MemorySessionStore;
    use crate::checkout::checkout_structs::{OrderStatus, PaymentMethod, PaymentStatus};
    use crate::checkout::numero_pedido::TimestampOrderNumbers;
    use crate::checkout::pedidos_repo::{FailurePoint, MemoryOrderStore};
    use crate::produtos::produtos_structs::Product;
    use bigdecimal::BigDecimal;
    use chrono::Duration;
    use parking_lot::Mutex;
    use std::str::FromStr;

    /// Devolve números pré-definidos, em ordem.
    struct ScriptedNumbers(Mutex<Vec<&'static str>>);

    impl ScriptedNumbers {
        fn new(numeros: &[&'static str]) -> Self {
            let mut v = numeros.to_vec();
            v.reverse();
            ScriptedNumbers(Mutex::new(v))
        }
    }

    impl OrderNumberSource for ScriptedNumbers {
        fn next_number(&self) -> String {
            self.0.lock().pop().unwrap_or("SD-FIM").to_string()
        }
    }

    struct Cenario {
        carrinhos: Arc<CartStore>,
        pedidos: Arc<MemoryOrderStore>,
        checkout: CheckoutProcessor,
        sessao: SessionId,
    }

    fn cenario_com(pedidos: MemoryOrderStore, numeros: Arc<dyn OrderNumberSource>) -> Cenario {
        let carrinhos = Arc::new(CartStore::new(Arc::new(MemorySessionStore::new())));
        let pedidos = Arc::new(pedidos);
        let checkout = CheckoutProcessor::new(carrinhos.clone(), pedidos.clone(), numeros);
        Cenario {
            carrinhos,
            pedidos,
            checkout,
            sessao: SessionId::existing("sessao-teste"),
        }
    }

    fn cenario(pedidos: MemoryOrderStore) -> Cenario {
        cenario_com(pedidos, Arc::new(TimestampOrderNumbers))
    }

    fn produto(id: i32, preco: &str) -> Product {
        Product {
            id,
            name: format!("Bolo {}", id),
            description: String::new(),
            price: BigDecimal::from_str(preco).unwrap(),
            image: String::new(),
            is_featured: false,
        }
    }

    fn form_valido() -> CheckoutForm {
        let entrega = Local::now().date_naive() + Duration::days(2);
        CheckoutForm {
            customer_name: Some("Ana Souza".to_string()),
            customer_email: Some("ana@example.com".to_string()),
            customer_phone: None,
            delivery_address: Some("Rua das Flores, 10".to_string()),
            delivery_date: Some(entrega.format("%Y-%m-%d").to_string()),
            delivery_time: Some("9:00 AM - 12:00 PM".to_string()),
            special_instructions: Some("Sem nozes".to_string()),
            payment_method: Some("cash_on_delivery".to_string()),
        }
    }

    fn encher_carrinho(c: &Cenario) -> Cart {
        c.carrinhos.add_item(&c.sessao, &produto(1, "50.00"), 2, None).unwrap();
        c.carrinhos
            .add_item(&c.sessao, &produto(2, "12.50"), 1, Some("Feliz aniversário".to_string()))
            .unwrap()
    }

    #[test]
    fn begin_checkout_rejects_empty_cart() {
        let c = cenario(MemoryOrderStore::new());
        assert!(matches!(c.checkout.begin_checkout(&c.sessao), Err(CheckoutError::EmptyCart)));

        let cart = encher_carrinho(&c);
        assert_eq!(c.checkout.begin_checkout(&c.sessao).unwrap(), cart);
    }

    #[actix_web::test]
    async fn empty_cart_creates_no_order() {
        let c = cenario(MemoryOrderStore::new());

        let err = c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(c.pedidos.order_count(), 0);
    }

    #[actix_web::test]
    async fn invalid_form_lists_fields_and_keeps_cart() {
        let c = cenario(MemoryOrderStore::new());
        let cart = encher_carrinho(&c);

        let mut form = form_valido();
        form.customer_email = Some("invalido".to_string());
        form.payment_method = None;

        match c.checkout.place_order(&c.sessao, &form).await {
            Err(CheckoutError::Validation(erros)) => {
                let campos: Vec<_> = erros.iter().map(|e| e.field).collect();
                assert_eq!(campos, vec!["customer_email", "payment_method"]);
            }
            outro => panic!("esperava erro de validação, veio {:?}", outro),
        }
        assert_eq!(c.pedidos.order_count(), 0);
        assert_eq!(c.carrinhos.get_cart(&c.sessao), cart);
    }

    #[actix_web::test]
    async fn successful_order_persists_everything_and_clears_cart() {
        let c = cenario(MemoryOrderStore::new());
        let cart = encher_carrinho(&c);

        let placed = c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap();

        assert_eq!(c.pedidos.order_count(), 1);
        assert_eq!(c.pedidos.item_count(), cart.items().len());
        assert!(c.carrinhos.get_cart(&c.sessao).is_empty());

        let confirmacao = c.checkout.get_confirmation(&placed.order_number).await.unwrap();
        let pedido = &confirmacao.order;
        assert_eq!(pedido.status, OrderStatus::Pending);
        assert_eq!(pedido.payment_status, PaymentStatus::Paid);
        assert_eq!(pedido.payment_method, PaymentMethod::CashOnDelivery);
        assert!(pedido.transaction_id.as_deref().unwrap().starts_with("SIMULADO_"));
        assert_eq!(&pedido.subtotal, cart.subtotal());
        assert_eq!(&pedido.tax, cart.tax());
        assert_eq!(&pedido.total, cart.total());
        assert_eq!(pedido.special_instructions.as_deref(), Some("Sem nozes"));

        assert_eq!(confirmacao.items.len(), 2);
        assert!(confirmacao.items.iter().all(|i| i.order_id == pedido.id));
        assert_eq!(confirmacao.items[1].customization.as_deref(), Some("Feliz aniversário"));
        assert_eq!(confirmacao.items[0].line_subtotal, BigDecimal::from(100));
    }

    #[actix_web::test]
    async fn item_failure_rolls_back_and_keeps_cart() {
        let c = cenario(MemoryOrderStore::failing_at(FailurePoint::ItemInsert(1)));
        let cart = encher_carrinho(&c);

        let err = c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Processing));
        assert_eq!(c.pedidos.order_count(), 0);
        assert_eq!(c.pedidos.item_count(), 0);
        assert_eq!(c.carrinhos.get_cart(&c.sessao), cart);
    }

    #[actix_web::test]
    async fn payment_failure_rolls_back() {
        let c = cenario(MemoryOrderStore::failing_at(FailurePoint::MarkPaid));
        let cart = encher_carrinho(&c);

        assert!(matches!(
            c.checkout.place_order(&c.sessao, &form_valido()).await,
            Err(CheckoutError::Processing)
        ));
        assert_eq!(c.pedidos.order_count(), 0);
        assert_eq!(c.carrinhos.get_cart(&c.sessao), cart);
    }

    #[actix_web::test]
    async fn processing_error_hides_internal_detail() {
        let c = cenario(MemoryOrderStore::failing_at(FailurePoint::Commit));
        encher_carrinho(&c);

        let err = c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap_err();
        let mensagem = err.to_string();
        assert!(!mensagem.contains("simulada"));
        assert!(mensagem.contains("Tente novamente"));
    }

    #[actix_web::test]
    async fn duplicate_order_number_is_regenerated() {
        let c = cenario_com(
            MemoryOrderStore::new(),
            Arc::new(ScriptedNumbers::new(&["SD100", "SD100", "SD200"])),
        );

        encher_carrinho(&c);
        let primeiro = c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap();
        assert_eq!(primeiro.order_number, "SD100");

        encher_carrinho(&c);
        let segundo = c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap();
        assert_eq!(segundo.order_number, "SD200");
        assert_eq!(c.pedidos.order_count(), 2);
    }

    #[actix_web::test]
    async fn gives_up_after_repeated_conflicts() {
        let c = cenario_com(MemoryOrderStore::new(), Arc::new(ScriptedNumbers::new(&["SD1"])));
        encher_carrinho(&c);
        c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap();

        // Daqui em diante todo número gerado é "SD-FIM", que passa a existir após o primeiro uso
        encher_carrinho(&c);
        c.checkout.place_order(&c.sessao, &form_valido()).await.unwrap();

        let cart = encher_carrinho(&c);
        assert!(matches!(
            c.checkout.place_order(&c.sessao, &form_valido()).await,
            Err(CheckoutError::Processing)
        ));
        assert_eq!(c.pedidos.order_count(), 2);
        assert_eq!(c.carrinhos.get_cart(&c.sessao), cart);
    }

    #[actix_web::test]
    async fn unknown_order_number_is_not_found() {
        let c = cenario(MemoryOrderStore::new());
        assert!(matches!(
            c.checkout.get_confirmation("SD000").await,
            Err(CheckoutError::NotFound(n)) if n == "SD000"
        ));
    }
}
