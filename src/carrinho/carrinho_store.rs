// src/carrinho/carrinho_store.rs

use std::sync::Arc;

use crate::produtos::produtos_structs::Product;
use crate::shared::sessao::SessionId;

use super::carrinho_structs::{Cart, MAX_LINE_QUANTITY};
use super::sessao_store::SessionStore;

/// Erros das operações do carrinho.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantidade inválida: {0} (cada item aceita de 1 a {max} unidades)", max = MAX_LINE_QUANTITY)]
    InvalidQuantity(i32),
}

/// Operações sobre o carrinho de uma sessão.
///
/// Cada chamada carrega o carrinho da sessão no início e, se houve mudança,
/// grava de volta no fim. Nenhum estado fica guardado aqui entre chamadas.
pub struct CartStore {
    sessoes: Arc<dyn SessionStore>,
}

impl CartStore {
    pub fn new(sessoes: Arc<dyn SessionStore>) -> Self {
        CartStore { sessoes }
    }

    /// Carrinho atual da sessão, ou um carrinho vazio. Nunca falha.
    pub fn get_cart(&self, sessao: &SessionId) -> Cart {
        let Some(blob) = self.sessoes.load(sessao.as_str()) else {
            return Cart::default();
        };

        match serde_json::from_str::<Cart>(&blob) {
            Ok(mut cart) => {
                cart.recompute();
                cart
            }
            Err(e) => {
                tracing::warn!(error = %e, "Carrinho ilegível na sessão; usando carrinho vazio");
                Cart::default()
            }
        }
    }

    /// Adiciona um produto ao carrinho, somando ao item com mesma personalização.
    pub fn add_item(
        &self,
        sessao: &SessionId,
        product: &Product,
        quantity: i32,
        customization: Option<String>,
    ) -> Result<Cart, CartError> {
        // Espaços nas pontas não contam; personalização em branco vale como "sem personalização"
        let customization = customization
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut cart = self.get_cart(sessao);
        cart.add(product, quantity, customization)?;
        self.persist(sessao, &cart);

        tracing::debug!(product_id = product.id, quantity, "Item adicionado ao carrinho");
        Ok(cart)
    }

    /// Altera a quantidade do item na posição `index`. Posição inexistente não muda nada;
    /// quantidade <= 0 remove o item.
    pub fn update_item_quantity(
        &self,
        sessao: &SessionId,
        index: usize,
        quantity: i32,
    ) -> Result<Cart, CartError> {
        let mut cart = self.get_cart(sessao);
        if cart.set_quantity(index, quantity)? {
            self.persist(sessao, &cart);
        }
        Ok(cart)
    }

    /// Remove o item na posição `index`, se existir.
    pub fn remove_item(&self, sessao: &SessionId, index: usize) -> Cart {
        let mut cart = self.get_cart(sessao);
        if cart.remove(index) {
            self.persist(sessao, &cart);
        }
        cart
    }

    /// Esvazia o carrinho da sessão.
    pub fn clear(&self, sessao: &SessionId) -> Cart {
        self.sessoes.forget(sessao.as_str());
        Cart::default()
    }

    fn persist(&self, sessao: &SessionId, cart: &Cart) {
        match serde_json::to_string(cart) {
            Ok(blob) => self.sessoes.save(sessao.as_str(), blob),
            Err(e) => tracing::error!(error = %e, "Erro ao serializar carrinho para a sessão"),
        }
    }
}
