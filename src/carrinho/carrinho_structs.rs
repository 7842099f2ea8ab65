// src/carrinho/carrinho_structs.rs

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::produtos::produtos_structs::Product;

use super::carrinho_store::CartError;

/// Alíquota fixa de imposto sobre o subtotal, em pontos percentuais (8%).
pub const TAX_PERCENT: i32 = 8;

/// Maior quantidade aceita em um único item do carrinho.
pub const MAX_LINE_QUANTITY: i32 = 999;

/// Um item do carrinho: um produto, com uma personalização, numa quantidade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: i32,
    pub name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub customization: Option<String>,
    pub image: String,
    pub line_subtotal: BigDecimal,
}

impl LineItem {
    fn key(&self) -> LineKey<'_> {
        LineKey {
            product_id: self.product_id,
            customization: self.customization.as_deref(),
        }
    }

    fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
        self.line_subtotal = &self.unit_price * BigDecimal::from(quantity);
    }
}

/// Chave de identidade de um item: (produto, personalização).
/// Personalização ausente só casa com personalização ausente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey<'a> {
    pub product_id: i32,
    pub customization: Option<&'a str>,
}

/// Estrutura para receber a adição de um produto ao carrinho.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub quantity: i32,
    #[serde(default)]
    pub customization: Option<String>,
}

/// Estrutura para receber a nova quantidade de um item do carrinho.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Estrutura para representar o carrinho de compras de uma sessão.
///
/// Os totais são sempre derivados dos itens: qualquer mutação refaz a soma completa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
    subtotal: BigDecimal,
    tax: BigDecimal,
    total: BigDecimal,
}

impl Default for Cart {
    fn default() -> Self {
        Cart {
            items: Vec::new(),
            subtotal: zero(),
            tax: zero(),
            total: zero(),
        }
    }
}

fn zero() -> BigDecimal {
    BigDecimal::from(0).with_scale(2)
}

fn check_quantity(quantity: i32) -> Result<(), CartError> {
    if (1..=MAX_LINE_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(CartError::InvalidQuantity(quantity))
    }
}

impl Cart {
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn subtotal(&self) -> &BigDecimal {
        &self.subtotal
    }

    pub fn tax(&self) -> &BigDecimal {
        &self.tax
    }

    pub fn total(&self) -> &BigDecimal {
        &self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Posição do item com a chave informada, se existir.
    pub fn find_line(&self, key: &LineKey<'_>) -> Option<usize> {
        self.items.iter().position(|item| item.key() == *key)
    }

    /// Adiciona `quantity` unidades do produto; soma no item existente com a mesma chave.
    /// Falha, sem alterar o carrinho, se a quantidade do item sair de 1..=MAX_LINE_QUANTITY.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: i32,
        customization: Option<String>,
    ) -> Result<(), CartError> {
        check_quantity(quantity)?;

        let key = LineKey {
            product_id: product.id,
            customization: customization.as_deref(),
        };

        match self.find_line(&key) {
            Some(index) => {
                let item = &mut self.items[index];
                let nova_quantidade = item
                    .quantity
                    .checked_add(quantity)
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or(CartError::InvalidQuantity(quantity))?;
                item.set_quantity(nova_quantidade);
            }
            None => self.items.push(LineItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price.clone(),
                quantity,
                customization,
                image: product.image.clone(),
                line_subtotal: &product.price * BigDecimal::from(quantity),
            }),
        }

        self.recompute();
        Ok(())
    }

    /// Define a quantidade do item na posição `index`. Quantidade <= 0 remove o item.
    /// Retorna Ok(false) se a posição não existir (nada muda).
    pub fn set_quantity(&mut self, index: usize, quantity: i32) -> Result<bool, CartError> {
        if quantity <= 0 {
            return Ok(self.remove(index));
        }
        check_quantity(quantity)?;

        match self.items.get_mut(index) {
            Some(item) => {
                item.set_quantity(quantity);
                self.recompute();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove o item na posição `index`; os seguintes sobem uma posição.
    /// Retorna false se a posição não existir.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        self.recompute();
        true
    }

    /// Refaz subtotal, imposto e total a partir de todos os itens.
    pub(crate) fn recompute(&mut self) {
        let subtotal = self
            .items
            .iter()
            .fold(zero(), |acc, item| acc + &item.line_subtotal);

        let tax = (subtotal.clone() * BigDecimal::from(TAX_PERCENT) / BigDecimal::from(100))
            .round(2)
            .with_scale(2);

        self.total = &subtotal + &tax;
        self.subtotal = subtotal;
        self.tax = tax;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn red_velvet() -> Product {
        Product {
            id: 1,
            name: "Red Velvet".to_string(),
            description: String::new(),
            price: dec("50.00"),
            image: "red velvet.jpg".to_string(),
            is_featured: false,
        }
    }

    fn brioche() -> Product {
        Product {
            id: 2,
            name: "Brioche".to_string(),
            description: String::new(),
            price: dec("7.35"),
            image: "Brioche.jpg".to_string(),
            is_featured: false,
        }
    }

    fn assert_totals_consistent(cart: &Cart) {
        let soma = cart
            .items()
            .iter()
            .fold(BigDecimal::from(0), |acc, i| acc + &i.line_subtotal);
        assert_eq!(cart.subtotal(), &soma);
        assert_eq!(cart.tax(), &(cart.subtotal() * dec("0.08")).round(2));
        assert_eq!(cart.total(), &(cart.subtotal() + cart.tax()));
        for item in cart.items() {
            assert_eq!(item.line_subtotal, &item.unit_price * BigDecimal::from(item.quantity));
        }
    }

    #[test]
    fn empty_cart_has_zero_totals() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), &BigDecimal::from(0));
        assert_eq!(cart.tax(), &BigDecimal::from(0));
        assert_eq!(cart.total(), &BigDecimal::from(0));
    }

    #[test]
    fn red_velvet_scenario() {
        let mut cart = Cart::default();

        cart.add(&red_velvet(), 2, None).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[0].line_subtotal, dec("100.00"));
        assert_eq!(cart.subtotal(), &dec("100.00"));
        assert_eq!(cart.tax(), &dec("8.00"));
        assert_eq!(cart.total(), &dec("108.00"));

        cart.add(&red_velvet(), 1, None).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.items()[0].line_subtotal, dec("150.00"));
        assert_eq!(cart.subtotal(), &dec("150.00"));
        assert_eq!(cart.tax(), &dec("12.00"));
        assert_eq!(cart.total(), &dec("162.00"));

        assert!(cart.remove(0));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), &BigDecimal::from(0));
    }

    #[test]
    fn same_customization_merges() {
        let mut cart = Cart::default();
        cart.add(&red_velvet(), 1, Some("Feliz aniversário".to_string())).unwrap();
        cart.add(&red_velvet(), 2, Some("Feliz aniversário".to_string())).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn different_customization_creates_new_line() {
        let mut cart = Cart::default();
        cart.add(&red_velvet(), 1, Some("Parabéns Ana".to_string())).unwrap();
        cart.add(&red_velvet(), 1, Some("Parabéns Bia".to_string())).unwrap();
        cart.add(&red_velvet(), 1, None).unwrap();

        assert_eq!(cart.items().len(), 3);
        assert_eq!(
            cart.find_line(&LineKey { product_id: 1, customization: None }),
            Some(2)
        );
        assert_eq!(
            cart.find_line(&LineKey { product_id: 1, customization: Some("Parabéns Bia") }),
            Some(1)
        );
        assert_totals_consistent(&cart);
    }

    #[test]
    fn set_quantity_zero_is_remove() {
        let mut a = Cart::default();
        a.add(&red_velvet(), 2, None).unwrap();
        a.add(&brioche(), 4, None).unwrap();
        let mut b = a.clone();

        assert!(a.set_quantity(0, 0).unwrap());
        assert!(b.remove(0));
        assert_eq!(a, b);
        assert_eq!(a.items()[0].product_id, 2);
    }

    #[test]
    fn unknown_index_is_noop() {
        let mut cart = Cart::default();
        cart.add(&brioche(), 1, None).unwrap();
        let antes = cart.clone();

        assert!(!cart.set_quantity(5, 3).unwrap());
        assert!(!cart.remove(5));
        assert!(!cart.set_quantity(5, 0).unwrap());
        assert_eq!(cart, antes);
    }

    #[test]
    fn tax_is_rounded_to_cents() {
        let mut cart = Cart::default();
        // 7.35 * 3 = 22.05 -> 8% = 1.764 -> 1.76
        cart.add(&brioche(), 3, None).unwrap();
        assert_eq!(cart.subtotal(), &dec("22.05"));
        assert_eq!(cart.tax(), &dec("1.76"));
        assert_eq!(cart.total(), &dec("23.81"));
    }

    #[test]
    fn quantity_past_line_limit_is_rejected() {
        let mut cart = Cart::default();
        cart.add(&red_velvet(), MAX_LINE_QUANTITY, None).unwrap();
        let antes = cart.clone();

        assert_eq!(cart.add(&red_velvet(), 1, None), Err(CartError::InvalidQuantity(1)));
        assert_eq!(
            cart.add(&red_velvet(), i32::MAX, None),
            Err(CartError::InvalidQuantity(i32::MAX))
        );
        assert_eq!(
            cart.add(&brioche(), MAX_LINE_QUANTITY + 1, None),
            Err(CartError::InvalidQuantity(MAX_LINE_QUANTITY + 1))
        );
        assert_eq!(cart.set_quantity(0, i32::MAX), Err(CartError::InvalidQuantity(i32::MAX)));
        assert_eq!(cart, antes);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add { brioche: bool, quantity: i32, customization: Option<u8> },
        Update { index: usize, quantity: i32 },
        Remove { index: usize },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<bool>(), 1..20i32, proptest::option::of(0..3u8)).prop_map(
                |(brioche, quantity, customization)| Op::Add { brioche, quantity, customization }
            ),
            (0..6usize, -2..20i32).prop_map(|(index, quantity)| Op::Update { index, quantity }),
            (0..6usize).prop_map(|index| Op::Remove { index }),
        ]
    }

    proptest! {
        #[test]
        fn prop_totals_never_drift(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut cart = Cart::default();
            for op in ops {
                match op {
                    Op::Add { brioche: b, quantity, customization } => {
                        let produto = if b { brioche() } else { red_velvet() };
                        let added = cart
                            .add(&produto, quantity, customization.map(|c| format!("texto {}", c)));
                        prop_assert!(added.is_ok());
                    }
                    Op::Update { index, quantity } => {
                        prop_assert!(cart.set_quantity(index, quantity).is_ok());
                    }
                    Op::Remove { index } => {
                        cart.remove(index);
                    }
                }
                assert_totals_consistent(&cart);
                prop_assert!(cart.items().iter().all(|i| i.quantity >= 1));
            }
        }
    }
}
