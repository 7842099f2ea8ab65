// src/checkout/pedidos_repo.rs

use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::checkout_structs::{
    NewOrder, NewOrderItem, Order, OrderConfirmation, OrderItem, OrderStatus, PaymentStatus, UnknownVariant,
};

/// Erros do repositório de pedidos.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),

    #[error("número de pedido já existe: {0}")]
    DuplicateOrderNumber(String),

    #[error("registro de pedido inválido: {0}")]
    Corrupt(#[from] UnknownVariant),

    #[error("armazenamento indisponível: {0}")]
    Unavailable(String),
}

/// Destino dos pedidos: abre transações de gravação e consulta pedidos fechados.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StoreError>;

    async fn find_by_number(&self, order_number: &str) -> Result<Option<OrderConfirmation>, StoreError>;
}

/// Unidade atômica de gravação de um pedido.
///
/// Nada do que for gravado aqui fica visível antes do `commit`. Uma transação
/// descartada sem `commit` equivale a `rollback`.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Grava o pedido (status e pagamento pendentes) e devolve seu id.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<i64, StoreError>;

    async fn insert_item(&mut self, item: &NewOrderItem) -> Result<(), StoreError>;

    /// Marca o pagamento como aprovado com o id de transação informado.
    async fn mark_paid(&mut self, order_id: i64, transaction_id: &str) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// Pedidos gravados nas tabelas 'orders' e 'order_items' do PostgreSQL.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        PgOrderStore { pool }
    }
}

struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

/// Linha da tabela 'orders' antes da conversão dos campos de texto em enums.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    status: String,
    subtotal: BigDecimal,
    tax: BigDecimal,
    total: BigDecimal,
    customer_name: String,
    customer_email: String,
    customer_phone: Option<String>,
    delivery_address: String,
    delivery_date: NaiveDate,
    delivery_time: String,
    special_instructions: Option<String>,
    payment_method: String,
    payment_status: String,
    transaction_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = UnknownVariant;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            status: row.status.parse()?,
            subtotal: row.subtotal,
            tax: row.tax,
            total: row.total,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            delivery_address: row.delivery_address,
            delivery_date: row.delivery_date,
            delivery_time: row.delivery_time,
            special_instructions: row.special_instructions,
            payment_method: row.payment_method.parse()?,
            payment_status: row.payment_status.parse()?,
            transaction_id: row.transaction_id,
            created_at: row.created_at,
        })
    }
}

// 23505 = unique_violation; a única restrição única em 'orders' é o número do pedido
fn map_insert_error(e: sqlx::Error, order_number: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return StoreError::DuplicateOrderNumber(order_number.to_string());
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgOrderTransaction { tx }))
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<OrderConfirmation>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_number, status, subtotal, tax, total, customer_name, customer_email, \
             customer_phone, delivery_address, delivery_date, delivery_time, special_instructions, \
             payment_method, payment_status, transaction_id, created_at \
             FROM orders WHERE order_number = $1",
        )
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = Order::try_from(row)?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, quantity, unit_price, line_subtotal, customization \
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderConfirmation { order, items }))
    }
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<i64, StoreError> {
        let detalhes = &order.details;
        let row = sqlx::query(
            "INSERT INTO orders (order_number, status, subtotal, tax, total, customer_name, customer_email, \
             customer_phone, delivery_address, delivery_date, delivery_time, special_instructions, \
             payment_method, payment_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING id",
        )
        .bind(&order.order_number)
        .bind(OrderStatus::Pending.as_str())
        .bind(&order.subtotal)
        .bind(&order.tax)
        .bind(&order.total)
        .bind(&detalhes.customer_name)
        .bind(&detalhes.customer_email)
        .bind(&detalhes.customer_phone)
        .bind(&detalhes.delivery_address)
        .bind(detalhes.delivery_date)
        .bind(&detalhes.delivery_time)
        .bind(&detalhes.special_instructions)
        .bind(detalhes.payment_method.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_insert_error(e, &order.order_number))?;

        Ok(row.try_get::<i64, _>("id")?)
    }

    async fn insert_item(&mut self, item: &NewOrderItem) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, line_subtotal, customization) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(&item.unit_price)
        .bind(&item.line_subtotal)
        .bind(&item.customization)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn mark_paid(&mut self, order_id: i64, transaction_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = $1, transaction_id = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(PaymentStatus::Paid.as_str())
        .bind(transaction_id)
        .bind(order_id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Unavailable(format!("pedido {} sumiu da transação", order_id)));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Memória
// ---------------------------------------------------------------------------

/// Ponto em que o repositório em memória deve falhar de propósito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Falha ao gravar o item de índice n (0 = primeiro item).
    ItemInsert(usize),
    MarkPaid,
    Commit,
}

#[derive(Default)]
struct MemoryState {
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    next_order_id: i64,
    next_item_id: i64,
}

impl MemoryState {
    fn number_taken(&self, order_number: &str) -> bool {
        self.orders.iter().any(|o| o.order_number == order_number)
    }
}

/// Pedidos mantidos em memória, usado no modo sem banco e nos testes.
#[derive(Default)]
pub struct MemoryOrderStore {
    state: Arc<Mutex<MemoryState>>,
    failure: Option<FailurePoint>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repositório que falha sempre no ponto indicado.
    pub fn failing_at(failure: FailurePoint) -> Self {
        MemoryOrderStore {
            state: Arc::default(),
            failure: Some(failure),
        }
    }

    /// Quantidade de pedidos confirmados.
    pub fn order_count(&self) -> usize {
        self.state.lock().orders.len()
    }

    /// Quantidade de itens de pedidos confirmados.
    pub fn item_count(&self) -> usize {
        self.state.lock().items.len()
    }
}

struct MemoryOrderTransaction {
    state: Arc<Mutex<MemoryState>>,
    failure: Option<FailurePoint>,
    order: Option<Order>,
    items: Vec<OrderItem>,
}

impl MemoryOrderTransaction {
    fn fail_if(&self, ponto: FailurePoint) -> Result<(), StoreError> {
        if self.failure == Some(ponto) {
            return Err(StoreError::Unavailable(format!("falha simulada em {:?}", ponto)));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, StoreError> {
        Ok(Box::new(MemoryOrderTransaction {
            state: Arc::clone(&self.state),
            failure: self.failure,
            order: None,
            items: Vec::new(),
        }))
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<OrderConfirmation>, StoreError> {
        let state = self.state.lock();
        let Some(order) = state.orders.iter().find(|o| o.order_number == order_number) else {
            return Ok(None);
        };

        let items = state
            .items
            .iter()
            .filter(|i| i.order_id == order.id)
            .cloned()
            .collect();

        Ok(Some(OrderConfirmation {
            order: order.clone(),
            items,
        }))
    }
}

#[async_trait]
impl OrderTransaction for MemoryOrderTransaction {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<i64, StoreError> {
        let id = {
            let mut state = self.state.lock();
            if state.number_taken(&order.order_number) {
                return Err(StoreError::DuplicateOrderNumber(order.order_number.clone()));
            }
            // Como uma sequence: ids consumidos não voltam em caso de rollback
            state.next_order_id += 1;
            state.next_order_id
        };

        let detalhes = order.details.clone();
        self.order = Some(Order {
            id,
            order_number: order.order_number.clone(),
            status: OrderStatus::Pending,
            subtotal: order.subtotal.clone(),
            tax: order.tax.clone(),
            total: order.total.clone(),
            customer_name: detalhes.customer_name,
            customer_email: detalhes.customer_email,
            customer_phone: detalhes.customer_phone,
            delivery_address: detalhes.delivery_address,
            delivery_date: detalhes.delivery_date,
            delivery_time: detalhes.delivery_time,
            special_instructions: detalhes.special_instructions,
            payment_method: detalhes.payment_method,
            payment_status: PaymentStatus::Pending,
            transaction_id: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_item(&mut self, item: &NewOrderItem) -> Result<(), StoreError> {
        self.fail_if(FailurePoint::ItemInsert(self.items.len()))?;

        match &self.order {
            Some(order) if order.id == item.order_id => {}
            _ => {
                return Err(StoreError::Unavailable(format!(
                    "pedido {} não existe nesta transação",
                    item.order_id
                )))
            }
        }

        let id = {
            let mut state = self.state.lock();
            state.next_item_id += 1;
            state.next_item_id
        };

        self.items.push(OrderItem {
            id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            line_subtotal: item.line_subtotal.clone(),
            customization: item.customization.clone(),
        });
        Ok(())
    }

    async fn mark_paid(&mut self, order_id: i64, transaction_id: &str) -> Result<(), StoreError> {
        self.fail_if(FailurePoint::MarkPaid)?;

        match self.order.as_mut() {
            Some(order) if order.id == order_id => {
                order.payment_status = PaymentStatus::Paid;
                order.transaction_id = Some(transaction_id.to_string());
                Ok(())
            }
            _ => Err(StoreError::Unavailable(format!("pedido {} sumiu da transação", order_id))),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.fail_if(FailurePoint::Commit)?;

        let MemoryOrderTransaction { state, order, items, .. } = *self;
        let Some(order) = order else {
            return Ok(());
        };

        let mut state = state.lock();
        if state.number_taken(&order.order_number) {
            return Err(StoreError::DuplicateOrderNumber(order.order_number));
        }
        state.orders.push(order);
        state.items.extend(items);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
