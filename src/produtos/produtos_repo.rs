// src/produtos/produtos_repo.rs

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{query_as, PgPool};

use super::produtos_structs::Product;

/// Erros ao consultar o catálogo.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("falha ao consultar produtos: {0}")]
    Database(#[from] sqlx::Error),
}

/// Consulta de produtos usada pelo carrinho e pelas rotas do catálogo.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Todos os produtos, ordenados por id.
    async fn list(&self) -> Result<Vec<Product>, CatalogError>;

    /// Somente os produtos em destaque.
    async fn featured(&self) -> Result<Vec<Product>, CatalogError>;

    /// Um produto pelo id, ou None se não existir.
    async fn get(&self, id: i32) -> Result<Option<Product>, CatalogError>;
}

/// Catálogo lido da tabela 'products' do PostgreSQL.
pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        PgProductCatalog { pool }
    }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        let produtos = query_as::<_, Product>(
            "SELECT id, name, description, price, image, is_featured FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(produtos)
    }

    async fn featured(&self) -> Result<Vec<Product>, CatalogError> {
        let produtos = query_as::<_, Product>(
            "SELECT id, name, description, price, image, is_featured FROM products WHERE is_featured ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(produtos)
    }

    async fn get(&self, id: i32) -> Result<Option<Product>, CatalogError> {
        let produto = query_as::<_, Product>(
            "SELECT id, name, description, price, image, is_featured FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(produto)
    }
}

/// Catálogo em memória, usado no modo sem banco e nos testes.
pub struct MemoryProductCatalog {
    produtos: Vec<Product>,
}

impl MemoryProductCatalog {
    pub fn new(produtos: Vec<Product>) -> Self {
        MemoryProductCatalog { produtos }
    }

    /// Catálogo com os produtos da vitrine da confeitaria.
    pub fn seeded() -> Self {
        // (nome, descrição, preço, imagem, destaque)
        let vitrine = [
            ("Whole Wheat bread", "Pão integral feito com farinha de trigo integral.", 150, "whole wheat bread.webp", false),
            ("Pink Velvet", "Bolo rosa e macio, com textura aveludada e cobertura cremosa.", 450, "pink velvet.jpg", true),
            ("Brioche", "Pão francês leve e fofo, rico em ovos e manteiga.", 75, "Brioche.jpg", false),
            ("Croissants", "Viennoiserie folhada de massa fermentada com manteiga.", 85, "Croissants.jpg", false),
            ("Japanese Strawberry Cake", "Pão de ló leve com morangos frescos e chantilly.", 799, "japanese strawberry cake.jpg", true),
            ("Chocolate Strawberry Cake", "Camadas de chocolate com morangos frescos e cobertura cremosa.", 899, "chocolate strawberry cake.jpg", true),
            ("Focaccia", "Pão achatado italiano assado no forno.", 200, "Focaccia.jpg", false),
            ("Multigrain bread", "Pão com dois ou mais grãos: cevada, aveia, linhaça e trigo.", 150, "mutigrain bread.webp", false),
            ("Vanilla-Scented Cornmeal Cake", "Bolo rústico de fubá com aroma de baunilha.", 735, "vanilla-scented cornmel cake.jpg", false),
            ("Christmas Cake", "Pão de ló festivo decorado com Papai Noel e árvore de Natal.", 799, "christmas cake.png", false),
            ("Cornbread", "Pão rápido de fubá, crescido com fermento químico.", 100, "Cornbread.jpg", true),
            ("Duet Cake (white and black forest)", "Metade floresta branca com baunilha e cerejas, metade floresta negra com chocolate.", 675, "duet cake (white and black forest).jpg", true),
            ("Mothers Day Cake", "Bolo branco com chocolate, decorado com flores comestíveis ou corações.", 699, "mothers day cake.jpg", false),
            ("Birthday Cake", "Bolo clássico e personalizável com oreo e creme de chocolate.", 769, "birthday cake.png", false),
            ("Grissini", "Palitos de pão longos e crocantes, de origem italiana.", 100, "Grissini bread.jpg", true),
            ("Sourdough bread", "Pão de fermentação natural, com leveduras e lactobacilos.", 75, "sourdough bread.jpg", false),
            ("Cake Gojo Anime", "Bolo inspirado em anime, com o Gojo Satoru.", 799, "cake-gojo.jpg", false),
            ("Chicken bagel", "Pão em formato de anel, recheado com frango.", 135, "Chicken bagel.jpg", false),
        ];

        let produtos = vitrine
            .iter()
            .zip(1..)
            .map(|(&(name, description, price, image, is_featured), id)| Product {
                id,
                name: name.to_string(),
                description: description.to_string(),
                price: BigDecimal::from(price).with_scale(2),
                image: image.to_string(),
                is_featured,
            })
            .collect();

        MemoryProductCatalog { produtos }
    }
}

#[async_trait]
impl ProductCatalog for MemoryProductCatalog {
    async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.produtos.clone())
    }

    async fn featured(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.produtos.iter().filter(|p| p.is_featured).cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Product>, CatalogError> {
        Ok(self.produtos.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn seeded_catalog_lists_and_finds() {
        let catalogo = MemoryProductCatalog::seeded();

        let todos = catalogo.list().await.unwrap();
        assert_eq!(todos.len(), 18);
        assert_eq!(todos[17].name, "Chicken bagel");
        assert_eq!(todos[0].id, 1);

        let pink = catalogo.get(2).await.unwrap().unwrap();
        assert_eq!(pink.name, "Pink Velvet");
        assert_eq!(pink.price, BigDecimal::from(450));

        assert!(catalogo.get(999).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn featured_only_returns_highlighted_products() {
        let catalogo = MemoryProductCatalog::seeded();
        let destaques = catalogo.featured().await.unwrap();

        let nomes: Vec<&str> = destaques.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            nomes,
            vec![
                "Pink Velvet",
                "Japanese Strawberry Cake",
                "Chocolate Strawberry Cake",
                "Cornbread",
                "Duet Cake (white and black forest)",
                "Grissini",
            ]
        );
        assert!(destaques.iter().all(|p| p.is_featured));
    }
}
