//! Static product catalog
//!
//! Read-only seed data consumed as-is by the storefront; the core never
//! mutates it.

use rust_decimal::Decimal;
use shared::Product;
use std::sync::OnceLock;

static CATALOG: OnceLock<Vec<Product>> = OnceLock::new();

fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn seed() -> Vec<Product> {
    vec![
        Product {
            id: "1".into(),
            name: "Notebook Gamer Pro".into(),
            description: "Notebook gamer de alta performance com Intel i7, 16GB RAM, RTX 3060 e SSD 512GB.".into(),
            price: price(549_999),
            original_price: Some(price(599_999)),
            image: "/images/products/notebook-gamer.jpg".into(),
            category: "Eletrônicos".into(),
            tags: Some(vec!["gamer".into(), "performance".into(), "ssd".into()]),
            in_stock: true,
            rating: 4.8,
            review_count: 142,
        },
        Product {
            id: "2".into(),
            name: "Mouse Gamer RGB".into(),
            description: "Mouse gamer com iluminação RGB, DPI ajustável até 16000 e 7 botões programáveis.".into(),
            price: price(15_990),
            original_price: Some(price(19_990)),
            image: "/images/products/mouse-gamer.jpg".into(),
            category: "Periféricos".into(),
            tags: Some(vec!["gamer".into(), "rgb".into()]),
            in_stock: true,
            rating: 4.5,
            review_count: 89,
        },
        Product {
            id: "3".into(),
            name: "Teclado Mecânico".into(),
            description: "Teclado mecânico switch blue com ABNT2 e iluminação por tecla.".into(),
            price: price(29_990),
            original_price: None,
            image: "/images/products/teclado-mecanico.jpg".into(),
            category: "Periféricos".into(),
            tags: Some(vec!["mecânico".into()]),
            in_stock: true,
            rating: 4.7,
            review_count: 203,
        },
        Product {
            id: "4".into(),
            name: "Headset 7.1 Surround".into(),
            description: "Headset com som surround 7.1, microfone removível e almofadas em espuma.".into(),
            price: price(34_990),
            original_price: None,
            image: "/images/products/headset.jpg".into(),
            category: "Áudio".into(),
            tags: None,
            in_stock: false,
            rating: 4.3,
            review_count: 57,
        },
    ]
}

/// Full catalog, in listing order
pub fn all() -> &'static [Product] {
    CATALOG.get_or_init(seed)
}

/// Lookup by product id
pub fn by_id(id: &str) -> Option<&'static Product> {
    all().iter().find(|p| p.id == id)
}

/// All products in a category, listing order preserved
pub fn by_category(category: &str) -> Vec<&'static Product> {
    all().iter().filter(|p| p.category == category).collect()
}
