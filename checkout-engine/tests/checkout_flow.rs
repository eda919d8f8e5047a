//! End-to-end checkout flow over a shared in-memory store

use checkout_engine::{
    CartManager, IdentityService, OrderLedger, OutcomeSource, PaymentSimulator,
};
use checkout_engine::payment;
use rust_decimal::Decimal;
use shared::{CartItem, OrderItem, OrderStatus, PaymentMethod};
use std::sync::Arc;
use std::time::Duration;

struct FixedDraw(f64);

impl OutcomeSource for FixedDraw {
    fn draw(&self) -> f64 {
        self.0
    }
}

fn frozen_items(cart: &[CartItem]) -> Vec<OrderItem> {
    cart.iter()
        .map(|l| OrderItem {
            product_id: l.product_id.clone(),
            name: l.name.clone(),
            price: l.price,
            quantity: l.quantity,
        })
        .collect()
}

#[tokio::test]
async fn register_add_twice_checkout_pix() {
    let store = Arc::new(checkout_engine::MemoryStore::new());
    let identity = IdentityService::new(store.clone());
    let cart = CartManager::new(store.clone());
    let ledger = OrderLedger::new(store.clone());

    // Register Ana; she becomes the session user
    let ana = identity.register("Ana", "ana@x.com", "123456").unwrap();
    assert!(identity.is_authenticated().unwrap());

    // Add the same product twice: one line, quantity 2
    cart.add_item("p1", "Mouse", Decimal::new(12990, 2), "m.jpg")
        .unwrap();
    let snapshot = cart
        .add_item("p1", "Mouse", Decimal::new(12990, 2), "m.jpg")
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].quantity, 2);
    assert_eq!(cart.total().unwrap(), Decimal::new(25980, 2));

    // Checkout with pix
    let order = ledger
        .create_order(
            &ana.id,
            frozen_items(&snapshot),
            cart.total().unwrap(),
            PaymentMethod::Pix,
            Some(payment::details_for(PaymentMethod::Pix, None)),
        )
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Decimal::new(25980, 2));

    // Settle; a high draw settles as paid
    let simulator = PaymentSimulator::new(ledger.clone())
        .with_outcomes(Arc::new(FixedDraw(0.99)))
        .with_delay(Duration::ZERO);
    let outcome = simulator
        .process_payment(&order.id, order.payment_method)
        .await
        .unwrap();

    assert_eq!(outcome, OrderStatus::Paid);
    let settled = ledger.get_order(&order.id).unwrap().unwrap();
    assert!(settled.status.is_terminal());

    // The caller clears the cart iff the settlement posted Paid
    if settled.status == OrderStatus::Paid {
        cart.clear().unwrap();
    }
    assert!(cart.items().unwrap().is_empty());

    // Revenue lands in Ana's stats
    let stats = ledger.stats(Some(&ana.id)).unwrap();
    assert_eq!(stats.paid, 1);
    assert_eq!(stats.total_revenue, Decimal::new(25980, 2));
}

#[tokio::test]
async fn declined_checkout_keeps_the_cart() {
    let store = Arc::new(checkout_engine::MemoryStore::new());
    let identity = IdentityService::new(store.clone());
    let cart = CartManager::new(store.clone());
    let ledger = OrderLedger::new(store.clone());

    let user = identity.register("Bia", "bia@x.com", "123456").unwrap();
    let snapshot = cart
        .add_item("p2", "Teclado", Decimal::new(29990, 2), "t.jpg")
        .unwrap();

    let order = ledger
        .create_order(
            &user.id,
            frozen_items(&snapshot),
            cart.total().unwrap(),
            PaymentMethod::Boleto,
            None,
        )
        .unwrap();

    // A low draw declines boleto outright
    let simulator = PaymentSimulator::new(ledger.clone())
        .with_outcomes(Arc::new(FixedDraw(0.01)))
        .with_delay(Duration::ZERO);
    let outcome = simulator
        .process_payment(&order.id, order.payment_method)
        .await
        .unwrap();

    assert_eq!(outcome, OrderStatus::Failed);
    if ledger.get_order(&order.id).unwrap().unwrap().status == OrderStatus::Paid {
        cart.clear().unwrap();
    }
    assert_eq!(cart.count().unwrap(), 1);
}

#[tokio::test]
async fn flow_survives_a_redb_backed_store() {
    let dir = tempfile::tempdir().unwrap();

    let order_id = {
        let store =
            Arc::new(checkout_engine::RedbStore::open(dir.path().join("shop.redb")).unwrap());
        let identity = IdentityService::new(store.clone());
        let cart = CartManager::new(store.clone());
        let ledger = OrderLedger::new(store.clone());

        let user = identity.register("Ana", "ana@x.com", "123456").unwrap();
        let snapshot = cart
            .add_item("p1", "Mouse", Decimal::new(12990, 2), "m.jpg")
            .unwrap();
        let order = ledger
            .create_order(
                &user.id,
                frozen_items(&snapshot),
                cart.total().unwrap(),
                PaymentMethod::CreditCard,
                Some(payment::details_for(
                    PaymentMethod::CreditCard,
                    Some("4111 1111 1111 1234"),
                )),
            )
            .unwrap();

        let simulator = PaymentSimulator::new(ledger.clone())
            .with_outcomes(Arc::new(FixedDraw(0.99)))
            .with_delay(Duration::ZERO);
        simulator
            .process_payment(&order.id, order.payment_method)
            .await
            .unwrap();
        order.id
    };

    // Reopen over the same file: records survive
    let store = Arc::new(checkout_engine::RedbStore::open(dir.path().join("shop.redb")).unwrap());
    let ledger = OrderLedger::new(store);
    let reloaded = ledger.get_order(&order_id).unwrap().unwrap();
    assert_eq!(reloaded.status, OrderStatus::Paid);
    assert_eq!(
        reloaded
            .payment_details
            .unwrap()
            .card_last_digits
            .as_deref(),
        Some("1234")
    );
}
