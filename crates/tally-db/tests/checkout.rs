//! Checkout behaviour against a file-backed database, where several pool
//! connections really do compete for the SQLite write lock.

use std::collections::HashSet;
use std::time::Duration;

use tally_core::bill::{generate_bill_id, BillRequest};
use tally_core::{CartLine, CoreError, Money, NewProduct, RequestContext};
use tally_db::{Database, DbConfig, StoreError};
use tempfile::TempDir;

async fn file_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("tally.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(30));
    let db = Database::new(config).await.unwrap();
    (dir, db)
}

async fn add_product(db: &Database, name: &str, price: i64, quantity: i64) -> String {
    let (product, _) = db
        .catalog()
        .add_product(&NewProduct {
            name: name.to_string(),
            product_type: None,
            price_sale: Money::from_minor(price),
            price_purchase: Money::from_minor(price / 2),
            quantity,
        })
        .await
        .unwrap();
    product.id
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_never_oversell() {
    let (_dir, db) = file_db().await;
    let product_id = add_product(&db, "Last Few Units", 100, 5).await;

    let mut handles = Vec::new();
    for n in 0..20 {
        let db = db.clone();
        let product_id = product_id.clone();
        handles.push(tokio::spawn(async move {
            let ctx = RequestContext::new(format!("req-{n}"), None);
            db.bill_builder()
                .build(&ctx, &BillRequest::new(vec![CartLine::new(&product_id, 1)]))
                .await
        }));
    }

    let mut sold = 0;
    let mut refused = 0;
    let mut receipts = HashSet::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                sold += 1;
                assert!(receipts.insert(outcome.bill.receipt_number));
            }
            Err(StoreError::Rejected(CoreError::InsufficientStock { available, .. })) => {
                assert_eq!(available, 0);
                refused += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(sold, 5);
    assert_eq!(refused, 15);
    assert_eq!(db.stock().get(&product_id).await.unwrap().available_quantity, 0);
    assert_eq!(db.bills().count().await.unwrap(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_replays_of_one_bill_id_deduct_once() {
    let (_dir, db) = file_db().await;
    let product_id = add_product(&db, "Tea", 250, 5).await;
    let bill_id = generate_bill_id();

    let mut handles = Vec::new();
    for n in 0..8 {
        let db = db.clone();
        let request = BillRequest::new(vec![CartLine::new(&product_id, 1)]).with_bill_id(&bill_id);
        handles.push(tokio::spawn(async move {
            let ctx = RequestContext::new(format!("retry-{n}"), None);
            db.bill_builder().build(&ctx, &request).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.bill.id, bill_id);
        if outcome.created {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(db.stock().get(&product_id).await.unwrap().available_quantity, 4);
    assert_eq!(db.bills().count().await.unwrap(), 1);
}

#[tokio::test]
async fn failed_checkout_leaves_every_line_untouched() {
    let (_dir, db) = file_db().await;
    let a = add_product(&db, "Apple", 40, 10).await;
    let b = add_product(&db, "Bread", 120, 3).await;
    let c = add_product(&db, "Cheese", 900, 0).await;

    let err = db
        .bill_builder()
        .build(
            &RequestContext::default(),
            &BillRequest::new(vec![
                CartLine::new(&a, 2),
                CartLine::new(&b, 3),
                CartLine::new(&c, 1),
            ]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.as_rejection().and_then(|e| e.product_id()), Some(c.as_str()));
    assert_eq!(db.stock().get(&a).await.unwrap().available_quantity, 10);
    assert_eq!(db.stock().get(&b).await.unwrap().available_quantity, 3);
    assert_eq!(db.bills().count().await.unwrap(), 0);
}

#[tokio::test]
async fn bills_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.db");

    let bill_id = {
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let product_id = add_product(&db, "Tea", 100, 5).await;
        let outcome = db
            .bill_builder()
            .build(
                &RequestContext::new("req-1", Some("clerk".to_string())),
                &BillRequest::new(vec![CartLine::new(&product_id, 2)]).with_customer_id("cust-7"),
            )
            .await
            .unwrap();
        db.close().await;
        outcome.bill.id
    };

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    let bill = db.bills().get_by_id(&bill_id).await.unwrap();
    assert_eq!(bill.total_sale_amount, Money::from_minor(200));
    assert_eq!(bill.customer_id.as_deref(), Some("cust-7"));
    assert_eq!(bill.sold_by.as_deref(), Some("clerk"));
}
