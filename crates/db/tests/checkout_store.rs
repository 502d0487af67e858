//! Integration tests for the pending checkout store, in particular the
//! consume-exactly-once claim that serializes webhook vs. client-side
//! completion.

use std::collections::HashMap;

use sqlx::PgPool;

use leadlot_core::locking::LockType;
use leadlot_core::types::DbId;
use leadlot_db::models::checkout::NewPendingCheckout;
use leadlot_db::repositories::CheckoutRepo;

async fn seed_dealer(pool: &PgPool, name: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO dealers (name, email) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(format!("{name}@example.test"))
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

fn pending(session_id: &str, dealer_id: DbId, lead_ids: Vec<DbId>) -> NewPendingCheckout {
    let lead_prices: HashMap<DbId, i64> =
        lead_ids.iter().map(|id| (*id, 5000)).collect();
    NewPendingCheckout {
        session_id: session_id.to_string(),
        dealer_id,
        lead_ids,
        lead_prices,
        lock_type_id: Some(LockType::Temporary24h.id()),
        discount_applied: false,
        discount_type: None,
        discount_amount_cents: None,
    }
}

// ---------------------------------------------------------------------------
// Test: round trip of the JSON columns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_decode(pool: PgPool) {
    let dealer = seed_dealer(&pool, "alpha").await;

    let row = CheckoutRepo::create(&pool, &pending("cs_1", dealer, vec![11, 22]))
        .await
        .unwrap();

    assert_eq!(row.session_id, "cs_1");
    assert_eq!(row.lead_id_list(), vec![11, 22]);
    assert_eq!(row.lead_price_map().get(&11), Some(&5000));
    assert_eq!(row.lock_type_id, Some(LockType::Temporary24h.id()));
    assert!(row.consumed_at.is_none());
    assert!(row.failed_lead_list().is_empty());
}

// ---------------------------------------------------------------------------
// Test: a session can be claimed exactly once
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_consumes_exactly_once(pool: PgPool) {
    let dealer = seed_dealer(&pool, "alpha").await;
    CheckoutRepo::create(&pool, &pending("cs_1", dealer, vec![1]))
        .await
        .unwrap();

    let first = CheckoutRepo::claim(&pool, "cs_1", Some("pay_1")).await.unwrap();
    let first = first.expect("first claim wins");
    assert!(first.consumed_at.is_some());
    assert_eq!(first.payment_id.as_deref(), Some("pay_1"));

    // The loser of the race sees nothing to claim.
    let second = CheckoutRepo::claim(&pool, "cs_1", Some("pay_other")).await.unwrap();
    assert!(second.is_none());

    // But the row is still inspectable, and the winner's payment id stuck.
    let found = CheckoutRepo::find_by_session(&pool, "cs_1").await.unwrap().unwrap();
    assert!(found.consumed_at.is_some());
    assert_eq!(found.payment_id.as_deref(), Some("pay_1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_unknown_session_is_none(pool: PgPool) {
    assert!(CheckoutRepo::claim(&pool, "cs_missing", None)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: failure bookkeeping for the reconciliation sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_leads_recorded_and_cleared(pool: PgPool) {
    let dealer = seed_dealer(&pool, "alpha").await;
    let row = CheckoutRepo::create(&pool, &pending("cs_1", dealer, vec![1, 2, 3]))
        .await
        .unwrap();
    CheckoutRepo::claim(&pool, "cs_1", Some("pay_1")).await.unwrap();

    CheckoutRepo::record_failed_leads(&pool, row.id, &[2, 3]).await.unwrap();

    let with_failures = CheckoutRepo::list_with_failures(&pool, 10).await.unwrap();
    assert_eq!(with_failures.len(), 1);
    assert_eq!(with_failures[0].failed_lead_list(), vec![2, 3]);

    // Clearing removes it from the sweep queue.
    CheckoutRepo::record_failed_leads(&pool, row.id, &[]).await.unwrap();
    assert!(CheckoutRepo::list_with_failures(&pool, 10).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: duplicate session ids are rejected by the unique constraint
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_session_id_rejected(pool: PgPool) {
    let dealer = seed_dealer(&pool, "alpha").await;
    CheckoutRepo::create(&pool, &pending("cs_1", dealer, vec![1]))
        .await
        .unwrap();

    let err = CheckoutRepo::create(&pool, &pending("cs_1", dealer, vec![2]))
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db) => {
            assert_eq!(db.constraint(), Some("uq_pending_checkouts_session"));
        }
        other => panic!("expected database error, got {other:?}"),
    }
}
