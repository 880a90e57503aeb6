//! Range reservation against a live PostgreSQL.
//!
//! Needs `DATABASE_URL` pointing at a database with the migrations applied.
//! `#[ignore]`d so the default test run stays hermetic:
//!
//! ```bash
//! cargo test --test kgs_postgres -- --ignored
//! ```

use std::sync::Arc;

use snaplink::domain::repositories::CounterRepository;
use snaplink::infrastructure::persistence::PgCounterRepository;
use sqlx::PgPool;

async fn connect() -> Arc<PgPool> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("postgres connect");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Arc::new(pool)
}

#[tokio::test]
#[ignore]
async fn concurrent_reservations_yield_disjoint_ranges() {
    let repository = Arc::new(PgCounterRepository::new(connect().await));

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let repo = Arc::clone(&repository);
        tasks.push(tokio::spawn(async move {
            repo.reserve_range(100).await.unwrap()
        }));
    }

    let mut ranges = Vec::new();
    for task in tasks {
        ranges.push(task.await.unwrap());
    }

    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        let (_, end_a) = pair[0];
        let (start_b, _) = pair[1];
        assert!(end_a <= start_b, "overlapping ranges {:?}", pair);
    }
    for (start, end) in ranges {
        assert_eq!(end - start, 100);
    }
}
