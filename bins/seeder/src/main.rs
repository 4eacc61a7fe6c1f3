//! Ledger seeder for Tally development and testing.
//!
//! Seeds a few months of activity_accounting rows for three users so every
//! report filter has something to match: deposits, withdrawals, fees and
//! refunds that point back at their original deposit.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, Set};
use tally_db::entities::activity_accounting;

const USERS: [&str; 3] = [
    "alice@tally.dev",
    "bob@tally.dev",
    "carol@tally.dev",
];
const ADMINS: [&str; 2] = ["ops@tally.dev", "finance@tally.dev"];
const CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

/// Rows per user.
const ROWS_PER_USER: i64 = 40;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tally_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding activity_accounting...");
    seed_ledger(&db).await;

    println!("Seeding complete!");
}

/// Seeds ledger rows unless the table already has data.
async fn seed_ledger(db: &DatabaseConnection) {
    let existing = activity_accounting::Entity::find()
        .count(db)
        .await
        .expect("Failed to count ledger rows");
    if existing > 0 {
        println!("  Ledger already has {existing} rows, skipping...");
        return;
    }

    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("valid seed start");
    let mut inserted = 0;

    for (u, user) in (0_i64..).zip(USERS) {
        let mut last_deposit: Option<i64> = None;

        for n in 0..ROWS_PER_USER {
            let (kind, status, amount) = match n % 5 {
                0 | 3 => ("deposit", "completed", Decimal::new(25_000 + n * 150, 2)),
                1 => ("withdrawal", "completed", Decimal::new(-(9_000 + n * 75), 2)),
                2 => ("fee", "pending", Decimal::new(-250, 2)),
                _ => ("refund", "reversed", Decimal::new(12_500, 2)),
            };
            let original_id = if kind == "refund" {
                last_deposit.map(|id| format!("tx-{id}"))
            } else {
                None
            };

            let row = activity_accounting::ActiveModel {
                id: NotSet,
                date: Set((start + Duration::hours(n * 53 + u * 7)).into()),
                user_email: Set(user.to_string()),
                admin: Set(ADMINS
                    .get(usize::try_from(n % 3).unwrap_or(0))
                    .map(ToString::to_string)),
                status: Set(status.to_string()),
                transaction_type: Set(kind.to_string()),
                original_id: Set(original_id),
                amount: Set(amount),
                currency: Set(CURRENCIES[usize::try_from(u).unwrap_or(0)].to_string()),
                description: Set(Some(format!("Seeded {kind} #{n} for {user}"))),
            };

            let model = row.insert(db).await.expect("Failed to insert ledger row");
            if kind == "deposit" {
                last_deposit = Some(model.id);
            }
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} ledger rows");
}
