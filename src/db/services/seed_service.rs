use bcrypt::hash;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::db::models::MatchFields;
use crate::db::services::{category_service, comment_service, match_service, user_service};
use crate::web::error::AppError;

pub const SAMPLE_PASSWORD: &str = "testpass123";
pub const SAMPLE_MATCH_COUNT: usize = 60;
const BULK_BATCH_SIZE: usize = 100;

const SAMPLE_USERNAMES: [&str; 5] = ["anna", "matti", "liisa", "pekka", "sanna"];
const CATEGORY_NAMES: [&str; 4] = ["Liiga", "Cupin ottelu", "Harjoituspeli", "Ystävyysottelu"];
const TEAMS: [&str; 12] = [
    "HJK", "KuPS", "SJK", "Ilves", "FC Inter", "FC Lahti", "HIFK", "VPS", "AC Oulu", "IFK Mariehamn",
    "FC Haka", "Gnistan",
];
const LOCATIONS: [&str; 6] = [
    "Bolt Arena",
    "Väre Areena",
    "OmaSP Stadion",
    "Tammelan stadion",
    "Veritas Stadion",
    "Raatti",
];
const DESCRIPTIONS: [&str; 5] = [
    "Tiukka ottelu alusta loppuun.",
    "Kotijoukkue hallitsi peliä.",
    "Sateinen ilta, paljon taklauksia.",
    "Upea maali lisäajalla.",
    "Tasainen peli, vähän maalipaikkoja.",
];
const COMMENTS: [&str; 6] = [
    "Hieno ottelu!",
    "Olin paikalla, tunnelma oli mahtava.",
    "Tuomari teki pari outoa ratkaisua.",
    "Toivottavasti ensi kerralla paremmin.",
    "Mikä maali!",
    "Puolustus piti hyvin.",
];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Extra dated matches to insert on top of the sample data.
    pub bulk: usize,
    pub bcrypt_cost: u32,
    /// Fixed seed for reproducible data; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub categories_created: usize,
    pub matches_created: usize,
    pub comments_created: usize,
    pub bulk_matches_created: usize,
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn random_date(rng: &mut StdRng) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        rng.random_range(2023..=2025),
        rng.random_range(1..=12),
        rng.random_range(1..=28),
    )
}

fn random_fixture(rng: &mut StdRng) -> (String, String) {
    let home = pick(rng, &TEAMS);
    let away_pool: Vec<&str> = TEAMS.iter().copied().filter(|t| *t != home).collect();
    let away = pick(rng, &away_pool);
    (home.to_string(), away.to_string())
}

fn random_result(rng: &mut StdRng) -> String {
    format!("{}-{}", rng.random_range(0..=4), rng.random_range(0..=4))
}

fn random_categories(rng: &mut StdRng, category_ids: &[i64]) -> Vec<i64> {
    let amount = rng.random_range(1..=2);
    category_ids.choose_multiple(rng, amount).copied().collect()
}

// --- Seed Service Functions ---

/// Fills the database with sample users, categories, matches and comments.
///
/// Safe to run repeatedly: users and categories are only created when missing and the
/// sample matches are only generated into an empty `matches` table. Bulk matches are
/// always added, committed in batches.
pub async fn seed_database(pool: &SqlitePool, options: &SeedOptions) -> Result<SeedReport, AppError> {
    let mut rng = match options.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut report = SeedReport::default();

    let mut user_ids = Vec::with_capacity(SAMPLE_USERNAMES.len());
    for username in SAMPLE_USERNAMES {
        let user = match user_service::get_user_by_username(pool, username).await? {
            Some(existing) => existing,
            None => {
                let password_hash = hash(SAMPLE_PASSWORD, options.bcrypt_cost)
                    .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;
                report.users_created += 1;
                user_service::create_user(pool, username, &password_hash).await?
            }
        };
        user_ids.push(user.id);
    }

    let mut category_ids = Vec::with_capacity(CATEGORY_NAMES.len());
    for name in CATEGORY_NAMES {
        let category = match category_service::get_category_by_name(pool, name).await? {
            Some(existing) => existing,
            None => {
                report.categories_created += 1;
                category_service::create_category(pool, name).await?
            }
        };
        category_ids.push(category.id);
    }

    if match_service::count_matches(pool).await? == 0 {
        let mut tx = db::begin_write(pool).await?;
        for _ in 0..SAMPLE_MATCH_COUNT {
            let (home, away) = random_fixture(&mut rng);
            let fields = MatchFields {
                title: format!("{home} - {away}"),
                description: pick(&mut rng, &DESCRIPTIONS).to_string(),
                date: random_date(&mut rng),
                opponent: Some(away),
                result: Some(random_result(&mut rng)),
                location: Some(pick(&mut rng, &LOCATIONS).to_string()),
                custom_category: None,
            };
            let owner_id = user_ids.choose(&mut rng).copied().unwrap_or_default();
            let categories = random_categories(&mut rng, &category_ids);
            let created = match_service::insert_match(&mut tx, owner_id, &fields, &categories).await?;
            report.matches_created += 1;

            for _ in 0..rng.random_range(0..=2) {
                let author_id = user_ids.choose(&mut rng).copied().unwrap_or_default();
                let content = pick(&mut rng, &COMMENTS);
                comment_service::insert_comment(&mut tx, created.id, author_id, content).await?;
                report.comments_created += 1;
            }
        }
        tx.commit().await?;
    } else {
        info!("Matches already present, skipping sample matches.");
    }

    let mut remaining = options.bulk;
    while remaining > 0 {
        let batch = remaining.min(BULK_BATCH_SIZE);
        let mut tx = db::begin_write(pool).await?;
        for _ in 0..batch {
            let (home, away) = random_fixture(&mut rng);
            let fields = MatchFields {
                title: format!("{home} - {away}"),
                description: String::new(),
                date: random_date(&mut rng),
                opponent: Some(away),
                result: Some(random_result(&mut rng)),
                location: Some(pick(&mut rng, &LOCATIONS).to_string()),
                custom_category: None,
            };
            let owner_id = user_ids.choose(&mut rng).copied().unwrap_or_default();
            let categories = random_categories(&mut rng, &category_ids);
            match_service::insert_match(&mut tx, owner_id, &fields, &categories).await?;
        }
        tx.commit().await?;
        report.bulk_matches_created += batch;
        remaining -= batch;
        info!(inserted = report.bulk_matches_created, total = options.bulk, "Bulk batch committed.");
    }

    info!(?report, "Database seeded.");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn options(bulk: usize) -> SeedOptions {
        SeedOptions {
            bulk,
            bcrypt_cost: 4,
            rng_seed: Some(7),
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();

        let first = seed_database(&pool, &options(0)).await.unwrap();
        assert_eq!(first.users_created, SAMPLE_USERNAMES.len());
        assert_eq!(first.categories_created, CATEGORY_NAMES.len());
        assert_eq!(first.matches_created, SAMPLE_MATCH_COUNT);

        let second = seed_database(&pool, &options(0)).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(
            match_service::count_matches(&pool).await.unwrap(),
            SAMPLE_MATCH_COUNT as i64
        );
    }

    #[tokio::test]
    async fn test_every_sample_match_has_one_or_two_categories() {
        let pool = connect_in_memory().await.unwrap();
        seed_database(&pool, &options(0)).await.unwrap();

        let counts: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT COUNT(mc.category_id)
            FROM matches m
            LEFT JOIN match_categories mc ON mc.match_id = m.id
            GROUP BY m.id
            "#,
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(counts.len(), SAMPLE_MATCH_COUNT);
        assert!(counts.iter().all(|c| (1..=2).contains(c)));
    }

    #[tokio::test]
    async fn test_sample_users_can_log_in_with_sample_password() {
        let pool = connect_in_memory().await.unwrap();
        seed_database(&pool, &options(0)).await.unwrap();

        let anna = user_service::get_user_by_username(&pool, "anna")
            .await
            .unwrap()
            .unwrap();
        assert!(bcrypt::verify(SAMPLE_PASSWORD, &anna.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_bulk_spans_several_batches() {
        let pool = connect_in_memory().await.unwrap();
        let report = seed_database(&pool, &options(250)).await.unwrap();
        assert_eq!(report.bulk_matches_created, 250);
        assert_eq!(
            match_service::count_matches(&pool).await.unwrap(),
            (SAMPLE_MATCH_COUNT + 250) as i64
        );
    }
}
