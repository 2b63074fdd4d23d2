//! Development seed: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires the `DATABASE_URL` environment variable (reads .env).

use rxscribe::models::combination::UpsertCombination;
use rxscribe::models::parsing_rule::{CreateSmartParsingRule, RuleFieldType};
use rxscribe::services::{combination, parsing_rule};
use sqlx::PgPool;

const MEDICINES: &[&str] = &[
    "Aconitum Napellus",
    "Arnica Montana",
    "Arsenicum Album",
    "Belladonna",
    "Bryonia Alba",
    "Calcarea Carbonica",
    "Calendula Officinalis",
    "Chamomilla",
    "Gelsemium Sempervirens",
    "Hepar Sulphuris",
    "Ignatia Amara",
    "Lycopodium Clavatum",
    "Natrum Muriaticum",
    "Nux Vomica",
    "Pulsatilla",
    "Rhus Toxicodendron",
    "Ruta Graveolens",
    "Sepia",
    "Silicea",
    "Sulphur",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Run migrations first
    rxscribe::db::run_migrations(&pool).await?;

    println!("=== Prescription Parsing Seed Script ===");

    seed_medicines(&pool).await?;
    seed_combinations(&pool).await?;
    seed_parsing_rules(&pool).await?;

    println!("\n=== Seed complete! ===");
    Ok(())
}

async fn seed_medicines(pool: &PgPool) -> anyhow::Result<()> {
    let mut created = 0u64;
    for name in MEDICINES {
        let result = sqlx::query(
            "INSERT INTO medicines (name) VALUES ($1) ON CONFLICT ((lower(name))) DO NOTHING",
        )
        .bind(name)
        .execute(pool)
        .await?;
        created += result.rows_affected();
    }
    println!("[done] Medicines: {created} new, {} total in seed list", MEDICINES.len());
    Ok(())
}

async fn seed_combinations(pool: &PgPool) -> anyhow::Result<()> {
    let combos = [
        (
            "ABC",
            "Arnica Montana + Belladonna + Calendula Officinalis",
            Some("Injury and inflammation"),
        ),
        (
            "RBR",
            "Rhus Toxicodendron + Bryonia Alba + Ruta Graveolens",
            Some("Joint and tendon pain"),
        ),
        ("BC", "Belladonna + Chamomilla", None),
    ];

    for (name, content, description) in combos {
        let result = combination::upsert(
            pool,
            &UpsertCombination {
                name: name.to_string(),
                content: content.to_string(),
                description: description.map(String::from),
            },
        )
        .await?;
        println!("[done] Combination {name}: {:?}", result.action);
    }
    Ok(())
}

async fn seed_parsing_rules(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM smart_parsing_rules")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Parsing rules already exist ({count})");
        return Ok(());
    }

    let rules = [
        ("Once daily keyword", RuleFieldType::DosePattern, r"(?i)\bOD\b", "1-0-0", true, 10),
        ("Twice daily keyword", RuleFieldType::DosePattern, r"(?i)\bBD\b", "1-0-1", true, 10),
        ("Ounce spelled out", RuleFieldType::Quantity, r"(?i)(\d+)\s*ounces?", "$1oz", true, 5),
        ("Drachm spelled out", RuleFieldType::Quantity, r"(?i)(\d+)\s*drams?", "$1dr", true, 5),
        ("Tabs shorthand", RuleFieldType::DoseForm, "tabs", "tablets", false, 1),
        ("Fortnight", RuleFieldType::Duration, "1 fortnight", "2 weeks", false, 1),
    ];

    for (name, field_type, pattern, replacement, is_regex, priority) in rules {
        parsing_rule::create_rule(
            pool,
            &CreateSmartParsingRule {
                name: name.to_string(),
                field_type,
                pattern: pattern.to_string(),
                replacement: replacement.to_string(),
                is_regex: Some(is_regex),
                priority: Some(priority),
                is_active: Some(true),
            },
        )
        .await?;
    }
    println!("[done] Created {} parsing rules", rules.len());
    Ok(())
}
