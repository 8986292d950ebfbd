//! Database seeding command.
//!
//! Inserts the default settings document and a small demo catalog. Both
//! steps are safe to re-run: the settings row is only written if absent,
//! and the catalog is skipped when categories already exist.

use rust_decimal::Decimal;
use sqlx::PgPool;

use fagot_core::settings::SiteSettings;

use super::CommandError;

struct SeedCategory {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    position: i32,
    products: &'static [SeedProduct],
}

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    essence: Option<&'static str>,
    price: &'static str,
    compare_at_price: Option<&'static str>,
    unit: &'static str,
    stock: i32,
    badges: &'static [&'static str],
}

const CATALOG: &[SeedCategory] = &[
    SeedCategory {
        name: "Bois de chauffage",
        slug: "bois-de-chauffage",
        description: "Bûches de feuillus durs, séchées à moins de 20% d'humidité.",
        position: 1,
        products: &[
            SeedProduct {
                name: "Chêne sec 33 cm",
                slug: "chene-sec-33cm",
                description: "Bûches de chêne séchées deux ans, prêtes à brûler.",
                essence: Some("Chêne"),
                price: "95.00",
                compare_at_price: None,
                unit: "stere",
                stock: 40,
                badges: &["bestseller"],
            },
            SeedProduct {
                name: "Hêtre sec 50 cm",
                slug: "hetre-sec-50cm",
                description: "Bûches de hêtre en 50 cm pour foyers ouverts et grands inserts.",
                essence: Some("Hêtre"),
                price: "89.00",
                compare_at_price: Some("99.00"),
                unit: "stere",
                stock: 25,
                badges: &["promo"],
            },
            SeedProduct {
                name: "Mélange feuillus 25 cm",
                slug: "melange-feuillus-25cm",
                description: "Mélange chêne, charme et frêne en petite coupe pour poêles.",
                essence: Some("Mélange feuillus"),
                price: "105.00",
                compare_at_price: None,
                unit: "stere",
                stock: 18,
                badges: &[],
            },
        ],
    },
    SeedCategory {
        name: "Granulés",
        slug: "granules",
        description: "Granulés de bois certifiés pour poêles et chaudières.",
        position: 2,
        products: &[
            SeedProduct {
                name: "Granulés premium sac 15 kg",
                slug: "granules-premium-15kg",
                description: "Granulés 100% résineux certifiés ENplus A1.",
                essence: Some("Résineux"),
                price: "6.50",
                compare_at_price: None,
                unit: "bag",
                stock: 300,
                badges: &["new"],
            },
            SeedProduct {
                name: "Palette granulés 66 sacs",
                slug: "palette-granules-66-sacs",
                description: "Palette complète de 66 sacs de 15 kg, livrée à domicile.",
                essence: Some("Résineux"),
                price: "389.00",
                compare_at_price: Some("420.00"),
                unit: "pallet",
                stock: 12,
                badges: &["bestseller", "promo"],
            },
        ],
    },
    SeedCategory {
        name: "Allumage",
        slug: "allumage",
        description: "Bois d'allumage et allume-feux naturels.",
        position: 3,
        products: &[SeedProduct {
            name: "Filet de bois d'allumage",
            slug: "filet-bois-allumage",
            description: "Petit bois résineux très sec en filet de 40 litres.",
            essence: Some("Résineux"),
            price: "8.90",
            compare_at_price: None,
            unit: "bag",
            stock: 120,
            badges: &[],
        }],
    },
];

/// Seed default settings and, unless `settings_only`, the demo catalog.
///
/// # Errors
///
/// Returns `CommandError` when the database is unreachable or an insert
/// fails.
pub async fn run(settings_only: bool) -> Result<(), CommandError> {
    let pool = super::connect().await?;

    seed_settings(&pool).await?;

    if settings_only {
        tracing::info!("Skipping demo catalog (--settings-only)");
        return Ok(());
    }

    seed_catalog(&pool).await?;

    Ok(())
}

/// Insert the default settings document if none exists yet.
///
/// Existing settings are never overwritten; edits made through the admin
/// survive a re-seed.
async fn seed_settings(pool: &PgPool) -> Result<(), CommandError> {
    let data = serde_json::to_value(SiteSettings::default())?;

    let result = sqlx::query("INSERT INTO site_settings (id, data) VALUES (1, $1) ON CONFLICT (id) DO NOTHING")
        .bind(data)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        tracing::info!("Default settings inserted");
    } else {
        tracing::info!("Settings already present, left untouched");
    }

    Ok(())
}

/// Insert the demo catalog on an empty database.
async fn seed_catalog(pool: &PgPool) -> Result<(), CommandError> {
    let (has_categories,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM categories)")
        .fetch_one(pool)
        .await?;

    if has_categories {
        tracing::info!("Catalog already populated, skipping demo data");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    for category in CATALOG {
        let (category_id,): (i64,) = sqlx::query_as(
            "INSERT INTO categories (name, slug, description, position)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(category.name)
        .bind(category.slug)
        .bind(category.description)
        .bind(category.position)
        .fetch_one(&mut *tx)
        .await?;

        for product in category.products {
            let price: Decimal = product.price.parse()?;
            let compare_at: Option<Decimal> =
                product.compare_at_price.map(str::parse).transpose()?;
            let badges: Vec<String> = product.badges.iter().map(ToString::to_string).collect();

            sqlx::query(
                "INSERT INTO products
                     (category_id, name, slug, description, essence, price,
                      compare_at_price, unit, stock, badges)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(category_id)
            .bind(product.name)
            .bind(product.slug)
            .bind(product.description)
            .bind(product.essence)
            .bind(price)
            .bind(compare_at)
            .bind(product.unit)
            .bind(product.stock)
            .bind(&badges)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        categories = CATALOG.len(),
        products = CATALOG.iter().map(|c| c.products.len()).sum::<usize>(),
        "Demo catalog inserted"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_slugs_unique() {
        let mut slugs = HashSet::new();
        for category in CATALOG {
            assert!(slugs.insert(category.slug), "duplicate slug {}", category.slug);
            for product in category.products {
                assert!(slugs.insert(product.slug), "duplicate slug {}", product.slug);
            }
        }
    }

    #[test]
    fn test_seed_prices_parse() {
        for category in CATALOG {
            for product in category.products {
                let price: Decimal = product.price.parse().expect("price parses");
                assert!(price > Decimal::ZERO);
                if let Some(compare) = product.compare_at_price {
                    let compare: Decimal = compare.parse().expect("compare price parses");
                    assert!(compare > price, "compare-at must exceed price");
                }
            }
        }
    }

    #[test]
    fn test_seed_units_and_badges_known() {
        for category in CATALOG {
            for product in category.products {
                assert!(
                    product.unit.parse::<fagot_core::types::Unit>().is_ok(),
                    "unknown unit {}",
                    product.unit
                );
                for badge in product.badges {
                    assert!(
                        badge.parse::<fagot_core::types::Badge>().is_ok(),
                        "unknown badge {badge}"
                    );
                }
            }
        }
    }
}
