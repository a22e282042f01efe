//! Package persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `exh_packages` table.
//! Lifecycle rules are enforced by the exchange core, not in SQL.

use exh_exchange::Package;
use sqlx::PgPool;
use uuid::Uuid;

/// A row is only replaced by a document at least as recent as its own.
const UPSERT_SQL: &str =
    "INSERT INTO exh_packages (id, kind, origin_id, folio, state, document, created_at, updated_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
     ON CONFLICT (id) DO UPDATE SET
         folio = EXCLUDED.folio,
         state = EXCLUDED.state,
         document = EXCLUDED.document,
         updated_at = EXCLUDED.updated_at
     WHERE exh_packages.updated_at <= EXCLUDED.updated_at";

/// Insert or replace the stored document of a package.
pub async fn upsert(pool: &PgPool, package: &Package) -> Result<(), sqlx::Error> {
    let document = serde_json::to_value(package)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to serialize package: {e}")))?;

    sqlx::query(UPSERT_SQL)
    .bind(*package.id.as_uuid())
    .bind(package.kind.as_str())
    .bind(package.origin_id.as_str())
    .bind(package.folio.as_ref().map(|f| f.as_str().to_string()))
    .bind(package.state.as_str())
    .bind(&document)
    .bind(package.created_at)
    .bind(package.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every stored package, oldest first, for repository hydration.
///
/// Rows whose document no longer deserializes are skipped with an error log.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Package>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PackageRow>(
        "SELECT id, kind, origin_id, document FROM exh_packages ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let mut packages = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(package) = row.into_package() {
            packages.push(package);
        }
    }
    Ok(packages)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    kind: String,
    origin_id: String,
    document: serde_json::Value,
}

impl PackageRow {
    fn into_package(self) -> Option<Package> {
        match serde_json::from_value::<Package>(self.document) {
            Ok(package) => Some(package),
            Err(e) => {
                tracing::error!(
                    id = %self.id,
                    kind = %self.kind,
                    origin_id = %self.origin_id,
                    error = %e,
                    "skipping package row with undecodable document"
                );
                None
            }
        }
    }
}
