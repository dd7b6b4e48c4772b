//! Repository for `blacklist_tokens`.

use sqlx::PgPool;

/// Revoked bearer tokens, keyed by their SHA-256 fingerprint.
pub struct BlacklistRepo;

impl BlacklistRepo {
    /// Record a revoked token. Revoking twice is a no-op.
    pub async fn add(pool: &PgPool, token_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO blacklist_tokens (token_hash) VALUES ($1)
             ON CONFLICT (token_hash) DO NOTHING",
        )
        .bind(token_hash)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn contains(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let (found,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM blacklist_tokens WHERE token_hash = $1)",
        )
        .bind(token_hash)
        .fetch_one(pool)
        .await?;
        Ok(found)
    }
}
