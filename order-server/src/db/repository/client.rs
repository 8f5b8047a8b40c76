//! Client Profile Repository

use super::RepoResult;
use shared::models::ClientProfile;
use sqlx::{Sqlite, SqlitePool};

pub async fn find_by_id<'e, E>(executor: E, id: &str) -> RepoResult<Option<ClientProfile>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ClientProfile>(
        "SELECT id, first_name, last_name, email, phone FROM client_profile WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Insert or refresh the profile handed over by the identity provider
pub async fn upsert(pool: &SqlitePool, profile: &ClientProfile) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO client_profile (id, first_name, last_name, email, phone) VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(id) DO UPDATE SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5",
    )
    .bind(&profile.id)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.email)
    .bind(&profile.phone)
    .execute(pool)
    .await?;
    Ok(())
}
