use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::identity::errors::RepositoryError;
use crate::identity::models::EmailAddress;
use crate::identity::models::Identity;
use crate::identity::models::IdentityFilter;
use crate::identity::models::IdentityId;
use crate::identity::models::Username;
use crate::identity::ports::IdentityRepository;

pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: Option<String>,
    privilege_level: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = move |e: &dyn std::fmt::Display| {
            RepositoryError::CorruptRecord(format!("identity {id}: {e}"))
        };

        Ok(Identity {
            id: IdentityId(id),
            username: Username::new(row.username).map_err(|e| corrupt(&e))?,
            email: EmailAddress::new(row.email).map_err(|e| corrupt(&e))?,
            password_hash: row.password_hash,
            privilege_level: row.privilege_level.parse().map_err(|e| corrupt(&e))?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn find_one(&self, filter: &IdentityFilter) -> Result<Option<Identity>, RepositoryError> {
        // NULL parameters never compare equal, so an absent field matches nothing
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, username, email, password_hash, privilege_level, created_at
            FROM identities
            WHERE email = $1 OR username = $2
            LIMIT 1
            "#,
        )
        .bind(filter.email.as_ref().map(EmailAddress::as_str))
        .bind(filter.username.as_ref().map(Username::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(Identity::try_from).transpose()
    }

    async fn insert(&self, identity: Identity) -> Result<Identity, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO identities (id, username, email, password_hash, privilege_level, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.username.as_str())
        .bind(identity.email.as_str())
        .bind(identity.password_hash.as_deref())
        .bind(identity.privilege_level.as_str())
        .bind(identity.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    return RepositoryError::UniqueViolation(constraint.to_string());
                }
            }
            RepositoryError::Database(e.to_string())
        })?;

        Ok(identity)
    }
}
