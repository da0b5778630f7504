//! `PostgreSQL` Promo Repository
//!
//! Promos and user promos are stored as JSONB documents. Stored-field conditions are pushed into
//! the WHERE clause; counter writes are single conditional statements.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use promo_engine::{
    conditions::{Condition, Predicate, PromoFilter},
    context::CustomerId,
    promos::{Promo, PromoId},
    user_promos::UserPromo,
};
use sqlx::{Postgres, QueryBuilder, query_scalar, types::Json};
use tracing::debug;

use super::PromoRepository;
use crate::{
    database::{Db, RepositoryConfig},
    domain::promos::errors::RepositoryError,
};

const PROMOS_TABLE: &str = "promos";
const USER_PROMOS_TABLE: &str = "user_promos";

const FIND_PROMOS_SQL: &str = include_str!("../sql/find_promos.sql");
const FIND_PROMO_SQL: &str = include_str!("../sql/find_promo.sql");
const UPSERT_PROMO_SQL: &str = include_str!("../sql/upsert_promo.sql");
const INCREMENT_USED_COUNT_SQL: &str = include_str!("../sql/increment_used_count.sql");
const FIND_USER_PROMOS_SQL: &str = include_str!("../sql/find_user_promos.sql");
const FIND_USER_PROMO_SQL: &str = include_str!("../sql/find_user_promo.sql");
const FIND_USER_PROMO_BY_CODE_SQL: &str = include_str!("../sql/find_user_promo_by_code.sql");
const CREATE_USER_PROMO_SQL: &str = include_str!("../sql/create_user_promo.sql");
const ADJUST_USER_PROMO_SQL: &str = include_str!("../sql/adjust_user_promo.sql");
const REFRESH_USER_PROMO_SQL: &str = include_str!("../sql/refresh_user_promo.sql");

const PROMO_ORDER_SQL: &str = " ORDER BY COALESCE((document->>'priority')::bigint, 0), promo_id";

#[derive(Debug, Clone)]
pub struct PgPromoRepository {
    db: Db,
    config: RepositoryConfig,
}

impl PgPromoRepository {
    #[must_use]
    pub fn new(db: Db, config: RepositoryConfig) -> Self {
        Self { db, config }
    }

    fn log_statement(&self, table: &'static str, statement: &str) {
        if self.config.log_statements {
            debug!(table, statement, "executing statement");
        }
    }
}

/// Build the candidate query for a filter's stored-field conditions.
fn find_promos_query(filter: &PromoFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(FIND_PROMOS_SQL.trim_end());

    for condition in filter.stored() {
        builder.push(" AND ");
        push_condition(&mut builder, condition);
    }

    builder.push(PROMO_ORDER_SQL);

    builder
}

fn push_condition(builder: &mut QueryBuilder<'_, Postgres>, condition: &Condition) {
    builder.push("(");

    for (index, clause) in condition.clauses.iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }

        builder.push("(");

        if clause.is_empty() {
            builder.push("TRUE");
        }

        for (position, predicate) in clause.iter().enumerate() {
            if position > 0 {
                builder.push(" AND ");
            }

            push_predicate(builder, predicate);
        }

        builder.push(")");
    }

    builder.push(")");
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::CountryEquals(country) => {
            builder.push("document->>'country' = ");
            builder.push_bind(country.clone());
        }
        Predicate::IsActive(active) => {
            builder.push("(document->>'is_active')::boolean = ");
            builder.push_bind(*active);
        }
        Predicate::StartsAtOrBefore(now) => {
            builder.push("(document->>'start_date')::timestamptz <= ");
            builder.push_bind(SqlxTimestamp::from(*now));
        }
        Predicate::EndsAtOrAfter(now) => {
            builder.push("(document->>'end_date')::timestamptz >= ");
            builder.push_bind(SqlxTimestamp::from(*now));
        }
        Predicate::EndsAfter(now) => {
            builder.push("(document->>'end_date')::timestamptz > ");
            builder.push_bind(SqlxTimestamp::from(*now));
        }
        Predicate::PromoTypeIn(types) => {
            let types: Vec<String> = types
                .iter()
                .map(|promo_type| promo_type.as_str().to_string())
                .collect();

            builder.push("document->>'promo_type' = ANY(");
            builder.push_bind(types);
            builder.push(")");
        }
        Predicate::AllStores => {
            builder.push(r#"document @> '{"entitled_store":{"all":true}}'"#);
        }
        Predicate::ListedStore(store_id) => {
            builder.push(r#"document @> '{"entitled_store":{"store_id":true}}'"#);
            builder.push(" AND document->'prerequisite_store_id' ? ");
            builder.push_bind(store_id.clone());
        }
        Predicate::AllUsers => {
            builder.push(r#"document @> '{"entitled_user":{"all":true}}'"#);
        }
        Predicate::GuestUsers => {
            builder.push(r#"document @> '{"entitled_user":{"guest_user":true}}'"#);
        }
        Predicate::ExistingUsers => {
            builder.push(r#"document @> '{"entitled_user":{"existing_user":true}}'"#);
        }
        Predicate::UsageRemaining => {
            builder.push(
                "((document->'usage_limit'->>'max')::bigint < 0 \
                 OR (document->'usage_limit'->>'used_count')::bigint \
                 < (document->'usage_limit'->>'max')::bigint)",
            );
        }
    }
}

#[async_trait]
impl PromoRepository for PgPromoRepository {
    async fn find_promos(&self, filter: &PromoFilter) -> Result<Vec<Promo>, RepositoryError> {
        let mut builder = find_promos_query(filter);

        self.log_statement(PROMOS_TABLE, builder.sql());

        let promos = builder
            .build_query_scalar::<Json<Promo>>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(promos.into_iter().map(|Json(promo)| promo).collect())
    }

    async fn find_promo(&self, promo_id: &PromoId) -> Result<Option<Promo>, RepositoryError> {
        self.log_statement(PROMOS_TABLE, FIND_PROMO_SQL);

        let promo = query_scalar::<Postgres, Json<Promo>>(FIND_PROMO_SQL)
            .bind(promo_id.as_str())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(promo.map(|Json(promo)| promo))
    }

    async fn upsert_promo(&self, promo: Promo) -> Result<Promo, RepositoryError> {
        self.log_statement(PROMOS_TABLE, UPSERT_PROMO_SQL);

        let document = serde_json::to_value(&promo)?;

        let Json(stored) = query_scalar::<Postgres, Json<Promo>>(UPSERT_PROMO_SQL)
            .bind(promo.promo_id.as_str())
            .bind(document)
            .fetch_one(self.db.pool())
            .await?;

        Ok(stored)
    }

    async fn increment_used_count(
        &self,
        promo_id: &PromoId,
        delta: i64,
    ) -> Result<Option<Promo>, RepositoryError> {
        self.log_statement(PROMOS_TABLE, INCREMENT_USED_COUNT_SQL);

        let promo = query_scalar::<Postgres, Json<Promo>>(INCREMENT_USED_COUNT_SQL)
            .bind(promo_id.as_str())
            .bind(delta)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(promo.map(|Json(promo)| promo))
    }

    async fn find_user_promos(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<UserPromo>, RepositoryError> {
        self.log_statement(USER_PROMOS_TABLE, FIND_USER_PROMOS_SQL);

        let rows = query_scalar::<Postgres, Json<UserPromo>>(FIND_USER_PROMOS_SQL)
            .bind(customer_id.as_str())
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }

    async fn find_user_promo(
        &self,
        customer_id: &CustomerId,
        promo_id: &PromoId,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        self.log_statement(USER_PROMOS_TABLE, FIND_USER_PROMO_SQL);

        let row = query_scalar::<Postgres, Json<UserPromo>>(FIND_USER_PROMO_SQL)
            .bind(customer_id.as_str())
            .bind(promo_id.as_str())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|Json(row)| row))
    }

    async fn find_user_promo_by_code(
        &self,
        customer_id: &CustomerId,
        promo_code: &str,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        self.log_statement(USER_PROMOS_TABLE, FIND_USER_PROMO_BY_CODE_SQL);

        let row = query_scalar::<Postgres, Json<UserPromo>>(FIND_USER_PROMO_BY_CODE_SQL)
            .bind(customer_id.as_str())
            .bind(promo_code)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|Json(row)| row))
    }

    async fn create_user_promo(
        &self,
        row: UserPromo,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        self.log_statement(USER_PROMOS_TABLE, CREATE_USER_PROMO_SQL);

        let document = serde_json::to_value(&row)?;

        let stored = query_scalar::<Postgres, Json<UserPromo>>(CREATE_USER_PROMO_SQL)
            .bind(row.customer_id.as_str())
            .bind(row.promo_id.as_str())
            .bind(document)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(stored.map(|Json(row)| row))
    }

    async fn adjust_user_promo(
        &self,
        row: UserPromo,
        delta: i64,
        ceiling: i64,
    ) -> Result<Option<UserPromo>, RepositoryError> {
        self.log_statement(USER_PROMOS_TABLE, ADJUST_USER_PROMO_SQL);

        let document = serde_json::to_value(&row)?;

        let stored = query_scalar::<Postgres, Json<UserPromo>>(ADJUST_USER_PROMO_SQL)
            .bind(row.customer_id.as_str())
            .bind(row.promo_id.as_str())
            .bind(document)
            .bind(delta)
            .bind(ceiling)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(stored.map(|Json(row)| row))
    }

    async fn refresh_user_promo(&self, row: UserPromo) -> Result<UserPromo, RepositoryError> {
        self.log_statement(USER_PROMOS_TABLE, REFRESH_USER_PROMO_SQL);

        let document = serde_json::to_value(&row)?;

        let Json(stored) = query_scalar::<Postgres, Json<UserPromo>>(REFRESH_USER_PROMO_SQL)
            .bind(row.customer_id.as_str())
            .bind(row.promo_id.as_str())
            .bind(document)
            .fetch_one(self.db.pool())
            .await?;

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use promo_engine::{
        conditions::QueryConditionBuilder,
        context::{Audience, RequestContext},
    };
    use rust_decimal_macros::dec;

    use crate::test::now;

    use super::*;

    #[test]
    fn guest_search_pushes_stored_conditions_only() {
        let ctx = RequestContext {
            audience: Audience::Guest,
            ..RequestContext::anonymous(now())
        };

        let filter = QueryConditionBuilder::default().build(&ctx);

        let builder = find_promos_query(&filter);
        let sql = builder.sql();

        assert!(sql.contains("document->>'country' = $1"), "{sql}");
        assert!(sql.contains("(document->>'is_active')::boolean = $2"), "{sql}");
        assert!(sql.contains("(document->>'start_date')::timestamptz <= $3"), "{sql}");
        assert!(sql.contains("(document->>'end_date')::timestamptz >= $4"), "{sql}");
        assert!(sql.contains(r#"{"entitled_user":{"guest_user":true}}"#), "{sql}");
        assert!(!sql.contains("usage_limit"), "usage is checked after retrieval: {sql}");
        assert!(sql.ends_with(PROMO_ORDER_SQL), "{sql}");
    }

    #[test]
    fn store_and_checkout_conditions_are_bound() {
        let ctx = RequestContext {
            audience: Audience::Existing,
            store_id: Some("store-42".to_string()),
            shipping: Some(dec!(3.99)),
            ..RequestContext::anonymous(now())
        };

        let filter = QueryConditionBuilder::default().build(&ctx);

        let builder = find_promos_query(&filter);
        let sql = builder.sql();

        assert!(sql.contains("document->>'promo_type' = ANY($5)"), "{sql}");
        assert!(sql.contains("document->'prerequisite_store_id' ? $6"), "{sql}");
        assert!(
            sql.contains(r#"{"entitled_store":{"all":true}}') OR ("#),
            "store clauses are alternatives: {sql}"
        );
        assert!(sql.contains(r#"{"entitled_user":{"existing_user":true}}"#), "{sql}");
    }
}
