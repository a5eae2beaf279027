use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{NewOrderParams, OrdersRepo, RepoError};
use crate::domain::entities::OrderRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    course_id: Uuid,
    payment: Option<Value>,
    created_at: OffsetDateTime,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            payment: row.payment,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OrdersRepo for PostgresRepositories {
    async fn create_order(&self, params: NewOrderParams) -> Result<OrderRecord, RepoError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (id, user_id, course_id, payment, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, course_id, payment, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(params.user_id)
        .bind(params.course_id)
        .bind(params.payment)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, RepoError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, course_id, payment, created_at \
             FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(OrderRecord::from).collect())
    }

    async fn count_orders_created_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<i64, RepoError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at >= $1 AND created_at < $2")
            .bind(start)
            .bind(end)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}
