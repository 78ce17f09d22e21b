//! Persistence for subscription rows. The list and total-cost queries push
//! their filter predicates down into SQL.

use crate::entities::subscription_entity as subscriptions;
use crate::error::{AppError, AppResult};
use crate::models::{CostWindow, Subscription, SubscriptionFilter};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct SubscriptionStore {
    pool: DatabaseConnection,
}

/// Owner and service-name predicates. Unset filters add nothing.
fn filter_condition(filter: &SubscriptionFilter) -> Condition {
    Condition::all()
        .add_option(
            filter
                .owner_id
                .as_option()
                .map(|id| subscriptions::Column::OwnerId.eq(*id)),
        )
        .add_option(
            filter
                .service_name
                .as_option()
                .map(|name| subscriptions::Column::ServiceName.eq(name.as_str())),
        )
}

/// Interval overlap: `(end_date IS NULL OR end_date >= window_start) AND start_date <= window_end`,
/// each half dropped when its bound is open.
fn window_condition(window: &CostWindow) -> Condition {
    Condition::all()
        .add_option(window.start().map(|ws| {
            Condition::any()
                .add(subscriptions::Column::EndDate.is_null())
                .add(subscriptions::Column::EndDate.gte(ws.first_day()))
        }))
        .add_option(
            window
                .end()
                .map(|we| subscriptions::Column::StartDate.lte(we.first_day())),
        )
}

fn into_active_model(sub: &Subscription) -> subscriptions::ActiveModel {
    subscriptions::ActiveModel {
        id: Set(sub.id),
        service_name: Set(sub.service_name.clone()),
        price: Set(sub.price),
        owner_id: Set(sub.owner_id),
        start_date: Set(sub.start_date.first_day()),
        end_date: Set(sub.end_date.map(|m| m.first_day())),
        created_at: Set(sub.created_at),
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Subscription {id} not found"))
}

impl SubscriptionStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Fails with a database error if the id already exists.
    pub async fn insert(&self, sub: &Subscription) -> AppResult<()> {
        subscriptions::Entity::insert(into_active_model(sub))
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Subscription> {
        subscriptions::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .map(Subscription::from)
            .ok_or_else(|| not_found(id))
    }

    /// Overwrites the mutable columns of an existing row.
    pub async fn update(&self, sub: &Subscription) -> AppResult<()> {
        let mut am = into_active_model(sub);
        am.id = ActiveValue::NotSet;
        am.owner_id = ActiveValue::NotSet;
        am.created_at = ActiveValue::NotSet;

        let result = subscriptions::Entity::update_many()
            .set(am)
            .filter(subscriptions::Column::Id.eq(sub.id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found(sub.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = subscriptions::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Newest first.
    pub async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let models = subscriptions::Entity::find()
            .filter(filter_condition(filter))
            .order_by_desc(subscriptions::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(Subscription::from).collect())
    }

    pub async fn total_cost(
        &self,
        filter: &SubscriptionFilter,
        window: &CostWindow,
    ) -> AppResult<i64> {
        #[derive(Debug, FromQueryResult)]
        struct TotalCostRow {
            total_cost: i64,
        }

        let total: SimpleExpr = Func::coalesce([
            Expr::col(subscriptions::Column::Price).sum(),
            Expr::value(0i64),
        ])
        .into();

        let total_cost = subscriptions::Entity::find()
            .select_only()
            .column_as(total, "total_cost")
            .filter(filter_condition(filter))
            .filter(window_condition(window))
            .into_model::<TotalCostRow>()
            .one(&self.pool)
            .await?
            .map(|r| r.total_cost)
            .unwrap_or(0);

        Ok(total_cost)
    }

    #[cfg(test)]
    pub async fn count(&self) -> AppResult<u64> {
        use sea_orm::PaginatorTrait;
        Ok(subscriptions::Entity::find().count(&self.pool).await?)
    }
}
