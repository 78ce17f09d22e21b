use crate::entities::subscription_entity;
use crate::error::{AppError, AppResult};
use crate::models::{CostWindow, FilterValue, Month, SubscriptionFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub id: Uuid,
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,
    #[schema(value_type = String, example = "07-2025")]
    pub start_date: Month,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "12-2025")]
    pub end_date: Option<Month>,
    pub created_at: DateTime<Utc>,
}

impl From<subscription_entity::Model> for Subscription {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            owner_id: m.owner_id,
            start_date: Month::from_date(m.start_date),
            end_date: m.end_date.map(Month::from_date),
            created_at: m.created_at,
        }
    }
}

fn check_date_order(start_date: Month, end_date: Option<Month>) -> AppResult<()> {
    if let Some(end) = end_date
        && end < start_date
    {
        return Err(AppError::ValidationError(
            "end_date must not be before start_date".to_string(),
        ));
    }
    Ok(())
}

/// Validated input for a new subscription; id and `created_at` are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub owner_id: Uuid,
    pub start_date: Month,
    pub end_date: Option<Month>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "07-2025")]
    pub start_date: String,
    #[serde(default)]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl TryFrom<CreateSubscriptionRequest> for NewSubscription {
    type Error = AppError;

    fn try_from(req: CreateSubscriptionRequest) -> AppResult<Self> {
        if req.service_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "service_name must not be empty".to_string(),
            ));
        }
        if req.price < 1 {
            return Err(AppError::ValidationError(
                "price must be at least 1".to_string(),
            ));
        }
        let owner_id = Uuid::parse_str(&req.user_id)
            .map_err(|_| AppError::ValidationError("Invalid user ID format".to_string()))?;
        let start_date = Month::parse_field("start_date", &req.start_date)?;
        let end_date = match req.end_date.as_deref() {
            None | Some("") => None,
            Some(s) => Some(Month::parse_field("end_date", s)?),
        };
        check_date_order(start_date, end_date)?;

        Ok(Self {
            service_name: req.service_name,
            price: req.price,
            owner_id,
            start_date,
            end_date,
        })
    }
}

/// What a partial update does to `end_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EndDateUpdate {
    /// Field absent from the payload or `null`.
    #[default]
    Keep,
    /// Field present but empty.
    Clear,
    Set(Month),
}

/// Parsed partial update; `None` fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPatch {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub start_date: Option<Month>,
    pub end_date: EndDateUpdate,
}

impl SubscriptionPatch {
    /// Merges the patch onto a previously read record. `id`, `owner_id` and
    /// `created_at` are immutable and always carried over.
    pub fn apply(&self, existing: Subscription) -> AppResult<Subscription> {
        let mut merged = existing;
        if let Some(name) = &self.service_name {
            merged.service_name = name.clone();
        }
        if let Some(price) = self.price {
            merged.price = price;
        }
        if let Some(start) = self.start_date {
            merged.start_date = start;
        }
        match self.end_date {
            EndDateUpdate::Keep => {}
            EndDateUpdate::Clear => merged.end_date = None,
            EndDateUpdate::Set(end) => merged.end_date = Some(end),
        }
        check_date_order(merged.start_date, merged.end_date)?;
        Ok(merged)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    /// Blank or absent keeps the current name.
    #[serde(default)]
    pub service_name: Option<String>,
    /// Zero or absent keeps the current price.
    #[serde(default)]
    pub price: Option<i32>,
    /// Empty or absent keeps the current start month.
    #[serde(default)]
    #[schema(example = "08-2025")]
    pub start_date: Option<String>,
    /// Absent or `null` keeps the current end month, `""` clears it.
    #[serde(default)]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl TryFrom<UpdateSubscriptionRequest> for SubscriptionPatch {
    type Error = AppError;

    fn try_from(req: UpdateSubscriptionRequest) -> AppResult<Self> {
        let price = match req.price {
            Some(p) if p < 0 => {
                return Err(AppError::ValidationError(
                    "price must not be negative".to_string(),
                ));
            }
            Some(0) | None => None,
            Some(p) => Some(p),
        };
        let start_date = match req.start_date.as_deref() {
            None | Some("") => None,
            Some(s) => Some(Month::parse_field("start_date", s)?),
        };
        let end_date = match req.end_date.as_deref() {
            None => EndDateUpdate::Keep,
            Some("") => EndDateUpdate::Clear,
            Some(s) => EndDateUpdate::Set(Month::parse_field("end_date", s)?),
        };

        Ok(Self {
            service_name: req.service_name.filter(|s| !s.trim().is_empty()),
            price,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionListQuery {
    /// Only subscriptions owned by this user
    pub user_id: Option<String>,
    /// Only subscriptions with exactly this service name
    pub service_name: Option<String>,
}

impl SubscriptionListQuery {
    pub fn into_filter(self) -> AppResult<SubscriptionFilter> {
        Ok(SubscriptionFilter::new(
            FilterValue::parse_owner(self.user_id.as_deref())?,
            FilterValue::from_query(self.service_name),
        ))
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalCostQuery {
    /// Only subscriptions owned by this user
    pub user_id: Option<String>,
    /// Only subscriptions with exactly this service name
    pub service_name: Option<String>,
    /// Window start, MM-YYYY
    pub start_date: Option<String>,
    /// Window end, MM-YYYY
    pub end_date: Option<String>,
}

impl TotalCostQuery {
    pub fn into_parts(self) -> AppResult<(SubscriptionFilter, CostWindow)> {
        let parse = |field: &str, raw: Option<&str>| match raw {
            None | Some("") => Ok(None),
            Some(s) => Month::parse_field(field, s).map(Some),
        };
        let window = CostWindow::new(
            parse("start_date", self.start_date.as_deref())?,
            parse("end_date", self.end_date.as_deref())?,
        );
        let filter = SubscriptionFilter::new(
            FilterValue::parse_owner(self.user_id.as_deref())?,
            FilterValue::from_query(self.service_name),
        );
        Ok((filter, window))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub subscription: Subscription,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<Subscription>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalCostResponse {
    #[schema(example = 800)]
    pub total_cost: i64,
}
