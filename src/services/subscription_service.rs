use crate::database::SubscriptionStore;
use crate::error::AppResult;
use crate::models::*;
use chrono::{SubsecRound, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubscriptionService {
    store: SubscriptionStore,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self {
            store: SubscriptionStore::new(pool),
        }
    }

    /// Assigns a fresh id and `created_at` before inserting. `created_at` is cut
    /// to microseconds, the precision of `timestamptz`.
    pub async fn create(&self, new: NewSubscription) -> AppResult<Subscription> {
        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: new.service_name,
            price: new.price,
            owner_id: new.owner_id,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: Utc::now().trunc_subsecs(6),
        };

        if let Err(e) = self.store.insert(&subscription).await {
            log::error!("Failed to create subscription: {e}");
            return Err(e);
        }

        log::info!(
            "Created subscription {} ({}) for user {}",
            subscription.id,
            subscription.service_name,
            subscription.owner_id
        );
        Ok(subscription)
    }

    pub async fn list(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        log::debug!("Listing subscriptions with {filter:?}");
        self.store.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Subscription> {
        self.store.find_by_id(id).await
    }

    /// Reads the current row, merges the patch onto it and writes the full row back.
    pub async fn update(&self, id: Uuid, patch: SubscriptionPatch) -> AppResult<Subscription> {
        let existing = self.store.find_by_id(id).await?;
        let merged = patch.apply(existing)?;

        if let Err(e) = self.store.update(&merged).await {
            log::error!("Failed to update subscription {id}: {e}");
            return Err(e);
        }

        log::info!("Updated subscription {id}");
        Ok(merged)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.delete(id).await?;
        log::info!("Deleted subscription {id}");
        Ok(())
    }

    /// Sum of `price` over every matching subscription that overlaps `window`.
    /// Zero when nothing matches.
    pub async fn total_cost(
        &self,
        filter: &SubscriptionFilter,
        window: &CostWindow,
    ) -> AppResult<i64> {
        log::debug!("Computing total cost with {filter:?} in {window:?}");
        self.store.total_cost(filter, window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::test_utils::setup_db;

    fn m(s: &str) -> Month {
        Month::parse(s).unwrap()
    }

    fn new_sub(
        name: &str,
        price: i32,
        owner: Uuid,
        start: &str,
        end: Option<&str>,
    ) -> NewSubscription {
        NewSubscription {
            service_name: name.to_string(),
            price,
            owner_id: owner,
            start_date: m(start),
            end_date: end.map(m),
        }
    }

    async fn seeded() -> (SubscriptionService, Vec<Subscription>) {
        let service = SubscriptionService::new(setup_db().await);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let mut created = Vec::new();
        for new in [
            new_sub("Yoga", 400, alice, "07-2025", None),
            new_sub("Yoga", 400, bob, "01-2025", Some("03-2025")),
            new_sub("Netflix", 799, alice, "11-2024", Some("08-2025")),
            new_sub("Spotify", 199, bob, "05-2023", None),
            new_sub("Gym", 2500, alice, "02-2026", Some("02-2027")),
        ] {
            created.push(service.create(new).await.unwrap());
        }
        (service, created)
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let service = SubscriptionService::new(setup_db().await);
        let before = Utc::now().trunc_subsecs(6);
        let sub = service
            .create(new_sub("Yoga", 400, Uuid::new_v4(), "07-2025", None))
            .await
            .unwrap();

        assert!(sub.created_at >= before);
        assert_eq!(sub.created_at.timestamp_subsec_nanos() % 1_000, 0);

        let stored = service.get(sub.id).await.unwrap();
        assert_eq!(stored.id, sub.id);
        assert_eq!(stored.created_at, sub.created_at);
    }

    #[tokio::test]
    async fn test_total_without_filters_sums_every_row() {
        let (service, created) = seeded().await;
        let expected: i64 = created.iter().map(|s| s.price as i64).sum();
        let total = service
            .total_cost(&SubscriptionFilter::default(), &CostWindow::unbounded())
            .await
            .unwrap();
        assert_eq!(total, expected);
    }

    #[tokio::test]
    async fn test_total_matches_in_memory_predicate() {
        let (service, created) = seeded().await;
        let owners: Vec<FilterValue<Uuid>> = vec![
            FilterValue::Unset,
            FilterValue::Equals(created[0].owner_id),
            FilterValue::Equals(created[1].owner_id),
        ];
        let names: Vec<FilterValue<String>> = vec![
            FilterValue::Unset,
            FilterValue::Equals("Yoga".to_string()),
            FilterValue::Equals("Missing".to_string()),
        ];
        let windows = [
            CostWindow::unbounded(),
            CostWindow::new(Some(m("06-2025")), Some(m("12-2025"))),
            CostWindow::new(Some(m("01-2025")), Some(m("02-2025"))),
            CostWindow::new(Some(m("09-2025")), None),
            CostWindow::new(None, Some(m("12-2024"))),
            CostWindow::new(Some(m("03-2025")), Some(m("01-2025"))),
        ];

        for owner in &owners {
            for name in &names {
                let filter = SubscriptionFilter::new(owner.clone(), name.clone());
                for window in &windows {
                    let expected: i64 = created
                        .iter()
                        .filter(|s| filter.matches(s) && window.overlaps(s.start_date, s.end_date))
                        .map(|s| s.price as i64)
                        .sum();
                    let total = service.total_cost(&filter, window).await.unwrap();
                    assert_eq!(total, expected, "{filter:?} {window:?}");
                }
            }
        }
    }

    #[tokio::test]
    async fn test_open_ended_rows_count_for_windows_starting_now() {
        let (service, created) = seeded().await;
        let now = Month::from_date(Utc::now().date_naive());
        let window = CostWindow::new(Some(now), None);

        for open in created.iter().filter(|s| s.end_date.is_none()) {
            let filter = SubscriptionFilter::new(
                FilterValue::Equals(open.owner_id),
                FilterValue::Equals(open.service_name.clone()),
            );
            let total = service.total_cost(&filter, &window).await.unwrap();
            assert!(total >= open.price as i64);
        }
    }

    #[tokio::test]
    async fn test_total_no_match_is_zero() {
        let (service, _) = seeded().await;
        let filter = SubscriptionFilter::new(FilterValue::Equals(Uuid::new_v4()), FilterValue::Unset);
        let total = service
            .total_cost(&filter, &CostWindow::unbounded())
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_list_by_owner_never_leaks() {
        let (service, created) = seeded().await;
        let alice = created[0].owner_id;
        let listed = service
            .list(&SubscriptionFilter::new(FilterValue::Equals(alice), FilterValue::Unset))
            .await
            .unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|s| s.owner_id == alice));
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() {
        let (service, created) = seeded().await;
        let target = &created[1];

        let patch = SubscriptionPatch {
            price: Some(450),
            ..Default::default()
        };
        let updated = service.update(target.id, patch).await.unwrap();
        assert_eq!(updated.price, 450);
        assert_eq!(updated.service_name, target.service_name);
        assert_eq!(updated.end_date, target.end_date);

        let cleared = service
            .update(
                target.id,
                SubscriptionPatch {
                    end_date: EndDateUpdate::Clear,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.end_date, None);

        let stored = service.get(target.id).await.unwrap();
        assert_eq!(stored.price, 450);
        assert_eq!(stored.end_date, None);
        assert_eq!(stored.start_date, target.start_date);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = SubscriptionService::new(setup_db().await);
        let err = service
            .update(Uuid::new_v4(), SubscriptionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_keeps_rows() {
        let (service, created) = seeded().await;
        let err = service.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let all = service.list(&SubscriptionFilter::default()).await.unwrap();
        assert_eq!(all.len(), created.len());
    }
}
