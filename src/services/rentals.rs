use crate::{
    db::DbPool,
    entities::rental::{self, Entity as RentalEntity, Model as RentalModel},
    entities::rental_item::{self, Entity as RentalItemEntity, Model as RentalItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::materials::MaterialService,
};
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// One line of a rental as supplied by the caller. Price is optional and
/// backfilled from the materials ledger when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalItemDraft {
    pub item_name: String,
    pub model: String,
    pub quantity: i32,
    pub price: Option<Decimal>,
}

/// Identifies stock to restore when a rental is edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLine {
    pub item_name: String,
    pub model: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalDraft {
    pub customer_name: String,
    pub mobile: Option<String>,
    pub nic_or_license: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub amount_paid: Decimal,
    pub items: Vec<RentalItemDraft>,
}

/// A rental together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRecord {
    pub rental: RentalModel,
    pub items: Vec<RentalItemModel>,
}

/// Number of days a rental spans, counting both endpoints. A window that
/// ends before it starts counts as zero days rather than an error.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i32 {
    let days = (end - start).num_days();
    if days < 0 {
        0
    } else {
        days as i32 + 1
    }
}

/// Line total for a quantity at a unit price, rounded to cents.
pub fn line_total(quantity: i32, price: Decimal) -> Decimal {
    (Decimal::from(quantity) * price).round_dp(2)
}

/// Service for rental transactions and their stock side effects
#[derive(Clone)]
pub struct RentalService {
    db_pool: Arc<DbPool>,
    materials: Arc<MaterialService>,
    event_sender: Option<Arc<EventSender>>,
}

struct PricedItem {
    item_name: String,
    model: String,
    quantity: i32,
    price: Decimal,
    total: Decimal,
}

impl RentalService {
    pub fn new(
        db_pool: Arc<DbPool>,
        materials: Arc<MaterialService>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            materials,
            event_sender,
        }
    }

    /// Creates a rental, persisting its line items and consuming stock for
    /// each of them.
    #[instrument(skip(self, draft), fields(customer_name = %draft.customer_name))]
    pub async fn create_rental(&self, draft: RentalDraft) -> Result<RentalRecord, ServiceError> {
        validate_draft(&draft)?;

        let items = self.price_items(&draft.items).await?;
        let grand_total: Decimal = items.iter().map(|i| i.total).sum();
        let remaining = grand_total - draft.amount_paid;
        let number_of_days = day_count(draft.start_date, draft.end_date);

        let rental_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for rental creation");
            ServiceError::DatabaseError(e)
        })?;

        let rental_model = rental::ActiveModel {
            id: Set(rental_id),
            customer_name: Set(draft.customer_name.trim().to_string()),
            mobile: Set(draft.mobile.clone()),
            nic_or_license: Set(draft.nic_or_license.clone()),
            start_date: Set(draft.start_date),
            end_date: Set(draft.end_date),
            number_of_days: Set(number_of_days),
            amount_paid: Set(draft.amount_paid),
            grand_total: Set(grand_total),
            remaining_amount: Set(remaining),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&txn)
        .await?;

        let saved_items = insert_items(&txn, rental_id, &items).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to commit rental creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(rental_id = %rental_id, grand_total = %grand_total, "Rental created");

        self.consume_stock(&saved_items).await;
        self.emit(Event::RentalCreated(rental_id)).await;

        Ok(RentalRecord {
            rental: rental_model,
            items: saved_items,
        })
    }

    /// Replaces a rental's content. Stock held by the previous version is
    /// restored before the new line items consume stock again. Callers that
    /// know the pre-edit line items can pass them in `original_items`;
    /// otherwise the stored items are used.
    #[instrument(skip(self, draft, original_items))]
    pub async fn update_rental(
        &self,
        rental_id: Uuid,
        draft: RentalDraft,
        original_items: Option<Vec<StockLine>>,
    ) -> Result<RentalRecord, ServiceError> {
        validate_draft(&draft)?;

        let existing = RentalEntity::find_by_id(rental_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Rental {} not found", rental_id)))?;

        let restore_lines = match original_items {
            Some(lines) => lines,
            None => existing
                .find_related(RentalItemEntity)
                .all(self.db_pool.as_ref())
                .await?
                .into_iter()
                .map(|item| StockLine {
                    item_name: item.item_name,
                    model: item.model,
                    quantity: item.quantity,
                })
                .collect(),
        };
        self.restore_stock(&restore_lines).await;

        let items = self.price_items(&draft.items).await?;
        let grand_total: Decimal = items.iter().map(|i| i.total).sum();
        let remaining = grand_total - draft.amount_paid;
        let number_of_days = day_count(draft.start_date, draft.end_date);

        let txn = self.db_pool.begin().await?;

        RentalItemEntity::delete_many()
            .filter(rental_item::Column::RentalId.eq(rental_id))
            .exec(&txn)
            .await?;

        let mut active_model: rental::ActiveModel = existing.into();
        active_model.customer_name = Set(draft.customer_name.trim().to_string());
        active_model.mobile = Set(draft.mobile.clone());
        active_model.nic_or_license = Set(draft.nic_or_license.clone());
        active_model.start_date = Set(draft.start_date);
        active_model.end_date = Set(draft.end_date);
        active_model.number_of_days = Set(number_of_days);
        active_model.amount_paid = Set(draft.amount_paid);
        active_model.grand_total = Set(grand_total);
        active_model.remaining_amount = Set(remaining);
        active_model.updated_at = Set(Some(Utc::now()));
        let rental_model = active_model.update(&txn).await?;

        let saved_items = insert_items(&txn, rental_id, &items).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to commit rental update");
            ServiceError::DatabaseError(e)
        })?;

        info!(rental_id = %rental_id, "Rental updated");

        self.consume_stock(&saved_items).await;
        self.emit(Event::RentalUpdated(rental_id)).await;

        Ok(RentalRecord {
            rental: rental_model,
            items: saved_items,
        })
    }

    /// Deletes a rental and returns its stock to the ledger.
    #[instrument(skip(self))]
    pub async fn delete_rental(&self, rental_id: Uuid) -> Result<(), ServiceError> {
        let existing = RentalEntity::find_by_id(rental_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Rental {} not found", rental_id)))?;

        let lines: Vec<StockLine> = existing
            .find_related(RentalItemEntity)
            .all(self.db_pool.as_ref())
            .await?
            .into_iter()
            .map(|item| StockLine {
                item_name: item.item_name,
                model: item.model,
                quantity: item.quantity,
            })
            .collect();

        self.restore_stock(&lines).await;

        // Items go with the rental via the cascading foreign key
        existing.delete(self.db_pool.as_ref()).await?;

        info!(rental_id = %rental_id, "Rental deleted");
        self.emit(Event::RentalDeleted(rental_id)).await;
        Ok(())
    }

    /// Retrieves a rental with its items
    #[instrument(skip(self))]
    pub async fn get_rental(&self, rental_id: Uuid) -> Result<RentalRecord, ServiceError> {
        let rental = RentalEntity::find_by_id(rental_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Rental {} not found", rental_id)))?;

        let items = rental
            .find_related(RentalItemEntity)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(RentalRecord { rental, items })
    }

    /// Lists all rentals with their items, newest first
    #[instrument(skip(self))]
    pub async fn list_rentals(&self) -> Result<Vec<RentalRecord>, ServiceError> {
        let rows = RentalEntity::find()
            .order_by_desc(rental::Column::CreatedAt)
            .find_with_related(RentalItemEntity)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(rental, items)| RentalRecord { rental, items })
            .collect())
    }

    /// Resolves unit prices for drafts, looking missing ones up in the
    /// materials ledger. Unknown items price at zero.
    async fn price_items(
        &self,
        drafts: &[RentalItemDraft],
    ) -> Result<Vec<PricedItem>, ServiceError> {
        let lookups = drafts.iter().map(|draft| async move {
            let price = match draft.price {
                Some(price) => price,
                None => self
                    .materials
                    .find_price(&draft.item_name, &draft.model)
                    .await?
                    .unwrap_or(Decimal::ZERO),
            };
            Ok::<PricedItem, ServiceError>(PricedItem {
                item_name: draft.item_name.trim().to_string(),
                model: draft.model.trim().to_string(),
                quantity: draft.quantity,
                price,
                total: line_total(draft.quantity, price),
            })
        });

        try_join_all(lookups).await
    }

    /// Consumes stock for freshly written line items. Missing ledger rows
    /// are logged and skipped so the already committed rental stands.
    async fn consume_stock(&self, items: &[RentalItemModel]) {
        for item in items {
            if let Err(e) = self
                .materials
                .adjust_stock(&item.item_name, &item.model, -item.quantity)
                .await
            {
                warn!(
                    item_name = %item.item_name,
                    model = %item.model,
                    error = %e,
                    "Could not consume stock for rental item"
                );
            }
        }
    }

    async fn restore_stock(&self, lines: &[StockLine]) {
        for line in lines {
            if let Err(e) = self
                .materials
                .adjust_stock(&line.item_name, &line.model, line.quantity)
                .await
            {
                warn!(
                    item_name = %line.item_name,
                    model = %line.model,
                    error = %e,
                    "Could not restore stock for rental item"
                );
            }
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send rental event");
            }
        }
    }
}

fn validate_draft(draft: &RentalDraft) -> Result<(), ServiceError> {
    let incomplete = draft.customer_name.trim().is_empty()
        || draft.items.is_empty()
        || draft
            .items
            .iter()
            .any(|item| item.item_name.trim().is_empty() || item.quantity <= 0);

    if incomplete {
        return Err(ServiceError::ValidationError(
            "Please complete all required fields correctly".to_string(),
        ));
    }

    if draft.amount_paid < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Amount paid cannot be negative".to_string(),
        ));
    }

    Ok(())
}

async fn insert_items(
    txn: &sea_orm::DatabaseTransaction,
    rental_id: Uuid,
    items: &[PricedItem],
) -> Result<Vec<RentalItemModel>, ServiceError> {
    let mut saved = Vec::with_capacity(items.len());
    for item in items {
        let model = rental_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            rental_id: Set(rental_id),
            item_name: Set(item.item_name.clone()),
            model: Set(item.model.clone()),
            quantity: Set(item.quantity),
            price: Set(item.price),
            total: Set(item.total),
        }
        .insert(txn)
        .await?;
        saved.push(model);
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_count_is_inclusive() {
        assert_eq!(day_count(date(2024, 1, 1), date(2024, 1, 3)), 3);
        assert_eq!(day_count(date(2024, 1, 1), date(2024, 1, 1)), 1);
    }

    #[test]
    fn day_count_clamps_inverted_windows_to_zero() {
        assert_eq!(day_count(date(2024, 1, 5), date(2024, 1, 1)), 0);
    }

    #[test]
    fn line_total_rounds_to_cents() {
        assert_eq!(line_total(3, dec!(19.999)), dec!(60.00));
        assert_eq!(line_total(2, dec!(10.50)), dec!(21.00));
    }

    #[test]
    fn draft_without_items_is_rejected() {
        let draft = RentalDraft {
            customer_name: "Nimal Perera".to_string(),
            mobile: None,
            nic_or_license: None,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 2),
            amount_paid: dec!(0),
            items: vec![],
        };
        assert!(matches!(
            validate_draft(&draft),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn draft_with_zero_quantity_item_is_rejected() {
        let draft = RentalDraft {
            customer_name: "Nimal Perera".to_string(),
            mobile: None,
            nic_or_license: None,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 2),
            amount_paid: dec!(0),
            items: vec![RentalItemDraft {
                item_name: "Scaffolding".to_string(),
                model: "H-Frame".to_string(),
                quantity: 0,
                price: Some(dec!(100)),
            }],
        };
        assert!(validate_draft(&draft).is_err());
    }
}
