use crate::{
    db::DbPool,
    entities::material::{self, Entity as MaterialEntity, Model as MaterialModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, QueryFilter,
    QueryOrder, Set, Statement,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateMaterialRequest {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub item_name: String,
    pub model: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub price: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateMaterialRequest {
    pub item_name: Option<String>,
    pub model: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Service for managing the materials stock ledger
#[derive(Clone)]
pub struct MaterialService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MaterialService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new material entry
    #[instrument(skip(self, request), fields(item_name = %request.item_name))]
    pub async fn create_material(
        &self,
        request: CreateMaterialRequest,
    ) -> Result<MaterialModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }

        let material_id = Uuid::new_v4();
        let active_model = material::ActiveModel {
            id: Set(material_id),
            item_name: Set(request.item_name.trim().to_string()),
            model: Set(request.model.unwrap_or_default().trim().to_string()),
            quantity: Set(request.quantity),
            price: Set(request.price),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(Some(Utc::now())),
        };

        let saved = active_model
            .insert(self.db_pool.as_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create material");
                ServiceError::DatabaseError(e)
            })?;

        info!(material_id = %saved.id, "Material created");
        self.emit(Event::MaterialCreated(saved.id)).await;

        Ok(saved)
    }

    /// Retrieves a material by ID
    #[instrument(skip(self))]
    pub async fn get_material(&self, material_id: Uuid) -> Result<MaterialModel, ServiceError> {
        MaterialEntity::find_by_id(material_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Material {} not found", material_id)))
    }

    /// Lists all materials, newest first
    #[instrument(skip(self))]
    pub async fn list_materials(&self) -> Result<Vec<MaterialModel>, ServiceError> {
        let materials = MaterialEntity::find()
            .order_by_desc(material::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(materials)
    }

    /// Applies a partial update to a material
    #[instrument(skip(self, request))]
    pub async fn update_material(
        &self,
        material_id: Uuid,
        request: UpdateMaterialRequest,
    ) -> Result<MaterialModel, ServiceError> {
        if let Some(quantity) = request.quantity {
            if quantity < 0 {
                return Err(ServiceError::ValidationError(
                    "Quantity cannot be negative".to_string(),
                ));
            }
        }
        if let Some(price) = request.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
        }

        let existing = self.get_material(material_id).await?;
        let mut active_model: material::ActiveModel = existing.into();

        if let Some(item_name) = request.item_name {
            if item_name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Item name cannot be empty".to_string(),
                ));
            }
            active_model.item_name = Set(item_name.trim().to_string());
        }
        if let Some(model) = request.model {
            active_model.model = Set(model.trim().to_string());
        }
        if let Some(quantity) = request.quantity {
            active_model.quantity = Set(quantity);
        }
        if let Some(price) = request.price {
            active_model.price = Set(price);
        }
        if let Some(notes) = request.notes {
            active_model.notes = Set(Some(notes));
        }
        active_model.updated_at = Set(Some(Utc::now()));

        let updated = active_model.update(self.db_pool.as_ref()).await?;

        self.emit(Event::MaterialUpdated(material_id)).await;
        Ok(updated)
    }

    /// Deletes a material entry
    #[instrument(skip(self))]
    pub async fn delete_material(&self, material_id: Uuid) -> Result<(), ServiceError> {
        let result = MaterialEntity::delete_by_id(material_id)
            .exec(self.db_pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Material {} not found",
                material_id
            )));
        }

        info!(material_id = %material_id, "Material deleted");
        self.emit(Event::MaterialDeleted(material_id)).await;
        Ok(())
    }

    /// Looks up the unit price for an item name and model pair
    #[instrument(skip(self))]
    pub async fn find_price(
        &self,
        item_name: &str,
        model: &str,
    ) -> Result<Option<Decimal>, ServiceError> {
        let material = MaterialEntity::find()
            .filter(material::Column::ItemName.eq(item_name))
            .filter(material::Column::Model.eq(model))
            .one(self.db_pool.as_ref())
            .await?;
        Ok(material.map(|m| m.price))
    }

    /// Adjusts stock for an item by `delta` (negative consumes, positive
    /// restores) in a single SQL statement so concurrent adjustments never
    /// lose updates. The quantity floor is zero.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        item_name: &str,
        model: &str,
        delta: i32,
    ) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let now = Utc::now();

        let stmt = match db.get_database_backend() {
            DatabaseBackend::Postgres => Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"UPDATE materials
                   SET quantity = GREATEST(0, quantity + $1), updated_at = $2
                   WHERE item_name = $3 AND model = $4"#,
                [delta.into(), now.into(), item_name.into(), model.into()],
            ),
            backend => Statement::from_sql_and_values(
                backend,
                r#"UPDATE materials
                   SET quantity = MAX(0, quantity + ?), updated_at = ?
                   WHERE item_name = ? AND model = ?"#,
                [delta.into(), now.into(), item_name.into(), model.into()],
            ),
        };

        let result = db.execute(stmt).await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!(
                "Material {} ({}) not found",
                item_name, model
            )));
        }

        self.emit(Event::StockAdjusted {
            item_name: item_name.to_string(),
            model: model.to_string(),
            delta,
        })
        .await;

        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send material event");
            }
        }
    }
}
