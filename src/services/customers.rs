use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity, Model as CustomerModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub mobile: Option<String>,
    #[validate(length(min = 1, message = "NIC or license number is required"))]
    pub nic_or_license: String,
    pub address: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub nic_or_license: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
}

/// Service for the customer registry
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a customer. The NIC or license number must be unique.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let duplicate = CustomerEntity::find()
            .filter(customer::Column::NicOrLicense.eq(request.nic_or_license.trim()))
            .one(self.db_pool.as_ref())
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::BadRequest(
                "A customer with this NIC or license already exists".to_string(),
            ));
        }

        let saved = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            mobile: Set(request.mobile),
            nic_or_license: Set(request.nic_or_license.trim().to_string()),
            address: Set(request.address),
            photo: Set(request.photo),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(customer_id = %saved.id, "Customer created");
        self.emit(Event::CustomerCreated(saved.id)).await;
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<CustomerModel, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<CustomerModel>, ServiceError> {
        let customers = CustomerEntity::find()
            .order_by_desc(customer::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(customers)
    }

    /// Applies a partial update to a customer
    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        let existing = self.get_customer(customer_id).await?;
        let mut active_model: customer::ActiveModel = existing.into();

        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Name cannot be empty".to_string(),
                ));
            }
            active_model.name = Set(name.trim().to_string());
        }
        if let Some(mobile) = request.mobile {
            active_model.mobile = Set(Some(mobile));
        }
        if let Some(nic_or_license) = request.nic_or_license {
            if nic_or_license.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "NIC or license cannot be empty".to_string(),
                ));
            }
            active_model.nic_or_license = Set(nic_or_license.trim().to_string());
        }
        if let Some(address) = request.address {
            active_model.address = Set(Some(address));
        }
        if let Some(photo) = request.photo {
            active_model.photo = Set(Some(photo));
        }

        let updated = active_model.update(self.db_pool.as_ref()).await?;
        self.emit(Event::CustomerUpdated(customer_id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        let result = CustomerEntity::delete_by_id(customer_id)
            .exec(self.db_pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Customer {} not found",
                customer_id
            )));
        }

        info!(customer_id = %customer_id, "Customer deleted");
        self.emit(Event::CustomerDeleted(customer_id)).await;
        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send customer event");
            }
        }
    }
}
