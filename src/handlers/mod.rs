pub mod customers;
pub mod materials;
pub mod rentals;
pub mod reports;
pub mod suggestions;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    CustomerService, MaterialService, RentalService, ReportService, SuggestionService,
};

/// Container wiring every domain service over one shared pool.
#[derive(Clone)]
pub struct AppServices {
    pub materials: Arc<MaterialService>,
    pub rentals: Arc<RentalService>,
    pub customers: Arc<CustomerService>,
    pub suggestions: Arc<SuggestionService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        let materials = Arc::new(MaterialService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let rentals = Arc::new(RentalService::new(
            db_pool.clone(),
            materials.clone(),
            event_sender.clone(),
        ));
        let customers = Arc::new(CustomerService::new(db_pool.clone(), event_sender));
        let suggestions = Arc::new(SuggestionService::new(db_pool.clone()));
        let reports = Arc::new(ReportService::new(db_pool));

        Self {
            materials,
            rentals,
            customers,
            suggestions,
            reports,
        }
    }
}
