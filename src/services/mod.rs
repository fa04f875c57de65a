pub mod customers;
pub mod materials;
pub mod rentals;
pub mod reports;
pub mod suggestions;

pub use customers::CustomerService;
pub use materials::MaterialService;
pub use rentals::RentalService;
pub use reports::ReportService;
pub use suggestions::SuggestionService;
