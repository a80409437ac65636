mod applications;
mod dashboard;
mod error;
mod opportunities;
mod preparation;
mod users;

pub use applications::ApplicationService;
pub use dashboard::{DashboardService, DeadlineEntry, Summary, Today};
pub use error::ServiceError;
pub use opportunities::OpportunityService;
pub use preparation::PreparationService;
pub use users::UserService;
