pub mod assessment;
pub mod config;
pub mod error;
pub mod health;
pub mod model;
pub mod server;

pub use assessment::{AssessmentProxy, AssessmentRequest, EntityUpload};
pub use config::AppConfig;
pub use error::ServiceError;
pub use health::HealthReport;
pub use model::{ModelInvoker, ModelRegistry};
pub use server::build_router;
