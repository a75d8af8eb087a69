pub mod calculations;
pub mod db;
pub mod models;
pub mod report;
pub mod wizard;

pub use db::repository::{ReportRepository, RepositoryError};
pub use models::*;
