//! Report data and renderers.

mod data;
mod render;

pub use data::{CompanyDetails, ExpenseLine, FinancingSummary, ReportData, ReportFields};
pub use render::{JsonRenderer, PREVIEW_BANNER, RenderError, ReportRenderer, TextRenderer};
