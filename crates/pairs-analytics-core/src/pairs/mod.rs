pub mod alignment;
pub mod evaluation;
pub mod suitability;

#[cfg(feature = "report")]
pub mod regression_view;
#[cfg(feature = "report")]
pub mod report;
