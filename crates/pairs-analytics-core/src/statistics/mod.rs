pub mod cointegration;
pub mod correlation;
pub mod descriptive;
pub mod regression;
pub mod unit_root;
