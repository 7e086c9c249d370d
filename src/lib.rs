//! Cleaning, filtering and chart-ready views over a municipal housing table.
//!
//! Load once with [`data::loader::load_and_clean`], narrow with a
//! [`data::filter::FilterCriteria`], then hand the resulting
//! [`data::filter::FilteredView`] to any function in [`views`].

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod notes;
pub mod state;
pub mod views;

pub use data::filter::{FilterCriteria, FilteredView};
pub use data::loader::load_and_clean;
pub use data::model::{HousingDataset, NestedValue, PropertyRecord};
pub use error::{LoadError, ViewError};
pub use state::ExplorerState;
