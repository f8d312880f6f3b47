//! Vehicle Attribute Insights
//!
//! A small web front end over two pre-trained vehicle models: a fuel-type
//! classifier and an engine horsepower regression pipeline. Forms are
//! described once in [`schema`], collected by [`form`], turned into
//! single-row records by [`record`] and scored through [`predict`].

pub mod config;
pub mod form;
pub mod model;
pub mod pages;
pub mod predict;
pub mod record;
pub mod schema;
pub mod server;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use model::{Pipeline, Predictor};
pub use predict::{InferenceService, ModelKind};
pub use store::ModelStore;
pub use types::{Prediction, Record, Value};
