//! Inference service: the only thing the pages talk to.

use crate::config::AppConfig;
use crate::model::{ArtifactError, PredictError, Predictor};
use crate::record::{align_to_model, AlignError};
use crate::store::ModelStore;
use crate::types::{Prediction, Record};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    FuelType,
    EngineHp,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::FuelType => "fuel_type",
            ModelKind::EngineHp => "engine_hp",
        }
    }
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Load(#[from] ArtifactError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("model '{0}' returned no prediction")]
    NoOutput(String),
}

pub struct InferenceService {
    store: Arc<ModelStore>,
    fuel_type_model: PathBuf,
    engine_hp_model: PathBuf,
}

impl InferenceService {
    pub fn new(store: Arc<ModelStore>, fuel_type_model: PathBuf, engine_hp_model: PathBuf) -> Self {
        Self {
            store,
            fuel_type_model,
            engine_hp_model,
        }
    }

    pub fn from_config(cfg: &AppConfig, store: Arc<ModelStore>) -> Self {
        Self::new(store, cfg.fuel_type_model.clone(), cfg.engine_hp_model.clone())
    }

    pub fn path(&self, kind: ModelKind) -> &Path {
        match kind {
            ModelKind::FuelType => &self.fuel_type_model,
            ModelKind::EngineHp => &self.engine_hp_model,
        }
    }

    pub fn model(&self, kind: ModelKind) -> Result<Arc<dyn Predictor>, ArtifactError> {
        self.store.get(self.path(kind))
    }

    pub fn is_loaded(&self, kind: ModelKind) -> bool {
        self.store.is_loaded(self.path(kind))
    }

    pub fn predict_fuel_type(&self, record: &Record) -> Result<Prediction, InferenceError> {
        let model = self.model(ModelKind::FuelType)?;
        invoke(model.as_ref(), record)
    }

    /// Aligns the record to the pipeline's declared columns before predicting.
    pub fn predict_engine_hp(&self, record: &Record) -> Result<Prediction, InferenceError> {
        let model = self.model(ModelKind::EngineHp)?;
        let aligned = align_to_model(model.name(), record, model.input_columns())?;
        invoke(model.as_ref(), &aligned)
    }

    pub fn predict(&self, kind: ModelKind, record: &Record) -> Result<Prediction, InferenceError> {
        match kind {
            ModelKind::FuelType => self.predict_fuel_type(record),
            ModelKind::EngineHp => self.predict_engine_hp(record),
        }
    }
}

/// Runs `predictor` on a one-row table and returns the only element.
pub fn invoke(predictor: &dyn Predictor, record: &Record) -> Result<Prediction, InferenceError> {
    if std::env::var("LOG_PRED").ok().as_deref() == Some("1") {
        tracing::info!("predict model={} cols={} [{}]", predictor.name(), record.len(), record.summary());
    } else {
        tracing::debug!("predict model={} cols={} [{}]", predictor.name(), record.len(), record.summary());
    }

    let out = predictor.predict(std::slice::from_ref(record))?;
    out.into_iter()
        .next()
        .ok_or_else(|| InferenceError::NoOutput(predictor.name().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use parking_lot::Mutex;

    /// Remembers the last row it was asked about.
    struct Recording {
        columns: Vec<String>,
        seen: Mutex<Option<Record>>,
    }

    impl Predictor for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn input_columns(&self) -> Option<&[String]> {
            Some(&self.columns)
        }

        fn predict(&self, rows: &[Record]) -> Result<Vec<Prediction>, PredictError> {
            *self.seen.lock() = rows.first().cloned();
            Ok(vec![Prediction::Value(210.5)])
        }
    }

    struct Silent;

    impl Predictor for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn predict(&self, _rows: &[Record]) -> Result<Vec<Prediction>, PredictError> {
            Ok(Vec::new())
        }
    }

    fn service(fuel: Arc<dyn Predictor>, hp: Arc<dyn Predictor>) -> InferenceService {
        let store = Arc::new(ModelStore::new());
        store.insert("fuel.json", fuel);
        store.insert("hp.json", hp);
        InferenceService::new(store, "fuel.json".into(), "hp.json".into())
    }

    #[test]
    fn engine_hp_is_aligned_before_predict() {
        let hp = Arc::new(Recording {
            columns: vec!["MSRP".into(), "ExtraCol".into()],
            seen: Mutex::new(None),
        });
        let svc = service(Arc::new(Silent), hp.clone());
        let record = Record::new().with("Year", 2022).with("MSRP", 35000);

        let out = svc.predict_engine_hp(&record).unwrap();
        assert_eq!(out, Prediction::Value(210.5));

        let seen = hp.seen.lock().clone().unwrap();
        assert_eq!(seen.names(), vec!["MSRP", "ExtraCol"]);
        assert_eq!(seen.get("ExtraCol"), Some(&Value::Int(0)));
    }

    #[test]
    fn engine_hp_needs_declared_columns() {
        let svc = service(Arc::new(Silent), Arc::new(Silent));
        let err = svc.predict_engine_hp(&Record::new()).unwrap_err();
        assert!(matches!(err, InferenceError::Align(_)));
    }

    #[test]
    fn empty_output_is_an_error() {
        let svc = service(Arc::new(Silent), Arc::new(Silent));
        let err = svc.predict_fuel_type(&Record::new()).unwrap_err();
        assert_eq!(err.to_string(), "model 'silent' returned no prediction");
    }

    #[test]
    fn missing_artifact_surfaces_as_load_error() {
        let store = Arc::new(ModelStore::new());
        let svc = InferenceService::new(store, "nope/fuel.json".into(), "nope/hp.json".into());
        assert!(matches!(
            svc.predict(ModelKind::FuelType, &Record::new()),
            Err(InferenceError::Load(_))
        ));
        assert!(!svc.is_loaded(ModelKind::FuelType));
    }

    #[test]
    fn verbose_logging_leaves_prediction_untouched() {
        std::env::set_var("LOG_PRED", "1");
        let model = Recording { columns: Vec::new(), seen: Mutex::new(None) };
        let record = Record::new().with("Make", "Toyota").with("Year", 2022);

        let out = invoke(&model, &record);
        std::env::remove_var("LOG_PRED");

        assert_eq!(out.unwrap(), Prediction::Value(210.5));
        assert_eq!(model.seen.lock().clone(), Some(record));
    }
}
