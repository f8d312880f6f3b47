//! Model artifacts and the `Predictor` seam.
//!
//! An artifact is a JSON description of a fitted pipeline: a column
//! preprocessor (passthrough, standard scaling, one-hot encoding) followed by
//! a random forest. Artifacts are produced offline and only ever read here.

use crate::types::{Prediction, Record};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

// ---------- Errors ----------

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictError {
    #[error("columns are missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column '{column}' expects a number, got '{value}'")]
    NotNumeric { column: String, value: String },

    #[error("column '{column}' has unknown category '{value}'")]
    UnknownCategory { column: String, value: String },

    #[error("input table has no rows")]
    EmptyInput,
}

// ---------- Predictor seam ----------

/// A loaded, read-only model. `predict` returns one prediction per row.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    /// Input columns the model declares, if it exposes them.
    fn input_columns(&self) -> Option<&[String]> {
        None
    }

    fn predict(&self, rows: &[Record]) -> Result<Vec<Prediction>, PredictError>;
}

// ---------- Artifact format ----------

#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
    pub preprocessor: Preprocessor,
    pub estimator: Estimator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Preprocessor {
    pub transformers: Vec<Transformer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transformer {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(flatten)]
    pub kind: TransformKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformKind {
    Passthrough,
    StandardScaler {
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    OneHot {
        categories: Vec<Vec<String>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    RandomForestRegressor { trees: Vec<Tree> },
    RandomForestClassifier { classes: Vec<String>, trees: Vec<Tree> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

impl Transformer {
    fn width(&self) -> usize {
        match &self.kind {
            TransformKind::OneHot { categories, .. } => categories.iter().map(Vec::len).sum(),
            _ => self.columns.len(),
        }
    }
}

impl Tree {
    fn eval(&self, x: &[f64]) -> &[f64] {
        // validated at load: every index in range, no cycles
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { value } => return value,
                Node::Split { feature, threshold, left, right } => {
                    i = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn validate(&self, width: usize, leaf_len: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            let Some(node) = self.nodes.get(i) else {
                return Err(format!("node index {} out of range", i));
            };
            if std::mem::replace(&mut seen[i], true) {
                return Err(format!("node {} is reachable more than once", i));
            }
            match node {
                Node::Split { feature, left, right, .. } => {
                    if *feature >= width {
                        return Err(format!(
                            "split on feature {} but the preprocessor produces {}",
                            feature, width
                        ));
                    }
                    stack.push(*left);
                    stack.push(*right);
                }
                Node::Leaf { value } if value.len() != leaf_len => {
                    return Err(format!("leaf {} has {} values, expected {}", i, value.len(), leaf_len));
                }
                Node::Leaf { .. } => {}
            }
        }
        Ok(())
    }
}

// ---------- Loaded pipeline ----------

/// A validated artifact, ready to predict.
#[derive(Debug, Clone)]
pub struct Pipeline {
    artifact: ModelArtifact,
    input_columns: Vec<String>,
    width: usize,
}

impl Pipeline {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let origin = path.display().to_string();
        let txt = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            origin: origin.clone(),
            source,
        })?;
        Self::from_json(&origin, &txt)
    }

    pub fn from_json(origin: &str, txt: &str) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = serde_json::from_str(txt).map_err(|source| ArtifactError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Self::new(artifact)
    }

    pub fn new(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            name: artifact.name.clone(),
            reason,
        };

        let mut input_columns: Vec<String> = Vec::new();
        for t in &artifact.preprocessor.transformers {
            let per_column = match &t.kind {
                TransformKind::Passthrough => None,
                TransformKind::StandardScaler { mean, scale } => {
                    if scale.iter().any(|s| *s == 0.0) {
                        return Err(invalid(format!("transformer '{}' has a zero scale", t.name)));
                    }
                    Some((mean.len(), scale.len()))
                }
                TransformKind::OneHot { categories, .. } => Some((categories.len(), categories.len())),
            };
            if let Some((a, b)) = per_column {
                if a != t.columns.len() || b != t.columns.len() {
                    return Err(invalid(format!(
                        "transformer '{}' parameters do not match its {} columns",
                        t.name,
                        t.columns.len()
                    )));
                }
            }
            for c in &t.columns {
                if !input_columns.contains(c) {
                    input_columns.push(c.clone());
                }
            }
        }
        if input_columns.is_empty() {
            return Err(invalid("preprocessor declares no columns".to_string()));
        }

        let width = artifact.preprocessor.transformers.iter().map(Transformer::width).sum();
        let (trees, leaf_len) = match &artifact.estimator {
            Estimator::RandomForestRegressor { trees } => (trees, 1),
            Estimator::RandomForestClassifier { classes, trees } => {
                if classes.is_empty() {
                    return Err(invalid("classifier has no classes".to_string()));
                }
                (trees, classes.len())
            }
        };
        if trees.is_empty() {
            return Err(invalid("forest has no trees".to_string()));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(width, leaf_len)
                .map_err(|reason| invalid(format!("tree {}: {}", i, reason)))?;
        }

        Ok(Self {
            artifact,
            input_columns,
            width,
        })
    }

    pub fn target(&self) -> Option<&str> {
        self.artifact.target.as_deref()
    }

    /// Width of the transformed feature vector.
    pub fn width(&self) -> usize {
        self.width
    }

    fn transform(&self, row: &Record) -> Result<Vec<f64>, PredictError> {
        let missing: Vec<String> = self
            .input_columns
            .iter()
            .filter(|c| row.get(c).is_none())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PredictError::MissingColumns(missing));
        }

        let mut x = Vec::with_capacity(self.width);
        for t in &self.artifact.preprocessor.transformers {
            for (j, column) in t.columns.iter().enumerate() {
                let Some(value) = row.get(column) else {
                    return Err(PredictError::MissingColumns(vec![column.clone()]));
                };
                match &t.kind {
                    TransformKind::Passthrough | TransformKind::StandardScaler { .. } => {
                        let v = value.as_f64().ok_or_else(|| PredictError::NotNumeric {
                            column: column.clone(),
                            value: value.to_string(),
                        })?;
                        match &t.kind {
                            TransformKind::StandardScaler { mean, scale } => {
                                x.push((v - mean[j]) / scale[j])
                            }
                            _ => x.push(v),
                        }
                    }
                    TransformKind::OneHot { categories, handle_unknown } => {
                        let key = value.as_category();
                        let hit = categories[j].iter().position(|c| *c == key);
                        if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                            return Err(PredictError::UnknownCategory {
                                column: column.clone(),
                                value: key,
                            });
                        }
                        x.extend((0..categories[j].len()).map(|k| if hit == Some(k) { 1.0 } else { 0.0 }));
                    }
                }
            }
        }
        Ok(x)
    }

    fn predict_row(&self, x: &[f64]) -> Prediction {
        match &self.artifact.estimator {
            Estimator::RandomForestRegressor { trees } => {
                let sum: f64 = trees.iter().map(|t| t.eval(x)[0]).sum();
                Prediction::Value(sum / trees.len() as f64)
            }
            Estimator::RandomForestClassifier { classes, trees } => {
                let mut proba = vec![0.0; classes.len()];
                for t in trees {
                    for (p, v) in proba.iter_mut().zip(t.eval(x)) {
                        *p += v;
                    }
                }
                // first maximum wins on ties
                let mut best = 0;
                for (k, p) in proba.iter().enumerate() {
                    if *p > proba[best] {
                        best = k;
                    }
                }
                Prediction::Label(classes[best].clone())
            }
        }
    }
}

impl Predictor for Pipeline {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn input_columns(&self) -> Option<&[String]> {
        Some(&self.input_columns)
    }

    fn predict(&self, rows: &[Record]) -> Result<Vec<Prediction>, PredictError> {
        if rows.is_empty() {
            return Err(PredictError::EmptyInput);
        }
        rows.iter()
            .map(|row| self.transform(row).map(|x| self.predict_row(&x)))
            .collect()
    }
}
