//! Next-period signal prediction.
//!
//! Selects training labels, fits a classifier through the [`Classifier`]
//! port and decodes its most probable class for the final record. A run
//! that sees a single label skips the model and applies the EMA rule.

use tracing::{debug, info};

use crate::domain::day_record::{DayRecord, Signal};
use crate::domain::error::AlphaCrossError;
use crate::domain::label_codec::{
    ClassifierSample, LabelMapping, LabelSource, feature_vector, select_training_set,
};
use crate::ports::classifier_port::Classifier;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub min_records: usize,
    pub min_target_labels: usize,
    /// Trailing records excluded from target-labelled training.
    pub holdout: usize,
    pub n_trees: usize,
    pub max_depth: u16,
    pub seed: u64,
    pub fallback_confidence: f64,
    pub neutral_confidence: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        PredictorConfig {
            min_records: 30,
            min_target_labels: 10,
            holdout: 2,
            n_trees: 50,
            max_depth: 3,
            seed: 42,
            fallback_confidence: 0.65,
            neutral_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub symbol: String,
    pub date: chrono::NaiveDate,
    pub signal: Signal,
    /// Winning class probability, or the fixed rule confidence.
    pub confidence: f64,
    pub source: LabelSource,
    pub mapping: LabelMapping,
    /// True when no model was trained.
    pub rule_based: bool,
    /// Indicator values of the record the prediction is made from.
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
}

/// A fitted classifier together with the label mapping it was trained under.
pub struct TrainedModel<C> {
    classifier: C,
    mapping: LabelMapping,
}

impl<C: Classifier> TrainedModel<C> {
    pub fn mapping(&self) -> LabelMapping {
        self.mapping
    }

    /// Most probable signal and its probability. Ties go to the lower class.
    pub fn predict(&self, record: &DayRecord) -> Result<(Signal, f64), AlphaCrossError> {
        let proba = self.classifier.predict_proba(&feature_vector(record))?;
        let (class, confidence) = proba
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
            .ok_or_else(|| AlphaCrossError::Classifier {
                reason: "classifier returned no probabilities".to_string(),
            })?;
        let signal = self
            .mapping
            .decode(class)
            .ok_or_else(|| AlphaCrossError::Classifier {
                reason: format!("class {class} outside {:?}", self.mapping),
            })?;
        Ok((signal, confidence))
    }
}

/// Fit `classifier` on `records` and predict the signal for the last one.
pub fn train_and_predict<C: Classifier>(
    records: &[DayRecord],
    symbol: &str,
    config: &PredictorConfig,
    classifier: C,
) -> Result<Prediction, AlphaCrossError> {
    if records.len() < config.min_records {
        return Err(AlphaCrossError::InsufficientData {
            symbol: symbol.to_string(),
            records: records.len(),
            minimum: config.min_records,
        });
    }
    let Some(last) = records.last() else {
        return Err(AlphaCrossError::NoData {
            symbol: symbol.to_string(),
        });
    };

    let set = select_training_set(records, config.holdout, config.min_target_labels);
    let Some(mapping) = set.mapping() else {
        return Err(AlphaCrossError::InsufficientData {
            symbol: symbol.to_string(),
            records: records.len(),
            minimum: config.min_records,
        });
    };

    if let LabelMapping::Single(only) = mapping {
        info!(symbol, label = %only, "single label in training set, using EMA rule");
        return Ok(rule_based_prediction(last, symbol, config, set.source, mapping));
    }

    let model = fit(classifier, &set.samples(&mapping), mapping)?;
    let (signal, confidence) = model.predict(last)?;
    debug!(
        symbol,
        classes = mapping.n_classes(),
        samples = set.len(),
        "classifier fitted"
    );
    info!(symbol, %signal, confidence, "prediction");

    Ok(Prediction {
        symbol: symbol.to_string(),
        date: last.date,
        signal,
        confidence,
        source: set.source,
        mapping,
        rule_based: false,
        ema_fast: last.ema_fast,
        ema_slow: last.ema_slow,
        rsi: last.rsi,
    })
}

pub fn fit<C: Classifier>(
    mut classifier: C,
    samples: &[ClassifierSample],
    mapping: LabelMapping,
) -> Result<TrainedModel<C>, AlphaCrossError> {
    classifier.fit(samples, mapping.n_classes())?;
    Ok(TrainedModel {
        classifier,
        mapping,
    })
}

/// EMA-order signal of `record` with the configured fixed confidence.
pub fn rule_based_prediction(
    record: &DayRecord,
    symbol: &str,
    config: &PredictorConfig,
    source: LabelSource,
    mapping: LabelMapping,
) -> Prediction {
    let signal = Signal::from_emas(record.ema_fast, record.ema_slow);
    let confidence = if signal == Signal::Neutral {
        config.neutral_confidence
    } else {
        config.fallback_confidence
    };
    Prediction {
        symbol: symbol.to_string(),
        date: record.date,
        signal,
        confidence,
        source,
        mapping,
        rule_based: true,
        ema_fast: record.ema_fast,
        ema_slow: record.ema_slow,
        rsi: record.rsi,
    }
}
