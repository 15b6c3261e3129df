//! Signal/target labels to classifier class indices and back.
//!
//! Labels are encoded as `class = label + 1`. When a training run sees only
//! two distinct labels they are squeezed to {0, 1} in their original order,
//! and the exact pairing is kept in [`LabelMapping`] so a predicted class can
//! be decoded without guessing. A run with a single label trains nothing.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::domain::day_record::{DayRecord, Signal};

/// Number of features per sample.
pub const FEATURE_COUNT: usize = 7;

/// Features in a fixed order shared by training and inference: both EMAs,
/// their slopes, RSI, return and volatility.
pub fn feature_vector(record: &DayRecord) -> [f64; FEATURE_COUNT] {
    [
        record.ema_fast,
        record.ema_slow,
        record.ema_fast_slope,
        record.ema_slow_slope,
        record.rsi,
        record.returns,
        record.volatility,
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSample {
    pub features: [f64; FEATURE_COUNT],
    pub class_label: usize,
}

/// Which column supplied the training labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    Target,
    Signal,
}

/// Class layout chosen for one training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMapping {
    /// A single label; no model is trained.
    Single(Signal),
    /// Two labels squeezed to classes 0 (`low`) and 1 (`high`).
    Binary { low: Signal, high: Signal },
    /// All three labels, `class = label + 1`.
    Ternary,
}

impl LabelMapping {
    /// Mapping for the distinct labels present; `None` for no labels.
    pub fn from_labels(labels: &[Signal]) -> Option<Self> {
        let classes: BTreeSet<usize> = labels.iter().map(|&l| encode_ternary(l)).collect();
        let distinct: Vec<Signal> = classes.into_iter().filter_map(decode_ternary).collect();
        match distinct.as_slice() {
            [] => None,
            [only] => Some(LabelMapping::Single(*only)),
            [low, high] => Some(LabelMapping::Binary {
                low: *low,
                high: *high,
            }),
            _ => Some(LabelMapping::Ternary),
        }
    }

    pub fn n_classes(&self) -> usize {
        match self {
            LabelMapping::Single(_) => 1,
            LabelMapping::Binary { .. } => 2,
            LabelMapping::Ternary => 3,
        }
    }

    pub fn encode(&self, label: Signal) -> Option<usize> {
        match *self {
            LabelMapping::Single(only) => (label == only).then_some(0),
            LabelMapping::Binary { low, high } => {
                if label == low {
                    Some(0)
                } else if label == high {
                    Some(1)
                } else {
                    None
                }
            }
            LabelMapping::Ternary => Some(encode_ternary(label)),
        }
    }

    pub fn decode(&self, class: usize) -> Option<Signal> {
        match *self {
            LabelMapping::Single(only) => (class == 0).then_some(only),
            LabelMapping::Binary { low, high } => match class {
                0 => Some(low),
                1 => Some(high),
                _ => None,
            },
            LabelMapping::Ternary => decode_ternary(class),
        }
    }
}

/// `-1 -> 0`, `0 -> 1`, `1 -> 2`.
pub fn encode_ternary(label: Signal) -> usize {
    (label.as_i8() + 1) as usize
}

pub fn decode_ternary(class: usize) -> Option<Signal> {
    i8::try_from(class).ok().and_then(|c| Signal::from_i8(c - 1))
}

/// Labels and feature rows picked for training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub source: LabelSource,
    pub features: Vec<[f64; FEATURE_COUNT]>,
    pub labels: Vec<Signal>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn mapping(&self) -> Option<LabelMapping> {
        LabelMapping::from_labels(&self.labels)
    }

    /// Samples encoded under `mapping`; labels outside it are skipped.
    pub fn samples(&self, mapping: &LabelMapping) -> Vec<ClassifierSample> {
        self.features
            .iter()
            .zip(&self.labels)
            .filter_map(|(features, &label)| {
                mapping.encode(label).map(|class_label| ClassifierSample {
                    features: *features,
                    class_label,
                })
            })
            .collect()
    }
}

/// Pick training rows and labels.
///
/// The last `holdout` records are excluded and their non-null targets used.
/// When that leaves fewer than two distinct targets or fewer than
/// `min_target_labels` of them, the current signal over every record but
/// the final one is used instead.
pub fn select_training_set(
    records: &[DayRecord],
    holdout: usize,
    min_target_labels: usize,
) -> TrainingSet {
    let head = &records[..records.len().saturating_sub(holdout)];
    let (features, labels): (Vec<_>, Vec<_>) = head
        .iter()
        .filter_map(|r| r.target.map(|t| (feature_vector(r), t)))
        .unzip();

    let distinct: BTreeSet<Signal> = labels.iter().copied().collect();
    if distinct.len() >= 2 && labels.len() >= min_target_labels {
        debug!(samples = labels.len(), "training on look-ahead targets");
        return TrainingSet {
            source: LabelSource::Target,
            features,
            labels,
        };
    }

    info!(
        distinct = distinct.len(),
        targets = labels.len(),
        "targets too sparse, training on signal"
    );
    let head = &records[..records.len().saturating_sub(1)];
    TrainingSet {
        source: LabelSource::Signal,
        features: head.iter().map(feature_vector).collect(),
        labels: head.iter().map(|r| r.signal).collect(),
    }
}
