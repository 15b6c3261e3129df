//! Bagged decision-tree classifier on smartcore.
//!
//! Each member tree is fitted on a bootstrap resample drawn from a seeded
//! RNG, so the same samples and seed give the same ensemble. Class
//! probability is the share of member votes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use tracing::debug;

use crate::domain::error::AlphaCrossError;
use crate::domain::label_codec::{ClassifierSample, FEATURE_COUNT};
use crate::domain::predictor::PredictorConfig;
use crate::ports::classifier_port::Classifier;

type Tree = DecisionTreeClassifier<f64, i64, DenseMatrix<f64>, Vec<i64>>;

enum Member {
    Tree(Tree),
    /// Bootstrap resample held a single class.
    Constant(usize),
}

pub struct TreeEnsembleClassifier {
    n_trees: usize,
    max_depth: u16,
    seed: u64,
    n_classes: usize,
    members: Vec<Member>,
}

impl TreeEnsembleClassifier {
    pub fn new(n_trees: usize, max_depth: u16, seed: u64) -> Self {
        TreeEnsembleClassifier {
            n_trees: n_trees.max(1),
            max_depth,
            seed,
            n_classes: 0,
            members: Vec::new(),
        }
    }

    pub fn from_config(config: &PredictorConfig) -> Self {
        Self::new(config.n_trees, config.max_depth, config.seed)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn fit_member(&self, samples: &[ClassifierSample], idx: &[usize]) -> Result<Member, AlphaCrossError> {
        let y: Vec<i64> = idx.iter().map(|&i| samples[i].class_label as i64).collect();
        if let Some(&first) = y.first() {
            if y.iter().all(|&c| c == first) {
                return Ok(Member::Constant(first as usize));
            }
        }

        let rows: Vec<&[f64]> = idx.iter().map(|&i| samples[i].features.as_slice()).collect();
        let x = DenseMatrix::from_2d_array(&rows).map_err(classifier_error)?;
        let params = DecisionTreeClassifierParameters::default().with_max_depth(self.max_depth);
        let tree = DecisionTreeClassifier::fit(&x, &y, params).map_err(classifier_error)?;
        Ok(Member::Tree(tree))
    }
}

impl Classifier for TreeEnsembleClassifier {
    fn fit(&mut self, samples: &[ClassifierSample], n_classes: usize) -> Result<(), AlphaCrossError> {
        if samples.is_empty() {
            return Err(AlphaCrossError::Classifier {
                reason: "no training samples".to_string(),
            });
        }
        if let Some(bad) = samples.iter().find(|s| s.class_label >= n_classes) {
            return Err(AlphaCrossError::Classifier {
                reason: format!("class {} outside 0..{n_classes}", bad.class_label),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = samples.len();
        let mut members = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let idx: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            members.push(self.fit_member(samples, &idx)?);
        }

        debug!(
            trees = members.len(),
            samples = n,
            n_classes,
            max_depth = self.max_depth,
            "tree ensemble fitted"
        );
        self.members = members;
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> Result<Vec<f64>, AlphaCrossError> {
        if self.members.is_empty() {
            return Err(AlphaCrossError::Classifier {
                reason: "ensemble is not fitted".to_string(),
            });
        }
        let x = DenseMatrix::from_2d_array(&[features.as_slice()]).map_err(classifier_error)?;

        let mut votes = vec![0.0; self.n_classes];
        for member in &self.members {
            let class = match member {
                Member::Constant(c) => *c,
                Member::Tree(tree) => {
                    let predicted = tree.predict(&x).map_err(classifier_error)?;
                    match predicted.first() {
                        Some(&c) if c >= 0 => c as usize,
                        _ => continue,
                    }
                }
            };
            if let Some(v) = votes.get_mut(class) {
                *v += 1.0;
            }
        }

        let total: f64 = votes.iter().sum();
        if total == 0.0 {
            return Err(AlphaCrossError::Classifier {
                reason: "no member produced a vote".to_string(),
            });
        }
        Ok(votes.into_iter().map(|v| v / total).collect())
    }
}

fn classifier_error(err: smartcore::error::Failed) -> AlphaCrossError {
    AlphaCrossError::Classifier {
        reason: err.to_string(),
    }
}
