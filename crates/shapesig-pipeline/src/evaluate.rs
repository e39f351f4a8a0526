//! Nearest-neighbour matching over labelled descriptors.
//!
//! Nothing is fitted: a query takes the label of the stored sample at the
//! smallest valid Euclidean distance. [`leave_one_out`] scores a sample
//! set by matching each sample against all the others.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Descriptor, PipelineError};

/// A descriptor tagged with the class it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Class label, e.g. `"triangle"`.
    pub label: String,
    /// Descriptor of the sample image.
    pub descriptor: Descriptor,
}

/// The closest stored sample to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    /// Index of the matching sample.
    pub index: usize,
    /// The matching sample.
    pub sample: &'a Sample,
    /// Distance from the query.
    pub distance: f32,
}

/// Find the sample nearest to `query`.
///
/// The sample at index `skip` (if any) is excluded, as is every sample
/// whose descriptor cannot be compared with `query`. Ties keep the
/// earlier sample.
#[must_use]
pub fn nearest_neighbor<'a>(
    samples: &'a [Sample],
    query: &Descriptor,
    skip: Option<usize>,
) -> Option<Match<'a>> {
    samples
        .iter()
        .enumerate()
        .filter(|&(i, _)| Some(i) != skip)
        .filter_map(|(index, sample)| {
            query.distance(&sample.descriptor).map(|distance| Match {
                index,
                sample,
                distance,
            })
        })
        .fold(None, |best: Option<Match<'a>>, m| match best {
            Some(b) if b.distance <= m.distance => Some(b),
            _ => Some(m),
        })
}

/// Outcome of a leave-one-out run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Number of samples scored.
    pub total: usize,
    /// Samples whose nearest other sample shares their label.
    pub correct: usize,
    /// `actual label -> predicted label -> count`. A prediction of `None`
    /// means no other sample was comparable.
    pub confusion: BTreeMap<String, BTreeMap<Option<String>, usize>>,
}

impl Evaluation {
    /// Percentage of correct predictions (0 when nothing was scored).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }

    /// Sorted list of every label seen as actual or predicted.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .confusion
            .iter()
            .flat_map(|(actual, row)| {
                std::iter::once(actual.as_str()).chain(row.keys().flatten().map(String::as_str))
            })
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// How often `actual` was predicted as `predicted`.
    #[must_use]
    pub fn count(&self, actual: &str, predicted: Option<&str>) -> usize {
        self.confusion
            .get(actual)
            .and_then(|row| row.get(&predicted.map(str::to_owned)))
            .copied()
            .unwrap_or(0)
    }
}

/// Classify every sample by its nearest *other* sample and tally the
/// results.
///
/// # Errors
///
/// Returns [`PipelineError::NotEnoughSamples`] for fewer than two samples.
pub fn leave_one_out(samples: &[Sample]) -> Result<Evaluation, PipelineError> {
    if samples.len() < 2 {
        return Err(PipelineError::NotEnoughSamples(samples.len()));
    }

    let mut correct = 0;
    let mut confusion: BTreeMap<String, BTreeMap<Option<String>, usize>> = BTreeMap::new();
    for (i, sample) in samples.iter().enumerate() {
        let predicted = nearest_neighbor(samples, &sample.descriptor, Some(i))
            .map(|m| m.sample.label.clone());
        if predicted.as_deref() == Some(sample.label.as_str()) {
            correct += 1;
        }
        *confusion
            .entry(sample.label.clone())
            .or_default()
            .entry(predicted)
            .or_default() += 1;
    }

    Ok(Evaluation {
        total: samples.len(),
        correct,
        confusion,
    })
}
