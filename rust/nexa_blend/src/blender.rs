use tracing::{debug, info, warn};

use crate::config::BlendConfig;
use crate::dataset::Dataset;
use crate::error::{BlendError, Result};
use crate::indices::BlendIndex;
use crate::weights::normalize_weights;

/// A fixed-length view interleaving several datasets by weight.
///
/// Position `i` resolves to one dataset and a local index inside it. A
/// dataset asked for more samples than it holds starts over from its first
/// sample. The index is computed once at construction and never changes.
///
/// ```
/// use nexa_blend::{Dataset, DatasetBlender};
///
/// let small = vec!["a0", "a1"];
/// let large = vec!["b0", "b1", "b2", "b3", "b4", "b5"];
/// let blend = DatasetBlender::new(vec![&small, &large], Some(&[0.5, 0.5])).unwrap();
///
/// assert_eq!(blend.len(), 8);
/// let drawn: Vec<_> = (0..blend.len()).map(|i| blend.get(i)).collect();
/// assert_eq!(drawn, ["a0", "b0", "a1", "b1", "a0", "b2", "a1", "b3"]);
/// ```
#[derive(Debug, Clone)]
pub struct DatasetBlender<D> {
    datasets: Vec<D>,
    weights: Vec<f64>,
    index: BlendIndex,
}

impl<D: Dataset> DatasetBlender<D> {
    /// Blends `datasets`, weighting by length when `weights` is `None`.
    pub fn new(datasets: Vec<D>, weights: Option<&[f64]>) -> Result<Self> {
        Self::with_config(datasets, &BlendConfig::new(weights.map(<[f64]>::to_vec)))
    }

    pub fn with_config(datasets: Vec<D>, config: &BlendConfig) -> Result<Self> {
        let lengths: Vec<usize> = datasets.iter().map(Dataset::len).collect();
        let (weights, index) = plan(&lengths, config)?;
        Ok(DatasetBlender {
            datasets,
            weights,
            index,
        })
    }

    pub fn datasets(&self) -> &[D] {
        &self.datasets
    }

    /// Normalized weights, summing to 1.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn index(&self) -> &BlendIndex {
        &self.index
    }

    pub fn dataset_index(&self) -> &[u32] {
        self.index.dataset_index()
    }

    pub fn sample_index(&self) -> &[u64] {
        self.index.sample_index()
    }

    /// `(dataset, local index)` for `position`, with the local index
    /// wrapped by the dataset's current length.
    pub fn locate(&self, position: usize) -> Option<(usize, usize)> {
        let (dataset, sample) = self.index.entry(position)?;
        Some((dataset, wrap_local(sample, self.datasets[dataset].len())))
    }

    pub fn try_get(&self, position: usize) -> Result<D::Item> {
        let (dataset, local) = self
            .locate(position)
            .ok_or(BlendError::IndexOutOfRange {
                index: position,
                len: self.index.len(),
            })?;
        Ok(self.datasets[dataset].get(local))
    }

    pub fn iter(&self) -> impl Iterator<Item = D::Item> + '_ {
        (0..self.index.len()).map(move |position| self.get(position))
    }
}

impl<D: Dataset> Dataset for DatasetBlender<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        self.index.len()
    }

    /// # Panics
    /// If `position >= len()`.
    fn get(&self, position: usize) -> D::Item {
        match self.try_get(position) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }
}

pub(crate) fn wrap_local(sample: u64, len: usize) -> usize {
    (sample % len.max(1) as u64) as usize
}

/// Normalizes weights and builds the index for datasets of `lengths`.
pub(crate) fn plan(lengths: &[usize], config: &BlendConfig) -> Result<(Vec<f64>, BlendIndex)> {
    if lengths.is_empty() {
        return Err(BlendError::Configuration(
            "at least one dataset is required".to_string(),
        ));
    }

    let size = lengths
        .iter()
        .try_fold(0usize, |total, &len| total.checked_add(len))
        .ok_or_else(|| {
            BlendError::Configuration(format!(
                "total length of {} datasets overflows usize",
                lengths.len()
            ))
        })?;
    let weights = normalize_weights(config.weights.as_deref(), lengths)?;
    debug!(?weights, ?lengths, "normalized blend weights");

    check_positive_weights(lengths, &weights, config.allow_empty_sources)?;

    let index = config.builder.build(&weights, size);
    let counts = index.counts();
    check_allocations(lengths, &weights, &counts, config.allow_empty_sources)?;

    info!(
        datasets = lengths.len(),
        size,
        builder = %config.builder,
        "built blend index"
    );
    Ok((weights, index))
}

fn check_positive_weights(lengths: &[usize], weights: &[f64], allow_empty: bool) -> Result<()> {
    for (dataset, (&len, &weight)) in lengths.iter().zip(weights).enumerate() {
        if len == 0 && weight > 0.0 {
            if !allow_empty {
                return Err(BlendError::EmptySource { dataset, weight });
            }
            warn!(dataset, weight, "empty dataset holds positive weight");
        }
    }
    Ok(())
}

// Exact ties can hand a slot to a zero-weight dataset, so empty datasets are
// checked again against what they actually received.
fn check_allocations(
    lengths: &[usize],
    weights: &[f64],
    counts: &[u64],
    allow_empty: bool,
) -> Result<()> {
    for (dataset, (&len, &allocated)) in lengths.iter().zip(counts).enumerate() {
        if len == 0 && allocated > 0 && !allow_empty {
            return Err(BlendError::EmptySource {
                dataset,
                weight: weights[dataset],
            });
        }
        if len > 0 && allocated > len as u64 {
            warn!(
                dataset,
                len,
                allocated,
                "dataset wraps around, samples will repeat"
            );
        }
    }
    Ok(())
}
