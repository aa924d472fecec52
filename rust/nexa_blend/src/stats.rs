use serde::{Deserialize, Serialize};

use crate::blender::DatasetBlender;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::indices::BlendIndex;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub dataset: usize,
    pub length: usize,
    pub weight: f64,
    pub allocated: u64,
    /// Fraction of the blend drawn from this dataset.
    pub realized: f64,
    /// Passes over the dataset, `allocated / length`.
    pub epochs: f64,
    /// Largest `|allocated - weight * prefix|` over all prefixes.
    pub max_discrepancy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendStats {
    pub size: usize,
    pub sources: Vec<SourceStats>,
    pub max_discrepancy: f64,
    pub fingerprint: String,
}

impl BlendStats {
    /// # Panics
    /// If `weights` or `lengths` do not hold one entry per dataset of `index`.
    pub fn compute(index: &BlendIndex, weights: &[f64], lengths: &[usize]) -> Self {
        assert_eq!(
            lengths.len(),
            index.num_datasets(),
            "expected one length per blended dataset"
        );
        let size = index.len();
        let counts = index.counts();
        let discrepancy = prefix_discrepancy(index, weights);

        let sources: Vec<SourceStats> = weights
            .iter()
            .zip(lengths)
            .zip(counts.iter().zip(&discrepancy))
            .enumerate()
            .map(|(dataset, ((&weight, &length), (&allocated, &max_discrepancy)))| SourceStats {
                dataset,
                length,
                weight,
                allocated,
                realized: if size == 0 { 0.0 } else { allocated as f64 / size as f64 },
                epochs: match (allocated, length) {
                    (0, _) => 0.0,
                    (_, 0) => f64::INFINITY,
                    _ => allocated as f64 / length as f64,
                },
                max_discrepancy,
            })
            .collect();

        let max_discrepancy = discrepancy.iter().copied().fold(0.0, f64::max);

        BlendStats {
            size,
            sources,
            max_discrepancy,
            fingerprint: index.fingerprint(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Per dataset, the largest gap between its running count and its target
/// `weight * (p + 1)` after each prefix of length `p + 1`.
///
/// # Panics
/// If `weights` does not hold one entry per dataset of `index`.
pub fn prefix_discrepancy(index: &BlendIndex, weights: &[f64]) -> Vec<f64> {
    assert_eq!(
        weights.len(),
        index.num_datasets(),
        "expected one weight per blended dataset"
    );
    let mut counts = vec![0u64; weights.len()];
    let mut worst = vec![0.0f64; weights.len()];

    for (p, &dataset) in index.dataset_index().iter().enumerate() {
        counts[dataset as usize] += 1;
        let prefix = (p + 1) as f64;
        for ((worst, &count), &weight) in worst.iter_mut().zip(&counts).zip(weights) {
            let gap = (count as f64 - weight * prefix).abs();
            if gap > *worst {
                *worst = gap;
            }
        }
    }

    worst
}

impl<D: Dataset> DatasetBlender<D> {
    pub fn stats(&self) -> BlendStats {
        let lengths: Vec<usize> = self.datasets().iter().map(Dataset::len).collect();
        BlendStats::compute(self.index(), self.weights(), &lengths)
    }
}
