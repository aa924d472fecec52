//! Blend index construction.
//!
//! Position `i` of a blend draws from the dataset whose running allocation
//! lags furthest behind its target `weight * max(i, 1)`. Ties go to the
//! lowest dataset index. The walk is sequential since every pick depends on
//! all earlier ones.

use sha2::{Digest, Sha256};

/// The two parallel arrays describing a blend.
///
/// `sample_index[i]` is the number of earlier positions assigned to
/// `dataset_index[i]`, before any wraparound by dataset length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlendIndex {
    num_datasets: usize,
    dataset_index: Vec<u32>,
    sample_index: Vec<u64>,
}

impl BlendIndex {
    pub fn len(&self) -> usize {
        self.dataset_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset_index.is_empty()
    }

    /// Number of weights the index was built from.
    pub fn num_datasets(&self) -> usize {
        self.num_datasets
    }

    pub fn dataset_index(&self) -> &[u32] {
        &self.dataset_index
    }

    pub fn sample_index(&self) -> &[u64] {
        &self.sample_index
    }

    /// `(dataset, unwrapped sample index)` at `position`.
    pub fn entry(&self, position: usize) -> Option<(usize, u64)> {
        let dataset = *self.dataset_index.get(position)?;
        Some((dataset as usize, self.sample_index[position]))
    }

    /// Number of positions assigned to each dataset.
    pub fn counts(&self) -> Vec<u64> {
        let mut counts = vec![0u64; self.num_datasets];
        for &dataset in &self.dataset_index {
            counts[dataset as usize] += 1;
        }
        counts
    }

    /// Hex SHA-256 over both arrays, little-endian.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.len() as u64).to_le_bytes());
        for dataset in &self.dataset_index {
            hasher.update(dataset.to_le_bytes());
        }
        for sample in &self.sample_index {
            hasher.update(sample.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn into_parts(self) -> (Vec<u32>, Vec<u64>) {
        (self.dataset_index, self.sample_index)
    }
}

/// Builds a [`BlendIndex`] of `size` positions from normalized weights.
///
/// Implementations must agree bit for bit; they differ only in speed.
/// `weights` must be non-empty whenever `size > 0`.
pub trait IndexBuilder {
    fn build(&self, weights: &[f64], size: usize) -> BlendIndex;
}

/// Direct form of the greedy loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBuilder;

impl IndexBuilder for ReferenceBuilder {
    fn build(&self, weights: &[f64], size: usize) -> BlendIndex {
        assert!(
            size == 0 || !weights.is_empty(),
            "cannot build {size} blend positions without weights"
        );

        let mut dataset_index = Vec::with_capacity(size);
        let mut sample_index = Vec::with_capacity(size);
        let mut allocated = vec![0u64; weights.len()];

        for i in 0..size {
            let scale = i.max(1) as f64;
            let mut best = 0;
            let mut best_error = weights[0] * scale - allocated[0] as f64;

            for (k, (&weight, &count)) in weights.iter().zip(&allocated).enumerate() {
                let error = weight * scale - count as f64;
                if error > best_error {
                    best_error = error;
                    best = k;
                }
            }

            dataset_index.push(best as u32);
            sample_index.push(allocated[best]);
            allocated[best] += 1;
        }

        BlendIndex {
            num_datasets: weights.len(),
            dataset_index,
            sample_index,
        }
    }
}

/// Same arithmetic as [`ReferenceBuilder`] with a tighter inner loop.
///
/// Counters are kept as `f64`, which is exact below 2^53, so no int to
/// float conversion happens per comparison. A single dataset skips the
/// search entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastBuilder;

impl IndexBuilder for FastBuilder {
    fn build(&self, weights: &[f64], size: usize) -> BlendIndex {
        assert!(
            size == 0 || !weights.is_empty(),
            "cannot build {size} blend positions without weights"
        );

        if weights.len() == 1 {
            return BlendIndex {
                num_datasets: 1,
                dataset_index: vec![0; size],
                sample_index: (0..size as u64).collect(),
            };
        }

        let mut dataset_index = vec![0u32; size];
        let mut sample_index = vec![0u64; size];
        let mut allocated = vec![0.0f64; weights.len()];

        for (i, (slot_dataset, slot_sample)) in dataset_index
            .iter_mut()
            .zip(sample_index.iter_mut())
            .enumerate()
        {
            let scale = i.max(1) as f64;
            let mut best = 0;
            let mut best_error = weights[0] * scale - allocated[0];

            for (k, (&weight, &count)) in weights.iter().zip(&allocated).enumerate().skip(1) {
                let error = weight * scale - count;
                if error > best_error {
                    best_error = error;
                    best = k;
                }
            }

            *slot_dataset = best as u32;
            *slot_sample = allocated[best] as u64;
            allocated[best] += 1.0;
        }

        BlendIndex {
            num_datasets: weights.len(),
            dataset_index,
            sample_index,
        }
    }
}
