use rayon::prelude::*;

use crate::blender::DatasetBlender;
use crate::dataset::Dataset;
use crate::error::Result;

impl<D> DatasetBlender<D>
where
    D: Dataset + Sync,
    D::Item: Send,
{
    /// Fetches `positions` in parallel, preserving their order.
    ///
    /// Fails as a whole if any position is out of range.
    pub fn get_batch(&self, positions: &[usize]) -> Result<Vec<D::Item>> {
        positions
            .par_iter()
            .map(|&position| self.try_get(position))
            .collect()
    }

    /// Fetches the contiguous batch `batch` of size `batch_size`; the last
    /// batch may be short.
    pub fn get_range_batch(&self, batch: usize, batch_size: usize) -> Result<Vec<D::Item>> {
        let start = batch.saturating_mul(batch_size).min(self.len());
        let end = start.saturating_add(batch_size).min(self.len());
        (start..end)
            .into_par_iter()
            .map(|position| self.try_get(position))
            .collect()
    }
}
