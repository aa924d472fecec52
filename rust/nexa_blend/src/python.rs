use numpy::{IntoPyArray, PyArray1};
use pyo3::exceptions::PyIndexError;
use pyo3::prelude::*;

use crate::blender::{plan, wrap_local};
use crate::config::{BlendConfig, BuilderKind};
use crate::error::BlendError;
use crate::indices::BlendIndex;
use crate::stats::BlendStats;

/// Blends any Python objects supporting `len()` and integer indexing,
/// e.g. `datasets.Dataset` or `torch.utils.data.Dataset`.
#[pyclass(name = "DatasetBlender")]
pub struct PyDatasetBlender {
    datasets: Vec<PyObject>,
    weights: Vec<f64>,
    index: BlendIndex,
}

impl PyDatasetBlender {
    fn lengths(&self, py: Python<'_>) -> PyResult<Vec<usize>> {
        self.datasets.iter().map(|d| d.bind(py).len()).collect()
    }
}

#[pymethods]
impl PyDatasetBlender {
    #[new]
    #[pyo3(signature = (datasets, weights=None, builder="fast", allow_empty_sources=false))]
    fn new(
        py: Python<'_>,
        datasets: Vec<PyObject>,
        weights: Option<Vec<f64>>,
        builder: &str,
        allow_empty_sources: bool,
    ) -> PyResult<Self> {
        let lengths = datasets
            .iter()
            .map(|d| d.bind(py).len())
            .collect::<PyResult<Vec<usize>>>()?;
        let config = BlendConfig {
            weights,
            builder: builder.parse()?,
            allow_empty_sources,
        };

        let (weights, index) = py.allow_threads(|| plan(&lengths, &config))?;
        Ok(PyDatasetBlender {
            datasets,
            weights,
            index,
        })
    }

    fn __len__(&self) -> usize {
        self.index.len()
    }

    fn __getitem__(&self, py: Python<'_>, idx: isize) -> PyResult<PyObject> {
        let len = self.index.len();
        let position = resolve_index(idx, len).ok_or_else(|| {
            PyIndexError::new_err(format!(
                "Index {idx} out of range for blend of length {len}"
            ))
        })?;

        let (dataset, sample) = self
            .index
            .entry(position)
            .ok_or(BlendError::IndexOutOfRange {
                index: position,
                len,
            })?;
        let source = self.datasets[dataset].bind(py);
        let local = wrap_local(sample, source.len()?);
        Ok(source.get_item(local)?.unbind())
    }

    #[getter]
    fn dataset_index<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u32>> {
        self.index.dataset_index().to_vec().into_pyarray_bound(py)
    }

    #[getter]
    fn dataset_sample_index<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u64>> {
        self.index.sample_index().to_vec().into_pyarray_bound(py)
    }

    #[getter]
    fn weights(&self) -> Vec<f64> {
        self.weights.clone()
    }

    fn stats_json(&self, py: Python<'_>) -> PyResult<String> {
        let lengths = self.lengths(py)?;
        let stats = BlendStats::compute(&self.index, &self.weights, &lengths);
        Ok(stats.to_json()?)
    }
}

/// Python-style index into a sequence of `len`, counting back from the end
/// when negative.
fn resolve_index(idx: isize, len: usize) -> Option<usize> {
    let position = if idx < 0 {
        len.checked_sub(idx.unsigned_abs())?
    } else {
        idx as usize
    };
    (position < len).then_some(position)
}

/// Builds the raw blend arrays for already normalized `weights`.
#[pyfunction]
#[pyo3(signature = (weights, size, builder="fast"))]
pub fn build_blending_indices<'py>(
    py: Python<'py>,
    weights: Vec<f64>,
    size: usize,
    builder: &str,
) -> PyResult<(Bound<'py, PyArray1<u32>>, Bound<'py, PyArray1<u64>>)> {
    let kind: BuilderKind = builder.parse()?;
    if weights.is_empty() && size > 0 {
        return Err(BlendError::Configuration(format!(
            "cannot build {size} blend positions without weights"
        ))
        .into());
    }

    let index = py.allow_threads(|| kind.build(&weights, size));
    let (dataset_index, sample_index) = index.into_parts();
    Ok((
        dataset_index.into_pyarray_bound(py),
        sample_index.into_pyarray_bound(py),
    ))
}

#[pyfunction]
#[pyo3(signature = (weights, lengths))]
pub fn normalize_weights(weights: Option<Vec<f64>>, lengths: Vec<usize>) -> PyResult<Vec<f64>> {
    Ok(crate::weights::normalize_weights(weights.as_deref(), &lengths)?)
}
