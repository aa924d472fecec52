//! Nexa Blend - deterministic weighted blending of datasets

#[cfg(all(feature = "python", not(target_os = "windows")))]
use tikv_jemallocator::Jemalloc;

#[cfg(all(feature = "python", not(target_os = "windows")))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod batching;
pub mod blender;
pub mod config;
pub mod dataset;
pub mod error;
pub mod indices;
pub mod stats;
pub mod weights;

#[cfg(feature = "python")]
mod python;

pub use blender::DatasetBlender;
pub use config::{BlendConfig, BuilderKind};
pub use dataset::Dataset;
pub use error::{BlendError, Result};
pub use indices::{BlendIndex, FastBuilder, IndexBuilder, ReferenceBuilder};
pub use stats::{BlendStats, SourceStats};
pub use weights::normalize_weights;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn nexa_blend(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyDatasetBlender>()?;
    m.add_function(wrap_pyfunction!(python::build_blending_indices, m)?)?;
    m.add_function(wrap_pyfunction!(python::normalize_weights, m)?)?;
    Ok(())
}
