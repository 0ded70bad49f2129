#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod cloud;
mod io;

#[pymodule]
fn depthcloud(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<cloud::PyPointCloud>()?;

    m.add_function(wrap_pyfunction!(io::read_pcd_py, m)?)?;
    m.add_function(wrap_pyfunction!(io::read_pcd_header_py, m)?)?;
    m.add_function(wrap_pyfunction!(io::write_pcd_py, m)?)?;

    Ok(())
}
