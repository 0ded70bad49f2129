use crate::cloud::PyPointCloud;
use depthcloud_io::{DataMode, PcdError, WriteOptions};
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn to_py_err(e: PcdError) -> PyErr {
    match e {
        PcdError::Io(e) => pyo3::exceptions::PyIOError::new_err(e.to_string()),
        other => pyo3::exceptions::PyValueError::new_err(other.to_string()),
    }
}

#[pyfunction(name = "read_pcd")]
pub fn read_pcd_py(path: &str) -> PyResult<PyPointCloud> {
    let cloud = depthcloud_io::read_pcd(path).map_err(to_py_err)?;
    Ok(PyPointCloud { inner: cloud })
}

/// Returns the header of a PCD file as a dict.
#[pyfunction(name = "read_pcd_header")]
pub fn read_pcd_header_py<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyDict>> {
    let header = depthcloud_io::read_pcd_header(path).map_err(to_py_err)?;
    let dict = PyDict::new_bound(py);
    let fields: Vec<&str> = header.fields().iter().map(|f| f.name()).collect();
    dict.set_item("version", header.version().to_string())?;
    dict.set_item("fields", fields)?;
    dict.set_item("width", header.width())?;
    dict.set_item("height", header.height())?;
    dict.set_item("viewpoint", header.viewpoint().to_vec())?;
    dict.set_item("points", header.points())?;
    dict.set_item("dense", header.is_dense())?;
    dict.set_item("data", header.data_mode().to_string())?;
    Ok(dict)
}

/// Writes a binary PCD file, or an ascii one when `ascii=True`.
#[pyfunction(name = "write_pcd")]
#[pyo3(signature = (cloud, path, ascii = false, width = None, height = None))]
pub fn write_pcd_py(
    cloud: &PyPointCloud,
    path: &str,
    ascii: bool,
    width: Option<u32>,
    height: Option<u32>,
) -> PyResult<()> {
    let mode = if ascii {
        DataMode::Ascii
    } else {
        DataMode::Binary
    };
    let mut options = WriteOptions::default().with_mode(mode);
    if let (Some(w), Some(h)) = (width, height) {
        options = options.with_layout(w, h);
    }
    depthcloud_io::write_pcd_with(path, &cloud.inner, &options).map_err(to_py_err)
}
