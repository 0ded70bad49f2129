use depthcloud_core::{Colors, PointCloud};
use numpy::{PyArray2, PyArrayMethods, PyUntypedArrayMethods};
use pyo3::prelude::*;

#[pyclass(name = "PointCloud")]
#[derive(Debug, Clone)]
pub struct PyPointCloud {
    pub(crate) inner: PointCloud,
}

#[pymethods]
impl PyPointCloud {
    #[new]
    pub fn new() -> Self {
        Self {
            inner: PointCloud::new(),
        }
    }

    /// Create a PointCloud from an Nx3 NumPy array of positions and,
    /// optionally, an Nx3 uint8 array of colors.
    ///
    /// Accepts f32 or f64 positions. f64 arrays are cast to f32 automatically.
    /// Arrays must be C-contiguous (row-major).
    #[staticmethod]
    #[pyo3(signature = (array, colors = None))]
    pub fn from_numpy(
        array: &Bound<'_, pyo3::types::PyAny>,
        colors: Option<&Bound<'_, PyArray2<u8>>>,
    ) -> PyResult<Self> {
        let mut cloud = if let Ok(arr) = array.downcast::<PyArray2<f32>>() {
            let (data, n) = rows_of_three(arr)?;
            PointCloud::from_array(&data, n)
        } else if let Ok(arr) = array.downcast::<PyArray2<f64>>() {
            let (data, n) = rows_of_three(arr)?;
            let data: Vec<f32> = data.iter().map(|&v| v as f32).collect();
            PointCloud::from_array(&data, n)
        } else {
            return Err(pyo3::exceptions::PyTypeError::new_err(
                "expected NumPy array with dtype float32 or float64, shape (N, 3)",
            ));
        };

        if let Some(colors) = colors {
            let (data, n) = rows_of_three(colors)?;
            if n != cloud.len() {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "colors have {n} rows, positions have {}",
                    cloud.len()
                )));
            }
            let mut channels = Colors::with_capacity(n);
            for rgb in data.chunks_exact(3) {
                channels.push([rgb[0], rgb[1], rgb[2]]);
            }
            cloud.colors = Some(channels);
        }

        Ok(Self { inner: cloud })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.inner.schema().has_color()
    }

    pub fn is_dense(&self) -> bool {
        self.inner.is_dense()
    }

    pub fn to_numpy<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<f32>>> {
        let rows: Vec<Vec<f32>> = self.inner.iter_points().map(|p| p.to_vec()).collect();
        Ok(PyArray2::from_vec2_bound(py, &rows)?)
    }

    /// Nx3 uint8 colors, or None for an uncolored cloud.
    pub fn colors_numpy<'py>(&self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyArray2<u8>>>> {
        if !self.has_colors() {
            return Ok(None);
        }
        let rows: Vec<Vec<u8>> = (0..self.inner.len())
            .filter_map(|i| self.inner.color(i))
            .map(|c| c.to_vec())
            .collect();
        Ok(Some(PyArray2::from_vec2_bound(py, &rows)?))
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    pub fn __repr__(&self) -> String {
        format!(
            "PointCloud(n={}, colors={})",
            self.inner.len(),
            self.has_colors()
        )
    }
}

/// Copies a C-contiguous Nx3 array into a flat row-major vector.
fn rows_of_three<T: numpy::Element + Copy>(
    array: &Bound<'_, PyArray2<T>>,
) -> PyResult<(Vec<T>, usize)> {
    // Fortran-order arrays would be silently misread as row-major.
    if !array.is_c_contiguous() {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "array must be C-contiguous (row-major). \
             Use numpy.ascontiguousarray(arr) to convert.",
        ));
    }
    let readonly = array.readonly();
    let shape = readonly.shape();
    if shape.len() != 2 || shape[1] != 3 {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "expected shape (N, 3)",
        ));
    }
    let slice = readonly.as_slice().map_err(|_| {
        pyo3::exceptions::PyValueError::new_err("failed to read array as contiguous slice")
    })?;
    Ok((slice.to_vec(), shape[0]))
}
