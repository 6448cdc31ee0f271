//! Flat text output: one line per scored test point
//!
//! ```text
//!   x₀ x₁ ... f₀ f₁ ... quality flag
//! ```

use crate::topology::PointPersistenceData;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot write results to {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Write one line per point to `writer`.
pub fn write_results<W: Write>(writer: &mut W, data: &[PointPersistenceData]) -> io::Result<()> {
    for point in data {
        writeln!(writer, "{}", point)?;
    }
    writer.flush()
}

/// Create (or truncate) `path` and write the results into it.
pub fn write_results_to_file(path: &Path, data: &[PointPersistenceData]) -> Result<(), OutputError> {
    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    write_results(&mut BufWriter::new(file), data).map_err(io_error)
}
