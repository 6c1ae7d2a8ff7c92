use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};

use super::model::{Catalogue, ObjectRecord};

/// Tag identifying a persisted catalogue.
pub const FORMAT_TAG: &str = "multinest-catalogue";

/// Version of the persisted layout written by [`save`].
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Persisted shape
// ---------------------------------------------------------------------------

/// Expected JSON layout:
///
/// ```json
/// {
///   "format": "multinest-catalogue",
///   "version": 1,
///   "name": "March_2016",
///   "n_par": 2,
///   "objects": [
///     {
///       "id": "100",
///       "global_log_evidence": -12.5,
///       "header_mode_count": 1,
///       "modes": [
///         {
///           "log_evidence": -12.5,
///           "posterior_mean": [1.0, 2.0],
///           "max_likelihood": [1.1, 2.1],
///           "max_a_posteriori": [1.05, 2.05]
///         }
///       ]
///     }
///   ]
/// }
/// ```
#[derive(Serialize)]
struct StoredRef<'a> {
    format: &'a str,
    version: u32,
    name: &'a str,
    n_par: usize,
    objects: &'a [ObjectRecord],
}

#[derive(Deserialize)]
struct Stored {
    format: String,
    version: u32,
    name: String,
    n_par: usize,
    objects: Vec<ObjectRecord>,
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

/// Write `catalogue` to `path` as one self-contained JSON document.
///
/// Non-finite floats have no exact JSON representation and are rejected
/// before anything is written. The document goes to a sibling temporary file
/// that is renamed over `path` once complete, so an existing catalogue is
/// either fully replaced or left as it was.
pub fn save(catalogue: &Catalogue, path: &Path) -> Result<()> {
    for object in catalogue.objects() {
        if !object.global_log_evidence().is_finite() {
            return Err(CatalogueError::NonFinite {
                id: object.id().to_string(),
                field: "global_log_evidence".to_string(),
            });
        }
        for (m, mode) in object.modes().iter().enumerate() {
            if let Some(field) = mode.first_non_finite() {
                return Err(CatalogueError::NonFinite {
                    id: object.id().to_string(),
                    field: format!("mode {m} {field}"),
                });
            }
        }
    }

    let stored = StoredRef {
        format: FORMAT_TAG,
        version: FORMAT_VERSION,
        name: catalogue.name(),
        n_par: catalogue.n_par(),
        objects: catalogue.objects(),
    };

    let tmp = temporary_path(path);
    if let Err(e) = write_document(&stored, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(CatalogueError::io(path, e));
    }

    log::info!(
        "saved catalogue '{}' ({} objects) to {}",
        catalogue.name(),
        catalogue.len(),
        path.display()
    );
    Ok(())
}

/// `<path>.tmp` next to the destination, so the final rename stays on one
/// filesystem.
fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_document(stored: &StoredRef<'_>, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| CatalogueError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, stored).map_err(|e| CatalogueError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| CatalogueError::io(path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| CatalogueError::io(path, e))
}

/// Read a catalogue written by [`save`].
///
/// The format tag, the version and the length of every per-parameter
/// sequence against the stored `n_par` are checked.
pub fn load(path: &Path) -> Result<Catalogue> {
    let file = File::open(path).map_err(|e| CatalogueError::io(path, e))?;
    let stored: Stored =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| CatalogueError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;

    if stored.format != FORMAT_TAG {
        return Err(CatalogueError::schema("format tag", FORMAT_TAG, stored.format));
    }
    if stored.version != FORMAT_VERSION {
        return Err(CatalogueError::schema(
            "format version",
            FORMAT_VERSION,
            stored.version,
        ));
    }

    for object in &stored.objects {
        for (m, mode) in object.modes().iter().enumerate() {
            // ModeRecord deserialises field by field, so the equal-length
            // invariant is only enforced here.
            let lengths = [
                mode.n_par(),
                mode.max_likelihood().len(),
                mode.max_a_posteriori().len(),
            ];
            if let Some(&found) = lengths.iter().find(|&&len| len != stored.n_par) {
                return Err(CatalogueError::schema(
                    format!("parameter count of object '{}' mode {m}", object.id()),
                    stored.n_par,
                    found,
                ));
            }
        }
    }

    log::info!(
        "loaded catalogue '{}' ({} objects) from {}",
        stored.name,
        stored.objects.len(),
        path.display()
    );
    Ok(Catalogue::from_parts(stored.name, stored.n_par, stored.objects))
}

/// [`load`], additionally requiring the stored `n_par` to equal `n_par`.
pub fn load_expecting(path: &Path, n_par: usize) -> Result<Catalogue> {
    let catalogue = load(path)?;
    if catalogue.n_par() != n_par {
        return Err(CatalogueError::schema("n_par", n_par, catalogue.n_par()));
    }
    Ok(catalogue)
}
