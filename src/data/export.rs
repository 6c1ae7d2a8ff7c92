use std::path::Path;

use crate::error::{CatalogueError, Result};

use super::model::Catalogue;
use super::params::ParamSpec;

/// Write the catalogue as a flat CSV table, one row per (object, mode).
///
/// Columns: `ID`, `mode` (1-based), `global_log_evidence`, `log_evidence`,
/// then `<name>_mean`, `<name>_ml`, `<name>_map` for every parameter. Names
/// come from `params` if given, otherwise `p1..pN`.
pub fn export_csv(catalogue: &Catalogue, params: Option<&ParamSpec>, path: &Path) -> Result<()> {
    let names = parameter_names(catalogue.n_par(), params)?;
    let csv_err = |source| CatalogueError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

    let mut header: Vec<String> = ["ID", "mode", "global_log_evidence", "log_evidence"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    for name in &names {
        header.push(format!("{name}_mean"));
        header.push(format!("{name}_ml"));
        header.push(format!("{name}_map"));
    }
    writer.write_record(&header).map_err(csv_err)?;

    let mut rows = 0usize;
    for object in catalogue.objects() {
        for (m, mode) in object.modes().iter().enumerate() {
            let mut record = vec![
                object.id().to_string(),
                (m + 1).to_string(),
                object.global_log_evidence().to_string(),
                mode.log_evidence().to_string(),
            ];
            for k in 0..catalogue.n_par() {
                record.push(mode.posterior_mean()[k].to_string());
                record.push(mode.max_likelihood()[k].to_string());
                record.push(mode.max_a_posteriori()[k].to_string());
            }
            writer.write_record(&record).map_err(csv_err)?;
            rows += 1;
        }
    }
    writer.flush().map_err(|e| CatalogueError::io(path, e))?;

    log::info!("exported {rows} mode row(s) to {}", path.display());
    Ok(())
}

fn parameter_names(n_par: usize, params: Option<&ParamSpec>) -> Result<Vec<String>> {
    match params {
        Some(spec) if spec.len() != n_par => Err(CatalogueError::schema(
            "parameter names",
            n_par,
            spec.len(),
        )),
        Some(spec) => Ok(spec.names().map(str::to_string).collect()),
        None => Ok((1..=n_par).map(|k| format!("p{k}")).collect()),
    }
}
