use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{CatalogueError, Result};

// ---------------------------------------------------------------------------
// ParamInfo – display attributes of one fitted parameter
// ---------------------------------------------------------------------------

/// Display attributes of a fitted parameter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParamInfo {
    pub label: String,
    #[serde(default)]
    pub range: Option<[f64; 2]>,
    /// Plot the parameter on a log10 axis.
    #[serde(default)]
    pub log: bool,
}

// ---------------------------------------------------------------------------
// ParamSpec – ordered parameter metadata
// ---------------------------------------------------------------------------

/// Parameter metadata in file order, loaded once and passed by reference.
///
/// Expected JSON schema (keys are parameter names, order is significant):
///
/// ```json
/// {
///   "mass": { "label": "log(M/M_sun)", "range": [1e7, 1e12], "log": true },
///   "tauV_eff": { "label": "tau_V", "range": [0.0, 3.0] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSpec {
    entries: Vec<(String, ParamInfo)>,
}

impl ParamSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| CatalogueError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path)
    }

    fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let json_err = |source| CatalogueError::Json {
            path: path.to_path_buf(),
            source,
        };
        // serde_json is built with `preserve_order`, so the map keeps file order.
        let root: Map<String, JsonValue> = serde_json::from_reader(reader).map_err(json_err)?;

        let entries = root
            .into_iter()
            .map(|(name, value)| {
                let info: ParamInfo = serde_json::from_value(value).map_err(json_err)?;
                Ok((name, info))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ParamSpec { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameter names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ParamInfo> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, info)| info)
    }

    /// Axis range of `name`, converted to log10 when the parameter is flagged `log`.
    pub fn axis_range(&self, name: &str) -> Option<[f64; 2]> {
        let info = self.get(name)?;
        let [lo, hi] = info.range?;
        if info.log {
            Some([lo.log10(), hi.log10()])
        } else {
            Some([lo, hi])
        }
    }
}
