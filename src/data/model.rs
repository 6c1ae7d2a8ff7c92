use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};
use crate::matcher::match_ids;

// ---------------------------------------------------------------------------
// ModeRecord – one posterior mode of one object's fit
// ---------------------------------------------------------------------------

/// Summary statistics of a single posterior mode.
///
/// The three per-parameter sequences always have the same length, which is
/// the `n_par` of the owning [`Catalogue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRecord {
    log_evidence: f64,
    posterior_mean: Vec<f64>,
    max_likelihood: Vec<f64>,
    max_a_posteriori: Vec<f64>,
}

impl ModeRecord {
    /// Build a mode, rejecting sequences of unequal length.
    pub fn new(
        log_evidence: f64,
        posterior_mean: Vec<f64>,
        max_likelihood: Vec<f64>,
        max_a_posteriori: Vec<f64>,
    ) -> Result<Self> {
        let n = posterior_mean.len();
        if max_likelihood.len() != n {
            return Err(CatalogueError::schema(
                "max_likelihood length",
                n,
                max_likelihood.len(),
            ));
        }
        if max_a_posteriori.len() != n {
            return Err(CatalogueError::schema(
                "max_a_posteriori length",
                n,
                max_a_posteriori.len(),
            ));
        }
        Ok(ModeRecord {
            log_evidence,
            posterior_mean,
            max_likelihood,
            max_a_posteriori,
        })
    }

    /// Local (per-mode) log-evidence.
    pub fn log_evidence(&self) -> f64 {
        self.log_evidence
    }

    pub fn posterior_mean(&self) -> &[f64] {
        &self.posterior_mean
    }

    pub fn max_likelihood(&self) -> &[f64] {
        &self.max_likelihood
    }

    pub fn max_a_posteriori(&self) -> &[f64] {
        &self.max_a_posteriori
    }

    /// Number of parameters carried by this mode.
    pub fn n_par(&self) -> usize {
        self.posterior_mean.len()
    }

    /// Name of the first non-finite field, if any.
    pub(crate) fn first_non_finite(&self) -> Option<&'static str> {
        if !self.log_evidence.is_finite() {
            return Some("log_evidence");
        }
        [
            ("posterior_mean", &self.posterior_mean),
            ("max_likelihood", &self.max_likelihood),
            ("max_a_posteriori", &self.max_a_posteriori),
        ]
        .into_iter()
        .find(|(_, values)| values.iter().any(|v| !v.is_finite()))
        .map(|(name, _)| name)
    }
}

// ---------------------------------------------------------------------------
// ObjectRecord – one astronomical object's fit result
// ---------------------------------------------------------------------------

/// Fit result of one object: global evidence plus its modes in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    id: String,
    global_log_evidence: f64,
    /// Mode count as stated by the file header (line 5).
    header_mode_count: usize,
    modes: Vec<ModeRecord>,
}

impl ObjectRecord {
    pub(crate) fn new(id: String, global_log_evidence: f64, header_mode_count: usize) -> Self {
        ObjectRecord {
            id,
            global_log_evidence,
            header_mode_count,
            modes: Vec::new(),
        }
    }

    pub(crate) fn push_mode(&mut self, mode: ModeRecord) {
        self.modes.push(mode);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn global_log_evidence(&self) -> f64 {
        self.global_log_evidence
    }

    pub fn header_mode_count(&self) -> usize {
        self.header_mode_count
    }

    pub fn modes(&self) -> &[ModeRecord] {
        &self.modes
    }
}

// ---------------------------------------------------------------------------
// Catalogue – the complete set of objects of one batch
// ---------------------------------------------------------------------------

/// A finalised catalogue. Produced either by
/// [`CatalogueBuilder`](crate::data::loader::CatalogueBuilder) or by
/// [`load`](crate::data::store::load); it is read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    name: String,
    n_par: usize,
    objects: Vec<ObjectRecord>,
}

impl Catalogue {
    pub(crate) fn from_parts(name: String, n_par: usize, objects: Vec<ObjectRecord>) -> Self {
        Catalogue {
            name,
            n_par,
            objects,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_par(&self) -> usize {
        self.n_par
    }

    /// Objects in input-list order.
    pub fn objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by its ID.
    pub fn get(&self, id: &str) -> Option<&ObjectRecord> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    /// Object IDs parsed as integers, in catalogue order.
    pub fn numeric_ids(&self) -> Result<Vec<i64>> {
        self.objects
            .iter()
            .map(|obj| {
                obj.id
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| CatalogueError::InvalidId { id: obj.id.clone() })
            })
            .collect()
    }

    /// Align this catalogue against an observed ID list.
    ///
    /// Returns `(catalogue_indices, observed_indices)` such that
    /// `self.objects()[c[k]]` and `observed_ids[o[k]]` carry the same ID.
    pub fn match_observed(
        &self,
        observed_ids: &[i64],
        assume_sorted: bool,
    ) -> Result<(Vec<usize>, Vec<usize>)> {
        let ids = self.numeric_ids()?;
        match_ids(&ids, observed_ids, assume_sorted)
    }
}
