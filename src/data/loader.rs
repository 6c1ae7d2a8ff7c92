use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CatalogueError, Result};

use super::layout::{
    classify, mode_lines, mode_stride, ModeLine, FIRST_MODE_OFFSET, GLOBAL_EVIDENCE_LINE,
    GLOBAL_EVIDENCE_TOKEN, LOCAL_EVIDENCE_TOKEN, MODE_COUNT_LINE, MODE_COUNT_TOKEN, VALUE_TOKEN,
};
use super::model::{Catalogue, ModeRecord, ObjectRecord};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do when the header mode count disagrees with the modes found
/// while scanning the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeCountPolicy {
    /// Fail the file with [`CatalogueError::SchemaMismatch`].
    #[default]
    Strict,
    /// Keep the structurally parsed modes and log a warning.
    Informational,
}

/// Per-file parsing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// The object ID is the part of the file name before this marker.
    pub suffix_marker: String,
    pub mode_count_policy: ModeCountPolicy,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            suffix_marker: "_BANGS".to_string(),
            mode_count_policy: ModeCountPolicy::default(),
        }
    }
}

/// How a catalogue build reacts to a file that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return the first failure; no catalogue is produced.
    #[default]
    Abort,
    /// Leave the file out and list it in [`BuildReport::skipped`].
    Skip,
}

// ---------------------------------------------------------------------------
// Single statistics file
// ---------------------------------------------------------------------------

/// Object ID of a statistics file: its base name up to `marker`.
///
/// A name without the marker is used whole.
pub fn object_id_from_path(path: &Path, marker: &str) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    match name.find(marker) {
        Some(end) => name[..end].to_string(),
        None => name.into_owned(),
    }
}

/// Parse one statistics file into an [`ObjectRecord`] carrying `n_par`
/// values per mode and per estimate.
pub fn parse_stats_file(
    path: &Path,
    n_par: usize,
    options: &ParseOptions,
) -> Result<ObjectRecord> {
    let file = File::open(path).map_err(|e| CatalogueError::io(path, e))?;
    let id = object_id_from_path(path, &options.suffix_marker);
    parse_stats(BufReader::new(file), path, id, n_par, options)
}

/// Values collected for the mode currently being scanned.
#[derive(Debug, Default)]
struct ModeAccumulator {
    log_evidence: Option<f64>,
    posterior_mean: Vec<f64>,
    max_likelihood: Vec<f64>,
    max_a_posteriori: Vec<f64>,
}

impl ModeAccumulator {
    fn take(&mut self, path: &Path, line: usize) -> Result<ModeRecord> {
        let acc = std::mem::take(self);
        let log_evidence = acc.log_evidence.ok_or_else(|| {
            CatalogueError::parse(path, line, "mode without local log-evidence")
        })?;
        ModeRecord::new(
            log_evidence,
            acc.posterior_mean,
            acc.max_likelihood,
            acc.max_a_posteriori,
        )
    }
}

/// Scan the lines of a statistics file read from `reader`.
///
/// `path` only labels errors. Mode boundaries are found structurally: a mode
/// is complete when the scan reaches its last line, and lines after the last
/// complete mode are ignored.
pub(crate) fn parse_stats<R: BufRead>(
    reader: R,
    path: &Path,
    id: String,
    n_par: usize,
    options: &ParseOptions,
) -> Result<ObjectRecord> {
    let mut global_log_evidence = None;
    let mut header_mode_count = None;

    let mut modes = Vec::new();
    let mut acc = ModeAccumulator::default();
    let mut mode_start = FIRST_MODE_OFFSET;
    let last_offset = mode_lines(n_par);
    let mut n_lines = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CatalogueError::io(path, e))?;
        n_lines = i + 1;

        if i == GLOBAL_EVIDENCE_LINE {
            global_log_evidence = Some(token::<f64>(&line, GLOBAL_EVIDENCE_TOKEN, path, i)?);
        }
        if i == MODE_COUNT_LINE {
            header_mode_count = Some(token::<usize>(&line, MODE_COUNT_TOKEN, path, i)?);
        }

        let Some(offset) = i.checked_sub(mode_start) else {
            continue;
        };
        match classify(offset, n_par) {
            ModeLine::LocalEvidence => {
                acc.log_evidence = Some(token(&line, LOCAL_EVIDENCE_TOKEN, path, i)?);
            }
            ModeLine::PosteriorMean => {
                acc.posterior_mean.push(token(&line, VALUE_TOKEN, path, i)?);
            }
            ModeLine::MaxLikelihood => {
                acc.max_likelihood.push(token(&line, VALUE_TOKEN, path, i)?);
            }
            ModeLine::MaxAPosteriori => {
                acc.max_a_posteriori.push(token(&line, VALUE_TOKEN, path, i)?);
            }
            ModeLine::Other => {}
        }

        if offset == last_offset {
            modes.push(acc.take(path, i)?);
            mode_start += mode_stride(n_par);
        }
    }

    let global_log_evidence = global_log_evidence.ok_or_else(|| {
        CatalogueError::parse(path, GLOBAL_EVIDENCE_LINE, "file ends before the evidence")
    })?;
    let header_mode_count = header_mode_count.ok_or_else(|| {
        CatalogueError::parse(path, MODE_COUNT_LINE, "file ends before the mode count")
    })?;

    if n_lines > mode_start {
        log::warn!(
            "{}: ignoring {} line(s) after the last complete mode",
            path.display(),
            n_lines - mode_start
        );
    }

    if modes.len() != header_mode_count {
        match options.mode_count_policy {
            ModeCountPolicy::Strict => {
                return Err(CatalogueError::schema(
                    format!("mode count of {}", path.display()),
                    header_mode_count,
                    modes.len(),
                ));
            }
            ModeCountPolicy::Informational => log::warn!(
                "{}: header announces {} mode(s), {} found",
                path.display(),
                header_mode_count,
                modes.len()
            ),
        }
    }

    let mut object = ObjectRecord::new(id, global_log_evidence, header_mode_count);
    for mode in modes {
        object.push_mode(mode);
    }
    log::debug!(
        "{}: object '{}' with {} mode(s)",
        path.display(),
        object.id(),
        object.modes().len()
    );
    Ok(object)
}

fn token<T>(line: &str, index: usize, path: &Path, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = line.split_whitespace().nth(index).ok_or_else(|| {
        CatalogueError::parse(path, line_no, format!("missing token {index}"))
    })?;
    raw.parse::<T>().map_err(|e| {
        CatalogueError::parse(path, line_no, format!("token {index} '{raw}': {e}"))
    })
}

// ---------------------------------------------------------------------------
// Catalogue builder
// ---------------------------------------------------------------------------

/// A statistics file left out of a catalogue under [`FailurePolicy::Skip`].
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub id: String,
    pub error: CatalogueError,
}

/// Result of a catalogue build.
#[derive(Debug)]
pub struct BuildReport {
    pub catalogue: Catalogue,
    /// Always empty under [`FailurePolicy::Abort`].
    pub skipped: Vec<SkippedFile>,
}

/// Builds a [`Catalogue`] from a list of statistics files, one object per
/// file, in list order.
#[derive(Debug, Clone)]
pub struct CatalogueBuilder {
    name: String,
    n_par: usize,
    options: ParseOptions,
    failure_policy: FailurePolicy,
}

impl CatalogueBuilder {
    pub fn new(name: impl Into<String>, n_par: usize) -> Self {
        Self {
            name: name.into(),
            n_par,
            options: ParseOptions::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn parse_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Parse every file of `files` in order.
    ///
    /// Object IDs must be unique; a second file resolving to an existing ID is
    /// a [`CatalogueError::SchemaMismatch`] handled like any other failure.
    pub fn build<P: AsRef<Path>>(&self, files: &[P]) -> Result<BuildReport> {
        let mut objects: Vec<ObjectRecord> = Vec::with_capacity(files.len());
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut skipped = Vec::new();

        for path in files {
            let path = path.as_ref();
            let parsed = parse_stats_file(path, self.n_par, &self.options)
                .and_then(|object| ensure_unique(object, &seen));

            match parsed {
                Ok(object) => {
                    seen.insert(object.id().to_string(), path.to_path_buf());
                    objects.push(object);
                }
                Err(error) => match self.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Skip => {
                        log::warn!("skipping {}: {error}", path.display());
                        skipped.push(SkippedFile {
                            path: path.to_path_buf(),
                            id: object_id_from_path(path, &self.options.suffix_marker),
                            error,
                        });
                    }
                },
            }
        }

        log::info!(
            "catalogue '{}': {} object(s) built, {} skipped",
            self.name,
            objects.len(),
            skipped.len()
        );

        Ok(BuildReport {
            catalogue: Catalogue::from_parts(self.name.clone(), self.n_par, objects),
            skipped,
        })
    }
}

fn ensure_unique(object: ObjectRecord, seen: &HashMap<String, PathBuf>) -> Result<ObjectRecord> {
    match seen.get(object.id()) {
        Some(first) => Err(CatalogueError::schema(
            format!("object ID '{}'", object.id()),
            "a unique ID",
            format!("duplicate of {}", first.display()),
        )),
        None => Ok(object),
    }
}

/// Build a catalogue with default options, aborting on the first failure.
pub fn build_catalogue<P: AsRef<Path>>(
    name: impl Into<String>,
    files: &[P],
    n_par: usize,
) -> Result<Catalogue> {
    let report = CatalogueBuilder::new(name, n_par).build(files)?;
    Ok(report.catalogue)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::data::layout::render_stats;

    fn mode(ev: f64, base: f64, n_par: usize) -> ModeRecord {
        let values = |shift: f64| (0..n_par).map(|k| base + k as f64 + shift).collect();
        ModeRecord::new(ev, values(0.0), values(0.25), values(0.5)).unwrap()
    }

    fn parse_text(text: &str, n_par: usize, options: &ParseOptions) -> Result<ObjectRecord> {
        parse_stats(
            Cursor::new(text.as_bytes()),
            Path::new("mem_BANGS.dat"),
            "mem".to_string(),
            n_par,
            options,
        )
    }

    #[test]
    fn id_is_base_name_before_marker() {
        let path = Path::new("/data/run_BANGS/12345_BANGS_MNstats.dat");
        assert_eq!(object_id_from_path(path, "_BANGS"), "12345");
        assert_eq!(object_id_from_path(Path::new("77.dat"), "_BANGS"), "77.dat");
    }

    #[test]
    fn parses_two_modes_with_three_parameters() {
        let modes = vec![mode(-10.5, 1.0, 3), mode(-11.75, 20.0, 3)];
        let text = render_stats(-9.125, &modes);
        let obj = parse_text(&text, 3, &ParseOptions::default()).unwrap();

        assert_eq!(obj.global_log_evidence(), -9.125);
        assert_eq!(obj.header_mode_count(), 2);
        assert_eq!(obj.modes(), modes.as_slice());
    }

    #[test]
    fn non_numeric_token_reports_line() {
        let text = render_stats(-1.0, &[mode(-1.0, 1.0, 2)]);
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        let bad = FIRST_MODE_OFFSET + 4;
        lines[bad] = "2   not-a-number   0.1".to_string();
        let err = parse_text(&lines.join("\n"), 2, &ParseOptions::default()).unwrap_err();
        match err {
            CatalogueError::Parse { line, .. } => assert_eq!(line, bad),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_token_is_a_parse_failure() {
        let text = render_stats(-1.0, &[mode(-1.0, 1.0, 1)]);
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        lines[MODE_COUNT_LINE] = "Total Modes".to_string();
        let err = parse_text(&lines.join("\n"), 1, &ParseOptions::default()).unwrap_err();
        match err {
            CatalogueError::Parse { line, .. } => assert_eq!(line, MODE_COUNT_LINE),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_header_is_a_parse_failure() {
        let header = "Nested Sampling Global Log-Evidence : -1.0 +/- 0.1\n";
        let err = parse_text(header, 1, &ParseOptions::default()).unwrap_err();
        match err {
            CatalogueError::Parse { line, .. } => assert_eq!(line, MODE_COUNT_LINE),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn header_count_disagreement_under_both_policies() {
        let text = render_stats(-1.0, &[mode(-1.0, 1.0, 2)]);
        let text: Vec<String> = text
            .lines()
            .enumerate()
            .map(|(i, l)| match i {
                MODE_COUNT_LINE => "Total Modes Found:   3".to_string(),
                _ => l.to_string(),
            })
            .collect();
        let text = text.join("\n");

        let err = parse_text(&text, 2, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CatalogueError::SchemaMismatch { .. }));

        let lenient = ParseOptions {
            mode_count_policy: ModeCountPolicy::Informational,
            ..ParseOptions::default()
        };
        let obj = parse_text(&text, 2, &lenient).unwrap();
        assert_eq!(obj.header_mode_count(), 3);
        assert_eq!(obj.modes().len(), 1);
    }

    #[test]
    fn trailing_partial_mode_is_dropped() {
        let modes = vec![mode(-2.0, 1.0, 2), mode(-3.0, 5.0, 2)];
        let text = render_stats(-1.5, &modes);
        let lines: Vec<&str> = text.lines().collect();
        let cut = FIRST_MODE_OFFSET + mode_stride(2) + 6;
        let truncated = lines[..cut].join("\n");

        let lenient = ParseOptions {
            mode_count_policy: ModeCountPolicy::Informational,
            ..ParseOptions::default()
        };
        let obj = parse_text(&truncated, 2, &lenient).unwrap();
        assert_eq!(obj.modes(), &modes[..1]);
    }
}
