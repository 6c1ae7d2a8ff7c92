//! Fixed-offset layout of a MultiNest statistics file.
//!
//! The format is produced by the fitter and has no version field, so the
//! offsets below are contractual constants. Line and token indices are
//! zero-based; tokens are whitespace-delimited.
//!
//! ```text
//!  0  Nested Sampling Global Log-Evidence : <ev> +/- <err>    token 5
//!  5  Total Modes Found: <n>                                 token 3
//! 10  Local Log-Evidence <ev> +/- <err>                       token 2   ┐
//!     ...posterior mean, one line per parameter               token 1   │ 8 + 3 n_par
//!     ...maximum likelihood, one line per parameter           token 1   │ lines
//!     ...maximum a posteriori, one line per parameter         token 1   ┘
//!     5 lines later the next mode starts
//! ```

use std::fmt::Write as _;

use super::model::ModeRecord;

pub const GLOBAL_EVIDENCE_LINE: usize = 0;
pub const GLOBAL_EVIDENCE_TOKEN: usize = 5;

pub const MODE_COUNT_LINE: usize = 5;
pub const MODE_COUNT_TOKEN: usize = 3;

/// Line of the first mode's local evidence.
pub const FIRST_MODE_OFFSET: usize = 10;

/// Non-parameter lines in one mode block (evidence, separators, titles).
pub const HEADER_LINES: usize = 8;

/// Lines between the end of one mode block and the start of the next.
pub const MODE_GAP_LINES: usize = 5;

pub const LOCAL_EVIDENCE_TOKEN: usize = 2;
pub const VALUE_TOKEN: usize = 1;

// Region starts relative to the mode start, before adding the parameter rows
// of the preceding regions.
const POSTERIOR_MEAN_OFFSET: usize = 3;
const MAX_LIKELIHOOD_OFFSET: usize = 6;
const MAX_A_POSTERIORI_OFFSET: usize = 9;

/// Offset from a mode's start to its last line, which is also the last
/// maximum-a-posteriori row.
pub fn mode_lines(n_par: usize) -> usize {
    HEADER_LINES + 3 * n_par
}

/// Distance between the starts of two consecutive modes.
pub fn mode_stride(n_par: usize) -> usize {
    mode_lines(n_par) + MODE_GAP_LINES
}

/// What a line inside a mode block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeLine {
    LocalEvidence,
    PosteriorMean,
    MaxLikelihood,
    MaxAPosteriori,
    Other,
}

/// Classify a line by its `offset` from the current mode's start.
pub fn classify(offset: usize, n_par: usize) -> ModeLine {
    let in_region = |start: usize| offset >= start && offset < start + n_par;

    if offset == 0 {
        ModeLine::LocalEvidence
    } else if in_region(POSTERIOR_MEAN_OFFSET) {
        ModeLine::PosteriorMean
    } else if in_region(MAX_LIKELIHOOD_OFFSET + n_par) {
        ModeLine::MaxLikelihood
    } else if in_region(MAX_A_POSTERIORI_OFFSET + 2 * n_par) {
        ModeLine::MaxAPosteriori
    } else {
        ModeLine::Other
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Render a statistics file in the layout the parser reads.
///
/// The header mode count is `modes.len()`. Values are written in shortest
/// round-trip scientific notation so that parsing the output is exact.
pub fn render_stats(global_log_evidence: f64, modes: &[ModeRecord]) -> String {
    let mut out = String::new();

    // Header, lines 0..FIRST_MODE_OFFSET - 2.
    let _ = writeln!(
        out,
        "Nested Sampling Global Log-Evidence           :  {global_log_evidence:24E}  +/-  {:12E}",
        0.1
    );
    let _ = writeln!(
        out,
        "Nested Importance Sampling Global Log-Evidence:  {global_log_evidence:24E}  +/-  {:12E}",
        0.1
    );
    out.push_str("\n\n\n");
    let _ = writeln!(out, "Total Modes Found:  {:>20}", modes.len());
    out.push_str("\n\n");

    for (m, mode) in modes.iter().enumerate() {
        if m > 0 {
            out.push_str("\n\n");
        }
        let _ = writeln!(out, "Mode {}:", m + 1);
        let _ = writeln!(
            out,
            "Strictly Local Log-Evidence  {:24E}  +/-  {:12E}",
            mode.log_evidence(),
            0.1
        );
        render_mode(&mut out, mode);
    }
    out
}

fn render_mode(out: &mut String, mode: &ModeRecord) {
    let _ = writeln!(
        out,
        "Local Log-Evidence  {:24E}  +/-  {:12E}",
        mode.log_evidence(),
        0.1
    );
    out.push('\n');
    out.push_str("Dim No.       Mean        Sigma\n");
    for (k, v) in mode.posterior_mean().iter().enumerate() {
        let _ = writeln!(out, "{:<7}{v:24E}  {:24E}", k + 1, v.abs() * 0.1);
    }
    out.push('\n');
    out.push_str("Maximum Likelihood Parameters\n");
    out.push_str("Dim No.        Parameter\n");
    for (k, v) in mode.max_likelihood().iter().enumerate() {
        let _ = writeln!(out, "{:<7}{v:24E}", k + 1);
    }
    out.push('\n');
    out.push_str("MAP Parameters\n");
    out.push_str("Dim No.        Parameter\n");
    for (k, v) in mode.max_a_posteriori().iter().enumerate() {
        let _ = writeln!(out, "{:<7}{v:24E}", k + 1);
    }
}
