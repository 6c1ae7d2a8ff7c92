use std::path::{Path, PathBuf};

use multinest_catalogue::{
    build_catalogue, render_stats, CatalogueBuilder, CatalogueError, FailurePolicy, ModeRecord,
    ParseOptions, ResultsLayout,
};
use tempfile::TempDir;

fn mode(n_par: usize, seed: f64) -> ModeRecord {
    let values = |shift: f64| (0..n_par).map(|k| seed + k as f64 * 0.5 + shift).collect();
    ModeRecord::new(-seed, values(0.0), values(0.125), values(0.0625)).unwrap()
}

fn write_stats(dir: &Path, name: &str, global: f64, modes: &[ModeRecord]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, render_stats(global, modes)).unwrap();
    path
}

#[test]
fn three_single_mode_files_keep_input_order() {
    let dir = TempDir::new().unwrap();
    let files: Vec<PathBuf> = ["100", "200", "300"]
        .iter()
        .enumerate()
        .map(|(i, id)| {
            write_stats(
                dir.path(),
                &format!("{id}_BANGS.dat"),
                -10.0 - i as f64,
                &[mode(2, i as f64 + 1.0)],
            )
        })
        .collect();

    let cat = build_catalogue("e2e", &files, 2).unwrap();

    assert_eq!(cat.name(), "e2e");
    assert_eq!(cat.n_par(), 2);
    let ids: Vec<&str> = cat.objects().iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec!["100", "200", "300"]);
    for (i, obj) in cat.objects().iter().enumerate() {
        assert_eq!(obj.modes().len(), 1);
        assert_eq!(obj.global_log_evidence(), -10.0 - i as f64);
        assert_eq!(obj.modes()[0], mode(2, i as f64 + 1.0));
    }
}

#[test]
fn two_modes_with_three_parameters() {
    let dir = TempDir::new().unwrap();
    let modes = [mode(3, 1.0), mode(3, 7.0)];
    let path = write_stats(dir.path(), "4242_BANGS_MNstats.dat", -3.5, &modes);

    let cat = build_catalogue("segmentation", &[path], 3).unwrap();
    let obj = cat.get("4242").expect("object present");
    assert_eq!(obj.modes().len(), 2);
    for (parsed, expected) in obj.modes().iter().zip(&modes) {
        assert_eq!(parsed.posterior_mean().len(), 3);
        assert_eq!(parsed.max_likelihood().len(), 3);
        assert_eq!(parsed.max_a_posteriori().len(), 3);
        assert_eq!(parsed, expected);
    }
}

/// Writes three files, the middle one cut inside its second mode.
fn batch_with_truncated_file(dir: &Path) -> Vec<PathBuf> {
    let good_a = write_stats(dir, "1_BANGS.dat", -1.0, &[mode(2, 1.0)]);
    let text = render_stats(-2.0, &[mode(2, 2.0), mode(2, 3.0)]);
    let lines: Vec<&str> = text.lines().collect();
    let truncated = dir.join("2_BANGS.dat");
    std::fs::write(&truncated, lines[..lines.len() - 3].join("\n")).unwrap();
    let good_b = write_stats(dir, "3_BANGS.dat", -3.0, &[mode(2, 4.0)]);
    vec![good_a, truncated, good_b]
}

#[test]
fn truncated_file_aborts_the_batch() {
    let dir = TempDir::new().unwrap();
    let files = batch_with_truncated_file(dir.path());

    let err = CatalogueBuilder::new("abort", 2).build(&files).unwrap_err();
    assert!(matches!(err, CatalogueError::SchemaMismatch { .. }));
}

#[test]
fn truncated_file_is_reported_when_skipping() {
    let dir = TempDir::new().unwrap();
    let files = batch_with_truncated_file(dir.path());

    let report = CatalogueBuilder::new("skip", 2)
        .failure_policy(FailurePolicy::Skip)
        .build(&files)
        .unwrap();

    let ids: Vec<&str> = report.catalogue.objects().iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, "2");
    assert_eq!(report.skipped[0].path, files[1]);

    for obj in report.catalogue.objects() {
        for m in obj.modes() {
            assert_eq!(m.posterior_mean().len(), 2);
            assert_eq!(m.max_likelihood().len(), 2);
            assert_eq!(m.max_a_posteriori().len(), 2);
        }
    }
}

#[test]
fn missing_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("404_BANGS.dat");
    match build_catalogue("missing", &[missing.clone()], 2) {
        Err(CatalogueError::Io { path, source }) => {
            assert_eq!(path, missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn duplicate_ids_are_rejected() {
    let dir = TempDir::new().unwrap();
    let other = dir.path().join("other");
    std::fs::create_dir(&other).unwrap();
    let a = write_stats(dir.path(), "5_BANGS.dat", -1.0, &[mode(1, 1.0)]);
    let b = write_stats(&other, "5_BANGS.dat", -1.0, &[mode(1, 1.0)]);

    let err = build_catalogue("dup", &[a.clone(), b.clone()], 1).unwrap_err();
    assert!(matches!(err, CatalogueError::SchemaMismatch { .. }));

    let report = CatalogueBuilder::new("dup", 1)
        .failure_policy(FailurePolicy::Skip)
        .build(&[a, b.clone()])
        .unwrap();
    assert_eq!(report.catalogue.len(), 1);
    assert_eq!(report.skipped[0].path, b);
}

#[test]
fn custom_suffix_marker_and_discovery() {
    let dir = TempDir::new().unwrap();
    write_stats(dir.path(), "20-fit.stats", -1.0, &[mode(2, 1.0)]);
    write_stats(dir.path(), "10-fit.stats", -2.0, &[mode(2, 2.0)]);
    write_stats(dir.path(), "10-fit.log", -2.0, &[mode(2, 2.0)]);

    let layout = ResultsLayout::new(dir.path()).with_file_suffix("-fit.stats");
    let files = layout.stats_files().unwrap();
    let options = ParseOptions {
        suffix_marker: "-fit".to_string(),
        ..ParseOptions::default()
    };
    let report = CatalogueBuilder::new("custom", 2)
        .parse_options(options)
        .build(&files)
        .unwrap();

    let ids: Vec<&str> = report.catalogue.objects().iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec!["10", "20"]);
}

#[test]
fn empty_file_list_gives_empty_catalogue() {
    let files: Vec<PathBuf> = Vec::new();
    let cat = build_catalogue("empty", &files, 4).unwrap();
    assert!(cat.is_empty());
    assert_eq!(cat.n_par(), 4);
}
