//! Tests for configuration resolution and multi-worker runs.

use std::path::Path;

use slice_plotter::{check_tasks, resolve_config, run_workers, Overrides};
use slices::{DatasetDocument, PlotSpec, PlotterConfig};
use test_utils::{create_cartesian_dataset, temp_test_dir};

const PLOT_DOCUMENT: &str = r#"
grid:
  nrows: 1
  ncols: 1
  col_inch: 1.0
  row_inch: 1.0
panels:
  - kind: colormesh
    task: b
"#;

/// Write fixture documents into `dir` and load them back the way the CLI does.
fn load_documents(dir: &Path, writes: usize) -> (PlotSpec, DatasetDocument) {
    let plot_path = dir.join("plot.yaml");
    std::fs::write(&plot_path, PLOT_DOCUMENT).unwrap();

    let document = DatasetDocument {
        datasets: vec![create_cartesian_dataset("b", 6, 4, writes)],
    };
    let data_path = dir.join("datasets.json");
    std::fs::write(&data_path, serde_json::to_string(&document).unwrap()).unwrap();

    (
        PlotSpec::from_yaml_file(&plot_path).unwrap(),
        DatasetDocument::from_json_file(&data_path).unwrap(),
    )
}

fn png_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_overrides_take_precedence() {
    let overrides = Overrides {
        out_dir: Some("frames".into()),
        fig_name: Some("slice".to_string()),
        start_fig: Some(7),
        dpi: Some(50),
    };
    let config = resolve_config(PlotterConfig::default(), overrides).unwrap();
    assert_eq!(config.out_dir, Path::new("frames"));
    assert_eq!(config.fig_name, "slice");
    assert_eq!(config.start_fig, 7);
    assert_eq!(config.dpi, 50);
}

#[test]
fn test_missing_overrides_keep_base() {
    let base = PlotterConfig {
        dpi: 72,
        ..PlotterConfig::default()
    };
    let config = resolve_config(base.clone(), Overrides::default()).unwrap();
    assert_eq!(config, base);
}

#[test]
fn test_invalid_override_is_rejected() {
    let overrides = Overrides {
        dpi: Some(0),
        ..Overrides::default()
    };
    let err = resolve_config(PlotterConfig::default(), overrides).unwrap_err();
    assert!(err.to_string().contains("dpi"));

    let overrides = Overrides {
        fig_name: Some(String::new()),
        ..Overrides::default()
    };
    assert!(resolve_config(PlotterConfig::default(), overrides).is_err());
}

// ============================================================================
// Runs
// ============================================================================

#[test]
fn test_zero_workers_is_rejected() {
    let dir = temp_test_dir();
    let (spec, document) = load_documents(dir.path(), 2);
    let config = PlotterConfig {
        out_dir: dir.path().join("out"),
        ..PlotterConfig::default()
    };
    let err = run_workers(&spec, &config, &document, 0).unwrap_err();
    assert!(err.to_string().contains("worker"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_task_missing_from_documents() {
    let dir = temp_test_dir();
    let (spec, _) = load_documents(dir.path(), 1);
    let document = DatasetDocument {
        datasets: vec![create_cartesian_dataset("T", 4, 3, 1)],
    };
    let err = check_tasks(&spec, &document).unwrap_err();
    assert!(err.to_string().contains("'b'"));

    let config = PlotterConfig {
        out_dir: dir.path().join("out"),
        ..PlotterConfig::default()
    };
    assert!(run_workers(&spec, &config, &document, 2).is_err());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_workers_write_every_figure_once() {
    let dir = temp_test_dir();
    let (spec, document) = load_documents(dir.path(), 5);
    let out_dir = dir.path().join("out");
    let config = PlotterConfig {
        out_dir: out_dir.clone(),
        fig_name: "snap".to_string(),
        dpi: 20,
        ..PlotterConfig::default()
    };

    let written = run_workers(&spec, &config, &document, 3).unwrap();
    assert_eq!(written, 5);
    assert_eq!(
        png_files(&out_dir),
        (1..=5).map(|n| format!("snap_{:06}.png", n)).collect::<Vec<_>>()
    );
}

#[test]
fn test_more_workers_than_writes() {
    let dir = temp_test_dir();
    let (spec, document) = load_documents(dir.path(), 2);
    let out_dir = dir.path().join("out");
    let config = PlotterConfig {
        out_dir: out_dir.clone(),
        start_fig: 3,
        dpi: 20,
        ..PlotterConfig::default()
    };

    let written = run_workers(&spec, &config, &document, 4).unwrap();
    assert_eq!(written, 2);
    assert_eq!(
        png_files(&out_dir),
        vec!["snapshots_000003.png", "snapshots_000004.png"]
    );
}
