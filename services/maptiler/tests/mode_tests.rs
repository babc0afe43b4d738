//! End-to-end runs of the static and benchmark modes.

use clap::Parser;
use maptiler::config::{Cli, Command};
use maptiler::{exit_code, static_mode, EXIT_CONFIG};
use test_utils::{cities, list_files, points_csv, temp_dir, write_file};

fn parse(args: &[&str]) -> Command {
    Cli::try_parse_from(args).unwrap().command
}

#[tokio::test]
async fn test_static_render_writes_pyramid() {
    let dir = temp_dir();
    let input = write_file(
        dir.path(),
        "cities.csv",
        &points_csv("longitude", "latitude", &cities::ALL),
    );
    let output = dir.path().join("tiles");

    let Command::Static(args) = parse(&[
        "maptiler",
        "static",
        input.to_str().unwrap(),
        "--max-zoom",
        "1",
        "--output",
        output.to_str().unwrap(),
    ]) else {
        panic!("expected static mode");
    };

    let summaries = static_mode::run(args).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].tile_count, 1);
    assert_eq!(summaries[1].tile_count, 4);

    let files: Vec<String> = list_files(&output)
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        files,
        vec!["0/0/0.png", "1/0/0.png", "1/0/1.png", "1/1/0.png", "1/1/1.png"]
    );

    let tile = image::open(output.join("0/0/0.png")).unwrap().to_rgba8();
    assert_eq!(tile.dimensions(), (256, 256));
}

#[tokio::test]
async fn test_static_rejects_inverted_zooms_as_config_error() {
    let dir = temp_dir();
    let input = write_file(
        dir.path(),
        "cities.csv",
        &points_csv("longitude", "latitude", &cities::ALL),
    );
    let output = dir.path().join("tiles");

    let Command::Static(args) = parse(&[
        "maptiler",
        "static",
        input.to_str().unwrap(),
        "--min-zoom",
        "3",
        "--max-zoom",
        "1",
        "--output",
        output.to_str().unwrap(),
    ]) else {
        panic!("expected static mode");
    };

    let err = static_mode::run(args).await.unwrap_err();
    assert_eq!(exit_code(&err), EXIT_CONFIG);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_static_missing_column_is_config_error() {
    let dir = temp_dir();
    let input = write_file(dir.path(), "xy.csv", &points_csv("x", "y", &cities::ALL));

    let Command::Static(args) = parse(&[
        "maptiler",
        "static",
        input.to_str().unwrap(),
        "--output",
        dir.path().join("tiles").to_str().unwrap(),
    ]) else {
        panic!("expected static mode");
    };

    let err = static_mode::run(args).await.unwrap_err();
    assert_eq!(exit_code(&err), EXIT_CONFIG);
}

#[tokio::test]
async fn test_benchmark_writes_report_and_runs() {
    let dir = temp_dir();
    let input = write_file(
        dir.path(),
        "cities.csv",
        &points_csv("longitude", "latitude", &cities::ALL),
    );
    let output = dir.path().join("bench");
    let report = dir.path().join("report.csv");

    let Command::Benchmark(args) = parse(&[
        "maptiler",
        "benchmark",
        input.to_str().unwrap(),
        "--max-zoom",
        "1",
        "--runs",
        "2",
        "--output",
        output.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]) else {
        panic!("expected benchmark mode");
    };

    maptiler::benchmark::run(args).await.unwrap();

    assert!(output.join("run_0/0/0/0.png").exists());
    assert!(output.join("run_1/1/1/1.png").exists());

    let mut reader = csv::Reader::from_path(&report).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "level",
            "supertile_count",
            "calc_stats_time",
            "render_time",
            "total_time"
        ]
    );
    let levels: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(levels, vec!["0", "1", "0", "1"]);
}
