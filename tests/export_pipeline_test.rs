//! Integration tests for the export run
//!
//! These tests drive the coordinator with a scripted engine and check layer
//! selection, failure isolation, session handling and exit codes.

mod common;

use common::{
    capture_logs, config_in, raster, started_at, vector, ScriptedEngine, OUTPUT_DIR_NAME,
};
use std::fs;
use tempfile::TempDir;
use tessera::config::CollisionPolicy;
use tessera::core::export::{
    ExportCoordinator, LayerOutcome, RunOutcome, EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS,
};
use tessera::domain::{LayerExportError, TesseraError, WriterErrorCode};

fn completed(outcome: &RunOutcome) -> &tessera::core::export::ExportSummary {
    outcome
        .summary()
        .unwrap_or_else(|| panic!("run aborted: {outcome:?}"))
}

#[test]
fn test_only_vector_layers_are_attempted() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        raster("dem_1", "dem"),
        vector("rivers_1", "rivers", "EPSG:3857"),
        raster("ortho_1", "ortho"),
        vector("parcels_1", "parcels", "EPSG:4326"),
    ]);

    let outcome = ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at());
    let summary = completed(&outcome);

    assert_eq!(engine.attempted_layers(), vec!["roads", "rivers", "parcels"]);
    assert_eq!(summary.total_layers, 5);
    assert_eq!(summary.exported, 3);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
}

#[test]
fn test_destinations_inside_single_output_dir() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        vector("odd_1", "../escape/attempt", "EPSG:4326"),
    ]);

    let outcome = ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at());
    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);

    let output_dir = dir.path().join(OUTPUT_DIR_NAME);
    assert!(output_dir.is_dir());
    for destination in engine.attempted_destinations() {
        assert_eq!(destination.parent(), Some(output_dir.as_path()));
        assert_eq!(destination.extension().and_then(|e| e.to_str()), Some("shp"));
    }
    assert_eq!(
        engine.attempted_destinations()[0],
        output_dir.join("roads.shp")
    );
}

#[test]
fn test_failing_layer_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        vector("rivers_1", "rivers", "EPSG:4326"),
        vector("parcels_1", "parcels", "EPSG:4326"),
    ])
    .failing("rivers");

    let (outcome, logs) = capture_logs(|| {
        ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at())
    });
    let summary = completed(&outcome);

    assert_eq!(engine.attempted_layers(), vec!["roads", "rivers", "parcels"]);
    assert_eq!(summary.exported, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(outcome.exit_code(), EXIT_PARTIAL);

    let (layer, error) = summary.failures().next().unwrap();
    assert_eq!(layer, "rivers");
    assert!(matches!(
        error,
        LayerExportError::Writer(e) if e.code == WriterErrorCode::CreateDataSource
    ));

    let errors = logs.lines_containing("Failed to export vector layer");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("ERROR"));
    assert!(errors[0].contains("rivers"));
    assert!(errors[0].contains("ErrCreateDataSource (2)"));
    assert_eq!(logs.lines_containing("Exported vector layer").len(), 2);
}

#[test]
fn test_engine_panic_is_isolated() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        vector("rivers_1", "rivers", "EPSG:4326"),
    ])
    .panicking("roads");

    let outcome = ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at());
    let summary = completed(&outcome);

    assert_eq!(engine.attempted_layers(), vec!["roads", "rivers"]);
    assert_eq!(summary.exported, 1);
    assert!(matches!(
        &summary.outcomes[0],
        LayerOutcome::Failed { error: LayerExportError::EngineFault(message), .. }
            if message.contains("scripted engine fault on roads")
    ));
    assert_eq!(engine.init_calls, 1);
    assert_eq!(engine.shutdown_calls, 1);
    assert_eq!(outcome.exit_code(), EXIT_PARTIAL);
}

#[test]
fn test_session_released_once_on_success() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![vector("roads_1", "roads", "EPSG:4326")]);

    ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at());

    assert_eq!(engine.init_calls, 1);
    assert_eq!(engine.shutdown_calls, 1);
}

#[test]
fn test_empty_project_completes() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(Vec::new());

    let (outcome, logs) = capture_logs(|| {
        ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at())
    });
    let summary = completed(&outcome);

    assert_eq!(summary.total_layers, 0);
    assert!(engine.attempted_layers().is_empty());
    assert!(logs.lines_containing("Exported vector layer").is_empty());
    assert!(logs.lines_containing("ERROR").is_empty());
    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
    assert_eq!(engine.shutdown_calls, 1);
}

#[test]
fn test_missing_project_aborts_without_attempts() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.project.path = dir.path().join("absent.json").to_string_lossy().to_string();
    let mut engine = ScriptedEngine::new(vec![vector("roads_1", "roads", "EPSG:4326")]);

    let (outcome, logs) =
        capture_logs(|| ExportCoordinator::new(config).execute(&mut engine, started_at()));

    match &outcome {
        RunOutcome::Aborted(TesseraError::ProjectLoad { path, .. }) => {
            assert!(path.ends_with("absent.json"));
        }
        other => panic!("expected project load error, got {other:?}"),
    }
    assert_eq!(outcome.exit_code(), EXIT_FATAL);
    assert!(engine.attempted_layers().is_empty());
    assert_eq!(engine.shutdown_calls, 1);

    let aborted = logs.lines_containing("Export run aborted");
    assert_eq!(aborted.len(), 1);
    assert!(aborted[0].contains("ProjectLoadError"));
}

#[test]
fn test_output_dir_creation_failure_aborts_before_project_load() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    fs::write(dir.path().join(OUTPUT_DIR_NAME), "not a directory").unwrap();
    let mut engine = ScriptedEngine::new(vec![vector("roads_1", "roads", "EPSG:4326")]);

    let outcome = ExportCoordinator::new(config).execute(&mut engine, started_at());

    assert!(matches!(
        outcome,
        RunOutcome::Aborted(TesseraError::DirectoryCreation { .. })
    ));
    assert_eq!(outcome.exit_code(), EXIT_FATAL);
    assert!(engine.attempted_layers().is_empty());
    assert_eq!(engine.shutdown_calls, 1);
}

#[test]
fn test_engine_init_failure_skips_shutdown() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![vector("roads_1", "roads", "EPSG:4326")]);
    engine.fail_init = true;

    let outcome = ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at());

    assert!(matches!(
        outcome,
        RunOutcome::Aborted(TesseraError::EngineInit(_))
    ));
    assert_eq!(outcome.exit_code(), EXIT_FATAL);
    assert_eq!(engine.init_calls, 1);
    assert_eq!(engine.shutdown_calls, 0);
    assert!(!dir.path().join(OUTPUT_DIR_NAME).exists());
}

#[test]
fn test_teardown_failure_is_only_logged() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![vector("roads_1", "roads", "EPSG:4326")]);
    engine.fail_shutdown = true;

    let (outcome, logs) = capture_logs(|| {
        ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at())
    });

    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
    assert_eq!(engine.shutdown_calls, 1);
    assert_eq!(logs.lines_containing("Engine teardown failed").len(), 1);
}

#[test]
fn test_collisions_are_disambiguated_by_default() {
    let dir = TempDir::new().unwrap();
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        vector("roads_2", "roads", "EPSG:3857"),
    ]);

    let outcome = ExportCoordinator::new(config_in(dir.path())).execute(&mut engine, started_at());

    let output_dir = dir.path().join(OUTPUT_DIR_NAME);
    assert_eq!(
        engine.attempted_destinations(),
        vec![output_dir.join("roads.shp"), output_dir.join("roads_2.shp")]
    );
    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
}

#[test]
fn test_collision_overwrite_policy() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.export.on_name_collision = CollisionPolicy::Overwrite;
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        vector("roads_2", "roads", "EPSG:3857"),
    ]);

    let outcome = ExportCoordinator::new(config).execute(&mut engine, started_at());

    let destinations = engine.attempted_destinations();
    assert_eq!(destinations.len(), 2);
    assert_eq!(destinations[0], destinations[1]);
    assert_eq!(completed(&outcome).exported, 2);
}

#[test]
fn test_collision_error_policy() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.export.on_name_collision = CollisionPolicy::Error;
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        vector("roads_2", "Roads", "EPSG:3857"),
        vector("rivers_1", "rivers", "EPSG:4326"),
    ]);

    let outcome = ExportCoordinator::new(config).execute(&mut engine, started_at());
    let summary = completed(&outcome);

    assert_eq!(engine.attempted_layers(), vec!["roads", "rivers"]);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.attempted(), 2);
    assert!(matches!(
        summary.failures().next(),
        Some(("Roads", LayerExportError::NameCollision { claimed_by, .. })) if claimed_by == "roads"
    ));
    assert_eq!(outcome.exit_code(), EXIT_PARTIAL);
}

#[test]
fn test_failed_layer_does_not_reserve_its_name() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.export.on_name_collision = CollisionPolicy::Error;
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "Roads", "EPSG:4326"),
        vector("roads_2", "roads", "EPSG:3857"),
    ])
    .failing("Roads");

    let outcome = ExportCoordinator::new(config).execute(&mut engine, started_at());
    let summary = completed(&outcome);

    let output_dir = dir.path().join(OUTPUT_DIR_NAME);
    assert_eq!(
        engine.attempted_destinations(),
        vec![output_dir.join("Roads.shp"), output_dir.join("roads.shp")]
    );
    assert_eq!(summary.exported, 1);
    assert!(matches!(
        summary.failures().next(),
        Some(("Roads", LayerExportError::Writer(e))) if e.code == WriterErrorCode::CreateDataSource
    ));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.export.dry_run = true;
    let mut engine = ScriptedEngine::new(vec![
        vector("roads_1", "roads", "EPSG:4326"),
        raster("dem_1", "dem"),
    ]);

    let outcome = ExportCoordinator::new(config).execute(&mut engine, started_at());
    let summary = completed(&outcome);

    assert!(summary.dry_run);
    assert_eq!(summary.planned, 1);
    assert_eq!(summary.skipped, 1);
    assert!(engine.attempted_layers().is_empty());
    assert!(!dir.path().join(OUTPUT_DIR_NAME).exists());
    assert!(matches!(
        &summary.outcomes[0],
        LayerOutcome::Planned { destination, .. }
            if destination.ends_with(format!("{OUTPUT_DIR_NAME}/roads.shp"))
    ));
    assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
}

#[test]
fn test_failed_verification_is_partial_failure() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.verification.enable_verification = true;
    let mut engine = ScriptedEngine::new(vec![vector("roads_1", "roads", "EPSG:4326")]);

    let outcome = ExportCoordinator::new(config).execute(&mut engine, started_at());
    let summary = completed(&outcome);

    assert_eq!(summary.failed, 0);
    let report = summary.verification_report.as_ref().unwrap();
    assert_eq!(report.failed, 1);
    assert!(report.failures[0].reason.contains("cannot re-read"));
    assert_eq!(outcome.exit_code(), EXIT_PARTIAL);
}
