//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tessera::adapters::engine::{GisEngine, SaveVectorOptions, TransformContext, WriteSummary};
use tessera::config::{EngineConfig, TesseraConfig};
use tessera::domain::{
    CrsId, EngineError, Layer, LayerId, LayerKind, Project, VectorDataset, WriteError,
    WriterErrorCode,
};

/// Fixed start time used by every run in the tests
pub fn started_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .unwrap()
        .and_hms_opt(13, 5, 9)
        .unwrap()
}

/// Directory name allocated for [`started_at`]
pub const OUTPUT_DIR_NAME: &str = "output_2025-03-14_01-05-09_PM";

pub fn vector(id: &str, name: &str, crs: &str) -> Layer {
    Layer::new(
        LayerId::new(id).unwrap(),
        name,
        LayerKind::Vector,
        Some(CrsId::new(crs).unwrap()),
        format!("{id}.geojson"),
    )
}

pub fn raster(id: &str, name: &str) -> Layer {
    Layer::new(
        LayerId::new(id).unwrap(),
        name,
        LayerKind::Raster,
        Some(CrsId::new("EPSG:4326").unwrap()),
        format!("{id}.tif"),
    )
}

/// Configuration pointing at `base`, with an existing placeholder project file
pub fn config_in(base: &Path) -> TesseraConfig {
    let project_path = base.join("exporter.json");
    std::fs::write(&project_path, "{}").unwrap();

    let mut config = TesseraConfig::default();
    config.project.path = project_path.to_string_lossy().to_string();
    config.output.base_dir = base.to_string_lossy().to_string();
    config.engine.root = base.to_string_lossy().to_string();
    config
}

/// In-memory engine that serves a fixed project and records every call
pub struct ScriptedEngine {
    project: Project,
    pub init_calls: usize,
    pub shutdown_calls: usize,
    pub fail_init: bool,
    pub fail_shutdown: bool,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    pub attempts: RefCell<Vec<(String, PathBuf)>>,
    running: bool,
}

impl ScriptedEngine {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self {
            project: Project::new("exporter.json", None, layers),
            init_calls: 0,
            shutdown_calls: 0,
            fail_init: false,
            fail_shutdown: false,
            failing: HashSet::new(),
            panicking: HashSet::new(),
            attempts: RefCell::new(Vec::new()),
            running: false,
        }
    }

    /// Makes the writer reject the layer called `name`
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Makes the writer panic on the layer called `name`
    pub fn panicking(mut self, name: &str) -> Self {
        self.panicking.insert(name.to_string());
        self
    }

    pub fn attempted_layers(&self) -> Vec<String> {
        self.attempts
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn attempted_destinations(&self) -> Vec<PathBuf> {
        self.attempts
            .borrow()
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }
}

impl GisEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn initialize(&mut self, _config: &EngineConfig) -> Result<(), EngineError> {
        self.init_calls += 1;
        if self.fail_init {
            return Err(EngineError::RootNotFound("scripted".to_string()));
        }
        self.running = true;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        self.shutdown_calls += 1;
        self.running = false;
        if self.fail_shutdown {
            return Err(EngineError::Other("teardown refused".to_string()));
        }
        Ok(())
    }

    fn read_project(&self, _path: &Path) -> Result<Project, EngineError> {
        assert!(self.running, "project read outside of a session");
        Ok(self.project.clone())
    }

    fn write_vector_layer(
        &self,
        layer: &Layer,
        destination: &Path,
        options: &SaveVectorOptions,
        transform: &TransformContext,
    ) -> Result<WriteSummary, WriteError> {
        assert!(self.running, "layer written outside of a session");
        assert!(!transform.requires_reprojection());
        assert_eq!(options, &SaveVectorOptions::shapefile());

        self.attempts
            .borrow_mut()
            .push((layer.name.clone(), destination.to_path_buf()));

        if self.panicking.contains(&layer.name) {
            panic!("scripted engine fault on {}", layer.name);
        }
        if self.failing.contains(&layer.name) {
            return Err(WriteError::new(
                WriterErrorCode::CreateDataSource,
                format!("cannot create {}", destination.display()),
            ));
        }

        Ok(WriteSummary {
            features_written: 3,
            files: vec![destination.to_path_buf()],
        })
    }

    fn read_vector_file(
        &self,
        _path: &Path,
        _expected_crs: Option<&CrsId>,
    ) -> Result<VectorDataset, EngineError> {
        Err(EngineError::VectorRead("scripted engine keeps no files".to_string()))
    }
}

/// Log writer that keeps everything in memory
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with events recorded into the returned buffer
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
