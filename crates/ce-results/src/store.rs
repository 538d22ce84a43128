//! Run storage API.

use crate::tables::{read_envelopes_csv, write_envelopes_csv, write_timeseries_csv};
use crate::types::{RunManifest, SweepTrace};
use crate::{ResultsError, ResultsResult};
use ce_envelope::ParameterSet;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const MANIFEST: &str = "manifest.json";
const ENVELOPES: &str = "envelopes.csv";
const TRACES: &str = "sweep_traces.json";
const TIMESERIES: &str = "timeseries.csv";

#[derive(Clone, Debug)]
pub struct ResultStore {
    root_dir: PathBuf,
}

impl ResultStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store under `<project dir>/.chp-envelope/runs`.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "project path has no parent directory".to_string(),
            })?;
        let runs_dir = project_dir.join(".chp-envelope").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST).exists()
    }

    /// Persist a characterization run. The manifest is written last so a
    /// partially written run is never reported by [`ResultStore::has_run`].
    pub fn save_run<P: ParameterSet>(
        &self,
        manifest: &RunManifest,
        envelopes: &[(i32, P)],
        traces: &[SweepTrace],
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let file = BufWriter::new(File::create(run_dir.join(ENVELOPES))?);
        write_envelopes_csv(envelopes, file)?;

        let traces_json = serde_json::to_string_pretty(traces)?;
        fs::write(run_dir.join(TRACES), traces_json)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST), manifest_json)?;

        Ok(())
    }

    fn existing(&self, run_id: &str, file: &str) -> ResultsResult<PathBuf> {
        let path = self.run_dir(run_id).join(file);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        Ok(path)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let content = fs::read_to_string(self.existing(run_id, MANIFEST)?)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// Sampled rows of a run, read as `P`.
    pub fn load_envelopes<P: ParameterSet>(&self, run_id: &str) -> ResultsResult<Vec<(i32, P)>> {
        let file = File::open(self.existing(run_id, ENVELOPES)?)?;
        read_envelopes_csv(file)
    }

    pub fn load_traces(&self, run_id: &str) -> ResultsResult<Vec<SweepTrace>> {
        let content = fs::read_to_string(self.existing(run_id, TRACES)?)?;
        let traces = serde_json::from_str(&content)?;
        Ok(traces)
    }

    /// Write a resampled timeseries next to the run it was derived from.
    pub fn save_timeseries(&self, run_id: &str, columns: &[(String, Vec<f64>)]) -> ResultsResult<PathBuf> {
        self.existing(run_id, MANIFEST)?;
        let path = self.run_dir(run_id).join(TIMESERIES);
        let file = BufWriter::new(File::create(&path)?);
        write_timeseries_csv("step", columns, file)?;
        Ok(path)
    }

    pub fn list_runs(&self, unit_id: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.unit_id == unit_id
                {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
