//! Results persistence module

use crate::community::{ModularityRecord, PartitionSnapshot};
use crate::config::OutputFormat;
use crate::robustness::RobustnessTrace;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sink for everything the two removal algorithms produce
pub trait MetricsRecorder {
    /// Truncate or recreate the modularity log before a detection run
    fn begin_modularity_log(&mut self) -> Result<()>;

    /// Append one iteration record
    fn record_iteration(&mut self, record: &ModularityRecord) -> Result<()>;

    /// Persist a new best partition without overwriting earlier ones
    fn record_best_partition(&mut self, snapshot: &PartitionSnapshot) -> Result<()>;

    /// Persist the trace of one (dataset, strategy) simulation
    fn record_trace(&mut self, strategy: &str, trace: &RobustnessTrace) -> Result<()>;
}

/// Serialized robustness output: two aligned sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustnessRecord {
    pub giant_fraction: Vec<f64>,
    pub global_efficiency: Vec<f64>,
}

impl From<&RobustnessTrace> for RobustnessRecord {
    fn from(trace: &RobustnessTrace) -> Self {
        Self {
            giant_fraction: trace.iter().map(|p| p.giant_fraction).collect(),
            global_efficiency: trace.iter().map(|p| p.global_efficiency).collect(),
        }
    }
}

/// Writes records under an output directory
pub struct FileRecorder {
    output_dir: PathBuf,
    dataset: String,
    format: OutputFormat,
    written: Vec<PathBuf>,
}

impl FileRecorder {
    pub fn new(output_dir: impl Into<PathBuf>, dataset: &str, format: OutputFormat) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating {}", output_dir.display()))?;
        Ok(Self {
            output_dir,
            dataset: dataset.to_string(),
            format,
            written: Vec::new(),
        })
    }

    /// Path of the CSV modularity log
    pub fn modularity_log_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("modularity_{}.csv", self.dataset))
    }

    /// Snapshot and trace files written so far, in order
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    fn snapshot_path(&self, iteration: usize) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.output_dir.join(format!(
            "best_partition_{}_{}_{}.{}",
            self.dataset,
            stamp,
            iteration,
            self.format.extension()
        ))
    }
}

impl MetricsRecorder for FileRecorder {
    fn begin_modularity_log(&mut self) -> Result<()> {
        let path = self.modularity_log_path();
        let mut file = File::create(&path)?;
        writeln!(file, "iteration,community_count,modularity")?;
        log::info!("Modularity log: {}", path.display());
        Ok(())
    }

    fn record_iteration(&mut self, record: &ModularityRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.modularity_log_path())?;
        writeln!(
            file,
            "{},{},{:.6}",
            record.iteration, record.community_count, record.modularity
        )?;
        Ok(())
    }

    fn record_best_partition(&mut self, snapshot: &PartitionSnapshot) -> Result<()> {
        let path = self.snapshot_path(snapshot.iteration);
        write_record(&path, self.format, snapshot)?;
        log::info!(
            "Partition saved: iteration {}, modularity = {:.4} ({})",
            snapshot.iteration,
            snapshot.modularity,
            path.display()
        );
        self.written.push(path);
        Ok(())
    }

    fn record_trace(&mut self, strategy: &str, trace: &RobustnessTrace) -> Result<()> {
        let path = self.output_dir.join(format!(
            "{}_{}.{}",
            self.dataset,
            strategy,
            self.format.extension()
        ));
        write_record(&path, self.format, &RobustnessRecord::from(trace))?;
        log::info!("Saved {} trace points to {}", trace.len(), path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    pub log_starts: usize,
    pub iterations: Vec<ModularityRecord>,
    pub snapshots: Vec<PartitionSnapshot>,
    pub traces: Vec<(String, RobustnessRecord)>,
}

impl MetricsRecorder for MemoryRecorder {
    fn begin_modularity_log(&mut self) -> Result<()> {
        self.log_starts += 1;
        self.iterations.clear();
        Ok(())
    }

    fn record_iteration(&mut self, record: &ModularityRecord) -> Result<()> {
        self.iterations.push(*record);
        Ok(())
    }

    fn record_best_partition(&mut self, snapshot: &PartitionSnapshot) -> Result<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn record_trace(&mut self, strategy: &str, trace: &RobustnessTrace) -> Result<()> {
        self.traces
            .push((strategy.to_string(), RobustnessRecord::from(trace)));
        Ok(())
    }
}

fn write_record<T: Serialize>(path: &Path, format: OutputFormat, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Json => serde_json::to_writer_pretty(&mut writer, value)?,
        OutputFormat::Bincode => bincode::serialize_into(&mut writer, value)?,
    }
    writer.flush()?;
    Ok(())
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("opening {}", path.display()))?,
    );
    let is_binary = path.extension().map_or(false, |ext| ext == "bin");
    let value = if is_binary {
        bincode::deserialize_from(reader)?
    } else {
        serde_json::from_reader(reader)?
    };
    Ok(value)
}

/// Re-load a persisted best-partition snapshot (format from the extension)
pub fn load_snapshot(path: &Path) -> Result<PartitionSnapshot> {
    read_record(path)
}

/// Re-load a persisted robustness record (format from the extension)
pub fn load_robustness(path: &Path) -> Result<RobustnessRecord> {
    read_record(path)
}
