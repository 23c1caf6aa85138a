//! Checkpoint files.
//!
//! A checkpoint directory holds three independent JSON blobs so the model
//! can be loaded for play without the training state.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use mcts::OracleError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const MODEL_FILE: &str = "model.json";
pub const OPTIMIZER_FILE: &str = "optimizer.json";
pub const SCHEDULER_FILE: &str = "lr_scheduler.json";

/// Write `value` to `dir/name`, creating `dir` if needed.
/// Goes through a temporary sibling that is renamed into place.
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<(), OracleError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let tmp_path = dir.join(format!(".{name}.tmp"));

    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    serde_json::to_writer(&mut writer, value)
        .map_err(|e| OracleError::Serialization(format!("{}: {e}", path.display())))?;
    writer.flush()?;
    drop(writer);

    fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// Read `dir/name`, or `None` if the file does not exist.
pub fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Option<T>, OracleError> {
    let path = dir.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let reader = BufReader::new(File::open(&path)?);
    serde_json::from_reader(reader)
        .map(Some)
        .map_err(|e| OracleError::Serialization(format!("{}: {e}", path.display())))
}
