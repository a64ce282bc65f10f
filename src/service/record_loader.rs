use crate::db::models::ImportRecord;
use crate::error::AspenError;
use std::{fs, path::Path};
use tracing::info;

/// Load import records from a JSON array file, or from every `*.json` file in
/// a directory (in file-name order).
pub fn load_records(path: &Path) -> Result<Vec<ImportRecord>, AspenError> {
    if !path.is_dir() {
        let records = load_file(path)?;
        info!(path = %path.display(), count = records.len(), "loaded student records");
        return Ok(records);
    }

    let mut files: Vec<_> = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    files.retain(|p| is_json_file(p));
    files.sort();

    let mut records = Vec::new();
    for file in &files {
        let mut batch = load_file(file)?;
        info!(path = %file.display(), count = batch.len(), "loaded student records");
        records.append(&mut batch);
    }
    Ok(records)
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        == Some(true)
}

fn load_file(path: &Path) -> Result<Vec<ImportRecord>, AspenError> {
    let contents = fs::read_to_string(path)?;
    let records: Vec<ImportRecord> = serde_json::from_str(&contents)?;
    Ok(records)
}
