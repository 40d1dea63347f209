//! Precomputed centrality tables

use crate::centrality::CentralityScores;
use crate::error::AnalysisError;
use crate::graph::NodeId;
use anyhow::{anyhow, Result};
use polars::prelude::*;
use std::path::Path;

/// Load `node id -> score` from a CSV table.
///
/// The first column holds node ids (the table index); `column` names the
/// numeric score column. Rows with a null id or a null or NaN score are
/// skipped.
pub fn load_centrality_table(path: &Path, column: &str) -> Result<CentralityScores> {
    log::info!("Reading centrality table {} (column '{}')", path.display(), column);

    if !path.is_file() {
        return Err(AnalysisError::InputNotFound(path.to_path_buf()).into());
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let id_column = df
        .get_columns()
        .first()
        .ok_or_else(|| anyhow!("centrality table {} has no columns", path.display()))?;

    let has_column = df
        .get_column_names()
        .iter()
        .any(|name| name.as_str() == column);
    if !has_column {
        return Err(AnalysisError::MissingColumn(column.to_string()).into());
    }

    let ids = id_column.cast(&DataType::Int64)?;
    let scores = df.column(column)?.cast(&DataType::Float64)?;

    let mut table = CentralityScores::new();
    let mut skipped = 0usize;
    let ids = ids.as_materialized_series().i64()?;
    let scores = scores.as_materialized_series().f64()?;
    for (id, score) in ids.into_iter().zip(scores.into_iter()) {
        match (id, score) {
            (Some(id), Some(score)) if id >= 0 && !score.is_nan() => {
                table.insert(id as NodeId, score);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} rows with missing, NaN or negative values", skipped);
    }
    log::info!("Loaded {} centrality scores", table.len());

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_named_column_keyed_by_first_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Nodo,Centralidad_Grado,Otra").unwrap();
        writeln!(file, "3,0.5,1").unwrap();
        writeln!(file, "7,0.25,1").unwrap();
        let table = load_centrality_table(file.path(), "Centralidad_Grado").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[&3], 0.5);
        assert_eq!(table[&7], 0.25);
    }

    #[test]
    fn nan_scores_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Nodo,Centralidad_Grado").unwrap();
        writeln!(file, "1,0.5").unwrap();
        writeln!(file, "2,NaN").unwrap();
        writeln!(file, "3,0.125").unwrap();
        let table = load_centrality_table(file.path(), "Centralidad_Grado").unwrap();
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn unknown_column_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,score\n1,0.1").unwrap();
        let err = load_centrality_table(file.path(), "degree").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::MissingColumn(c)) if c == "degree"
        ));
    }
}
