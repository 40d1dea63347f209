//! Whitespace-separated edge-list loading

use crate::config::GraphMode;
use crate::error::AnalysisError;
use crate::graph::builder::{EdgeRecord, GraphBuilder};
use crate::graph::{Graph, NodeId};
use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Load an edge list, one edge per line: `source target [weight]`.
///
/// A missing file is reported as [`AnalysisError::InputNotFound`] before
/// anything is read.
pub fn load_edge_list(path: &Path, mode: GraphMode) -> Result<Graph> {
    log::info!("Reading edge list: {}", path.display());

    if !path.is_file() {
        return Err(AnalysisError::InputNotFound(path.to_path_buf()).into());
    }

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let len = file.metadata()?.len();
    if len == 0 {
        log::warn!("{} is empty", path.display());
        return Ok(Graph::new(mode));
    }

    // SAFETY: the mapping is read-only and dropped before returning
    let mmap = unsafe { Mmap::map(&file)? };
    let text = std::str::from_utf8(&mmap).context("edge list is not valid UTF-8")?;

    let graph = parse_edge_list(text, mode)?;
    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Parse edge-list text. Blank lines and `#` comments are skipped.
pub fn parse_edge_list(text: &str, mode: GraphMode) -> Result<Graph, AnalysisError> {
    let mut builder = GraphBuilder::with_capacity(mode, text.len() / 8);

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        builder.add_edge(parse_line(line, idx + 1, mode)?);
    }

    Ok(builder.build())
}

fn parse_line(line: &str, line_no: usize, mode: GraphMode) -> Result<EdgeRecord, AnalysisError> {
    let malformed = |reason: String| AnalysisError::MalformedEdge {
        line: line_no,
        reason,
    };

    let mut fields = line.split_whitespace();
    let mut node = |name: &str| -> Result<NodeId, AnalysisError> {
        let raw = fields
            .next()
            .ok_or_else(|| malformed(format!("missing {} node", name)))?;
        raw.parse::<NodeId>()
            .map_err(|_| malformed(format!("invalid {} node '{}'", name, raw)))
    };

    let source = node("source")?;
    let target = node("target")?;

    let third = fields.next();
    if let Some(extra) = fields.next() {
        return Err(malformed(format!("unexpected column '{}'", extra)));
    }

    let weight = match (mode.weighted, third) {
        (true, Some(raw)) => {
            let weight = raw
                .parse::<f64>()
                .map_err(|_| malformed(format!("invalid weight '{}'", raw)))?;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(malformed(format!("weight must be positive, got '{}'", raw)));
            }
            Some(weight)
        }
        _ => None,
    };

    Ok(EdgeRecord {
        source,
        target,
        weight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_weighted_directed_rows() {
        let text = "# airline routes\n1 2 10\n2 1 3\n\n3 1 7.5\n";
        let g = parse_edge_list(text, GraphMode::new(true, true)).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_weight(3, 1), Some(7.5));
    }

    #[test]
    fn unweighted_mode_ignores_extra_column() {
        let g = parse_edge_list("0 1 99\n1 2\n", GraphMode::default()).unwrap();
        assert_eq!(g.edge_weight(0, 1), Some(1.0));
        assert!(!g.is_weighted());
    }

    #[test]
    fn rejects_negative_ids() {
        let err = parse_edge_list("0 1\n-1 2\n", GraphMode::default()).unwrap_err();
        match err {
            AnalysisError::MalformedEdge { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_positive_and_non_finite_weights() {
        let mode = GraphMode::new(true, true);
        for (text, bad_line) in [
            ("0 1 2\n1 2 -1\n", 2),
            ("1 2 NaN\n", 1),
            ("0 1 1\n1 2 1\n2 0 0\n", 3),
            ("0 1 inf\n", 1),
        ] {
            match parse_edge_list(text, mode) {
                Err(AnalysisError::MalformedEdge { line, .. }) => assert_eq!(line, bad_line),
                other => panic!("expected a malformed edge for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_rows_with_extra_columns() {
        let err = parse_edge_list("0 1 2 5\n", GraphMode::new(false, true)).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedEdge { line: 1, .. }));
        let err = parse_edge_list("0 1\n1 2 3 4\n", GraphMode::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedEdge { line: 2, .. }));
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_edge_list(&dir.path().join("airport.txt"), GraphMode::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InputNotFound(_))
        ));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 1\n1 2\n2 0").unwrap();
        let g = load_edge_list(file.path(), GraphMode::default()).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
    }
}
