//! Reading bulk tables from disk
//!
//! Files are gzip-compressed on the download host; plain text is accepted as
//! well. Link and homology tables are space separated, alias and info tables
//! tab separated, so the delimiter is taken from the header line.

use crate::error::{ClientError, Result};
use crate::graph::{ProteinGraph, BITSCORE, SCORE};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Which column becomes the edge attribute
#[derive(Debug, Clone)]
pub struct EdgeColumns {
    /// Header name of the attribute column
    pub column: String,
    /// Attribute name on the resulting graph
    pub attribute: &'static str,
    /// Rows below this value are skipped
    pub min: Option<f64>,
}

impl EdgeColumns {
    /// `protein1 protein2 ... combined_score`
    pub fn links() -> Self {
        Self {
            column: "combined_score".to_string(),
            attribute: SCORE,
            min: None,
        }
    }

    /// `protein1 protein2 ... bitscore`
    pub fn homology() -> Self {
        Self {
            column: "bitscore".to_string(),
            attribute: BITSCORE,
            min: None,
        }
    }

    /// Use another score column, e.g. `experimental` from the detailed links
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }
}

/// A table's header and its remaining records
pub struct TableReader {
    pub path: PathBuf,
    /// Column names with any leading `#` stripped
    pub header: Vec<String>,
    pub records: csv::Reader<Box<dyn Read>>,
}

impl TableReader {
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ClientError::malformed_table(&self.path, 1, format!("missing column '{}'", name)))
    }
}

/// Open `path`, decompressing when it starts with the gzip magic bytes
pub fn open_table(path: &Path) -> Result<Box<dyn BufRead>> {
    let mut reader = BufReader::new(File::open(path)?);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Read the header line and hand back a record reader for the rest
pub fn read_table(path: &Path) -> Result<TableReader> {
    table_reader(open_table(path)?, path)
}

fn table_reader(mut reader: Box<dyn BufRead>, path: &Path) -> Result<TableReader> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(ClientError::malformed_table(path, 1, "table is empty"));
    }
    let line = line.trim_end_matches(&['\n', '\r'][..]);
    let delimiter = if line.contains('\t') { b'\t' } else { b' ' };

    let header: Vec<String> = line
        .split(char::from(delimiter))
        .map(|c| c.trim_start_matches('#').to_string())
        .collect();

    let records = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(Box::new(reader) as Box<dyn Read>);

    Ok(TableReader {
        path: path.to_path_buf(),
        header,
        records,
    })
}

/// Load an edge list into a directed graph
pub fn load_edge_list(path: &Path, columns: &EdgeColumns) -> Result<ProteinGraph> {
    let graph = parse_edge_list(open_table(path)?, path, columns)?;
    debug!(
        path = %path.display(),
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "Loaded edge list"
    );
    Ok(graph)
}

/// Parse an edge list from any reader; `path` is only used in errors
pub fn parse_edge_list<R: BufRead + 'static>(reader: R, path: &Path, columns: &EdgeColumns) -> Result<ProteinGraph> {
    let mut table = table_reader(Box::new(reader), path)?;
    if table.header.len() < 2 {
        return Err(ClientError::malformed_table(path, 1, "expected at least two identifier columns"));
    }
    let value_idx = table.column_index(&columns.column)?;

    let mut graph = ProteinGraph::new(columns.attribute);
    let mut record = csv::StringRecord::new();
    loop {
        let read = table.records.read_record(&mut record).map_err(|e| {
            let line = e.position().map(|p| p.line() + 1).unwrap_or(0);
            ClientError::malformed_table(path, line, e.to_string())
        })?;
        if !read {
            break;
        }
        // Header was consumed before the csv reader started counting.
        let line = record.position().map(|p| p.line() + 1).unwrap_or(0);

        let (Some(source), Some(target)) = (record.get(0), record.get(1)) else {
            return Err(ClientError::malformed_table(path, line, "expected at least two identifier columns"));
        };
        let raw = record.get(value_idx).ok_or_else(|| {
            ClientError::malformed_table(path, line, format!("missing value for column '{}'", columns.column))
        })?;
        let value: f64 = raw
            .trim()
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| {
                ClientError::malformed_table(path, line, format!("{} '{}' is not a finite number", columns.column, raw))
            })?;

        if columns.min.map_or(false, |min| value < min) {
            continue;
        }
        graph.add_edge(source, target, value);
    }

    Ok(graph)
}
