// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use log::{debug, info};

use crate::classify::fill_adjacent_edge_counts;
use crate::raw::RawTables;

/// Format of the input tables file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    Unknown,

    /// Force uncompressed JSON
    Json,

    /// Force JSON with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    JsonGz,

    /// Force JSON with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    JsonBz2,
}

impl FileFormat {
    /// Guesses the format from the first bytes of a file.
    pub fn sniff(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b]) {
            Self::JsonGz
        } else if head.starts_with(b"BZh") {
            Self::JsonBz2
        } else {
            Self::Json
        }
    }
}

/// Additional controls for reading raw tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite. Edges referring to filtered-out nodes are kept, but become dangling,
    /// and don't count towards missing adjacency counts of the remaining nodes.
    pub bbox: [f64; 4],
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file_format: FileFormat::Unknown,
            bbox: [0.0; 4],
        }
    }
}

/// Error which can occur when reading raw tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses raw tables from a reader as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
/// Missing adjacency counts of nodes are computed from the edge table.
pub fn read_tables_from_io<R: io::Read>(options: &Options, reader: R) -> Result<RawTables, Error> {
    let mut b = io::BufReader::new(reader);

    let format = match options.file_format {
        FileFormat::Unknown => {
            let format = FileFormat::sniff(b.fill_buf()?);
            debug!("detected input format: {format:?}");
            format
        }
        format => format,
    };

    let tables: RawTables = match format {
        FileFormat::Unknown | FileFormat::Json => serde_json::from_reader(b)?,

        FileFormat::JsonGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            serde_json::from_reader(io::BufReader::new(d))?
        }

        FileFormat::JsonBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            serde_json::from_reader(io::BufReader::new(d))?
        }
    };

    Ok(prepare_tables(tables, options))
}

/// Parses raw tables from a file at the provided path as per the provided [Options].
pub fn read_tables_from_file<P: AsRef<Path>>(options: &Options, path: P) -> Result<RawTables, Error> {
    let f = File::open(path)?;
    read_tables_from_io(options, f)
}

/// Parses raw tables from a static buffer as per the provided [Options].
pub fn read_tables_from_buffer(options: &Options, data: &[u8]) -> Result<RawTables, Error> {
    let format = match options.file_format {
        FileFormat::Unknown => FileFormat::sniff(data),
        format => format,
    };

    if format == FileFormat::Json {
        // Fast path is available for in-memory JSON data
        let tables: RawTables = serde_json::from_slice(data)?;
        Ok(prepare_tables(tables, options))
    } else {
        read_tables_from_io(options, data)
    }
}

fn prepare_tables(mut tables: RawTables, options: &Options) -> RawTables {
    let ignore_bbox =
        options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());
    if !ignore_bbox {
        let [min_lon, min_lat, max_lon, max_lat] = options.bbox;
        let before = tables.nodes.len();
        tables.nodes.retain(|n| {
            n.lat >= min_lat && n.lat <= max_lat && n.lon >= min_lon && n.lon <= max_lon
        });
        debug!("bbox filter dropped {} nodes", before - tables.nodes.len());
    }

    // Counted after filtering, so edges to dropped nodes are not included
    fill_adjacent_edge_counts(&mut tables.nodes, &tables.edges);

    info!(
        "read {} node and {} edge records",
        tables.nodes.len(),
        tables.edges.len()
    );
    tables
}
