// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::RoadNetwork;

/// Default directory for cached networks, relative to the working directory.
pub const DEFAULT_CACHE_FOLDER: &str = ".GEOCACHE";

/// Error which can occur when storing or restoring a cached [RoadNetwork].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes a [RoadNetwork] (including its spatial index) into an opaque,
/// gzip-compressed blob.
pub fn to_writer<W: io::Write>(g: &RoadNetwork, writer: W) -> Result<(), Error> {
    let mut e = flate2::write::GzEncoder::new(writer, flate2::Compression::default());
    serde_json::to_writer(&mut e, g)?;
    e.finish()?;
    Ok(())
}

/// Restores a [RoadNetwork] from a blob created by [to_writer].
pub fn from_reader<R: io::Read>(reader: R) -> Result<RoadNetwork, Error> {
    let d = flate2::read::GzDecoder::new(reader);
    Ok(serde_json::from_reader(io::BufReader::new(d))?)
}

/// Stores built networks on disk, keyed by a cache name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphCache {
    pub folder: PathBuf,
    pub name: String,
}

impl GraphCache {
    /// Creates a cache entry descriptor in the [DEFAULT_CACHE_FOLDER].
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_CACHE_FOLDER),
            name: name.into(),
        }
    }

    pub fn with_folder<P: AsRef<Path>, S: Into<String>>(folder: P, name: S) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
            name: name.into(),
        }
    }

    /// Path to the file holding the cached network.
    pub fn path(&self) -> PathBuf {
        self.folder.join(format!("{}_graph.json.gz", self.name))
    }

    /// Loads the cached network, returning `Ok(None)` if it wasn't cached yet.
    pub fn load(&self) -> Result<Option<RoadNetwork>, Error> {
        let path = self.path();
        let f = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no cached network at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let g = from_reader(f)?;
        info!("loaded cached network from {}", path.display());
        Ok(Some(g))
    }

    /// Stores a network in the cache, creating the cache folder if necessary.
    pub fn store(&self, g: &RoadNetwork) -> Result<(), Error> {
        fs::create_dir_all(&self.folder)?;
        let path = self.path();
        let f = io::BufWriter::new(File::create(&path)?);
        to_writer(g, f)?;
        info!("cached network in {}", path.display());
        Ok(())
    }

    /// Loads the cached network, or builds it with `build` and caches the result.
    pub fn load_or_build<F, E>(&self, build: F) -> Result<RoadNetwork, E>
    where
        F: FnOnce() -> Result<RoadNetwork, E>,
        E: From<Error>,
    {
        if let Some(g) = self.load()? {
            return Ok(g);
        }
        let g = build()?;
        self.store(&g)?;
        Ok(g)
    }
}
