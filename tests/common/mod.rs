// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use astrolabe::{ChunkReader, FileConfig, LRecord, Lineage, ORecord, Record};

// ============================================================================
// Fixtures
// ============================================================================

/// Lineage used by every test channel.
pub fn test_lineage() -> Lineage {
    Lineage::new("astrolabe-tests").with_version("1")
}

/// File configuration rooted in `dir`, named `obs`.
pub fn file_config(dir: &Path) -> FileConfig {
    FileConfig::new(dir.join("obs.hdr"), dir.join("obs"), test_lineage())
}

/// Path of chunk `index` for `file_config(dir)` with the given width.
pub fn chunk_path(dir: &Path, width: usize, index: u64) -> PathBuf {
    dir.join(format!("obs_{index:0width$}"))
}

/// Valid l-record with one expectation.
pub fn l_record(identifier: &str, iid: i32, time: f64) -> LRecord {
    LRecord::new(identifier, iid, time).with_expectations(vec![f64::from(iid) + 0.5])
}

/// Valid o-record referencing one parameter and two observations.
pub fn o_record(identifier: &str, time: f64) -> ORecord {
    ORecord::new(identifier, time, vec![10], vec![20, 21])
}

// ============================================================================
// Chunk inspection
// ============================================================================

/// Decode every record of a chunk.
pub fn read_chunk(path: &Path) -> Vec<Record> {
    ChunkReader::open(path)
        .unwrap_or_else(|e| panic!("cannot open {}: {e}", path.display()))
        .records()
        .unwrap_or_else(|e| panic!("cannot decode {}: {e}", path.display()))
}

/// Distinct epochs of a chunk in order of appearance.
pub fn chunk_epochs(path: &Path) -> Vec<f64> {
    ChunkReader::open(path).unwrap().summary().unwrap().epochs
}

/// Names of the files in `dir`, sorted.
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
