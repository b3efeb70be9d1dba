// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential chunk file names.
//!
//! Chunk files are named `<base><separator><index>` where the index starts
//! at 1, is zero-padded to the suffix width, and never exceeds
//! `10^width - 1`.

use std::path::{Path, PathBuf};

use crate::core::{Argument, ChannelError, Result};

/// Default separator between base name and index
pub const DEFAULT_SEPARATOR: char = '_';

/// Largest accepted suffix width
pub const MAX_SUFFIX_WIDTH: u32 = 9;

/// Generator of sequential chunk file names for one base path.
#[derive(Debug, Clone)]
pub struct ChunkNameGenerator {
    base: PathBuf,
    separator: char,
    width: u32,
    /// Index of the last committed name
    last: u64,
}

impl ChunkNameGenerator {
    /// Create a generator for `base` with a zero-padded suffix of `width` digits.
    pub fn new<P: AsRef<Path>>(base: P, width: u32, separator: char) -> Result<Self> {
        if !(1..=MAX_SUFFIX_WIDTH).contains(&width) {
            return Err(ChannelError::invalid(
                Argument::SuffixWidth,
                format!("suffix width {width} is outside 1..={MAX_SUFFIX_WIDTH}"),
            ));
        }
        Ok(Self {
            base: base.as_ref().to_path_buf(),
            separator,
            width,
            last: 0,
        })
    }

    /// Largest index the suffix width can represent.
    pub fn limit(&self) -> u64 {
        10u64.pow(self.width) - 1
    }

    /// Index of the last name handed out, 0 before the first call.
    pub fn current_index(&self) -> u64 {
        self.last
    }

    /// Base path of the sequence.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Name of the chunk with the given index.
    pub fn name_for(&self, index: u64) -> PathBuf {
        let mut name = self.base.clone().into_os_string();
        name.push(format!(
            "{}{:0width$}",
            self.separator,
            index,
            width = self.width as usize
        ));
        PathBuf::from(name)
    }

    /// Produce the next chunk name.
    ///
    /// Fails with an exhaustion error once every index has been used.
    pub fn next_name(&mut self) -> Result<PathBuf> {
        let name = self.peek_name()?;
        self.commit();
        Ok(name)
    }

    /// Name the next call to [`next_name`](Self::next_name) would return,
    /// without using up its index.
    pub fn peek_name(&self) -> Result<PathBuf> {
        if self.last >= self.limit() {
            return Err(ChannelError::exhausted(
                self.base.display().to_string(),
                self.limit(),
            ));
        }
        Ok(self.name_for(self.last + 1))
    }

    /// Mark the peeked index as used.
    pub fn commit(&mut self) {
        debug_assert!(self.last < self.limit());
        self.last += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_names() {
        let mut gen = ChunkNameGenerator::new("/data/obs", 3, '_').unwrap();
        assert_eq!(gen.next_name().unwrap(), PathBuf::from("/data/obs_001"));
        assert_eq!(gen.next_name().unwrap(), PathBuf::from("/data/obs_002"));
        assert_eq!(gen.current_index(), 2);
    }

    #[test]
    fn test_peek_does_not_use_index() {
        let mut gen = ChunkNameGenerator::new("obs", 2, '_').unwrap();
        assert_eq!(gen.peek_name().unwrap(), PathBuf::from("obs_01"));
        assert_eq!(gen.peek_name().unwrap(), PathBuf::from("obs_01"));
        assert_eq!(gen.current_index(), 0);

        gen.commit();
        assert_eq!(gen.current_index(), 1);
        assert_eq!(gen.next_name().unwrap(), PathBuf::from("obs_02"));
    }

    #[test]
    fn test_exhaustion_at_width_limit() {
        let mut gen = ChunkNameGenerator::new("obs", 1, '_').unwrap();
        for i in 1..=9 {
            assert_eq!(gen.next_name().unwrap(), PathBuf::from(format!("obs_{i}")));
        }
        let err = gen.next_name().unwrap_err();
        assert_eq!(err.status(), 6);
        assert_eq!(gen.current_index(), 9);
    }

    #[test]
    fn test_width_bounds() {
        assert_eq!(
            ChunkNameGenerator::new("obs", 0, '_').unwrap_err().status(),
            5
        );
        assert_eq!(
            ChunkNameGenerator::new("obs", 10, '_').unwrap_err().status(),
            5
        );
        assert_eq!(
            ChunkNameGenerator::new("obs", 9, '_').unwrap().limit(),
            999_999_999
        );
    }

    #[test]
    fn test_custom_separator() {
        let mut gen = ChunkNameGenerator::new("obs", 2, '.').unwrap();
        assert_eq!(gen.next_name().unwrap(), PathBuf::from("obs.01"));
    }
}
