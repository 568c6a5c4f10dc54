use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result, bail};
use zip::ZipArchive;

/// Read-only view of the book container. Part order is the archive's own
/// entry order, captured once at open time.
#[derive(Debug)]
pub struct BookArchive<R: Read + Seek> {
    archive: ZipArchive<R>,
    names: Vec<String>,
}

impl BookArchive<File> {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("book archive not found: {}", path.display());
        }

        let file = File::open(path)
            .with_context(|| format!("failed to open book archive: {}", path.display()))?;

        Self::from_reader(file)
            .with_context(|| format!("failed to read book archive: {}", path.display()))
    }
}

impl<R: Read + Seek> BookArchive<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).context("failed to parse zip container")?;

        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .with_context(|| format!("failed to read zip entry {index}"))?;
            names.push(entry.name().to_string());
        }

        Ok(Self { archive, names })
    }

    pub fn part_count(&self) -> usize {
        self.names.len()
    }

    pub fn part_name(&self, part_index: usize) -> &str {
        &self.names[part_index]
    }

    pub fn read_part(&mut self, part_index: usize) -> Result<Vec<u8>> {
        let mut entry = self
            .archive
            .by_index(part_index)
            .with_context(|| format!("failed to open part index {part_index}"))?;

        let mut raw = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut raw)
            .with_context(|| format!("failed to read part {}", entry.name()))?;

        Ok(raw)
    }
}
