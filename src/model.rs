use serde::Serialize;

/// A scanner hit: the first archive part whose normalized text contains the
/// lookup fragment. "Not found" is represented by `Option::None` at the call
/// sites, not by sentinel field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartMatch {
    pub chapter_title: String,
    pub offset: usize,
    pub part_index: usize,
    pub part_name: String,
}

/// One note filed under a chapter. `offset: None` marks a fallback entry with
/// no real match position; `None` sorts before every real offset, so fallback
/// entries lead their part group. Fallback entries also carry an empty
/// `part_name`, which sorts before every real part name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterEntry {
    pub text: String,
    pub offset: Option<usize>,
    pub part_name: String,
}

/// Chapter-title -> entries mapping that iterates in first-insertion order.
/// Titles are opaque grouping keys; two parts of one logical chapter may
/// yield distinct titles and therefore distinct groups.
#[derive(Debug, Default)]
pub struct ChapterGroups {
    chapters: Vec<(String, Vec<ChapterEntry>)>,
}

impl ChapterGroups {
    pub fn push(&mut self, title: String, entry: ChapterEntry) {
        if let Some((_, entries)) = self
            .chapters
            .iter_mut()
            .find(|(existing, _)| *existing == title)
        {
            entries.push(entry);
        } else {
            self.chapters.push((title, vec![entry]));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Vec<ChapterEntry>)> {
        self.chapters.iter()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.chapters.iter().map(|(_, entries)| entries.len()).sum()
    }
}

/// Per-run resolver state: the carry-over chapter for unresolved notes and
/// the diagnostic count of fragments the scanner never found.
#[derive(Debug, Default)]
pub struct ResolutionState {
    pub previous_chapter: String,
    pub not_found_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartEntry {
    pub index: usize,
    pub name: String,
    pub eligible: bool,
    pub chapter_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub book_path: String,
    pub book_sha256: String,
    pub part_count: usize,
    pub parts: Vec<PartEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChapterReport {
    pub title: String,
    pub notes: Vec<ChapterEntry>,
}

#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub generated_at: String,
    pub not_found_count: usize,
    pub chapters: Vec<ChapterReport>,
}
