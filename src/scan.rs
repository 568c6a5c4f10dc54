use std::io::{Read, Seek};

use anyhow::Result;
use tracing::warn;

use crate::archive::BookArchive;
use crate::doctree::{HtmlPartDocument, PartDocument};
use crate::model::PartMatch;
use crate::normalize::TextNormalizer;

/// Separator between a part's heading labels when composing its chapter title.
pub const TITLE_SEPARATOR: &str = " | ";

const MARKUP_EXTENSIONS: [&str; 2] = [".html", ".xhtml"];

pub fn has_markup_extension(part_name: &str) -> bool {
    MARKUP_EXTENSIONS
        .iter()
        .any(|extension| part_name.ends_with(extension))
}

/// Strips any archive directory prefix, leaving the human-readable part name.
pub fn part_base_name(part_name: &str) -> &str {
    part_name.rsplit('/').next().unwrap_or(part_name)
}

/// Scans archive parts from `start_part_index` onward, in archive order, for
/// the first markup part whose normalized visible text contains the
/// normalized fragment. An offset of 0 is a legitimate result here; the
/// caller decides how much to trust it. Parts that cannot be read are logged
/// and skipped so one corrupt entry does not abort the whole lookup.
pub fn find_chapter_containing<R: Read + Seek>(
    fragment: &str,
    archive: &mut BookArchive<R>,
    start_part_index: usize,
    normalizer: &TextNormalizer,
) -> Result<Option<PartMatch>> {
    let target = normalizer.normalize(fragment);

    for part_index in start_part_index..archive.part_count() {
        let part_name = archive.part_name(part_index).to_string();
        if !has_markup_extension(&part_name) {
            continue;
        }

        let raw = match archive.read_part(part_index) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(part = %part_name, error = %error, "skipping unreadable part");
                continue;
            }
        };

        let document = HtmlPartDocument::parse(&String::from_utf8_lossy(&raw))?;
        if let Some((offset, chapter_title)) = match_in_document(&document, &target, normalizer) {
            return Ok(Some(PartMatch {
                chapter_title,
                offset,
                part_index,
                part_name: part_base_name(&part_name).to_string(),
            }));
        }
    }

    warn!(
        start_part_index,
        fragment = %fragment,
        "no part contains fragment"
    );
    Ok(None)
}

fn match_in_document<D: PartDocument>(
    document: &D,
    normalized_target: &str,
    normalizer: &TextNormalizer,
) -> Option<(usize, String)> {
    let text = normalizer.normalize(document.visible_text());
    let offset = text.find(normalized_target)?;
    Some((offset, document.heading_labels().join(TITLE_SEPARATOR)))
}
