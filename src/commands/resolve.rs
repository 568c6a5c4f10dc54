use std::fs;
use std::io::{self, Read, Seek, Write};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::archive::BookArchive;
use crate::cli::ResolveArgs;
use crate::datefilter::DateLineFilter;
use crate::model::{ChapterEntry, ChapterGroups, ChapterReport, ResolutionState, ResolveReport};
use crate::normalize::TextNormalizer;
use crate::scan::find_chapter_containing;
use crate::util::now_utc_string;

/// Bucket for notes that cannot be attributed to any chapter, even by
/// carry-over.
const UNKNOWN_CHAPTER: &str = "unknown";

pub fn run(args: ResolveArgs) -> Result<()> {
    let notes_raw = fs::read_to_string(&args.notes)
        .with_context(|| format!("failed to read notes file: {}", args.notes.display()))?;
    if notes_raw.trim().is_empty() {
        bail!("notes input is empty: {}", args.notes.display());
    }

    let mut archive = BookArchive::open(&args.book)?;
    info!(
        book = %args.book.display(),
        parts = archive.part_count(),
        "opened book archive"
    );

    let filter = DateLineFilter::new()?;
    let normalizer = TextNormalizer::new()?;

    let lines = filter.filter_lines(&notes_raw);
    let (groups, state) = resolve_notes(&lines, &mut archive, &normalizer, args.fragment_chars)?;
    if groups.is_empty() {
        warn!("no notes left to report after filtering");
    }

    if args.json {
        write_json_report(&groups, &state)?;
    } else {
        write_text_report(&assemble_report(&groups))?;
    }

    info!(
        chapters = groups.len(),
        notes = groups.entry_count(),
        not_found = state.not_found_count,
        "resolve completed"
    );
    Ok(())
}

/// Folds the filtered note lines into chapter groups. Every non-empty line
/// produces exactly one entry in exactly one bucket; lookups that miss (or
/// that only match at the very start of a part, which is treated as
/// unreliable) fall back to the previously resolved chapter, or to the
/// "unknown" bucket when there is none. Fallback entries are prefixed with
/// `?` to flag the uncertain attribution.
pub fn resolve_notes<R: Read + Seek>(
    lines: &[String],
    archive: &mut BookArchive<R>,
    normalizer: &TextNormalizer,
    fragment_chars: usize,
) -> Result<(ChapterGroups, ResolutionState)> {
    let mut groups = ChapterGroups::default();
    let mut state = ResolutionState::default();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        // Notes may paraphrase or trail off after the opening quote, so only
        // a bounded prefix is used as the search key. Every lookup restarts
        // from part 0: notes are not guaranteed to be in document order.
        let fragment: String = line.chars().take(fragment_chars).collect();
        let found = find_chapter_containing(&fragment, archive, 0, normalizer)?;

        match found {
            Some(found) if found.offset > 0 => {
                if found.chapter_title.is_empty() {
                    warn!(
                        fragment = %fragment,
                        part = %found.part_name,
                        part_index = found.part_index,
                        previous = %state.previous_chapter,
                        "match has no chapter title; falling back to previous chapter"
                    );
                    groups.push(
                        state.previous_chapter.clone(),
                        ChapterEntry {
                            text: format!("? {line}"),
                            offset: Some(found.offset),
                            part_name: found.part_name,
                        },
                    );
                } else {
                    groups.push(
                        found.chapter_title.clone(),
                        ChapterEntry {
                            text: line.clone(),
                            offset: Some(found.offset),
                            part_name: found.part_name,
                        },
                    );
                    state.previous_chapter = found.chapter_title;
                }
            }
            other => {
                if other.is_none() {
                    state.not_found_count += 1;
                }

                let entry = ChapterEntry {
                    text: format!("? {line}"),
                    offset: None,
                    part_name: String::new(),
                };

                if state.previous_chapter.is_empty() {
                    warn!(fragment = %fragment, "unresolved note routed to unknown bucket");
                    groups.push(UNKNOWN_CHAPTER.to_string(), entry);
                } else {
                    warn!(
                        fragment = %fragment,
                        previous = %state.previous_chapter,
                        "unresolved note carried over to previous chapter"
                    );
                    groups.push(state.previous_chapter.clone(), entry);
                }
            }
        }
    }

    Ok((groups, state))
}

/// Orders a chapter's entries by `(part name, offset)`. Fallback entries
/// (empty part name, sentinel offset) sort ahead of real matches, keeping
/// low-confidence notes grouped predictably at the front.
pub fn sorted_entries(entries: &[ChapterEntry]) -> Vec<ChapterEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.part_name.cmp(&b.part_name).then(a.offset.cmp(&b.offset)));
    sorted
}

/// Serializes the groups into report lines: a header per chapter in
/// discovery order, followed by that chapter's notes separated by blank
/// lines.
pub fn assemble_report(groups: &ChapterGroups) -> Vec<String> {
    let mut report = Vec::new();

    for (title, entries) in groups.iter() {
        info!(chapter = %title, notes = entries.len(), "assembled chapter");
        report.push(format!("\n\n{title}\n"));

        let ordered = sorted_entries(entries);
        report.push(
            ordered
                .iter()
                .map(|entry| entry.text.as_str())
                .collect::<Vec<&str>>()
                .join("\n\n"),
        );
    }

    report
}

fn write_text_report(report_lines: &[String]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "{}", report_lines.join("\n"))?;
    output.flush()?;
    Ok(())
}

fn write_json_report(groups: &ChapterGroups, state: &ResolutionState) -> Result<()> {
    let chapters = groups
        .iter()
        .map(|(title, entries)| ChapterReport {
            title: title.clone(),
            notes: sorted_entries(entries),
        })
        .collect();

    let report = ResolveReport {
        generated_at: now_utc_string(),
        not_found_count: state.not_found_count,
        chapters,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &report)
        .context("failed to serialize resolve report")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
