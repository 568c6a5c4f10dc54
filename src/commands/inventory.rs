use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::archive::BookArchive;
use crate::cli::InventoryArgs;
use crate::doctree::{HtmlPartDocument, PartDocument};
use crate::model::{PartEntry, PartInventoryManifest};
use crate::scan::{TITLE_SEPARATOR, has_markup_extension};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.book)?;

    if args.dry_run {
        info!(
            part_count = manifest.part_count,
            eligible = manifest.parts.iter().filter(|part| part.eligible).count(),
            book = %manifest.book_path,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.book.with_extension("inventory.json"));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote part inventory manifest");
    info!(part_count = manifest.part_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(book: &Path) -> Result<PartInventoryManifest> {
    let mut archive = BookArchive::open(book)?;
    let book_sha256 = sha256_file(book)?;

    let mut parts = Vec::with_capacity(archive.part_count());
    for index in 0..archive.part_count() {
        let name = archive.part_name(index).to_string();
        let eligible = has_markup_extension(&name);

        let chapter_title = if eligible {
            match archive.read_part(index) {
                Ok(raw) => {
                    let document = HtmlPartDocument::parse(&String::from_utf8_lossy(&raw))?;
                    let labels = document.heading_labels();
                    if labels.is_empty() {
                        None
                    } else {
                        Some(labels.join(TITLE_SEPARATOR))
                    }
                }
                Err(error) => {
                    warn!(part = %name, error = %error, "skipping unreadable part");
                    None
                }
            }
        } else {
            None
        };

        parts.push(PartEntry {
            index,
            name,
            eligible,
            chapter_title,
        });
    }

    Ok(PartInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        book_path: book.display().to_string(),
        book_sha256,
        part_count: parts.len(),
        parts,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    #[test]
    fn manifest_lists_parts_with_eligibility_and_titles() {
        let dir = tempfile::tempdir().unwrap();
        let book_path = dir.path().join("book.epub");

        let mut writer = ZipWriter::new(fs::File::create(&book_path).unwrap());
        writer
            .start_file("mimetype", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"application/epub+zip").unwrap();
        writer
            .start_file("OEBPS/ch01.xhtml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"<html><body><h1>Intro</h1><p>Text.</p></body></html>")
            .unwrap();
        writer
            .start_file("OEBPS/notes.xhtml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"<html><body><p>No headings here.</p></body></html>")
            .unwrap();
        writer.finish().unwrap();

        let manifest = build_manifest(&book_path).unwrap();

        assert_eq!(manifest.manifest_version, 1);
        assert_eq!(manifest.part_count, 3);
        assert_eq!(manifest.book_sha256.len(), 64);

        assert_eq!(manifest.parts[0].name, "mimetype");
        assert!(!manifest.parts[0].eligible);
        assert_eq!(manifest.parts[0].chapter_title, None);

        assert_eq!(manifest.parts[1].name, "OEBPS/ch01.xhtml");
        assert!(manifest.parts[1].eligible);
        assert_eq!(manifest.parts[1].chapter_title, Some("Intro".to_string()));

        assert!(manifest.parts[2].eligible);
        assert_eq!(manifest.parts[2].chapter_title, None);
    }

    #[test]
    fn manifest_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let book_path = dir.path().join("book.epub");

        let mut writer = ZipWriter::new(fs::File::create(&book_path).unwrap());
        writer
            .start_file("ch01.xhtml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"<html><body><h1>One</h1></body></html>")
            .unwrap();
        writer.finish().unwrap();

        let manifest_path = dir.path().join("inventory.json");
        let args = InventoryArgs {
            book: book_path,
            manifest_path: Some(manifest_path.clone()),
            dry_run: false,
        };
        run(args).unwrap();

        let raw = fs::read_to_string(&manifest_path).unwrap();
        assert!(raw.contains("\"part_count\": 1"));
        assert!(raw.contains("\"chapter_title\": \"One\""));
    }
}
