//! Kit archive: one deflate-compressed zip holding every deliverable.
//!
//! Entry order is fixed so archives are easy to diff:
//! `brand_text.txt`, `logo.png` (when present), `<stem>_brand_guide.pdf`.

use crate::error::BrandKitError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the copy entry.
pub const TEXT_ENTRY: &str = "brand_text.txt";
/// Name of the logo entry.
pub const LOGO_ENTRY: &str = "logo.png";

/// The files that go into a kit archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveContents<'a> {
    pub copy: &'a str,
    pub logo_png: Option<&'a [u8]>,
    pub guide_name: &'a str,
    pub guide_pdf: &'a [u8],
}

/// Build the zip in memory.
pub fn build_archive(contents: ArchiveContents<'_>) -> Result<Vec<u8>, BrandKitError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    let mut entries: Vec<(&str, &[u8])> = vec![(TEXT_ENTRY, contents.copy.as_bytes())];
    if let Some(png) = contents.logo_png {
        entries.push((LOGO_ENTRY, png));
    }
    entries.push((contents.guide_name, contents.guide_pdf));

    for (name, bytes) in entries {
        writer
            .start_file(name, options)
            .map_err(|e| BrandKitError::ArchiveFailed(format!("{}: {}", name, e)))?;
        writer
            .write_all(bytes)
            .map_err(|e| BrandKitError::ArchiveFailed(format!("{}: {}", name, e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| BrandKitError::ArchiveFailed(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            entries.push((file.name().to_string(), data));
        }
        entries
    }

    #[test]
    fn full_kit_has_three_entries_in_order() {
        let bytes = build_archive(ArchiveContents {
            copy: "Tagline: Brew boldly.",
            logo_png: Some(&b"\x89PNG fake"[..]),
            guide_name: "bean_there_brand_guide.pdf",
            guide_pdf: b"%PDF-1.7 fake",
        })
        .unwrap();

        let entries = read_entries(bytes);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            ["brand_text.txt", "logo.png", "bean_there_brand_guide.pdf"]
        );
        assert_eq!(entries[0].1, b"Tagline: Brew boldly.");
        assert_eq!(entries[2].1, b"%PDF-1.7 fake");
    }

    #[test]
    fn logo_entry_omitted_without_logo() {
        let bytes = build_archive(ArchiveContents {
            copy: "x",
            logo_png: None,
            guide_name: "brand_brand_guide.pdf",
            guide_pdf: b"%PDF",
        })
        .unwrap();
        let names: Vec<String> = read_entries(bytes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["brand_text.txt", "brand_brand_guide.pdf"]);
    }

    #[test]
    fn entries_are_deflated() {
        let copy = "Brew boldly. ".repeat(200);
        let bytes = build_archive(ArchiveContents {
            copy: &copy,
            logo_png: None,
            guide_name: "g.pdf",
            guide_pdf: b"%PDF",
        })
        .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let file = archive.by_name(TEXT_ENTRY).unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        assert!(file.compressed_size() < file.size());
    }
}
