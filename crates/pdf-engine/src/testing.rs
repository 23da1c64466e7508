//! In-memory PDF fixtures for tests.

use lopdf::{dictionary, Document, Object, Stream};
use std::fs;
use std::path::{Path, PathBuf};

pub fn letter_pages(count: usize) -> Vec<(f32, f32)> {
    vec![(612.0, 792.0); count]
}

/// Build a PDF with one page per `(width_pt, height_pt)` entry.
pub fn pdf_with_pages(sizes: &[(f32, f32)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = sizes
        .iter()
        .map(|&(width, height)| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            })
            .into()
        })
        .collect();

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => sizes.len() as i64,
    };
    finish(doc, pages_id, pages)
}

/// Single page drawn by the content stream `content`.
pub fn pdf_with_content(width: f32, height: f32, content: &[u8]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1_i64,
    };
    finish(doc, pages_id, pages)
}

/// Single page whose MediaBox lives on the page tree node and whose
/// rotation lives on the page itself.
pub fn rotated_page_pdf(width: f32, height: f32, rotate: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Rotate" => rotate,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1_i64,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
    };
    finish(doc, pages_id, pages)
}

fn finish(mut doc: Document, pages_id: lopdf::ObjectId, pages: lopdf::Dictionary) -> Vec<u8> {
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("in-memory PDF should serialize");
    bytes
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("fixture should be written");
    path
}
