//! Integration tests for composing, publishing, and the shelf page.

use std::io::Cursor;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use image::{ImageFormat, Rgb, RgbImage};
use storyshelf::{catalog, ArtifactStore, Error, Publisher, StoryShelf};

const PLAN: &str = r#"{
  "title": "森のおんがくかい",
  "target_age": "4-6",
  "page_count": 3,
  "pages": [
    {"page": 1, "text": "森のなかで、りすがたいこをたたきました。", "image_prompt_api": "squirrel drum"},
    {"page": 2, "text": "", "image_prompt_api": "owl singing"},
    {"page": 3, "text": "みんなでうたって、おしまい。\nまたあした。", "image_prompt_api": "forest choir"}
  ]
}"#;

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([90, 160, 60]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 2)
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}

fn ready_project(root: &Path) -> StoryShelf {
    let shelf = StoryShelf::open(root);
    let store = shelf.store();
    let layout = shelf.layout();
    store.write(&layout.plan, PLAN.as_bytes()).unwrap();
    store.write(&layout.page_image(1), &png(64, 48)).unwrap();
    store.write(&layout.page_image(2), &png(48, 64)).unwrap();
    store.write(&layout.page_image(3), &png(40, 40)).unwrap();
    shelf
}

#[test]
fn test_make_pdf_one_page_per_plan_page() {
    let dir = tempfile::tempdir().unwrap();
    let shelf = ready_project(dir.path());

    assert_eq!(shelf.make_pdf().unwrap(), 3);

    let pdf = lopdf::Document::load(dir.path().join("output/book.pdf")).unwrap();
    assert_eq!(pdf.get_pages().len(), 3);
}

#[test]
fn test_make_pdf_requires_every_image() {
    let dir = tempfile::tempdir().unwrap();
    let shelf = ready_project(dir.path());
    std::fs::remove_file(dir.path().join("output/pages/02.png")).unwrap();

    let err = shelf.make_pdf().unwrap_err();
    assert!(matches!(err, Error::MissingArtifact(ref p) if p.ends_with("02.png")));
    assert!(!dir.path().join("output/book.pdf").exists());
}

#[test]
fn test_publish_then_shelf_lists_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let shelf = ready_project(dir.path());
    shelf.make_pdf().unwrap();

    let publisher = Publisher::new(shelf.store(), shelf.layout());
    let first = publisher.publish_at(at(9, 0, 0)).unwrap();
    let second = publisher.publish_at(at(9, 0, 0)).unwrap();
    let newest = publisher.publish_at(at(18, 30, 0)).unwrap();

    assert_eq!(first.id.as_str(), "20250102_090000");
    assert_eq!(second.id.as_str(), "20250102_090001");
    assert_eq!(newest.id.as_str(), "20250102_183000");
    assert_eq!(newest.pages, 3);
    assert!(!newest.has_prompt);
    assert!(!newest.has_transcript);

    // A half-written directory without a reader page is not a book yet.
    shelf
        .store()
        .write(
            Path::new("docs/books/20991231_235959/book_plan.json"),
            PLAN.as_bytes(),
        )
        .unwrap();

    let entries = shelf.build_shelf().unwrap();
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["20250102_183000", "20250102_090001", "20250102_090000"]
    );
    assert!(entries.iter().all(|e| e.title == "森のおんがくかい"));
    assert!(entries.iter().all(|e| e.has_cover && e.has_details && e.has_document));
    assert_eq!(entries[0].target_age.as_deref(), Some("4-6"));
    assert_eq!(entries[0].label(), "2025-01-02 18:30:00");

    let index = std::fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
    assert!(index.contains("books/20250102_183000/viewer.html"));
    assert!(!index.contains("20991231_235959"));
}

#[test]
fn test_published_snapshot_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let shelf = ready_project(dir.path());
    shelf.make_pdf().unwrap();

    let book = Publisher::new(shelf.store(), shelf.layout())
        .publish_at(at(12, 0, 0))
        .unwrap();
    let book_dir = dir.path().join(&book.dir);

    assert_eq!(
        std::fs::read_to_string(book_dir.join("book_plan.json")).unwrap(),
        PLAN
    );
    assert_eq!(
        std::fs::read(book_dir.join("pages/02.png")).unwrap(),
        std::fs::read(dir.path().join("output/pages/02.png")).unwrap()
    );
    assert_eq!(
        std::fs::read(book_dir.join("book.pdf")).unwrap(),
        std::fs::read(dir.path().join("output/book.pdf")).unwrap()
    );

    let viewer = std::fs::read_to_string(book_dir.join("viewer.html")).unwrap();
    assert!(viewer.contains("森のおんがくかい"));
    assert!(viewer.contains("book_plan.json"));
}

#[test]
fn test_book_joins_shelf_once_viewer_exists() {
    let dir = tempfile::tempdir().unwrap();
    let shelf = StoryShelf::open(dir.path());
    let book_dir = Path::new("docs/books/20250102_090000");
    shelf
        .store()
        .write(&book_dir.join("book_plan.json"), PLAN.as_bytes())
        .unwrap();

    assert!(shelf.build_shelf().unwrap().is_empty());

    shelf
        .store()
        .write(&book_dir.join("viewer.html"), b"<!DOCTYPE html>")
        .unwrap();
    let entries = shelf.build_shelf().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "20250102_090000");
    assert!(!entries[0].has_document);

    let index = std::fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
    assert!(index.contains("books/20250102_090000/viewer.html"));
}

#[test]
fn test_irregular_published_plan_keeps_shelf() {
    let dir = tempfile::tempdir().unwrap();
    let shelf = StoryShelf::open(dir.path());
    for (id, plan) in [
        ("20250101_000000", r#"{"title":"old","target_age":12}"#),
        ("20250102_000000", r#"{"title":"new","target_age":"6-8"}"#),
    ] {
        let book_dir = Path::new("docs/books").join(id);
        shelf
            .store()
            .write(&book_dir.join("book_plan.json"), plan.as_bytes())
            .unwrap();
        shelf
            .store()
            .write(&book_dir.join("viewer.html"), b"<!DOCTYPE html>")
            .unwrap();
    }

    let entries = shelf.build_shelf().unwrap();
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "old"]);
    assert_eq!(entries[1].target_age, None);
}

#[test]
fn test_scan_skips_stray_files() {
    let dir = tempfile::tempdir().unwrap();
    let shelf = StoryShelf::open(dir.path());
    shelf
        .store()
        .write(Path::new("docs/books/README.txt"), b"not a book")
        .unwrap();

    let entries = catalog::scan(shelf.store(), &shelf.layout().books_dir).unwrap();
    assert!(entries.is_empty());
}
