//! Integration tests for the end-to-end pipeline.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use image::{ImageFormat, Rgb, RgbImage};
use storyshelf::error::Result;
use storyshelf::{
    ArtifactStore, Error, FsStore, ImageGenerator, ImageRequest, Pipeline, PipelineOptions,
    PipelineState, PlanGenerator, ProjectLayout, Stage, ValidationError, VersionPublisher,
};

const PLAN: &str = r#"{
  "title": "うみのひみつ",
  "target_age": "6-8",
  "page_count": 2,
  "style_bible": "やわらかい水彩",
  "characters": [{"name": "ハル", "description": "好奇心いっぱいの男の子"}],
  "pages": [
    {"page": 1, "text": "ハルはうみへいきました。", "scene_summary": "beach", "image_prompt_api": "a boy at the beach"},
    {"page": 2, "text": "なみがキラキラひかっています。", "scene_summary": "waves", "image_prompt_api": "sparkling waves"}
  ]
}"#;

struct FakePlanner {
    response: &'static str,
    calls: AtomicUsize,
}

impl FakePlanner {
    fn new(response: &'static str) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PlanGenerator for FakePlanner {
    fn generate_plan(&self, prompt: &str) -> Result<String> {
        assert!(prompt.contains("海"));
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.to_string())
    }
}

struct FakeIllustrator {
    fail_on: Option<u32>,
    calls: AtomicUsize,
}

impl FakeIllustrator {
    fn new(fail_on: Option<u32>) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

impl ImageGenerator for FakeIllustrator {
    fn generate_image(&self, request: &ImageRequest) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(request.page) {
            return Err(Error::external("image generation", "quota exceeded"));
        }
        let image = RgbImage::from_pixel(32, 32, Rgb([40, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| Error::Image(e.to_string()))?;
        Ok(out.into_inner())
    }
}

#[derive(Default)]
struct RecordingVersionPublisher {
    calls: Mutex<Vec<(Vec<PathBuf>, String)>>,
}

impl VersionPublisher for RecordingVersionPublisher {
    fn publish(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((paths.to_vec(), message.to_string()));
        Ok(())
    }
}

fn project() -> (tempfile::TempDir, FsStore, ProjectLayout) {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());
    let layout = ProjectLayout::default();
    let transcript = "今日は家族で海に行きました。波がとてもきれいで、貝殻をたくさん拾いました。".repeat(2);
    store
        .write(&layout.transcript, transcript.as_bytes())
        .unwrap();
    (dir, store, layout)
}

#[test]
fn test_full_run_publishes_and_commits() {
    let (dir, store, layout) = project();
    let planner = FakePlanner::new(PLAN);
    let illustrator = FakeIllustrator::new(None);
    let git = RecordingVersionPublisher::default();

    let mut pipeline = Pipeline::new(&store, &planner, &illustrator)
        .with_layout(layout.clone())
        .with_version_publisher(&git);
    let report = pipeline.run().unwrap();

    assert_eq!(pipeline.state(), PipelineState::Success);
    assert_eq!(report.plan.title, "うみのひみつ");
    assert_eq!(report.images.generated, vec![1, 2]);
    assert_eq!(report.document_pages, 2);
    assert_eq!(report.shelf_size, 1);
    assert!(report.versioned);

    let pdf = lopdf::Document::load(dir.path().join("output/book.pdf")).unwrap();
    assert_eq!(pdf.get_pages().len(), 2);

    let book_dir = dir.path().join(&report.book.dir);
    assert!(book_dir.join("viewer.html").exists());
    assert!(book_dir.join("details.html").exists());
    assert!(book_dir.join("pages/01.png").exists());
    assert!(book_dir.join("pages/02.png").exists());
    assert!(book_dir.join("transcript.txt").exists());

    let index = std::fs::read_to_string(dir.path().join("docs/index.html")).unwrap();
    assert!(index.contains("うみのひみつ"));
    assert!(index.contains(report.book.id.as_str()));

    let calls = git.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        vec![PathBuf::from("docs/index.html"), PathBuf::from("docs/books")]
    );
    assert!(calls[0].1.starts_with("Add new book "));
}

#[test]
fn test_failed_stage_stops_and_resumes() {
    let (dir, store, layout) = project();
    let planner = FakePlanner::new(PLAN);

    let failing = FakeIllustrator::new(Some(2));
    let mut pipeline =
        Pipeline::new(&store, &planner, &failing).with_layout(layout.clone());
    let err = pipeline.run().unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Imaging));
    assert_eq!(pipeline.state(), PipelineState::Failed(Stage::Imaging));
    assert!(err.to_string().contains("quota exceeded"));
    assert!(dir.path().join("output/pages/01.png").exists());
    assert!(!dir.path().join("output/pages/02.png").exists());
    assert!(!dir.path().join("output/book.pdf").exists());
    assert!(!dir.path().join("docs").exists());

    // Resume: the plan is reused and only the missing page is generated.
    let working = FakeIllustrator::new(None);
    let mut pipeline = Pipeline::new(&store, &planner, &working)
        .with_layout(layout)
        .with_options(PipelineOptions::new().with_reuse_plan(true));
    let report = pipeline.run().unwrap();

    assert_eq!(planner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(working.calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.images.skipped, vec![1]);
    assert_eq!(report.images.generated, vec![2]);
    assert!(!report.versioned);
}

#[test]
fn test_invalid_plan_fails_planning() {
    let (dir, store, layout) = project();
    let planner = FakePlanner::new(r#"{"title":"x","page_count":3,"pages":[{"page":1}]}"#);
    let illustrator = FakeIllustrator::new(None);

    let mut pipeline = Pipeline::new(&store, &planner, &illustrator).with_layout(layout);
    let err = pipeline.run().unwrap_err();

    match err {
        Error::StageFailed { stage, source } => {
            assert_eq!(stage, Stage::Planning);
            assert!(matches!(
                *source,
                Error::Validation(ValidationError::PageCountMismatch {
                    declared: 3,
                    actual: 1
                })
            ));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(illustrator.calls.load(Ordering::SeqCst), 0);
    assert!(!Path::new(&dir.path().join("work/book_plan.json")).exists());
}

#[test]
fn test_stage_observer_sees_every_stage() {
    let (_dir, store, layout) = project();
    let planner = FakePlanner::new(PLAN);
    let illustrator = FakeIllustrator::new(None);
    let git = RecordingVersionPublisher::default();
    let seen = Mutex::new(Vec::new());

    let mut pipeline = Pipeline::new(&store, &planner, &illustrator)
        .with_layout(layout)
        .with_version_publisher(&git)
        .on_stage(|stage| seen.lock().unwrap().push(stage));
    pipeline.run().unwrap();
    drop(pipeline);

    assert_eq!(seen.into_inner().unwrap(), Stage::ALL.to_vec());
}
