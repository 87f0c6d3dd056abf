//! Audio transcription.

use crate::config::ProjectLayout;
use crate::error::Result;
use crate::services::Transcriber;
use crate::store::ArtifactStore;

use super::StageMarker;

/// Turns the recorded conversation into `transcript.txt`.
pub struct TranscribeStage<'a> {
    transcriber: &'a dyn Transcriber,
    store: &'a dyn ArtifactStore,
    layout: &'a ProjectLayout,
}

impl<'a> TranscribeStage<'a> {
    /// Create the stage.
    pub fn new(
        transcriber: &'a dyn Transcriber,
        store: &'a dyn ArtifactStore,
        layout: &'a ProjectLayout,
    ) -> Self {
        Self {
            transcriber,
            store,
            layout,
        }
    }

    /// Whether a transcript already exists.
    pub fn marker(&self) -> StageMarker {
        StageMarker::probe(self.store, &self.layout.transcript)
    }

    /// Transcribe the audio input and write the transcript.
    ///
    /// Always transcribes, replacing any previous transcript.
    pub fn run(&self) -> Result<String> {
        let audio = self.store.read(&self.layout.audio)?;
        let file_name = self
            .layout
            .audio
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let text = self.transcriber.transcribe(&audio, &file_name)?;
        self.store.write(&self.layout.transcript, text.as_bytes())?;
        log::info!(
            "Transcript saved: {} ({} chars)",
            self.layout.transcript.display(),
            text.chars().count()
        );
        Ok(text)
    }
}
