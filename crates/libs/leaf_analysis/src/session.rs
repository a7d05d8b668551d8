use crate::compress::{ImageDecoder, ImageEncoder, NativeCodec};
use crate::{AnalysisError, AnalysisResult, LeafAnalyzer};
use tokio::sync::watch;
use tracing::info;

/// What a front end renders: the picked image, a busy flag and either a verdict or an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub selected_image: Option<String>,
    pub busy: bool,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    generation: u64,
}

impl AnalysisState {
    /// Number of analyses started so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holds the presentation state and runs analyses against it.
///
/// The latest trigger wins: an analysis that completes after a newer one was started
/// is dropped instead of overwriting the newer state. Superseded calls are not aborted.
pub struct AnalysisSession<D = NativeCodec, E = NativeCodec> {
    analyzer: LeafAnalyzer<D, E>,
    state: watch::Sender<AnalysisState>,
}

impl<D: ImageDecoder, E: ImageEncoder> AnalysisSession<D, E> {
    #[must_use]
    pub fn new(analyzer: LeafAnalyzer<D, E>) -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        Self { analyzer, state }
    }

    #[must_use]
    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    /// Runs one analysis for an image given as a data URL and records its outcome.
    pub async fn analyze(&self, data_url: &str) -> Result<AnalysisResult, AnalysisError> {
        let generation = self.begin(data_url);
        let outcome = self.analyzer.analyze_data_url(data_url).await;
        if !self.finish(generation, &outcome) {
            info!("Analysis #{generation} was superseded, dropping its outcome");
        }
        outcome
    }

    fn begin(&self, data_url: &str) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            state.selected_image = Some(data_url.to_string());
            state.busy = true;
            state.result = None;
            state.error = None;
        });
        generation
    }

    /// Returns false when a newer analysis owns the state.
    fn finish(&self, generation: u64, outcome: &Result<AnalysisResult, AnalysisError>) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.busy = false;
            match outcome {
                Ok(verdict) => state.result = Some(verdict.clone()),
                Err(e) => state.error = Some(e.to_string()),
            }
            true
        })
    }
}
