use crate::core::model::{GeneratedScript, ScriptRequest};
use crate::services::generator::ScriptGenerator;
use anyhow::Result;
use futures_util::future::{AbortHandle, Abortable, Aborted};
use log::{debug, error, info};
use std::future::Future;

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate script. Please try again.";

/// What a finished generation task hands back to [`ScriptApp::complete`].
pub type GenerationOutcome = std::result::Result<Result<GeneratedScript>, Aborted>;

#[derive(Debug, Clone, PartialEq)]
pub enum AppPhase {
    Idle,
    Generating,
    Showing(GeneratedScript),
}

/// Identifies one generation request; results carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Root view state: form, then a pending generation, then the result.
pub struct ScriptApp {
    generator: ScriptGenerator,
    phase: AppPhase,
    ticket: u64,
    abort: Option<AbortHandle>,
    error: Option<String>,
}

impl ScriptApp {
    pub fn new(generator: ScriptGenerator) -> Self {
        Self {
            generator,
            phase: AppPhase::Idle,
            ticket: 0,
            abort: None,
            error: None,
        }
    }

    pub fn phase(&self) -> &AppPhase {
        &self.phase
    }

    pub fn is_generating(&self) -> bool {
        self.phase == AppPhase::Generating
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Moves to `Generating` and returns the work to run.
    ///
    /// The caller spawns or awaits the future, then passes its output to
    /// [`ScriptApp::complete`] with the same ticket. A pending request is
    /// aborted first.
    pub fn request_script(
        &mut self,
        request: ScriptRequest,
    ) -> (Ticket, impl Future<Output = GenerationOutcome> + 'static) {
        self.cancel_pending();
        self.ticket += 1;
        self.phase = AppPhase::Generating;
        self.error = None;
        info!("Requesting {} script on {:?}", request.format, request.topic);

        let (handle, registration) = AbortHandle::new_pair();
        self.abort = Some(handle);
        let generator = self.generator.clone();
        let work = async move { generator.generate(&request).await };
        (Ticket(self.ticket), Abortable::new(work, registration))
    }

    /// Applies a finished generation. Returns false when the result was stale.
    pub fn complete(&mut self, ticket: Ticket, outcome: GenerationOutcome) -> bool {
        if ticket != Ticket(self.ticket) || !self.is_generating() {
            debug!("Dropping result of superseded generation {:?}", ticket);
            return false;
        }
        self.abort = None;
        match outcome {
            Ok(Ok(script)) => {
                self.phase = AppPhase::Showing(script);
            }
            Ok(Err(e)) => {
                error!("Script generation failed: {:#}", e);
                self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
                self.phase = AppPhase::Idle;
            }
            Err(Aborted) => {
                debug!("Generation {:?} was aborted", ticket);
                self.phase = AppPhase::Idle;
            }
        }
        true
    }

    /// Requests and waits for a script in one step.
    pub async fn generate(&mut self, request: ScriptRequest) -> &AppPhase {
        let (ticket, work) = self.request_script(request);
        let outcome = work.await;
        self.complete(ticket, outcome);
        &self.phase
    }

    /// Abandons any pending generation and the current result.
    pub fn start_over(&mut self) {
        self.cancel_pending();
        self.phase = AppPhase::Idle;
        self.error = None;
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.abort.take() {
            handle.abort();
        }
    }
}
