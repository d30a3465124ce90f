use crate::core::model::{
    ScriptFormat, ScriptRequest, Tone, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    EmptyTopic,
    DurationOutOfRange(u32),
    GenerationInProgress,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::EmptyTopic => write!(f, "Please enter a topic"),
            FormError::DurationOutOfRange(minutes) => write!(
                f,
                "Duration must be between {} and {} minutes (got {})",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, minutes
            ),
            FormError::GenerationInProgress => write!(f, "A script is already being generated"),
        }
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub topic: String,
    pub format: ScriptFormat,
    pub duration: u32,
    pub tone: Tone,
    pub audience: String,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            topic: String::new(),
            format: ScriptFormat::Presentation,
            duration: 5,
            tone: Tone::Professional,
            audience: String::new(),
        }
    }
}

impl FormDraft {
    pub fn validate(&self) -> Result<ScriptRequest, FormError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(FormError::EmptyTopic);
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration) {
            return Err(FormError::DurationOutOfRange(self.duration));
        }
        Ok(ScriptRequest {
            topic: topic.to_string(),
            format: self.format,
            duration: self.duration,
            tone: self.tone,
            audience: self.audience.trim().to_string(),
        })
    }
}

/// The request form. A submission locks the form until generation finishes
/// or the resubmit timeout runs out, whichever comes first.
#[derive(Debug, Clone)]
pub struct ScriptForm {
    pub draft: FormDraft,
    resubmit_timeout: Duration,
    submitted_at: Option<DateTime<Utc>>,
}

impl ScriptForm {
    pub fn new(resubmit_timeout: Duration) -> Self {
        Self {
            draft: FormDraft::default(),
            resubmit_timeout,
            submitted_at: None,
        }
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating_at(Utc::now())
    }

    pub fn is_generating_at(&self, now: DateTime<Utc>) -> bool {
        match self.submitted_at {
            Some(at) => match chrono::Duration::from_std(self.resubmit_timeout) {
                Ok(timeout) => now < at + timeout,
                Err(_) => true,
            },
            None => false,
        }
    }

    pub fn submit(&mut self) -> Result<ScriptRequest, FormError> {
        self.submit_at(Utc::now())
    }

    pub fn submit_at(&mut self, now: DateTime<Utc>) -> Result<ScriptRequest, FormError> {
        if self.is_generating_at(now) {
            return Err(FormError::GenerationInProgress);
        }
        let request = self.draft.validate()?;
        self.submitted_at = Some(now);
        Ok(request)
    }

    pub fn generation_finished(&mut self) {
        self.submitted_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(topic: &str, duration: u32) -> ScriptForm {
        let mut form = ScriptForm::new(Duration::from_millis(4000));
        form.draft.topic = topic.to_string();
        form.draft.duration = duration;
        form
    }

    #[test]
    fn test_defaults() {
        let draft = FormDraft::default();
        assert_eq!(draft.format, ScriptFormat::Presentation);
        assert_eq!(draft.duration, 5);
        assert_eq!(draft.tone, Tone::Professional);
    }

    #[test]
    fn test_validation() {
        assert_eq!(form_with("   ", 5).submit(), Err(FormError::EmptyTopic));
        assert_eq!(
            form_with("Tea", 0).submit(),
            Err(FormError::DurationOutOfRange(0))
        );
        assert_eq!(
            form_with("Tea", 61).submit(),
            Err(FormError::DurationOutOfRange(61))
        );
        assert!(form_with("Tea", 1).submit().is_ok());
        assert!(form_with("Tea", 60).submit().is_ok());
    }

    #[test]
    fn test_submission_trims_text() {
        let mut form = form_with("  Climate Change ", 10);
        form.draft.audience = " students ".to_string();
        form.draft.format = ScriptFormat::Podcast;
        let req = form.submit().unwrap();
        assert_eq!(req.topic, "Climate Change");
        assert_eq!(req.audience, "students");
        assert_eq!(req.format, ScriptFormat::Podcast);
    }

    #[test]
    fn test_resubmission_guard() {
        let t0 = Utc::now();
        let mut form = form_with("Tea", 5);
        assert!(form.submit_at(t0).is_ok());
        assert!(form.is_generating_at(t0));
        assert_eq!(
            form.submit_at(t0 + chrono::Duration::milliseconds(1000)),
            Err(FormError::GenerationInProgress)
        );

        // The timeout unlocks the form even without a result.
        let later = t0 + chrono::Duration::milliseconds(4000);
        assert!(!form.is_generating_at(later));
        assert!(form.submit_at(later).is_ok());

        // Finishing unlocks it immediately.
        form.generation_finished();
        assert!(!form.is_generating());
        assert!(form.submit().is_ok());
    }

    #[test]
    fn test_draft_survives_failed_generation() {
        let mut form = form_with("Tea", 15);
        form.draft.tone = Tone::Casual;
        assert!(form.submit().is_ok());
        assert_eq!(form.submit(), Err(FormError::GenerationInProgress));

        // The form comes back after a failure with what was entered.
        form.generation_finished();
        assert_eq!(form.draft.topic, "Tea");
        assert_eq!(form.draft.duration, 15);
        assert_eq!(form.draft.tone, Tone::Casual);
        assert_eq!(form.submit().map(|r| r.topic), Ok("Tea".to_string()));
    }

    #[test]
    fn test_invalid_submission_does_not_lock() {
        let mut form = form_with("", 5);
        assert!(form.submit().is_err());
        assert!(!form.is_generating());
    }
}
