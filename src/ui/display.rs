use crate::core::model::GeneratedScript;
use crate::services::export::{self, SharePayload};
use crate::services::speech::controller::lock;
use crate::services::speech::{PlaybackStatus, SharedController, SpeechOptions, Voice};
use crate::ui::platform::Platform;
use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// Range offered by the speed and pitch sliders.
pub const MIN_VOICE_SETTING: f32 = 0.5;
pub const MAX_VOICE_SETTING: f32 = 2.0;
pub const VOICE_SETTING_STEP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The platform cannot share; the full content went to the clipboard instead.
    Copied,
}

/// The result view: one generated script, its playback and its export actions.
///
/// Dropping it stops any speech it started.
pub struct ScriptDisplay {
    script: GeneratedScript,
    speech: SharedController,
    options: Mutex<SpeechOptions>,
    platform: Arc<dyn Platform>,
}

impl ScriptDisplay {
    pub fn new(
        script: GeneratedScript,
        speech: SharedController,
        options: SpeechOptions,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            script,
            speech,
            options: Mutex::new(options),
            platform,
        }
    }

    pub fn script(&self) -> &GeneratedScript {
        &self.script
    }

    fn options_guard(&self) -> MutexGuard<'_, SpeechOptions> {
        self.options.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn options(&self) -> SpeechOptions {
        self.options_guard().clone()
    }

    /// Voice settings take effect the next time playback starts from the beginning.
    pub fn set_options(&self, options: SpeechOptions) {
        *self.options_guard() = options;
    }

    /// `None` lets the platform pick its preferred voice.
    pub fn set_voice(&self, voice: Option<Voice>) {
        self.options_guard().voice = voice;
    }

    pub fn set_rate(&self, rate: f32) {
        self.options_guard().rate = clamp_setting(rate);
    }

    pub fn set_pitch(&self, pitch: f32) {
        self.options_guard().pitch = clamp_setting(pitch);
    }

    pub fn voices(&self) -> Vec<Voice> {
        lock(&self.speech).voices()
    }

    pub fn speech_supported(&self) -> bool {
        lock(&self.speech).is_supported()
    }

    pub fn status(&self) -> PlaybackStatus {
        lock(&self.speech).status()
    }

    pub fn toggle_playback(&self) {
        let options = self.options();
        lock(&self.speech).toggle(&self.script.content, options);
    }

    pub fn stop_playback(&self) {
        lock(&self.speech).stop();
    }

    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.status().position, self.script.char_len())
    }

    /// The progress bar is shown while playing or while a position is held.
    pub fn progress_visible(&self) -> bool {
        let status = self.status();
        status.is_playing || status.position > 0
    }

    /// "N / M characters".
    pub fn progress_text(&self) -> String {
        format!(
            "{} / {} characters",
            self.status().position,
            self.script.char_len()
        )
    }

    pub fn highlighted_html(&self) -> String {
        let status = self.status();
        export::highlighted_html(&self.script.content, status.position, status.is_playing)
    }

    pub async fn copy(&self) -> Result<()> {
        self.platform
            .copy_text(&self.script.content)
            .await
            .context("Failed to copy script")?;
        info!("Copied \"{}\"", self.script.title);
        Ok(())
    }

    /// Returns where the file was saved.
    pub async fn download(&self) -> Result<String> {
        let filename = export::download_filename(&self.script.title);
        let document = export::export_document(&self.script);
        let location = self
            .platform
            .save_text_file(&filename, &document)
            .await
            .with_context(|| format!("Failed to save {}", filename))?;
        info!("Saved script to {}", location);
        Ok(location)
    }

    pub async fn share(&self) -> Result<ShareOutcome> {
        if self.platform.can_share() {
            let payload: SharePayload =
                export::share_payload(&self.script, &self.platform.page_url());
            self.platform
                .share(&payload)
                .await
                .context("Failed to share script")?;
            return Ok(ShareOutcome::Shared);
        }
        warn!("Sharing is unavailable, copying instead");
        self.copy().await?;
        Ok(ShareOutcome::Copied)
    }
}

impl Drop for ScriptDisplay {
    fn drop(&mut self) {
        lock(&self.speech).stop();
    }
}

fn clamp_setting(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_VOICE_SETTING, MAX_VOICE_SETTING)
    } else {
        1.0
    }
}

/// Share of the content already spoken, in percent.
pub fn progress_percentage(position: usize, content_len: usize) -> f64 {
    if content_len == 0 {
        return 0.0;
    }
    (position.min(content_len) as f64 / content_len as f64) * 100.0
}
