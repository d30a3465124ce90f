//! Speech synthesis boundary and playback control.
//!
//! A [`SpeechProvider`] is the platform voice (browser speech synthesis, the
//! terminal narrator, a test fake). It reports progress by sending
//! [`SpeechEvent`]s on the channel it is attached to; the
//! [`controller::SpeechController`] is the only consumer of that channel.

use std::fmt;
use tokio::sync::mpsc;

pub mod controller;
#[cfg(not(target_arch = "wasm32"))]
pub mod teleprompter;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use controller::{PlaybackStatus, SharedController, SpeechController};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
    pub uri: String,
    pub local_service: bool,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice: Option<Voice>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }
}

impl SpeechOptions {
    /// Replaces unusable numeric values with the defaults.
    pub fn sanitized(mut self) -> Self {
        fn or_unit(v: f32) -> f32 {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                1.0
            }
        }
        self.rate = or_unit(self.rate);
        self.pitch = or_unit(self.pitch);
        self.volume = or_unit(self.volume);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub options: SpeechOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechErrorCode {
    Canceled,
    Interrupted,
    AudioBusy,
    AudioHardware,
    Network,
    SynthesisUnavailable,
    SynthesisFailed,
    LanguageUnavailable,
    VoiceUnavailable,
    TextTooLong,
    InvalidArgument,
    NotAllowed,
}

impl SpeechErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechErrorCode::Canceled => "canceled",
            SpeechErrorCode::Interrupted => "interrupted",
            SpeechErrorCode::AudioBusy => "audio-busy",
            SpeechErrorCode::AudioHardware => "audio-hardware",
            SpeechErrorCode::Network => "network",
            SpeechErrorCode::SynthesisUnavailable => "synthesis-unavailable",
            SpeechErrorCode::SynthesisFailed => "synthesis-failed",
            SpeechErrorCode::LanguageUnavailable => "language-unavailable",
            SpeechErrorCode::VoiceUnavailable => "voice-unavailable",
            SpeechErrorCode::TextTooLong => "text-too-long",
            SpeechErrorCode::InvalidArgument => "invalid-argument",
            SpeechErrorCode::NotAllowed => "not-allowed",
        }
    }
}

impl fmt::Display for SpeechErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceEvent {
    Start,
    /// `char_index` counts characters, not bytes or UTF-16 units.
    Boundary { char_index: usize, kind: BoundaryKind },
    End,
    Error(SpeechErrorCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEvent {
    Utterance { id: UtteranceId, event: UtteranceEvent },
    VoicesChanged,
}

pub type EventSender = mpsc::UnboundedSender<SpeechEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SpeechEvent>;

#[cfg(target_arch = "wasm32")]
pub trait ProviderBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> ProviderBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait ProviderBounds: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> ProviderBounds for T {}

pub trait SpeechProvider: ProviderBounds {
    /// Called once by the controller before any other method.
    fn attach(&mut self, events: EventSender);

    /// May be empty until the provider reports [`SpeechEvent::VoicesChanged`].
    fn voices(&self) -> Vec<Voice>;

    fn speak(&mut self, utterance: Utterance);
    fn pause(&mut self);
    fn resume(&mut self);

    /// Drops the active utterance. Must report `Error(Interrupted)` for it.
    fn cancel(&mut self);

    /// True while an utterance is queued or playing, including while paused.
    fn is_speaking(&self) -> bool;
    fn is_paused(&self) -> bool;
}

/// Picks a voice when the caller did not choose one: the first cloud-backed
/// voice, recognised by vendor name or by not being a local service.
pub fn preferred_voice(voices: &[Voice]) -> Option<&Voice> {
    voices.iter().find(|v| {
        v.name.contains("Google") || v.name.contains("Microsoft") || !v.local_service
    })
}

/// Looks a voice up by the name or URI a user configured.
pub fn find_voice<'a>(voices: &'a [Voice], name: &str) -> Option<&'a Voice> {
    voices.iter().find(|v| v.name == name || v.uri == name)
}

/// Converts a UTF-16 code unit offset into a character offset within `text`.
pub fn utf16_to_char_index(text: &str, utf16_index: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        if units >= utf16_index {
            return i;
        }
        units += c.len_utf16();
    }
    text.chars().count()
}
