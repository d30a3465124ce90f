use super::{
    preferred_voice, BoundaryKind, EventReceiver, SpeechErrorCode, SpeechEvent,
    SpeechOptions, SpeechProvider, Utterance, UtteranceEvent, UtteranceId, Voice,
};
use log::{debug, error, info};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub position: usize,
}

/// Handle shared between the views that drive playback and the event pump.
pub type SharedController = Arc<Mutex<SpeechController>>;

/// Locks a shared controller, recovering the guard if a holder panicked.
pub fn lock(handle: &SharedController) -> MutexGuard<'_, SpeechController> {
    handle.lock().unwrap_or_else(|e| e.into_inner())
}

/// Owns the single speech output channel and publishes playback state.
///
/// Provider callbacks never touch the state directly: they are queued on a
/// channel and applied by [`SpeechController::handle_event`], either through
/// [`SpeechController::pump`], [`SpeechController::next_event`] or a
/// [`drive`] task holding the receiver.
pub struct SpeechController {
    provider: Option<Box<dyn SpeechProvider>>,
    events_rx: Option<EventReceiver>,
    current: Option<UtteranceId>,
    next_id: u64,
    voices: watch::Sender<Vec<Voice>>,
    playing: watch::Sender<bool>,
    position: watch::Sender<usize>,
}

impl SpeechController {
    pub fn new(mut provider: impl SpeechProvider + 'static) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        provider.attach(tx);
        let voices = provider.voices();
        debug!("Speech provider attached with {} voices", voices.len());
        Self::build(Some(Box::new(provider)), Some(rx), voices)
    }

    /// A controller for platforms without speech synthesis. Every operation is a no-op.
    pub fn unsupported() -> Self {
        Self::build(None, None, Vec::new())
    }

    fn build(
        provider: Option<Box<dyn SpeechProvider>>,
        events_rx: Option<EventReceiver>,
        voices: Vec<Voice>,
    ) -> Self {
        let (playing, _) = watch::channel(false);
        let (position, _) = watch::channel(0);
        let (voices, _) = watch::channel(voices);
        Self {
            provider,
            events_rx,
            current: None,
            next_id: 0,
            voices,
            playing,
            position,
        }
    }

    pub fn shared(self) -> SharedController {
        Arc::new(Mutex::new(self))
    }

    pub fn is_supported(&self) -> bool {
        self.provider.is_some()
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.voices.borrow().clone()
    }

    pub fn refresh_voices(&mut self) {
        if let Some(provider) = &self.provider {
            let voices = provider.voices();
            debug!("Voice list refreshed: {} voices", voices.len());
            self.voices.send_replace(voices);
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            is_playing: *self.playing.borrow(),
            position: *self.position.borrow(),
        }
    }

    pub fn current_utterance(&self) -> Option<UtteranceId> {
        self.current
    }

    pub fn subscribe_playing(&self) -> watch::Receiver<bool> {
        self.playing.subscribe()
    }

    pub fn subscribe_position(&self) -> watch::Receiver<usize> {
        self.position.subscribe()
    }

    pub fn subscribe_voices(&self) -> watch::Receiver<Vec<Voice>> {
        self.voices.subscribe()
    }

    pub fn speak(&mut self, text: &str, options: SpeechOptions) {
        if self.provider.is_none() {
            return;
        }
        if self.current.is_some() || self.provider_busy() {
            self.stop();
        }

        let mut options = options.sanitized();
        if options.voice.is_none() {
            options.voice = preferred_voice(&self.voices.borrow()).cloned();
        }

        self.next_id += 1;
        let id = UtteranceId(self.next_id);
        info!(
            "Speaking utterance {} ({} chars, voice {:?})",
            id,
            text.chars().count(),
            options.voice.as_ref().map(|v| v.name.as_str())
        );

        self.current = Some(id);
        self.set_position(0);
        self.set_playing(true);

        if let Some(provider) = self.provider.as_mut() {
            provider.speak(Utterance {
                id,
                text: text.to_string(),
                options,
            });
        }
    }

    pub fn pause(&mut self) {
        let Some(provider) = self.provider.as_mut() else {
            return;
        };
        if provider.is_speaking() && !provider.is_paused() {
            provider.pause();
            self.set_playing(false);
        }
    }

    pub fn resume(&mut self) {
        let Some(provider) = self.provider.as_mut() else {
            return;
        };
        if provider.is_paused() {
            provider.resume();
            self.set_playing(true);
        }
    }

    pub fn stop(&mut self) {
        let Some(provider) = self.provider.as_mut() else {
            return;
        };
        if provider.is_speaking() || provider.is_paused() || self.current.is_some() {
            provider.cancel();
        }
        self.current = None;
        self.set_playing(false);
        self.set_position(0);
    }

    /// Pause when playing, resume when a position is held, otherwise start over.
    pub fn toggle(&mut self, text: &str, options: SpeechOptions) {
        let status = self.status();
        if status.is_playing {
            self.pause();
        } else if status.position > 0 {
            self.resume();
        } else {
            self.speak(text, options);
        }
    }

    pub fn handle_event(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::VoicesChanged => self.refresh_voices(),
            SpeechEvent::Utterance { id, event } => {
                if self.current != Some(id) {
                    debug!("Ignoring {:?} for stale utterance {}", event, id);
                    return;
                }
                self.apply(id, event);
            }
        }
    }

    fn apply(&mut self, id: UtteranceId, event: UtteranceEvent) {
        match event {
            UtteranceEvent::Start => {
                self.set_playing(true);
                self.set_position(0);
            }
            UtteranceEvent::Boundary {
                char_index,
                kind: BoundaryKind::Word,
            } => self.set_position(char_index),
            UtteranceEvent::Boundary { .. } => {}
            UtteranceEvent::End => {
                debug!("Utterance {} finished", id);
                self.current = None;
                self.set_playing(false);
                self.set_position(0);
            }
            UtteranceEvent::Error(code) => {
                if code != SpeechErrorCode::Interrupted {
                    error!("Speech synthesis error on utterance {}: {}", id, code);
                }
                self.current = None;
                self.set_playing(false);
                self.set_position(0);
            }
        }
    }

    /// Applies every queued provider event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(rx) = self.events_rx.as_mut() {
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
        }
        let count = pending.len();
        for event in pending {
            self.handle_event(event);
        }
        count
    }

    /// Waits for the next provider event and applies it.
    ///
    /// Returns `None` when there is no provider or the receiver was taken.
    pub async fn next_event(&mut self) -> Option<SpeechEvent> {
        let event = self.events_rx.as_mut()?.recv().await?;
        self.handle_event(event);
        Some(event)
    }

    /// Hands the event receiver to a [`drive`] task.
    pub fn take_events(&mut self) -> Option<EventReceiver> {
        self.events_rx.take()
    }

    fn provider_busy(&self) -> bool {
        self.provider
            .as_ref()
            .map(|p| p.is_speaking() || p.is_paused())
            .unwrap_or(false)
    }

    fn set_playing(&self, playing: bool) {
        self.playing.send_replace(playing);
    }

    fn set_position(&self, position: usize) {
        self.position.send_replace(position);
    }
}

/// Applies provider events to a shared controller until the provider goes away.
pub async fn drive(handle: SharedController, mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        lock(&handle).handle_event(event);
    }
    debug!("Speech event stream closed");
}


#[cfg(test)]
mod tests {
    use super::fake::FakeProvider;
    use super::*;

    const TEXT: &str = "The quick brown fox jumps over the lazy dog";

    fn voice(name: &str, local: bool) -> Voice {
        Voice {
            name: name.to_string(),
            lang: "en-US".to_string(),
            uri: name.to_string(),
            local_service: local,
            default: false,
        }
    }

    fn setup() -> (SpeechController, FakeProvider) {
        let fake = FakeProvider::default();
        let controller = SpeechController::new(fake.clone());
        (controller, fake)
    }

    fn speaking_at(position: usize) -> (SpeechController, FakeProvider) {
        let (mut controller, fake) = setup();
        controller.speak(TEXT, SpeechOptions::default());
        fake.start();
        fake.word(position);
        controller.pump();
        (controller, fake)
    }

    #[test]
    fn test_speak_start_and_word_boundaries() {
        let (mut controller, fake) = setup();
        let playing = controller.subscribe_playing();
        let position = controller.subscribe_position();

        controller.speak(TEXT, SpeechOptions::default());
        fake.start();
        fake.word(4);
        fake.word(10);
        fake.emit(UtteranceEvent::Boundary {
            char_index: 20,
            kind: BoundaryKind::Sentence,
        });
        assert_eq!(controller.pump(), 4);

        assert_eq!(*playing.borrow(), true);
        assert_eq!(*position.borrow(), 10);
        assert_eq!(
            controller.status(),
            PlaybackStatus {
                is_playing: true,
                position: 10
            }
        );
    }

    #[test]
    fn test_natural_end_resets_state() {
        let (mut controller, fake) = speaking_at(16);
        fake.finish();
        controller.pump();

        assert_eq!(controller.status(), PlaybackStatus::default());
        assert_eq!(controller.current_utterance(), None);
    }

    #[tokio::test]
    async fn test_speak_while_speaking_interrupts_previous() {
        let (mut controller, fake) = speaking_at(16);
        let first = controller.current_utterance().unwrap();

        controller.speak("Second text", SpeechOptions::default());
        let second = controller.current_utterance().unwrap();
        assert_ne!(first, second);
        assert_eq!(fake.snapshot(|s| s.cancels), 1);
        assert_eq!(fake.snapshot(|s| s.spoken.len()), 2);

        fake.start();
        // The interruption of the first utterance is queued ahead of the new start.
        assert_eq!(
            controller.next_event().await,
            Some(SpeechEvent::Utterance {
                id: first,
                event: UtteranceEvent::Error(SpeechErrorCode::Interrupted),
            })
        );
        assert_eq!(
            controller.next_event().await,
            Some(SpeechEvent::Utterance {
                id: second,
                event: UtteranceEvent::Start,
            })
        );
        assert_eq!(
            controller.status(),
            PlaybackStatus {
                is_playing: true,
                position: 0
            }
        );
        assert_eq!(controller.current_utterance(), Some(second));
    }

    #[test]
    fn test_speak_while_paused_interrupts_previous() {
        let (mut controller, fake) = speaking_at(8);
        controller.pause();
        controller.speak(TEXT, SpeechOptions::default());
        assert_eq!(fake.snapshot(|s| s.cancels), 1);
        assert_eq!(controller.status().position, 0);
    }

    #[test]
    fn test_stop_always_resets() {
        // Idle
        let (mut controller, fake) = setup();
        controller.stop();
        assert_eq!(controller.status(), PlaybackStatus::default());
        assert_eq!(fake.snapshot(|s| s.cancels), 0);

        // Speaking
        let (mut controller, fake) = speaking_at(12);
        controller.stop();
        assert_eq!(controller.status(), PlaybackStatus::default());
        assert_eq!(fake.snapshot(|s| s.cancels), 1);
        controller.pump();
        assert_eq!(controller.status(), PlaybackStatus::default());

        // Paused
        let (mut controller, _fake) = speaking_at(12);
        controller.pause();
        controller.stop();
        assert_eq!(controller.status(), PlaybackStatus::default());
    }

    #[test]
    fn test_pause_resume_preserves_position() {
        let (mut controller, fake) = speaking_at(20);

        controller.pause();
        assert_eq!(
            controller.status(),
            PlaybackStatus {
                is_playing: false,
                position: 20
            }
        );
        // A second pause is ignored.
        controller.pause();
        assert_eq!(fake.snapshot(|s| s.pauses), 1);

        controller.resume();
        assert_eq!(
            controller.status(),
            PlaybackStatus {
                is_playing: true,
                position: 20
            }
        );
        // Resume without a pause is ignored.
        controller.resume();
        assert_eq!(fake.snapshot(|s| s.resumes), 1);
    }

    #[test]
    fn test_pause_when_idle_is_noop() {
        let (mut controller, fake) = setup();
        controller.pause();
        controller.resume();
        assert_eq!(fake.snapshot(|s| (s.pauses, s.resumes)), (0, 0));
        assert_eq!(controller.status(), PlaybackStatus::default());
    }

    #[test]
    fn test_toggle_semantics() {
        // Idle: toggle starts a fresh utterance.
        let (mut controller, fake) = setup();
        controller.toggle(TEXT, SpeechOptions::default());
        assert_eq!(fake.snapshot(|s| s.spoken.len()), 1);
        assert_eq!(controller.status().position, 0);
        fake.start();
        fake.word(10);
        controller.pump();

        // Playing: toggle pauses.
        controller.toggle(TEXT, SpeechOptions::default());
        assert_eq!(
            controller.status(),
            PlaybackStatus {
                is_playing: false,
                position: 10
            }
        );

        // Paused with a position: toggle resumes.
        controller.toggle(TEXT, SpeechOptions::default());
        assert_eq!(
            controller.status(),
            PlaybackStatus {
                is_playing: true,
                position: 10
            }
        );
        assert_eq!(fake.snapshot(|s| s.spoken.len()), 1);

        // Stopped: toggle restarts from the beginning.
        controller.stop();
        controller.toggle(TEXT, SpeechOptions::default());
        assert_eq!(fake.snapshot(|s| s.spoken.len()), 2);
        assert_eq!(controller.status().position, 0);
    }

    #[test]
    fn test_errors_reset_playing() {
        let (mut controller, fake) = speaking_at(10);
        fake.fail(SpeechErrorCode::SynthesisFailed);
        controller.pump();
        assert_eq!(controller.status(), PlaybackStatus::default());
        assert_eq!(controller.current_utterance(), None);

        let (mut controller, fake) = speaking_at(10);
        fake.fail(SpeechErrorCode::Interrupted);
        controller.pump();
        assert!(!controller.status().is_playing);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let (mut controller, fake) = speaking_at(5);
        let first = controller.current_utterance().unwrap();
        controller.speak(TEXT, SpeechOptions::default());
        fake.start();
        fake.word(3);
        controller.pump();

        fake.emit_for(first, UtteranceEvent::Boundary {
            char_index: 30,
            kind: BoundaryKind::Word,
        });
        fake.emit_for(first, UtteranceEvent::End);
        controller.pump();

        assert_eq!(
            controller.status(),
            PlaybackStatus {
                is_playing: true,
                position: 3
            }
        );
    }

    #[test]
    fn test_voice_preference_and_refresh() {
        let fake = FakeProvider::with_voices(vec![voice("Alex", true)]);
        let mut controller = SpeechController::new(fake.clone());
        controller.speak(TEXT, SpeechOptions::default());
        assert_eq!(fake.snapshot(|s| s.spoken[0].options.voice.clone()), None);

        let mut voices = controller.subscribe_voices();
        fake.set_voices(vec![voice("Alex", true), voice("Google US English", true)]);
        controller.pump();
        assert_eq!(controller.voices().len(), 2);
        assert!(voices.has_changed().unwrap());
        assert_eq!(voices.borrow_and_update().len(), 2);

        controller.speak(TEXT, SpeechOptions::default());
        let chosen = fake.snapshot(|s| s.spoken[1].options.voice.clone());
        assert_eq!(chosen.map(|v| v.name), Some("Google US English".to_string()));

        // An explicit choice wins over the preference.
        let options = SpeechOptions {
            voice: Some(voice("Alex", true)),
            ..SpeechOptions::default()
        };
        controller.speak(TEXT, options);
        let chosen = fake.snapshot(|s| s.spoken[2].options.voice.clone());
        assert_eq!(chosen.map(|v| v.name), Some("Alex".to_string()));
    }

    #[test]
    fn test_options_are_sanitized() {
        let (mut controller, fake) = setup();
        controller.speak(
            TEXT,
            SpeechOptions {
                rate: 0.0,
                pitch: 1.5,
                volume: -1.0,
                voice: None,
            },
        );
        let opts = fake.snapshot(|s| s.spoken[0].options.clone());
        assert_eq!((opts.rate, opts.pitch, opts.volume), (1.0, 1.5, 1.0));
    }

    #[test]
    fn test_unsupported_controller_is_noop() {
        let mut controller = SpeechController::unsupported();
        assert!(!controller.is_supported());
        controller.speak(TEXT, SpeechOptions::default());
        controller.toggle(TEXT, SpeechOptions::default());
        controller.pause();
        controller.resume();
        controller.stop();
        assert_eq!(controller.pump(), 0);
        assert_eq!(controller.status(), PlaybackStatus::default());
        assert!(controller.voices().is_empty());
    }

    #[test]
    fn test_late_subscriber_sees_latest_value() {
        let (controller, _fake) = speaking_at(25);
        let position = controller.subscribe_position();
        let playing = controller.subscribe_playing();
        assert_eq!(*position.borrow(), 25);
        assert!(*playing.borrow());
    }

    #[tokio::test]
    async fn test_drive_task_applies_events() {
        let fake = FakeProvider::default();
        let mut controller = SpeechController::new(fake.clone());
        let events = controller.take_events().unwrap();
        let handle = controller.shared();
        let mut position = lock(&handle).subscribe_position();

        let pump = tokio::spawn(drive(handle.clone(), events));

        lock(&handle).speak(TEXT, SpeechOptions::default());
        fake.start();
        fake.word(16);

        position.wait_for(|p| *p == 16).await.unwrap();
        assert!(lock(&handle).status().is_playing);

        fake.finish();
        let mut playing = lock(&handle).subscribe_playing();
        playing.wait_for(|p| !*p).await.unwrap();
        assert_eq!(lock(&handle).status().position, 0);

        pump.abort();
    }

    #[tokio::test]
    async fn test_next_event_returns_applied_event() {
        let (mut controller, fake) = setup();
        controller.speak(TEXT, SpeechOptions::default());
        fake.start();
        let event = controller.next_event().await;
        assert!(matches!(
            event,
            Some(SpeechEvent::Utterance {
                event: UtteranceEvent::Start,
                ..
            })
        ));
    }
}
