use super::{
    utf16_to_char_index, BoundaryKind, EventSender, SpeechErrorCode, SpeechEvent, SpeechProvider,
    Utterance, UtteranceEvent, UtteranceId, Voice,
};
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    SpeechSynthesis, SpeechSynthesisErrorCode as JsErrorCode, SpeechSynthesisErrorEvent,
    SpeechSynthesisEvent, SpeechSynthesisUtterance, SpeechSynthesisVoice,
};

type EventCallback = Closure<dyn FnMut(SpeechSynthesisEvent)>;

/// Keeps the JS callbacks of one utterance alive while the browser may call them.
struct ActiveUtterance {
    id: UtteranceId,
    utterance: SpeechSynthesisUtterance,
    _on_start: EventCallback,
    _on_end: EventCallback,
    _on_boundary: EventCallback,
    _on_error: Closure<dyn FnMut(SpeechSynthesisErrorEvent)>,
}

impl ActiveUtterance {
    fn detach(&self) {
        self.utterance.set_onstart(None);
        self.utterance.set_onend(None);
        self.utterance.set_onboundary(None);
        self.utterance.set_onerror(None);
    }
}

/// `window.speechSynthesis`.
pub struct WebSpeechProvider {
    synth: SpeechSynthesis,
    events: Option<EventSender>,
    active: Option<ActiveUtterance>,
    _on_voices_changed: Option<Closure<dyn FnMut()>>,
}

impl WebSpeechProvider {
    /// Returns `None` when the browser has no speech synthesis.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let present = js_sys::Reflect::has(&window, &JsValue::from_str("speechSynthesis"))
            .unwrap_or(false);
        if !present {
            return None;
        }
        let synth = window.speech_synthesis().ok()?;
        Some(Self {
            synth,
            events: None,
            active: None,
            _on_voices_changed: None,
        })
    }

    fn emit(events: &EventSender, id: UtteranceId, event: UtteranceEvent) {
        let _ = events.send(SpeechEvent::Utterance { id, event });
    }

    fn js_voices(&self) -> Vec<SpeechSynthesisVoice> {
        self.synth
            .get_voices()
            .iter()
            .filter_map(|v| v.dyn_into::<SpeechSynthesisVoice>().ok())
            .collect()
    }
}

fn map_error(code: JsErrorCode) -> SpeechErrorCode {
    match code {
        JsErrorCode::Canceled => SpeechErrorCode::Canceled,
        JsErrorCode::Interrupted => SpeechErrorCode::Interrupted,
        JsErrorCode::AudioBusy => SpeechErrorCode::AudioBusy,
        JsErrorCode::AudioHardware => SpeechErrorCode::AudioHardware,
        JsErrorCode::Network => SpeechErrorCode::Network,
        JsErrorCode::SynthesisUnavailable => SpeechErrorCode::SynthesisUnavailable,
        JsErrorCode::LanguageUnavailable => SpeechErrorCode::LanguageUnavailable,
        JsErrorCode::VoiceUnavailable => SpeechErrorCode::VoiceUnavailable,
        JsErrorCode::TextTooLong => SpeechErrorCode::TextTooLong,
        JsErrorCode::InvalidArgument => SpeechErrorCode::InvalidArgument,
        JsErrorCode::NotAllowed => SpeechErrorCode::NotAllowed,
        _ => SpeechErrorCode::SynthesisFailed,
    }
}

impl SpeechProvider for WebSpeechProvider {
    fn attach(&mut self, events: EventSender) {
        let tx = events.clone();
        let on_voices_changed = Closure::<dyn FnMut()>::new(move || {
            let _ = tx.send(SpeechEvent::VoicesChanged);
        });
        self.synth
            .set_onvoiceschanged(Some(on_voices_changed.as_ref().unchecked_ref()));
        self._on_voices_changed = Some(on_voices_changed);
        self.events = Some(events);
    }

    fn voices(&self) -> Vec<Voice> {
        self.js_voices()
            .into_iter()
            .map(|v| Voice {
                name: v.name(),
                lang: v.lang(),
                uri: v.voice_uri(),
                local_service: v.local_service(),
                default: v.default(),
            })
            .collect()
    }

    fn speak(&mut self, utterance: Utterance) {
        let Some(events) = self.events.clone() else {
            warn!("Web speech provider is not attached; dropping utterance {}", utterance.id);
            return;
        };
        let js_utterance = match SpeechSynthesisUtterance::new_with_text(&utterance.text) {
            Ok(u) => u,
            Err(e) => {
                warn!("Failed to create utterance: {:?}", e);
                Self::emit(
                    &events,
                    utterance.id,
                    UtteranceEvent::Error(SpeechErrorCode::InvalidArgument),
                );
                return;
            }
        };

        let options = &utterance.options;
        js_utterance.set_rate(options.rate);
        js_utterance.set_pitch(options.pitch);
        js_utterance.set_volume(options.volume);
        if let Some(voice) = &options.voice {
            let js_voice = self
                .js_voices()
                .into_iter()
                .find(|v| v.voice_uri() == voice.uri || v.name() == voice.name);
            js_utterance.set_voice(js_voice.as_ref());
        }

        let id = utterance.id;

        let tx = events.clone();
        let on_start = EventCallback::new(move |_event: SpeechSynthesisEvent| {
            Self::emit(&tx, id, UtteranceEvent::Start);
        });

        let tx = events.clone();
        let on_end = EventCallback::new(move |_event: SpeechSynthesisEvent| {
            Self::emit(&tx, id, UtteranceEvent::End);
        });

        let tx = events.clone();
        let text = utterance.text.clone();
        let on_boundary = EventCallback::new(move |event: SpeechSynthesisEvent| {
            let kind = if event.name() == "word" {
                BoundaryKind::Word
            } else {
                BoundaryKind::Sentence
            };
            // The browser reports UTF-16 offsets.
            let char_index = utf16_to_char_index(&text, event.char_index() as usize);
            Self::emit(&tx, id, UtteranceEvent::Boundary { char_index, kind });
        });

        let tx = events;
        let on_error = Closure::<dyn FnMut(SpeechSynthesisErrorEvent)>::new(
            move |event: SpeechSynthesisErrorEvent| {
                Self::emit(&tx, id, UtteranceEvent::Error(map_error(event.error())));
            },
        );

        js_utterance.set_onstart(Some(on_start.as_ref().unchecked_ref()));
        js_utterance.set_onend(Some(on_end.as_ref().unchecked_ref()));
        js_utterance.set_onboundary(Some(on_boundary.as_ref().unchecked_ref()));
        js_utterance.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        if let Some(previous) = self.active.take() {
            previous.detach();
        }
        self.synth.speak(&js_utterance);
        debug!("Queued utterance {} with the browser", id);

        self.active = Some(ActiveUtterance {
            id,
            utterance: js_utterance,
            _on_start: on_start,
            _on_end: on_end,
            _on_boundary: on_boundary,
            _on_error: on_error,
        });
    }

    fn pause(&mut self) {
        self.synth.pause();
    }

    fn resume(&mut self) {
        self.synth.resume();
    }

    fn cancel(&mut self) {
        let was_busy = self.synth.speaking() || self.synth.paused();
        let active = self.active.take();
        if let Some(active) = &active {
            // The browser's own interruption callback may fire after the closures are gone.
            active.detach();
        }
        self.synth.cancel();
        if let (Some(active), Some(events), true) = (active, self.events.as_ref(), was_busy) {
            Self::emit(
                events,
                active.id,
                UtteranceEvent::Error(SpeechErrorCode::Interrupted),
            );
        }
    }

    fn is_speaking(&self) -> bool {
        self.synth.speaking()
    }

    fn is_paused(&self) -> bool {
        self.synth.paused()
    }
}

impl Drop for WebSpeechProvider {
    fn drop(&mut self) {
        self.synth.set_onvoiceschanged(None);
        if let Some(active) = self.active.take() {
            active.detach();
        }
    }
}
