//! Terminal narrator: paces through the text word by word at reading speed,
//! reporting the same events a real synthesiser would.

use super::{
    BoundaryKind, EventSender, SpeechErrorCode, SpeechEvent, SpeechProvider, Utterance,
    UtteranceEvent, UtteranceId, Voice,
};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const NARRATOR_VOICE: &str = "Terminal Narrator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Run,
    Pause,
    Cancel,
}

/// One utterance in flight. Its `speaking` flag is never shared with another reading.
struct Reading {
    id: UtteranceId,
    control: watch::Sender<Control>,
    task: JoinHandle<()>,
    speaking: Arc<AtomicBool>,
}

pub struct TeleprompterProvider {
    words_per_minute: u32,
    events: Option<EventSender>,
    reading: Option<Reading>,
    paused: bool,
}

impl TeleprompterProvider {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute: words_per_minute.max(1),
            events: None,
            reading: None,
            paused: false,
        }
    }

    fn word_delay(&self, rate: f32) -> Duration {
        let per_minute = self.words_per_minute as f64 * rate.max(0.1) as f64;
        Duration::from_secs_f64(60.0 / per_minute)
    }

    fn send(&self, id: UtteranceId, event: UtteranceEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(SpeechEvent::Utterance { id, event });
        }
    }
}

impl SpeechProvider for TeleprompterProvider {
    fn attach(&mut self, events: EventSender) {
        self.events = Some(events);
    }

    fn voices(&self) -> Vec<Voice> {
        vec![Voice {
            name: NARRATOR_VOICE.to_string(),
            lang: "en-US".to_string(),
            uri: "teleprompter:default".to_string(),
            local_service: true,
            default: true,
        }]
    }

    fn speak(&mut self, utterance: Utterance) {
        if self.reading.is_some() {
            self.cancel();
        }
        let Some(events) = self.events.clone() else {
            warn!("Teleprompter is not attached; dropping utterance {}", utterance.id);
            return;
        };

        let delay = self.word_delay(utterance.options.rate);
        let (control, control_rx) = watch::channel(Control::Run);
        let speaking = Arc::new(AtomicBool::new(true));
        self.paused = false;

        let id = utterance.id;
        let task = tokio::spawn(read_aloud(
            id,
            utterance.text,
            delay,
            events,
            control_rx,
            speaking.clone(),
        ));
        self.reading = Some(Reading {
            id,
            control,
            task,
            speaking,
        });
    }

    fn pause(&mut self) {
        if let Some(reading) = &self.reading {
            reading.control.send_replace(Control::Pause);
            self.paused = true;
        }
    }

    fn resume(&mut self) {
        if let Some(reading) = &self.reading {
            reading.control.send_replace(Control::Run);
            self.paused = false;
        }
    }

    fn cancel(&mut self) {
        self.paused = false;
        let Some(reading) = self.reading.take() else {
            return;
        };
        reading.control.send_replace(Control::Cancel);
        reading.task.abort();
        if reading.speaking.swap(false, Ordering::SeqCst) {
            self.send(reading.id, UtteranceEvent::Error(SpeechErrorCode::Interrupted));
        }
    }

    fn is_speaking(&self) -> bool {
        self.reading
            .as_ref()
            .map(|r| r.speaking.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    fn is_paused(&self) -> bool {
        self.paused && self.is_speaking()
    }
}

impl Drop for TeleprompterProvider {
    fn drop(&mut self) {
        if let Some(reading) = self.reading.take() {
            reading.task.abort();
        }
    }
}

/// Character offsets of each whitespace-separated word.
fn word_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut char_index = 0;
    for (byte_index, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some((chars, bytes)) = start.take() {
                words.push((chars, &text[bytes..byte_index]));
            }
        } else if start.is_none() {
            start = Some((char_index, byte_index));
        }
        char_index += 1;
    }
    if let Some((chars, bytes)) = start {
        words.push((chars, &text[bytes..]));
    }
    words
}

async fn read_aloud(
    id: UtteranceId,
    text: String,
    delay: Duration,
    events: EventSender,
    mut control: watch::Receiver<Control>,
    speaking: Arc<AtomicBool>,
) {
    let send = |event| {
        let _ = events.send(SpeechEvent::Utterance { id, event });
    };
    send(UtteranceEvent::Start);

    for (char_index, _) in word_offsets(&text) {
        loop {
            let state = *control.borrow_and_update();
            match state {
                Control::Run => break,
                Control::Cancel => return,
                Control::Pause => {
                    if control.changed().await.is_err() {
                        return;
                    }
                }
            }
        }

        send(UtteranceEvent::Boundary {
            char_index,
            kind: BoundaryKind::Word,
        });

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = control.changed() => {
                if changed.is_err() || *control.borrow() == Control::Cancel {
                    return;
                }
            }
        }
    }

    // A concurrent cancel already reported the interruption.
    if speaking.swap(false, Ordering::SeqCst) {
        debug!("Teleprompter finished utterance {}", id);
        send(UtteranceEvent::End);
    }
}
