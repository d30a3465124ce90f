use crate::core::config::Config;
use crate::core::model::{GeneratedScript, ScriptFormat, ScriptRequest, Tone};
use crate::services::generator::ScriptGenerator;
use crate::services::speech::controller::{drive, lock};
use crate::services::speech::web::WebSpeechProvider;
use crate::services::speech::{find_voice, SharedController, SpeechController, SpeechOptions};
use crate::ui::app::{AppPhase, ScriptApp};
use crate::ui::display::{
    ScriptDisplay as DisplayModel, ShareOutcome, MAX_VOICE_SETTING, MIN_VOICE_SETTING,
    VOICE_SETTING_STEP,
};
use crate::ui::form::ScriptForm as FormModel;
use crate::ui::platform::{BrowserPlatform, Platform};
use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn create_speech() -> SharedController {
    let mut controller = match WebSpeechProvider::new() {
        Some(provider) => SpeechController::new(provider),
        None => {
            log::warn!("Speech synthesis is not available in this browser");
            SpeechController::unsupported()
        }
    };
    let events = controller.take_events();
    let handle = controller.shared();
    if let Some(events) = events {
        spawn_local(drive(handle.clone(), events));
    }
    handle
}

#[component]
pub fn App() -> impl IntoView {
    let config = Config::default();
    let speech = create_speech();
    let platform: Arc<dyn Platform> = Arc::new(BrowserPlatform::new());
    let options = config.speech.options();

    let app = Rc::new(RefCell::new(ScriptApp::new(ScriptGenerator::new(
        config.generation.delay(),
    ))));
    // Outlives the form view so the fields survive a round trip through the result.
    let form = Rc::new(RefCell::new(FormModel::new(config.form.resubmit_timeout())));
    let (phase, set_phase) = create_signal(AppPhase::Idle);
    let (error, set_error) = create_signal(None::<String>);

    let app_for_submit = app.clone();
    let form_for_submit = form.clone();
    let on_submit = Callback::new(move |request: ScriptRequest| {
        let (ticket, work) = app_for_submit.borrow_mut().request_script(request);
        set_phase.set(AppPhase::Generating);
        set_error.set(None);
        let app = app_for_submit.clone();
        let form = form_for_submit.clone();
        spawn_local(async move {
            let outcome = work.await;
            let completed = {
                let mut app = app.borrow_mut();
                app.complete(ticket, outcome)
                    .then(|| (app.phase().clone(), app.error_message().map(str::to_string)))
            };
            if let Some((next, message)) = completed {
                form.borrow_mut().generation_finished();
                set_phase.set(next);
                set_error.set(message);
            }
        });
    });

    let form_for_start_over = form.clone();
    let on_start_over = Callback::new(move |_: ()| {
        app.borrow_mut().start_over();
        form_for_start_over.borrow_mut().generation_finished();
        set_phase.set(AppPhase::Idle);
        set_error.set(None);
    });

    view! {
        <div class="app-container">
            <h1>"Script Generator"</h1>
            {move || error.get().map(|e| view! { <p class="error">{e}</p> })}
            {move || match phase.get() {
                AppPhase::Idle => view! {
                    <ScriptForm form=form.clone() on_submit=on_submit/>
                }
                .into_view(),
                AppPhase::Generating => view! { <LoadingOverlay/> }.into_view(),
                AppPhase::Showing(script) => view! {
                    <ScriptDisplay
                        script=script
                        speech=speech.clone()
                        options=options.clone()
                        platform=platform.clone()
                        on_start_over=on_start_over
                    />
                }
                .into_view(),
            }}
        </div>
    }
}

#[component]
pub fn LoadingOverlay() -> impl IntoView {
    view! {
        <div class="loading-overlay">
            <div class="loading-content">
                <div class="loading-spinner"></div>
                <h3>"Crafting your script..."</h3>
                <p>"This may take a few moments."</p>
                <p class="loading-tips">"Tip: The more specific your topic, the better the result!"</p>
            </div>
        </div>
    }
}

#[component]
pub fn ScriptForm(
    form: Rc<RefCell<FormModel>>,
    #[prop(into)] on_submit: Callback<ScriptRequest>,
) -> impl IntoView {
    let draft = form.borrow().draft.clone();
    let (topic, set_topic) = create_signal(draft.topic);
    let (format, set_format) = create_signal(draft.format);
    let (duration, set_duration) = create_signal(draft.duration);
    let (tone, set_tone) = create_signal(draft.tone);
    let (audience, set_audience) = create_signal(draft.audience);
    let (message, set_message) = create_signal(None::<String>);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let submitted = {
            let mut form = form.borrow_mut();
            form.draft.topic = topic.get_untracked();
            form.draft.format = format.get_untracked();
            form.draft.duration = duration.get_untracked();
            form.draft.tone = tone.get_untracked();
            form.draft.audience = audience.get_untracked();
            form.submit()
        };
        match submitted {
            Ok(request) => {
                set_message.set(None);
                on_submit.call(request);
            }
            Err(e) => set_message.set(Some(e.to_string())),
        }
    };

    view! {
        <form class="script-form" on:submit=submit>
            <label>"Topic"
                <input
                    type="text"
                    placeholder="e.g., Artificial Intelligence"
                    prop:value=topic
                    on:input=move |ev| set_topic.set(event_target_value(&ev))
                />
            </label>
            <label>"Format"
                <select on:change=move |ev| {
                    if let Some(f) = ScriptFormat::parse(&event_target_value(&ev)) {
                        set_format.set(f);
                    }
                }>
                    {ScriptFormat::ALL
                        .into_iter()
                        .map(|f| view! {
                            <option value=f.as_str() selected=move || format.get() == f>
                                {f.label()}
                            </option>
                        })
                        .collect_view()}
                </select>
            </label>
            <label>"Duration (minutes)"
                <input
                    type="number"
                    min="1"
                    max="60"
                    prop:value=move || duration.get().to_string()
                    on:input=move |ev| {
                        set_duration.set(event_target_value(&ev).parse().unwrap_or(0));
                    }
                />
            </label>
            <label>"Tone"
                <select on:change=move |ev| {
                    if let Some(t) = Tone::parse(&event_target_value(&ev)) {
                        set_tone.set(t);
                    }
                }>
                    {Tone::ALL
                        .into_iter()
                        .map(|t| view! {
                            <option value=t.as_str() selected=move || tone.get() == t>
                                {t.to_string()}
                            </option>
                        })
                        .collect_view()}
                </select>
            </label>
            <label>"Target audience (optional)"
                <input
                    type="text"
                    prop:value=audience
                    on:input=move |ev| set_audience.set(event_target_value(&ev))
                />
            </label>
            {move || message.get().map(|m| view! { <p class="error">{m}</p> })}
            <button type="submit">"Generate Script"</button>
        </form>
    }
}

#[component]
pub fn ScriptDisplay(
    script: GeneratedScript,
    speech: SharedController,
    options: SpeechOptions,
    platform: Arc<dyn Platform>,
    #[prop(into)] on_start_over: Callback<()>,
) -> impl IntoView {
    let supported = lock(&speech).is_supported();
    let (playing, set_playing) = create_signal(false);
    let (position, set_position) = create_signal(0usize);
    let (notice, set_notice) = create_signal(None::<String>);
    let (voices, set_voices) = create_signal(lock(&speech).voices());
    let (rate, set_rate) = create_signal(options.rate);
    let (pitch, set_pitch) = create_signal(options.pitch);

    let mut playing_rx = lock(&speech).subscribe_playing();
    let mut position_rx = lock(&speech).subscribe_position();
    let mut voices_rx = lock(&speech).subscribe_voices();
    spawn_local(async move {
        while playing_rx.changed().await.is_ok() {
            let value = *playing_rx.borrow_and_update();
            if set_playing.try_set(value).is_some() {
                break;
            }
        }
    });
    spawn_local(async move {
        while position_rx.changed().await.is_ok() {
            let value = *position_rx.borrow_and_update();
            if set_position.try_set(value).is_some() {
                break;
            }
        }
    });
    spawn_local(async move {
        while voices_rx.changed().await.is_ok() {
            let value = voices_rx.borrow_and_update().clone();
            if set_voices.try_set(value).is_some() {
                break;
            }
        }
    });

    let title = script.title.clone();
    let meta = format!(
        "{} minutes · {} words",
        script.estimated_duration, script.word_count
    );
    let display = Rc::new(DisplayModel::new(script, speech, options, platform));

    let teardown = display.clone();
    on_cleanup(move || teardown.stop_playback());

    let d = display.clone();
    let html = move || {
        let _ = (playing.get(), position.get());
        d.highlighted_html()
    };
    let d = display.clone();
    let progress = move || {
        let _ = position.get();
        format!("width: {:.1}%", d.progress_percentage())
    };
    let d = display.clone();
    let progress_visible = move || {
        let _ = (playing.get(), position.get());
        d.progress_visible()
    };
    let d = display.clone();
    let progress_text = move || {
        let _ = position.get();
        d.progress_text()
    };

    let d = display.clone();
    let on_voice = move |ev: ev::Event| {
        let uri = event_target_value(&ev);
        let voice = voices.with_untracked(|list| find_voice(list, &uri).cloned());
        d.set_voice(voice);
    };
    let d = display.clone();
    let on_rate = move |ev: ev::Event| {
        if let Ok(value) = event_target_value(&ev).parse::<f32>() {
            d.set_rate(value);
            set_rate.set(d.options().rate);
        }
    };
    let d = display.clone();
    let on_pitch = move |ev: ev::Event| {
        if let Ok(value) = event_target_value(&ev).parse::<f32>() {
            d.set_pitch(value);
            set_pitch.set(d.options().pitch);
        }
    };

    let d = display.clone();
    let on_toggle = move |_| d.toggle_playback();
    let d = display.clone();
    let on_stop = move |_| d.stop_playback();

    let d = display.clone();
    let on_copy = move |_| {
        let d = d.clone();
        spawn_local(async move {
            let text = match d.copy().await {
                Ok(()) => "Copied to clipboard".to_string(),
                Err(e) => format!("{:#}", e),
            };
            set_notice.set(Some(text));
        });
    };
    let d = display.clone();
    let on_download = move |_| {
        let d = d.clone();
        spawn_local(async move {
            let text = match d.download().await {
                Ok(name) => format!("Downloaded {}", name),
                Err(e) => format!("{:#}", e),
            };
            set_notice.set(Some(text));
        });
    };
    let d = display;
    let on_share = move |_| {
        let d = d.clone();
        spawn_local(async move {
            let text = match d.share().await {
                Ok(ShareOutcome::Shared) => "Shared".to_string(),
                Ok(ShareOutcome::Copied) => "Copied to clipboard".to_string(),
                Err(e) => format!("{:#}", e),
            };
            set_notice.set(Some(text));
        });
    };

    view! {
        <div class="script-display">
            <h2>{title}</h2>
            <p class="meta">{meta}</p>
            <Show
                when=move || supported
                fallback=|| view! {
                    <p class="no-support-message">
                        "Voice playback is not supported in your browser."
                    </p>
                }
            >
                <div class="voice-controls">
                    <h3>"Voice Controls"</h3>
                    <label>"Voice:"
                        <select class="voice-select" on:change=on_voice.clone()>
                            <option value="">"Default Voice"</option>
                            {move || voices
                                .get()
                                .into_iter()
                                .map(|v| view! {
                                    <option value=v.uri.clone()>
                                        {format!("{} ({})", v.name, v.lang)}
                                    </option>
                                })
                                .collect_view()}
                        </select>
                    </label>
                    <label>{move || format!("Speed: {}x", rate.get())}
                        <input
                            type="range"
                            min=MIN_VOICE_SETTING
                            max=MAX_VOICE_SETTING
                            step=VOICE_SETTING_STEP
                            prop:value=move || rate.get().to_string()
                            on:input=on_rate.clone()
                        />
                    </label>
                    <label>{move || format!("Pitch: {}", pitch.get())}
                        <input
                            type="range"
                            min=MIN_VOICE_SETTING
                            max=MAX_VOICE_SETTING
                            step=VOICE_SETTING_STEP
                            prop:value=move || pitch.get().to_string()
                            on:input=on_pitch.clone()
                        />
                    </label>
                    <div class="playback">
                        <button on:click=on_toggle.clone()>
                            {move || if playing.get() { "Pause" } else { "Play" }}
                        </button>
                        <button on:click=on_stop.clone() disabled=move || !playing.get()>
                            "Stop"
                        </button>
                    </div>
                    <Show when=progress_visible.clone()>
                        <div class="progress">
                            <div class="progress-bar" style=progress.clone()></div>
                            <div class="progress-text">{progress_text.clone()}</div>
                        </div>
                    </Show>
                </div>
            </Show>
            <div class="script-content" inner_html=html></div>
            <div class="actions">
                <button on:click=on_copy>"Copy"</button>
                <button on:click=on_download>"Download"</button>
                <button on:click=on_share>"Share"</button>
                <button on:click=move |_| on_start_over.call(())>"Start Over"</button>
            </div>
            {move || notice.get().map(|n| view! { <p class="notice">{n}</p> })}
        </div>
    }
}
