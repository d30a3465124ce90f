//! Interactive terminal front end: prompts for a brief, shows the script and
//! offers the same playback and export actions as the browser view.

use crate::core::config::Config;
use crate::core::io::{NativeStorage, Storage};
use crate::core::model::{GeneratedScript, ScriptFormat, ScriptRequest, Tone};
use crate::services::export;
use crate::services::generator::ScriptGenerator;
use crate::services::speech::controller::{drive, lock};
use crate::services::speech::teleprompter::TeleprompterProvider;
use crate::services::speech::{find_voice, SharedController, SpeechController, SpeechOptions, Voice};
use crate::ui::app::{AppPhase, ScriptApp};
use crate::ui::display::{ScriptDisplay, ShareOutcome};
use crate::ui::form::ScriptForm;
use crate::ui::platform::{Platform, TerminalPlatform};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{CustomType, Select, Text};
use log::{info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    PlayPause,
    Stop,
    Refresh,
    Copy,
    Download,
    Share,
    ChooseVoice,
    StartOver,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::PlayPause => "Play / Pause",
            Action::Stop => "Stop",
            Action::Refresh => "Show reading position",
            Action::Copy => "Copy",
            Action::Download => "Download",
            Action::Share => "Share",
            Action::ChooseVoice => "Choose voice",
            Action::StartOver => "Start over",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

pub async fn run(mut config: Config) -> Result<()> {
    let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new());
    let platform: Arc<dyn Platform> =
        Arc::new(TerminalPlatform::new(storage, config.output_folder.clone()));

    let mut controller =
        SpeechController::new(TeleprompterProvider::new(config.speech.words_per_minute));
    let events = controller.take_events();
    let speech = controller.shared();
    let pump = events.map(|rx| tokio::spawn(drive(speech.clone(), rx)));

    let mut app = ScriptApp::new(ScriptGenerator::new(config.generation.delay()));
    let mut form = ScriptForm::new(config.form.resubmit_timeout());

    while let Some(request) = prompt_request(&mut form)? {
        let (ticket, work) = app.request_script(request);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
        spinner.set_message("Generating script...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        let outcome = work.await;
        spinner.finish_and_clear();

        app.complete(ticket, outcome);
        form.generation_finished();

        let script = match app.phase() {
            AppPhase::Showing(script) => script.clone(),
            _ => {
                if let Some(message) = app.error_message() {
                    eprintln!("{}", message);
                }
                app.dismiss_error();
                continue;
            }
        };

        let options = speech_options(&config, &speech);
        let display = ScriptDisplay::new(script, speech.clone(), options, platform.clone());
        let keep_going = show_result(&display, &mut config, &speech).await?;
        drop(display);
        app.start_over();
        if !keep_going {
            break;
        }
    }

    if let Some(pump) = pump {
        pump.abort();
    }
    Ok(())
}

/// Asks for a brief until it validates. `None` when the user leaves the topic prompt with Esc.
fn prompt_request(form: &mut ScriptForm) -> Result<Option<ScriptRequest>> {
    loop {
        let Some(topic) = Text::new("Topic:")
            .with_placeholder("e.g., Artificial Intelligence")
            .with_initial_value(&form.draft.topic)
            .prompt_skippable()?
        else {
            return Ok(None);
        };
        form.draft.topic = topic;

        let cursor = ScriptFormat::ALL
            .iter()
            .position(|f| *f == form.draft.format)
            .unwrap_or(0);
        form.draft.format = Select::new("Format:", ScriptFormat::ALL.to_vec())
            .with_starting_cursor(cursor)
            .prompt()?;

        form.draft.duration = CustomType::<u32>::new("Duration (minutes):")
            .with_default(form.draft.duration)
            .with_error_message("Please type a whole number of minutes")
            .prompt()?;

        let cursor = Tone::ALL
            .iter()
            .position(|t| *t == form.draft.tone)
            .unwrap_or(0);
        form.draft.tone = Select::new("Tone:", Tone::ALL.to_vec())
            .with_starting_cursor(cursor)
            .prompt()?;

        form.draft.audience = Text::new("Target audience (optional):")
            .with_initial_value(&form.draft.audience)
            .prompt()?;

        match form.submit() {
            Ok(request) => return Ok(Some(request)),
            Err(e) => println!("{}", e),
        }
    }
}

fn speech_options(config: &Config, speech: &SharedController) -> SpeechOptions {
    let mut options = config.speech.options();
    if let Some(name) = &config.speech.voice {
        let voices = lock(speech).voices();
        options.voice = find_voice(&voices, name).cloned();
        if options.voice.is_none() {
            warn!("Configured voice {} is not available", name);
        }
    }
    options
}

fn print_script(script: &GeneratedScript) {
    println!();
    println!("{}", script.title);
    println!(
        "{} minutes, {} words",
        script.estimated_duration, script.word_count
    );
    println!();
    println!("{}", script.content);
    println!();
}

fn status_line(display: &ScriptDisplay) -> String {
    let status = display.status();
    let state = if status.is_playing {
        "playing"
    } else if status.position > 0 {
        "paused"
    } else {
        "stopped"
    };
    format!("{} {:.0}%", state, display.progress_percentage())
}

/// Returns false when the user chose to quit.
async fn show_result(
    display: &ScriptDisplay,
    config: &mut Config,
    speech: &SharedController,
) -> Result<bool> {
    print_script(display.script());
    let supported = display.speech_supported();

    loop {
        let mut actions = Vec::new();
        if supported {
            actions.extend([Action::PlayPause, Action::Stop, Action::Refresh]);
        }
        actions.extend([Action::Copy, Action::Download, Action::Share]);
        if supported {
            actions.push(Action::ChooseVoice);
        }
        actions.extend([Action::StartOver, Action::Quit]);

        let prompt = if supported {
            format!("What next? [{}]", status_line(display))
        } else {
            "What next?".to_string()
        };

        match Select::new(&prompt, actions).prompt()? {
            Action::PlayPause => display.toggle_playback(),
            Action::Stop => display.stop_playback(),
            Action::Refresh => {
                let status = display.status();
                if status.position > 0 {
                    let parts = export::split_highlight(&display.script().content, status.position);
                    println!("... [{}] ...", parts.current.trim());
                } else {
                    println!("Not reading right now.");
                }
            }
            Action::Copy => display.copy().await?,
            Action::Download => {
                let location = display.download().await?;
                println!("Saved to {}", location);
            }
            Action::Share => match display.share().await? {
                ShareOutcome::Shared => println!("Shared."),
                ShareOutcome::Copied => println!("Sharing is not available here; copied instead."),
            },
            Action::ChooseVoice => {
                let voices = lock(speech).voices();
                if let Some(voice) = select_voice("Select narrator voice:", &voices)? {
                    config.speech.voice = Some(voice.name);
                    config.save()?;
                    info!("Configuration saved.");
                    display.set_options(speech_options(config, speech));
                    println!("The new voice is used the next time playback starts from the beginning.");
                }
            }
            Action::StartOver => {
                display.stop_playback();
                return Ok(true);
            }
            Action::Quit => {
                display.stop_playback();
                return Ok(false);
            }
        }
    }
}

fn select_voice(prompt: &str, voices: &[Voice]) -> Result<Option<Voice>> {
    if voices.is_empty() {
        println!("No voices available.");
        return Ok(None);
    }
    let options: Vec<String> = voices
        .iter()
        .map(|v| format!("{} ({})", v.name, v.lang))
        .collect();
    let Some(selection) = Select::new(prompt, options.clone()).prompt_skippable()? else {
        return Ok(None);
    };
    let index = options.iter().position(|o| *o == selection);
    Ok(index.and_then(|i| voices.get(i)).cloned())
}
