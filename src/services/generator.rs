use crate::core::model::{GeneratedScript, ScriptRequest};
use crate::services::templates;
use crate::utils::timer;
use anyhow::Result;
use log::{debug, info};
use rand::Rng;
use std::time::Duration;

/// Artificial pacing applied before a script is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationDelay {
    None,
    Fixed(Duration),
    /// Uniform over `[min, max)`.
    Uniform { min: Duration, max: Duration },
}

impl Default for GenerationDelay {
    fn default() -> Self {
        GenerationDelay::Uniform {
            min: Duration::from_millis(2000),
            max: Duration::from_millis(4000),
        }
    }
}

impl GenerationDelay {
    pub fn sample(&self) -> Duration {
        match *self {
            GenerationDelay::None => Duration::ZERO,
            GenerationDelay::Fixed(d) => d,
            GenerationDelay::Uniform { min, max } => {
                if max <= min {
                    return min;
                }
                let span = (max - min).as_nanos().min(u64::MAX as u128) as u64;
                let offset = rand::rng().random_range(0..span);
                min + Duration::from_nanos(offset)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptGenerator {
    delay: GenerationDelay,
}

impl ScriptGenerator {
    pub fn new(delay: GenerationDelay) -> Self {
        Self { delay }
    }

    pub fn immediate() -> Self {
        Self::new(GenerationDelay::None)
    }

    pub async fn generate(&self, request: &ScriptRequest) -> Result<GeneratedScript> {
        let wait = self.delay.sample();
        debug!("Generating script for {:?}, delaying {:?}", request.topic, wait);
        if !wait.is_zero() {
            timer::sleep(wait).await;
        }

        let script = Self::assemble(request);
        info!(
            "Generated \"{}\" ({} words)",
            script.title, script.word_count
        );
        Ok(script)
    }

    /// Builds the script without any delay.
    pub fn assemble(request: &ScriptRequest) -> GeneratedScript {
        let content = templates::select_content(request);
        GeneratedScript::new(request, content)
    }
}
