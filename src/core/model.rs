use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptFormat {
    #[default]
    Presentation,
    Video,
    Podcast,
    Speech,
    Tutorial,
}

impl ScriptFormat {
    pub const ALL: [ScriptFormat; 5] = [
        ScriptFormat::Presentation,
        ScriptFormat::Video,
        ScriptFormat::Podcast,
        ScriptFormat::Speech,
        ScriptFormat::Tutorial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptFormat::Presentation => "presentation",
            ScriptFormat::Video => "video",
            ScriptFormat::Podcast => "podcast",
            ScriptFormat::Speech => "speech",
            ScriptFormat::Tutorial => "tutorial",
        }
    }

    /// Display label, e.g. "Podcast".
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for ScriptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Accepted and validated, but does not influence the generated text.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Educational,
    Entertaining,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Educational,
        Tone::Entertaining,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Educational => "educational",
            Tone::Entertaining => "entertaining",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.as_str();
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}{}", first.to_uppercase(), chars.as_str())?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScriptRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub format: ScriptFormat,
    pub duration: u32,
    pub tone: Tone,
    #[serde(default)]
    pub audience: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedScript {
    pub title: String,
    pub content: String,
    pub estimated_duration: u32,
    pub word_count: usize,
    pub generated_at: DateTime<Local>,
}

impl GeneratedScript {
    pub fn new(request: &ScriptRequest, content: String) -> Self {
        Self {
            title: script_title(request),
            word_count: count_words(&content),
            content,
            estimated_duration: request.duration,
            generated_at: Local::now(),
        }
    }

    /// Length of the content in characters, the unit playback positions use.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

pub fn script_title(request: &ScriptRequest) -> String {
    format!("{} Script: {}", request.format.label(), request.topic)
}

pub fn count_words(content: &str) -> usize {
    content.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(topic: &str, format: ScriptFormat) -> ScriptRequest {
        ScriptRequest {
            topic: topic.to_string(),
            format,
            duration: 5,
            tone: Tone::Casual,
            audience: String::new(),
        }
    }

    #[test]
    fn test_title_capitalizes_format() {
        let req = request("Climate Change", ScriptFormat::Podcast);
        assert_eq!(script_title(&req), "Podcast Script: Climate Change");

        let req = request("AI & Robots!", ScriptFormat::Video);
        assert_eq!(script_title(&req), "Video Script: AI & Robots!");
    }

    #[test]
    fn test_word_count_ignores_repeated_whitespace() {
        assert_eq!(count_words("one  two\n\nthree\tfour "), 4);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_generated_script_echoes_duration() {
        let mut req = request("Gardening", ScriptFormat::Speech);
        req.duration = 42;
        let script = GeneratedScript::new(&req, "Hello there world".to_string());
        assert_eq!(script.estimated_duration, 42);
        assert_eq!(script.word_count, 3);
        assert_eq!(script.char_len(), 17);
    }

    #[test]
    fn test_request_serde_uses_lowercase_names() -> anyhow::Result<()> {
        let json = r#"{"topic":"Tea","type":"tutorial","duration":10,"tone":"educational","audience":"students"}"#;
        let req: ScriptRequest = serde_json::from_str(json)?;
        assert_eq!(req.format, ScriptFormat::Tutorial);
        assert_eq!(req.tone, Tone::Educational);

        let back = serde_json::to_string(&req)?;
        assert!(back.contains(r#""type":"tutorial""#));
        Ok(())
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ScriptFormat::parse(" Video "), Some(ScriptFormat::Video));
        assert_eq!(ScriptFormat::parse("webinar"), None);
        assert_eq!(Tone::parse("CASUAL"), Some(Tone::Casual));
        assert_eq!(Tone::Entertaining.to_string(), "Entertaining");
    }
}
