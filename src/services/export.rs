use crate::core::model::GeneratedScript;

pub const HIGHLIGHT_WINDOW: usize = 50;
pub const SHARE_PREVIEW_CHARS: usize = 200;
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// Plain-text export: header lines followed by the script body.
pub fn export_document(script: &GeneratedScript) -> String {
    format!(
        "{}\n\nGenerated: {}\nEstimated Duration: {} minutes\nWord Count: {}\n\n{}",
        script.title,
        script.generated_at.format(TIMESTAMP_FORMAT),
        script.estimated_duration,
        script.word_count,
        script.content
    )
}

/// Every character outside `[A-Za-z0-9]` becomes `_`, then lowercase, plus `.txt`.
pub fn download_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.txt", stem)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

pub fn share_payload(script: &GeneratedScript, url: &str) -> SharePayload {
    let preview: String = script.content.chars().take(SHARE_PREVIEW_CHARS).collect();
    SharePayload {
        title: script.title.clone(),
        text: format!("{}...", preview),
        url: url.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub current: &'a str,
    pub after: &'a str,
}

/// Splits `content` around a fixed window starting at character `position`.
pub fn split_highlight(content: &str, position: usize) -> Highlight<'_> {
    let start = byte_offset(content, position);
    let end = start + byte_offset(&content[start..], HIGHLIGHT_WINDOW);
    Highlight {
        before: &content[..start],
        current: &content[start..end],
        after: &content[end..],
    }
}

/// Renders the content as HTML, marking the spoken window while playing.
pub fn highlighted_html(content: &str, position: usize, is_playing: bool) -> String {
    if !is_playing || position == 0 {
        return escape_html(content);
    }
    let parts = split_highlight(content, position);
    format!(
        "{}<span class=\"highlight\">{}</span>{}",
        escape_html(parts.before),
        escape_html(parts.current),
        escape_html(parts.after)
    )
}

/// Escapes text the way a DOM text node serialises.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn script(title: &str, content: &str) -> GeneratedScript {
        GeneratedScript {
            title: title.to_string(),
            content: content.to_string(),
            estimated_duration: 7,
            word_count: content.split_whitespace().count(),
            generated_at: Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename("Video Script: AI & Robots!"),
            "video_script__ai___robots_.txt"
        );
        assert_eq!(download_filename("Café 2024"), "caf__2024.txt");
        assert_eq!(download_filename(""), ".txt");
    }

    #[test]
    fn test_export_document_layout() {
        let s = script("Podcast Script: Tea", "Hello tea lovers");
        let doc = export_document(&s);
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], "Podcast Script: Tea");
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("Generated: Tue Mar 05 2024 14:30:00 GMT"));
        assert_eq!(lines[3], "Estimated Duration: 7 minutes");
        assert_eq!(lines[4], "Word Count: 3");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Hello tea lovers");
    }

    #[test]
    fn test_share_payload_truncates() {
        let long = "x".repeat(250);
        let payload = share_payload(&script("T", &long), "https://example.com/");
        assert_eq!(payload.text.len(), 203);
        assert!(payload.text.ends_with("x..."));
        assert_eq!(payload.url, "https://example.com/");

        let short = share_payload(&script("T", "short"), "");
        assert_eq!(short.text, "short...");
    }

    #[test]
    fn test_highlight_window() {
        let content = "a".repeat(10) + &"b".repeat(50) + "tail";
        let parts = split_highlight(&content, 10);
        assert_eq!(parts.before, "a".repeat(10));
        assert_eq!(parts.current, "b".repeat(50));
        assert_eq!(parts.after, "tail");

        // Window clamps at the end of the content.
        let parts = split_highlight("short text", 6);
        assert_eq!(parts.before, "short ");
        assert_eq!(parts.current, "text");
        assert_eq!(parts.after, "");

        // Positions past the end leave everything before the window.
        let parts = split_highlight("abc", 99);
        assert_eq!(parts.before, "abc");
        assert_eq!(parts.current, "");
    }

    #[test]
    fn test_highlight_counts_characters() {
        let parts = split_highlight("ééé abc", 4);
        assert_eq!(parts.before, "ééé ");
        assert_eq!(parts.current, "abc");
    }

    #[test]
    fn test_highlighted_html_escapes_each_part() {
        let content = "1 < 2 & <b>bold</b> text";
        assert_eq!(
            highlighted_html(content, 0, true),
            "1 &lt; 2 &amp; &lt;b&gt;bold&lt;/b&gt; text"
        );
        assert_eq!(
            highlighted_html(content, 4, false),
            escape_html(content)
        );

        let html = highlighted_html(content, 4, true);
        assert_eq!(
            html,
            "1 &lt; <span class=\"highlight\">2 &amp; &lt;b&gt;bold&lt;/b&gt; text</span>"
        );
    }

    #[test]
    fn test_escape_keeps_quotes() {
        assert_eq!(escape_html("\"it's\"\u{a0}ok"), "\"it's\"&nbsp;ok");
    }
}
