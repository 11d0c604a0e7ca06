// ABOUTME: Markdown rendering for the cursa application
// ABOUTME: Wraps comrak with the video extension and lenient heading syntax

use crate::video::{VideoConfig, VideoEmbedder};
use comrak::{markdown_to_html, ComrakOptions};
use regex::Regex;
use std::sync::LazyLock;

/// `#Title` is accepted as a heading, as in `# Title`
static TIGHT_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<hashes> {0,3}#{1,6})(?P<text>[^#\s])")
        .expect("heading pattern is valid")
});

/// Converts author markdown into HTML fragments.
pub struct MarkdownRenderer {
    options: ComrakOptions,
    video: VideoEmbedder,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(VideoConfig::default())
    }
}

impl MarkdownRenderer {
    pub fn new(video: VideoConfig) -> Self {
        let mut options = ComrakOptions::default();
        options.extension.table = true;
        options.extension.footnotes = true;
        options.extension.strikethrough = true;
        options.extension.description_lists = true;
        options.render.unsafe_ = true; // Allow raw HTML, the video embeds rely on it

        Self {
            options,
            video: VideoEmbedder::new(video),
        }
    }

    /// Render markdown text to an HTML fragment with no trailing whitespace.
    pub fn render(&self, markdown: &str) -> String {
        let prepared = self.prepare(markdown);
        let html = markdown_to_html(&prepared, &self.options);
        html.trim_end().to_string()
    }

    /// Apply the custom inline syntax everywhere except inside code.
    fn prepare(&self, markdown: &str) -> String {
        let mut fence: Option<String> = None;
        let mut lines = Vec::new();
        // an indented code block starts after a blank line and runs until
        // the next non-blank line that is not indented
        let mut prev_blank = true;
        let mut indented_code = false;

        for line in markdown.split('\n') {
            let trimmed = line.trim_start_matches([' ', '\t']);
            let indent = indent_width(&line[..line.len() - trimmed.len()]);
            let blank = trimmed.trim_end().is_empty();

            if fence.is_none() && !blank && indent >= 4 && (prev_blank || indented_code) {
                indented_code = true;
                prev_blank = false;
                lines.push(line.to_string());
                continue;
            }
            if !blank {
                indented_code = false;
            }
            prev_blank = blank;

            if indent <= 3 {
                if let Some(open) = &fence {
                    let fence_char = open.chars().next().unwrap_or('`');
                    let closing = trimmed.trim_end();
                    if closing.len() >= open.len() && closing.chars().all(|c| c == fence_char) {
                        fence = None;
                    }
                    lines.push(line.to_string());
                    continue;
                }
                if let Some(marker) = fence_marker(trimmed) {
                    fence = Some(marker);
                    lines.push(line.to_string());
                    continue;
                }
            } else if fence.is_some() {
                lines.push(line.to_string());
                continue;
            }

            let line = TIGHT_HEADING.replace(line, "$hashes $text");
            lines.push(self.embed_outside_code_spans(&line));
        }

        lines.join("\n")
    }

    fn embed_outside_code_spans(&self, line: &str) -> String {
        let spans = code_spans(line);
        if spans.is_empty() {
            return self.video.embed(line);
        }

        let mut out = String::with_capacity(line.len());
        let mut pos = 0;
        for (start, end) in spans {
            out.push_str(&self.video.embed(&line[pos..start]));
            out.push_str(&line[start..end]);
            pos = end;
        }
        out.push_str(&self.video.embed(&line[pos..]));
        out
    }
}

/// Column width of leading whitespace, with tabs stopping every four columns.
fn indent_width(leading: &str) -> usize {
    leading.chars().fold(0, |width, c| match c {
        '\t' => width + 4 - width % 4,
        _ => width + 1,
    })
}

/// Returns the fence string (three or more backticks or tildes) if the line
/// opens a fenced code block.
fn fence_marker(trimmed: &str) -> Option<String> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run = trimmed.chars().take_while(|c| *c == first).count();
    if run < 3 {
        return None;
    }
    Some(std::iter::repeat(first).take(run).collect())
}

/// Byte ranges of the closed inline code spans in a line.
fn code_spans(line: &str) -> Vec<(usize, usize)> {
    let bytes = line.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'`' {
                i += 1;
            }
            runs.push((start, i));
        } else {
            i += 1;
        }
    }

    let mut spans = Vec::new();
    let mut idx = 0;
    while idx < runs.len() {
        let (open_start, open_end) = runs[idx];
        let width = open_end - open_start;
        // a span closes on the next run of the same length
        match runs[idx + 1..].iter().position(|(s, e)| e - s == width) {
            Some(offset) => {
                let (_, close_end) = runs[idx + 1 + offset];
                spans.push((open_start, close_end));
                idx += offset + 2;
            }
            None => idx += 1,
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_without_space() {
        let renderer = MarkdownRenderer::default();
        assert_eq!(renderer.render("# test h1"), "<h1>test h1</h1>");
        assert_eq!(renderer.render("#test h1"), "<h1>test h1</h1>");
        assert_eq!(renderer.render("##sub"), "<h2>sub</h2>");
    }

    #[test]
    fn test_extra_features() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));

        let html = renderer.render("Text[^1]\n\n[^1]: A note\n");
        assert!(html.contains("footnote"));

        let html = renderer.render("```\nfn main() {}\n```\n");
        assert!(html.contains("<pre><code>fn main() {}"));
    }

    #[test]
    fn test_video_markup_rendered() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.render("@(http://example.com/v.mp4)[320,240]");
        assert!(html.contains("<object"));
        assert!(html.contains(r#"width="320""#));
        assert!(html.contains(r#"height="240""#));
    }

    #[test]
    fn test_video_markup_left_alone_in_code() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.render("```\n@(a.mp4)[1,2]\n#not a heading\n```\n");
        assert!(!html.contains("<object"));
        assert!(html.contains("@(a.mp4)[1,2]"));
        assert!(html.contains("#not a heading"));

        let html = renderer.render("Use `@(a.mp4)[1,2]` to embed");
        assert!(!html.contains("<object"));
        assert!(html.contains("<code>@(a.mp4)[1,2]</code>"));
    }

    #[test]
    fn test_video_markup_left_alone_in_indented_code() {
        let renderer = MarkdownRenderer::default();
        let html = renderer.render("Example:\n\n    @(a.mp4)[1,2]\n\n    #not a heading\n");
        assert!(!html.contains("object"));
        assert!(html.contains("<pre><code>@(a.mp4)[1,2]"));
        assert!(html.contains("#not a heading"));

        let html = renderer.render("Example:\n\n\t@(a.mp4)[1,2]\n");
        assert!(!html.contains("object"));

        // an indented line right after a paragraph continues that paragraph
        let html = renderer.render("Example:\n    @(a.mp4)[1,2]\n");
        assert!(html.contains("<object"));

        // the code block ends at the first line that is not indented
        let html = renderer.render("    code\n\n@(a.mp4)[1,2]\n");
        assert!(html.contains("<pre><code>code"));
        assert!(html.contains("<object"));
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    "), 4);
        assert_eq!(indent_width("\t"), 4);
        assert_eq!(indent_width("  \t"), 4);
        assert_eq!(indent_width(" "), 1);
    }

    #[test]
    fn test_code_spans() {
        assert_eq!(code_spans("a `b` c"), vec![(2, 5)]);
        assert_eq!(code_spans("a ``b`c`` d"), vec![(2, 9)]);
        assert!(code_spans("unclosed `tick").is_empty());
    }
}
