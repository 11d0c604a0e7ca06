// ABOUTME: Slide deck rendering for cursa presentations
// ABOUTME: Splits === delimited markdown into slide sections

use crate::markdown::MarkdownRenderer;
use regex::Regex;
use std::sync::LazyLock;

/// Placeholder left in every slide's class attribute; the generator swaps it
/// for the classes of the target output.
pub const SLIDE_CLASS_MARKER: &str = "[extra css]";

/// Separator placed between slides so printed output starts each slide on a
/// new page.
pub const PAGE_BREAK: &str = r#"&nbsp;<div class="page-breaker"></div>"#;

static SLIDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)={3}(.*?)={3}").expect("slide pattern is valid")
});

/// Extract the markdown of every `=== ... ===` section, in order.
pub fn slide_sections(markdown: &str) -> Vec<&str> {
    SLIDE_PATTERN
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Render a presentation source into a sequence of slide sections.
///
/// An input with no delimited sections renders to an empty string.
pub fn render_slides(renderer: &MarkdownRenderer, markdown: &str) -> String {
    let sections = slide_sections(markdown);
    let last = sections.len().saturating_sub(1);

    let mut html = String::new();
    for (i, section) in sections.iter().enumerate() {
        html.push_str(&format!(r#"<section class="slide" {}>"#, SLIDE_CLASS_MARKER));
        html.push_str(&renderer.render(section));
        html.push_str("</section>");
        // No break after the final slide, it would print a blank page
        if i < last {
            html.push_str(PAGE_BREAK);
        }
    }
    html
}

/// Replace the class placeholder, optionally adding an extra class.
pub fn apply_slide_class(html: &str, extra_class: Option<&str>) -> String {
    let placeholder = format!(r#"<section class="slide" {}>"#, SLIDE_CLASS_MARKER);
    let replacement = match extra_class {
        Some(class) => format!(r#"<section class="slide {}">"#, class),
        None => r#"<section class="slide">"#.to_string(),
    };
    html.replace(&placeholder, &replacement)
}
