// ABOUTME: Page templates for the cursa application
// ABOUTME: Wraps rendered HTML fragments into complete documents for each output kind

use crate::config::Config;
use crate::resources::{self, ResourceFile, ResourceKind};
use crate::slides::PAGE_BREAK;

const PAGE_BREAK_CSS: &str = r#"<style type="text/css" media="screen,print">
.page-breaker {
    position: relative !important;
    display: block !important;
    page-break-after: always !important;
    clear: both !important;
}
</style>"#;

const HIGHLIGHT_INIT: &str = r#"
  <script>
  hljs.tabReplace = '    ';
  hljs.initHighlightingOnLoad();
  </script>
"#;

/// Builds the complete HTML documents written by the generator.
#[derive(Debug, Clone)]
pub struct ViewComposer {
    contributor: String,
    install_path: String,
}

impl ViewComposer {
    pub fn new(config: &Config) -> Self {
        Self {
            contributor: config.contributor.clone(),
            install_path: config.install_path.to_string_lossy().into_owned(),
        }
    }

    /// A lab step: navigation bar, content and the lab's stylesheets.
    pub fn step_view(&self, title: &str, content: &str, navbar: &str, css: &[String]) -> String {
        let css = resources::tags(css, "./assets/css", ResourceKind::Css);
        let mut html = top(title, &css);
        html.push_str(navbar);
        html.push_str(&body(content));
        html.push_str(&self.bottom(&page_js()));
        html
    }

    /// The index page of a topic.
    pub fn topic_view(&self, title: &str, content: &str) -> String {
        let css = resources::tags(&owned(&resources::BASE_CSS), "./assets/css", ResourceKind::Css);
        let mut html = top(title, &css);
        html.push_str(&body(content));
        html.push_str(&self.bottom(&page_js()));
        html
    }

    /// The index page of a module; `content` holds the topic links.
    pub fn module_view(&self, title: &str, content: &str) -> String {
        let mut files = owned(&resources::BASE_CSS);
        files.push("github.css".to_string());
        let css = resources::tags(&files, "./assets/css", ResourceKind::Css);
        let mut html = top(title, &css);
        html.push_str(&body(content));
        html.push_str(&self.bottom(&page_js()));
        html
    }

    /// All steps of a lab in one printable document.
    pub fn lab_text_view(&self, content: &str, css: &[String]) -> String {
        let mut css = resources::tags(css, &self.install_path, ResourceKind::Css);
        css.push('\n');
        css.push_str(PAGE_BREAK_CSS);

        let mut html = top("", &css);
        html.push_str(&body(content));
        html.push_str("\n\n      </div>\n");
        html.push_str(&self.print_js());
        html.push_str("  </body>\n</html>\n");
        html
    }

    /// A live deck.js presentation.
    pub fn presentation_view(&self, title: &str, slides: &str, css: &[String]) -> String {
        let css = resources::tags(css, "./assets/css", ResourceKind::Css);
        let scripts: String = resources::DECK_JS
            .iter()
            .filter(|name| **name != "modernizr.custom.js")
            .map(|name| format!("{}\n", ResourceFile::in_dir("./assets/js", name).tag(ResourceKind::Js)))
            .collect();

        format!(
            r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta http-equiv="X-UA-Compatible" content="IE=edge,chrome=1">
    <meta name="viewport" content="width=1024, user-scalable=no">

    <title>{title}</title>

    {css}

    <script src="./assets/js/modernizr.custom.js"></script>
</head>
<body class="deck-container">

{slides}

<a href="#" class="deck-prev-link" title="Previous">&#8592;</a>
<a href="#" class="deck-next-link" title="Next">&#8594;</a>

<p class="deck-status">
    <span class="deck-status-current"></span>
    /
    <span class="deck-status-total"></span>
</p>

<form action="." method="get" class="goto-form">
    <label for="goto-slide">Go to slide:</label>
    <input type="text" name="slidenum" id="goto-slide" list="goto-datalist">
    <datalist id="goto-datalist"></datalist>
    <input type="submit" value="Go">
</form>

<a href="." title="Permalink to this slide" class="deck-permalink">#</a>

{scripts}
<script>
    $(function() {{
        $.deck('.slide');
        hljs.tabReplace = '    ';
        hljs.initHighlightingOnLoad();
    }});
</script>
</body>
</html>"##,
            title = title,
            css = css,
            slides = slides,
            scripts = scripts
        )
    }

    /// The printable version of a presentation: no player widgets, every
    /// slide visible, no transitions.
    pub fn presentation_text_view(&self, slides: &str, css: &[String]) -> String {
        let css = resources::tags(css, &self.install_path, ResourceKind::Css);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta http-equiv="X-UA-Compatible" content="IE=edge,chrome=1">
    <meta name="viewport" content="width=1024, user-scalable=no">

    <title></title>

    {css}

    <style type="text/css" media="screen,print">
    .page-breaker {{
        position: relative !important;
        display: block !important;
        page-break-after: always !important;
        clear: both !important;
    }}

    * {{
        -webkit-transition: none !important;
        transition: none !important;
        visibility: visible !important;
    }}

    body {{
        padding: 0em !important;
        margin: 0em !important;
    }}
    </style>

</head>

<body class="deck-container">

{slides}
{js}
</body>
</html>"#,
            css = css,
            slides = slides,
            js = self.print_js()
        )
    }

    fn bottom(&self, js: &str) -> String {
        format!(
            r#"

      </div>

      <footer id="footer" class="container-fluid">
        <p id="footertext">
          Prepared by {contributor}. Except where otherwise noted, this content is licensed under a
          <a class="externalLink" href="http://creativecommons.org/licenses/by-nc/3.0/"
            title="External link to http://creativecommons.org/licenses/by-nc/3.0/"
            target="_blank">Creative Commons Attribution-NonCommercial 3.0 License
          </a>
        </p>
      </footer>
{js}
  </body>
</html>
"#,
            contributor = self.contributor,
            js = js
        )
    }

    fn print_js(&self) -> String {
        format!(
            "\n{}\n{}",
            ResourceFile::in_dir(&self.install_path, "highlight.pack.js").tag(ResourceKind::Js),
            HIGHLIGHT_INIT
        )
    }
}

/// Join step fragments with page breaks for the printable lab book.
pub fn join_pages(fragments: &[String]) -> String {
    fragments.join(PAGE_BREAK)
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn top(title: &str, css: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
{css}
</head>
<body>

<div id="container" class="container-fluid">

"#,
        title = title,
        css = css
    )
}

fn body(content: &str) -> String {
    format!(
        r#"

<div id="content" class="row-fluid">
<div class="span12">
  {content}
</div>

</div>

"#,
        content = content
    )
}

fn page_js() -> String {
    let scripts: String = ["highlight.pack.js", "jquery-1.7.2.min.js", "bootstrap.min.js"]
        .iter()
        .map(|name| format!("\n{}", ResourceFile::in_dir("./assets/js", name).tag(ResourceKind::Js)))
        .collect();
    format!("{}\n{}", scripts, HIGHLIGHT_INIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> ViewComposer {
        let mut config = Config::with_paths("/home/u/cursa", "/opt/cursa");
        config.contributor = "Jane Doe (jane@example.com)".to_string();
        ViewComposer::new(&config)
    }

    #[test]
    fn test_step_view_has_navbar_css_and_footer() {
        let html = composer().step_view(
            "Objectives",
            "<p>body</p>",
            "<div class=\"navbar\"></div>",
            &["cursa.css".to_string()],
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Objectives</title>"));
        assert!(html.contains(r#"href="./assets/css/cursa.css""#));
        assert!(html.contains("<div class=\"navbar\"></div>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("Prepared by Jane Doe (jane@example.com)."));
    }

    #[test]
    fn test_print_views_have_no_chrome() {
        let composer = composer();
        let lab = composer.lab_text_view("<p>a</p>", &["cursa.css".to_string()]);
        assert!(!lab.contains("footer"));
        assert!(!lab.contains("navbar"));
        assert!(lab.contains(r#"href="/opt/cursa/cursa.css""#));
        assert!(lab.contains("page-break-after: always"));
        assert!(lab.contains(r#"<script src="/opt/cursa/highlight.pack.js"></script>"#));

        let pres = composer.presentation_text_view("<section></section>", &["deck.core.css".to_string()]);
        assert!(!pres.contains("deck-prev-link"));
        assert!(!pres.contains("footer"));
        assert!(pres.contains(r#"href="/opt/cursa/deck.core.css""#));
        assert!(pres.contains("visibility: visible !important"));
        assert!(!pres.contains("./assets"));
    }

    #[test]
    fn test_presentation_view_has_player() {
        let html = composer().presentation_view("Intro", "<section></section>", &["deck.core.css".to_string()]);
        assert!(html.contains("<title>Intro</title>"));
        assert!(html.contains("deck-prev-link"));
        assert!(html.contains(r#"<script src="./assets/js/deck.core.js"></script>"#));
        assert_eq!(html.matches("deck.core.js").count(), 1);
        assert!(html.contains("$.deck('.slide');"));
    }

    #[test]
    fn test_join_pages() {
        let pages = vec!["<p>1</p>".to_string(), "<p>2</p>".to_string()];
        assert_eq!(
            join_pages(&pages),
            r#"<p>1</p>&nbsp;<div class="page-breaker"></div><p>2</p>"#
        );
    }
}
