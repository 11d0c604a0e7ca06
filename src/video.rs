// ABOUTME: Video embedding for author markdown
// ABOUTME: Turns @(url)[w,h] markup and known provider URLs into player elements

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

const DEFAULT_WIDTH: &str = "480";
const DEFAULT_HEIGHT: &str = "360";

/// `@(src)[width,height]`, both dimensions optional
static MEDIA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@\((?P<src>.*?)\)\[(?P<dims>\d*?,?\d*?)\]")
        .expect("media pattern is valid")
});

/// The video hosting sites whose bare URLs are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoProvider {
    Dailymotion,
    Metacafe,
    Veoh,
    Vimeo,
    Yahoo,
    Youtube,
}

impl VideoProvider {
    pub const ALL: [VideoProvider; 6] = [
        VideoProvider::Dailymotion,
        VideoProvider::Metacafe,
        VideoProvider::Veoh,
        VideoProvider::Vimeo,
        VideoProvider::Yahoo,
        VideoProvider::Youtube,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VideoProvider::Dailymotion => "dailymotion",
            VideoProvider::Metacafe => "metacafe",
            VideoProvider::Veoh => "veoh",
            VideoProvider::Vimeo => "vimeo",
            VideoProvider::Yahoo => "yahoo",
            VideoProvider::Youtube => "youtube",
        }
    }

    pub fn default_size(self) -> (u32, u32) {
        match self {
            VideoProvider::Dailymotion => (480, 405),
            VideoProvider::Metacafe => (498, 423),
            VideoProvider::Veoh => (410, 341),
            VideoProvider::Vimeo => (400, 321),
            VideoProvider::Yahoo => (512, 322),
            VideoProvider::Youtube => (425, 344),
        }
    }

    // The lead excludes `(`, `<` and quotes so link targets, autolinks and
    // attribute values are left alone.
    fn pattern(self) -> &'static str {
        match self {
            VideoProvider::Dailymotion => {
                r#"(?P<lead>[^(<"']|^)https?://www\.dailymotion\.com/(?P<id>\S+)"#
            }
            VideoProvider::Metacafe => {
                r#"(?P<lead>[^(<"']|^)https?://www\.metacafe\.com/watch/(?P<id>\S+)/"#
            }
            VideoProvider::Veoh => {
                r#"(?P<lead>[^(<"']|^)https?://www\.veoh\.com/\S*(#watch%3D|watch/)(?P<id>\w+)"#
            }
            VideoProvider::Vimeo => r#"(?P<lead>[^(<"']|^)https?://(www\.|)vimeo\.com/(?P<id>\d+)\S*"#,
            VideoProvider::Yahoo => {
                r#"(?P<lead>[^(<"']|^)https?://video\.yahoo\.com/watch/(?P<vid>\d+)/(?P<id>\d+)"#
            }
            VideoProvider::Youtube => {
                r#"(?P<lead>[^(<"']|^)https?://www\.youtube\.com/watch\?\S*v=(?P<id>[A-Za-z0-9_&=-]+)\S*"#
            }
        }
    }

    fn player_url(self, caps: &Captures) -> String {
        let id = &caps["id"];
        match self {
            VideoProvider::Dailymotion => format!(
                "http://www.dailymotion.com/swf/{}",
                id.rsplit('/').next().unwrap_or(id)
            ),
            VideoProvider::Metacafe => format!("http://www.metacafe.com/fplayer/{}.swf", id),
            VideoProvider::Veoh => {
                format!("http://www.veoh.com/videodetails2.swf?permalinkId={}", id)
            }
            VideoProvider::Vimeo => format!(
                "http://vimeo.com/moogaloop.swf?clip_id={}&server=vimeo.com",
                id
            ),
            VideoProvider::Yahoo => {
                "http://d.yimg.com/static.video.yahoo.com/yep/YV_YEP.swf?ver=2.2.40".to_string()
            }
            VideoProvider::Youtube => format!("http://www.youtube.com/v/{}", id),
        }
    }
}

/// Per-provider player sizes.
#[derive(Debug, Clone)]
pub struct VideoConfig {
    sizes: HashMap<VideoProvider, (u32, u32)>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            sizes: VideoProvider::ALL
                .iter()
                .map(|p| (*p, p.default_size()))
                .collect(),
        }
    }
}

impl VideoConfig {
    pub fn size(&self, provider: VideoProvider) -> (u32, u32) {
        self.sizes
            .get(&provider)
            .copied()
            .unwrap_or_else(|| provider.default_size())
    }

    pub fn set_size(&mut self, provider: VideoProvider, width: u32, height: u32) {
        self.sizes.insert(provider, (width, height));
    }
}

enum Embed {
    Media,
    Provider(VideoProvider),
}

/// Rewrites video markup in plain markdown text into inline HTML.
pub struct VideoEmbedder {
    config: VideoConfig,
    providers: Vec<(VideoProvider, Regex)>,
}

impl VideoEmbedder {
    pub fn new(config: VideoConfig) -> Self {
        let providers = VideoProvider::ALL
            .iter()
            .map(|p| {
                (*p, Regex::new(p.pattern()).expect("provider pattern is valid"))
            })
            .collect();
        Self { config, providers }
    }

    /// Replace every video reference in `text`. Matches are consumed left to
    /// right so a URL produced by one embed is never matched again.
    pub fn embed(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;

        while pos < text.len() {
            let mut best: Option<(Embed, Captures)> = None;

            if let Some(caps) = MEDIA_PATTERN.captures_at(text, pos) {
                best = Some((Embed::Media, caps));
            }
            for (provider, re) in &self.providers {
                if let Some(caps) = re.captures_at(text, pos) {
                    let start = caps.get(0).map_or(usize::MAX, |m| m.start());
                    let best_start = best
                        .as_ref()
                        .and_then(|(_, c)| c.get(0))
                        .map_or(usize::MAX, |m| m.start());
                    if start < best_start {
                        best = Some((Embed::Provider(*provider), caps));
                    }
                }
            }

            let Some((embed, caps)) = best else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            out.push_str(&text[pos..whole.start()]);
            match embed {
                Embed::Media => {
                    let (width, height) = caps["dims"].split_once(',').unwrap_or((&caps["dims"], ""));
                    let width = if width.is_empty() { DEFAULT_WIDTH } else { width };
                    let height = if height.is_empty() { DEFAULT_HEIGHT } else { height };
                    out.push_str(&object_element(&caps["src"], width, height));
                }
                Embed::Provider(provider) => {
                    out.push_str(caps.name("lead").map_or("", |m| m.as_str()));
                    let (width, height) = self.config.size(provider);
                    let url = provider.player_url(&caps);
                    let flash_vars = match provider {
                        VideoProvider::Yahoo => Some(format!("id={}&vid={}", &caps["id"], &caps["vid"])),
                        _ => None,
                    };
                    out.push_str(&iframe_element(&url, width, height, flash_vars.as_deref()));
                }
            }

            // An empty match cannot happen with these patterns, but never loop on one.
            pos = if whole.end() > pos { whole.end() } else { pos + 1 };
        }

        if pos < text.len() {
            out.push_str(&text[pos..]);
        }
        out
    }
}

fn attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

fn iframe_element(url: &str, width: u32, height: u32, flash_vars: Option<&str>) -> String {
    let mut html = format!(
        r#"<iframe src="{}" width="{}" height="{}" allowfullscreen="True">"#,
        attr(url),
        width,
        height
    );
    if let Some(vars) = flash_vars {
        html.push_str(&format!(r#"<param name="flashVars" value="{}" />"#, attr(vars)));
    }
    html.push_str("</iframe>");
    html
}

/// A generic `<object>` player, used for local files and any other URL
fn object_element(url: &str, width: &str, height: &str) -> String {
    let url = attr(url);
    format!(
        concat!(
            r#"<object width="{w}" height="{h}" data="{url}">"#,
            r#"<param name="movie" value="{url}" />"#,
            r#"<param name="allowFullScreen" value="true" />"#,
            r#"<param name="allowScriptAccess" value="sameDomain" />"#,
            r#"<param name="autoplay" value="false" />"#,
            "</object>"
        ),
        w = width,
        h = height,
        url = url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> VideoEmbedder {
        VideoEmbedder::new(VideoConfig::default())
    }

    #[test]
    fn test_media_with_dimensions() {
        let html = embedder().embed("@(http://example.com/v.mp4)[320,240]");
        assert!(html.starts_with("<object"));
        assert!(html.contains(r#"width="320""#));
        assert!(html.contains(r#"height="240""#));
        assert!(html.contains(r#"data="http://example.com/v.mp4""#));
    }

    #[test]
    fn test_media_default_dimensions() {
        let html = embedder().embed("@(http://example.com/v.mp4)[]");
        assert!(html.contains(r#"width="480""#));
        assert!(html.contains(r#"height="360""#));

        let html = embedder().embed("@(clip.mp4)[,200]");
        assert!(html.contains(r#"width="480""#));
        assert!(html.contains(r#"height="200""#));
    }

    #[test]
    fn test_youtube_url() {
        let html = embedder().embed("watch http://www.youtube.com/watch?v=abc123 now");
        assert!(html.starts_with("watch <iframe"));
        assert!(html.contains(r#"src="http://www.youtube.com/v/abc123""#));
        assert!(html.contains(r#"width="425""#));
        assert!(html.ends_with("</iframe> now"));
    }

    #[test]
    fn test_vimeo_size_override() {
        let mut config = VideoConfig::default();
        config.set_size(VideoProvider::Vimeo, 640, 360);
        let html = VideoEmbedder::new(config).embed("http://vimeo.com/1234");
        assert!(html.contains("clip_id=1234&amp;server=vimeo.com"));
        assert!(html.contains(r#"width="640""#));
        assert!(html.contains(r#"height="360""#));
    }

    #[test]
    fn test_link_target_is_not_embedded() {
        let text = "[video](http://www.youtube.com/watch?v=abc123)";
        assert_eq!(embedder().embed(text), text);
    }

    #[test]
    fn test_autolinks_and_anchors_are_not_embedded() {
        let autolink = "see <http://www.youtube.com/watch?v=abc123>";
        assert_eq!(embedder().embed(autolink), autolink);

        let anchor = r#"<a href="http://www.youtube.com/watch?v=abc123">clip</a>"#;
        assert_eq!(embedder().embed(anchor), anchor);

        let single = "<a href='http://vimeo.com/1234'>clip</a>";
        assert_eq!(embedder().embed(single), single);
    }

    #[test]
    fn test_media_url_is_not_embedded_twice() {
        let html = embedder().embed("@(http://www.youtube.com/watch?v=abc)[]");
        assert_eq!(html.matches("<object").count(), 1);
        assert!(!html.contains("<iframe"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "Nothing to see here, email me @ home (maybe) [soon].";
        assert_eq!(embedder().embed(text), text);
    }
}
