// ABOUTME: Image path rewriting for markdown sources
// ABOUTME: Anchors ../ relative image references at an absolute content root

use regex::{Captures, Regex};
use std::path::{Path, MAIN_SEPARATOR};
use std::sync::LazyLock;

const NOBRACKET: &str = r"[^\]\[]*";

/// Link text may nest brackets up to six levels deep, the same grammar the
/// markdown image matcher accepts.
fn bracketed() -> String {
    let mut pattern = String::from(r"\[(");
    for _ in 0..6 {
        pattern.push_str(NOBRACKET);
        pattern.push_str(r"(\[");
    }
    for _ in 0..6 {
        pattern.push_str(NOBRACKET);
        pattern.push_str(r"\])*");
    }
    pattern.push_str(NOBRACKET);
    pattern.push_str(r")\]");
    pattern
}

static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"!{}\s*\((?P<target><.*?>|(?P<src>[^\)]*))\)",
        bracketed()
    );
    Regex::new(&pattern).expect("image pattern is valid")
});

/// Rewrite every markdown image whose path starts with `../` so that it is
/// anchored at `base`. Everything else is returned unchanged.
pub fn absolutize(markdown: &str, base: &Path) -> String {
    let prefix = format!("{}{}", base.display(), MAIN_SEPARATOR);

    IMAGE_LINK
        .replace_all(markdown, |caps: &Captures| {
            let whole = &caps[0];
            let Some(target) = caps.name("target") else {
                return whole.to_string();
            };
            let offset = caps.get(0).map_or(0, |m| m.start());
            let (start, end) = (target.start() - offset, target.end() - offset);

            let src = target.as_str();
            let rewritten = if let Some(inner) = src.strip_prefix("<../") {
                format!("<{}{}", prefix, inner)
            } else if let Some(rest) = src.strip_prefix("../") {
                format!("{}{}", prefix, rest)
            } else {
                return whole.to_string();
            };

            format!("{}{}{}", &whole[..start], rewritten, &whole[end..])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_image_made_absolute() {
        let result = absolutize("![](../img/image.png)", Path::new("absolute/path/to"));
        assert_eq!(result, "![](absolute/path/to/img/image.png)");
    }

    #[test]
    fn test_alt_text_and_nested_brackets() {
        let base = Path::new("/labs/lab1");
        let result = absolutize("See ![a [nested] alt](../img/x.png) here", base);
        assert_eq!(result, "See ![a [nested] alt](/labs/lab1/img/x.png) here");

        let result = absolutize("![alt](<../img/y.png>)", base);
        assert_eq!(result, "![alt](</labs/lab1/img/y.png>)");
    }

    #[test]
    fn test_other_paths_untouched() {
        let base = Path::new("/labs/lab1");
        let inputs = [
            "![](img/image.png)",
            "![](/abs/image.png)",
            "![](http://example.com/a.png)",
            "![](./../img/a.png)",
            "[link](../img/image.png)",
            "plain ../img/image.png text",
        ];
        for input in inputs {
            assert_eq!(absolutize(input, base), input);
        }
    }

    #[test]
    fn test_only_leading_prefix_rewritten() {
        let result = absolutize("![](../img/../x.png) ![](../b.png)", Path::new("/r"));
        assert_eq!(result, "![](/r/img/../x.png) ![](/r/b.png)");
    }
}
