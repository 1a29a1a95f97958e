// src/markdown/sections.rs

//! Plain string scanning for headings and fenced blocks.

const SECTION_END: char = '#';
const FENCE: &str = "```";
const BASH_FENCE: &str = "```bash";

/// Text following the first occurrence of `heading`, up to the next `#`
/// that is not inside a fenced code block.
///
/// Returns an empty string when the heading is absent. An unterminated
/// fence swallows the rest of the document.
pub fn section<'a>(source: &'a str, heading: &str) -> &'a str {
    let Some(start) = source.find(heading) else {
        return "";
    };
    let body = &source[start + heading.len()..];

    let mut pos = 0;
    loop {
        let Some(hash) = body[pos..].find(SECTION_END).map(|i| i + pos) else {
            return body;
        };

        match body[pos..].find(FENCE).map(|i| i + pos) {
            Some(open) if open < hash => {
                let after_open = open + FENCE.len();
                let Some(close) = body[after_open..].find(FENCE) else {
                    return body;
                };
                pos = after_open + close + FENCE.len();
            }
            _ => return &body[..hash],
        }
    }
}

/// Contents of every ```` ```bash ```` block in `section`, trimmed, in order.
///
/// Scanning stops at the first block without a closing fence.
pub fn bash_blocks(section: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut rest = section;

    while let Some(open) = rest.find(BASH_FENCE) {
        let after_open = &rest[open + BASH_FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };
        blocks.push(after_open[..close].trim().to_string());
        rest = &after_open[close + FENCE.len()..];
    }

    blocks
}
