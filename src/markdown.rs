//! Markdown to HTML for blog posts
//!
//! Rendering is a fixed, ordered list of named string stages. Raw HTML is
//! escaped first, so every tag in the output was produced by a stage. Code
//! produced by the early stages is never rewritten by the later ones.

use std::fmt::Write as _;

/// One rewrite step
#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}

/// Stages in the order they run
pub const PIPELINE: &[Stage] = &[
    Stage { name: "escape", apply: escape },
    Stage { name: "code_blocks", apply: code_blocks },
    Stage { name: "inline_code", apply: inline_code },
    Stage { name: "headings", apply: headings },
    Stage { name: "lists", apply: lists },
    Stage { name: "bold", apply: bold },
    Stage { name: "italic", apply: italic },
    Stage { name: "links", apply: links },
    Stage { name: "paragraphs", apply: paragraphs },
];

/// Render a post body to HTML
pub fn render(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n");
    PIPELINE
        .iter()
        .fold(normalized.trim().to_string(), |html, stage| (stage.apply)(&html))
}

const FENCE: &str = "```";
const PRE: (&str, &str) = ("<pre>", "</pre>");
const CODE: (&str, &str) = ("<code>", "</code>");

/// Lines starting with these are left out of paragraphs
const BLOCK_TAGS: [&str; 8] = ["<h1>", "<h2>", "<h3>", "<ul>", "</ul>", "<ol>", "</ol>", "<li>"];

enum Piece<'a> {
    Text(&'a str),
    Protected(&'a str),
}

/// Split `input` into plain text and protected regions
fn pieces<'a>(input: &'a str, regions: &[(&str, &str)]) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut rest = input;
    loop {
        let next = regions
            .iter()
            .filter_map(|&(open, close)| rest.find(open).map(|start| (start, close)))
            .min_by_key(|&(start, _)| start);
        let Some((start, close)) = next else { break };
        let Some(len) = rest[start..].find(close) else { break };
        let end = start + len + close.len();

        if start > 0 {
            pieces.push(Piece::Text(&rest[..start]));
        }
        pieces.push(Piece::Protected(&rest[start..end]));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Text(rest));
    }
    pieces
}

fn outside(input: &str, regions: &[(&str, &str)], f: impl Fn(&str) -> String) -> String {
    pieces(input, regions)
        .into_iter()
        .map(|piece| match piece {
            Piece::Text(text) => f(text),
            Piece::Protected(region) => region.to_string(),
        })
        .collect()
}

/// Apply `f` outside code blocks
fn outside_blocks(input: &str, f: impl Fn(&str) -> String) -> String {
    outside(input, &[PRE], f)
}

/// Apply `f` outside code blocks and inline code
fn outside_code(input: &str, f: impl Fn(&str) -> String) -> String {
    outside(input, &[PRE, CODE], f)
}

fn map_lines(text: &str, f: impl Fn(&str) -> String) -> String {
    text.split('\n').map(f).collect::<Vec<_>>().join("\n")
}

fn find_at_line_start(haystack: &str, pattern: &str) -> Option<usize> {
    haystack
        .match_indices(pattern)
        .map(|(index, _)| index)
        .find(|&index| index == 0 || haystack.as_bytes()[index - 1] == b'\n')
}

/// Escape characters with meaning in HTML
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fenced code blocks, with an optional language tag
///
/// An unterminated fence is left as text.
pub fn code_blocks(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = find_at_line_start(rest, FENCE) {
        let after = &rest[open + FENCE.len()..];
        let Some(newline) = after.find('\n') else { break };
        let language = after[..newline].trim();
        let body = &after[newline + 1..];
        let Some(close) = find_at_line_start(body, FENCE) else { break };

        out.push_str(&rest[..open]);
        out.push_str("<pre><code");
        let tagged = !language.is_empty()
            && language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'));
        if tagged {
            let _ = write!(out, " class=\"language-{language}\"");
        }
        out.push('>');
        let code = &body[..close];
        out.push_str(code.strip_suffix('\n').unwrap_or(code));
        out.push_str("</code></pre>");

        rest = &body[close + FENCE.len()..];
    }

    out.push_str(rest);
    out
}

/// `code` spans; a backtick without a partner on the same line stays literal
pub fn inline_code(input: &str) -> String {
    outside_blocks(input, |text| {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('`') {
            let after = &rest[open + 1..];
            match after.find(['`', '\n']) {
                Some(close) if close > 0 && after.as_bytes()[close] == b'`' => {
                    out.push_str(&rest[..open]);
                    out.push_str("<code>");
                    out.push_str(&after[..close]);
                    out.push_str("</code>");
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push_str(&rest[..=open]);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    })
}

/// `#`, `##` and `###` headings
pub fn headings(input: &str) -> String {
    outside_blocks(input, |text| {
        map_lines(text, |line| {
            for (level, marker) in [(3, "### "), (2, "## "), (1, "# ")] {
                if let Some(title) = line.strip_prefix(marker) {
                    return format!("<h{level}>{}</h{level}>", title.trim());
                }
            }
            line.to_string()
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn open(self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>",
            ListKind::Ordered => "<ol>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>",
            ListKind::Ordered => "</ol>",
        }
    }
}

fn list_item(line: &str) -> Option<(ListKind, &str)> {
    if let Some(item) = line.strip_prefix("- ") {
        return Some((ListKind::Unordered, item));
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..]
        .strip_prefix(". ")
        .map(|item| (ListKind::Ordered, item))
}

/// Runs of `- item` or `1. item` lines
pub fn lists(input: &str) -> String {
    outside_blocks(input, |text| {
        let mut lines: Vec<String> = Vec::new();
        let mut open: Option<ListKind> = None;

        for line in text.split('\n') {
            match list_item(line) {
                Some((kind, item)) => {
                    if open != Some(kind) {
                        if let Some(previous) = open {
                            lines.push(previous.close().to_string());
                        }
                        lines.push(kind.open().to_string());
                        open = Some(kind);
                    }
                    lines.push(format!("<li>{}</li>", item.trim()));
                }
                None => {
                    if let Some(previous) = open.take() {
                        lines.push(previous.close().to_string());
                    }
                    lines.push(line.to_string());
                }
            }
        }
        if let Some(previous) = open {
            lines.push(previous.close().to_string());
        }
        lines.join("\n")
    })
}

/// Wrap text between pairs of `marker` on one line in `<tag>`
fn wrap_pairs(text: &str, marker: &str, tag: &str, accept: fn(&str) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find(marker) {
        let after = &rest[open + marker.len()..];
        match after.find(marker) {
            Some(close) if accept(&after[..close]) => {
                out.push_str(&rest[..open]);
                let _ = write!(out, "<{tag}>{}</{tag}>", &after[..close]);
                rest = &after[close + marker.len()..];
            }
            _ => {
                out.push_str(&rest[..open + marker.len()]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `**strong**`
pub fn bold(input: &str) -> String {
    outside_code(input, |text| {
        wrap_pairs(text, "**", "strong", |inner| {
            !inner.is_empty() && !inner.contains('\n')
        })
    })
}

/// `*emphasis*`; a lone or space-padded asterisk stays literal
pub fn italic(input: &str) -> String {
    outside_code(input, |text| {
        wrap_pairs(text, "*", "em", |inner| {
            !inner.is_empty()
                && !inner.contains('\n')
                && !inner.starts_with(char::is_whitespace)
                && !inner.ends_with(char::is_whitespace)
        })
    })
}

fn is_external(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// `[text](url)`; only http(s) targets become links, anything else keeps just the text
pub fn links(input: &str) -> String {
    outside_code(input, |text| {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('[') {
            let after = &rest[open + 1..];
            let parsed = after.find("](").and_then(|middle| {
                let label = &after[..middle];
                let tail = &after[middle + 2..];
                tail.find(')')
                    .map(|end| (label, &tail[..end], &tail[end + 1..]))
            });

            match parsed {
                Some((label, url, remaining))
                    if !label.contains(['\n', '[']) && !url.contains(['\n', ' ']) =>
                {
                    out.push_str(&rest[..open]);
                    if is_external(url) {
                        let _ = write!(
                            out,
                            "<a href=\"{url}\" rel=\"noopener noreferrer\">{label}</a>"
                        );
                    } else {
                        out.push_str(label);
                    }
                    rest = remaining;
                }
                _ => {
                    out.push_str(&rest[..=open]);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    })
}

fn flush_paragraph(lines: &mut Vec<String>, blocks: &mut Vec<String>) {
    if !lines.is_empty() {
        blocks.push(format!("<p>{}</p>", lines.join("\n")));
        lines.clear();
    }
}

/// Wrap runs of plain lines in `<p>`; blank lines separate paragraphs
pub fn paragraphs(input: &str) -> String {
    let mut blocks = Vec::new();
    for piece in pieces(input, &[PRE]) {
        match piece {
            Piece::Protected(block) => blocks.push(block.to_string()),
            Piece::Text(text) => {
                let mut lines = Vec::new();
                for line in text.split('\n').map(str::trim) {
                    if line.is_empty() {
                        flush_paragraph(&mut lines, &mut blocks);
                    } else if BLOCK_TAGS.iter().any(|tag| line.starts_with(tag)) {
                        flush_paragraph(&mut lines, &mut blocks);
                        blocks.push(line.to_string());
                    } else {
                        lines.push(line.to_string());
                    }
                }
                flush_paragraph(&mut lines, &mut blocks);
            }
        }
    }
    blocks.join("\n")
}
