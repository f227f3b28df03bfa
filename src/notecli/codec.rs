//! # Content Codec
//!
//! Notes are stored by the service as ENML: an XHTML subset wrapped in an
//! `<en-note>` element. Users edit Markdown. [`MarkdownCodec`] converts between
//! the two:
//!
//! - `from_editable`: Markdown is rendered to XHTML with `pulldown-cmark` and
//!   wrapped in the ENML envelope.
//! - `to_editable`: the ENML body is scanned into `pulldown-cmark` events and
//!   written back out as Markdown with `pulldown-cmark-to-cmark`.
//!
//! For markup produced by `from_editable`, converting to Markdown and back
//! yields the same markup. Markup written by other clients is converted on a
//! best-effort basis: `<div>` becomes a paragraph, and tags with no Markdown
//! equivalent are dropped while their text is kept.

use crate::error::{NoteError, Result};
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};
use pulldown_cmark_to_cmark::cmark;

const ENML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!DOCTYPE en-note SYSTEM \"http://xml.evernote.com/pub/enml2.dtd\">\n";

pub trait ContentCodec {
    /// Service markup to the plain-text form shown in the editor.
    fn to_editable(&self, markup: &str) -> Result<String>;

    /// Plain text from the editor to service markup.
    fn from_editable(&self, text: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownCodec;

impl MarkdownCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ContentCodec for MarkdownCodec {
    fn to_editable(&self, markup: &str) -> Result<String> {
        let events = enml_to_events(enml_body(markup));
        let mut out = String::new();
        cmark(events.iter(), &mut out)
            .map_err(|e| NoteError::Validation(format!("could not convert note content: {}", e)))?;
        Ok(out)
    }

    fn from_editable(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH);
        let mut body = String::new();
        html::push_html(&mut body, parser);
        wrap_enml(&body)
    }
}

/// ENML for a note without content.
pub fn empty_note() -> String {
    wrap_enml("")
}

fn wrap_enml(body: &str) -> String {
    format!("{}<en-note>{}</en-note>", ENML_HEADER, body)
}

/// The part between `<en-note ...>` and `</en-note>`, or the whole input if
/// there is no envelope.
fn enml_body(markup: &str) -> &str {
    let Some(open) = markup.find("<en-note") else {
        return markup;
    };
    let Some(gt) = markup[open..].find('>') else {
        return markup;
    };
    let start = open + gt + 1;
    if markup[open..start].ends_with("/>") {
        return "";
    }
    match markup[start..].rfind("</en-note>") {
        Some(end) => &markup[start..start + end],
        None => &markup[start..],
    }
}

#[derive(Debug)]
enum Token<'a> {
    Open {
        name: String,
        attrs: &'a str,
        self_closing: bool,
    },
    Close(String),
    Text(&'a str),
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }
        if rest.starts_with('<') {
            let Some(end) = rest.find('>') else {
                tokens.push(Token::Text(rest));
                break;
            };
            let inner = &rest[1..end];
            rest = &rest[end + 1..];

            if inner.starts_with('?') || inner.starts_with('!') {
                continue;
            }
            if let Some(name) = inner.strip_prefix('/') {
                tokens.push(Token::Close(name.trim().to_ascii_lowercase()));
                continue;
            }
            let self_closing = inner.ends_with('/');
            let inner = inner.trim_end_matches('/');
            let (name, attrs) = match inner.find(char::is_whitespace) {
                Some(pos) => (&inner[..pos], &inner[pos..]),
                None => (inner, ""),
            };
            tokens.push(Token::Open {
                name: name.to_ascii_lowercase(),
                attrs,
                self_closing,
            });
            continue;
        }
        let end = rest.find('<').unwrap_or(rest.len());
        tokens.push(Token::Text(&rest[..end]));
        rest = &rest[end..];
    }

    tokens
}

fn attr(attrs: &str, key: &str) -> Option<String> {
    let mut rest = attrs;
    while let Some(pos) = rest.find(key) {
        let before_ok = pos == 0 || rest[..pos].ends_with(char::is_whitespace);
        let after = rest[pos + key.len()..].trim_start();
        if before_ok {
            if let Some(value) = after.strip_prefix('=') {
                let value = value.trim_start();
                let quote = value.chars().next()?;
                if quote == '"' || quote == '\'' {
                    let body = &value[1..];
                    let end = body.find(quote)?;
                    return Some(unescape(&body[..end]));
                }
            }
        }
        rest = &rest[pos + key.len()..];
    }
    None
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// The character for an entity name such as `amp`, `#233` or `#xE9`.
fn entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn heading_level(name: &str) -> Option<HeadingLevel> {
    match name {
        "h1" => Some(HeadingLevel::H1),
        "h2" => Some(HeadingLevel::H2),
        "h3" => Some(HeadingLevel::H3),
        "h4" => Some(HeadingLevel::H4),
        "h5" => Some(HeadingLevel::H5),
        "h6" => Some(HeadingLevel::H6),
        _ => None,
    }
}

fn is_inline(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link
    )
}

/// Closes the innermost open tag accepted by `wanted` and everything opened
/// inside it. With `inline_only`, the search stops at the first block tag.
/// Returns false, emitting nothing, when no open tag matches.
fn close_through(
    events: &mut Vec<Event<'static>>,
    open: &mut Vec<TagEnd>,
    wanted: impl Fn(&TagEnd) -> bool,
    inline_only: bool,
) -> bool {
    let mut found = None;
    for (pos, tag) in open.iter().enumerate().rev() {
        if wanted(tag) {
            found = Some(pos);
            break;
        }
        if inline_only && !is_inline(tag) {
            break;
        }
    }
    let Some(pos) = found else {
        return false;
    };
    while open.len() > pos {
        if let Some(tag) = open.pop() {
            events.push(Event::End(tag));
        }
    }
    true
}

/// Closes the inline tags opened since the innermost block tag.
fn close_inline(events: &mut Vec<Event<'static>>, open: &mut Vec<TagEnd>) {
    while open.last().is_some_and(is_inline) {
        if let Some(tag) = open.pop() {
            events.push(Event::End(tag));
        }
    }
}

fn close_paragraph(
    events: &mut Vec<Event<'static>>,
    open: &mut Vec<TagEnd>,
    paragraph: &mut Option<usize>,
) {
    if let Some(start) = paragraph.take() {
        close_inline(events, open);
        if events.len() == start + 1 {
            events.pop();
        } else {
            events.push(Event::End(TagEnd::Paragraph));
        }
    }
}

/// Turns an ENML body into the event stream `pulldown-cmark` would have
/// produced for the equivalent Markdown.
///
/// Every `End` event has a matching `Start`: closing tags that close nothing
/// are dropped, and tags left open are closed at the end of their block.
fn enml_to_events(body: &str) -> Vec<Event<'static>> {
    let mut events: Vec<Event<'static>> = Vec::new();
    // Index of the Start(Paragraph) event of the open paragraph, if any.
    let mut paragraph: Option<usize> = None;
    // Open lists, items, headings and inline tags, innermost last.
    let mut open: Vec<TagEnd> = Vec::new();
    let mut pre_pending = false;
    let mut in_code_block = false;
    let mut inline_code: Option<String> = None;

    // Items and headings take text directly, without a paragraph.
    let containers = |open: &[TagEnd]| {
        open.iter()
            .filter(|t| matches!(t, TagEnd::Item | TagEnd::Heading(_)))
            .count()
    };
    let in_list = |open: &[TagEnd]| open.iter().any(|t| matches!(t, TagEnd::List(_)));

    for token in tokenize(body) {
        match token {
            Token::Text(raw) => {
                let text = unescape(raw);
                if let Some(code) = inline_code.as_mut() {
                    code.push_str(&text);
                    continue;
                }
                if pre_pending && !in_code_block {
                    close_inline(&mut events, &mut open);
                    events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(
                        CowStr::from(""),
                    ))));
                    in_code_block = true;
                }
                if in_code_block {
                    events.push(Event::Text(text.into()));
                    continue;
                }
                let inside = containers(&open);
                // Formatting whitespace between blocks.
                if text.trim().is_empty()
                    && paragraph.is_none()
                    && (inside == 0 || raw.contains('\n'))
                {
                    continue;
                }
                if paragraph.is_none() && inside == 0 {
                    if in_list(&open) {
                        continue;
                    }
                    paragraph = Some(events.len());
                    events.push(Event::Start(Tag::Paragraph));
                }
                events.push(Event::Text(text.into()));
            }
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                let inline = match name.as_str() {
                    "em" | "i" => Some((Tag::Emphasis, TagEnd::Emphasis)),
                    "strong" | "b" => Some((Tag::Strong, TagEnd::Strong)),
                    "del" | "s" | "strike" => Some((Tag::Strikethrough, TagEnd::Strikethrough)),
                    "a" => Some((
                        Tag::Link {
                            link_type: LinkType::Inline,
                            dest_url: attr(attrs, "href").unwrap_or_default().into(),
                            title: attr(attrs, "title").unwrap_or_default().into(),
                            id: CowStr::from(""),
                        },
                        TagEnd::Link,
                    )),
                    _ => None,
                };
                if let Some((tag, end)) = inline {
                    if self_closing || in_code_block || inline_code.is_some() {
                        continue;
                    }
                    if paragraph.is_none() && containers(&open) == 0 {
                        if in_list(&open) {
                            continue;
                        }
                        paragraph = Some(events.len());
                        events.push(Event::Start(Tag::Paragraph));
                    }
                    events.push(Event::Start(tag));
                    open.push(end);
                    continue;
                }

                match name.as_str() {
                    "p" | "div" => {
                        if containers(&open) == 0 {
                            close_paragraph(&mut events, &mut open, &mut paragraph);
                            if !self_closing {
                                paragraph = Some(events.len());
                                events.push(Event::Start(Tag::Paragraph));
                            }
                        }
                    }
                    "br" => {
                        let empty_paragraph =
                            paragraph.is_some_and(|start| events.len() == start + 1);
                        if in_code_block {
                            events.push(Event::Text("\n".into()));
                        } else if !empty_paragraph
                            && (paragraph.is_some() || containers(&open) > 0)
                        {
                            events.push(Event::HardBreak);
                        }
                    }
                    "hr" => {
                        close_paragraph(&mut events, &mut open, &mut paragraph);
                        close_inline(&mut events, &mut open);
                        events.push(Event::Rule);
                    }
                    "ul" | "ol" if !self_closing => {
                        close_paragraph(&mut events, &mut open, &mut paragraph);
                        close_inline(&mut events, &mut open);
                        let is_ordered = name == "ol";
                        let start = if is_ordered {
                            Some(attr(attrs, "start").and_then(|s| s.parse().ok()).unwrap_or(1))
                        } else {
                            None
                        };
                        events.push(Event::Start(Tag::List(start)));
                        open.push(TagEnd::List(is_ordered));
                    }
                    "li" if !self_closing => {
                        // A new item ends the previous one.
                        if open.iter().rev().find(|t| !is_inline(t)) == Some(&TagEnd::Item) {
                            close_through(&mut events, &mut open, |t| *t == TagEnd::Item, false);
                        }
                        if open.last().is_some_and(|t| matches!(t, TagEnd::List(_))) {
                            events.push(Event::Start(Tag::Item));
                            open.push(TagEnd::Item);
                        }
                    }
                    "pre" => {
                        close_paragraph(&mut events, &mut open, &mut paragraph);
                        close_inline(&mut events, &mut open);
                        pre_pending = true;
                    }
                    "code" => {
                        if pre_pending && !in_code_block {
                            let lang = attr(attrs, "class")
                                .and_then(|c| c.strip_prefix("language-").map(str::to_string))
                                .unwrap_or_default();
                            events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(
                                lang.into(),
                            ))));
                            in_code_block = true;
                        } else if !in_code_block && !self_closing {
                            inline_code = Some(String::new());
                        }
                    }
                    other => {
                        if let Some(level) = heading_level(other).filter(|_| !self_closing) {
                            close_paragraph(&mut events, &mut open, &mut paragraph);
                            close_inline(&mut events, &mut open);
                            events.push(Event::Start(Tag::Heading {
                                level,
                                id: None,
                                classes: Vec::new(),
                                attrs: Vec::new(),
                            }));
                            open.push(TagEnd::Heading(level));
                        }
                    }
                }
            }
            Token::Close(name) => match name.as_str() {
                "p" | "div" => {
                    if containers(&open) == 0 {
                        close_paragraph(&mut events, &mut open, &mut paragraph);
                    }
                }
                "em" | "i" => {
                    close_through(&mut events, &mut open, |t| *t == TagEnd::Emphasis, true);
                }
                "strong" | "b" => {
                    close_through(&mut events, &mut open, |t| *t == TagEnd::Strong, true);
                }
                "del" | "s" | "strike" => {
                    close_through(&mut events, &mut open, |t| *t == TagEnd::Strikethrough, true);
                }
                "a" => {
                    close_through(&mut events, &mut open, |t| *t == TagEnd::Link, true);
                }
                "ul" | "ol" => {
                    close_paragraph(&mut events, &mut open, &mut paragraph);
                    close_through(
                        &mut events,
                        &mut open,
                        |t| matches!(t, TagEnd::List(_)),
                        false,
                    );
                }
                "li" => {
                    close_through(&mut events, &mut open, |t| *t == TagEnd::Item, false);
                }
                "code" => {
                    if let Some(code) = inline_code.take() {
                        events.push(Event::Code(code.into()));
                    }
                }
                "pre" => {
                    if in_code_block {
                        events.push(Event::End(TagEnd::CodeBlock));
                    }
                    in_code_block = false;
                    pre_pending = false;
                }
                other => {
                    if heading_level(other).is_some() {
                        // Any heading end closes the open heading, whatever its level.
                        close_through(
                            &mut events,
                            &mut open,
                            |t| matches!(t, TagEnd::Heading(_)),
                            false,
                        );
                    }
                }
            },
        }
    }

    if let Some(code) = inline_code.take() {
        events.push(Event::Code(code.into()));
    }
    if in_code_block {
        events.push(Event::End(TagEnd::CodeBlock));
    }
    close_paragraph(&mut events, &mut open, &mut paragraph);
    while let Some(tag) = open.pop() {
        events.push(Event::End(tag));
    }
    events
}
