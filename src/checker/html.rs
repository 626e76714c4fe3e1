// src/checker/html.rs
// =============================================================================
// This module extracts link occurrences from HTML documents.
//
// We drive html5ever's tokenizer directly (it is the parser underneath
// `scraper`) because the tokenizer hands us a line number with every token,
// and every occurrence has to say where it came from.
//
// The tokenizer never fails: broken markup is recovered the same way a
// browser would, so a malformed page still yields whatever links it has.
//
// What we collect:
//   href   on a, link, area, base
//   src    on script, img, iframe, source, video, audio, track, embed
//   srcset on img, source (one occurrence per candidate URL)
//   poster on video
//   action on form
//
// Line numbers are where the tag starts. The text of an <a> is kept on its
// occurrences for the accessibility audit.
//
// What we drop: empty values, bare "#", javascript: and data: URLs, and
// template artifacts left behind in generated HTML.
// =============================================================================

use crate::model::LinkOccurrence;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use std::collections::BTreeMap;
use std::ops::Range;

// Which attributes carry links on which elements
const LINK_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("link", &["href"]),
    ("area", &["href"]),
    ("base", &["href"]),
    ("script", &["src"]),
    ("img", &["src", "srcset"]),
    ("iframe", &["src"]),
    ("source", &["src", "srcset"]),
    ("video", &["src", "poster"]),
    ("audio", &["src"]),
    ("track", &["src"]),
    ("embed", &["src"]),
    ("form", &["action"]),
];

// Substrings that only show up in template expressions or in HTML that
// coverage tools generate from JavaScript sources
const TEMPLATE_MARKERS: &[&str] = &[
    "${",
    "{{",
    "request.url",
    "link.href",
    "document.",
    "imageUrl",
    "fileId",
    "scriptSrc",
    "imageSrc",
    "blurredDataUrl",
    "item.thumbnailUrl",
    "</span>",
    "&lt;",
    "&gt;",
    "<",
    ">",
];

// Values that are a bare variable name rather than a URL
const TEMPLATE_IDENTIFIERS: &[&str] = &["url", "src", "href", "imageUrl", "fileId"];

/// Extracts every link occurrence from an HTML document, in document order.
///
/// Parameters:
///   html: the raw document text
///   document: identifier recorded on each occurrence (usually a path)
///
/// Example:
///   html = "<a href=\"/about\">About</a>"
///   result = [LinkOccurrence { url: "/about", tag: "a", line_number: 1, .. }]
pub fn extract_links(html: &str, document: &str) -> Vec<LinkOccurrence> {
    let mut tokenizer = Tokenizer::new(LinkSink::new(document), TokenizerOpts::default());

    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(html));

    // With a sink that never asks to run scripts, feed always runs to the end
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.finish_anchor();

    tokenizer.sink.links
}

/// Splits a `srcset` value into its candidate URLs, dropping the width or
/// density descriptors.
///
///   "a.jpg 1x, b.jpg 2x" -> ["a.jpg", "b.jpg"]
pub fn parse_srcset(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

/// True for attribute values that point at something checkable.
pub fn is_checkable(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value == "#" {
        return false;
    }

    let lower = value.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("data:") {
        return false;
    }

    !is_template_artifact(value)
}

fn is_template_artifact(value: &str) -> bool {
    TEMPLATE_IDENTIFIERS.contains(&value) || TEMPLATE_MARKERS.iter().any(|marker| value.contains(marker))
}

// Receives tokens from html5ever and keeps the ones we care about
struct LinkSink<'a> {
    document: &'a str,
    links: Vec<LinkOccurrence>,
    // Open <header> / <nav> elements around the current position
    header_depth: usize,
    nav_depth: usize,
    // html5ever reports the line a token ends on. The line of the previous
    // token is where the next tag starts.
    last_line: u64,
    anchor: Option<OpenAnchor>,
}

// An <a> whose text is still being read
struct OpenAnchor {
    // Occurrences taken from the <a> tag itself
    links: Range<usize>,
    text: String,
    has_icon: bool,
}

impl<'a> LinkSink<'a> {
    fn new(document: &'a str) -> Self {
        LinkSink {
            document,
            links: Vec::new(),
            header_depth: 0,
            nav_depth: 0,
            last_line: 1,
            anchor: None,
        }
    }

    fn in_navigation(&self) -> bool {
        self.header_depth > 0 || self.nav_depth > 0
    }

    fn handle_tag(&mut self, tag: Tag, line_number: u64) -> TokenSinkResult<()> {
        let name: &str = &tag.name;

        match tag.kind {
            TagKind::StartTag => {
                match name {
                    "header" => self.header_depth += 1,
                    "nav" => self.nav_depth += 1,
                    // Anchors do not nest; a new one closes the last
                    "a" => self.finish_anchor(),
                    "img" | "svg" | "i" | "picture" => {
                        if let Some(anchor) = &mut self.anchor {
                            anchor.has_icon = true;
                        }
                    }
                    _ => {}
                }

                let first = self.links.len();
                self.collect(name, &tag, line_number);
                if name == "a" && !tag.self_closing {
                    self.anchor = Some(OpenAnchor {
                        links: first..self.links.len(),
                        text: String::new(),
                        has_icon: false,
                    });
                }

                // Element bodies the HTML parser treats as text. Switching the
                // tokenizer here keeps markup inside inline scripts from being
                // mistaken for links.
                match name {
                    "script" => TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" | "iframe" | "xmp" | "noembed" | "noframes" => TokenSinkResult::RawData(RawKind::Rawtext),
                    "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
                    _ => TokenSinkResult::Continue,
                }
            }
            TagKind::EndTag => {
                match name {
                    "header" => self.header_depth = self.header_depth.saturating_sub(1),
                    "nav" => self.nav_depth = self.nav_depth.saturating_sub(1),
                    "a" => self.finish_anchor(),
                    _ => {}
                }
                TokenSinkResult::Continue
            }
        }
    }

    fn collect(&mut self, name: &str, tag: &Tag, line_number: u64) {
        let Some((_, link_attrs)) = LINK_ATTRIBUTES.iter().find(|(element, _)| *element == name) else {
            return;
        };

        let attributes: BTreeMap<String, String> = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();

        for attr_name in link_attrs.iter() {
            let Some(value) = attributes.get(*attr_name) else {
                continue;
            };

            if *attr_name == "srcset" {
                for url in parse_srcset(value) {
                    self.push(url, name, &attributes, line_number);
                }
            } else {
                self.push(value, name, &attributes, line_number);
            }
        }
    }

    fn push(&mut self, url: &str, tag: &str, attributes: &BTreeMap<String, String>, line_number: u64) {
        if !is_checkable(url) {
            return;
        }

        let mut occurrence = LinkOccurrence::new(url.trim(), self.document, line_number, tag);
        occurrence.attributes = attributes.clone();
        occurrence.in_navigation = self.in_navigation();
        self.links.push(occurrence);
    }

    // Copies the collected text onto the anchor's own occurrences
    fn finish_anchor(&mut self) {
        let Some(anchor) = self.anchor.take() else {
            return;
        };

        let text = anchor.text.split_whitespace().collect::<Vec<_>>().join(" ");
        for link in &mut self.links[anchor.links] {
            link.text = text.clone();
            link.has_icon = anchor.has_icon;
        }
    }
}

impl TokenSink for LinkSink<'_> {
    type Handle = ();

    fn process_token(&mut self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        let start_line = self.last_line;

        let result = match token {
            Token::TagToken(tag) => self.handle_tag(tag, start_line),
            Token::CharacterTokens(text) => {
                if let Some(anchor) = &mut self.anchor {
                    anchor.text.push_str(&text);
                }
                TokenSinkResult::Continue
            }
            // Parse errors can be reported from inside a tag
            Token::ParseError(_) => return TokenSinkResult::Continue,
            _ => TokenSinkResult::Continue,
        };

        self.last_line = line_number;
        result
    }
}
