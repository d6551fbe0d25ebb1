//! Field extraction from entry detail pages
//!
//! The detail page has no structured data: every field lives in free text
//! scattered over loosely structured blocks. Extraction therefore runs
//! regular expressions over rendered text rather than deserializing a schema.

use crate::extract::text::inner_text;
use crate::extract::PageSelectors;
use crate::{ParseError, ParseResult};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

const SEPARATOR_PATTERN: &str = "\"<species> Gryff Level <int> (<int> exp)\"";
const BATTLES_PATTERN: &str = "\"<int> Wins / <int> Losses\"";
const HUNTING_PATTERN: &str = "\"<int> Hunting Exp\"";

fn title_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Gryff\s*-\s*").expect("title prefix regex is valid"))
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(.+?)\s+Gryff\s+Level\s+([0-9]+)\s+\(([0-9]+)\s+exp\)")
            .expect("separator regex is valid")
    })
}

fn battles_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([0-9]+)\s+Wins\s*/\s*([0-9]+)\s+Losses").expect("battles regex is valid")
    })
}

fn hunting_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)([0-9]+)\s+Hunting\s+Exp").expect("hunting regex is valid"))
}

/// Typed fields of one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub name: String,
    pub species: String,
    pub level: u64,
    pub experience: u64,
    pub wins: u64,
    pub losses: u64,
    pub hunting_experience: u64,
    /// Inner markup of the description container
    pub description_html: String,
}

impl ExtractedFields {
    /// `wins + losses`, or `None` if the sum does not fit in a `u64`
    pub fn total_battles(&self) -> Option<u64> {
        self.wins.checked_add(self.losses)
    }
}

/// Extracts every field from a parsed detail page
///
/// # Errors
///
/// Returns a [`ParseError`] naming the field when the title or description
/// element is missing, when the separator block does not have the
/// `"<species> Gryff Level <n> (<n> exp)"` shape, or when no text block
/// carries the battle record or hunting experience.
pub fn extract_fields(document: &Html, selectors: &PageSelectors) -> ParseResult<ExtractedFields> {
    let title = required_element(document, &selectors.title, "name", &selectors.sources.title)?;
    let name = normalize_name(&inner_text(title));

    let separator = required_element(
        document,
        &selectors.separator,
        "species/level/exp",
        &selectors.sources.separator,
    )?;
    let (species, level, experience) = parse_separator(&inner_text(separator))?;

    let battles_text = find_text_block(
        document,
        selectors.stats.as_ref(),
        &selectors.text_blocks,
        battles_re(),
        "wins/losses",
        BATTLES_PATTERN,
    )?;
    let (wins, losses) = parse_battle_record(&battles_text)?;

    let hunting_text = find_text_block(
        document,
        selectors.hunting.as_ref(),
        &selectors.text_blocks,
        hunting_re(),
        "hunting exp",
        HUNTING_PATTERN,
    )?;
    let hunting_experience = parse_hunting_exp(&hunting_text)?;

    let description = required_element(
        document,
        &selectors.description,
        "description",
        &selectors.sources.description,
    )?;

    Ok(ExtractedFields {
        name,
        species,
        level,
        experience,
        wins,
        losses,
        hunting_experience,
        description_html: description.inner_html(),
    })
}

/// Strips the `"Gryff - "` title prefix
///
/// The prefix match is case-insensitive and tolerates any whitespace around
/// the dash. Titles without the prefix pass through trimmed but otherwise
/// unchanged.
pub fn normalize_name(raw_title: &str) -> String {
    title_prefix_re()
        .replace(raw_title.trim(), "")
        .trim()
        .to_string()
}

/// Parses `"<species> Gryff Level <level> (<exp> exp)"`
pub fn parse_separator(text: &str) -> ParseResult<(String, u64, u64)> {
    let text = text.trim();
    let captures = separator_re()
        .captures(text)
        .ok_or_else(|| ParseError::Unmatched {
            field: "species/level/exp",
            pattern: SEPARATOR_PATTERN,
            text: text.to_string(),
        })?;

    let species = captures[1].trim().to_string();
    let level = parse_int("level", &captures[2])?;
    let experience = parse_int("exp", &captures[3])?;
    Ok((species, level, experience))
}

/// Parses the first `"<wins> Wins / <losses> Losses"` in `text`
///
/// Fails when the total would overflow, so `wins + losses` is always
/// representable afterwards.
pub fn parse_battle_record(text: &str) -> ParseResult<(u64, u64)> {
    let captures = battles_re()
        .captures(text)
        .ok_or_else(|| ParseError::Unmatched {
            field: "wins/losses",
            pattern: BATTLES_PATTERN,
            text: text.to_string(),
        })?;

    let wins = parse_int("wins", &captures[1])?;
    let losses = parse_int("losses", &captures[2])?;
    if wins.checked_add(losses).is_none() {
        return Err(ParseError::TotalOverflow { wins, losses });
    }
    Ok((wins, losses))
}

/// Parses the first `"<n> Hunting Exp"` in `text`
pub fn parse_hunting_exp(text: &str) -> ParseResult<u64> {
    let captures = hunting_re()
        .captures(text)
        .ok_or_else(|| ParseError::Unmatched {
            field: "hunting exp",
            pattern: HUNTING_PATTERN,
            text: text.to_string(),
        })?;
    parse_int("hunting exp", &captures[1])
}

fn parse_int(field: &'static str, value: &str) -> ParseResult<u64> {
    value.parse::<u64>().map_err(|_| ParseError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

fn required_element<'a>(
    document: &'a Html,
    selector: &Selector,
    field: &'static str,
    source: &str,
) -> ParseResult<ElementRef<'a>> {
    document
        .select(selector)
        .next()
        .ok_or_else(|| ParseError::MissingElement {
            field,
            selector: source.to_string(),
        })
}

/// Locates the text holding a field
///
/// A configured scoped selector that matches is authoritative: its first
/// element must carry the pattern. Without one, every text block is scanned
/// in document order and the first whose text matches wins.
fn find_text_block(
    document: &Html,
    scoped: Option<&Selector>,
    text_blocks: &Selector,
    pattern: &Regex,
    field: &'static str,
    pattern_desc: &'static str,
) -> ParseResult<String> {
    if let Some(scoped) = scoped {
        if let Some(container) = document.select(scoped).next() {
            let text = inner_text(container);
            if pattern.is_match(&text) {
                return Ok(text);
            }
            return Err(ParseError::Unmatched {
                field,
                pattern: pattern_desc,
                text,
            });
        }
        tracing::debug!(
            "Scoped selector for {} matched nothing, scanning text blocks",
            field
        );
    }

    let candidates: Vec<(ElementRef<'_>, String)> = document
        .select(text_blocks)
        .map(|element| (element, inner_text(element)))
        .filter(|(_, text)| pattern.is_match(text))
        .collect();

    let elements: Vec<ElementRef<'_>> = candidates.iter().map(|(element, _)| *element).collect();
    let innermost = innermost_blocks(&elements).len();
    if innermost > 1 {
        tracing::warn!(
            "{} text blocks match {} for {}; using the first in document order",
            innermost,
            pattern_desc,
            field
        );
    }

    candidates
        .into_iter()
        .next()
        .map(|(_, text)| text)
        .ok_or(ParseError::NotFound {
            field,
            pattern: pattern_desc,
        })
}

/// Candidates that contain no other candidate
///
/// An outer block repeats the text of the block it wraps, so only the
/// innermost matches count as distinct occurrences.
fn innermost_blocks<'a>(candidates: &[ElementRef<'a>]) -> Vec<ElementRef<'a>> {
    candidates
        .iter()
        .filter(|candidate| {
            !candidates.iter().any(|other| {
                other.id() != candidate.id() && other.ancestors().any(|a| a.id() == candidate.id())
            })
        })
        .copied()
        .collect()
}
