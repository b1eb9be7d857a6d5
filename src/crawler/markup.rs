//! Small helpers shared by the markup readers

use crate::{ParseError, ParseResult};
use scraper::{ElementRef, Selector};

/// Compiles a CSS selector, naming it in the error
pub(crate) fn selector(css: &'static str) -> ParseResult<Selector> {
    Selector::parse(css).map_err(|_| ParseError::InvalidSelector(css))
}

/// Returns the first match of `selector` under `element`
pub(crate) fn first<'a>(
    element: ElementRef<'a>,
    selector: &Selector,
    name: &'static str,
) -> ParseResult<ElementRef<'a>> {
    element
        .select(selector)
        .next()
        .ok_or(ParseError::MissingElement(name))
}

/// All descendant text of `element`, trimmed
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Collapses every whitespace run to one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a displayed counter, ignoring embedded (thousands) whitespace
pub(crate) fn parse_count<T: std::str::FromStr>(
    text: &str,
    element: &'static str,
) -> ParseResult<T> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().map_err(|_| ParseError::InvalidNumber {
        element,
        text: text.to_string(),
    })
}
