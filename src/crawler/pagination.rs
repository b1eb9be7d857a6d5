//! Pagination discovery
//!
//! Reads the first results page to learn how many pages the search spans
//! and how many results the site claims to have.
//!
//! The page count is the last numeral shown in the pagination control. The
//! site may collapse long ranges ("1 2 3 ... 7"); the last numeral is still
//! trusted as the total. A control that truncates its final page would make
//! this undercount, and nothing here tries to correct for that.

use crate::crawler::markup::{first, parse_count, selector, text_of};
use crate::{ParseError, ParseResult};
use scraper::Html;

const PAGER: &str = "div.pagination-numbers__right";
const PAGER_NUMBER: &str = "div.pagination-number";
const COUNTER_BLOCK: &str = "div.b-stab-e-wrapper-container";
const COUNTER: &str = "span.b-stab-e-slider-item-e-txt-m-small.js-search-tab-count";

/// What the first page says about the whole search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Highest page numeral in the pagination control
    pub total_pages: u32,

    /// Result count shown by the results counter
    pub total_results: u64,
}

/// Extracts page and result counts from the first page's markup
///
/// # Returns
///
/// * `Ok(Pagination)` - Both counts were found
/// * `Err(ParseError)` - The pagination control or the results counter is
///   missing, or does not hold a number
pub fn discover_pagination(markup: &str) -> ParseResult<Pagination> {
    let document = Html::parse_document(markup);
    let root = document.root_element();

    let pager = first(root, &selector(PAGER)?, PAGER)?;
    let last_number = pager
        .select(&selector(PAGER_NUMBER)?)
        .last()
        .ok_or(ParseError::MissingElement(PAGER_NUMBER))?;
    let pages_text = text_of(last_number);
    let total_pages: u32 = parse_count(&pages_text, PAGER_NUMBER)?;
    if total_pages == 0 {
        return Err(ParseError::InvalidNumber {
            element: PAGER_NUMBER,
            text: pages_text,
        });
    }

    let counter_block = first(root, &selector(COUNTER_BLOCK)?, COUNTER_BLOCK)?;
    let counter = first(counter_block, &selector(COUNTER)?, COUNTER)?;
    let total_results = parse_count(&text_of(counter), COUNTER)?;

    Ok(Pagination {
        total_pages,
        total_results,
    })
}
