//! Record extraction from a results table
//!
//! The results page lists one book per `<tr>` of the products table body.
//! Columns are read by position:
//!
//! | Column | Field |
//! |--------|-------|
//! | 0 | title (cell text) and link (`<a href>`, resolved against the origin) |
//! | 1 | author |
//! | 2 | publisher (whitespace runs collapsed) |
//! | 3 | price block: `span.price-val` text; when `span.price-old` is present, the `title` attribute of `span.price-val` (discount) and the `span.price-gray` text (old price) |
//! | last | availability |
//!
//! Every layout assumption lives in this module; a site redesign only needs
//! changes here.

use crate::crawler::markup::{collapse_whitespace, first, selector, text_of};
use crate::output::{BookRecord, Discount};
use crate::{ParseError, ParseResult};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const TABLE_BODY: &str = "tbody.products-table__body";
const ROW: &str = "tr";
const CELL: &str = "td";
const LINK: &str = "a[href]";
const PRICE: &str = "span.price-val";
const OLD_PRICE_MARKER: &str = "span.price-old";
const OLD_PRICE: &str = "span.price-gray";

const TITLE_COLUMN: usize = 0;
const AUTHOR_COLUMN: usize = 1;
const PUBLISHER_COLUMN: usize = 2;
const PRICE_COLUMN: usize = 3;

/// Title, author, publisher, price and availability need five cells
const MIN_COLUMNS: usize = 5;

/// Compiled selectors for one extraction pass
struct RowSelectors {
    table_body: Selector,
    row: Selector,
    cell: Selector,
    link: Selector,
    price: Selector,
    old_price_marker: Selector,
    old_price: Selector,
}

impl RowSelectors {
    fn compile() -> ParseResult<Self> {
        Ok(Self {
            table_body: selector(TABLE_BODY)?,
            row: selector(ROW)?,
            cell: selector(CELL)?,
            link: selector(LINK)?,
            price: selector(PRICE)?,
            old_price_marker: selector(OLD_PRICE_MARKER)?,
            old_price: selector(OLD_PRICE)?,
        })
    }
}

/// Parsed results page ready for row extraction
///
/// Extraction is a pure function of the markup: calling [`records`] twice
/// yields the same sequence.
///
/// [`records`]: RecordExtractor::records
pub struct RecordExtractor {
    document: Html,
    origin: Url,
    selectors: RowSelectors,
}

impl RecordExtractor {
    /// Parses `markup`; links will be resolved against `origin`
    pub fn new(markup: &str, origin: &Url) -> ParseResult<Self> {
        Ok(Self {
            document: Html::parse_document(markup),
            origin: origin.clone(),
            selectors: RowSelectors::compile()?,
        })
    }

    /// Returns a lazy sequence of records, one per table row, in row order
    ///
    /// Fails up front if the table body is absent; each item fails on its
    /// own if the row lacks an expected element.
    pub fn records(&self) -> ParseResult<impl Iterator<Item = ParseResult<BookRecord>> + '_> {
        let body = first(
            self.document.root_element(),
            &self.selectors.table_body,
            TABLE_BODY,
        )?;

        Ok(body
            .select(&self.selectors.row)
            .enumerate()
            .map(move |(index, row)| self.extract_row(index, row)))
    }

    fn extract_row(&self, index: usize, row: ElementRef<'_>) -> ParseResult<BookRecord> {
        let s = &self.selectors;
        let cells: Vec<ElementRef<'_>> = row.select(&s.cell).collect();
        if cells.len() < MIN_COLUMNS {
            return Err(ParseError::ShortRow {
                row: index,
                found: cells.len(),
                expected: MIN_COLUMNS,
            });
        }

        let title_cell = cells[TITLE_COLUMN];
        let href = first(title_cell, &s.link, LINK)?
            .value()
            .attr("href")
            .ok_or(ParseError::MissingAttribute {
                element: LINK,
                attribute: "href",
            })?;
        let link = self
            .origin
            .join(href.trim())
            .map_err(|_| ParseError::InvalidLink {
                href: href.to_string(),
            })?;

        let price_cell = cells[PRICE_COLUMN];
        let price = first(price_cell, &s.price, PRICE)?;
        let discount = match price_cell.select(&s.old_price_marker).next() {
            Some(_) => Some(extract_discount(price, price_cell, &s.old_price)?),
            None => None,
        };

        let record = BookRecord {
            title: text_of(title_cell),
            link: link.to_string(),
            author: text_of(cells[AUTHOR_COLUMN]),
            publisher: collapse_whitespace(&text_of(cells[PUBLISHER_COLUMN])),
            price: text_of(price),
            discount,
            availability: text_of(cells[cells.len() - 1]),
        };
        tracing::trace!("Row {}: {}", index, record.title);
        Ok(record)
    }
}

/// Reads the discount amount and old price of a discounted row
fn extract_discount(
    price: ElementRef<'_>,
    price_cell: ElementRef<'_>,
    old_price: &Selector,
) -> ParseResult<Discount> {
    let discount_amount = price
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|amount| !amount.is_empty())
        .ok_or(ParseError::MissingAttribute {
            element: PRICE,
            attribute: "title",
        })?;

    let old_price = text_of(first(price_cell, old_price, OLD_PRICE)?);
    if old_price.is_empty() {
        return Err(ParseError::MissingElement(OLD_PRICE));
    }

    Ok(Discount {
        discount_amount: discount_amount.to_string(),
        old_price,
    })
}

/// Extracts every record of one page, in row order
///
/// # Arguments
///
/// * `markup` - Raw page markup
/// * `origin` - Site origin used to make book links absolute
///
/// # Returns
///
/// * `Ok(Vec<BookRecord>)` - One record per table row
/// * `Err(ParseError)` - The table body or an expected row element is missing
pub fn extract_records(markup: &str, origin: &Url) -> ParseResult<Vec<BookRecord>> {
    let extractor = RecordExtractor::new(markup, origin)?;
    let records = extractor.records()?.collect::<ParseResult<Vec<_>>>();
    records
}
