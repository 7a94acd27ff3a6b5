//! Product detail page parser
//!
//! This module extracts the fields only available on a book's own page:
//! - UPC from the product information table (required)
//! - Category from the breadcrumb trail
//! - Description from the paragraph following the description heading
//! - The fuller availability text used to cross-check the listing

use crate::ParseError;
use scraper::{ElementRef, Html, Selector};

/// Fields read off one product detail page
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetailEntry {
    /// Product code from the information table
    pub upc: String,

    /// Breadcrumb category, "Unknown" when the trail was malformed
    pub category: String,

    /// Availability text from the detail page, possibly empty
    pub availability: String,

    /// Description paragraph, absent when the page has none
    pub description: Option<String>,
}

/// Parses a product detail page
///
/// # Arguments
///
/// * `html` - The detail page HTML
///
/// # Returns
///
/// * `Ok(RawDetailEntry)` - The UPC was found; other fields degrade softly
/// * `Err(ParseError)` - No UPC row in the product information table
pub fn parse_detail(html: &str) -> Result<RawDetailEntry, ParseError> {
    let document = Html::parse_document(html);

    let upc = extract_upc(&document).ok_or(ParseError::MissingElement("UPC table row"))?;
    let category = extract_category(&document);
    let description = extract_description(&document);
    let availability = Selector::parse("p.availability")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(element_text)
        .unwrap_or_default();

    Ok(RawDetailEntry {
        upc,
        category,
        availability,
        description,
    })
}

/// Finds the information-table row whose header cell is exactly "UPC"
fn extract_upc(document: &Html) -> Option<String> {
    let row_selector = Selector::parse("table.table-striped tr").ok()?;
    let th_selector = Selector::parse("th").ok()?;
    let td_selector = Selector::parse("td").ok()?;

    for row in document.select(&row_selector) {
        let header = row.select(&th_selector).next().map(element_text);
        if header.as_deref() == Some("UPC") {
            return row
                .select(&td_selector)
                .next()
                .map(element_text)
                .filter(|upc| !upc.is_empty());
        }
    }

    None
}

/// Reads the category from the breadcrumb trail
///
/// The trail runs Home > Books > Category > Title, so the category is the
/// second-to-last crumb. A shorter trail degrades to "Unknown" rather than
/// failing the whole item.
fn extract_category(document: &Html) -> String {
    let crumbs: Vec<ElementRef> = match Selector::parse("ul.breadcrumb li") {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    };

    if crumbs.len() >= 4 {
        element_text(crumbs[crumbs.len() - 2])
    } else {
        "Unknown".to_string()
    }
}

/// Walks from the description heading to the first following paragraph
///
/// The description is not inside `div#product_description`; it is the next
/// `<p>` sibling after it. Intervening text nodes are skipped.
fn extract_description(document: &Html) -> Option<String> {
    let anchor_selector = Selector::parse("div#product_description").ok()?;
    let anchor = document.select(&anchor_selector).next()?;

    anchor
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "p")
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
