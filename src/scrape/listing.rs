//! Listing page parser
//!
//! This module extracts book cards and the next-page link from a catalogue
//! listing page:
//! - One `article.product_pod` card per book
//! - Title, price text, star rating, availability, and detail href per card
//! - Card failures stay per-card, so one malformed card never costs the page

use crate::ParseError;
use scraper::{ElementRef, Html, Selector};

/// Fields read off one listing card, before any validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawListingEntry {
    /// Full title, preferring the anchor's `title` attribute
    pub title: String,

    /// Price text exactly as displayed (currency symbol included)
    pub price_text: String,

    /// Star rating from the CSS class token, if one was present
    pub rating: Option<u8>,

    /// Availability text from the card, possibly empty
    pub availability: String,

    /// Detail page href exactly as found (usually relative)
    pub detail_href: String,
}

/// Everything extracted from one listing page
#[derive(Debug)]
pub struct ParsedListing {
    /// One entry per card, in page order; malformed cards stay as errors
    pub items: Vec<Result<RawListingEntry, ParseError>>,

    /// Href of the next listing page, absent on the last page
    pub next_page: Option<String>,
}

/// Parses a listing page into per-card results and the next-page link
///
/// # Arguments
///
/// * `html` - The listing page HTML
///
/// # Returns
///
/// * `Ok(ParsedListing)` - At least one card was found; individual cards may
///   still carry errors
/// * `Err(ParseError)` - The page has no product cards at all
pub fn parse_listing(html: &str) -> Result<ParsedListing, ParseError> {
    let document = Html::parse_document(html);

    let mut items = Vec::new();
    if let Ok(card_selector) = Selector::parse("article.product_pod") {
        for card in document.select(&card_selector) {
            items.push(parse_card(&card));
        }
    }

    if items.is_empty() {
        return Err(ParseError::NoProductCards);
    }

    let next_page = Selector::parse("li.next a")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .and_then(|anchor| anchor.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    Ok(ParsedListing { items, next_page })
}

/// Extracts one card's fields
fn parse_card(card: &ElementRef) -> Result<RawListingEntry, ParseError> {
    let anchor = select_first(card, "h3 a").ok_or(ParseError::MissingElement("h3 a"))?;

    // The title attribute carries the full title; the anchor text is the
    // site's truncated display form.
    let title = match anchor.value().attr("title") {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => anchor.text().collect::<String>().trim().to_string(),
    };
    if title.is_empty() {
        return Err(ParseError::MissingAttribute {
            element: "h3 a",
            attribute: "title",
        });
    }

    let detail_href = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(ParseError::MissingAttribute {
            element: "h3 a",
            attribute: "href",
        })?
        .to_string();

    let price_text = select_first(card, "p.price_color")
        .map(element_text)
        .ok_or(ParseError::MissingElement("p.price_color"))?;
    if !price_text.chars().any(|c| c.is_ascii_digit()) {
        return Err(ParseError::BadField {
            field: "price",
            value: price_text,
        });
    }

    let rating = extract_rating(card)?;

    let availability = select_first(card, "p.availability")
        .map(element_text)
        .unwrap_or_default();

    Ok(RawListingEntry {
        title,
        price_text,
        rating,
        availability,
        detail_href,
    })
}

/// Reads the star rating from the card's `star-rating` class token
///
/// A missing element or a bare `star-rating` class is tolerated as None;
/// an unrecognized token is a card error.
fn extract_rating(card: &ElementRef) -> Result<Option<u8>, ParseError> {
    let element = match select_first(card, "p.star-rating") {
        Some(element) => element,
        None => return Ok(None),
    };

    let token = element
        .value()
        .classes()
        .find(|class| *class != "star-rating");

    match token {
        None => Ok(None),
        Some(token) => match rating_from_token(token) {
            Some(rating) => Ok(Some(rating)),
            None => Err(ParseError::BadField {
                field: "rating",
                value: token.to_string(),
            }),
        },
    }
}

/// The site's five rating tokens, and nothing else
fn rating_from_token(token: &str) -> Option<u8> {
    match token {
        "One" => Some(1),
        "Two" => Some(2),
        "Three" => Some(3),
        "Four" => Some(4),
        "Five" => Some(5),
        _ => None,
    }
}

fn select_first<'a>(scope: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
