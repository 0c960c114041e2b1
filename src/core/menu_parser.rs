//! Menu-text parser.
//!
//! Turns a pasted block of text into a menu tree:
//!
//! ```text
//! MENU: Wedding buffet
//! CATEGORY: Starters
//! - Bruschetta :: tomato and basil
//! - Olives
//! CATEGORY: Mains
//! - Roast beef :: with gravy
//! ```
//!
//! Input pasted as a single line is split before every upper-case header and
//! every ` - ` first; multi-line input is taken line by line as is. Items
//! outside a category are ignored, categories without items are dropped.

use crate::errors::{Error, Result};
use serde::Serialize;
use std::borrow::Cow;

const MENU_HEADERS: [&str; 4] = ["MENU:", "MENÚ:", "CARDÁPIO:", "CARDAPIO:"];
const CATEGORY_HEADERS: [&str; 2] = ["CATEGORY:", "CATEGORIA:"];
const DESCRIPTION_SEPARATOR: &str = "::";

/// A parsed item line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedItem {
    /// Dish name
    pub name: String,
    /// Text after `::`, if any
    pub description: Option<String>,
}

/// A parsed category block with at least one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCategory {
    /// Category name
    pub name: String,
    /// Items in input order
    pub items: Vec<ParsedItem>,
}

/// A complete parsed menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedMenu {
    /// Name from the menu header
    pub name: String,
    /// Categories in input order
    pub categories: Vec<ParsedCategory>,
}

impl ParsedMenu {
    /// Total number of items across categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// Short description of a parsed menu for confirmation screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuPreview {
    /// Menu name
    pub name: String,
    /// Number of categories kept
    pub category_count: usize,
    /// Number of items kept
    pub item_count: usize,
}

/// Outcome of [`try_parse_menu`].
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    /// Whether parsing succeeded
    pub success: bool,
    /// Error message on failure
    pub error: Option<String>,
    /// Summary on success
    pub preview: Option<MenuPreview>,
    /// Full tree on success
    pub menu: Option<ParsedMenu>,
}

/// Byte length of the prefix of `text` matching `keyword`, ignoring case.
fn match_keyword(text: &str, keyword: &str) -> Option<usize> {
    let mut len = 0;
    let mut chars = text.chars();
    for expected in keyword.chars() {
        let actual = chars.next()?;
        if !actual.to_uppercase().eq(expected.to_uppercase()) {
            return None;
        }
        len += actual.len_utf8();
    }
    Some(len)
}

fn strip_any<'a>(line: &'a str, keywords: &[&str]) -> Option<&'a str> {
    keywords
        .iter()
        .find_map(|kw| match_keyword(line, kw))
        .map(|len| line[len..].trim())
}

fn starts_marker(rest: &str, prev: Option<char>) -> bool {
    let at_word_start = prev.is_none_or(|c| !c.is_alphanumeric());
    if at_word_start
        && MENU_HEADERS
            .iter()
            .chain(CATEGORY_HEADERS.iter())
            .any(|kw| rest.starts_with(kw))
    {
        return true;
    }

    let mut chars = rest.chars();
    chars.next() == Some('-')
        && prev.is_some_and(char::is_whitespace)
        && chars.next().is_none_or(char::is_whitespace)
}

/// Splits single-line input before every upper-case header and spaced `-`.
///
/// Text that already has line breaks is left alone.
fn normalize(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        if starts_marker(&text[i..], prev) && !out.trim().is_empty() {
            out.push('\n');
        }
        out.push(c);
        prev = Some(c);
    }

    Cow::Owned(out)
}

fn parse_item(body: &str) -> Option<ParsedItem> {
    let (name, description) = match body.split_once(DESCRIPTION_SEPARATOR) {
        Some((name, desc)) => (name.trim(), Some(desc.trim()).filter(|d| !d.is_empty())),
        None => (body.trim(), None),
    };
    if name.is_empty() {
        return None;
    }
    Some(ParsedItem {
        name: name.to_string(),
        description: description.map(str::to_string),
    })
}

/// Parses menu text into a [`ParsedMenu`].
///
/// # Errors
/// [`Error::MenuParse`] when the menu header is missing, when no category
/// survives, or when there are no items at all.
pub fn parse_menu(text: &str) -> Result<ParsedMenu> {
    let normalized = normalize(text);

    let mut name: Option<String> = None;
    let mut categories: Vec<ParsedCategory> = Vec::new();
    let mut current: Option<ParsedCategory> = None;

    let mut flush = |current: &mut Option<ParsedCategory>| {
        if let Some(category) = current.take().filter(|c| !c.items.is_empty()) {
            categories.push(category);
        }
    };

    for line in normalized.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(header) = strip_any(line, &MENU_HEADERS) {
            if name.is_none() && !header.is_empty() {
                name = Some(header.to_string());
            }
        } else if let Some(category_name) = strip_any(line, &CATEGORY_HEADERS) {
            flush(&mut current);
            current = (!category_name.is_empty()).then(|| ParsedCategory {
                name: category_name.to_string(),
                items: Vec::new(),
            });
        } else if let Some(body) = line.strip_prefix('-') {
            if let (Some(category), Some(item)) = (current.as_mut(), parse_item(body)) {
                category.items.push(item);
            }
        }
    }
    flush(&mut current);

    let name = name.ok_or_else(|| Error::MenuParse {
        message: "Menu name not found; start the text with \"MENU: <name>\"".to_string(),
    })?;
    let menu = ParsedMenu { name, categories };

    if menu.categories.is_empty() {
        return Err(Error::MenuParse {
            message: "No category with items found; use \"CATEGORY: <name>\"".to_string(),
        });
    }
    if menu.item_count() == 0 {
        return Err(Error::MenuParse {
            message: "No items found; list items as \"- <name> :: <description>\"".to_string(),
        });
    }

    Ok(menu)
}

/// Non-failing variant of [`parse_menu`] for previews.
#[must_use]
pub fn try_parse_menu(text: &str) -> ParseReport {
    match parse_menu(text) {
        Ok(menu) => ParseReport {
            success: true,
            error: None,
            preview: Some(MenuPreview {
                name: menu.name.clone(),
                category_count: menu.categories.len(),
                item_count: menu.item_count(),
            }),
            menu: Some(menu),
        },
        Err(err) => ParseReport {
            success: false,
            error: Some(err.to_string()),
            preview: None,
            menu: None,
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_minimal_menu() {
        let menu = parse_menu("MENU: X\nCATEGORY: Y\n- Item :: Desc").unwrap();
        assert_eq!(
            menu,
            ParsedMenu {
                name: "X".to_string(),
                categories: vec![ParsedCategory {
                    name: "Y".to_string(),
                    items: vec![ParsedItem {
                        name: "Item".to_string(),
                        description: Some("Desc".to_string()),
                    }],
                }],
            }
        );
    }

    #[test]
    fn test_empty_category_dropped() {
        let menu = parse_menu("MENU: X\nCATEGORY: Empty\nCATEGORY: Full\n- Soup").unwrap();
        assert_eq!(menu.categories.len(), 1);
        assert_eq!(menu.categories[0].name, "Full");
        assert_eq!(menu.categories[0].items[0].description, None);
    }

    #[test]
    fn test_only_empty_category_fails() {
        let err = parse_menu("MENU: X\nCATEGORY: Empty").unwrap_err();
        assert!(matches!(err, Error::MenuParse { .. }));
    }

    #[test]
    fn test_missing_menu_header_fails() {
        let err = parse_menu("CATEGORY: Y\n- Item :: Desc").unwrap_err();
        assert!(err.to_string().contains("Menu name"));
    }

    #[test]
    fn test_items_before_category_ignored() {
        let menu = parse_menu("MENU: X\n- Stray\nCATEGORY: Y\n- Kept").unwrap();
        assert_eq!(menu.item_count(), 1);
        assert_eq!(menu.categories[0].items[0].name, "Kept");
    }

    #[test]
    fn test_single_line_input() {
        let menu =
            parse_menu("MENU: Gala CATEGORY: Starters - Olives - Bread :: warm CATEGORY: Mains - Fish")
                .unwrap();
        assert_eq!(menu.name, "Gala");
        assert_eq!(menu.categories.len(), 2);
        assert_eq!(menu.categories[0].items.len(), 2);
        assert_eq!(menu.categories[0].items[1].description.as_deref(), Some("warm"));
        assert_eq!(menu.categories[1].items[0].name, "Fish");
    }

    #[test]
    fn test_hyphenated_names_survive() {
        let menu = parse_menu("MENU: X\nCATEGORY: Y\n- Pão-de-queijo :: mini").unwrap();
        assert_eq!(menu.categories[0].items[0].name, "Pão-de-queijo");
    }

    #[test]
    fn test_alternate_headers_case_insensitive() {
        let menu = parse_menu("Cardápio: Festa\ncategoria: Doces\n- Brigadeiro").unwrap();
        assert_eq!(menu.name, "Festa");
        assert_eq!(menu.categories[0].name, "Doces");
    }

    #[test]
    fn test_try_parse_reports_preview() {
        let report = try_parse_menu("MENU: X\nCATEGORY: Y\n- A\n- B");
        assert!(report.success);
        assert_eq!(
            report.preview,
            Some(MenuPreview {
                name: "X".to_string(),
                category_count: 1,
                item_count: 2,
            })
        );

        let failed = try_parse_menu("nothing here");
        assert!(!failed.success);
        assert!(failed.error.is_some());
        assert!(failed.menu.is_none());
    }

    #[test]
    fn test_colon_inside_item_name_is_kept() {
        let menu = parse_menu("MENU: Party\nCATEGORY: Kids\n- Kids menu: nuggets and fries").unwrap();
        assert_eq!(menu.categories.len(), 1);
        assert_eq!(menu.categories[0].items[0].name, "Kids menu: nuggets and fries");
    }

    #[test]
    fn test_spaced_hyphen_inside_line_is_kept() {
        let menu = parse_menu("MENU: X\nCATEGORY: Mains\n- Rice - beans :: side dish").unwrap();
        let items = &menu.categories[0].items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Rice - beans");
        assert_eq!(items[0].description.as_deref(), Some("side dish"));
    }

    #[test]
    fn test_header_word_inside_description_is_kept() {
        let menu =
            parse_menu("MENU: X\nCATEGORY: Mains\n- Steak :: best in category: premium\n- Fish")
                .unwrap();
        assert_eq!(menu.categories.len(), 1);
        let items = &menu.categories[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description.as_deref(), Some("best in category: premium"));
        assert_eq!(items[1].name, "Fish");
    }
}
