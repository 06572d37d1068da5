//! Markup handling for element values.
//!
//! An element value carries its page's markup and a path of child indices.
//! Queries re-parse the whole page and walk the path back to the element;
//! parsing is deterministic so the path always lands on the same node.

use helpercore::{Element, NodeError, Value};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;

/// Root element of a fetched page, remembering the page origin
pub fn page_element(markup: &str, url: &str) -> Element {
    let document = Html::parse_document(markup);
    let root = document.root_element();
    let base_url = Url::parse(url)
        .ok()
        .map(|u| format!("{}/", u.origin().ascii_serialization()));
    Element::new(markup, path_of(root), root.html(), base_url)
}

pub fn parse_selector(selectors: &str) -> Result<Selector, NodeError> {
    Selector::parse(selectors)
        .map_err(|e| NodeError::Configuration(format!("Invalid selector '{}': {}", selectors, e)))
}

/// Child indices leading from the document node to `element`
fn path_of(element: ElementRef<'_>) -> Vec<usize> {
    let node = *element;
    let mut path: Vec<usize> = std::iter::once(node)
        .chain(node.ancestors())
        .filter(|node| node.parent().is_some())
        .map(|node| node.prev_siblings().count())
        .collect();
    path.reverse();
    path
}

/// The node `element` stands for inside the re-parsed `document`
fn locate<'a>(document: &'a Html, element: &Element) -> Option<ElementRef<'a>> {
    if element.path.is_empty() {
        return Some(document.root_element());
    }

    let mut node = document.tree.root();
    for &index in &element.path {
        node = node.children().nth(index)?;
    }
    ElementRef::wrap(node)
}

fn child_element(found: ElementRef<'_>, parent: &Element) -> Element {
    Element::new(Arc::clone(&parent.page), path_of(found), found.html(), parent.base_url.clone())
}

/// First descendant matching `selectors`
pub fn select_first(element: &Element, selectors: &str) -> Result<Option<Element>, NodeError> {
    let selector = parse_selector(selectors)?;
    let document = Html::parse_document(&element.page);
    Ok(locate(&document, element)
        .and_then(|root| root.select(&selector).next())
        .map(|found| child_element(found, element)))
}

/// Every descendant matching `selectors`, in document order
pub fn select_all(element: &Element, selectors: &str) -> Result<Vec<Element>, NodeError> {
    let selector = parse_selector(selectors)?;
    let document = Html::parse_document(&element.page);
    Ok(locate(&document, element)
        .map(|root| root.select(&selector).map(|found| child_element(found, element)).collect())
        .unwrap_or_default())
}

/// Read a named property of an element.
///
/// Link-like attributes resolve against the page the element came from.
pub fn element_property(element: &Element, key: &str) -> Value {
    let document = Html::parse_document(&element.page);
    let Some(root) = locate(&document, element) else {
        return Value::Null;
    };

    match key {
        "textContent" | "innerText" | "text" => Value::String(root.text().collect()),
        "innerHTML" => Value::String(root.inner_html()),
        "outerHTML" => Value::String(root.html()),
        "tagName" | "nodeName" => Value::String(root.value().name().to_uppercase()),
        "id" => Value::String(root.value().attr("id").unwrap_or_default().to_string()),
        "className" => Value::String(root.value().attr("class").unwrap_or_default().to_string()),
        "href" | "src" | "action" => match root.value().attr(key) {
            Some(raw) => Value::String(resolve(raw, element.base_url.as_deref())),
            None => Value::Null,
        },
        other => root.value().attr(other).map(Value::from).unwrap_or(Value::Null),
    }
}

fn resolve(raw: &str, base: Option<&str>) -> String {
    base.and_then(|b| Url::parse(b).ok())
        .and_then(|b| b.join(raw).ok())
        .map(String::from)
        .unwrap_or_else(|| raw.to_string())
}
