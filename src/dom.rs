use crate::error::UiError;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

pub fn window() -> Result<Window, UiError> {
    web_sys::window().ok_or(UiError::NoWindow)
}

pub fn document() -> Result<Document, UiError> {
    window()?.document().ok_or(UiError::NoWindow)
}

pub fn element_by_id(doc: &Document, id: &str) -> Result<Element, UiError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| UiError::MissingElement(format!("#{}", id)))
}

/// Typed lookup, e.g. `typed_by_id::<HtmlInputElement>(&doc, "commandInput")`.
pub fn typed_by_id<T: JsCast>(doc: &Document, id: &str) -> Result<T, UiError> {
    element_by_id(doc, id)?
        .dyn_into::<T>()
        .map_err(|_| UiError::MissingElement(format!("#{} (unexpected element type)", id)))
}

pub fn query(doc: &Document, selector: &str) -> Option<Element> {
    doc.query_selector(selector).ok().flatten()
}

pub fn create(doc: &Document, tag: &str, class: &str) -> Result<Element, UiError> {
    let el = doc
        .create_element(tag)
        .map_err(|_| UiError::MissingElement(format!("<{}>", tag)))?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

pub fn set_active(el: &Element, active: bool) {
    let classes = el.class_list();
    let _ = if active {
        classes.add_1("active")
    } else {
        classes.remove_1("active")
    };
}

pub fn scroll_to_bottom(el: &Element) {
    el.set_scroll_top(el.scroll_height());
}

pub fn lock_page_scroll(locked: bool) {
    let body: Option<HtmlElement> = document().ok().and_then(|d| d.body());
    if let Some(body) = body {
        let style = body.style();
        let _ = if locked {
            style.set_property("overflow", "hidden")
        } else {
            style.remove_property("overflow").map(|_| ())
        };
    }
}

/// Nearest ancestor (or self) of an event target matching `selector`.
pub fn closest_target(event: &web_sys::Event, selector: &str) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Calculator"), "Calculator");
    }
}
