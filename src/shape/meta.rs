//! Accessibility metadata.
//!
//! Configured titles and descriptions become the first children of the
//! shape's root element and are referenced from `aria-labelledby`:
//!
//! ```text
//! <svg aria-labelledby="home-title home-desc">
//!   <title id="home-title">Home</title>
//!   <desc id="home-desc">Back to the start page</desc>
//!   ...
//! ```

use crate::config::Meta;
use crate::svg::{Element, Node};

/// Inject (or update) `<title>`/`<desc>` and set `aria-labelledby`.
pub fn annotate(root: &mut Element, id: &str, meta: &Meta) {
    let mut labels = Vec::with_capacity(2);
    let mut insert_at = 0;

    if let Some(title) = &meta.title {
        let title_id = format!("{id}-title");
        place_first(root, "title", &title_id, title, insert_at);
        labels.push(title_id);
        insert_at += 1;
    }

    if let Some(description) = &meta.description {
        let desc_id = format!("{id}-desc");
        place_first(root, "desc", &desc_id, description, insert_at);
        labels.push(desc_id);
    }

    if labels.is_empty() {
        root.remove_attr("aria-labelledby");
    } else {
        root.set_attr("aria-labelledby", labels.join(" "));
    }
}

/// Replace all direct `<name>` children with one element at `index`.
fn place_first(root: &mut Element, name: &str, id: &str, text: &str, index: usize) {
    root.children
        .retain(|node| !matches!(node, Node::Element(elem) if elem.is(name)));

    let mut elem = Element::new(name).with_attr("id", id);
    elem.set_text(text);

    let index = index.min(root.children.len());
    root.children.insert(index, Node::Element(elem));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::Document;

    fn meta(title: Option<&str>, description: Option<&str>) -> Meta {
        Meta {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_injects_title_and_desc() {
        let mut doc = Document::parse("<svg><path/></svg>").unwrap();
        annotate(&mut doc.root, "home", &meta(Some("Home"), Some("A & B")));
        assert_eq!(
            doc.serialize(),
            r#"<svg aria-labelledby="home-title home-desc"><title id="home-title">Home</title><desc id="home-desc">A &amp; B</desc><path/></svg>"#
        );
    }

    #[test]
    fn test_updates_existing_title() {
        let mut doc = Document::parse("<svg><path/><title>Old</title></svg>").unwrap();
        annotate(&mut doc.root, "a", &meta(Some("New"), None));
        assert_eq!(
            doc.serialize(),
            r#"<svg aria-labelledby="a-title"><title id="a-title">New</title><path/></svg>"#
        );
    }

    #[test]
    fn test_removes_label_without_meta() {
        let mut doc =
            Document::parse(r#"<svg aria-labelledby="stale"><path/></svg>"#).unwrap();
        annotate(&mut doc.root, "a", &Meta::default());
        assert_eq!(doc.serialize(), "<svg><path/></svg>");
    }

    #[test]
    fn test_description_only() {
        let mut doc = Document::parse("<svg/>").unwrap();
        annotate(&mut doc.root, "a", &meta(None, Some("Text")));
        assert_eq!(doc.root.attr("aria-labelledby"), Some("a-desc"));
        assert_eq!(doc.root.position_of("desc"), Some(0));
    }
}
