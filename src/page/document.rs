//! HTML-backed page, parsed with html5ever

use super::{FieldEvent, FieldId, InputField, Page, PageError};
use crate::utils::helpers::collapse_whitespace;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use url::Url;

/// Elements whose text is never rendered.
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Elements that start a new line of rendered text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "legend", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

#[derive(Debug, Clone)]
struct FieldState {
    field: InputField,
    value: String,
    events: Vec<FieldEvent>,
}

/// A static snapshot of a page: URL, rendered body text and its inputs.
/// Field values and dispatched events are tracked so injections can be
/// inspected afterwards.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    href: String,
    hostname: String,
    body_text: String,
    fields: Vec<FieldState>,
}

#[derive(Default)]
struct Collector {
    fields: Vec<FieldState>,
    /// Raw rendered text; `\n` marks a line break.
    text: String,
}

impl HtmlPage {
    pub fn parse(url: &str, html: &str) -> Result<Self, PageError> {
        let parsed = Url::parse(url).map_err(|source| PageError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut collector = Collector::default();
        collect(&dom.document, false, &mut collector);

        tracing::debug!(
            url = %parsed,
            inputs = collector.fields.len(),
            "parsed page"
        );

        Ok(Self {
            hostname: parsed.host_str().unwrap_or_default().to_string(),
            href: parsed.to_string(),
            body_text: rendered_text(&collector.text),
            fields: collector.fields,
        })
    }

    /// A page with an empty body.
    pub fn blank(url: &str) -> Result<Self, PageError> {
        Self::parse(url, "<html><body></body></html>")
    }

    pub fn value(&self, field: FieldId) -> Option<&str> {
        self.state(field).map(|s| s.value.as_str())
    }

    pub fn events(&self, field: FieldId) -> &[FieldEvent] {
        self.state(field).map(|s| s.events.as_slice()).unwrap_or(&[])
    }

    /// Look up an input by its `id` attribute.
    pub fn field_by_element_id(&self, element_id: &str) -> Option<&InputField> {
        self.fields
            .iter()
            .map(|s| &s.field)
            .find(|f| f.element_id.as_deref() == Some(element_id))
    }

    fn state(&self, field: FieldId) -> Option<&FieldState> {
        self.fields.iter().find(|s| s.field.id == field)
    }

    fn state_mut(&mut self, field: FieldId) -> Result<&mut FieldState, PageError> {
        self.fields
            .iter_mut()
            .find(|s| s.field.id == field)
            .ok_or(PageError::UnknownField(field))
    }
}

fn collect(handle: &Handle, in_body: bool, out: &mut Collector) {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let tag: &str = &name.local;
            if HIDDEN_TEXT_ELEMENTS.contains(&tag) {
                return;
            }

            if tag == "input" {
                let attrs = attrs.borrow();
                let attr = |key: &str| {
                    attrs
                        .iter()
                        .find(|a| &*a.name.local == key)
                        .map(|a| a.value.to_string())
                };

                out.fields.push(FieldState {
                    field: InputField {
                        id: FieldId(out.fields.len()),
                        name: attr("name"),
                        element_id: attr("id"),
                        placeholder: attr("placeholder"),
                    },
                    value: attr("value").unwrap_or_default(),
                    events: Vec::new(),
                });
            }

            let block = in_body && BLOCK_ELEMENTS.contains(&tag);
            if block || (in_body && tag == "br") {
                out.text.push('\n');
            }

            let in_body = in_body || tag == "body";
            for child in handle.children.borrow().iter() {
                collect(child, in_body, out);
            }

            if block {
                out.text.push('\n');
            }
        }
        NodeData::Text { contents } => {
            if in_body {
                // Source whitespace, newlines included, renders as spaces.
                let contents = contents.borrow();
                out.text
                    .extend(contents.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
        }
        _ => {
            for child in handle.children.borrow().iter() {
                collect(child, in_body, out);
            }
        }
    }
}

/// Approximates `innerText`: inline text runs together, block boundaries
/// become line breaks, blank lines are dropped.
fn rendered_text(raw: &str) -> String {
    raw.split('\n')
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl Page for HtmlPage {
    fn href(&self) -> &str {
        &self.href
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn body_text(&self) -> String {
        self.body_text.clone()
    }

    fn input_fields(&self) -> Vec<InputField> {
        self.fields.iter().map(|s| s.field.clone()).collect()
    }

    fn set_field_value(&mut self, field: FieldId, value: &str) -> Result<(), PageError> {
        self.state_mut(field)?.value = value.to_string();
        Ok(())
    }

    fn dispatch_event(&mut self, field: FieldId, event: FieldEvent) -> Result<(), PageError> {
        self.state_mut(field)?.events.push(event);
        Ok(())
    }
}
