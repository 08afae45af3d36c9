//! Embedded text templates with typed placeholder substitution.

use std::marker::PhantomData;

/// A set of values substituted into a template.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Static template text bound to its variable type.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Variables of `example.html`.
pub struct ExampleVars {
    pub title: String,
    /// `<link>` element, or empty.
    pub stylesheet: String,
    /// `<li>` items, one per shape.
    pub shapes: String,
}

impl TemplateVars for ExampleVars {
    fn apply(&self, content: &str) -> String {
        content
            .replace("__TITLE__", &self.title)
            .replace("__STYLESHEET__", &self.stylesheet)
            .replace("__SHAPES__", &self.shapes)
    }
}

pub const EXAMPLE_HTML: Template<ExampleVars> = Template::new(include_str!("example.html"));
