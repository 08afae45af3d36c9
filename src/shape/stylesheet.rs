//! Selector rewriting for embedded stylesheets.
//!
//! The stylesheet of a `<style>` element is tokenized with `cssparser` (the
//! tokenizer behind `lightningcss`) and written back from source slices, so
//! everything that is not rewritten stays byte-for-byte identical:
//!
//! - grouping at-rules (`@media`, `@supports`, `@document`, `@layer`,
//!   `@container`) are entered and their rules rewritten
//! - every other at-rule (`@font-face`, `@keyframes`, `@import`, ...) is
//!   copied unchanged
//! - for ordinary rules, `#id` and `.class` components of the selector are
//!   replaced (including inside `:not()`, `:is()`, ...); the declaration block
//!   is copied unchanged apart from `url(#id)` references
//!
//! Strings, comments and attribute selectors are single tokens and never
//! rewritten. Identifiers are compared unescaped and whole, so a longer name
//! is never partially replaced by a shorter one.

use std::borrow::Cow;

use cssparser::{ParseError, Parser, ParserInput, SourcePosition, Token};
use rustc_hash::FxHashMap;

/// At-rules whose block contains further rules.
const GROUPING_RULES: &[&str] = &["media", "supports", "document", "layer", "container"];

/// Replacement tables of one shape.
struct Names<'a> {
    ids: &'a FxHashMap<String, String>,
    classes: &'a FxHashMap<String, String>,
}

/// Which references a token walk replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// `#id` and `.class` components
    Selector,
    /// `url(#id)` in declarations and attribute values
    Value,
    /// Arguments of `url(...)`
    Url,
}

/// Rewrite all rules of a stylesheet.
pub fn rewrite(
    css: &str,
    ids: &FxHashMap<String, String>,
    classes: &FxHashMap<String, String>,
) -> String {
    let names = Names { ids, classes };
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let mut out = String::with_capacity(css.len() + css.len() / 4);
    rewrite_rules(&mut parser, &names, &mut out);
    out
}

/// Replace `#id` and `.class` components of a selector list.
pub fn rewrite_selector(
    selector: &str,
    ids: &FxHashMap<String, String>,
    classes: &FxHashMap<String, String>,
) -> String {
    let names = Names { ids, classes };
    walk_source(selector, Scope::Selector, &names)
}

/// Rewrite `url(#id)` references (optionally quoted).
pub fn replace_url_refs<'a>(value: &'a str, ids: &FxHashMap<String, String>) -> Cow<'a, str> {
    if ids.is_empty() || !value.contains("url(") {
        return Cow::Borrowed(value);
    }

    let classes = FxHashMap::default();
    let names = Names { ids, classes: &classes };
    let rewritten = walk_source(value, Scope::Value, &names);
    if rewritten == value {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(rewritten)
    }
}

// ============================================================================
// Rules
// ============================================================================

fn rewrite_rules<'i>(input: &mut Parser<'i, '_>, names: &Names<'_>, out: &mut String) {
    loop {
        let start = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_)
            | Token::Comment(_)
            | Token::CDO
            | Token::CDC
            | Token::Semicolon
            | Token::CloseCurlyBracket => out.push_str(input.slice_from(start)),
            first => rewrite_rule(input, start, first, names, out),
        }
    }
}

/// One at-rule or qualified rule whose first token was already consumed.
fn rewrite_rule<'i>(
    input: &mut Parser<'i, '_>,
    start: SourcePosition,
    first: Token<'i>,
    names: &Names<'_>,
    out: &mut String,
) {
    let (at_rule, grouping) = match &first {
        Token::AtKeyword(name) => (
            true,
            GROUPING_RULES
                .iter()
                .any(|rule| name.eq_ignore_ascii_case(rule)),
        ),
        _ => (false, false),
    };

    // Find the block; `;` ends at-rules without one
    let mut token = first;
    let mut prelude_end = start;
    loop {
        match token {
            Token::CurlyBracketBlock => break,
            Token::Semicolon if at_rule => {
                out.push_str(input.slice_from(start));
                return;
            }
            _ => {}
        }
        prelude_end = input.position();
        token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                out.push_str(input.slice_from(start));
                return;
            }
        };
    }

    if at_rule && !grouping {
        let _ = input.parse_nested_block(|nested| {
            while nested.next_including_whitespace_and_comments().is_ok() {}
            Ok::<_, ParseError<'i, ()>>(())
        });
        out.push_str(input.slice_from(start));
        return;
    }

    let prelude = input.slice(start..prelude_end);
    if at_rule {
        out.push_str(prelude);
    } else {
        out.push_str(&rewrite_selector(prelude, names.ids, names.classes));
    }
    out.push_str(input.slice_from(prelude_end));

    let content_end = input.parse_nested_block(|nested| {
        if at_rule {
            rewrite_rules(nested, names, out);
        } else {
            walk(nested, Scope::Value, names, out);
        }
        Ok::<_, ParseError<'i, ()>>(nested.position())
    });
    // Closing brace, if the block was terminated
    if let Ok(content_end) = content_end {
        out.push_str(input.slice_from(content_end));
    }
}

// ============================================================================
// Token walks
// ============================================================================

fn walk_source(source: &str, scope: Scope, names: &Names<'_>) -> String {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut out = String::with_capacity(source.len() + 16);
    walk(&mut parser, scope, names, &mut out);
    out
}

/// Copy the remaining tokens of `input` to `out`, replacing the references of `scope`.
fn walk<'i>(input: &mut Parser<'i, '_>, scope: Scope, names: &Names<'_>, out: &mut String) {
    let mut copied = input.position();
    let mut dot = false;

    loop {
        let start = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let after_dot = std::mem::take(&mut dot);

        let replacement = match (scope, &token) {
            (Scope::Selector, Token::IDHash(id)) => {
                names.ids.get(&**id).map(|id| format!("#{id}"))
            }
            (Scope::Selector, Token::Delim('.')) => {
                dot = true;
                None
            }
            // The dot stays in the copied slice
            (Scope::Selector, Token::Ident(class)) if after_dot => names.classes.get(&**class).cloned(),
            (Scope::Value, Token::UnquotedUrl(url)) => url
                .strip_prefix('#')
                .and_then(|fragment| names.ids.get(fragment))
                .map(|id| format!("url(#{id})")),
            (Scope::Url, Token::QuotedString(url)) => url
                .strip_prefix('#')
                .and_then(|fragment| names.ids.get(fragment))
                .map(|id| {
                    let original = input.slice_from(start);
                    let quote = &original[..1];
                    let closed = original.len() > 1 && original.ends_with(quote);
                    format!("{quote}#{id}{}", if closed { quote } else { "" })
                }),
            _ => None,
        };

        if let Some(replacement) = replacement {
            out.push_str(input.slice(copied..start));
            out.push_str(&replacement);
            copied = input.position();
            continue;
        }

        let nested_scope = match (scope, &token) {
            (Scope::Selector, Token::Function(_) | Token::ParenthesisBlock) => Some(Scope::Selector),
            (Scope::Value, Token::Function(name)) if name.eq_ignore_ascii_case("url") => {
                Some(Scope::Url)
            }
            (
                Scope::Value,
                Token::Function(_)
                | Token::ParenthesisBlock
                | Token::SquareBracketBlock
                | Token::CurlyBracketBlock,
            ) => Some(Scope::Value),
            _ => None,
        };

        if let Some(nested_scope) = nested_scope {
            out.push_str(input.slice_from(copied));
            let end = input.parse_nested_block(|nested| {
                walk(nested, nested_scope, names, out);
                Ok::<_, ParseError<'i, ()>>(nested.position())
            });
            copied = match end {
                Ok(end) => end,
                Err(_) => input.position(),
            };
        }
    }

    out.push_str(input.slice_from(copied));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> FxHashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(css: &str) -> String {
        let ids = table(&[("a", "nsa"), ("ab", "nsab"), ("grad", "nsgrad")]);
        let classes = table(&[("b", "nsb"), ("icon", "nsicon")]);
        rewrite(css, &ids, &classes)
    }

    #[test]
    fn test_ids_and_classes() {
        assert_eq!(run("#a .b{fill:red}"), "#nsa .nsb{fill:red}");
        assert_eq!(run("g#a>.icon:hover, .b.icon { }"), "g#nsa>.nsicon:hover, .nsb.nsicon { }");
    }

    #[test]
    fn test_whole_identifiers_only() {
        assert_eq!(run("#ab,#a,#abc{x:y}"), "#nsab,#nsa,#abc{x:y}");
        assert_eq!(run(".bb{x:y}"), ".bb{x:y}");
    }

    #[test]
    fn test_functional_pseudo_classes() {
        assert_eq!(run("g:not(.b, #a) .icon{}"), "g:not(.nsb, #nsa) .nsicon{}");
    }

    #[test]
    fn test_declarations_are_untouched_except_urls() {
        assert_eq!(
            run(".b{content:\".b #a\";fill:url(#grad);stroke:url('#grad')}"),
            ".nsb{content:\".b #a\";fill:url(#nsgrad);stroke:url('#nsgrad')}"
        );
    }

    #[test]
    fn test_attribute_selectors_and_comments() {
        assert_eq!(
            run("/* #a */ [href=\"#a\"] .b{}"),
            "/* #a */ [href=\"#a\"] .nsb{}"
        );
    }

    #[test]
    fn test_grouping_rules_recurse() {
        assert_eq!(
            run("@media (min-width: 10px) { .b { x: y } @supports (display: grid) { #a {} } }"),
            "@media (min-width: 10px) { .nsb { x: y } @supports (display: grid) { #nsa {} } }"
        );
    }

    #[test]
    fn test_other_at_rules_are_verbatim() {
        let css = "@import url(x.css);@font-face{font-family:a}@keyframes b{0%{opacity:0}}.b{}";
        assert_eq!(
            run(css),
            "@import url(x.css);@font-face{font-family:a}@keyframes b{0%{opacity:0}}.nsb{}"
        );
    }

    #[test]
    fn test_numbers_are_not_classes() {
        assert_eq!(run("#a{stroke-width:.5}"), "#nsa{stroke-width:.5}");
        assert_eq!(run(".5b{}"), ".5b{}");
    }

    #[test]
    fn test_unterminated_input() {
        assert_eq!(run(".b{fill:red"), ".nsb{fill:red");
        assert_eq!(run("@media screen { .b {"), "@media screen { .nsb {");
        assert_eq!(run("#a"), "#a");
    }

    #[test]
    fn test_replace_url_refs() {
        let ids = table(&[("m", "xm")]);
        assert_eq!(replace_url_refs("url(#m) url(#other)", &ids), "url(#xm) url(#other)");
        assert_eq!(replace_url_refs("url(\"#m\")", &ids), "url(\"#xm\")");
        assert_eq!(replace_url_refs("fill:url( '#m' ) red", &ids), "fill:url( '#xm' ) red");
        assert!(matches!(replace_url_refs("red", &ids), Cow::Borrowed(_)));
        assert!(matches!(replace_url_refs("url(#other)", &ids), Cow::Borrowed(_)));
    }
}
