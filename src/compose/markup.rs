//! Translation-value markup compilation.
//!
//! A translation value is either a plain string, emitted as a JSON string
//! literal, or a string with embedded `<i18n:…>` markup, compiled into a
//! JavaScript function expression. The markup carries parameter references
//! (`<i18n:param>name</i18n:param>`) and plural form selection
//! (`<i18n:dynamic>` with `<i18n:count>` and `<i18n:one>`/`<i18n:some>`/
//! `<i18n:many>`/`<i18n:none>` forms).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Matches one opening or closing markup tag.
#[allow(clippy::expect_used)]
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?i18n:[a-z]+>").expect("tag pattern is valid"));

/// Marker that distinguishes marked-up values from plain strings.
const MARKUP_MARKER: &str = "<i18n:";

/// Plural form tags allowed inside a dynamic block.
const FORM_TAGS: &[&str] = &["one", "some", "many", "none"];

/// Defines errors that may occur while compiling markup
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MarkupError {
    /// Error when a tag is never closed
    #[error("Unclosed markup tag '<i18n:{tag}>'")]
    Unclosed {
        /// Name of the unclosed tag.
        tag: String,
    },
    /// Error when a closing tag has no matching opening tag
    #[error("Unexpected closing tag '</i18n:{tag}>'")]
    UnexpectedClose {
        /// Name of the stray closing tag.
        tag: String,
    },
    /// Error when a tag name is not part of the grammar
    #[error("Unknown markup tag '<i18n:{tag}>'")]
    UnknownTag {
        /// The unrecognized tag name.
        tag: String,
    },
    /// Error when a known tag appears outside its only valid position
    #[error("Tag '<i18n:{tag}>' is not allowed here")]
    MisplacedTag {
        /// The misplaced tag name.
        tag: String,
    },
    /// Error when a parameter tag contains nested markup
    #[error("Tag '<i18n:{tag}>' must contain a plain parameter name")]
    BadParamBody {
        /// The tag with the invalid body.
        tag: String,
    },
    /// Error when a parameter name is empty
    #[error("Empty parameter name in '<i18n:{tag}>'")]
    EmptyParam {
        /// The tag with the empty name.
        tag: String,
    },
    /// Error when a dynamic block has no count parameter
    #[error("Dynamic block is missing a count parameter")]
    MissingCount,
    /// Error when a dynamic block declares no forms
    #[error("Dynamic block declares no plural forms")]
    EmptyDynamic,
    /// Error when dynamic blocks are nested
    #[error("Dynamic blocks cannot be nested")]
    NestedDynamic,
}

/// One lexed piece of a marked-up value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    /// Literal text between tags.
    Text(&'a str),
    /// Opening tag with its name.
    Open(&'a str),
    /// Closing tag with its name.
    Close(&'a str),
}

/// One parsed markup part.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    /// Literal text run.
    Literal(String),
    /// Parameter reference.
    Param(String),
    /// Plural form selection keyed by a count parameter.
    Dynamic {
        /// Parameter the runtime selects the form by.
        count: String,
        /// Form name → form body, in declaration order.
        forms: Vec<(String, Vec<Part>)>,
    },
}

/// Compiles translation values into JavaScript runtime expressions.
#[derive(Debug, Clone)]
pub struct MarkupTranslator {
    /// Runtime registry global the generated expressions call into.
    registry: String,
}

impl MarkupTranslator {
    /// Creates a translator targeting the given registry global.
    #[must_use]
    pub fn new(registry: impl Into<String>) -> Self {
        Self { registry: registry.into() }
    }

    /// Compiles one translation value into exactly one expression string.
    ///
    /// # Errors
    /// - Malformed markup in a string value
    pub fn translate(&self, value: &Value) -> Result<String, MarkupError> {
        match value {
            Value::String(text) => self.compile_text(text),
            other => Ok(other.to_string()),
        }
    }

    /// Compiles a string value, plain or marked up.
    fn compile_text(&self, text: &str) -> Result<String, MarkupError> {
        if !text.contains(MARKUP_MARKER) {
            return Ok(quote(text));
        }
        let parts = parse_parts(text)?;
        Ok(format!("function (params) {{ return {}; }}", self.concat_expr(&parts)))
    }

    /// Joins part expressions with string concatenation.
    fn concat_expr(&self, parts: &[Part]) -> String {
        if parts.is_empty() {
            return quote("");
        }
        parts.iter().map(|part| self.part_expr(part)).collect::<Vec<_>>().join(" + ")
    }

    /// Renders one part as an expression.
    fn part_expr(&self, part: &Part) -> String {
        match part {
            Part::Literal(text) => quote(text),
            Part::Param(name) => param_expr(name),
            Part::Dynamic { count, forms } => {
                let entries = forms
                    .iter()
                    .map(|(form, body)| format!("{}: {}", quote(form), self.concat_expr(body)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}.choose({}, {{ {entries} }})", self.registry, param_expr(count))
            }
        }
    }
}

/// JSON string literal for a text run.
fn quote(text: &str) -> String {
    Value::from(text).to_string()
}

/// Expression reading one parameter from the runtime params object.
fn param_expr(name: &str) -> String {
    format!("params[{}]", quote(name))
}

/// Splits a value into text runs and tags.
fn lex(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for found in TAG_RE.find_iter(text) {
        if let Some(run) = text.get(last..found.start())
            && !run.is_empty()
        {
            pieces.push(Piece::Text(run));
        }
        last = found.end();

        let raw = found.as_str();
        if let Some(rest) = raw.strip_prefix("</i18n:") {
            if let Some(name) = rest.strip_suffix('>') {
                pieces.push(Piece::Close(name));
            }
        } else if let Some(rest) = raw.strip_prefix(MARKUP_MARKER)
            && let Some(name) = rest.strip_suffix('>')
        {
            pieces.push(Piece::Open(name));
        }
    }

    if let Some(run) = text.get(last..)
        && !run.is_empty()
    {
        pieces.push(Piece::Text(run));
    }

    pieces
}

/// Token stream the recursive-descent parser consumes.
type Pieces<'a> = std::vec::IntoIter<Piece<'a>>;

/// Parses a marked-up value into its part list.
fn parse_parts(text: &str) -> Result<Vec<Part>, MarkupError> {
    let mut pieces = lex(text).into_iter();
    parse_items(&mut pieces, None, false)
}

/// Parses items until `terminator` (a closing tag name) or end of input.
fn parse_items(
    pieces: &mut Pieces<'_>,
    terminator: Option<&str>,
    in_form: bool,
) -> Result<Vec<Part>, MarkupError> {
    let mut parts = Vec::new();

    while let Some(piece) = pieces.next() {
        match piece {
            Piece::Text(run) => parts.push(Part::Literal(run.to_string())),
            Piece::Open("param") => parts.push(Part::Param(parse_param_body(pieces, "param")?)),
            Piece::Open("dynamic") => {
                if in_form {
                    return Err(MarkupError::NestedDynamic);
                }
                parts.push(parse_dynamic(pieces)?);
            }
            Piece::Open(tag) if tag == "count" || FORM_TAGS.contains(&tag) => {
                return Err(MarkupError::MisplacedTag { tag: tag.to_string() });
            }
            Piece::Open(tag) => return Err(MarkupError::UnknownTag { tag: tag.to_string() }),
            Piece::Close(tag) => {
                if terminator == Some(tag) {
                    return Ok(parts);
                }
                return Err(MarkupError::UnexpectedClose { tag: tag.to_string() });
            }
        }
    }

    match terminator {
        Some(tag) => Err(MarkupError::Unclosed { tag: tag.to_string() }),
        None => Ok(parts),
    }
}

/// Parses the plain-text body and closing tag of a parameter-like tag.
fn parse_param_body(pieces: &mut Pieces<'_>, tag: &str) -> Result<String, MarkupError> {
    let name = match pieces.next() {
        Some(Piece::Text(run)) => {
            match pieces.next() {
                Some(Piece::Close(close)) if close == tag => run.trim().to_string(),
                Some(_) => return Err(MarkupError::BadParamBody { tag: tag.to_string() }),
                None => return Err(MarkupError::Unclosed { tag: tag.to_string() }),
            }
        }
        Some(Piece::Close(close)) if close == tag => String::new(),
        Some(_) => return Err(MarkupError::BadParamBody { tag: tag.to_string() }),
        None => return Err(MarkupError::Unclosed { tag: tag.to_string() }),
    };

    if name.is_empty() {
        return Err(MarkupError::EmptyParam { tag: tag.to_string() });
    }
    Ok(name)
}

/// Parses the inside of a dynamic block up to its closing tag.
fn parse_dynamic(pieces: &mut Pieces<'_>) -> Result<Part, MarkupError> {
    let mut count = None;
    let mut forms = Vec::new();

    loop {
        match pieces.next() {
            // Only insignificant whitespace may sit between declarations.
            Some(Piece::Text(run)) if run.trim().is_empty() => {}
            Some(Piece::Text(_)) => {
                return Err(MarkupError::MisplacedTag { tag: "dynamic".to_string() });
            }
            Some(Piece::Open("count")) => {
                count = Some(parse_param_body(pieces, "count")?);
            }
            Some(Piece::Open(tag)) if FORM_TAGS.contains(&tag) => {
                let body = parse_items(pieces, Some(tag), true)?;
                forms.push((tag.to_string(), body));
            }
            Some(Piece::Open("dynamic")) => return Err(MarkupError::NestedDynamic),
            Some(Piece::Open(tag @ "param")) => {
                return Err(MarkupError::MisplacedTag { tag: tag.to_string() });
            }
            Some(Piece::Open(tag)) => {
                return Err(MarkupError::UnknownTag { tag: tag.to_string() });
            }
            Some(Piece::Close("dynamic")) => break,
            Some(Piece::Close(tag)) => {
                return Err(MarkupError::UnexpectedClose { tag: tag.to_string() });
            }
            None => return Err(MarkupError::Unclosed { tag: "dynamic".to_string() }),
        }
    }

    let Some(count) = count else {
        return Err(MarkupError::MissingCount);
    };
    if forms.is_empty() {
        return Err(MarkupError::EmptyDynamic);
    }
    Ok(Part::Dynamic { count, forms })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    /// Translator with the default registry name.
    fn translator() -> MarkupTranslator {
        MarkupTranslator::new("I18N")
    }

    #[test]
    fn test_plain_string_compiles_to_json_literal() {
        let expr = translator().translate(&json!("Hello")).unwrap();
        assert_eq!(expr, "\"Hello\"");
    }

    #[test]
    fn test_plain_string_escapes_quotes() {
        let expr = translator().translate(&json!("Say \"hi\"")).unwrap();
        assert_eq!(expr, "\"Say \\\"hi\\\"\"");
    }

    #[rstest]
    #[case::number(json!(42), "42")]
    #[case::boolean(json!(true), "true")]
    #[case::null(json!(null), "null")]
    fn test_non_string_values_pass_through_as_json(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(translator().translate(&value).unwrap(), expected);
    }

    #[test]
    fn test_param_markup_compiles_to_function() {
        let expr = translator()
            .translate(&json!("Hello, <i18n:param>user</i18n:param>!"))
            .unwrap();
        assert_eq!(
            expr,
            "function (params) { return \"Hello, \" + params[\"user\"] + \"!\"; }"
        );
    }

    #[test]
    fn test_dynamic_markup_compiles_to_choose_call() {
        let value = json!(
            "<i18n:dynamic><i18n:count>count</i18n:count>\
             <i18n:one>item</i18n:one><i18n:many>items</i18n:many></i18n:dynamic>"
        );
        let expr = translator().translate(&value).unwrap();
        assert_eq!(
            expr,
            "function (params) { return I18N.choose(params[\"count\"], \
             { \"one\": \"item\", \"many\": \"items\" }); }"
        );
    }

    #[test]
    fn test_text_around_dynamic_is_concatenated() {
        let value = json!(
            "You have <i18n:dynamic><i18n:count>n</i18n:count>\
             <i18n:one>one file</i18n:one><i18n:many>files</i18n:many></i18n:dynamic>."
        );
        let expr = translator().translate(&value).unwrap();
        assert_eq!(
            expr,
            "function (params) { return \"You have \" + I18N.choose(params[\"n\"], \
             { \"one\": \"one file\", \"many\": \"files\" }) + \".\"; }"
        );
    }

    #[test]
    fn test_form_body_may_reference_params() {
        let value = json!(
            "<i18n:dynamic><i18n:count>n</i18n:count>\
             <i18n:one><i18n:param>n</i18n:param> item</i18n:one>\
             <i18n:many><i18n:param>n</i18n:param> items</i18n:many></i18n:dynamic>"
        );
        let expr = translator().translate(&value).unwrap();
        assert_eq!(
            expr,
            "function (params) { return I18N.choose(params[\"n\"], \
             { \"one\": params[\"n\"] + \" item\", \"many\": params[\"n\"] + \" items\" }); }"
        );
    }

    #[rstest]
    #[case::unclosed_param("Hello <i18n:param>user", MarkupError::Unclosed { tag: "param".to_string() })]
    #[case::unclosed_dynamic(
        "<i18n:dynamic><i18n:count>n</i18n:count><i18n:one>x</i18n:one>",
        MarkupError::Unclosed { tag: "dynamic".to_string() }
    )]
    #[case::stray_close("oops</i18n:param>", MarkupError::UnexpectedClose { tag: "param".to_string() })]
    #[case::unknown_tag("<i18n:gender>m</i18n:gender>", MarkupError::UnknownTag { tag: "gender".to_string() })]
    #[case::misplaced_form("<i18n:one>x</i18n:one>", MarkupError::MisplacedTag { tag: "one".to_string() })]
    #[case::misplaced_count("<i18n:count>n</i18n:count>", MarkupError::MisplacedTag { tag: "count".to_string() })]
    #[case::empty_param("<i18n:param></i18n:param>", MarkupError::EmptyParam { tag: "param".to_string() })]
    #[case::blank_param("<i18n:param>  </i18n:param>", MarkupError::EmptyParam { tag: "param".to_string() })]
    #[case::markup_in_param(
        "<i18n:param><i18n:param>x</i18n:param></i18n:param>",
        MarkupError::BadParamBody { tag: "param".to_string() }
    )]
    #[case::missing_count(
        "<i18n:dynamic><i18n:one>x</i18n:one></i18n:dynamic>",
        MarkupError::MissingCount
    )]
    #[case::no_forms(
        "<i18n:dynamic><i18n:count>n</i18n:count></i18n:dynamic>",
        MarkupError::EmptyDynamic
    )]
    #[case::nested_dynamic(
        "<i18n:dynamic><i18n:count>n</i18n:count>\
         <i18n:one><i18n:dynamic></i18n:dynamic></i18n:one></i18n:dynamic>",
        MarkupError::NestedDynamic
    )]
    #[case::text_inside_dynamic(
        "<i18n:dynamic>loose<i18n:count>n</i18n:count><i18n:one>x</i18n:one></i18n:dynamic>",
        MarkupError::MisplacedTag { tag: "dynamic".to_string() }
    )]
    fn test_malformed_markup_is_rejected(#[case] text: &str, #[case] expected: MarkupError) {
        let result = translator().translate(&json!(text));
        assert_eq!(result.unwrap_err(), expected);
    }

    #[test]
    fn test_marker_without_valid_tag_stays_literal() {
        // `<i18n:` followed by something the lexer does not recognize is
        // ordinary text, wrapped only because the marker is present.
        let expr = translator().translate(&json!("a <i18n:foo bar> b")).unwrap();
        assert_eq!(expr, "function (params) { return \"a <i18n:foo bar> b\"; }");
    }
}
