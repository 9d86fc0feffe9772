//! Tokenizer adapter over the `cssparser` tokenizer.
//! Spec: <https://www.w3.org/TR/selectors-3/#lex>
//!
//! Flattens a selector string into the token vocabulary the structurer
//! consumes: simple-selector tokens, combinators, and commas. Whitespace is
//! normalized here: runs of whitespace adjacent to an explicit combinator
//! or comma are absorbed, a lone run between compounds becomes a descendant
//! combinator, and leading/trailing whitespace is dropped.

use crate::{AttrOperator, Error, LOG_TARGET};
use cssparser::{
    BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput, SourceLocation, Token,
};
use log::trace;

/// A flat selector token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorToken {
    /// An element type name (`div`).
    Type { name: String },
    /// The universal selector (`*`).
    Universal,
    /// An id selector (`#main`).
    Id { name: String },
    /// A class selector (`.wide`).
    Class { name: String },
    /// An attribute selector (`[href^='https:']`). The key is ASCII
    /// lower-cased, the value is unquoted and unescaped, and `value` is
    /// empty when `operator` is `Exists`.
    Attribute {
        key: String,
        operator: AttrOperator,
        value: String,
        case_sensitive: bool,
    },
    /// A pseudo-class (`:hover`, `:nth-child(2)`); the argument is the raw
    /// text between the parentheses, trimmed.
    PseudoClass { name: String, argument: Option<String> },
    /// A pseudo-element (`::before`, `::slotted(span)`).
    PseudoElement { name: String, argument: Option<String> },
    /// A combinator between compounds.
    Combinator(CombinatorToken),
    /// A union separator.
    Comma,
}

/// Combinators as written in the source. The sibling forms are kept
/// distinct here and conflated by the structurer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombinatorToken {
    /// Whitespace between compounds.
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

/// Grammar errors raised by this adapter on top of the raw tokenizer.
#[derive(Clone, Debug, PartialEq, Eq)]
enum SelectorErrorKind {
    ExpectedClassName,
    ExpectedPseudoName,
    InvalidIdSelector,
    ExpectedAttributeKey,
    ExpectedAttributeOperator,
    ExpectedAttributeValue,
    InvalidCaseFlag,
    DanglingCombinator,
    UnexpectedToken(String),
}

impl SelectorErrorKind {
    fn describe(&self) -> String {
        match self {
            Self::ExpectedClassName => "expected an identifier after '.'".to_owned(),
            Self::ExpectedPseudoName => "expected a pseudo-class or pseudo-element name".to_owned(),
            Self::InvalidIdSelector => "'#' must be followed by an identifier".to_owned(),
            Self::ExpectedAttributeKey => "expected an attribute name".to_owned(),
            Self::ExpectedAttributeOperator => "expected an attribute operator".to_owned(),
            Self::ExpectedAttributeValue => "expected an attribute value".to_owned(),
            Self::InvalidCaseFlag => "expected 'i' or 's' after the attribute value".to_owned(),
            Self::DanglingCombinator => "combinator without a compound selector".to_owned(),
            Self::UnexpectedToken(token) => format!("unexpected token {token}"),
        }
    }
}

type CssError<'i> = ParseError<'i, SelectorErrorKind>;

/// Tokenize a selector string.
///
/// # Errors
/// Returns [`Error::Parse`] when the input is not a syntactically valid
/// selector; the message carries the source location reported by the
/// tokenizer.
pub fn tokenize(selector: &str) -> Result<Vec<SelectorToken>, Error> {
    let mut input = ParserInput::new(selector);
    let mut parser = Parser::new(&mut input);
    let tokens = scan(&mut parser).map_err(|error| to_crate_error(&error))?;
    trace!(target: LOG_TARGET, "tokenized {selector:?} into {} token(s)", tokens.len());
    Ok(tokens)
}

fn to_crate_error(error: &CssError<'_>) -> Error {
    let what = match &error.kind {
        ParseErrorKind::Custom(kind) => kind.describe(),
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of input".to_owned()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {token:?}")
        }
        ParseErrorKind::Basic(_) => "invalid selector".to_owned(),
    };
    Error::Parse(format!(
        "{}:{}: {what}",
        error.location.line.saturating_add(1),
        error.location.column
    ))
}

fn scan<'i>(parser: &mut Parser<'i, '_>) -> Result<Vec<SelectorToken>, CssError<'i>> {
    let mut tokens: Vec<SelectorToken> = Vec::new();
    let mut pending_descendant = false;
    loop {
        let location = parser.current_source_location();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) => {
                // Only meaningful after a compound; leading whitespace and
                // whitespace after an explicit combinator or comma is dropped.
                if tokens.last().is_some_and(|last| {
                    !matches!(last, SelectorToken::Combinator(_) | SelectorToken::Comma)
                }) {
                    pending_descendant = true;
                }
            }
            Token::Delim('>') => {
                push_combinator(&mut tokens, CombinatorToken::Child, location)?;
                pending_descendant = false;
            }
            Token::Delim('+') => {
                push_combinator(&mut tokens, CombinatorToken::NextSibling, location)?;
                pending_descendant = false;
            }
            Token::Delim('~') => {
                push_combinator(&mut tokens, CombinatorToken::SubsequentSibling, location)?;
                pending_descendant = false;
            }
            Token::Comma => {
                pending_descendant = false;
                if tokens
                    .last()
                    .is_some_and(|last| matches!(last, SelectorToken::Combinator(_)))
                {
                    return Err(location.new_custom_error(SelectorErrorKind::DanglingCombinator));
                }
                tokens.push(SelectorToken::Comma);
            }
            Token::Ident(name) => {
                flush_descendant(&mut tokens, &mut pending_descendant);
                tokens.push(SelectorToken::Type {
                    name: name.as_ref().to_owned(),
                });
            }
            Token::Delim('*') => {
                flush_descendant(&mut tokens, &mut pending_descendant);
                tokens.push(SelectorToken::Universal);
            }
            Token::IDHash(name) => {
                flush_descendant(&mut tokens, &mut pending_descendant);
                tokens.push(SelectorToken::Id {
                    name: name.as_ref().to_owned(),
                });
            }
            Token::Hash(_) => {
                return Err(location.new_custom_error(SelectorErrorKind::InvalidIdSelector));
            }
            Token::Delim('.') => {
                flush_descendant(&mut tokens, &mut pending_descendant);
                match parser.next_including_whitespace().map(Token::clone) {
                    Ok(Token::Ident(name)) => tokens.push(SelectorToken::Class {
                        name: name.as_ref().to_owned(),
                    }),
                    _ => {
                        return Err(location.new_custom_error(SelectorErrorKind::ExpectedClassName));
                    }
                }
            }
            Token::Colon => {
                flush_descendant(&mut tokens, &mut pending_descendant);
                tokens.push(scan_pseudo(parser, location)?);
            }
            Token::SquareBracketBlock => {
                flush_descendant(&mut tokens, &mut pending_descendant);
                let attribute = parser.parse_nested_block(|inner| scan_attribute(inner))?;
                tokens.push(attribute);
            }
            other => {
                return Err(location.new_custom_error(SelectorErrorKind::UnexpectedToken(format!(
                    "{other:?}"
                ))));
            }
        }
    }
    if tokens
        .last()
        .is_some_and(|last| matches!(last, SelectorToken::Combinator(_)))
    {
        let location = parser.current_source_location();
        return Err(location.new_custom_error(SelectorErrorKind::DanglingCombinator));
    }
    Ok(tokens)
}

/// Emit a pending descendant combinator before the next compound token.
#[inline]
fn flush_descendant(tokens: &mut Vec<SelectorToken>, pending: &mut bool) {
    if *pending {
        tokens.push(SelectorToken::Combinator(CombinatorToken::Descendant));
        *pending = false;
    }
}

fn push_combinator<'i>(
    tokens: &mut Vec<SelectorToken>,
    combinator: CombinatorToken,
    location: SourceLocation,
) -> Result<(), CssError<'i>> {
    // A combinator needs a compound on its left.
    if tokens.last().is_none_or(|last| {
        matches!(last, SelectorToken::Combinator(_) | SelectorToken::Comma)
    }) {
        return Err(location.new_custom_error(SelectorErrorKind::DanglingCombinator));
    }
    tokens.push(SelectorToken::Combinator(combinator));
    Ok(())
}

/// Scan what follows a `:`: a pseudo-class, or a pseudo-element after a
/// second `:`. No whitespace is allowed inside either form.
fn scan_pseudo<'i>(
    parser: &mut Parser<'i, '_>,
    location: SourceLocation,
) -> Result<SelectorToken, CssError<'i>> {
    match parser.next_including_whitespace().map(Token::clone) {
        Ok(Token::Ident(name)) => Ok(SelectorToken::PseudoClass {
            name: name.as_ref().to_owned(),
            argument: None,
        }),
        Ok(Token::Function(name)) => Ok(SelectorToken::PseudoClass {
            name: name.as_ref().to_owned(),
            argument: Some(raw_argument(parser)?),
        }),
        Ok(Token::Colon) => match parser.next_including_whitespace().map(Token::clone) {
            Ok(Token::Ident(name)) => Ok(SelectorToken::PseudoElement {
                name: name.as_ref().to_owned(),
                argument: None,
            }),
            Ok(Token::Function(name)) => Ok(SelectorToken::PseudoElement {
                name: name.as_ref().to_owned(),
                argument: Some(raw_argument(parser)?),
            }),
            _ => Err(location.new_custom_error(SelectorErrorKind::ExpectedPseudoName)),
        },
        _ => Err(location.new_custom_error(SelectorErrorKind::ExpectedPseudoName)),
    }
}

/// Capture the raw source text of a function argument, without descending
/// into its structure. Pseudo-class arguments are opaque here.
fn raw_argument<'i>(parser: &mut Parser<'i, '_>) -> Result<String, CssError<'i>> {
    parser.parse_nested_block(|inner| {
        let start = inner.position();
        while inner.next_including_whitespace().is_ok() {}
        Ok(inner.slice_from(start).trim().to_owned())
    })
}

/// Scan the inside of an attribute block: `key`, `key op value`, optional
/// trailing `i`/`s` flag.
fn scan_attribute<'i>(parser: &mut Parser<'i, '_>) -> Result<SelectorToken, CssError<'i>> {
    let location = parser.current_source_location();
    let key = match parser.next().map(Token::clone) {
        Ok(Token::Ident(name)) => name.as_ref().to_ascii_lowercase(),
        Ok(_) => {
            return Err(location.new_custom_error(SelectorErrorKind::ExpectedAttributeKey));
        }
        Err(error) => return Err(error.into()),
    };
    let operator = match parser.next().map(Token::clone) {
        Err(_) => {
            return Ok(SelectorToken::Attribute {
                key,
                operator: AttrOperator::Exists,
                value: String::new(),
                case_sensitive: true,
            });
        }
        Ok(Token::Delim('=')) => AttrOperator::Equals,
        Ok(Token::IncludeMatch) => AttrOperator::Includes,
        Ok(Token::DashMatch) => AttrOperator::DashMatch,
        Ok(Token::PrefixMatch) => AttrOperator::Prefix,
        Ok(Token::SuffixMatch) => AttrOperator::Suffix,
        Ok(Token::SubstringMatch) => AttrOperator::Substring,
        Ok(_) => {
            return Err(
                parser.current_source_location().new_custom_error(SelectorErrorKind::ExpectedAttributeOperator)
            );
        }
    };
    let value = match parser.next().map(Token::clone) {
        Ok(Token::Ident(value) | Token::QuotedString(value)) => value.as_ref().to_owned(),
        Ok(_) => {
            return Err(
                parser.current_source_location().new_custom_error(SelectorErrorKind::ExpectedAttributeValue)
            );
        }
        Err(error) => return Err(error.into()),
    };
    let case_sensitive = match parser.next().map(Token::clone) {
        Err(_) => true,
        Ok(Token::Ident(flag)) if flag.as_ref().eq_ignore_ascii_case("i") => false,
        Ok(Token::Ident(flag)) if flag.as_ref().eq_ignore_ascii_case("s") => true,
        Ok(_) => {
            return Err(
                parser.current_source_location().new_custom_error(SelectorErrorKind::InvalidCaseFlag)
            );
        }
    };
    parser.expect_exhausted()?;
    Ok(SelectorToken::Attribute {
        key,
        operator,
        value,
        case_sensitive,
    })
}
