//! Lexer for template text using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Template tokens. Everything that is not placeholder syntax lexes as
/// [`Token::Text`], [`Token::Space`] or [`Token::Newline`].
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Placeholder delimiters
    #[token("{{")]
    Open,
    #[token("}}")]
    Close,
    /// `>}}` or `>>}}`, carrying the number of `>` markers
    #[regex(r">>?\}\}", |lex| lex.slice().len() - 2)]
    GtClose(usize),

    /// Backslash plus the character it escapes
    #[regex(r"\\(.|\n)")]
    Escape,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Placeholder punctuation
    #[token("|")]
    Pipe,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("#")]
    Hash,
    #[token("@")]
    At,
    #[token(".")]
    Dot,

    #[token("\n")]
    Newline,
    #[regex(r"[ \t\r]+")]
    Space,
    #[regex(r"[^{}\\|%<>!#@. \t\r\n]+")]
    Text,
}

impl Token {
    /// Tokens that open or close a placeholder
    pub fn is_delimiter(&self) -> bool {
        matches!(self, Token::Open | Token::Close | Token::GtClose(_))
    }
}

/// Lex input string into tokens with spans.
///
/// Input the lexer cannot classify (such as a trailing lone backslash) is
/// kept as text so no byte of the source is lost.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| (tok.unwrap_or(Token::Text), span))
}
