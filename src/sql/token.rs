//! SQL Tokens - the atomic units of SQL output.
//!
//! Filter compilation works on trusted SQL fragments (conditions, join
//! predicates, column references), so most dynamic content travels as
//! [`Token::Raw`]. Keywords and literals still go through the dialect.

use super::dialect::SqlDialect;

/// SQL Token - every element the query builder emits.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    Distinct,
    On,
    From,
    Inner,
    Join,
    Where,
    And,
    As,
    OrderBy,
    Asc,
    Desc,
    Limit,
    Count,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Unsigned integer literal (row limits).
    LitInt(u64),

    // === Escape Hatch ===
    /// SQL fragment passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// Never pass user input to this variant. Fragments built by the filter
    /// compilers quote every user-supplied value before it gets here.
    Raw(String),
}

impl Token {
    /// Serialize this token to a string for the given dialect.
    pub fn serialize(&self, dialect: &dyn SqlDialect) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::On => "ON".into(),
            Token::From => "FROM".into(),
            Token::Inner => "INNER".into(),
            Token::Join => "JOIN".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::As => "AS".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::Limit => "LIMIT".into(),
            Token::Count => "COUNT".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Space => " ".into(),

            Token::LitInt(n) => n.to_string(),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Push a trusted SQL fragment.
    pub fn raw(&mut self, fragment: &str) -> &mut Self {
        self.push(Token::Raw(fragment.to_string()))
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Push `items` as raw fragments separated by `sep`.
    ///
    /// Commas are followed by a space, keywords are surrounded by spaces.
    pub fn separated<'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a str>,
        sep: Token,
    ) -> &mut Self {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                if sep != Token::Comma {
                    self.space();
                }
                self.push(sep.clone()).space();
            }
            self.raw(item);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self, dialect: &dyn SqlDialect) -> String {
        self.tokens.iter().map(|t| t.serialize(dialect)).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
