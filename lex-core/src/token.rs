use std::fmt;

// the fixed kinds every rule file can name; unknown kind strings are kept
// verbatim and flow through the token stream untouched
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TokenKind<'a> {
  Keyword,
  Identifier,
  IntLit,
  FloatLit,
  StrLit,
  CharLit,
  Operator,
  Delimiter,
  Comment,
  Whitespace,
  Newline,
  Error,
  Eof,
  Custom(&'a str),
}

impl<'a> TokenKind<'a> {
  pub fn from_name(name: &'a str) -> TokenKind<'a> {
    use TokenKind::*;
    match name {
      "KEYWORD" => Keyword,
      "IDENTIFIER" => Identifier,
      "LITERAL_INT" => IntLit,
      "LITERAL_FLOAT" => FloatLit,
      "LITERAL_STRING" => StrLit,
      "LITERAL_CHAR" => CharLit,
      "OPERATOR" => Operator,
      "DELIMITER" => Delimiter,
      "COMMENT" => Comment,
      "WHITESPACE" => Whitespace,
      "NEWLINE" => Newline,
      "ERROR" => Error,
      "EOF" => Eof,
      _ => Custom(name),
    }
  }

  pub fn name(&self) -> &'a str {
    use TokenKind::*;
    match self {
      Keyword => "KEYWORD",
      Identifier => "IDENTIFIER",
      IntLit => "LITERAL_INT",
      FloatLit => "LITERAL_FLOAT",
      StrLit => "LITERAL_STRING",
      CharLit => "LITERAL_CHAR",
      Operator => "OPERATOR",
      Delimiter => "DELIMITER",
      Comment => "COMMENT",
      Whitespace => "WHITESPACE",
      Newline => "NEWLINE",
      Error => "ERROR",
      Eof => "EOF",
      Custom(s) => s,
    }
  }

  // trivia is kept in the raw stream for tracing and filtered before parsing
  pub fn is_trivia(&self) -> bool {
    matches!(self, TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment)
  }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Token<'a> {
  pub kind: TokenKind<'a>,
  pub lexeme: &'a str,
  pub line: u32,
  pub col: u32,
}

impl fmt::Display for Token<'_> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}({:?}) at {}:{}", self.kind.name(), self.lexeme, self.line, self.col)
  }
}
