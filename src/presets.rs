// builtin language presets: rule files, keyword sets and default grammars for
// the two toy source languages

pub struct Preset {
  pub name: &'static str,
  pub rules: &'static str,
  pub keywords: &'static [&'static str],
  pub grammar: &'static str,
}

pub fn lookup(name: &str) -> Option<&'static Preset> {
  match name.to_ascii_lowercase().as_str() {
    "pascal" => Some(&PASCAL),
    "c" => Some(&C),
    _ => None,
  }
}

pub static PASCAL: Preset = Preset {
  name: "pascal",
  rules: r"# pascal-like lexical rules: <regex> <kind> <priority>
\{[^}]*\} COMMENT 10
//[^\n]* COMMENT 10
'([^'\\]|\\.)*' LITERAL_STRING 9
\d+\.\d+ LITERAL_FLOAT 8
\d+ LITERAL_INT 8
:= OPERATOR 7
<= OPERATOR 7
>= OPERATOR 7
<> OPERATOR 7
[+\-*/=<>] OPERATOR 6
[;,.:()\[\]] DELIMITER 6
[a-zA-Z_][a-zA-Z0-9_]* IDENTIFIER 5
\n NEWLINE 1
[ \t\r]+ WHITESPACE 1
",
  keywords: &[
    "program", "var", "const", "type", "function", "procedure", "begin", "end",
    "if", "then", "else", "while", "do", "for", "to", "downto", "repeat",
    "until", "case", "of", "integer", "real", "boolean", "char", "string",
    "mod", "div", "and", "or", "not",
  ],
  grammar: "\
Program -> program id ; Block .
Block -> VarDecls StmtList | StmtList
VarDecls -> VarDecls VarDecl | VarDecl
VarDecl -> var id : Type ;
Type -> integer | real | boolean | char | string
StmtList -> StmtList ; Stmt | Stmt
Stmt -> id := Expr | if Expr then Stmt | if Expr then Stmt else Stmt | while Expr do Stmt | begin StmtList end
Expr -> Expr + Term | Expr - Term | Term
Term -> Term * Factor | Term / Factor | Factor
Factor -> ( Expr ) | id | num
",
};

pub static C: Preset = Preset {
  name: "c",
  rules: r#"# c-like lexical rules: <regex> <kind> <priority>
\#[^\n]* PREPROCESSOR 10
/\*([^*]|\*+[^*/])*\*+/ COMMENT 10
//[^\n]* COMMENT 10
"([^"\\]|\\.)*" LITERAL_STRING 9
'([^'\\]|\\.)' LITERAL_CHAR 9
\d+\.\d+ LITERAL_FLOAT 8
\d+ LITERAL_INT 8
<<=|>>= OPERATOR 7
\+\+|--|<<|>>|<=|>=|==|!=|&&|\|\||\+=|-=|\*=|/=|%=|&=|\|=|\^=|-> OPERATOR 7
[-+*/%=<>&|^~!?] OPERATOR 6
[;,.:()\[\]{}] DELIMITER 6
[a-zA-Z_][a-zA-Z0-9_]* IDENTIFIER 5
\n NEWLINE 1
[ \t\r]+ WHITESPACE 1
"#,
  keywords: &[
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if", "int",
    "long", "register", "return", "short", "signed", "sizeof", "static",
    "struct", "switch", "typedef", "union", "unsigned", "void", "volatile",
    "while",
  ],
  grammar: "\
Program -> StmtList
StmtList -> StmtList Stmt | Stmt
Stmt -> id = Expr ; | if ( Expr ) Stmt | if ( Expr ) Stmt else Stmt | while ( Expr ) Stmt | { StmtList } | return Expr ;
Expr -> Expr + Term | Expr - Term | Term
Term -> Term * Factor | Term / Factor | Factor
Factor -> ( Expr ) | id | num
",
};

#[cfg(test)]
mod tests {
  use super::*;
  use lex_core::Lexer;

  #[test]
  fn presets_compile() {
    for preset in &[&PASCAL, &C] {
      let (lexer, diags) = Lexer::from_rules_text(preset.rules);
      assert!(diags.is_empty(), "{}: {:?}", preset.name, diags);
      assert!(lexer.is_some());
    }
  }

  #[test]
  fn pascal_scan() {
    let (lexer, _) = Lexer::from_rules_text(PASCAL.rules);
    let lexer = lexer.unwrap().with_keywords(PASCAL.keywords.iter().copied());
    let (tokens, errors) = lexer.scan("x := (a + 3) * b { done }");
    assert!(errors.is_empty());
    let sig = tokens.iter().filter(|t| !t.kind.is_trivia() && t.lexeme != "")
      .map(|t| t.lexeme).collect::<Vec<_>>();
    assert_eq!(sig, vec!["x", ":=", "(", "a", "+", "3", ")", "*", "b"]);
  }

  #[test]
  fn c_scan_promotes_keywords() {
    let (lexer, _) = Lexer::from_rules_text(C.rules);
    let lexer = lexer.unwrap().with_keywords(C.keywords.iter().copied());
    let (tokens, errors) = lexer.scan("while (i <= 10) i = i + 1;");
    assert!(errors.is_empty());
    use lex_core::TokenKind;
    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert!(tokens.iter().any(|t| t.lexeme == "<=" && t.kind == TokenKind::Operator));
  }

  #[test]
  fn lookup_by_name() {
    assert_eq!(lookup("Pascal").unwrap().name, "pascal");
    assert_eq!(lookup("C").unwrap().name, "c");
    assert!(lookup("fortran").is_none());
  }
}
