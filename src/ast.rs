use lex_core::{Token, TokenKind};
use std::fmt::Write;

// nodes are synthesized during reduce steps: leaves from shifted tokens,
// internal nodes from the reducing production, error placeholders from
// panic-mode recovery
#[derive(Debug, Clone, PartialEq)]
pub enum Ast<'a> {
  Leaf { kind: TokenKind<'a>, lexeme: &'a str, line: u32, col: u32 },
  Node { label: &'a str, prod: u32, children: Vec<Ast<'a>> },
  Error,
}

impl<'a> Ast<'a> {
  pub fn leaf(t: &Token<'a>) -> Ast<'a> {
    Ast::Leaf { kind: t.kind, lexeme: t.lexeme, line: t.line, col: t.col }
  }

  pub fn is_leaf(&self) -> bool { matches!(self, Ast::Leaf { .. }) }

  pub fn leaf_lexeme(&self) -> Option<&'a str> {
    match self { Ast::Leaf { lexeme, .. } => Some(lexeme), _ => None }
  }

  pub fn children(&self) -> &[Ast<'a>] {
    match self { Ast::Node { children, .. } => children, _ => &[] }
  }

  // collapse degenerate chains: a node with a single child becomes that child
  pub fn collapse(self) -> Ast<'a> {
    match self {
      Ast::Node { mut children, label, prod } => {
        if children.len() == 1 {
          children.pop().unwrap().collapse()
        } else {
          Ast::Node { label, prod, children: children.into_iter().map(Ast::collapse).collect() }
        }
      }
      other => other,
    }
  }

  // internal labels in preorder; mirrors the reduce order of the trace reversed
  pub fn preorder_labels(&self) -> Vec<&'a str> {
    let mut out = Vec::new();
    fn walk<'a>(ast: &Ast<'a>, out: &mut Vec<&'a str>) {
      if let Ast::Node { label, children, .. } = ast {
        out.push(label);
        for c in children { walk(c, out); }
      }
    }
    walk(self, &mut out);
    out
  }

  pub fn show(&self) -> String {
    let mut s = String::new();
    self.write(&mut s, 0);
    s
  }

  fn write(&self, s: &mut String, depth: usize) {
    for _ in 0..depth { s.push_str("  "); }
    match self {
      Ast::Leaf { kind, lexeme, .. } => { let _ = writeln!(s, "{} {:?}", kind.name(), lexeme); }
      Ast::Error => { s.push_str("<error>\n"); }
      Ast::Node { label, children, .. } => {
        let _ = writeln!(s, "{}", label);
        for c in children { c.write(s, depth + 1); }
      }
    }
  }
}
