use common::{HashMap, grammar::{Grammar, EOF_IDX, ERR_IDX}};
use lex_core::{Token, TokenKind};
use lr_core::{Act, Table, FirstFollow};
use crate::ast::Ast;

pub struct ParseOpts {
  pub collapse_ast: bool,
}

impl Default for ParseOpts {
  fn default() -> ParseOpts { ParseOpts { collapse_ast: true } }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StepAct {
  Shift(u32),
  Reduce(u32),
  Accept,
  Error,
}

// one entry per interpreter step; everything needed to replay the parse
#[derive(Debug, Clone)]
pub struct Step {
  pub idx: u32,
  pub states: Vec<u32>,
  // stack symbols above the bottom sentinel
  pub symbols: Vec<u32>,
  // index of the current token in the mapped input
  pub input_at: usize,
  // space-joined terminal names of the remaining input
  pub rest: String,
  pub act: StepAct,
}

impl Step {
  pub fn show(&self, g: &Grammar) -> String {
    let states = self.states.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ");
    let symbols = self.symbols.iter().map(|&s| g.show_token(s as usize)).collect::<Vec<_>>().join(" ");
    let act = match self.act {
      StepAct::Shift(s) => format!("shift {}", s),
      StepAct::Reduce(r) => format!("reduce by {}", g.show_prod(r as usize, None)),
      StepAct::Accept => "accept".to_owned(),
      StepAct::Error => "error".to_owned(),
    };
    format!("{:<4} [{}] [{}] [{}] {}", self.idx, states, symbols, self.rest, act)
  }
}

#[derive(Debug, Clone)]
pub struct ParseError<'a> {
  pub line: u32,
  pub col: u32,
  pub lexeme: &'a str,
  pub expected: Vec<&'a str>,
  pub recovered: bool,
}

impl std::fmt::Display for ParseError<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "unexpected token {:?} at {}:{}, expected one of [{}]{}",
           self.lexeme, self.line, self.col, self.expected.join(", "),
           if self.recovered { ", recovered" } else { ", gave up" })
  }
}

pub struct ParseResult<'a> {
  pub trace: Vec<Step>,
  pub ast: Option<Ast<'a>>,
  pub errors: Vec<ParseError<'a>>,
  pub accepted: bool,
}

// the original tool feeds the parser grammar-symbol names: identifiers become
// `id`, numeric literals become `num`, everything else parses as its lexeme
fn map_token<'a>(g: &Grammar<'a>, term2id: &HashMap<&'a str, u32>, t: &Token<'a>) -> u32 {
  let name = match t.kind {
    TokenKind::Eof => return EOF_IDX as u32,
    TokenKind::Error => return ERR_IDX as u32,
    TokenKind::Identifier => "id",
    TokenKind::IntLit | TokenKind::FloatLit => "num",
    _ => if t.lexeme.is_empty() { t.kind.name() } else { t.lexeme },
  };
  match term2id.get(name) {
    Some(&id) => id,
    // a toy grammar may spell a terminal exactly like the lexeme
    None => term2id.get(t.lexeme).copied().unwrap_or(ERR_IDX as u32),
  }
}

pub fn parse<'a>(g: &Grammar<'a>, table: &Table, ff: &FirstFollow, tokens: &[Token<'a>],
                 opts: &ParseOpts) -> ParseResult<'a> {
  let term2id = g.terms.iter().enumerate().map(|(i, t)| (t.name, i as u32)).collect::<HashMap<_, _>>();
  let mut toks = tokens.iter()
    .filter(|t| !t.kind.is_trivia())
    .map(|t| (map_token(g, &term2id, t), *t))
    .collect::<Vec<_>>();
  if toks.last().map(|&(id, _)| id) != Some(EOF_IDX as u32) {
    let (line, col) = toks.last().map(|(_, t)| (t.line, t.col)).unwrap_or((1, 1));
    toks.push((EOF_IDX as u32, Token { kind: TokenKind::Eof, lexeme: "", line, col }));
  }

  // bottom frame: state 0 with the end-of-input sentinel symbol
  let mut stack: Vec<(u32, u32, Option<Ast<'a>>)> = vec![(0, EOF_IDX as u32, None)];
  let mut trace: Vec<Step> = Vec::new();
  let mut errors: Vec<ParseError<'a>> = Vec::new();
  let mut pos = 0usize;
  let mut last_err_pos = usize::MAX;
  let (mut accepted, mut ast) = (false, None);

  loop {
    let state = stack.last().unwrap().0;
    let (ta, tok) = toks[pos];
    let act = table[state as usize].act.get(&ta).and_then(|a| a.first()).copied();
    let step_act = match act {
      Some(Act::Shift(s)) => StepAct::Shift(s),
      Some(Act::Reduce(r)) => StepAct::Reduce(r),
      Some(Act::Acc) => StepAct::Accept,
      None => StepAct::Error,
    };
    trace.push(Step {
      idx: trace.len() as u32,
      states: stack.iter().map(|f| f.0).collect(),
      symbols: stack.iter().skip(1).map(|f| f.1).collect(),
      input_at: pos,
      rest: toks[pos..].iter().map(|&(id, _)| g.show_token(id as usize)).collect::<Vec<_>>().join(" "),
      act: step_act,
    });

    match act {
      Some(Act::Shift(s)) => {
        stack.push((s, ta, Some(Ast::leaf(&tok))));
        pos += 1;
      }
      Some(Act::Reduce(r)) => {
        let prod = &g.prod[r as usize];
        let n = prod.rhs.len();
        let children = stack.split_off(stack.len() - n)
          .into_iter()
          .filter_map(|(_, _, node)| node)
          .collect::<Vec<_>>();
        let top = stack.last().unwrap().0;
        let lhs_sym = prod.lhs + g.terms.len() as u32;
        let goto = match table[top as usize].goto.get(&lhs_sym) {
          Some(&gs) => gs,
          None => unreachable!("goto undefined after reduce"),
        };
        let label = g.nt[prod.lhs as usize].name;
        stack.push((goto, lhs_sym, Some(Ast::Node { label, prod: r, children })));
      }
      Some(Act::Acc) => {
        accepted = true;
        ast = stack.pop().and_then(|(_, _, node)| node);
        break;
      }
      None => {
        let mut expected = table[state as usize].act.keys()
          .map(|&t| g.show_token(t as usize))
          .collect::<Vec<_>>();
        expected.sort_unstable();
        errors.push(ParseError { line: tok.line, col: tok.col, lexeme: tok.lexeme, expected, recovered: false });

        // a second failure at the same position skips the offending token first
        if last_err_pos == pos {
          if pos + 1 >= toks.len() { break; }
          pos += 1;
        }
        last_err_pos = pos;

        if recover(g, table, ff, &mut stack, &toks, &mut pos) {
          errors.last_mut().unwrap().recovered = true;
        } else {
          break;
        }
      }
    }
  }

  if opts.collapse_ast {
    ast = ast.map(Ast::collapse);
  }
  ParseResult { trace, ast, errors, accepted }
}

// panic mode: pop to a state with a GOTO on some nonterminal A whose successor
// has an action on a token in FOLLOW(A) at or after the cursor, then resume
// with an error placeholder standing in for A
fn recover<'a>(g: &Grammar<'a>, table: &Table, ff: &FirstFollow,
               stack: &mut Vec<(u32, u32, Option<Ast<'a>>)>, toks: &[(u32, Token<'a>)],
               pos: &mut usize) -> bool {
  for si in (0..stack.len()).rev() {
    let st = stack[si].0;
    let mut gotos = table[st as usize].goto.iter().map(|(&sym, &tgt)| (sym, tgt)).collect::<Vec<_>>();
    gotos.sort_unstable();
    for (sym, tgt) in gotos {
      let nt = sym as usize - g.terms.len();
      for j in *pos..toks.len() {
        let ta = toks[j].0;
        let sync = ta == EOF_IDX as u32 || ff.nt_follow[nt].test(ta);
        if sync && table[tgt as usize].act.get(&ta).map_or(false, |a| !a.is_empty()) {
          stack.truncate(si + 1);
          stack.push((tgt, sym, Some(Ast::Error)));
          *pos = j;
          return true;
        }
      }
    }
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;
  use typed_arena::Arena;
  use lr_core::{lr0, mk_table};

  fn tokens(src: &str) -> Vec<Token> {
    // whitespace-separated symbols, identifiers and numbers classified by shape
    let mut out = Vec::new();
    for (i, s) in src.split_whitespace().enumerate() {
      let kind = if s.chars().all(|c| c.is_ascii_digit()) {
        TokenKind::IntLit
      } else if s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') && s != "id" && s != "num" {
        TokenKind::Identifier
      } else {
        TokenKind::Operator
      };
      out.push(Token { kind, lexeme: s, line: 1, col: i as u32 + 1 });
    }
    out
  }

  fn setup<'a>(text: &'a str, arena: &'a Arena<u8>) -> (Grammar<'a>, Table, FirstFollow) {
    let g = Grammar::from_text(text, arena).unwrap();
    let ff = FirstFollow::new(&g);
    let fsm = lr0::work(&g);
    let mut table = mk_table::slr(&fsm, &ff, &g);
    let _ = mk_table::solve(&mut table, &g);
    (g, table, ff)
  }

  const EXPR: &str = "E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id";

  #[test]
  fn accepts_and_traces() {
    let arena = Arena::new();
    let (g, table, ff) = setup(EXPR, &arena);
    let toks = tokens("x + y * z");
    let res = parse(&g, &table, &ff, &toks, &ParseOpts { collapse_ast: false });
    assert!(res.accepted && res.errors.is_empty());
    // shifts: 5 tokens; reduces: x,y,z to F,T (and chains) plus two binary rules
    let shifts = res.trace.iter().filter(|s| matches!(s.act, StepAct::Shift(_))).count();
    assert_eq!(shifts, 5);
    assert!(matches!(res.trace.last().unwrap().act, StepAct::Accept));
    // the first step starts in state 0 with all input pending
    assert_eq!(res.trace[0].states, vec![0]);
    assert_eq!(res.trace[0].rest, "id + id * id $");
  }

  #[test]
  fn ast_shape_collapsed() {
    let arena = Arena::new();
    let (g, table, ff) = setup(EXPR, &arena);
    let toks = tokens("x + y * z");
    let res = parse(&g, &table, &ff, &toks, &ParseOpts::default());
    let ast = res.ast.unwrap();
    // E [ id "+" T [ id "*" id ] ]
    match &ast {
      Ast::Node { label, children, .. } => {
        assert_eq!(*label, "E");
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].leaf_lexeme(), Some("x"));
        assert_eq!(children[1].leaf_lexeme(), Some("+"));
        match &children[2] {
          Ast::Node { label, children, .. } => {
            assert_eq!(*label, "T");
            assert_eq!(children[0].leaf_lexeme(), Some("y"));
            assert_eq!(children[1].leaf_lexeme(), Some("*"));
            assert_eq!(children[2].leaf_lexeme(), Some("z"));
          }
          other => panic!("expected node, got {:?}", other),
        }
      }
      other => panic!("expected node, got {:?}", other),
    }
  }

  #[test]
  fn ast_faithful_to_reductions() {
    let arena = Arena::new();
    let (g, table, ff) = setup(EXPR, &arena);
    let toks = tokens("x + y");
    let res = parse(&g, &table, &ff, &toks, &ParseOpts { collapse_ast: false });
    let ast = res.ast.unwrap();
    let mut reduce_labels = res.trace.iter().filter_map(|s| match s.act {
      // the accept step cuts the augmented production off the trace
      StepAct::Reduce(r) => Some(g.nt[g.prod[r as usize].lhs as usize].name),
      _ => None,
    }).collect::<Vec<_>>();
    reduce_labels.reverse();
    // reversed reductions give the rightmost derivation: a preorder walk that
    // expands the rightmost child first
    fn preorder_rtl<'a>(ast: &Ast<'a>, out: &mut Vec<&'a str>) {
      if let Ast::Node { label, children, .. } = ast {
        out.push(label);
        for c in children.iter().rev() { preorder_rtl(c, out); }
      }
    }
    let mut labels = Vec::new();
    preorder_rtl(&ast, &mut labels);
    assert_eq!(labels, reduce_labels);
  }

  #[test]
  fn reports_and_recovers() {
    let arena = Arena::new();
    let (g, table, ff) = setup(EXPR, &arena);
    let toks = tokens("x + + y");
    let res = parse(&g, &table, &ff, &toks, &ParseOpts::default());
    assert_eq!(res.errors.len(), 1);
    let err = &res.errors[0];
    assert_eq!(err.lexeme, "+");
    assert!(err.expected.contains(&"id") && err.expected.contains(&"("));
    assert!(err.recovered);
    // the parse still ran to acceptance with an error placeholder in the tree
    assert!(res.accepted);
    fn has_error(ast: &Ast) -> bool {
      matches!(ast, Ast::Error) || ast.children().iter().any(has_error)
    }
    assert!(has_error(res.ast.as_ref().unwrap()));
  }

  #[test]
  fn degenerate_input_recovers_to_placeholder() {
    // nothing matches; panic mode pops to the bottom frame and synchronizes on
    // the start nonterminal at end of input, leaving a bare error placeholder
    let arena = Arena::new();
    let (g, table, ff) = setup("S -> a", &arena);
    let toks = tokens("b");
    let res = parse(&g, &table, &ff, &toks, &ParseOpts::default());
    assert!(!res.errors.is_empty());
    assert_eq!(res.ast, Some(Ast::Error));
  }
}
