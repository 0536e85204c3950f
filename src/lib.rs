pub mod ast;
pub mod config;
pub mod diag;
pub mod driver;
pub mod ir;
pub mod presets;
pub mod symbol;

use typed_arena::Arena;
use common::grammar::{Grammar, GrammarError, PriorityRow, RawGrammar};
use lex_core::{Lexer, LexError, Token};
use lr_core::{lr0, lr1, mk_table, Conflict, FirstFollow, Table};
use crate::ast::Ast;
use crate::diag::{Diag, Stage};
use crate::driver::{ParseOpts, ParseResult};
use crate::ir::{IrGen, Quad};
use crate::symbol::{Symbol, SymbolTable};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Algo {
  Slr1,
  Lr1,
}

pub struct AnalyzeOpts {
  pub algo: Algo,
  pub collapse_ast: bool,
}

impl Default for AnalyzeOpts {
  fn default() -> AnalyzeOpts { AnalyzeOpts { algo: Algo::Slr1, collapse_ast: true } }
}

// everything the pipeline consumes; all borrowed so the caller decides storage
pub struct Inputs<'a> {
  pub source: &'a str,
  pub rules: &'a str,
  pub keywords: Vec<&'a str>,
  pub grammar: &'a str,
  pub start: Option<&'a str>,
  pub priority: Vec<PriorityRow<'a>>,
}

impl<'a> Inputs<'a> {
  pub fn new(source: &'a str, rules: &'a str, grammar: &'a str) -> Inputs<'a> {
    Inputs { source, rules, keywords: Vec::new(), grammar, start: None, priority: Vec::new() }
  }

  pub fn preset(source: &'a str, preset: &'static presets::Preset) -> Inputs<'a> {
    Inputs {
      source,
      rules: preset.rules,
      keywords: preset.keywords.to_vec(),
      grammar: preset.grammar,
      start: None,
      priority: Vec::new(),
    }
  }
}

// a render-friendly image of one automaton state, owned so the analysis can
// outlive the item sets it was built from
pub struct StateSummary {
  pub id: u32,
  pub items: Vec<String>,
  pub links: Vec<(String, u32)>,
}

pub struct Analysis<'a> {
  pub tokens: Vec<Token<'a>>,
  pub lex_errors: Vec<LexError>,
  pub grammar: Option<Grammar<'a>>,
  pub first_follow: Option<FirstFollow>,
  pub states: Vec<StateSummary>,
  pub table: Option<Table>,
  pub conflicts: Vec<Conflict>,
  pub parse: Option<ParseResult<'a>>,
  pub quads: Vec<Quad>,
  pub symbols: SymbolTable<'a>,
  pub diags: Vec<Diag>,
}

// the placeholder semantic pass: record declarations (`var x : integer`) and
// implicitly declared assignment targets, first declaration wins
fn collect_symbols<'a>(ast: &Ast<'a>, st: &mut SymbolTable<'a>) {
  if let Ast::Node { children, .. } = ast {
    match children.first().and_then(Ast::leaf_lexeme) {
      Some("var") => {
        let mut leaves = children.iter().skip(1).filter_map(|c| match c {
          Ast::Leaf { lexeme, line, .. } => Some((*lexeme, *line)),
          _ => None,
        }).filter(|(s, _)| !matches!(*s, ":" | ";" | ","));
        if let Some((name, line)) = leaves.next() {
          let ty = leaves.next().map(|(s, _)| s).unwrap_or("?");
          let _ = st.declare(Symbol { name, ty, line });
        }
        return;
      }
      _ => {}
    }
    if children.len() >= 2 && matches!(children[1].leaf_lexeme(), Some(":=") | Some("=")) {
      if let Ast::Leaf { lexeme, line, .. } = &children[0] {
        if st.lookup(lexeme).is_none() {
          let _ = st.declare(Symbol { name: lexeme, ty: "?", line: *line });
        }
      }
    }
    for c in children {
      collect_symbols(c, st);
    }
  }
}

fn grammar_diag(e: &GrammarError) -> Diag {
  let line = match e {
    GrammarError::Malformed { line, .. }
    | GrammarError::ReservedName { line, .. }
    | GrammarError::UndefinedSymbol { line, .. } => *line,
    _ => 0,
  };
  Diag::new(Stage::Grammar, line, if line == 0 { 0 } else { 1 }, e.to_string())
}

fn lr0_summary(fsm: &lr_core::Lr0Fsm, g: &Grammar) -> Vec<StateSummary> {
  fsm.iter().enumerate().map(|(id, node)| {
    let items = node.closure.iter().map(|it| g.show_prod(it.prod_id as usize, Some(it.dot))).collect();
    let mut links = node.link.iter().map(|(&sym, &to)| (sym, to)).collect::<Vec<_>>();
    links.sort_unstable();
    StateSummary {
      id: id as u32,
      items,
      links: links.into_iter().map(|(sym, to)| (g.show_token(sym as usize).to_owned(), to)).collect(),
    }
  }).collect()
}

fn lr1_summary(fsm: &lr_core::Lr1Fsm, g: &Grammar) -> Vec<StateSummary> {
  fsm.iter().enumerate().map(|(id, node)| {
    let items = node.closure.iter().map(|it| {
      let mut las = Vec::new();
      it.lookahead.ones(|t| las.push(g.show_token(t as usize)));
      format!("{}, {}", g.show_prod(it.lr0.prod_id as usize, Some(it.lr0.dot)), las.join("/"))
    }).collect();
    let mut links = node.link.iter().map(|(&sym, &to)| (sym, to)).collect::<Vec<_>>();
    links.sort_unstable();
    StateSummary {
      id: id as u32,
      items,
      links: links.into_iter().map(|(sym, to)| (g.show_token(sym as usize).to_owned(), to)).collect(),
    }
  }).collect()
}

// the whole front-end: scan, load the grammar, build the tables, parse with
// trace and recovery, build the tree, emit quadruples. input errors surface as
// diagnostics on the result, never as process aborts.
pub fn analyze<'a>(inputs: &Inputs<'a>, arena: &'a Arena<u8>, opts: &AnalyzeOpts) -> Analysis<'a> {
  let mut diags = Vec::new();

  let (lexer, rule_diags) = Lexer::from_rules_text(inputs.rules);
  for d in &rule_diags {
    let line = match d {
      lex_core::RuleDiag::Malformed { line } | lex_core::RuleDiag::Regex { line, .. } => *line,
    };
    diags.push(Diag::new(Stage::Rules, line, 1, d.to_string()));
  }
  let lexer = lexer.map(|l| l.with_keywords(inputs.keywords.iter().copied()));
  let (tokens, lex_errors) = match &lexer {
    Some(l) => l.scan(inputs.source),
    None => (Vec::new(), Vec::new()),
  };
  for e in &lex_errors {
    diags.push(Diag::new(Stage::Lex, e.line, e.col, e.to_string()));
  }

  let grammar = RawGrammar::from_text(inputs.grammar).and_then(|mut raw| {
    if inputs.start.is_some() { raw.start = inputs.start; }
    raw.priority = inputs.priority.clone();
    raw.extend(arena)
  });
  let g = match grammar {
    Ok(g) => g,
    Err(e) => {
      diags.push(grammar_diag(&e));
      return Analysis {
        tokens, lex_errors, grammar: None, first_follow: None, states: Vec::new(),
        table: None, conflicts: Vec::new(), parse: None, quads: Vec::new(),
        symbols: SymbolTable::new(), diags: diag::merge(diags),
      };
    }
  };

  let ff = FirstFollow::new(&g);
  let (mut table, states) = match opts.algo {
    Algo::Slr1 => {
      let fsm = lr0::work(&g);
      (mk_table::slr(&fsm, &ff, &g), lr0_summary(&fsm, &g))
    }
    Algo::Lr1 => {
      let fsm = lr1::work(&g);
      (mk_table::lr1(&fsm, &g), lr1_summary(&fsm, &g))
    }
  };
  let conflicts = mk_table::solve(&mut table, &g);
  for c in &conflicts {
    diags.push(Diag::new(Stage::Table, 0, 0, c.show(&g)));
  }

  let parse = driver::parse(&g, &table, &ff, &tokens, &ParseOpts { collapse_ast: opts.collapse_ast });
  for e in &parse.errors {
    diags.push(Diag::new(Stage::Parse, e.line, e.col, e.to_string()));
  }
  let quads = parse.ast.as_ref().map(IrGen::gen).unwrap_or_default();
  let mut symbols = SymbolTable::new();
  if let Some(ast) = &parse.ast {
    collect_symbols(ast, &mut symbols);
  }

  Analysis {
    tokens, lex_errors,
    grammar: Some(g),
    first_follow: Some(ff),
    states,
    table: Some(table),
    conflicts,
    parse: Some(parse),
    quads,
    symbols,
    diags: diag::merge(diags),
  }
}

impl<'a> Analysis<'a> {
  // a grammar "is SLR(1)" exactly when construction reported no conflict
  pub fn conflict_free(&self) -> bool { self.conflicts.is_empty() }

  pub fn accepted(&self) -> bool {
    self.parse.as_ref().map_or(false, |p| p.accepted)
  }

  pub fn show_trace(&self) -> String {
    let (g, p) = match (&self.grammar, &self.parse) {
      (Some(g), Some(p)) => (g, p),
      _ => return String::new(),
    };
    p.trace.iter().map(|s| s.show(g)).collect::<Vec<_>>().join("\n")
  }

  pub fn show_sets(&self) -> String {
    let (g, ff) = match (&self.grammar, &self.first_follow) {
      (Some(g), Some(ff)) => (g, ff),
      _ => return String::new(),
    };
    let mut out = Vec::new();
    for (i, nt) in g.nt.iter().enumerate() {
      let mut first = Vec::new();
      ff.nt_first[i].ones(|t| first.push(g.show_token(t as usize)));
      out.push(format!("FIRST({}) = {{ {} }}", nt.name, first.join(", ")));
    }
    for (i, nt) in g.nt.iter().enumerate() {
      let mut follow = Vec::new();
      ff.nt_follow[i].ones(|t| follow.push(g.show_token(t as usize)));
      out.push(format!("FOLLOW({}) = {{ {} }}", nt.name, follow.join(", ")));
    }
    out.join("\n")
  }
}
