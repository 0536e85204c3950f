use common::HashSet;
use tracing::debug;
use std::fmt;
use crate::re::{self, RegexError};
use crate::{nfa, dfa, min};
use crate::dfa::Dfa;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone)]
pub struct Rule<'a> {
  pub re: &'a str,
  pub kind: TokenKind<'a>,
  pub pri: u32,
  pub line: u32,
}

// per-rule failure at lexer-build time; the rule is dropped, the rest of the
// rule set still builds
#[derive(Debug, Eq, PartialEq)]
pub enum RuleDiag {
  Malformed { line: u32 },
  Regex { line: u32, err: RegexError },
}

impl fmt::Display for RuleDiag {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      RuleDiag::Malformed { line } =>
        write!(f, "invalid rule at line {}, expect \"<regex> <token-kind> <priority>\"", line),
      RuleDiag::Regex { line, err } => write!(f, "invalid regex at line {}: {}", line, err),
    }
  }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LexError {
  pub line: u32,
  pub col: u32,
  pub ch: char,
}

impl fmt::Display for LexError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "unrecognized character {:?} at {}:{}", self.ch, self.line, self.col)
  }
}

// split the last whitespace-separated field off, keeping inner spaces of the
// head intact (a regex may contain a literal space)
fn rsplit_field(s: &str) -> Option<(&str, &str)> {
  let idx = s.rfind(|c: char| c.is_whitespace())?;
  let head = s[..idx].trim_end();
  let tail = s[idx..].trim_start();
  if head.is_empty() || tail.is_empty() { None } else { Some((head, tail)) }
}

// one rule per non-empty non-comment line: `<regex> <token-kind> <priority>`,
// the priority field is optional and defaults to 0
pub fn parse_rules(text: &str) -> (Vec<Rule>, Vec<RuleDiag>) {
  let mut rules = Vec::new();
  let mut diags = Vec::new();
  for (idx, raw) in text.lines().enumerate() {
    let line = idx as u32 + 1;
    let s = raw.trim();
    if s.is_empty() || s.starts_with('#') { continue; }
    let parsed = match rsplit_field(s) {
      Some((head, last)) => match last.parse::<u32>() {
        Ok(pri) => rsplit_field(head).map(|(re, kind)| (re, kind, pri)),
        Err(_) => Some((head, last, 0)),
      },
      None => None,
    };
    match parsed {
      Some((re, kind, pri)) => rules.push(Rule { re, kind: TokenKind::from_name(kind), pri, line }),
      None => diags.push(RuleDiag::Malformed { line }),
    }
  }
  (rules, diags)
}

// owns the minimized dfa; accept labels index into `rules`
pub struct Lexer<'a> {
  dfa: Dfa,
  rules: Vec<Rule<'a>>,
  keywords: HashSet<&'a str>,
}

impl<'a> Lexer<'a> {
  // compiles every rule; a rule whose regex fails is reported and dropped
  // instead of failing the whole set. returns None when no rule survives.
  pub fn new(rules: Vec<Rule<'a>>) -> (Option<Lexer<'a>>, Vec<RuleDiag>) {
    let mut diags = Vec::new();
    let mut kept = Vec::new();
    let mut postfix = Vec::new();
    for rule in rules {
      match re::parse(rule.re) {
        Ok(p) => {
          postfix.push(p);
          kept.push(rule);
        }
        Err(err) => diags.push(RuleDiag::Regex { line: rule.line, err }),
      }
    }
    if kept.is_empty() { return (None, diags); }
    let pri = kept.iter().map(|r| r.pri).collect::<Vec<_>>();
    let n = nfa::combine(&postfix);
    let d = dfa::work(&n, &pri);
    let m = min::minimize(&d);
    debug!(rules = kept.len(), nfa = n.nodes.len(), dfa = d.nodes.len(), min = m.nodes.len(), "built lexer");
    (Some(Lexer { dfa: m, rules: kept, keywords: HashSet::new() }), diags)
  }

  pub fn from_rules_text(text: &'a str) -> (Option<Lexer<'a>>, Vec<RuleDiag>) {
    let (rules, mut diags) = parse_rules(text);
    let (lexer, build_diags) = Lexer::new(rules);
    diags.extend(build_diags);
    (lexer, diags)
  }

  // identifiers whose lexeme is listed here are promoted to KEYWORD
  pub fn with_keywords(mut self, kws: impl IntoIterator<Item = &'a str>) -> Lexer<'a> {
    self.keywords.extend(kws);
    self
  }

  pub fn rules(&self) -> &[Rule<'a>] { &self.rules }

  pub fn dfa(&self) -> &Dfa { &self.dfa }

  // longest match with the priority-then-declaration-order tiebreak baked
  // into the dfa accept labels; an unmatched character becomes an ERROR token
  // and scanning resumes at the next character
  pub fn scan(&self, src: &'a str) -> (Vec<Token<'a>>, Vec<LexError>) {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let (mut line, mut col) = (1u32, 1u32);
    let mut p = 0;
    while p < bytes.len() {
      let mut st = 0u32;
      let mut i = p;
      // zero-length accepts are ignored, a token must consume input
      let mut last: Option<(usize, u32)> = None;
      while i < bytes.len() {
        match self.dfa.nodes[st as usize].edges.get(&bytes[i]) {
          Some(&n) => {
            st = n;
            i += 1;
            if let Some(r) = self.dfa.nodes[st as usize].acc { last = Some((i, r)); }
          }
          None => break,
        }
      }
      match last {
        Some((end, r)) => {
          let lexeme = &src[p..end];
          let rule = &self.rules[r as usize];
          let kind = if rule.kind == TokenKind::Identifier && self.keywords.contains(lexeme) {
            TokenKind::Keyword
          } else { rule.kind };
          tokens.push(Token { kind, lexeme, line, col });
          for &b in &bytes[p..end] {
            if b == b'\n' { line += 1; col = 1; } else { col += 1; }
          }
          p = end;
        }
        None => {
          // skip one character, not one byte, so the lexeme stays valid utf-8
          let ch = src[p..].chars().next().unwrap_or('\u{fffd}');
          let w = ch.len_utf8().max(1);
          tokens.push(Token { kind: TokenKind::Error, lexeme: &src[p..p + w], line, col });
          errors.push(LexError { line, col, ch });
          if ch == '\n' { line += 1; col = 1; } else { col += w as u32; }
          p += w;
        }
      }
    }
    tokens.push(Token { kind: TokenKind::Eof, lexeme: "", line, col });
    (tokens, errors)
  }
}
