use serde::Deserialize;
use typed_arena::Arena;
use crate::{HashMap, SmallVec, parse_arrow_prod};
use std::fmt;
use std::ops::Range;

pub type ProdVec = SmallVec<[u32; 4]>;

#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Assoc { Left, Right, NoAssoc }

// terminal id is distributed in [0, terms.len())
// non-terminal id is distributed in [terms.len(), terms.len() + nt.len())
// there are 3 fixed terminal ids: EPS_IDX, EOF_IDX, ERR_IDX
pub const EPS: &str = "ε";
pub const EOF: &str = "$";
pub const ERR: &str = "_Err";
pub const EPS_IDX: usize = 0;
pub const EOF_IDX: usize = 1;
pub const ERR_IDX: usize = 2;

#[derive(Debug, Eq, PartialEq)]
pub enum GrammarError {
  Empty,
  Malformed { line: u32, text: String },
  ReservedName { line: u32, name: String },
  UndefinedSymbol { line: u32, name: String },
  UndefinedStart { name: String },
}

impl fmt::Display for GrammarError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      GrammarError::Empty => write!(f, "grammar must have at least one production rule"),
      GrammarError::Malformed { line, text } =>
        write!(f, "invalid production at line {}: \"{}\", expect form of \"lhs -> rhs1 rhs2 ...\"", line, text),
      GrammarError::ReservedName { line, name } =>
        write!(f, "reserved symbol name at line {}: \"{}\"", line, name),
      GrammarError::UndefinedSymbol { line, name } =>
        write!(f, "production rhs contains undefined token at line {}: \"{}\"", line, name),
      GrammarError::UndefinedStart { name } => write!(f, "start symbol \"{}\" has no production", name),
    }
  }
}

impl std::error::Error for GrammarError {}

// one priority row assigns the same precedence level to all its terminals
#[derive(Clone)]
#[derive(Debug)]
pub struct PriorityRow<'a> {
  pub assoc: Assoc,
  pub terms: Vec<&'a str>,
}

#[derive(Debug)]
pub struct RawProduction<'a> {
  pub lhs: &'a str,
  // one vec per alternative; an empty alternative is an ε-production
  pub rhs: Vec<Vec<&'a str>>,
  pub line: u32,
}

// the unchecked form of a grammar; `extend` turns it into the id-based `Grammar`
// and appends the augmented start production
#[derive(Debug)]
pub struct RawGrammar<'a> {
  pub start: Option<&'a str>,
  pub priority: Vec<PriorityRow<'a>>,
  // terminals declared up front (by a config's lexical table); empty means
  // "infer": every rhs symbol that is not a lhs head is a terminal
  pub declared_terms: Vec<&'a str>,
  pub production: Vec<RawProduction<'a>>,
}

#[derive(Debug)]
pub struct Term<'a> {
  pub name: &'a str,
  pub pri_assoc: Option<(u32, Assoc)>,
}

#[derive(Debug)]
pub struct NonTerm<'a> {
  pub name: &'a str,
  // starting index in `prod`, all prods until next nt's `start_idx` (or end) belong to this nt
  pub start_idx: usize,
}

#[derive(Clone, Debug)]
pub struct Prod {
  pub rhs: ProdVec,
  // index into `Grammar::nt`
  pub lhs: u32,
  // index in `prod`
  pub id: u32,
  pub pri: Option<u32>,
}

#[derive(Debug)]
pub struct Grammar<'a> {
  pub terms: Vec<Term<'a>>,
  pub nt: Vec<NonTerm<'a>>,
  pub prod: Vec<Prod>,
}

fn reserved(name: &str) -> bool {
  name == EPS || name == EOF || name.starts_with('_')
}

impl<'a> RawGrammar<'a> {
  // parse the plain text form: one head per line, `|` separates alternatives,
  // `ε` or an empty alternative is the empty production, `#` starts a comment
  pub fn from_text(text: &'a str) -> Result<RawGrammar<'a>, GrammarError> {
    let mut production: Vec<RawProduction> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
      let line_no = idx as u32 + 1;
      let line = line.trim();
      if line.is_empty() || line.starts_with('#') { continue; }
      let (lhs, rhs) = parse_arrow_prod(line)
        .ok_or_else(|| GrammarError::Malformed { line: line_no, text: line.to_owned() })?;
      if reserved(lhs) {
        return Err(GrammarError::ReservedName { line: line_no, name: lhs.to_owned() });
      }
      let mut alts = vec![Vec::new()];
      for &sym in &rhs {
        if sym == "|" {
          alts.push(Vec::new());
        } else if sym == EPS {
          // the alternative stays empty
        } else {
          if sym == EOF || sym.starts_with('_') {
            return Err(GrammarError::ReservedName { line: line_no, name: sym.to_owned() });
          }
          alts.last_mut().unwrap().push(sym);
        }
      }
      // merge with an earlier head of the same name, so "A -> x" lines may repeat
      match production.iter_mut().find(|p| p.lhs == lhs) {
        Some(p) => p.rhs.extend(alts),
        None => production.push(RawProduction { lhs, rhs: alts, line: line_no }),
      }
    }
    Ok(RawGrammar { start: None, priority: Vec::new(), declared_terms: Vec::new(), production })
  }

  // will add a production _Start -> Start; its name lives in `arena`
  // so the result can keep borrowing uniformly
  pub fn extend(&self, arena: &'a Arena<u8>) -> Result<Grammar<'a>, GrammarError> {
    if self.production.is_empty() { return Err(GrammarError::Empty); }
    let start = match self.start {
      Some(s) => {
        if !self.production.iter().any(|p| p.lhs == s) {
          return Err(GrammarError::UndefinedStart { name: s.to_owned() });
        }
        s
      }
      None => self.production[0].lhs,
    };

    let mut terms = vec![
      Term { name: EPS, pri_assoc: None },
      Term { name: EOF, pri_assoc: None },
      Term { name: ERR, pri_assoc: None },
    ];
    let mut term2id = HashMap::new();
    term2id.insert(EPS, 0u32);
    term2id.insert(EOF, 1);
    term2id.insert(ERR, 2);
    for (pri, row) in self.priority.iter().enumerate() {
      for &name in &row.terms {
        term2id.entry(name).or_insert_with(|| {
          let id = terms.len() as u32;
          terms.push(Term { name, pri_assoc: Some((pri as u32, row.assoc)) });
          id
        });
      }
    }
    for &name in &self.declared_terms {
      term2id.entry(name).or_insert_with(|| {
        let id = terms.len() as u32;
        terms.push(Term { name, pri_assoc: None });
        id
      });
    }

    // 2 pass scan, so a non-term can be used before declared
    let mut nt = Vec::new();
    let mut nt2id = HashMap::new();
    for p in &self.production {
      nt2id.entry(p.lhs).or_insert_with(|| {
        let id = nt.len() as u32;
        nt.push(NonTerm { name: p.lhs, start_idx: 0 });
        id
      });
    }
    let aug = &*arena.alloc_str(&format!("_{}", start));
    let aug_id = nt.len() as u32;
    nt.push(NonTerm { name: aug, start_idx: 0 });
    nt2id.insert(aug, aug_id);

    // terminal ids must be final before any nt id is encoded, since nt ids are
    // offset by terms.len(); collect inferred terminals first
    if self.declared_terms.is_empty() {
      for raw in &self.production {
        for alt in &raw.rhs {
          for &sym in alt {
            if !nt2id.contains_key(sym) {
              term2id.entry(sym).or_insert_with(|| {
                let id = terms.len() as u32;
                terms.push(Term { name: sym, pri_assoc: None });
                id
              });
            }
          }
        }
      }
    }

    let nt_base = terms.len() as u32;
    let mut prod = vec![Vec::new(); nt.len()];
    for raw in &self.production {
      let lhs = nt2id[raw.lhs];
      for alt in &raw.rhs {
        let mut rhs = ProdVec::new();
        let mut pri = None;
        for &sym in alt {
          match (nt2id.get(sym), term2id.get(sym)) {
            (Some(&n), _) => rhs.push(n + nt_base),
            (_, Some(&t)) => {
              rhs.push(t);
              pri = terms[t as usize].pri_assoc.map(|(p, _)| p);
            }
            _ => return Err(GrammarError::UndefinedSymbol { line: raw.line, name: sym.to_owned() }),
          }
        }
        prod[lhs as usize].push(Prod { rhs, lhs, id: 0, pri });
      }
    }
    prod[aug_id as usize].push(Prod {
      rhs: {
        let mut v = ProdVec::new();
        v.push(nt2id[start] + nt_base);
        v
      },
      lhs: aug_id,
      id: 0,
      pri: None,
    });

    let mut start_idx = 0;
    for (nt, prods) in nt.iter_mut().zip(prod.iter()) {
      nt.start_idx = start_idx;
      start_idx += prods.len();
    }
    let mut prod = prod.into_iter().flatten().collect::<Vec<_>>();
    for (idx, p) in prod.iter_mut().enumerate() { p.id = idx as u32; }
    Ok(Grammar { terms, nt, prod })
  }
}

impl<'a> Grammar<'a> {
  pub fn from_text(text: &'a str, arena: &'a Arena<u8>) -> Result<Grammar<'a>, GrammarError> {
    RawGrammar::from_text(text)?.extend(arena)
  }

  // (start nt index, start production)
  pub fn start(&self) -> (u32, &Prod) {
    (self.nt.len() as u32 - 1, self.prod.last().unwrap())
  }

  pub fn token_num(&self) -> usize { self.terms.len() + self.nt.len() }

  // try to convert a general id (in [0, token_num())) to an index in `nt`
  pub fn as_nt(&self, ch: u32) -> Option<usize> { (ch as usize).checked_sub(self.terms.len()) }

  pub fn nt_range(&self) -> Range<usize> { self.terms.len()..self.token_num() }

  pub fn get_prod(&self, lhs: usize) -> &[Prod] {
    let start = self.nt[lhs].start_idx;
    let end = self.nt.get(lhs + 1).map(|x| x.start_idx).unwrap_or(self.prod.len());
    &self.prod[start..end]
  }

  pub fn term_id(&self, name: &str) -> Option<u32> {
    self.terms.iter().position(|t| t.name == name).map(|x| x as u32)
  }

  pub fn show_token(&self, id: usize) -> &'a str {
    self.terms.get(id).map(|x| x.name).unwrap_or_else(|| self.nt[id - self.terms.len()].name)
  }

  pub fn show_prod(&self, id: usize, dot: Option<u32>) -> String {
    let prod = &self.prod[id];
    let mut s = format!("{} ->", self.nt[prod.lhs as usize].name);
    for (idx, &rhs) in prod.rhs.iter().enumerate() {
      s.push(if Some(idx as u32) == dot { '.' } else { ' ' });
      s += self.show_token(rhs as usize);
    }
    if Some(prod.rhs.len() as u32) == dot { s.push('.'); }
    s
  }
}
