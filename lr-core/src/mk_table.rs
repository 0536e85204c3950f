use common::{HashMap, SmallVec, smallvec, grammar::{Assoc, Grammar, EOF_IDX}};
use std::cmp::Ordering::{Less, Greater, Equal};
use std::fmt::Write;
use crate::{FirstFollow, Lr0Fsm, Lr0Node, Lr1Fsm, Lr1Node, Lr1Item};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Act {
  Acc,
  Shift(u32),
  Reduce(u32),
}

// in most cases there is no conflict, so a small vec of inline capacity 1
pub type Acts = SmallVec<[Act; 1]>;

#[derive(Default)]
pub struct TableEntry {
  pub act: HashMap<u32, Acts>,
  pub goto: HashMap<u32, u32>,
}

pub type Table = Vec<TableEntry>;

#[derive(Debug)]
pub enum ConflictKind {
  SR { s: u32, r: u32 },
  RR { r1: u32, r2: u32 },
  Many(Acts),
}

#[derive(Debug)]
pub struct Conflict {
  pub kind: ConflictKind,
  pub state: u32,
  pub ch: u32,
}

impl Conflict {
  pub fn show(&self, g: &Grammar) -> String {
    let ch = g.show_token(self.ch as usize);
    match self.kind {
      ConflictKind::SR { s, r } =>
        format!("shift-reduce conflict at state {} when faced with token \"{}\", it can either shift {}, or reduce {}(\"{}\")",
                self.state, ch, s, r, g.show_prod(r as usize, None)),
      ConflictKind::RR { r1, r2 } =>
        format!("reduce-reduce conflict at state {} when faced with token \"{}\", it can either reduce {}(\"{}\"), or reduce {}(\"{}\")",
                self.state, ch, r1, g.show_prod(r1 as usize, None), r2, g.show_prod(r2 as usize, None)),
      ConflictKind::Many(ref acts) => {
        let mut msg = format!("too many conflicts at state {} when faced with token \"{}\":\n", self.state, ch);
        for a in acts {
          match *a {
            Act::Shift(s) => { let _ = writeln!(msg, "  - shift {}", s); }
            Act::Reduce(r) => { let _ = writeln!(msg, "  - reduce {}(\"{}\")", r, g.show_prod(r as usize, None)); }
            Act::Acc => {}
          }
        }
        msg
      }
    }
  }
}

fn links(link: &HashMap<u32, u32>, g: &Grammar) -> TableEntry {
  let mut entry = TableEntry::default();
  for (&k, &v) in link {
    if g.as_nt(k).is_some() {
      entry.goto.insert(k, v);
    } else {
      entry.act.insert(k, smallvec![Act::Shift(v)]);
    }
  }
  entry
}

// SLR(1): a completed item A -> α. reduces on every terminal in FOLLOW(A)
pub fn slr<'a>(lr0: &Lr0Fsm<'a>, ff: &FirstFollow, g: &'a Grammar) -> Table {
  let start_id = g.start().1.id;
  let mut table = Vec::with_capacity(lr0.len());
  for Lr0Node { closure, link } in lr0 {
    let mut entry = links(link, g);
    for item in closure {
      if item.dot == item.prod.len() as u32 {
        if item.prod_id == start_id {
          entry.act.insert(EOF_IDX as u32, smallvec![Act::Acc]);
        } else {
          let lhs = g.prod[item.prod_id as usize].lhs;
          ff.nt_follow[lhs as usize].ones(|t| {
            // maybe a conflict here
            entry.act.entry(t).or_insert_with(SmallVec::new).push(Act::Reduce(item.prod_id));
          });
        }
      }
    }
    table.push(entry);
  }
  table
}

// canonical LR(1): a completed item reduces only on its lookaheads
pub fn lr1<'a>(lr1: &Lr1Fsm<'a>, g: &'a Grammar) -> Table {
  let start_id = g.start().1.id;
  let mut table = Vec::with_capacity(lr1.len());
  for Lr1Node { closure, link } in lr1 {
    let mut entry = links(link, g);
    for Lr1Item { lr0, lookahead } in closure {
      if lr0.dot == lr0.prod.len() as u32 {
        if lr0.prod_id == start_id && lookahead.test(EOF_IDX as u32) {
          entry.act.insert(EOF_IDX as u32, smallvec![Act::Acc]);
        } else {
          lookahead.ones(|t| {
            entry.act.entry(t).or_insert_with(SmallVec::new).push(Act::Reduce(lr0.prod_id));
          });
        }
      }
    }
    table.push(entry);
  }
  table
}

// `solve` resolves every multi-entry cell and places the selected act at [0]:
// by precedence and associativity when both sides carry one, otherwise by the
// default rules (shift over reduce, lower production id over higher), in which
// case a conflict is reported; reported conflicts keep the losing act behind
// the winner so a table printer can still show it
pub fn solve(t: &mut Table, g: &Grammar) -> Vec<Conflict> {
  use Act::{Reduce, Shift};
  let mut reports = Vec::new();
  for (idx, entry) in t.iter_mut().enumerate() {
    for (&ch, acts) in entry.act.iter_mut() {
      match acts.as_slice() {
        [] | [_] => {}
        &[a0, a1] => match (a0, a1) {
          // accept never yields: a stray reduce into the accept cell is only
          // possible through a cyclic unit production, report and keep accept
          (Act::Acc, _) | (_, Act::Acc) => {
            reports.push(Conflict { kind: ConflictKind::Many(acts.clone()), state: idx as u32, ch });
            *acts = smallvec![Act::Acc];
          }
          (Reduce(r1), Reduce(r2)) =>
            *acts = match (g.prod[r1 as usize].pri, g.prod[r2 as usize].pri) {
              (Some(p1), Some(p2)) if p1 != p2 => smallvec![Reduce(if p1 < p2 { r2 } else { r1 })],
              _ => {
                reports.push(Conflict { kind: ConflictKind::RR { r1, r2 }, state: idx as u32, ch });
                smallvec![Reduce(r1.min(r2)), Reduce(r1.max(r2))]
              }
            },
          (Reduce(r), Shift(s)) | (Shift(s), Reduce(r)) =>
            *acts = match (g.prod[r as usize].pri, g.terms[ch as usize].pri_assoc) {
              (Some(pp), Some((cp, ca))) => match pp.cmp(&cp) {
                Less => smallvec![Shift(s)],
                Greater => smallvec![Reduce(r)],
                Equal => match ca {
                  Assoc::Left => smallvec![Reduce(r)],
                  Assoc::Right => smallvec![Shift(s)],
                  Assoc::NoAssoc => smallvec![],
                }
              },
              _ => {
                reports.push(Conflict { kind: ConflictKind::SR { s, r }, state: idx as u32, ch });
                smallvec![Shift(s), Reduce(r)]
              }
            },
          _ => unreachable!("there should be a bug in lr"),
        },
        _ => reports.push(Conflict { kind: ConflictKind::Many(acts.clone()), state: idx as u32, ch }),
      }
    }
  }
  // cells hash in arbitrary order, the report list should not
  reports.sort_by_key(|c| (c.state, c.ch));
  reports
}
