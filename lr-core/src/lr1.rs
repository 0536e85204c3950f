use common::{BitSet, HashMap, grammar::{Grammar, EOF_IDX}};
use tracing::debug;
use std::collections::VecDeque;
use crate::{FirstFollow, Lr0Item, Lr1Item, Lr1Closure, Lr1Fsm, Lr1Node};

pub struct Lr1Ctx(pub FirstFollow);

impl Lr1Ctx {
  pub fn new(g: &Grammar) -> Lr1Ctx { Lr1Ctx(FirstFollow::new(g)) }

  fn go<'a>(&self, state: &Lr1Closure<'a>, mov: u32, g: &'a Grammar) -> Lr1Closure<'a> {
    let mut new_items = HashMap::new();
    for Lr1Item { lr0, lookahead } in state {
      if lr0.dot as usize >= lr0.prod.len() { // dot is after the last ch
        continue;
      }
      if lr0.prod[lr0.dot as usize] == mov {
        let new_item = Lr0Item { prod: lr0.prod, prod_id: lr0.prod_id, dot: lr0.dot + 1 };
        match new_items.get_mut(&new_item) {
          None => { new_items.insert(new_item, lookahead.clone()); }
          Some(old) => { old.or(lookahead); }
        }
      }
    }
    self.closure(new_items, g)
  }

  pub fn closure<'a>(&self, mut items: HashMap<Lr0Item<'a>, BitSet>, g: &'a Grammar) -> Lr1Closure<'a> {
    let mut q = items.clone().into_iter().collect::<VecDeque<_>>();
    while let Some((item, lookahead)) = q.pop_front() {
      if item.dot as usize >= item.prod.len() { // dot is after the last ch
        continue;
      }
      let b = item.prod[item.dot as usize];
      let beta = &item.prod[item.dot as usize + 1..];
      if let Some(n) = g.as_nt(b) {
        let first = self.0.first_with(beta, &lookahead);
        for p in g.get_prod(n) {
          let new_item = Lr0Item { prod: p.rhs.as_slice(), prod_id: p.id, dot: 0 };
          match items.get_mut(&new_item) {
            None => {
              items.insert(new_item, first.clone());
              q.push_back((new_item, first.clone()));
            }
            Some(old) => {
              // if the lookahead changed, the item re-enters the queue
              if old.or(&first) {
                q.push_back((new_item, first.clone()));
              }
            }
          }
        }
      }
    }
    let mut closure = items.into_iter()
      .map(|(lr0, lookahead)| Lr1Item { lr0, lookahead })
      .collect::<Vec<_>>();
    // sort it, so that vec equality implies state equality
    closure.sort_unstable_by(|l, r| l.lr0.cmp(&r.lr0));
    closure
  }
}

pub fn work<'a>(g: &'a Grammar) -> Lr1Fsm<'a> {
  let ctx = Lr1Ctx::new(g);
  let token_num = g.token_num() as u32;
  let mut ss = HashMap::new();
  let init = ctx.closure({
    let start = g.start().1;
    let item = Lr0Item { prod: start.rhs.as_slice(), prod_id: start.id, dot: 0 };
    let mut lookahead = BitSet::new(g.terms.len() as u32);
    lookahead.set(EOF_IDX as u32);
    let mut init = HashMap::new();
    init.insert(item, lookahead);
    init
  }, g);
  let mut q = VecDeque::new();
  let mut result = Vec::new();
  ss.insert(init.clone(), 0u32);
  q.push_back(init);
  while let Some(cur) = q.pop_front() {
    let mut link = HashMap::new();
    for mov in 0..token_num {
      let ns = ctx.go(&cur, mov, g);
      if !ns.is_empty() {
        let id = match ss.get(&ns) {
          None => {
            let id = ss.len() as u32;
            ss.insert(ns.clone(), id);
            q.push_back(ns);
            id
          }
          Some(id) => *id,
        };
        link.insert(mov, id);
      }
    }
    result.push(Lr1Node { closure: cur, link });
  }
  debug!(states = result.len(), "built lr(1) fsm");
  result
}
