use common::{HashMap, HashSet, grammar::Grammar};
use tracing::debug;
use std::collections::VecDeque;
use crate::{Lr0Item, Lr0Fsm, Lr0Node, Lr0Closure};

fn go<'a>(items: &Lr0Closure<'a>, mov: u32, g: &'a Grammar) -> Lr0Closure<'a> {
  let mut new_items = HashSet::new();
  for item in items {
    if item.dot as usize >= item.prod.len() { // dot is after the last ch
      continue;
    }
    if item.prod[item.dot as usize] == mov {
      new_items.insert(Lr0Item { prod: item.prod, prod_id: item.prod_id, dot: item.dot + 1 });
    }
  }
  closure(new_items, g)
}

fn closure<'a>(mut items: HashSet<Lr0Item<'a>>, g: &'a Grammar) -> Lr0Closure<'a> {
  let mut q = items.iter().copied().collect::<VecDeque<_>>();
  while let Some(item) = q.pop_front() {
    if item.dot as usize >= item.prod.len() { // dot is after the last ch
      continue;
    }
    let b = item.prod[item.dot as usize];
    if let Some(n) = g.as_nt(b) {
      for p in g.get_prod(n) {
        let new_item = Lr0Item { prod: p.rhs.as_slice(), prod_id: p.id, dot: 0 };
        if items.insert(new_item) {
          q.push_back(new_item);
        }
      }
    }
  }
  let mut items = items.into_iter().collect::<Vec<_>>();
  // sort it, so that vec equality implies state equality
  items.sort_unstable();
  items
}

pub fn work<'a>(g: &'a Grammar) -> Lr0Fsm<'a> {
  let token_num = g.token_num() as u32;
  let mut ss = HashMap::new();
  let init = closure({
    let start = g.start().1;
    let mut init = HashSet::new();
    init.insert(Lr0Item { prod: start.rhs.as_slice(), prod_id: start.id, dot: 0 });
    init
  }, g);
  ss.insert(init.clone(), 0u32);
  let mut q = VecDeque::new();
  let mut result = Vec::new();
  q.push_back(init);
  while let Some(cur) = q.pop_front() {
    let mut link = HashMap::new();
    for mov in 0..token_num {
      let ns = go(&cur, mov, g);
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
    result.push(Lr0Node { closure: cur, link });
  }
  debug!(states = result.len(), "built lr(0) fsm");
  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use typed_arena::Arena;

  #[test]
  fn expr_grammar_states() {
    let arena = Arena::new();
    let g = Grammar::from_text("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id", &arena).unwrap();
    let lr0 = work(&g);
    // the canonical collection of this textbook grammar has 12 states
    assert_eq!(lr0.len(), 12);
    // the initial state closes over every production of E, T and F
    assert_eq!(lr0[0].closure.len(), 7);
  }

  #[test]
  fn eps_production_is_complete_at_dot_zero() {
    let arena = Arena::new();
    let g = Grammar::from_text("S -> A a\nA -> ε | b", &arena).unwrap();
    let lr0 = work(&g);
    let has_complete_eps = lr0[0].closure.iter()
      .any(|item| item.prod.is_empty() && item.dot == 0);
    assert!(has_complete_eps);
  }
}
