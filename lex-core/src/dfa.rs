use common::HashMap;
use std::collections::VecDeque;
use crate::nfa::Nfa;

pub struct DfaNode {
  // winning rule index: highest priority, then earliest declared rule
  pub acc: Option<u32>,
  pub edges: HashMap<u8, u32>,
}

// state 0 is the start state; a missing edge is the (elided) dead state
pub struct Dfa {
  pub nodes: Vec<DfaNode>,
}

fn eps_closure(nfa: &Nfa, mut set: Vec<u32>, on: &mut [bool]) -> Vec<u32> {
  set.retain(|&s| {
    let seen = on[s as usize];
    on[s as usize] = true;
    !seen
  });
  let mut i = 0;
  while i < set.len() {
    let s = set[i];
    for &t in &nfa.nodes[s as usize].eps {
      if !on[t as usize] {
        on[t as usize] = true;
        set.push(t);
      }
    }
    i += 1;
  }
  for &s in &set { on[s as usize] = false; }
  // canonicalize, so equal subsets compare equal and hash equal
  set.sort_unstable();
  set
}

fn accept_of(nfa: &Nfa, subset: &[u32], pri: &[u32]) -> Option<u32> {
  let mut best: Option<u32> = None;
  for &s in subset {
    if let Some(r) = nfa.nodes[s as usize].acc {
      best = Some(match best {
        None => r,
        Some(b) if pri[r as usize] > pri[b as usize] => r,
        Some(b) if pri[r as usize] == pri[b as usize] && r < b => r,
        Some(b) => b,
      });
    }
  }
  best
}

// subset construction; `pri` maps a rule index to its priority
pub fn work(nfa: &Nfa, pri: &[u32]) -> Dfa {
  let alphabet = nfa.alphabet();
  let mut on = vec![false; nfa.nodes.len()];
  let init = eps_closure(nfa, vec![nfa.start], &mut on);
  let mut ss = HashMap::new();
  let mut nodes = vec![DfaNode { acc: accept_of(nfa, &init, pri), edges: HashMap::new() }];
  let mut q = VecDeque::new();
  ss.insert(init.clone(), 0u32);
  q.push_back(init);
  while let Some(cur) = q.pop_front() {
    let cur_id = ss[&cur];
    for &b in &alphabet {
      let mut mov = Vec::new();
      for &s in &cur {
        for &(eb, t) in &nfa.nodes[s as usize].edges {
          if eb == b { mov.push(t); }
        }
      }
      if mov.is_empty() { continue; }
      let u = eps_closure(nfa, mov, &mut on);
      let id = match ss.get(&u) {
        None => {
          let id = nodes.len() as u32;
          nodes.push(DfaNode { acc: accept_of(nfa, &u, pri), edges: HashMap::new() });
          ss.insert(u.clone(), id);
          q.push_back(u);
          id
        }
        Some(&id) => id,
      };
      nodes[cur_id as usize].edges.insert(b, id);
    }
  }
  Dfa { nodes }
}

impl Dfa {
  pub fn run(&self, input: &[u8]) -> Option<u32> {
    let mut st = 0u32;
    for &b in input {
      match self.nodes[st as usize].edges.get(&b) {
        Some(&n) => st = n,
        None => return None,
      }
    }
    self.nodes[st as usize].acc
  }

  pub fn alphabet(&self) -> Vec<u8> {
    let mut v = self.nodes.iter().flat_map(|n| n.edges.keys().copied()).collect::<Vec<_>>();
    v.sort_unstable();
    v.dedup();
    v
  }
}
