use common::SmallVec;
use crate::re::ReOp;

// thompson construction; state ids are globally unique within one automaton,
// edges are id-based so the graph stays tree-owned
pub struct NfaNode {
  pub eps: SmallVec<[u32; 2]>,
  pub edges: SmallVec<[(u8, u32); 2]>,
  // index of the rule this accept state belongs to
  pub acc: Option<u32>,
}

pub struct Nfa {
  pub nodes: Vec<NfaNode>,
  pub start: u32,
}

struct Builder {
  nodes: Vec<NfaNode>,
}

impl Builder {
  fn node(&mut self) -> u32 {
    let id = self.nodes.len() as u32;
    self.nodes.push(NfaNode { eps: SmallVec::new(), edges: SmallVec::new(), acc: None });
    id
  }

  fn eps(&mut self, from: u32, to: u32) {
    self.nodes[from as usize].eps.push(to);
  }

  fn edge(&mut self, from: u32, b: u8, to: u32) {
    self.nodes[from as usize].edges.push((b, to));
  }

  // build one fragment with exactly one start and one accept state
  fn frag(&mut self, postfix: &[ReOp]) -> (u32, u32) {
    let mut stk: Vec<(u32, u32)> = Vec::new();
    for &op in postfix {
      match op {
        ReOp::Ch(b) => {
          let (s, f) = (self.node(), self.node());
          self.edge(s, b, f);
          stk.push((s, f));
        }
        ReOp::Eps => {
          let (s, f) = (self.node(), self.node());
          self.eps(s, f);
          stk.push((s, f));
        }
        ReOp::Cat => {
          let (s2, f2) = match stk.pop() { Some(x) => x, None => unreachable!("malformed postfix") };
          let (s1, f1) = match stk.pop() { Some(x) => x, None => unreachable!("malformed postfix") };
          self.eps(f1, s2);
          stk.push((s1, f2));
        }
        ReOp::Alt => {
          let (s2, f2) = match stk.pop() { Some(x) => x, None => unreachable!("malformed postfix") };
          let (s1, f1) = match stk.pop() { Some(x) => x, None => unreachable!("malformed postfix") };
          let (s, f) = (self.node(), self.node());
          self.eps(s, s1);
          self.eps(s, s2);
          self.eps(f1, f);
          self.eps(f2, f);
          stk.push((s, f));
        }
        ReOp::Star => {
          let (s1, f1) = match stk.pop() { Some(x) => x, None => unreachable!("malformed postfix") };
          let (s, f) = (self.node(), self.node());
          self.eps(s, s1);
          self.eps(s, f);
          self.eps(f1, s1);
          self.eps(f1, f);
          stk.push((s, f));
        }
      }
    }
    match (stk.pop(), stk.is_empty()) {
      (Some(x), true) => x,
      _ => unreachable!("malformed postfix"),
    }
  }
}

// one fresh start state with ε-edges to each rule's fragment; each fragment's
// accept is labeled with its rule index
pub fn combine(rules: &[Vec<ReOp>]) -> Nfa {
  let mut b = Builder { nodes: Vec::new() };
  let start = b.node();
  for (idx, postfix) in rules.iter().enumerate() {
    let (s, f) = b.frag(postfix);
    b.eps(start, s);
    b.nodes[f as usize].acc = Some(idx as u32);
  }
  Nfa { nodes: b.nodes, start }
}

impl Nfa {
  // all labeled bytes, sorted; ε never appears here
  pub fn alphabet(&self) -> Vec<u8> {
    let mut v = self.nodes.iter().flat_map(|n| n.edges.iter().map(|&(b, _)| b)).collect::<Vec<_>>();
    v.sort_unstable();
    v.dedup();
    v
  }
}
