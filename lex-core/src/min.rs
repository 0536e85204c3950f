use common::HashMap;
use crate::dfa::{Dfa, DfaNode};

// partition refinement: the initial partition groups states by accept label,
// then any block whose members disagree on the target block of some symbol is
// split, until no block changes; blocks become the states of the result.
// quadratic in the state count, which is fine for a teaching tool.
pub fn minimize(dfa: &Dfa) -> Dfa {
  let n = dfa.nodes.len();
  let alphabet = dfa.alphabet();

  // states are scanned in id order when blocks are assigned, so the block of
  // state 0 is always block 0 and numbering is deterministic
  let mut block = vec![0u32; n];
  let mut block_num = 0u32;
  {
    let mut by_label = HashMap::new();
    for (i, node) in dfa.nodes.iter().enumerate() {
      let id = *by_label.entry(node.acc).or_insert_with(|| {
        let id = block_num;
        block_num += 1;
        id
      });
      block[i] = id;
    }
  }

  loop {
    let mut next = vec![0u32; n];
    let mut next_num = 0u32;
    let mut by_key: HashMap<(u32, Vec<Option<u32>>), u32> = HashMap::new();
    for i in 0..n {
      let key = alphabet.iter()
        .map(|b| dfa.nodes[i].edges.get(b).map(|&t| block[t as usize]))
        .collect::<Vec<_>>();
      let id = *by_key.entry((block[i], key)).or_insert_with(|| {
        let id = next_num;
        next_num += 1;
        id
      });
      next[i] = id;
    }
    let stable = next_num == block_num;
    block = next;
    block_num = next_num;
    if stable { break; }
  }

  // one representative per block; members agree on labels and block-level edges
  let mut repr = vec![usize::MAX; block_num as usize];
  for i in 0..n {
    let b = block[i] as usize;
    if repr[b] == usize::MAX { repr[b] = i; }
  }
  let nodes = repr.iter().map(|&r| {
    let old = &dfa.nodes[r];
    let edges = old.edges.iter().map(|(&b, &t)| (b, block[t as usize])).collect();
    DfaNode { acc: old.acc, edges }
  }).collect();
  Dfa { nodes }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{re, nfa, dfa};

  fn build(res: &[&str], pri: &[u32]) -> Dfa {
    let postfix = res.iter().map(|r| re::parse(r).unwrap()).collect::<Vec<_>>();
    minimize(&dfa::work(&nfa::combine(&postfix), pri))
  }

  #[test]
  fn language_preserved() {
    let d = build(&["a(b|c)*"], &[0]);
    assert_eq!(d.run(b"a"), Some(0));
    assert_eq!(d.run(b"ab"), Some(0));
    assert_eq!(d.run(b"abcbc"), Some(0));
    assert_eq!(d.run(b""), None);
    assert_eq!(d.run(b"b"), None);
    assert_eq!(d.run(b"ba"), None);
  }

  #[test]
  fn is_minimal() {
    // (a|b)*abb is the textbook example with a 4-state minimal dfa
    let d = build(&["(a|b)*abb"], &[0]);
    assert_eq!(d.nodes.len(), 4);
    assert_eq!(d.run(b"abb"), Some(0));
    assert_eq!(d.run(b"aabb"), Some(0));
    assert_eq!(d.run(b"ab"), None);
  }

  #[test]
  fn no_refinement_applies() {
    // minimizing twice changes nothing
    let d = build(&["[a-c]+x?"], &[0]);
    let d2 = minimize(&d);
    assert_eq!(d.nodes.len(), d2.nodes.len());
  }

  #[test]
  fn labels_survive() {
    let d = build(&["if", "[a-z]+"], &[10, 5]);
    assert_eq!(d.run(b"if"), Some(0));
    assert_eq!(d.run(b"iff"), Some(1));
    assert_eq!(d.run(b"zz"), Some(1));
  }
}
