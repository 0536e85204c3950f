pub mod bitset;
pub mod grammar;

pub use smallvec::{smallvec, SmallVec};

pub use std::fmt::{Formatter, Debug, Display, Result as FmtResult};
pub use bitset::BitSet;
pub use grammar::*;

// define some data structures that will be used in other crates, so that they don't need to import them
pub type HashMap<K, V> = hashbrown::HashMap<K, V>;
pub type HashSet<K> = hashbrown::HashSet<K>;

// parse a "lhs -> rhs1 rhs2 ..." string; both the ascii and the unicode arrow are accepted
pub fn parse_arrow_prod(s: &str) -> Option<(&str, Vec<&str>)> {
  let (lhs, rhs) = if let Some(idx) = s.find("->") {
    (&s[..idx], &s[idx + 2..])
  } else if let Some(idx) = s.find('→') {
    (&s[..idx], &s[idx + '→'.len_utf8()..])
  } else { return None };
  let lhs = lhs.trim();
  if lhs.is_empty() || lhs.split_whitespace().count() != 1 { return None; }
  Some((lhs, rhs.split_whitespace().collect()))
}
