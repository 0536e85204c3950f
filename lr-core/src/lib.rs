pub mod first;
pub mod lr0;
pub mod lr1;
pub mod mk_table;

pub use first::FirstFollow;
pub use mk_table::{Act, Acts, Table, TableEntry, Conflict, ConflictKind};

use common::{BitSet, HashMap};

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Lr0Item<'a> {
  pub prod: &'a [u32],
  pub prod_id: u32,
  // prod[dot] is the token after the dot
  pub dot: u32,
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Lr1Item<'a> {
  pub lr0: Lr0Item<'a>,
  // bits over terminal ids
  pub lookahead: BitSet,
}

pub type Lr0Closure<'a> = Vec<Lr0Item<'a>>;
pub type Lr1Closure<'a> = Vec<Lr1Item<'a>>;

pub struct Lr0Node<'a> {
  pub closure: Lr0Closure<'a>,
  pub link: HashMap<u32, u32>,
}

pub struct Lr1Node<'a> {
  pub closure: Lr1Closure<'a>,
  pub link: HashMap<u32, u32>,
}

pub type Lr0Fsm<'a> = Vec<Lr0Node<'a>>;
pub type Lr1Fsm<'a> = Vec<Lr1Node<'a>>;
