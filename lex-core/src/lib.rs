pub mod re;
pub mod nfa;
pub mod dfa;
pub mod min;
pub mod token;
pub mod lexer;

pub use re::{ReOp, RegexError};
pub use nfa::{Nfa, NfaNode};
pub use dfa::{Dfa, DfaNode};
pub use token::{Token, TokenKind};
pub use lexer::{Lexer, LexError, Rule, RuleDiag};
