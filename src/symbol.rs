use common::HashMap;

// placeholder for later semantic passes: a scope stack of declarations,
// no type checking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol<'a> {
  pub name: &'a str,
  pub ty: &'a str,
  pub line: u32,
}

pub struct SymbolTable<'a> {
  scopes: Vec<HashMap<&'a str, Symbol<'a>>>,
}

impl<'a> SymbolTable<'a> {
  pub fn new() -> SymbolTable<'a> {
    SymbolTable { scopes: vec![HashMap::new()] }
  }

  pub fn enter_scope(&mut self) {
    self.scopes.push(HashMap::new());
  }

  pub fn exit_scope(&mut self) {
    if self.scopes.len() > 1 { self.scopes.pop(); }
  }

  // Err carries the earlier declaration on redeclaration in the same scope
  pub fn declare(&mut self, sym: Symbol<'a>) -> Result<(), Symbol<'a>> {
    let scope = self.scopes.last_mut().unwrap();
    match scope.get(sym.name) {
      Some(&old) => Err(old),
      None => {
        scope.insert(sym.name, sym);
        Ok(())
      }
    }
  }

  pub fn lookup(&self, name: &str) -> Option<&Symbol<'a>> {
    self.scopes.iter().rev().find_map(|s| s.get(name))
  }

  pub fn depth(&self) -> usize { self.scopes.len() }
}

impl Default for SymbolTable<'_> {
  fn default() -> Self { SymbolTable::new() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shadowing_and_scope_exit() {
    let mut st = SymbolTable::new();
    st.declare(Symbol { name: "x", ty: "integer", line: 1 }).unwrap();
    st.enter_scope();
    st.declare(Symbol { name: "x", ty: "real", line: 2 }).unwrap();
    assert_eq!(st.lookup("x").unwrap().ty, "real");
    st.exit_scope();
    assert_eq!(st.lookup("x").unwrap().ty, "integer");
  }

  #[test]
  fn duplicate_in_same_scope() {
    let mut st = SymbolTable::new();
    st.declare(Symbol { name: "x", ty: "integer", line: 1 }).unwrap();
    let old = st.declare(Symbol { name: "x", ty: "real", line: 3 }).unwrap_err();
    assert_eq!(old.line, 1);
  }
}
