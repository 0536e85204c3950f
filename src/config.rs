use serde::Deserialize;
use indexmap::IndexMap;
use common::grammar::{Assoc, PriorityRow};
use lex_core::{Rule, TokenKind};

// a whole language in one toml file: lexical rules in declaration order,
// keyword set, parser precedence rows and the productions
#[derive(Debug, Deserialize)]
pub struct RawConfig {
  pub start: Option<String>,
  #[serde(default)]
  pub keywords: Vec<String>,
  #[serde(default)]
  pub priority: Vec<RawPriorityRow>,
  // map regex to token kind; earlier entries bind tighter
  pub lexical: IndexMap<String, String>,
  // arrow production lines, same syntax as a grammar file
  pub production: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPriorityRow {
  pub assoc: Assoc,
  pub terms: Vec<String>,
}

impl RawConfig {
  pub fn from_toml(s: &str) -> Result<RawConfig, toml::de::Error> {
    toml::from_str(s)
  }

  // declaration order doubles as priority, earlier entries win ties
  pub fn rules(&self) -> Vec<Rule> {
    let n = self.lexical.len() as u32;
    self.lexical.iter().enumerate().map(|(idx, (re, kind))| Rule {
      re,
      kind: TokenKind::from_name(kind),
      pri: n - idx as u32,
      line: idx as u32 + 1,
    }).collect()
  }

  pub fn keywords(&self) -> impl Iterator<Item = &str> {
    self.keywords.iter().map(String::as_str)
  }

  pub fn priority_rows(&self) -> Vec<PriorityRow> {
    self.priority.iter().map(|r| PriorityRow {
      assoc: r.assoc,
      terms: r.terms.iter().map(String::as_str).collect(),
    }).collect()
  }

  pub fn production_text(&self) -> String {
    self.production.join("\n")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TOML: &str = r#"
start = "E"
keywords = ["if", "then"]
production = ["E -> E + T | T", "T -> id | num"]

[[priority]]
assoc = "left"
terms = ["+"]

[lexical]
"[a-z]+" = "IDENTIFIER"
"[0-9]+" = "LITERAL_INT"
"\\s+" = "WHITESPACE"
"#;

  #[test]
  fn deserializes() {
    let cfg = RawConfig::from_toml(TOML).unwrap();
    assert_eq!(cfg.start.as_deref(), Some("E"));
    let rules = cfg.rules();
    assert_eq!(rules.len(), 3);
    // declaration order turns into descending priority
    assert!(rules[0].pri > rules[1].pri);
    assert_eq!(rules[1].kind, TokenKind::IntLit);
    assert_eq!(cfg.production_text(), "E -> E + T | T\nT -> id | num");
    assert_eq!(cfg.priority_rows()[0].terms, vec!["+"]);
  }
}
