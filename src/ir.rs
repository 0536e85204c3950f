use std::fmt;
use crate::ast::Ast;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Op {
  Assign,
  Add, Sub, Mul, Div, Mod,
  Lt, Le, Gt, Ge, Eq, Ne,
  Neg, Not,
  Goto, IfFalse, Label,
  Param, Call, Ret,
}

impl Op {
  fn of_lexeme(s: &str) -> Option<Op> {
    Some(match s {
      "+" => Op::Add, "-" => Op::Sub, "*" => Op::Mul, "/" => Op::Div, "%" => Op::Mod,
      "<" => Op::Lt, "<=" => Op::Le, ">" => Op::Gt, ">=" => Op::Ge,
      "=" | "==" => Op::Eq, "<>" | "!=" => Op::Ne,
      _ => return None,
    })
  }
}

impl fmt::Display for Op {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let s = match self {
      Op::Assign => "assign",
      Op::Add => "+", Op::Sub => "-", Op::Mul => "*", Op::Div => "/", Op::Mod => "%",
      Op::Lt => "<", Op::Le => "<=", Op::Gt => ">", Op::Ge => ">=", Op::Eq => "==", Op::Ne => "!=",
      Op::Neg => "neg", Op::Not => "not",
      Op::Goto => "goto", Op::IfFalse => "if_false", Op::Label => "label",
      Op::Param => "param", Op::Call => "call", Op::Ret => "return",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
  pub op: Op,
  pub arg1: Option<String>,
  pub arg2: Option<String>,
  pub result: Option<String>,
}

impl fmt::Display for Quad {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let s = |x: &Option<String>| x.clone().unwrap_or_else(|| "_".to_owned());
    write!(f, "({}, {}, {}, {})", self.op, s(&self.arg1), s(&self.arg2), s(&self.result))
  }
}

// the temp and label counters are private to one emission pass
pub struct IrGen {
  quads: Vec<Quad>,
  temp: u32,
  label: u32,
}

// keywords and delimiters that only steer the walk; they carry no value
fn is_marker(ast: &Ast) -> bool {
  match ast.leaf_lexeme() {
    Some(s) => matches!(s, "if" | "then" | "else" | "while" | "do" | "begin" | "end"
                           | "(" | ")" | "{" | "}" | ";" | "," | "."),
    None => false,
  }
}

impl IrGen {
  // one emission pass over one top-level unit
  pub fn gen(ast: &Ast) -> Vec<Quad> {
    let mut g = IrGen { quads: Vec::new(), temp: 0, label: 0 };
    g.stmt(ast);
    g.quads
  }

  fn new_temp(&mut self) -> String {
    self.temp += 1;
    format!("t{}", self.temp)
  }

  fn new_label(&mut self) -> String {
    self.label += 1;
    format!("L{}", self.label)
  }

  fn emit(&mut self, op: Op, arg1: Option<String>, arg2: Option<String>, result: Option<String>) {
    self.quads.push(Quad { op, arg1, arg2, result });
  }

  fn stmt(&mut self, ast: &Ast) {
    let children = match ast {
      Ast::Node { children, .. } => children,
      _ => return,
    };
    // assignment: id := expr  /  id = expr
    if children.len() >= 3 && children[0].is_leaf() {
      if matches!(children[1].leaf_lexeme(), Some(":=") | Some("=")) {
        let target = children[0].leaf_lexeme().unwrap().to_owned();
        let a = self.expr(&children[2]);
        self.emit(Op::Assign, Some(a), None, Some(target));
        return;
      }
    }
    match children.first().and_then(Ast::leaf_lexeme) {
      Some("if") => self.if_stmt(children),
      Some("while") => self.while_stmt(children),
      Some("return") => {
        let a = children.iter().skip(1).find(|c| !is_marker(c)).map(|c| self.expr(c));
        self.emit(Op::Ret, a, None, None);
      }
      _ => {
        // anything else is a statement sequence (program, block, stmt_list)
        for c in children {
          self.stmt(c);
        }
      }
    }
  }

  fn if_stmt(&mut self, children: &[Ast]) {
    let mut operands = children.iter().skip(1).filter(|c| !is_marker(c));
    let cond = match operands.next() { Some(c) => c, None => return };
    let a = self.expr(cond);
    let l_else = self.new_label();
    let l_end = self.new_label();
    self.emit(Op::IfFalse, Some(a), None, Some(l_else.clone()));
    if let Some(body) = operands.next() { self.stmt(body); }
    self.emit(Op::Goto, None, None, Some(l_end.clone()));
    self.emit(Op::Label, None, None, Some(l_else));
    if let Some(alt) = operands.next() { self.stmt(alt); }
    self.emit(Op::Label, None, None, Some(l_end));
  }

  fn while_stmt(&mut self, children: &[Ast]) {
    let mut operands = children.iter().skip(1).filter(|c| !is_marker(c));
    let cond = match operands.next() { Some(c) => c, None => return };
    let l_start = self.new_label();
    let l_end = self.new_label();
    self.emit(Op::Label, None, None, Some(l_start.clone()));
    let a = self.expr(cond);
    self.emit(Op::IfFalse, Some(a), None, Some(l_end.clone()));
    if let Some(body) = operands.next() { self.stmt(body); }
    self.emit(Op::Goto, None, None, Some(l_start));
    self.emit(Op::Label, None, None, Some(l_end));
  }

  fn expr(&mut self, ast: &Ast) -> String {
    let children = match ast {
      Ast::Leaf { lexeme, .. } => return (*lexeme).to_owned(),
      Ast::Error => return "_".to_owned(),
      Ast::Node { children, .. } => children,
    };
    match children.as_slice() {
      [single] => self.expr(single),
      // ( expr )
      [l, e, r] if l.leaf_lexeme() == Some("(") && r.leaf_lexeme() == Some(")") => self.expr(e),
      // expr op expr
      [l, op, r] if op.leaf_lexeme().and_then(Op::of_lexeme).is_some() => {
        let op = Op::of_lexeme(op.leaf_lexeme().unwrap()).unwrap();
        let a1 = self.expr(l);
        let a2 = self.expr(r);
        let t = self.new_temp();
        self.emit(op, Some(a1), Some(a2), Some(t.clone()));
        t
      }
      // unary minus / logical not
      [op, e] if matches!(op.leaf_lexeme(), Some("-") | Some("!") | Some("not")) => {
        let o = if op.leaf_lexeme() == Some("-") { Op::Neg } else { Op::Not };
        let a = self.expr(e);
        let t = self.new_temp();
        self.emit(o, Some(a), None, Some(t.clone()));
        t
      }
      // f ( args )
      [f, l, .., r] if f.is_leaf() && l.leaf_lexeme() == Some("(") && r.leaf_lexeme() == Some(")") => {
        let callee = f.leaf_lexeme().unwrap().to_owned();
        let args = children[2..children.len() - 1].iter()
          .filter(|c| !is_marker(c))
          .map(|c| self.expr(c))
          .collect::<Vec<_>>();
        let argc = args.len();
        for a in args {
          self.emit(Op::Param, Some(a), None, None);
        }
        let t = self.new_temp();
        self.emit(Op::Call, Some(callee), Some(argc.to_string()), Some(t.clone()));
        t
      }
      _ => {
        let mut operands = children.iter().filter(|c| !is_marker(c));
        match (operands.next(), operands.next()) {
          (Some(only), None) => self.expr(only),
          _ => "_".to_owned(),
        }
      }
    }
  }
}
