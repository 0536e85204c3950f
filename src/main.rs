use anyhow::{bail, Context, Result};
use clap::{App, Arg};
use typed_arena::Arena;
use std::fs;
use std::fmt::Write as _;
use minifront::{analyze, presets, Algo, AnalyzeOpts, Inputs};
use minifront::config::RawConfig;

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let m = App::new("minifront")
    .about("classical front-end pipeline: regex-driven lexer, LR parser with trace, AST and quadruples")
    .arg(Arg::with_name("input").required(true).help("Source file to analyze"))
    .arg(Arg::with_name("preset").long("preset").short("p").takes_value(true)
      .possible_values(&["pascal", "c"])
      .help("Builtin language preset (rules + keywords + grammar)"))
    .arg(Arg::with_name("rules").long("rules").short("r").takes_value(true).value_name("path")
      .help("Lexical rule file, one `<regex> <kind> <priority>` per line"))
    .arg(Arg::with_name("grammar").long("grammar").short("g").takes_value(true).value_name("path")
      .help("Grammar file, `LHS -> rhs1 | rhs2` per line"))
    .arg(Arg::with_name("config").long("config").short("c").takes_value(true).value_name("path")
      .help("Toml language config, overrides --rules/--grammar/--preset"))
    .arg(Arg::with_name("algo").long("algo").short("a").takes_value(true)
      .possible_values(&["slr1", "lr1"]).default_value("slr1"))
    .arg(Arg::with_name("tokens").long("tokens").help("Print the token stream"))
    .arg(Arg::with_name("sets").long("sets").help("Print FIRST and FOLLOW sets"))
    .arg(Arg::with_name("states").long("states").help("Print the LR item sets and transitions"))
    .arg(Arg::with_name("trace").long("trace").help("Print every shift/reduce step"))
    .arg(Arg::with_name("ast").long("ast").help("Print the syntax tree"))
    .arg(Arg::with_name("ir").long("ir").help("Print the emitted quadruples"))
    .arg(Arg::with_name("no_collapse").long("no-collapse")
      .help("Keep degenerate single-child chains in the tree"))
    .get_matches();

  let source = fs::read_to_string(m.value_of("input").unwrap())
    .with_context(|| format!("cannot read source file {}", m.value_of("input").unwrap()))?;

  // config > explicit files > preset; the owned strings live here so the
  // analysis can borrow all the way down
  let mut rules_text;
  let grammar_text;
  let mut keywords: Vec<String> = Vec::new();
  let mut start: Option<String> = None;
  let mut priority = Vec::new();
  if let Some(path) = m.value_of("config") {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read config {}", path))?;
    let config = RawConfig::from_toml(&text).with_context(|| format!("invalid config {}", path))?;
    rules_text = String::new();
    for r in config.rules() {
      let _ = writeln!(rules_text, "{} {} {}", r.re, r.kind.name(), r.pri);
    }
    grammar_text = config.production_text();
    keywords = config.keywords().map(str::to_owned).collect();
    start = config.start.clone();
    priority = config.priority_rows().into_iter()
      .map(|row| (row.assoc, row.terms.iter().map(|&t| t.to_owned()).collect::<Vec<_>>()))
      .collect::<Vec<_>>();
  } else if m.is_present("rules") || m.is_present("grammar") {
    let rules_path = m.value_of("rules").context("--rules is required without --preset/--config")?;
    let grammar_path = m.value_of("grammar").context("--grammar is required without --preset/--config")?;
    rules_text = fs::read_to_string(rules_path).with_context(|| format!("cannot read rules {}", rules_path))?;
    grammar_text = fs::read_to_string(grammar_path).with_context(|| format!("cannot read grammar {}", grammar_path))?;
  } else {
    let name = m.value_of("preset").unwrap_or("pascal");
    let preset = match presets::lookup(name) {
      Some(p) => p,
      None => bail!("unknown preset {}", name),
    };
    rules_text = preset.rules.to_owned();
    grammar_text = preset.grammar.to_owned();
    keywords = preset.keywords.iter().map(|&k| k.to_owned()).collect();
  }

  let mut inputs = Inputs::new(&source, &rules_text, &grammar_text);
  inputs.keywords = keywords.iter().map(String::as_str).collect();
  inputs.start = start.as_deref();
  inputs.priority = priority.iter()
    .map(|(assoc, terms)| common::grammar::PriorityRow {
      assoc: *assoc,
      terms: terms.iter().map(String::as_str).collect(),
    })
    .collect();

  let opts = AnalyzeOpts {
    algo: if m.value_of("algo") == Some("lr1") { Algo::Lr1 } else { Algo::Slr1 },
    collapse_ast: !m.is_present("no_collapse"),
  };
  let arena = Arena::new();
  let analysis = analyze(&inputs, &arena, &opts);

  if m.is_present("tokens") {
    println!("== tokens ==");
    for (i, t) in analysis.tokens.iter().enumerate() {
      println!("{:<4} {:<16} {:<16} {}:{}", i + 1, t.kind.name(), format!("{:?}", t.lexeme), t.line, t.col);
    }
  }
  if m.is_present("sets") {
    println!("== first/follow ==");
    println!("{}", analysis.show_sets());
  }
  if m.is_present("states") {
    println!("== states ==");
    for s in &analysis.states {
      println!("State {}:", s.id);
      for item in &s.items { println!("  {}", item); }
      for (sym, to) in &s.links { println!("  {} -> {}", sym, to); }
    }
  }
  if m.is_present("trace") {
    println!("== trace ==");
    println!("{}", analysis.show_trace());
  }
  if m.is_present("ast") {
    println!("== ast ==");
    if let Some(ast) = analysis.parse.as_ref().and_then(|p| p.ast.as_ref()) {
      print!("{}", ast.show());
    }
  }
  if m.is_present("ir") {
    println!("== quadruples ==");
    for (i, q) in analysis.quads.iter().enumerate() {
      println!("{:02}: {}", i, q);
    }
  }

  // input errors are diagnostics, never process failures
  if !analysis.diags.is_empty() {
    eprintln!("== diagnostics ==");
    for d in &analysis.diags { eprintln!("{}", d); }
  }
  println!("{}", if analysis.accepted() { "accepted" } else { "rejected" });
  Ok(())
}
