//! Lexical definition rules.
//!
//! A rule looks at the text before and after one occurrence of a name on its
//! line and decides whether that occurrence binds the name. Nothing is
//! parsed, so a name inside a string literal can still match.

use std::{
  collections::HashMap,
  sync::Arc,
};

use regex::Regex;

#[derive(Debug, Clone)]
pub struct DefinitionRule {
  name:   &'static str,
  before: Option<Regex>,
  after:  Option<Regex>,
}

impl DefinitionRule {
  pub fn new(
    name: &'static str,
    before: Option<&str>,
    after: Option<&str>,
  ) -> Result<Self, regex::Error> {
    Ok(Self {
      name,
      before: before.map(Regex::new).transpose()?,
      after: after.map(Regex::new).transpose()?,
    })
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn matches(&self, before: &str, after: &str) -> bool {
    self.before.as_ref().is_none_or(|re| re.is_match(before))
      && self.after.as_ref().is_none_or(|re| re.is_match(after))
  }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
  language:     String,
  line_comment: Option<String>,
  rules:        Vec<DefinitionRule>,
}

impl RuleSet {
  pub fn new(language: impl Into<String>) -> Self {
    Self {
      language:     language.into(),
      line_comment: None,
      rules:        Vec::new(),
    }
  }

  pub fn with_line_comment(mut self, token: impl Into<String>) -> Self {
    self.line_comment = Some(token.into());
    self
  }

  pub fn with_rule(mut self, rule: DefinitionRule) -> Self {
    self.rules.push(rule);
    self
  }

  pub fn language(&self) -> &str {
    &self.language
  }

  pub fn rules(&self) -> &[DefinitionRule] {
    &self.rules
  }

  /// Whether text preceding an occurrence puts it inside a line comment.
  /// Comment tokens inside a quoted string do not count.
  pub fn is_commented(&self, before: &str) -> bool {
    let Some(token) = self.line_comment.as_deref() else {
      return false;
    };

    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in before.char_indices() {
      match quote {
        Some(_) if escaped => escaped = false,
        Some(_) if ch == '\\' => escaped = true,
        Some(open) if ch == open => quote = None,
        Some(_) => {},
        None if before[idx..].starts_with(token) => return true,
        None if ch == '"' || ch == '\'' => quote = Some(ch),
        None => {},
      }
    }
    false
  }

  /// First rule recognizing the occurrence as a definition.
  pub fn definition_rule(&self, before: &str, after: &str) -> Option<&DefinitionRule> {
    if self.is_commented(before) {
      return None;
    }
    self.rules.iter().find(|rule| rule.matches(before, after))
  }

  pub fn python() -> Self {
    Self::new("python")
      .with_line_comment("#")
      .with_rule(builtin("def", Some(r"^\s*(?:async\s+)?def\s+$"), None))
      .with_rule(builtin("class", Some(r"^\s*class\s+$"), None))
      .with_rule(builtin(
        "parameter",
        Some(r"^\s*(?:async\s+)?def\s+\w+\s*\((?:[^)]*,)?\s*\*{0,2}$"),
        Some(r"^\s*(?:[:=,)]|$)"),
      ))
      .with_rule(builtin(
        "assignment",
        Some(r"^(?:.*;)?\s*(?:[\w.]+\s*,\s*)*(?:\(\s*)?$"),
        Some(r"^\s*(?:,\s*[\w.]+\s*)*\)?\s*(?::[^=]*)?=(?:[^=]|$)"),
      ))
      .with_rule(builtin(
        "for",
        Some(r"\bfor\s+(?:[\w.]+\s*,\s*)*(?:\(\s*)?$"),
        Some(r"^\s*(?:,\s*[\w.]+\s*)*\)?\s+in\b"),
      ))
      .with_rule(builtin("as", Some(r"\bas\s+$"), None))
      .with_rule(builtin(
        "import",
        Some(r"^\s*import\s+(?:[\w.]+(?:\s+as\s+\w+)?\s*,\s*)*$"),
        Some(r"^(?:\.[\w.]*)?\s*(?:[,;#]|$)"),
      ))
      .with_rule(builtin(
        "from-import",
        Some(r"^\s*from\s+[\w.]+\s+import\s+\(?\s*(?:\w+(?:\s+as\s+\w+)?\s*,\s*)*$"),
        Some(r"^\s*(?:[,);#]|$)"),
      ))
      .with_rule(builtin("walrus", None, Some(r"^\s*:=")))
  }

  pub fn r() -> Self {
    Self::new("r")
      .with_line_comment("#")
      .with_rule(builtin(
        "assignment",
        Some(r"^\s*$"),
        Some(r"^\s*(?:<<?-|=(?:[^=]|$))"),
      ))
      .with_rule(builtin(
        "right-assignment",
        Some(r"->>?\s*$"),
        Some(r"^\s*(?:[;#]|$)"),
      ))
      .with_rule(builtin("for", Some(r"\bfor\s*\(\s*$"), Some(r"^\s+in\b")))
      .with_rule(builtin(
        "parameter",
        Some(r"\bfunction\s*\((?:[^)]*,)?\s*$"),
        Some(r"^\s*(?:[=,)]|$)"),
      ))
      .with_rule(builtin(
        "library",
        Some(r#"\b(?:library|require|requireNamespace)\s*\(\s*["']?$"#),
        Some(r#"^["']?\s*[,)]"#),
      ))
  }

  /// Fallback for languages without a dedicated set.
  pub fn generic() -> Self {
    Self::new("generic")
      .with_rule(builtin(
        "declaration",
        Some(
          r"\b(?:def|class|function|fn|let|const|var|val|struct|enum|trait|type|interface|module|mod)\s+(?:mut\s+)?$",
        ),
        None,
      ))
      .with_rule(builtin(
        "assignment",
        Some(r"^\s*$"),
        Some(r"^\s*(?::[^=]*)?=(?:[^=>]|$)"),
      ))
  }
}

fn builtin(name: &'static str, before: Option<&str>, after: Option<&str>) -> DefinitionRule {
  DefinitionRule::new(name, before, after).expect("built-in definition rule must compile")
}

/// Rule sets registered per language id, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
  sets:     HashMap<String, Arc<RuleSet>>,
  fallback: Arc<RuleSet>,
}

impl Default for RuleRegistry {
  fn default() -> Self {
    let mut registry = Self {
      sets:     HashMap::new(),
      fallback: Arc::new(RuleSet::generic()),
    };
    registry.register(RuleSet::python());
    registry.register(RuleSet::r());
    registry
  }
}

impl RuleRegistry {
  pub fn register(&mut self, set: RuleSet) {
    self
      .sets
      .insert(set.language().to_ascii_lowercase(), Arc::new(set));
  }

  pub fn for_language(&self, language: &str) -> Arc<RuleSet> {
    self
      .sets
      .get(&language.to_ascii_lowercase())
      .cloned()
      .unwrap_or_else(|| Arc::clone(&self.fallback))
  }

  pub fn has_language(&self, language: &str) -> bool {
    self.sets.contains_key(&language.to_ascii_lowercase())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn python_rule(before: &str, after: &str) -> Option<&'static str> {
    RuleSet::python()
      .definition_rule(before, after)
      .map(DefinitionRule::name)
  }

  #[test]
  fn python_declarations() {
    assert_eq!(python_rule("def ", "():"), Some("def"));
    assert_eq!(python_rule("    async def ", "(x):"), Some("def"));
    assert_eq!(python_rule("class ", "(Base):"), Some("class"));
    assert_eq!(python_rule("def f(a, ", "=1):"), Some("parameter"));
    assert_eq!(python_rule("def f(", ": int):"), Some("parameter"));
  }

  #[test]
  fn python_default_values_are_not_parameters() {
    assert_eq!(python_rule("def f(a=", "):"), None);
  }

  #[test]
  fn python_assignments() {
    assert_eq!(python_rule("", " = 1"), Some("assignment"));
    assert_eq!(python_rule("a, ", " = 1, 2"), Some("assignment"));
    assert_eq!(python_rule("", ", b = pair"), Some("assignment"));
    assert_eq!(python_rule("", ": int = 3"), Some("assignment"));
    assert_eq!(python_rule("", " == 1"), None);
    assert_eq!(python_rule("", " += 1"), None);
    assert_eq!(python_rule("print(", "=1)"), None);
  }

  #[test]
  fn python_binders() {
    assert_eq!(python_rule("for ", " in range(3):"), Some("for"));
    assert_eq!(python_rule("for i, ", " in pairs:"), Some("for"));
    assert_eq!(python_rule("[x for ", " in xs]"), Some("for"));
    assert_eq!(python_rule("with open(p) as ", ":"), Some("as"));
    assert_eq!(python_rule("import ", ""), Some("import"));
    assert_eq!(python_rule("import ", ".path"), Some("import"));
    assert_eq!(python_rule("import ", " as np"), None);
    assert_eq!(python_rule("from a.b import c, ", ""), Some("from-import"));
    assert_eq!(python_rule("if (", " := f()):"), Some("walrus"));
  }

  #[test]
  fn comments_never_define() {
    assert_eq!(python_rule("# ", " = 1"), None);
    assert_eq!(python_rule("x = 1  # then ", " = 2"), None);
  }

  #[test]
  fn comment_tokens_inside_strings_are_ignored() {
    let python = RuleSet::python();
    assert!(!python.is_commented("x = \"#\"; "));
    assert!(!python.is_commented("s = 'a # b'; "));
    assert!(!python.is_commented("s = \"\\\"#\"; "));
    assert!(python.is_commented("s = \"#\"  # "));
    assert_eq!(python_rule("x = \"#\"; ", " = 1"), Some("assignment"));
  }

  #[test]
  fn r_rules() {
    let r = RuleSet::r();
    let name = |before: &str, after: &str| r.definition_rule(before, after).map(DefinitionRule::name);
    assert_eq!(name("", " <- 1"), Some("assignment"));
    assert_eq!(name("  ", " <<- f(x)"), Some("assignment"));
    assert_eq!(name("1 -> ", ""), Some("right-assignment"));
    assert_eq!(name("for (", " in 1:10) {"), Some("for"));
    assert_eq!(name("f <- function(a, ", ") {"), Some("parameter"));
    assert_eq!(name("library(", ")"), Some("library"));
    assert_eq!(name("", " == 2"), None);
  }

  #[test]
  fn registry_falls_back_to_generic() {
    let registry = RuleRegistry::default();
    assert_eq!(registry.for_language("Python").language(), "python");
    assert_eq!(registry.for_language("R").language(), "r");
    assert_eq!(registry.for_language("julia").language(), "generic");
    assert!(!registry.has_language("julia"));

    let generic = registry.for_language("rust");
    assert!(generic.definition_rule("fn ", "() {").is_some());
    assert!(generic.definition_rule("let mut ", " = 3;").is_some());
    assert!(generic.definition_rule("", " => 3").is_none());
  }
}
