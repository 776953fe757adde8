//! Heuristic, line-anchored symbol and import extraction.
//!
//! Every language gets an ordered table of `(kind, pattern)` rules. Each source
//! line is tried against the rules top to bottom and the first match wins.
//! This is deliberately not a parser: misses and false hits are expected.

use crate::language::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Only the top of a file is searched for imports.
pub const IMPORT_SCAN_LINES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Struct,
    Interface,
    Trait,
    Module,
    Impl,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Trait => "trait",
            SymbolKind::Module => "module",
            SymbolKind::Impl => "impl",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named definition found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: String,
    /// 1-indexed line
    pub line: usize,
    /// 0 = unknown
    #[serde(default)]
    pub end_line: usize,
}

#[derive(Debug, Clone)]
pub struct SymbolRule {
    kind: SymbolKind,
    pattern: Regex,
}

impl SymbolRule {
    /// `pattern` must capture the symbol name in group 1.
    pub fn new(kind: SymbolKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }
}

/// Per-language extraction tables.
#[derive(Debug, Clone, Default)]
pub struct SymbolRules {
    symbols: HashMap<Language, Vec<SymbolRule>>,
    imports: HashMap<Language, Regex>,
}

static BUILTIN: Lazy<SymbolRules> = Lazy::new(SymbolRules::builtin);

impl SymbolRules {
    /// Shared built-in tables.
    pub fn global() -> &'static SymbolRules {
        &BUILTIN
    }

    /// Tables with no rules at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the symbol rules for one language.
    pub fn set_rules(&mut self, language: Language, rules: Vec<SymbolRule>) {
        self.symbols.insert(language, rules);
    }

    /// Replace the import pattern for one language.
    pub fn set_import_pattern(&mut self, language: Language, pattern: Regex) {
        self.imports.insert(language, pattern);
    }

    pub fn rules_for(&self, language: Language) -> &[SymbolRule] {
        self.symbols.get(&language).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn extract_symbols(&self, content: &str, language: Option<Language>) -> Vec<Symbol> {
        let Some(language) = language else {
            return Vec::new();
        };
        let rules = self.rules_for(language);
        if rules.is_empty() {
            return Vec::new();
        }

        let mut symbols = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let Some((rule, caps)) = rules
                .iter()
                .find_map(|rule| rule.pattern.captures(line).map(|caps| (rule, caps)))
            else {
                continue;
            };
            let Some(name) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            // Private-looking names only drop function hits; types always count.
            if name.is_empty() || (rule.kind == SymbolKind::Function && name.starts_with('_')) {
                continue;
            }
            symbols.push(Symbol {
                kind: rule.kind,
                name: name.to_string(),
                line: idx + 1,
                end_line: 0,
            });
        }
        symbols
    }

    pub fn extract_imports(&self, content: &str, language: Option<Language>) -> Vec<String> {
        let Some(pattern) = language.and_then(|lang| self.imports.get(&lang)) else {
            return Vec::new();
        };

        content
            .lines()
            .take(IMPORT_SCAN_LINES)
            .filter_map(|line| {
                let caps = pattern.captures(line)?;
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().trim().to_string())
            })
            .filter(|value| !value.is_empty())
            .collect()
    }

    fn builtin() -> Self {
        let mut rules = Self::empty();

        rules.set_rules(
            Language::Python,
            builtin_rules(&[
                (SymbolKind::Class, r"^class\s+(\w+)"),
                (SymbolKind::Function, r"^def\s+(\w+)"),
                (SymbolKind::Function, r"^async\s+def\s+(\w+)"),
            ]),
        );

        let ecmascript = builtin_rules(&[
            (SymbolKind::Class, r"^(?:export\s+)?class\s+(\w+)"),
            (SymbolKind::Function, r"^(?:export\s+)?(?:async\s+)?function\s+(\w+)"),
            (SymbolKind::Function, r"^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*="),
        ]);
        rules.set_rules(Language::JavaScript, ecmascript.clone());
        rules.set_rules(Language::TypeScript, ecmascript);

        let jvm_like = builtin_rules(&[
            (
                SymbolKind::Class,
                r"^\s*(?:public|private|protected|internal|abstract|static|final|sealed|open|data)?\s*(?:class|record)\s+(\w+)",
            ),
            (
                SymbolKind::Interface,
                r"^\s*(?:public|private|protected)?\s*interface\s+(\w+)",
            ),
            (
                SymbolKind::Function,
                r"^\s*(?:public|private|protected|internal|static|abstract|override|virtual|async)?\s*\w[\w<>\[\]]*\s+(\w+)\s*\(",
            ),
        ]);
        rules.set_rules(Language::Java, jvm_like.clone());
        rules.set_rules(Language::CSharp, jvm_like.clone());
        rules.set_rules(Language::Kotlin, jvm_like);

        rules.set_rules(
            Language::Go,
            builtin_rules(&[
                (SymbolKind::Function, r"^func\s+(?:\(\w+\s+\*?\w+\)\s+)?(\w+)"),
                (SymbolKind::Struct, r"^type\s+(\w+)\s+struct"),
                (SymbolKind::Interface, r"^type\s+(\w+)\s+interface"),
            ]),
        );

        rules.set_rules(
            Language::Rust,
            builtin_rules(&[
                (SymbolKind::Function, r"^\s*(?:pub\s+)?(?:async\s+)?fn\s+(\w+)"),
                (SymbolKind::Struct, r"^\s*(?:pub\s+)?struct\s+(\w+)"),
                (SymbolKind::Trait, r"^\s*(?:pub\s+)?trait\s+(\w+)"),
                (SymbolKind::Impl, r"^\s*impl(?:<[^>]+>)?\s+(\w+)"),
            ]),
        );

        rules.set_rules(
            Language::Ruby,
            builtin_rules(&[
                (SymbolKind::Class, r"^\s*class\s+(\w+)"),
                (SymbolKind::Function, r"^\s*def\s+(\w+)"),
                (SymbolKind::Module, r"^\s*module\s+(\w+)"),
            ]),
        );

        rules.set_rules(
            Language::Php,
            builtin_rules(&[
                (SymbolKind::Class, r"^\s*(?:abstract\s+)?class\s+(\w+)"),
                (
                    SymbolKind::Function,
                    r"^\s*(?:public|private|protected|static)?\s*function\s+(\w+)",
                ),
            ]),
        );

        let c_like = builtin_rules(&[
            (SymbolKind::Class, r"^\s*(?:class|struct)\s+(\w+)"),
            (
                SymbolKind::Function,
                r"^\s*(?:\w[\w:*&<> ]*\s+)?(\w+)\s*\([^)]*\)\s*\{",
            ),
        ]);
        rules.set_rules(Language::C, c_like.clone());
        rules.set_rules(Language::Cpp, c_like);

        rules.set_rules(
            Language::Swift,
            builtin_rules(&[
                (
                    SymbolKind::Class,
                    r"^\s*(?:open|public|internal|fileprivate|private)?\s*class\s+(\w+)",
                ),
                (
                    SymbolKind::Struct,
                    r"^\s*(?:public|internal|fileprivate|private)?\s*struct\s+(\w+)",
                ),
                (
                    SymbolKind::Function,
                    r"^\s*(?:public|internal|fileprivate|private|static|override|mutating)?\s*func\s+(\w+)",
                ),
            ]),
        );

        let js_imports = builtin_regex(
            r#"(?:import\s+.*?from\s+['"]([^'"]+)['"]|require\s*\(\s*['"]([^'"]+)['"])"#,
        );
        rules.set_import_pattern(
            Language::Python,
            builtin_regex(r"^(?:from\s+(\S+)\s+import|import\s+(\S+))"),
        );
        rules.set_import_pattern(Language::JavaScript, js_imports.clone());
        rules.set_import_pattern(Language::TypeScript, js_imports);
        rules.set_import_pattern(Language::Go, builtin_regex(r#"^\s*"([^"]+)""#));
        rules.set_import_pattern(Language::Java, builtin_regex(r"^import\s+(?:static\s+)?([^;]+);"));
        rules.set_import_pattern(Language::Rust, builtin_regex(r"^use\s+([^;]+);"));
        rules.set_import_pattern(Language::CSharp, builtin_regex(r"^using\s+(?:static\s+)?([^;]+);"));

        rules
    }
}

fn builtin_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in extraction pattern must compile")
}

fn builtin_rules(table: &[(SymbolKind, &str)]) -> Vec<SymbolRule> {
    table
        .iter()
        .map(|(kind, pattern)| SymbolRule {
            kind: *kind,
            pattern: builtin_regex(pattern),
        })
        .collect()
}
