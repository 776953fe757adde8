//! Priority-ordered, token-budgeted context assembly.

use crate::relevance::{score_file, INCLUSION_THRESHOLD};
use crate::tokens::{estimate_tokens, trim_to_tokens};
use context_indexer::{FileRecord, Workspace};
use std::cmp::Ordering;

const OVERVIEW_LINES: usize = 60;
const MINIMAL_OVERVIEW_LINES: usize = 80;
const MINIMAL_RULES_TOKENS: usize = 2_000;
const SUMMARY_SYMBOLS: usize = 20;

pub const WORKSPACE_LABEL: &str = "WORKSPACE";
pub const SUMMARIES_LABEL: &str = "RELEVANT_SUMMARIES";
pub const RULES_LABEL: &str = "RULES";

/// One labelled block of context. Priority 1 is the most important.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSection {
    pub priority: u32,
    pub label: String,
    pub content: String,
}

impl ContextSection {
    pub fn new(priority: u32, label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            priority,
            label: label.into(),
            content: content.into(),
        }
    }
}

/// Thresholds for partially including the first section that does not fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetPolicy {
    /// A partial section is only emitted when more than this many tokens remain
    pub floor: usize,
    /// Tokens held back from the partial section
    pub reserve: usize,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            floor: 500,
            reserve: 100,
        }
    }
}

/// Join sections in ascending priority within `budget` tokens.
///
/// Sections are taken whole while they fit. The first one that does not fit
/// is truncated when more than `policy.floor` tokens remain; assembly stops
/// there either way.
pub fn assemble_sections(
    mut sections: Vec<ContextSection>,
    budget: usize,
    policy: BudgetPolicy,
) -> String {
    sections.sort_by_key(|section| section.priority);

    let mut parts: Vec<String> = Vec::with_capacity(sections.len());
    let mut remaining = budget;
    for section in sections {
        let tokens = estimate_tokens(&section.content);
        if tokens <= remaining {
            remaining -= tokens;
            parts.push(section.content);
            continue;
        }
        if remaining > policy.floor {
            let allowance = remaining.saturating_sub(policy.reserve);
            log::debug!(
                "Truncating section {} from {tokens} to {allowance} tokens",
                section.label
            );
            parts.push(trim_to_tokens(&section.content, allowance));
        } else {
            log::debug!(
                "Dropping section {} ({tokens} tokens, {remaining} remaining)",
                section.label
            );
        }
        break;
    }
    parts.join("\n\n")
}

/// A file that passed the inclusion threshold
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFile {
    pub path: String,
    pub score: f64,
}

/// `path (N lines, lang)` followed by up to 20 `  kind name Lline` rows.
pub fn format_file_summary(rel_path: &str, record: &FileRecord) -> String {
    let language = match record.language_name() {
        "" => "unknown",
        name => name,
    };
    let mut lines = vec![format!(
        "{rel_path} ({} lines, {language})",
        record.line_count
    )];
    lines.extend(
        record
            .symbols
            .iter()
            .take(SUMMARY_SYMBOLS)
            .map(|sym| format!("  {} {} L{}", sym.kind, sym.name, sym.line)),
    );
    lines.join("\n")
}

/// Builds task context from a workspace snapshot
pub struct ContextAssembler<'a> {
    workspace: &'a Workspace,
    token_budget: usize,
    policy: BudgetPolicy,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            token_budget: workspace.config().max_context_tokens,
            policy: BudgetPolicy::default(),
        }
    }

    pub fn with_token_budget(mut self, tokens: usize) -> Self {
        self.token_budget = tokens;
        self
    }

    pub fn with_policy(mut self, policy: BudgetPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Files scoring at least the inclusion threshold, best first, ties by
    /// path, capped at `max_context_files`. The active file is never listed.
    pub fn rank_files(&self, instruction: &str, active_file: Option<&str>) -> Vec<RankedFile> {
        let mut ranked: Vec<RankedFile> = self
            .workspace
            .index()
            .iter()
            .filter(|(path, _)| Some(path.as_str()) != active_file)
            .map(|(path, record)| RankedFile {
                path: path.clone(),
                score: score_file(path, record, instruction, active_file),
            })
            .filter(|ranked| ranked.score >= INCLUSION_THRESHOLD)
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.path.cmp(&b.path))
        });
        ranked.truncate(self.workspace.config().max_context_files);
        ranked
    }

    /// The sections `build` assembles, before budgeting.
    pub fn sections(&self, instruction: &str, active_file: Option<&str>) -> Vec<ContextSection> {
        let mut sections = vec![ContextSection::new(
            1,
            WORKSPACE_LABEL,
            self.workspace.get_structure_summary(OVERVIEW_LINES),
        )];

        let ranked = self.rank_files(instruction, active_file);
        if !ranked.is_empty() {
            let mut lines =
                vec!["Potentially relevant files (use read_file for content):".to_string()];
            for file in &ranked {
                if let Some(record) = self.workspace.record(&file.path) {
                    lines.push(format_file_summary(&file.path, record));
                }
            }
            sections.push(ContextSection::new(2, SUMMARIES_LABEL, lines.join("\n")));
        }

        let rules = self.workspace.rules();
        if !rules.is_empty() {
            sections.push(ContextSection::new(
                3,
                RULES_LABEL,
                format!("## Workspace Rules\n{rules}"),
            ));
        }
        sections
    }

    /// Context for `instruction`, bounded by the token budget.
    pub fn build(&self, instruction: &str, active_file: Option<&str>) -> String {
        assemble_sections(
            self.sections(instruction, active_file),
            self.token_budget,
            self.policy,
        )
    }

    /// Overview and rules only, for rounds without a specific task.
    pub fn build_minimal(&self) -> String {
        let mut result = format!(
            "## Workspace Context\n\n{}",
            self.workspace.get_structure_summary(MINIMAL_OVERVIEW_LINES)
        );
        let rules = self.workspace.rules();
        if !rules.is_empty() {
            result.push_str("\n\n## Workspace Rules\n");
            result.push_str(&trim_to_tokens(rules, MINIMAL_RULES_TOKENS));
        }
        trim_to_tokens(&result, self.token_budget)
    }
}
