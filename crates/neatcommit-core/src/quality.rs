// SPDX-License-Identifier: Apache-2.0

//! Code smell and duplicate block detection.

use std::collections::HashMap;

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::issue::{Issue, IssueSource};
use crate::security::types::{Category, Severity};
use crate::structure::CodeStructure;

/// Normalized blocks shorter than this are too trivial to report.
const MIN_BLOCK_CHARS: usize = 20;

/// Reports functions with too many parameters or high complexity.
#[must_use]
pub fn analyze_code_smells(structure: &CodeStructure, config: &AnalysisConfig) -> Vec<Issue> {
    let mut issues = Vec::new();

    for function in &structure.functions {
        if function.params.len() > config.max_params {
            issues.push(
                Issue::new(
                    IssueSource::Quality,
                    Severity::Low,
                    Category::Maintainability,
                    "Too many parameters",
                    format!(
                        "Function \"{}\" has {} parameters. Consider using an options object or breaking the function.",
                        function.name,
                        function.params.len()
                    ),
                )
                .at_line(function.line)
                .with_fix("Reduce parameters (e.g. use options object or split function)"),
            );
        }
        if function.complexity >= config.high_complexity {
            issues.push(
                Issue::new(
                    IssueSource::Quality,
                    Severity::Medium,
                    Category::Maintainability,
                    "High cyclomatic complexity",
                    format!(
                        "Function \"{}\" has complexity {}. Consider simplifying or splitting.",
                        function.name, function.complexity
                    ),
                )
                .at_line(function.line)
                .with_fix("Extract branches into smaller functions or simplify conditionals"),
            );
        }
    }

    issues
}

/// Reports blocks of `block_lines` consecutive lines that occur more than
/// once, ignoring indentation, inner whitespace and blank lines.
///
/// Issues come in order of first occurrence, at most `max_issues` of them.
#[must_use]
pub fn analyze_duplicates(content: &str, block_lines: usize, max_issues: usize) -> Vec<Issue> {
    if block_lines == 0 {
        return Vec::new();
    }

    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut starts: HashMap<String, Vec<usize>> = HashMap::new();

    for (index, window) in lines.windows(block_lines).enumerate() {
        let normalized = normalize_block(window);
        if normalized.chars().count() < MIN_BLOCK_CHARS {
            continue;
        }
        let entry = starts.entry(normalized).or_insert_with_key(|key| {
            order.push(key.clone());
            Vec::new()
        });
        entry.push(index + 1);
    }

    order
        .iter()
        .filter_map(|block| starts.get(block))
        .filter(|lines| lines.len() >= 2)
        .take(max_issues)
        .map(|lines| {
            let examples = lines
                .iter()
                .take(3)
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            Issue::new(
                IssueSource::Quality,
                Severity::Low,
                Category::Quality,
                "Duplicate code block",
                format!(
                    "Similar {block_lines}-line block appears {} times (e.g. lines {examples}). Consider extracting to a function.",
                    lines.len()
                ),
            )
            .at_line(lines[0])
            .with_fix("Extract duplicated logic into a shared function or module")
        })
        .collect()
}

fn normalize_block(window: &[&str]) -> String {
    window
        .iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs the code smell checks and, when `check_duplicates` is set, the
/// duplicate block check.
#[must_use]
pub fn analyze_quality(
    content: &str,
    structure: &CodeStructure,
    config: &AnalysisConfig,
    check_duplicates: bool,
) -> Vec<Issue> {
    let mut issues = analyze_code_smells(structure, config);
    let smells = issues.len();

    if check_duplicates {
        issues.extend(analyze_duplicates(
            content,
            config.duplicate_block_lines,
            config.max_duplicate_issues,
        ));
    }

    debug!(
        smells,
        duplicates = issues.len() - smells,
        "Quality analysis completed"
    );
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::FunctionInfo;

    fn function(name: &str, params: usize, complexity: u32) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            line: 3,
            column: 0,
            params: (0..params).map(|i| format!("p{i}")).collect(),
            is_async: false,
            is_arrow: false,
            complexity,
        }
    }

    fn structure(functions: Vec<FunctionInfo>) -> CodeStructure {
        CodeStructure {
            functions,
            ..CodeStructure::default()
        }
    }

    #[test]
    fn test_too_many_parameters() {
        let config = AnalysisConfig::default();
        let issues = analyze_code_smells(
            &structure(vec![function("ok", 4, 1), function("wide", 5, 1)]),
            &config,
        );

        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.title, "Too many parameters");
        assert_eq!(issue.severity, Severity::Low);
        assert_eq!(issue.category, Category::Maintainability);
        assert_eq!(issue.line, Some(3));
        assert_eq!(
            issue.description,
            "Function \"wide\" has 5 parameters. Consider using an options object or breaking the function."
        );
    }

    #[test]
    fn test_high_complexity_threshold_is_inclusive() {
        let config = AnalysisConfig::default();
        let issues = analyze_code_smells(
            &structure(vec![function("a", 0, 14), function("b", 0, 15)]),
            &config,
        );

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "High cyclomatic complexity");
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(
            issues[0].description,
            "Function \"b\" has complexity 15. Consider simplifying or splitting."
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let config = AnalysisConfig {
            max_params: 6,
            high_complexity: 30,
            ..AnalysisConfig::default()
        };
        let issues = analyze_code_smells(&structure(vec![function("f", 6, 20)]), &config);
        assert!(issues.is_empty());
    }

    const BLOCK: &str = "let total = 0;\nfor (const item of items) {\n  total += item.price;\n}\nconsole.log(total);\n";

    #[test]
    fn test_duplicate_block_detected() {
        let content = format!("{BLOCK}\n{BLOCK}");
        let issues = analyze_duplicates(&content, 5, 5);

        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.title, "Duplicate code block");
        assert_eq!(issue.category, Category::Quality);
        assert_eq!(issue.line, Some(1));
        assert_eq!(
            issue.description,
            "Similar 5-line block appears 2 times (e.g. lines 1, 7). Consider extracting to a function."
        );
    }

    #[test]
    fn test_duplicate_ignores_indentation_and_crlf() {
        let indented = BLOCK
            .lines()
            .map(|line| format!("        {line}\r\n"))
            .collect::<String>();
        let content = format!("{BLOCK}{indented}");
        let issues = analyze_duplicates(&content, 5, 5);

        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("lines 1, 6"));
    }

    #[test]
    fn test_short_blocks_are_ignored() {
        let content = "a\nb\nc\nd\ne\na\nb\nc\nd\ne\n";
        assert!(analyze_duplicates(content, 5, 5).is_empty());
    }

    #[test]
    fn test_duplicate_issue_cap() {
        let unique = (0..40)
            .map(|i| format!("let value_{i} = compute_something({i});\n"))
            .collect::<String>();
        let content = format!("{unique}{unique}");
        let issues = analyze_duplicates(&content, 5, 5);
        assert_eq!(issues.len(), 5);
        assert_eq!(issues[0].line, Some(1));
        assert_eq!(issues[4].line, Some(5));
    }

    #[test]
    fn test_fewer_lines_than_block() {
        assert!(analyze_duplicates("one line only, but long enough", 5, 5).is_empty());
        assert!(analyze_duplicates("", 5, 5).is_empty());
    }

    #[test]
    fn test_analyze_quality_without_duplicates() {
        let content = format!("{BLOCK}\n{BLOCK}");
        let config = AnalysisConfig::default();
        let functions = structure(vec![function("wide", 7, 1)]);

        assert_eq!(analyze_quality(&content, &functions, &config, true).len(), 2);
        let issues = analyze_quality(&content, &functions, &config, false);
        assert_eq!(issues.len(), 1);
        assert!(issues.iter().all(|issue| issue.source == IssueSource::Quality));
    }
}
