// SPDX-License-Identifier: Apache-2.0

//! Rules and languages listings.

use anyhow::{Result, anyhow};
use neatcommit_core::language::{extensions_for, supported_languages};
use neatcommit_core::structure::has_structure_support;
use neatcommit_core::{Language, PatternEngine};

use super::types::{LanguageRow, LanguagesResult, RuleRow, RulesResult};

/// Lists the security rules, optionally restricted to one language.
pub fn run_rules(language: Option<&str>) -> Result<RulesResult> {
    let engine = PatternEngine::global();

    let definitions = match language {
        Some(name) => {
            let language = Language::from_name(name).ok_or_else(|| {
                anyhow!("Unknown language: {name}. Run `neatcommit languages` for the list.")
            })?;
            engine.patterns_for(language)
        }
        None => engine.rules(),
    };

    let rules = definitions
        .into_iter()
        .map(|def| RuleRow {
            id: def.rule_id(),
            name: def.name.clone(),
            severity: def.severity.label().to_string(),
            category: def.category.label().to_string(),
            languages: def.languages.clone(),
            cwe: def.cwe.clone(),
        })
        .collect();

    Ok(RulesResult {
        language: language.map(str::to_lowercase),
        rules,
    })
}

/// Lists supported languages with their extensions.
pub fn run_languages() -> LanguagesResult {
    let languages = supported_languages()
        .into_iter()
        .map(|language| {
            let mut extensions = extensions_for(language);
            if language == Language::Dockerfile {
                extensions = vec!["Dockerfile".to_string(), "Dockerfile.*".to_string()];
            }
            LanguageRow {
                name: language.as_str().to_string(),
                extensions,
                structure: has_structure_support(language),
            }
        })
        .collect();

    LanguagesResult { languages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_for_language_include_universal() {
        let go = run_rules(Some("Go")).unwrap();
        assert_eq!(go.language.as_deref(), Some("go"));
        assert!(go.rules.iter().any(|r| r.id == "hardcoded-password"));
        assert!(go.rules.iter().any(|r| r.id == "go-exec-command-variable"));
        assert!(go.rules.iter().all(|r| r.languages.is_empty()
            || r.languages.iter().any(|l| l == "go")));

        let all = run_rules(None).unwrap();
        assert!(all.rules.len() > go.rules.len());
    }

    #[test]
    fn test_unknown_language() {
        let err = run_rules(Some("cobol")).unwrap_err();
        assert!(err.to_string().contains("Unknown language: cobol"));
    }

    #[test]
    fn test_languages() {
        let result = run_languages();
        let python = result
            .languages
            .iter()
            .find(|l| l.name == "python")
            .unwrap();
        assert!(python.extensions.contains(&".py".to_string()));
        assert!(python.structure);

        let docker = result
            .languages
            .iter()
            .find(|l| l.name == "dockerfile")
            .unwrap();
        assert!(!docker.structure);
        assert_eq!(docker.extensions[0], "Dockerfile");
    }
}
