// SPDX-License-Identifier: Apache-2.0

//! Language detection from file paths.
//!
//! Detection is purely path based: the extension after the last dot decides
//! the language, except for `Dockerfile` which is recognized by name.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source languages known to the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// JavaScript (`.js`, `.jsx`, `.mjs`, `.cjs`).
    Javascript,
    /// TypeScript (`.ts`, `.tsx`).
    Typescript,
    /// Java.
    Java,
    /// Python.
    Python,
    /// PHP.
    Php,
    /// C#.
    Csharp,
    /// SQL scripts.
    Sql,
    /// Go.
    Go,
    /// Ruby.
    Ruby,
    /// Swift.
    Swift,
    /// Kotlin.
    Kotlin,
    /// Rust.
    Rust,
    /// C.
    C,
    /// C++.
    Cpp,
    /// Scala.
    Scala,
    /// Shell scripts.
    Shell,
    /// Dart.
    Dart,
    /// R.
    R,
    /// Terraform.
    Terraform,
    /// Dockerfile.
    Dockerfile,
    /// YAML documents (including Kubernetes manifests).
    Yaml,
    /// Anything else.
    #[default]
    Unknown,
}

/// Extension table, lowercase and without the leading dot.
const EXTENSIONS: &[(&str, Language)] = &[
    ("js", Language::Javascript),
    ("jsx", Language::Javascript),
    ("mjs", Language::Javascript),
    ("cjs", Language::Javascript),
    ("ts", Language::Typescript),
    ("tsx", Language::Typescript),
    ("java", Language::Java),
    ("py", Language::Python),
    ("pyw", Language::Python),
    ("pyi", Language::Python),
    ("php", Language::Php),
    ("phtml", Language::Php),
    ("php3", Language::Php),
    ("php4", Language::Php),
    ("php5", Language::Php),
    ("cs", Language::Csharp),
    ("csx", Language::Csharp),
    ("sql", Language::Sql),
    ("go", Language::Go),
    ("rb", Language::Ruby),
    ("rbw", Language::Ruby),
    ("rake", Language::Ruby),
    ("swift", Language::Swift),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("ktm", Language::Kotlin),
    ("rs", Language::Rust),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("hxx", Language::Cpp),
    ("scala", Language::Scala),
    ("sc", Language::Scala),
    ("sh", Language::Shell),
    ("bash", Language::Shell),
    ("zsh", Language::Shell),
    ("dart", Language::Dart),
    ("r", Language::R),
    ("tf", Language::Terraform),
    ("tfvars", Language::Terraform),
    ("yaml", Language::Yaml),
    ("yml", Language::Yaml),
];

impl Language {
    /// Lowercase identifier, as used in JSON output and pattern tables.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Java => "java",
            Language::Python => "python",
            Language::Php => "php",
            Language::Csharp => "csharp",
            Language::Sql => "sql",
            Language::Go => "go",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Rust => "rust",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Scala => "scala",
            Language::Shell => "shell",
            Language::Dart => "dart",
            Language::R => "r",
            Language::Terraform => "terraform",
            Language::Dockerfile => "dockerfile",
            Language::Yaml => "yaml",
            Language::Unknown => "unknown",
        }
    }

    /// Parses a language identifier such as `"go"` or `"TypeScript"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        supported_languages()
            .into_iter()
            .find(|lang| lang.as_str() == lower)
    }

    /// Whether the analyzer has anything to say about this language.
    #[must_use]
    pub fn is_supported(self) -> bool {
        self != Language::Unknown
    }

    /// Info-string used for fenced code blocks in Markdown.
    #[must_use]
    pub fn fence(self) -> &'static str {
        match self {
            Language::Unknown => "",
            Language::Csharp => "csharp",
            Language::Shell => "bash",
            Language::Terraform => "hcl",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of detecting the language of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    /// Detected language.
    pub language: Language,
    /// Lowercased extension including the dot (e.g. `.go`), empty if none.
    pub extension: String,
    /// Whether the language is supported for analysis.
    pub is_supported: bool,
}

/// Detects the language of a file from its path.
///
/// The extension is taken after the last dot of the file name and compared
/// case-insensitively. `Dockerfile` and `Dockerfile.*` are detected by name.
#[must_use]
pub fn detect_language(path: &str) -> LanguageInfo {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);

    if file_name == "Dockerfile" || file_name.starts_with("Dockerfile.") {
        return LanguageInfo {
            language: Language::Dockerfile,
            extension: extension_of(file_name),
            is_supported: true,
        };
    }

    let extension = extension_of(file_name);
    let language = extension
        .strip_prefix('.')
        .and_then(|ext| {
            EXTENSIONS
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, lang)| *lang)
        })
        .unwrap_or_default();

    LanguageInfo {
        language,
        extension,
        is_supported: language.is_supported(),
    }
}

/// Returns true if the path maps to a supported language.
#[must_use]
pub fn is_language_supported(path: &str) -> bool {
    detect_language(path).is_supported
}

/// All recognized extensions, with leading dot.
#[must_use]
pub fn supported_extensions() -> Vec<String> {
    EXTENSIONS.iter().map(|(ext, _)| format!(".{ext}")).collect()
}

/// All supported languages, in table order.
#[must_use]
pub fn supported_languages() -> Vec<Language> {
    let mut languages: Vec<Language> = Vec::new();
    for (_, lang) in EXTENSIONS {
        if !languages.contains(lang) {
            languages.push(*lang);
        }
    }
    languages.push(Language::Dockerfile);
    languages
}

/// Extensions registered for one language.
#[must_use]
pub fn extensions_for(language: Language) -> Vec<String> {
    EXTENSIONS
        .iter()
        .filter(|(_, lang)| *lang == language)
        .map(|(ext, _)| format!(".{ext}"))
        .collect()
}

fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => file_name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Path helper shared by analysis and IaC dispatch.
pub(crate) fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
