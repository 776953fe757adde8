use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Language (or file format) detected for an indexed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    Go,
    Rust,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Swift,
    Scala,
    R,
    Lua,
    Shell,
    PowerShell,
    Sql,
    Html,
    Css,
    Scss,
    Less,
    Json,
    Yaml,
    Toml,
    Xml,
    Markdown,
    Text,
    Dotenv,
    Dockerfile,
    Terraform,
    Protobuf,
    GraphQl,
    Vue,
    Svelte,
    Dart,
    Elixir,
    Zig,
    Nim,
    VLang,
    Makefile,
    Ignore,
}

impl Language {
    /// Detect language from a file extension (without the leading dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.to_lowercase().as_str() {
            "py" | "pyi" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "c" | "h" => Language::C,
            "cpp" | "cxx" | "cc" | "hpp" => Language::Cpp,
            "cs" => Language::CSharp,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "scala" => Language::Scala,
            "r" => Language::R,
            "lua" => Language::Lua,
            "sh" | "bash" | "zsh" => Language::Shell,
            "ps1" | "psm1" => Language::PowerShell,
            "sql" => Language::Sql,
            "html" | "htm" => Language::Html,
            "css" => Language::Css,
            "scss" => Language::Scss,
            "less" => Language::Less,
            "json" | "jsonc" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            "toml" => Language::Toml,
            "xml" => Language::Xml,
            "md" | "mdx" => Language::Markdown,
            "txt" => Language::Text,
            "env" => Language::Dotenv,
            "dockerfile" => Language::Dockerfile,
            "tf" | "hcl" => Language::Terraform,
            "proto" => Language::Protobuf,
            "graphql" | "gql" => Language::GraphQl,
            "vue" => Language::Vue,
            "svelte" => Language::Svelte,
            "dart" => Language::Dart,
            "ex" | "exs" => Language::Elixir,
            "zig" => Language::Zig,
            "nim" => Language::Nim,
            "v" => Language::VLang,
            _ => return None,
        };
        Some(lang)
    }

    /// Detect language from a bare file name that carries no known extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dockerfile" | "containerfile" => Some(Language::Dockerfile),
            "makefile" | "gnumakefile" => Some(Language::Makefile),
            ".gitignore" | ".dockerignore" | ".localaiignore" => Some(Language::Ignore),
            _ => None,
        }
    }

    /// Detect language from file path: extension first, then file name conventions
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .or_else(|| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(Self::from_file_name)
            })
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Scala => "scala",
            Language::R => "r",
            Language::Lua => "lua",
            Language::Shell => "shell",
            Language::PowerShell => "powershell",
            Language::Sql => "sql",
            Language::Html => "html",
            Language::Css => "css",
            Language::Scss => "scss",
            Language::Less => "less",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Xml => "xml",
            Language::Markdown => "markdown",
            Language::Text => "text",
            Language::Dotenv => "dotenv",
            Language::Dockerfile => "dockerfile",
            Language::Terraform => "terraform",
            Language::Protobuf => "protobuf",
            Language::GraphQl => "graphql",
            Language::Vue => "vue",
            Language::Svelte => "svelte",
            Language::Dart => "dart",
            Language::Elixir => "elixir",
            Language::Zig => "zig",
            Language::Nim => "nim",
            Language::VLang => "vlang",
            Language::Makefile => "makefile",
            Language::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
