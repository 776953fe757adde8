use std::path::Path;

/// Marker file name and the project type it signals, in report order.
const PROJECT_MARKERS: &[(&str, &str)] = &[
    ("package.json", "node"),
    ("tsconfig.json", "typescript"),
    ("pyproject.toml", "python"),
    ("setup.py", "python"),
    ("requirements.txt", "python"),
    ("Pipfile", "python"),
    ("Cargo.toml", "rust"),
    ("go.mod", "go"),
    ("pom.xml", "java-maven"),
    ("build.gradle", "java-gradle"),
    ("build.gradle.kts", "kotlin-gradle"),
    ("Gemfile", "ruby"),
    ("composer.json", "php"),
    ("Package.swift", "swift"),
    ("CMakeLists.txt", "cmake"),
    ("Makefile", "make"),
    ("docker-compose.yml", "docker"),
    ("Dockerfile", "docker"),
    ("pubspec.yaml", "dart-flutter"),
    ("mix.exs", "elixir"),
    ("deno.json", "deno"),
    ("bun.lockb", "bun"),
];

const DOTNET_SOLUTION_EXT: &str = ".sln";

/// Project types signalled by marker files directly under `root`.
pub fn detect_project_types(root: &Path) -> Vec<String> {
    let entries: Vec<String> = match std::fs::read_dir(root) {
        Ok(dir) => dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect(),
        Err(e) => {
            log::debug!("Failed to list {}: {e}", root.display());
            return Vec::new();
        }
    };

    let mut types: Vec<String> = Vec::new();
    let mut push = |kind: &str| {
        if !types.iter().any(|t| t == kind) {
            types.push(kind.to_string());
        }
    };

    for (marker, kind) in PROJECT_MARKERS {
        if entries.iter().any(|name| name == marker) {
            push(kind);
        }
    }
    if entries.iter().any(|name| name.ends_with(DOTNET_SOLUTION_EXT)) {
        push("dotnet");
    }
    types
}
