//! Experiment file classification.
//!
//! Discovery looks for files whose names match one of the fixed pattern
//! tables below. Every file after the first is additionally checked with
//! [`is_qualifying_file`] before it is uploaded.

use std::path::{Component, Path};

/// Dependency directory never deployed.
pub const DEPENDENCY_DIR: &str = "node_modules";

pub const SOURCE_TYPES: &[&str] = &[
    "**/*.html",
    "**/*.htm",
    "**/*.js",
    "**/*.mjs",
    "**/*.css",
    "**/*.json",
    "**/*.csv",
    "**/*.txt",
];

pub const IMAGE_TYPES: &[&str] = &[
    "**/*.png",
    "**/*.jpg",
    "**/*.jpeg",
    "**/*.gif",
    "**/*.svg",
    "**/*.webp",
    "**/*.bmp",
    "**/*.ico",
];

pub const AUDIO_TYPES: &[&str] = &[
    "**/*.mp3", "**/*.wav", "**/*.ogg", "**/*.oga", "**/*.m4a", "**/*.aac", "**/*.flac",
];

pub const VIDEO_TYPES: &[&str] = &["**/*.mp4", "**/*.webm", "**/*.ogv", "**/*.mov", "**/*.m4v"];

/// Base names that are never uploaded, whatever directory they live in.
pub const IGNORE_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "npm-shrinkwrap.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "tsconfig.json",
    "jsconfig.json",
    "composer.json",
    "webpack.config.js",
    "babel.config.js",
    "rollup.config.js",
    "vite.config.js",
    "jest.config.js",
    "gulpfile.js",
    "Gruntfile.js",
    ".eslintrc.js",
    ".eslintrc.json",
    ".prettierrc.json",
    "LICENSE.txt",
    "CHANGELOG.txt",
];

/// Union of all recognized pattern tables, in source, image, audio, video order.
pub fn discovery_patterns() -> Vec<&'static str> {
    SOURCE_TYPES
        .iter()
        .chain(IMAGE_TYPES)
        .chain(AUDIO_TYPES)
        .chain(VIDEO_TYPES)
        .copied()
        .collect()
}

/// Whether `path` matches one of the discovery patterns (case-insensitive extension match).
pub fn matches_discovery_pattern(path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();

    SOURCE_TYPES
        .iter()
        .chain(IMAGE_TYPES)
        .chain(AUDIO_TYPES)
        .chain(VIDEO_TYPES)
        .filter_map(|pattern| pattern.strip_prefix("**/*."))
        .any(|ext| ext == extension)
}

/// Last path segment, accepting both `/` and `\` as separators.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// False for anything under a dependency directory or starting with a dot.
pub fn is_experiment_file(path: &Path) -> bool {
    let in_dependency_dir = path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == DEPENDENCY_DIR));

    !in_dependency_dir && !path.to_string_lossy().starts_with('.')
}

/// Whether the base name of `path` is on the ignore list.
pub fn is_ignored(path: &Path) -> bool {
    let path = path.to_string_lossy();
    IGNORE_FILES.contains(&file_name(&path))
}

/// A file is uploaded after the first one only if it passes both checks.
pub fn is_qualifying_file(path: &Path) -> bool {
    is_experiment_file(path) && !is_ignored(path)
}
