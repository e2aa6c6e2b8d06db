//! Removal of obsolete `@rules_proto` load declarations from BUILD content.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a `load("@rules_proto//proto:defs.bzl", ...)` statement together
/// with the whitespace that follows it. The argument list may span lines.
static PROTO_LOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"load\s*\(\s*"@rules_proto//proto:defs\.bzl"\s*,\s*[^)]+\)\s*\n?"#).unwrap()
});

/// Three or more newlines, possibly separated by other whitespace.
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

/// Outcome of rewriting one BUILD file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Content after removal and blank-line collapsing.
    pub content: String,
    /// Number of load declarations removed.
    pub removed: usize,
    changed: bool,
}

impl Rewrite {
    /// True if `content` differs byte-for-byte from the input.
    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

/// Strip every proto load declaration from `content`.
///
/// Blank-line runs are collapsed only when at least one declaration was
/// removed; content without a match is returned as-is.
pub fn rewrite_content(content: &str) -> Rewrite {
    let removed = PROTO_LOAD_RE.find_iter(content).count();
    if removed == 0 {
        return Rewrite {
            content: content.to_string(),
            removed,
            changed: false,
        };
    }

    let stripped = PROTO_LOAD_RE.replace_all(content, "");
    let collapsed = BLANK_RUN_RE.replace_all(&stripped, "\n\n").into_owned();
    let changed = collapsed != content;
    Rewrite {
        content: collapsed,
        removed,
        changed,
    }
}

/// True if `content` still contains a proto load declaration.
pub fn has_proto_load(content: &str) -> bool {
    PROTO_LOAD_RE.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_leading_load_and_following_blank_line() {
        let input = "load(\"@rules_proto//proto:defs.bzl\", \"proto_library\")\n\nproto_library(name = \"x\")\n";
        let out = rewrite_content(input);
        assert!(out.is_changed());
        assert_eq!(out.removed, 1);
        assert_eq!(out.content, "proto_library(name = \"x\")\n");
    }

    #[test]
    fn leaves_content_without_load_untouched() {
        let input = "proto_library(name = \"x\")\n";
        let out = rewrite_content(input);
        assert!(!out.is_changed());
        assert_eq!(out.removed, 0);
        assert_eq!(out.content, input);
    }

    #[test]
    fn does_not_collapse_blank_lines_without_a_removal() {
        let input = "a = 1\n\n\n\nb = 2\n";
        let out = rewrite_content(input);
        assert!(!out.is_changed());
        assert_eq!(out.content, input);
    }

    #[test]
    fn removes_multi_line_declaration() {
        let input = r#"load(
    "@rules_proto//proto:defs.bzl",
    "proto_library",
    "proto_lang_toolchain",
)

proto_library(name = "x")
"#;
        let out = rewrite_content(input);
        assert_eq!(out.content, "proto_library(name = \"x\")\n");
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        let input = "load (\n  \"@rules_proto//proto:defs.bzl\" ,\"proto_library\" )\nx = 1\n";
        let out = rewrite_content(input);
        assert_eq!(out.content, "x = 1\n");
    }

    #[test]
    fn removes_every_occurrence_and_keeps_other_loads() {
        let input = r#"load("@rules_proto//proto:defs.bzl", "proto_library")
load("@rules_go//go:def.bzl", "go_library")

load("@rules_proto//proto:defs.bzl", "proto_library")

proto_library(name = "a")
"#;
        let out = rewrite_content(input);
        assert_eq!(out.removed, 2);
        assert_eq!(
            out.content,
            "load(\"@rules_go//go:def.bzl\", \"go_library\")\n\nproto_library(name = \"a\")\n"
        );
        assert!(!has_proto_load(&out.content));
    }

    #[test]
    fn collapses_blank_runs_once_a_load_was_removed() {
        let input = "a = 1\n\n\nload(\"@rules_proto//proto:defs.bzl\", \"proto_library\")\nb = 2\n";
        let out = rewrite_content(input);
        assert_eq!(out.content, "a = 1\n\nb = 2\n");
    }

    #[test]
    fn handles_declaration_at_end_of_file_without_newline() {
        let input = "x = 1\nload(\"@rules_proto//proto:defs.bzl\", \"proto_library\")";
        let out = rewrite_content(input);
        assert_eq!(out.content, "x = 1\n");
    }

    #[test]
    fn ignores_other_rules_proto_files() {
        let input = "load(\"@rules_proto//proto:toolchains.bzl\", \"proto_toolchain\")\n";
        let out = rewrite_content(input);
        assert!(!out.is_changed());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let input = "load(\"@rules_proto//proto:defs.bzl\", \"proto_library\")\n\n\n\nx = 1\n\n\n\ny = 2\n";
        let once = rewrite_content(input);
        let twice = rewrite_content(&once.content);
        assert!(once.is_changed());
        assert!(!twice.is_changed());
        assert_eq!(twice.content, once.content);
        assert!(!once.content.contains("\n\n\n"));
    }
}
