//! Reads a universe from disk, inlining `#include "file"` directives.
//!
//! Includes resolve relative to the including file; each file is inlined at
//! most once. `#define`, `#undef` and `#pragma` lines (with `\` continuations)
//! are dropped, since `LIST_n` is built in.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::LoadError;

const INCLUDE_DIRECTIVE: &str = "#include";
const IGNORED_DIRECTIVES: [&str; 3] = ["#define", "#undef", "#pragma"];

/// Load `path` and everything it includes into one text.
pub fn load_universe_file(path: impl AsRef<Path>) -> Result<String, LoadError> {
    let mut seen = HashSet::new();
    let mut out = String::new();
    inline_file(path.as_ref(), &mut seen, &mut out)?;
    Ok(out)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn inline_file(path: &Path, seen: &mut HashSet<PathBuf>, out: &mut String) -> Result<(), LoadError> {
    let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !seen.insert(key) {
        debug!("skipping repeated include of '{}'", path.display());
        return Ok(());
    }
    let text = read(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let mut continuing = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if continuing {
            continuing = trimmed.ends_with('\\');
            out.push('\n');
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix(INCLUDE_DIRECTIVE) {
            let target = include_target(rest).ok_or_else(|| LoadError::IncludeSyntax {
                directive: trimmed.to_string(),
                from: path.to_path_buf(),
            })?;
            let resolved = base.join(target);
            if !resolved.is_file() {
                return Err(LoadError::MissingInclude {
                    include: target.to_string(),
                    from: path.to_path_buf(),
                });
            }
            inline_file(&resolved, seen, out)?;
            out.push('\n');
            continue;
        }
        if IGNORED_DIRECTIVES.iter().any(|d| trimmed.starts_with(d)) {
            warn!(
                "ignoring directive in '{}': {}",
                path.display(),
                trimmed.trim_end_matches('\\').trim()
            );
            continuing = trimmed.ends_with('\\');
            out.push('\n');
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    Ok(())
}

/// `"file.hpp"` or `<file.hpp>` after `#include`, optionally followed by a
/// comment.
fn include_target(rest: &str) -> Option<&str> {
    let rest = rest.trim_start();
    let close = match rest.chars().next()? {
        '"' => '"',
        '<' => '>',
        _ => return None,
    };
    let body = &rest[1..];
    let end = body.find(close)?;
    let trailing = body[end + 1..].trim();
    if !(trailing.is_empty() || trailing.starts_with("//") || trailing.starts_with("/*")) {
        return None;
    }
    let inner = body[..end].trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("loadout-source-{name}-{stamp}"));
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn include_target_accepts_quotes_and_angles() {
        assert_eq!(include_target(" \"a.hpp\""), Some("a.hpp"));
        assert_eq!(include_target("<sub/b.hpp>"), Some("sub/b.hpp"));
        assert_eq!(include_target("a.hpp"), None);
        assert_eq!(include_target("\"\""), None);
    }

    #[test]
    fn include_target_allows_trailing_comments_only() {
        assert_eq!(include_target(" \"a.hpp\" // shared kit"), Some("a.hpp"));
        assert_eq!(include_target(" <a.hpp> /* note */"), Some("a.hpp"));
        assert_eq!(include_target(" \"a.hpp\" junk"), None);
        assert_eq!(include_target(" \"a.hpp"), None);
    }

    #[test]
    fn commented_include_is_inlined() {
        let dir = temp_dir("comment");
        fs::write(dir.join("base.hpp"), "class baseMan {};\n").unwrap();
        fs::write(dir.join("main.hpp"), "#include \"base.hpp\" // shared\n").unwrap();
        let text = load_universe_file(dir.join("main.hpp")).unwrap();
        let _ = fs::remove_dir_all(&dir);
        assert!(text.contains("class baseMan"));
    }

    #[test]
    fn malformed_include_is_a_syntax_error_not_a_missing_file() {
        let dir = temp_dir("malformed");
        fs::write(dir.join("main.hpp"), "#include base.hpp\n").unwrap();
        let result = load_universe_file(dir.join("main.hpp"));
        let _ = fs::remove_dir_all(&dir);
        match result {
            Err(LoadError::IncludeSyntax { directive, .. }) => {
                assert_eq!(directive, "#include base.hpp")
            }
            other => panic!("expected include syntax error, got {other:?}"),
        }
    }

    #[test]
    fn inlines_includes_once_and_drops_defines() {
        let dir = temp_dir("inline");
        fs::write(dir.join("base.hpp"), "class baseMan {};\n").unwrap();
        fs::write(
            dir.join("main.hpp"),
            "#include \"base.hpp\"\n#include \"base.hpp\"\n#define LIST_2(x) x, \\\n  x\nclass rm : baseMan {};\n",
        )
        .unwrap();

        let text = load_universe_file(dir.join("main.hpp")).unwrap();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(text.matches("class baseMan").count(), 1);
        assert!(text.contains("class rm : baseMan"));
        assert!(!text.contains("#define"));
        assert!(!text.contains("  x"));
    }

    #[test]
    fn missing_include_is_an_error() {
        let dir = temp_dir("missing");
        fs::write(dir.join("main.hpp"), "#include \"nope.hpp\"\n").unwrap();
        let result = load_universe_file(dir.join("main.hpp"));
        let _ = fs::remove_dir_all(&dir);
        assert!(matches!(result, Err(LoadError::MissingInclude { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_universe_file("no/such/universe.hpp"),
            Err(LoadError::Io { .. })
        ));
    }
}
