//! Glob-to-regex translation for `searchCode`'s `filePattern` filter (spec §4.6).

use regex::Regex;

/// Compile a glob pattern into an anchored regex. `**` matches any run of
/// characters (including `/`); a `**` segment bounded by `/` on both sides
/// (e.g. `src/**/*.rs`) additionally matches zero directories, so it also
/// hits files directly under the leading segment. `*` matches any run of
/// non-`/` characters, `?` matches exactly one character; every other regex
/// metacharacter is escaped.
#[must_use]
pub fn glob_to_regex(pattern: &str) -> Regex {
    let mut out = String::from("^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    let crosses_boundary =
                        (i == 0 || chars.get(i - 1) == Some(&'/')) && chars.get(i + 2) == Some(&'/');
                    if crosses_boundary {
                        if i > 0 {
                            out.pop();
                        }
                        out.push_str("(.*/)?");
                        i += 3;
                    } else {
                        out.push_str(".*");
                        i += 2;
                    }
                } else {
                    out.push_str("[^/]*");
                    i += 1;
                }
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            c => {
                if is_regex_meta(c) {
                    out.push('\\');
                }
                out.push(c);
                i += 1;
            }
        }
    }
    out.push('$');
    Regex::new(&out).unwrap_or_else(|_| Regex::new("$^").expect("empty-match fallback regex is valid"))
}

fn is_regex_meta(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\'
    )
}

/// Whether `path` matches `pattern` under glob semantics.
#[must_use]
pub fn glob_matches(pattern: &str, path: &str) -> bool {
    glob_to_regex(pattern).is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_star_crosses_path_separators() {
        assert!(glob_matches("src/**/*.rs", "src/a/b/c.rs"));
        assert!(glob_matches("src/**/*.rs", "src/c.rs"));
    }

    #[test]
    fn single_star_stops_at_separator() {
        assert!(glob_matches("src/*.rs", "src/main.rs"));
        assert!(!glob_matches("src/*.rs", "src/nested/main.rs"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        assert!(glob_matches("file?.rs", "file1.rs"));
        assert!(!glob_matches("file?.rs", "file12.rs"));
    }

    #[test]
    fn regex_metacharacters_in_pattern_are_literal() {
        assert!(glob_matches("a+b.rs", "a+b.rs"));
        assert!(!glob_matches("a+b.rs", "aab.rs"));
    }
}
