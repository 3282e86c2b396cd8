//! Regex-based symbol extraction, one extractor per language family (spec §4.6).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Symbol, SymbolKind};

/// Names that match a declaration pattern but are control-flow or boilerplate
/// noise rather than a real symbol.
const DENYLIST: &[&str] = &[
    "if", "for", "while", "switch", "catch", "new", "return", "constructor", "else", "do",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFamily {
    Rust,
    TypeScript,
    JavaScript,
    Python,
    Go,
    Java,
    Cpp,
    Ruby,
}

impl LanguageFamily {
    /// Map a file extension (without the leading dot) to its family, or `None`
    /// for content-only extensions (md, json, yaml, …) with no symbol extractor.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "rs" => Some(Self::Rust),
            "ts" | "tsx" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "py" => Some(Self::Python),
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "c" | "cc" | "cpp" | "h" | "hpp" => Some(Self::Cpp),
            "rb" => Some(Self::Ruby),
            _ => None,
        }
    }
}

static RUST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(fn|struct|enum|trait|const|impl)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid rust symbol regex")
});
static TS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(function|class|interface|type|const|enum)\s+([A-Za-z_$][A-Za-z0-9_$]*)",
    )
    .expect("valid typescript symbol regex")
});
static JS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:default\s+)?(function|class|const)\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("valid javascript symbol regex")
});
static PY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\s*)(def|class)\s+([A-Za-z_][A-Za-z0-9_]*)").expect("valid python symbol regex"));
static GO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s+)?([A-Za-z_][A-Za-z0-9_]*)|^type\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid go symbol regex")
});
static JAVA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:public|private|protected)?\s*(?:static\s+)?(?:final\s+)?(class|interface|enum)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid java symbol regex")
});
static CPP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(class|struct)\s+([A-Za-z_][A-Za-z0-9_]*)").expect("valid c/c++ symbol regex")
});
static RUBY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(def|class|module)\s+([A-Za-z_][A-Za-z0-9_?!]*)").expect("valid ruby symbol regex"));

/// Extract symbols from `content`, already known to be `language`.
#[must_use]
pub fn extract_symbols(file_path: &str, content: &str, language: LanguageFamily) -> Vec<Symbol> {
    match language {
        LanguageFamily::Rust => extract_brace_delimited(file_path, content, &RUST_RE, 2, rust_kind),
        LanguageFamily::TypeScript => extract_brace_delimited(file_path, content, &TS_RE, 2, ts_kind),
        LanguageFamily::JavaScript => extract_brace_delimited(file_path, content, &JS_RE, 2, js_kind),
        LanguageFamily::Java => extract_brace_delimited(file_path, content, &JAVA_RE, 2, |k| match k {
            "interface" => SymbolKind::Interface,
            "enum" => SymbolKind::Enum,
            _ => SymbolKind::Class,
        }),
        LanguageFamily::Cpp => extract_brace_delimited(file_path, content, &CPP_RE, 2, |_| SymbolKind::Class),
        LanguageFamily::Go => extract_go(file_path, content),
        LanguageFamily::Python => extract_python(file_path, content),
        LanguageFamily::Ruby => extract_ruby(file_path, content),
    }
}

fn rust_kind(keyword: &str) -> SymbolKind {
    match keyword {
        "fn" => SymbolKind::Function,
        "struct" => SymbolKind::Type,
        "enum" => SymbolKind::Enum,
        "trait" => SymbolKind::Interface,
        "const" => SymbolKind::Const,
        _ => SymbolKind::Class,
    }
}

fn ts_kind(keyword: &str) -> SymbolKind {
    match keyword {
        "function" => SymbolKind::Function,
        "class" => SymbolKind::Class,
        "interface" => SymbolKind::Interface,
        "type" => SymbolKind::Type,
        "enum" => SymbolKind::Enum,
        "const" => SymbolKind::Const,
        _ => SymbolKind::Export,
    }
}

fn js_kind(keyword: &str) -> SymbolKind {
    match keyword {
        "function" => SymbolKind::Function,
        "class" => SymbolKind::Class,
        _ => SymbolKind::Const,
    }
}

/// Shared implementation for brace-delimited languages: find a declaration,
/// then count braces to find its end, capped at 500 lines (spec §4.6).
fn extract_brace_delimited(
    file_path: &str,
    content: &str,
    re: &Regex,
    name_group: usize,
    kind_of: impl Fn(&str) -> SymbolKind,
) -> Vec<Symbol> {
    let lines: Vec<&str> = content.lines().collect();
    let mut symbols = Vec::new();
    for caps in re.captures_iter(content) {
        let keyword = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let Some(name) = caps.get(name_group) else { continue };
        let name = name.as_str();
        if DENYLIST.contains(&name) {
            continue;
        }
        let byte_offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let line_start = (content[..byte_offset].matches('\n').count() + 1) as u32;
        let line_end = find_brace_close(&lines, line_start);
        symbols.push(Symbol {
            file_path: file_path.to_string(),
            name: name.to_string(),
            kind: kind_of(keyword),
            line_start,
            line_end,
            signature: lines.get((line_start - 1) as usize).map(|l| l.trim().to_string()),
            doc_comment: preceding_doc_comment(&lines, line_start),
        });
    }
    symbols
}

fn find_brace_close(lines: &[&str], line_start: u32) -> Option<u32> {
    let mut depth = 0i32;
    let mut seen_open = false;
    let limit = (line_start as usize + 500).min(lines.len());
    for (offset, line) in lines[(line_start as usize - 1)..limit].iter().enumerate() {
        for c in line.chars() {
            match c {
                '{' => {
                    depth += 1;
                    seen_open = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if seen_open && depth <= 0 {
            return Some(line_start + offset as u32);
        }
    }
    None
}

fn preceding_doc_comment(lines: &[&str], line_start: u32) -> Option<String> {
    if line_start < 2 {
        return None;
    }
    let mut doc_lines = Vec::new();
    let mut idx = line_start as usize - 2;
    loop {
        let trimmed = lines.get(idx)?.trim();
        if trimmed.starts_with("///") || trimmed.starts_with("//!") || trimmed.starts_with("*") || trimmed.starts_with("#") {
            doc_lines.push(trimmed.to_string());
            if idx == 0 {
                break;
            }
            idx -= 1;
        } else {
            break;
        }
    }
    if doc_lines.is_empty() {
        None
    } else {
        doc_lines.reverse();
        Some(doc_lines.join("\n"))
    }
}

fn extract_go(file_path: &str, content: &str) -> Vec<Symbol> {
    let lines: Vec<&str> = content.lines().collect();
    let mut symbols = Vec::new();
    for caps in GO_RE.captures_iter(content) {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if name.is_empty() || DENYLIST.contains(&name) {
            continue;
        }
        let byte_offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let line_start = (content[..byte_offset].matches('\n').count() + 1) as u32;
        let kind = if caps.get(1).is_some() { SymbolKind::Function } else { SymbolKind::Type };
        symbols.push(Symbol {
            file_path: file_path.to_string(),
            name: name.to_string(),
            kind,
            line_start,
            line_end: find_brace_close(&lines, line_start),
            signature: lines.get((line_start - 1) as usize).map(|l| l.trim().to_string()),
            doc_comment: preceding_doc_comment(&lines, line_start),
        });
    }
    symbols
}

/// Python uses indentation rather than braces to mark a block's end: the symbol
/// ends at the last line more indented than its own header (spec §4.6).
fn extract_python(file_path: &str, content: &str) -> Vec<Symbol> {
    let lines: Vec<&str> = content.lines().collect();
    let mut symbols = Vec::new();
    for caps in PY_RE.captures_iter(content) {
        let indent = caps.get(1).map(|m| m.as_str().len()).unwrap_or(0);
        let keyword = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let name = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        if name.is_empty() || DENYLIST.contains(&name) {
            continue;
        }
        let byte_offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let line_start = (content[..byte_offset].matches('\n').count() + 1) as u32;
        let mut line_end = line_start;
        for (offset, line) in lines[(line_start as usize)..].iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let this_indent = line.len() - line.trim_start().len();
            if this_indent <= indent {
                break;
            }
            line_end = line_start + 1 + offset as u32;
        }
        symbols.push(Symbol {
            file_path: file_path.to_string(),
            name: name.to_string(),
            kind: if keyword == "class" { SymbolKind::Class } else { SymbolKind::Function },
            line_start,
            line_end: Some(line_end),
            signature: lines.get((line_start - 1) as usize).map(|l| l.trim().to_string()),
            doc_comment: None,
        });
    }
    symbols
}

/// Ruby has no braces; blocks close with a matching `end` keyword at the same
/// nesting depth (spec §4.6).
fn extract_ruby(file_path: &str, content: &str) -> Vec<Symbol> {
    let lines: Vec<&str> = content.lines().collect();
    let mut symbols = Vec::new();
    for caps in RUBY_RE.captures_iter(content) {
        let keyword = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let name = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if name.is_empty() || DENYLIST.contains(&name) {
            continue;
        }
        let byte_offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let line_start = (content[..byte_offset].matches('\n').count() + 1) as u32;
        let mut depth = 1i32;
        let mut line_end = None;
        for (offset, line) in lines[(line_start as usize)..].iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("def ") || trimmed.starts_with("class ") || trimmed.starts_with("module ")
                || trimmed.starts_with("do") || trimmed.starts_with("if ") || trimmed.starts_with("unless ")
            {
                depth += 1;
            }
            if trimmed == "end" {
                depth -= 1;
                if depth == 0 {
                    line_end = Some(line_start + 1 + offset as u32);
                    break;
                }
            }
        }
        symbols.push(Symbol {
            file_path: file_path.to_string(),
            name: name.to_string(),
            kind: match keyword {
                "class" => SymbolKind::Class,
                "module" => SymbolKind::Type,
                _ => SymbolKind::Method,
            },
            line_start,
            line_end,
            signature: lines.get((line_start - 1) as usize).map(|l| l.trim().to_string()),
            doc_comment: None,
        });
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_rust_functions_and_structs() {
        let content = "pub fn route() {}\nstruct Memory {\n    id: String,\n}\n";
        let symbols = extract_symbols("lib.rs", content, LanguageFamily::Rust);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"route"));
        assert!(names.contains(&"Memory"));
    }

    #[test]
    fn denylist_filters_control_flow_keywords() {
        let content = "function new() {}\nfunction actual() {}\n";
        let symbols = extract_symbols("a.js", content, LanguageFamily::JavaScript);
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "actual");
    }

    #[test]
    fn python_indentation_ends_block() {
        let content = "def outer():\n    x = 1\n    return x\n\ndef next_fn():\n    pass\n";
        let symbols = extract_symbols("a.py", content, LanguageFamily::Python);
        assert_eq!(symbols[0].name, "outer");
        assert_eq!(symbols[0].line_end, Some(3));
    }

    #[test]
    fn ruby_end_keyword_closes_block() {
        let content = "class Widget\n  def render\n    1\n  end\nend\n";
        let symbols = extract_symbols("a.rb", content, LanguageFamily::Ruby);
        let class_sym = symbols.iter().find(|s| s.name == "Widget").unwrap();
        assert_eq!(class_sym.line_end, Some(5));
    }

    #[test]
    fn extension_maps_to_family() {
        assert_eq!(LanguageFamily::from_extension("tsx"), Some(LanguageFamily::TypeScript));
        assert_eq!(LanguageFamily::from_extension("md"), None);
    }
}
