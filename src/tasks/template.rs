//! Page and stylesheet templating
//!
//! Templates substitute `{{ name }}` with build variables and splice
//! `<include src="partial.tpl.html"></include>` partials, resolved relative to
//! the including file. Unknown variables are left as written.

use crate::error::TemplateError;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Deepest include chain allowed before assuming a cycle
pub const MAX_INCLUDE_DEPTH: usize = 16;

fn variable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("variable regex"))
}

fn include() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<include\s+src=["']([^"']+)["']\s*(?:/>|>\s*</include>)"#)
            .expect("include regex")
    })
}

/// Render a template whose includes resolve against `base_dir`
pub fn render(
    content: &str,
    vars: &BTreeMap<String, String>,
    base_dir: &Path,
) -> Result<String, TemplateError> {
    let expanded = expand_includes(content, base_dir, 0)?;
    Ok(substitute(&expanded, vars))
}

/// Substitute `{{ name }}` placeholders only
pub fn substitute(content: &str, vars: &BTreeMap<String, String>) -> String {
    variable()
        .replace_all(content, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn expand_includes(content: &str, base_dir: &Path, depth: usize) -> Result<String, TemplateError> {
    if !include().is_match(content) {
        return Ok(content.to_string());
    }
    if depth >= MAX_INCLUDE_DEPTH {
        return Err(TemplateError::IncludeDepth(MAX_INCLUDE_DEPTH));
    }

    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for caps in include().captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&content[last..whole.start()]);

        let path = base_dir.join(&caps[1]);
        let partial = fs::read_to_string(&path).map_err(|source| TemplateError::Include {
            path: path.clone(),
            source,
        })?;
        let partial_dir = path.parent().unwrap_or(base_dir);
        out.push_str(&expand_includes(&partial, partial_dir, depth + 1)?);

        last = whole.end();
    }
    out.push_str(&content[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute() {
        let out = substitute(
            "<title>{{ name }}</title><p>{{year}}</p>",
            &vars(&[("name", "Landing"), ("year", "2021")]),
        );
        assert_eq!(out, "<title>Landing</title><p>2021</p>");
    }

    #[test]
    fn test_dotted_and_dashed_names() {
        let out = substitute(
            "a { color: {{ theme-primary }}; } /* {{ theme.accent }} */",
            &vars(&[("theme-primary", "#123"), ("theme.accent", "#456")]),
        );
        assert_eq!(out, "a { color: #123; } /* #456 */");
    }

    #[test]
    fn test_unknown_variable_kept() {
        assert_eq!(substitute("{{ missing }}", &BTreeMap::new()), "{{ missing }}");
    }

    #[test]
    fn test_include_partials() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("partials")).unwrap();
        fs::write(
            dir.path().join("partials/header.tpl.html"),
            "<h1>{{ name }}</h1><include src=\"nav.tpl.html\"></include>",
        )
        .unwrap();
        fs::write(dir.path().join("partials/nav.tpl.html"), "<nav/>").unwrap();

        let out = render(
            "<body><include src=\"partials/header.tpl.html\"></include></body>",
            &vars(&[("name", "Landing")]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(out, "<body><h1>Landing</h1><nav/></body>");
    }

    #[test]
    fn test_missing_include() {
        let dir = TempDir::new().unwrap();
        let result = render("<include src='nope.tpl.html'/>", &BTreeMap::new(), dir.path());
        assert!(matches!(result, Err(TemplateError::Include { .. })));
    }

    #[test]
    fn test_include_cycle() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("loop.tpl.html"),
            "<include src=\"loop.tpl.html\"></include>",
        )
        .unwrap();
        let result = render(
            "<include src=\"loop.tpl.html\"></include>",
            &BTreeMap::new(),
            dir.path(),
        );
        assert!(matches!(result, Err(TemplateError::IncludeDepth(_))));
    }
}
