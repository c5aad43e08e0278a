//! Prompt templates.
//!
//! Templates are plain text with `{key}` substitution points. The built-in
//! pack ships inside the binary (from the repo's `prompts/` directory); a
//! template directory given at startup overrides any built-in of the same
//! name. Template names are relative paths without the `.txt` suffix, e.g.
//! `router` or `personas/james`.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::TemplateError;

/// The built-in template pack, embedded at compile time.
const BUILTIN: &[(&str, &str)] = &[
    ("router", include_str!("../../prompts/router.txt")),
    ("coach_base", include_str!("../../prompts/coach_base.txt")),
    ("game_plan", include_str!("../../prompts/game_plan.txt")),
    ("recovery", include_str!("../../prompts/recovery.txt")),
    (
        "technique_lookup",
        include_str!("../../prompts/technique_lookup.txt"),
    ),
    ("personas/james", include_str!("../../prompts/personas/james.txt")),
    ("personas/maria", include_str!("../../prompts/personas/maria.txt")),
    ("personas/viktor", include_str!("../../prompts/personas/viktor.txt")),
];

/// Read-only template store, shared by the classifier and the agents.
#[derive(Debug)]
pub struct PromptStore {
    templates: HashMap<String, String>,
}

impl PromptStore {
    /// The built-in pack only.
    pub fn builtin() -> Self {
        let templates = BUILTIN
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        Self { templates }
    }

    /// Built-in pack plus every `*.txt` under `dir` (recursively); files in
    /// `dir` win over built-ins of the same name.
    pub fn with_overrides(dir: &Path) -> Result<Self, TemplateError> {
        let mut store = Self::builtin();
        let mut loaded = 0usize;
        load_dir(dir, dir, &mut store.templates, &mut loaded)?;
        info!(dir = %dir.display(), loaded, "Loaded prompt overrides");
        Ok(store)
    }

    /// Look up a template by name.
    pub fn resolve(&self, name: &str) -> Result<&str, TemplateError> {
        self.templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

fn load_dir(
    root: &Path,
    dir: &Path,
    templates: &mut HashMap<String, String>,
    loaded: &mut usize,
) -> Result<(), TemplateError> {
    let io_err = |source| TemplateError::Io {
        dir: dir.display().to_string(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if path.is_dir() {
            load_dir(root, &path, templates, loaded)?;
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            let name = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .with_extension("")
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, "/");
            let text = std::fs::read_to_string(&path).map_err(io_err)?;
            debug!(name = %name, "Loaded prompt template");
            templates.insert(name, text);
            *loaded += 1;
        }
    }
    Ok(())
}

/// Substitute `{key}` placeholders with values.
///
/// Literal find/replace: every occurrence of `{key}` becomes the value;
/// placeholders with no matching key are left verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_pack_resolves() {
        let store = PromptStore::builtin();
        assert!(store.resolve("router").unwrap().contains("{user_input}"));
        assert!(store.resolve("personas/james").is_ok());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let store = PromptStore::builtin();
        let err = store.resolve("no_such_template").unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn render_substitutes_all_occurrences() {
        let out = render("{a} and {a} and {b}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x and y");
    }

    #[test]
    fn render_leaves_unmatched_placeholders_verbatim() {
        let out = render("{known} {unknown}", &[("known", "v")]);
        assert_eq!(out, "v {unknown}");
    }

    #[test]
    fn render_with_no_matching_vars_is_identity() {
        let template = "no placeholders here, just {braces}";
        assert_eq!(render(template, &[("other", "x")]), template);
    }

    #[test]
    fn directory_override_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(tmp.path().join("router.txt")).unwrap();
        writeln!(f, "custom router: {{user_input}}").unwrap();

        std::fs::create_dir(tmp.path().join("personas")).unwrap();
        std::fs::write(tmp.path().join("personas/ana.txt"), "Your name is Ana.").unwrap();

        let store = PromptStore::with_overrides(tmp.path()).unwrap();
        assert!(store.resolve("router").unwrap().starts_with("custom router"));
        // built-ins not overridden stay available
        assert!(store.resolve("coach_base").is_ok());
        // nested files get slash-separated names
        assert!(store.resolve("personas/ana").unwrap().contains("Ana"));
    }

    #[test]
    fn missing_override_dir_is_an_error() {
        let err = PromptStore::with_overrides(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
    }
}
