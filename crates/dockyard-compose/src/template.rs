// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template lookup and `{{ dotted.path }}` rendering.
//!
//! A template is the YAML body of one compose service. Placeholders name a
//! path into the render context; array elements are addressed by index
//! (`{{ internal_ports.0 }}`). Rendering is pure: the same template and
//! context always produce the same text.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use dockyard_core::{value_to_env_string, DockyardError};
use dockyard_plugin::{bundled_template, ResolvedTemplate};
use serde_json::Value;
use tracing::debug;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A template body and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Display form of the source, used in render errors.
    pub path: String,
    pub body: Cow<'static, str>,
}

/// Finds template bodies.
///
/// Lookup order for a template reference: the project templates directory,
/// then the reference as a file path, then the bundled set. Overrides are
/// always read from their replacement file.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates_dir: Option<PathBuf>,
}

impl TemplateStore {
    /// Store with only bundled templates and file-path references.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that prefers templates in `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: Some(dir.into()),
        }
    }

    pub fn load(&self, resolved: ResolvedTemplate<'_>) -> Result<Template, DockyardError> {
        match resolved {
            ResolvedTemplate::Override(path) => read(path),
            ResolvedTemplate::Bundled(reference) => {
                if let Some(dir) = &self.templates_dir {
                    let candidate = dir.join(reference);
                    if candidate.is_file() {
                        return read(&candidate);
                    }
                }
                let as_path = Path::new(reference);
                if as_path.components().count() > 1 && as_path.is_file() {
                    return read(as_path);
                }
                bundled_template(reference)
                    .map(|body| Template {
                        path: reference.to_string(),
                        body: Cow::Borrowed(body),
                    })
                    .ok_or_else(|| DockyardError::TemplateRender {
                        path: reference.to_string(),
                        detail: "template not found".to_string(),
                    })
            }
        }
    }
}

fn read(path: &Path) -> Result<Template, DockyardError> {
    debug!(path = %path.display(), "reading template file");
    let body = std::fs::read_to_string(path).map_err(|source| DockyardError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Template {
        path: path.display().to_string(),
        body: Cow::Owned(body),
    })
}

/// Substitute every placeholder in `template` from `context`.
///
/// Fails with `TemplateRender` on a missing key or an unclosed placeholder.
pub fn render(path: &str, template: &str, context: &Value) -> Result<String, DockyardError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        let end = after.find(CLOSE).ok_or_else(|| DockyardError::TemplateRender {
            path: path.to_string(),
            detail: "unclosed `{{` placeholder".to_string(),
        })?;
        let key = after[..end].trim();
        let value = lookup(context, key).ok_or_else(|| DockyardError::TemplateRender {
            path: path.to_string(),
            detail: format!("missing key `{key}`"),
        })?;
        out.push_str(&display(value));
        rest = &after[end + CLOSE.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Walk a dotted path through objects and arrays.
fn lookup<'v>(context: &'v Value, key: &str) -> Option<&'v Value> {
    if key.is_empty() {
        return None;
    }
    key.split('.').try_fold(context, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => value_to_env_string(scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Value {
        json!({
            "name": "postgres",
            "project": "shop",
            "config": { "version": "16", "debug": true, "workers": 4 },
            "internal_ports": [5432, 8080],
            "health_check": null,
        })
    }

    #[test]
    fn renders_dotted_paths_and_indexes() {
        let out = render(
            "t.yml",
            "image: postgres:{{ config.version }}\nport: {{internal_ports.1}}\nv: {{ name }}-data",
            &context(),
        )
        .unwrap();
        assert_eq!(out, "image: postgres:16\nport: 8080\nv: postgres-data");
    }

    #[test]
    fn scalars_render_without_quotes() {
        let out = render("t.yml", "{{ config.debug }} {{ config.workers }}", &context()).unwrap();
        assert_eq!(out, "true 4");
    }

    #[test]
    fn null_renders_empty() {
        assert_eq!(render("t.yml", "[{{ health_check }}]", &context()).unwrap(), "[]");
    }

    #[test]
    fn missing_key_names_the_key() {
        let err = render("postgres.yml", "{{ config.missing }}", &context()).unwrap_err();
        match err {
            DockyardError::TemplateRender { path, detail } => {
                assert_eq!(path, "postgres.yml");
                assert_eq!(detail, "missing key `config.missing`");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_index_is_missing() {
        assert!(render("t.yml", "{{ internal_ports.2 }}", &context()).is_err());
        assert!(render("t.yml", "{{ internal_ports.x }}", &context()).is_err());
    }

    #[test]
    fn unclosed_placeholder_fails() {
        let err = render("t.yml", "image: {{ name", &context()).unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "restart: unless-stopped\n";
        assert_eq!(render("t.yml", text, &context()).unwrap(), text);
    }

    #[test]
    fn store_prefers_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("redis.yml"), "image: custom-redis\n").unwrap();

        let store = TemplateStore::with_dir(dir.path());
        let t = store.load(ResolvedTemplate::Bundled("redis.yml")).unwrap();
        assert_eq!(t.body, "image: custom-redis\n");

        let t = store.load(ResolvedTemplate::Bundled("mysql.yml")).unwrap();
        assert_eq!(t.path, "mysql.yml");
        assert!(t.body.contains("mysql:"));
    }

    #[test]
    fn store_reads_override_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg.yml");
        std::fs::write(&path, "image: pg\n").unwrap();

        let t = TemplateStore::new()
            .load(ResolvedTemplate::Override(&path))
            .unwrap();
        assert_eq!(t.body, "image: pg\n");

        let missing = dir.path().join("absent.yml");
        let err = TemplateStore::new()
            .load(ResolvedTemplate::Override(&missing))
            .unwrap_err();
        assert!(matches!(err, DockyardError::Io { .. }));
    }

    #[test]
    fn unknown_reference_is_a_render_error() {
        let err = TemplateStore::new()
            .load(ResolvedTemplate::Bundled("nope.yml"))
            .unwrap_err();
        assert!(matches!(err, DockyardError::TemplateRender { .. }));
    }
}
