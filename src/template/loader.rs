use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::errors::ScanError;
use super::model::Template;
use super::raw::RawTemplate;
use tracing::{debug, info, warn};

const TEMPLATE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// A template file that could not be loaded. Loading continues past it.
#[derive(Debug)]
pub struct SkippedTemplate {
    pub path: PathBuf,
    pub error: ScanError,
}

#[derive(Debug, Default)]
pub struct TemplateLibrary {
    pub templates: Vec<Arc<Template>>,
    pub skipped: Vec<SkippedTemplate>,
}

impl TemplateLibrary {
    /// Load every template reachable from `paths`. Each path is a single template
    /// file or a directory searched recursively.
    pub fn load(paths: &[PathBuf]) -> Result<Self, ScanError> {
        let mut files = BTreeSet::new();
        for path in paths {
            if path.is_dir() {
                files.extend(discover_template_files(path)?);
            } else if path.is_file() {
                files.insert(path.clone());
            } else {
                return Err(ScanError::Config(format!("POC path not found: {}", path.display())));
            }
        }

        let mut library = TemplateLibrary::default();
        for file in files {
            match load_template_file(&file) {
                Ok(template) => {
                    debug!(template = %template.id, path = %file.display(), "Loaded template");
                    library.templates.push(Arc::new(template));
                }
                Err(error) => {
                    warn!(path = %file.display(), error = %error, "Skipping template");
                    library.skipped.push(SkippedTemplate { path: file, error });
                }
            }
        }

        info!(
            loaded = library.templates.len(),
            skipped = library.skipped.len(),
            "Template loading finished"
        );
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

pub fn discover_template_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();

    for ext in TEMPLATE_EXTENSIONS {
        let pattern = format!("{}/**/*.{}", base, ext);
        for entry in glob::glob(&pattern)
            .map_err(|e| ScanError::Config(format!("Invalid glob pattern: {}", e)))?
        {
            let path = entry.map_err(|e| ScanError::Config(format!("Glob error: {}", e)))?;
            if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

pub fn load_template_file(path: &Path) -> Result<Template, ScanError> {
    let content = std::fs::read_to_string(path)?;
    let source_name = path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template");
    // poc/<type>/<product>/<vuln>/<file>.yaml: the nearest directory names the category
    let category = path.parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str());

    parse_template_str(&content, source_name, category)
        .map(|t| t.with_source(path.to_path_buf()))
}

pub fn parse_template_str(
    content: &str,
    source_name: &str,
    fallback_category: Option<&str>,
) -> Result<Template, ScanError> {
    let raw: RawTemplate = serde_yaml::from_str(content)
        .map_err(|e| ScanError::malformed(source_name, e.to_string()))?;
    Template::from_raw(raw, source_name, fallback_category)
}
