//! Block template library: content-addressed templates, built-in kit, JSON catalogs.
//!
//! Templates are identified by a hash of their name. The generator picks
//! templates by position in the library; position 0 is the start block.
//!
//! # Layout
//! A catalog file is a JSON object with a `blocks` array of templates.

pub mod kit;
pub mod template;

pub use template::{template_id, BlockTemplate, DecorationGroup, FloorBox};

use autorunner_common::TemplateId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Errors from template operations.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template not found: {0:?}")]
    NotFound(TemplateId),
    #[error("template {0:?} is registered twice")]
    Duplicate(String),
    #[error("template {template:?} has no {anchor:?} anchor")]
    MissingAnchor { template: String, anchor: String },
    #[error("template {template:?} has no {group:?} path group")]
    MissingPath { template: String, group: String },
    #[error("catalog contains no templates")]
    Empty,
}

#[derive(Serialize, Deserialize)]
struct Catalog {
    blocks: Vec<BlockTemplate>,
}

/// Ordered, content-addressed template registry.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<BlockTemplate>,
    index: BTreeMap<TemplateId, usize>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the built-in kit.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for template in kit::builtin_kit() {
            // The built-in kit is validated by its own tests.
            if let Err(err) = library.register(template) {
                tracing::error!(%err, "built-in template rejected");
            }
        }
        library
    }

    /// Validate and register a template, returning its id.
    pub fn register(&mut self, template: BlockTemplate) -> Result<TemplateId, TemplateError> {
        template.validate()?;
        let id = template.id();
        if self.index.contains_key(&id) {
            return Err(TemplateError::Duplicate(template.name));
        }
        tracing::debug!(name = %template.name, outs = template.outs, "registered template");
        self.index.insert(id, self.templates.len());
        self.templates.push(template);
        Ok(id)
    }

    pub fn get(&self, id: TemplateId) -> Option<&BlockTemplate> {
        self.index.get(&id).map(|&i| &self.templates[i])
    }

    pub fn get_by_name(&self, name: &str) -> Option<&BlockTemplate> {
        self.get(template_id(name))
    }

    /// Template at a library position.
    pub fn at(&self, position: usize) -> Option<&BlockTemplate> {
        self.templates.get(position)
    }

    /// The start template (position 0).
    pub fn start(&self) -> Option<&BlockTemplate> {
        self.templates.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Save the library as a JSON catalog.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TemplateError> {
        let file = std::fs::File::create(path)?;
        let catalog = Catalog {
            blocks: self.templates.clone(),
        };
        serde_json::to_writer_pretty(file, &catalog)?;
        Ok(())
    }

    /// Load a JSON catalog. Every template is validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let file = std::fs::File::open(path.as_ref())?;
        let catalog: Catalog = serde_json::from_reader(file)?;
        if catalog.blocks.is_empty() {
            return Err(TemplateError::Empty);
        }
        let mut library = Self::new();
        for template in catalog.blocks {
            library.register(template)?;
        }
        tracing::info!(
            path = %path.as_ref().display(),
            templates = library.len(),
            "loaded block catalog"
        );
        Ok(library)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_library_has_start_first() {
        let library = TemplateLibrary::builtin();
        assert_eq!(library.len(), kit::builtin_kit().len());
        assert_eq!(library.start().unwrap().name, "Start");
        assert_eq!(library.at(0).unwrap().name, "Start");
    }

    #[test]
    fn lookup_by_id_and_name() {
        let library = TemplateLibrary::builtin();
        let fork = library.get_by_name("Fork").unwrap();
        assert!(fork.is_fork());
        assert_eq!(library.get(fork.id()).unwrap().name, "Fork");
        assert!(library.get_by_name("Loop").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut library = TemplateLibrary::new();
        library.register(kit::straight("Straight", 1, 8.0)).unwrap();
        let err = library
            .register(kit::straight("Straight", 1, 12.0))
            .unwrap_err();
        assert!(matches!(err, TemplateError::Duplicate(_)));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn invalid_template_is_not_registered() {
        let mut library = TemplateLibrary::new();
        let mut broken = kit::fork("Fork");
        broken.anchors.remove(&autorunner_common::ExitSuffix::OutL);
        assert!(library.register(broken).is_err());
        assert!(library.is_empty());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let library = TemplateLibrary::builtin();
        library.save(tmp.path()).unwrap();

        let loaded = TemplateLibrary::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), library.len());
        let names: Vec<_> = loaded.iter().map(|t| t.name.clone()).collect();
        let expected: Vec<_> = library.iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{"blocks": []}"#).unwrap();
        assert!(matches!(
            TemplateLibrary::load(tmp.path()),
            Err(TemplateError::Empty)
        ));
    }
}
