//! Skill documents as seen by the compiler.
//!
//! The compiler never touches XML directly: every file is turned into an
//! owned [`Node`] tree first. [`DirectorySource`] does that for the data
//! pack on disk, [`StaticSource`] for documents that are already in memory.

use std::fs;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use rayon::prelude::*;

use crate::config::LoaderConfig;
use crate::skills::SkillDataError;

/// One element of a configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Direct text content, trimmed. `None` when blank.
    pub text: Option<String>,
    /// Element children in document order.
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        self.text = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse an XML string into its root element.
    pub fn parse_xml(xml: &str) -> Result<Node, roxmltree::Error> {
        let doc = roxmltree::Document::parse(xml)?;
        Ok(Node::from_xml(doc.root_element()))
    }

    fn from_xml(element: roxmltree::Node<'_, '_>) -> Node {
        let mut node = Node::new(element.tag_name().name());
        node.attributes = element
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();

        let mut text = String::new();
        for child in element.children() {
            if child.is_element() {
                node.children.push(Node::from_xml(child));
            } else if child.is_text() {
                text.push_str(child.text().unwrap_or_default());
            }
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            node.text = Some(trimmed.to_string());
        }
        node
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    /// MD5 of the raw file bytes, lowercase hex.
    pub digest: String,
    pub root: Node,
}

impl Document {
    /// Parse `contents` as the document found at `path`.
    pub fn from_str(path: impl Into<PathBuf>, contents: &str) -> Result<Self, SkillDataError> {
        let path = path.into();
        let root = Node::parse_xml(contents).map_err(|source| SkillDataError::Xml {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            digest: digest(contents.as_bytes()),
            root,
        })
    }

    pub fn read(path: &Path) -> Result<Self, SkillDataError> {
        let contents = fs::read_to_string(path).map_err(|source| SkillDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(path, &contents)
    }
}

pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Anything that can hand the compiler a batch of documents.
pub trait DocumentSource: Send + Sync {
    fn documents(&self) -> Result<Vec<Document>, SkillDataError>;
}

/// Documents already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<Document>);

impl DocumentSource for StaticSource {
    fn documents(&self) -> Result<Vec<Document>, SkillDataError> {
        Ok(self.0.clone())
    }
}

/// Reads `*.xml` files from the configured skill directories.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dirs: Vec<PathBuf>,
}

impl DirectorySource {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// The main skill directory, then the custom one when enabled.
    pub fn from_config(config: &LoaderConfig) -> Self {
        let dirs = std::iter::once(config.skills_path())
            .chain(config.custom_skills_path())
            .collect();
        Self::new(dirs)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, SkillDataError> {
        let entries = fs::read_dir(dir).map_err(|source| SkillDataError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("xml"))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl DocumentSource for DirectorySource {
    /// Directories are read in order; files within each directory are
    /// parsed in parallel but returned sorted by path. Files that fail to
    /// read or parse are logged and skipped.
    fn documents(&self) -> Result<Vec<Document>, SkillDataError> {
        let mut out = Vec::new();
        for dir in &self.dirs {
            let files = Self::list_dir(dir)?;
            let parsed: Vec<Result<Document, SkillDataError>> =
                files.par_iter().map(|p| Document::read(p)).collect();
            for result in parsed {
                match result {
                    Ok(doc) => {
                        tracing::debug!("[document] {} md5={}", doc.path.display(), doc.digest);
                        out.push(doc);
                    }
                    Err(e) => tracing::warn!("[document] skipping: {e}"),
                }
            }
        }
        Ok(out)
    }
}
