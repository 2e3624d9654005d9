//! Site content model
//!
//! Everything shown on the site comes from one YAML document: the profile,
//! skills, projects and the blog.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blog::Blog;

/// Content bundled with the binary, used by `folio generate` without `--input`
const BUILTIN: &str = include_str!("../content/site.yaml");

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid site content: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid site content: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    #[serde(default)]
    pub social: SocialLinks,
    /// Preview image for link cards
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    pub profile: Profile,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub blog: Blog,
}

impl SiteContent {
    pub fn from_yaml(yaml: &str) -> Result<Self, ContentError> {
        let content: SiteContent = serde_yaml::from_str(yaml)?;
        content.blog.validate().map_err(ContentError::Invalid)?;
        Ok(content)
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let yaml = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// The sample portfolio shipped with folio
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_yaml(BUILTIN)
    }
}
