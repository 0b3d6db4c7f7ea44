//! Filesystem Skill Store Adapter
//!
//! Loads skills from a directory laid out as:
//!
//! ```text
//! <skills_dir>/<skill>/SKILL.md            front matter + guidelines
//! <skills_dir>/<skill>/references/*.md     extra fragments, file-name order
//! ```
//!
//! The guidelines body of `SKILL.md` is the first reference; the files under
//! `references/` follow. Loaded skills are cached for the life of the store.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::ports::{SkillReferenceStore, SkillStoreError};

const SKILL_FILE: &str = "SKILL.md";
const REFERENCES_DIR: &str = "references";
const MAX_GUIDELINE_CHARS: usize = 3500;
const MAX_REFERENCE_CHARS: usize = 1800;

/// Sections of the SKILL.md body injected into prompts. When none are
/// present the whole body is used.
const GUIDELINE_HEADERS: &[&str] = &[
    "## 目标",
    "## 工作流",
    "## 续写规则",
    "## 润色规则",
    "## 质量检查清单",
];

#[derive(Debug, Default, Deserialize)]
struct SkillFrontMatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Skill store backed by a local directory.
#[derive(Debug, Clone)]
pub struct FilesystemSkillStore {
    skills_dir: PathBuf,
    cache: Arc<RwLock<HashMap<String, Option<Vec<String>>>>>,
}

impl FilesystemSkillStore {
    pub fn new<P: AsRef<Path>>(skills_dir: P) -> Self {
        Self {
            skills_dir: skills_dir.as_ref().to_path_buf(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn read_skill(&self, skill_name: &str) -> Result<Option<Vec<String>>, SkillStoreError> {
        let root = fs::metadata(&self.skills_dir).await.map_err(|e| {
            SkillStoreError::Unreadable(format!("{}: {}", self.skills_dir.display(), e))
        })?;
        if !root.is_dir() {
            return Err(SkillStoreError::Unreadable(format!(
                "{} is not a directory",
                self.skills_dir.display()
            )));
        }

        let skill_dir = self.skills_dir.join(skill_name);
        let skill_path = skill_dir.join(SKILL_FILE);
        if !skill_path.is_file() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&skill_path)
            .await
            .map_err(|e| SkillStoreError::Unreadable(format!("{}: {}", skill_path.display(), e)))?;
        let (front_matter, body) = split_front_matter(&raw).map_err(|reason| {
            SkillStoreError::Malformed {
                skill: skill_name.to_string(),
                reason,
            }
        })?;
        tracing::debug!(
            skill = skill_name,
            name = front_matter.name.as_deref().unwrap_or(skill_name),
            description = front_matter.description.as_deref().unwrap_or(""),
            "loaded skill document"
        );

        let mut references = Vec::new();
        let guidelines = core_guidelines(body);
        if !guidelines.is_empty() {
            references.push(guidelines);
        }
        references.extend(self.read_reference_files(&skill_dir.join(REFERENCES_DIR)).await?);
        Ok(Some(references))
    }

    async fn read_reference_files(&self, dir: &Path) -> Result<Vec<String>, SkillStoreError> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| SkillStoreError::Unreadable(format!("{}: {}", dir.display(), e)))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SkillStoreError::Unreadable(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("md") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut references = Vec::with_capacity(paths.len());
        for path in paths {
            let text = fs::read_to_string(&path)
                .await
                .map_err(|e| SkillStoreError::Unreadable(format!("{}: {}", path.display(), e)))?;
            let text = truncate_chars(text.trim(), MAX_REFERENCE_CHARS);
            if !text.is_empty() {
                references.push(text);
            }
        }
        Ok(references)
    }
}

/// Splits `---`-delimited YAML front matter from the markdown body.
fn split_front_matter(text: &str) -> Result<(SkillFrontMatter, &str), String> {
    let content = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized_start = content.strip_prefix("---\n").or_else(|| content.strip_prefix("---\r\n"));
    let Some(rest) = normalized_start else {
        return Ok((SkillFrontMatter::default(), content));
    };
    let Some(end) = rest.find("\n---") else {
        return Ok((SkillFrontMatter::default(), content));
    };

    let raw_meta = &rest[..end];
    let after = &rest[end + "\n---".len()..];
    let body = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);

    let meta = if raw_meta.trim().is_empty() {
        SkillFrontMatter::default()
    } else {
        serde_yaml::from_str(raw_meta).map_err(|e| format!("front matter: {}", e))?
    };
    Ok((meta, body))
}

fn core_guidelines(body: &str) -> String {
    let text = body.trim();
    let mut selected = Vec::new();
    let mut capture = false;
    for line in text.lines() {
        if line.starts_with("## ") {
            capture = GUIDELINE_HEADERS.contains(&line.trim());
        }
        if capture {
            selected.push(line);
        }
    }
    let merged = selected.join("\n");
    let merged = merged.trim();
    truncate_chars(if merged.is_empty() { text } else { merged }, MAX_GUIDELINE_CHARS)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[async_trait]
impl SkillReferenceStore for FilesystemSkillStore {
    async fn load_references(
        &self,
        skill_name: &str,
    ) -> Result<Option<Vec<String>>, SkillStoreError> {
        let name = skill_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Ok(None);
        }

        if let Some(cached) = self.cache.read().await.get(name) {
            return Ok(cached.clone());
        }

        let loaded = self.read_skill(name).await?;
        self.cache
            .write()
            .await
            .insert(name.to_string(), loaded.clone());
        Ok(loaded)
    }
}
