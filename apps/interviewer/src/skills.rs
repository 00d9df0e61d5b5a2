//! Resume skill extraction.
//!
//! Only skill tags are pulled from a resume. The keyword extractor matches a
//! fixed dictionary on word boundaries, which is crude but predictable.

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Failed to read resume: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
}

#[async_trait]
pub trait SkillExtractor: Send + Sync {
    async fn extract_skills(&self, resume_path: &str) -> Result<Vec<String>, SkillError>;
}

const SKILL_DICTIONARY: &[&str] = &[
    "aws",
    "azure",
    "c#",
    "c++",
    "css",
    "django",
    "docker",
    "excel",
    "fastapi",
    "figma",
    "flask",
    "gcp",
    "git",
    "golang",
    "graphql",
    "html",
    "java",
    "javascript",
    "jenkins",
    "kafka",
    "kotlin",
    "kubernetes",
    "linux",
    "machine learning",
    "mongodb",
    "mysql",
    "node.js",
    "pandas",
    "postgresql",
    "power bi",
    "python",
    "pytorch",
    "react",
    "redis",
    "rust",
    "scala",
    "spark",
    "spring",
    "sql",
    "swift",
    "tableau",
    "tensorflow",
    "terraform",
    "typescript",
];

static SKILL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    SKILL_DICTIONARY
        .iter()
        .filter_map(|skill| {
            let pattern = format!(r"(?i)(?:^|[^\w]){}(?:$|[^\w])", regex::escape(skill));
            Regex::new(&pattern).ok().map(|re| (*skill, re))
        })
        .collect()
});

/// Dictionary skills mentioned in `text`, lowercase and sorted.
pub fn match_skills(text: &str) -> Vec<String> {
    let mut skills: Vec<String> = SKILL_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(skill, _)| skill.to_string())
        .collect();
    skills.sort();
    skills.dedup();
    skills
}

/// Reads `.pdf` resumes through `pdf-extract` and anything else as UTF-8 text.
#[derive(Debug, Clone, Default)]
pub struct KeywordSkillExtractor;

#[async_trait]
impl SkillExtractor for KeywordSkillExtractor {
    async fn extract_skills(&self, resume_path: &str) -> Result<Vec<String>, SkillError> {
        let bytes = tokio::fs::read(resume_path).await?;
        let is_pdf = Path::new(resume_path)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        let text = if is_pdf {
            // pdf-extract is synchronous and CPU-bound
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| SkillError::Pdf(e.to_string()))?
                .map_err(|e| SkillError::Pdf(format!("{e:?}")))?
        } else {
            String::from_utf8_lossy(&bytes).into_owned()
        };

        let skills = match_skills(&text);
        debug!("Extracted {} skills from {resume_path}", skills.len());
        Ok(skills)
    }
}
