use std::path::{Path, PathBuf};

use labdesk_core::{Lab, LabId};
use tracing::{debug, warn};

use crate::ServiceError;

const INSTRUCTIONS_FILE: &str = "instructions.tex";
const TEMPLATE_FILE: &str = "template.tex";

/// The labs directory: one sub-directory per lab holding `instructions.tex`
/// and `template.tex`.
#[derive(Debug, Clone)]
pub struct LabCatalog {
    root: PathBuf,
}

impl LabCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids of all lab directories, sorted. A missing root is an empty catalog.
    pub async fn list(&self) -> Result<Vec<LabId>, ServiceError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("labs directory {} does not exist", self.root.display());
                return Ok(vec![]);
            }
            Err(e) => {
                return Err(ServiceError::Internal(format!(
                    "read labs dir {}: {e}",
                    self.root.display()
                )))
            }
        };

        let mut labs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ServiceError::Internal(format!("read_dir entry: {e}")))?
        {
            // metadata() follows symlinks, so linked lab dirs count
            let is_dir = tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if !is_dir {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(LabId::parse) {
                Some(Ok(id)) => labs.push(id),
                _ => debug!("skipping lab dir with unusable name {:?}", name),
            }
        }
        labs.sort();
        Ok(labs)
    }

    pub async fn get(&self, id: &LabId) -> Result<Lab, ServiceError> {
        let dir = self.lab_dir(id);
        if !is_dir(&dir).await {
            return Err(ServiceError::NotFound(format!("lab not found: {id}")));
        }
        Ok(Lab {
            id: id.clone(),
            has_instructions: is_file(&dir.join(INSTRUCTIONS_FILE)).await,
            has_template: is_file(&dir.join(TEMPLATE_FILE)).await,
        })
    }

    pub async fn instructions(&self, id: &LabId) -> Result<String, ServiceError> {
        read_lab_file(
            &self.lab_dir(id).join(INSTRUCTIONS_FILE),
            || format!("Lab instructions not found for: {id}"),
        )
        .await
    }

    pub async fn template(&self, id: &LabId) -> Result<String, ServiceError> {
        read_lab_file(
            &self.lab_dir(id).join(TEMPLATE_FILE),
            || format!("LaTeX template not found for lab {id}"),
        )
        .await
    }

    fn lab_dir(&self, id: &LabId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

async fn read_lab_file(
    path: &Path,
    not_found: impl FnOnce() -> String,
) -> Result<String, ServiceError> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ServiceError::NotFound(not_found())),
        Err(e) => Err(ServiceError::Internal(format!("read {}: {e}", path.display()))),
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> LabId {
        LabId::parse(s).unwrap()
    }

    fn seed(root: &Path) {
        let pendulum = root.join("pendulum");
        std::fs::create_dir_all(&pendulum).unwrap();
        std::fs::write(pendulum.join(INSTRUCTIONS_FILE), r"\section{Pendulum}").unwrap();
        std::fs::write(pendulum.join(TEMPLATE_FILE), "{{ student_name }}").unwrap();
        std::fs::create_dir_all(root.join("free-fall")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("not a lab")).unwrap();
        std::fs::write(root.join("README.md"), "labs").unwrap();
    }

    #[tokio::test]
    async fn list_returns_sorted_lab_dirs_only() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let catalog = LabCatalog::new(tmp.path());
        assert_eq!(catalog.list().await.unwrap(), vec![id("free-fall"), id("pendulum")]);
    }

    #[tokio::test]
    async fn missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = LabCatalog::new(tmp.path().join("nope"));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_reports_available_files() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let catalog = LabCatalog::new(tmp.path());

        let lab = catalog.get(&id("pendulum")).await.unwrap();
        assert!(lab.has_instructions && lab.has_template);
        let lab = catalog.get(&id("free-fall")).await.unwrap();
        assert!(!lab.has_instructions && !lab.has_template);
        assert!(matches!(
            catalog.get(&id("optics")).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reads_lab_files() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let catalog = LabCatalog::new(tmp.path());

        assert_eq!(
            catalog.instructions(&id("pendulum")).await.unwrap(),
            r"\section{Pendulum}"
        );
        assert_eq!(
            catalog.template(&id("pendulum")).await.unwrap(),
            "{{ student_name }}"
        );
    }

    #[tokio::test]
    async fn missing_files_have_descriptive_errors() {
        let tmp = tempfile::tempdir().unwrap();
        seed(tmp.path());
        let catalog = LabCatalog::new(tmp.path());

        let err = catalog.instructions(&id("free-fall")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "not found: Lab instructions not found for: free-fall"
        );
        let err = catalog.template(&id("free-fall")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "not found: LaTeX template not found for lab free-fall"
        );
    }
}
