//! Git-versioned storage backend.
//!
//! Documents live in `<repo>/assets/<id>.json`; `commit` stages and commits
//! only the documents of the assets it is given, one commit at a time.
//! History and status come from `git log` and `git status --porcelain`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{AssetStore, ChangedFile, FilesystemStore, RepositoryStatus, Revision};
use crate::error::{AppError, Result};
use crate::models::asset::Asset;

/// Field separator for `git log --format` output.
const FIELD_SEP: char = '\u{1f}';

/// Filesystem documents plus a commit per mutation
pub struct GitStore {
    repo_path: PathBuf,
    documents: FilesystemStore,
    author_name: String,
    author_email: String,
    /// Held across add, diff and commit so the index has one writer.
    index_lock: Mutex<()>,
}

impl GitStore {
    pub fn new(repo_path: PathBuf, author_name: String, author_email: String) -> Self {
        let documents = FilesystemStore::new(repo_path.join("assets"));
        Self {
            repo_path,
            documents,
            author_name,
            author_email,
            index_lock: Mutex::new(()),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Run git in the repository, returning stdout without trailing whitespace.
    async fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(args)
            .output()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to execute git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Storage(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// `true` when the index differs from HEAD for any of `paths`.
    async fn has_staged_changes(&self, paths: &[String]) -> Result<bool> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(["diff", "--cached", "--quiet", "--"])
            .args(paths)
            .output()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to execute git: {}", e)))?;
        // exit 1 means differences; anything else non-zero is a real failure
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(AppError::Storage(format!(
                "git diff failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    async fn log(&self, extra: &[&str]) -> Result<Vec<Revision>> {
        let format = format!("--format=%H{}%s", FIELD_SEP);
        let mut args = vec!["log", format.as_str()];
        args.extend_from_slice(extra);
        match self.git(&args).await {
            Ok(out) => Ok(parse_log(&out)),
            // No commits yet
            Err(e) => {
                debug!("git log returned nothing: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

/// Repository-relative path of an asset document.
fn document_path(id: Uuid) -> String {
    format!("assets/{}.json", id)
}

fn parse_log(output: &str) -> Vec<Revision> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let (hash, message) = line.split_once(FIELD_SEP).unwrap_or((line, ""));
            Revision {
                hash: hash.to_string(),
                short_hash: hash.chars().take(7).collect(),
                message: message.to_string(),
            }
        })
        .collect()
}

fn parse_porcelain(output: &str) -> Vec<ChangedFile> {
    output
        .lines()
        .filter(|l| l.len() > 3)
        .map(|line| ChangedFile {
            status: line[..2].trim().to_string(),
            file: line[3..].to_string(),
        })
        .collect()
}

#[async_trait]
impl AssetStore for GitStore {
    fn backend_name(&self) -> &'static str {
        "git"
    }

    async fn init(&self) -> Result<bool> {
        tokio::fs::create_dir_all(&self.repo_path).await?;
        let created = !tokio::fs::try_exists(self.repo_path.join(".git")).await?;
        if created {
            info!("Initializing library repository at {}", self.repo_path.display());
            self.git(&["init"]).await?;
            self.git(&["config", "user.name", self.author_name.as_str()]).await?;
            self.git(&["config", "user.email", self.author_email.as_str()]).await?;
        }
        self.documents.init().await?;
        Ok(created)
    }

    async fn put(&self, asset: &Asset) -> Result<()> {
        self.documents.put(asset).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asset>> {
        self.documents.get(id).await
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        self.documents.exists(id).await
    }

    async fn list(&self) -> Result<Vec<Asset>> {
        self.documents.list().await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.documents.delete(id).await
    }

    async fn commit(&self, message: &str, changed: &[Uuid]) -> Result<()> {
        if changed.is_empty() {
            return Ok(());
        }
        let paths: Vec<String> = changed.iter().map(|id| document_path(*id)).collect();

        let _guard = self.index_lock.lock().await;
        let mut add = vec!["add", "-A", "--"];
        add.extend(paths.iter().map(String::as_str));
        self.git(&add).await?;

        if !self.has_staged_changes(&paths).await? {
            debug!("Nothing to commit for '{}'", message);
            return Ok(());
        }

        let name = format!("user.name={}", self.author_name);
        let email = format!("user.email={}", self.author_email);
        // Explicit paths: anything else staged stays out of this commit
        let mut commit = vec![
            "-c",
            name.as_str(),
            "-c",
            email.as_str(),
            "commit",
            "-q",
            "-m",
            message,
            "--",
        ];
        commit.extend(paths.iter().map(String::as_str));
        self.git(&commit).await?;
        Ok(())
    }

    async fn revisions(&self, id: Uuid) -> Result<Vec<Revision>> {
        let path = document_path(id);
        self.log(&["--", path.as_str()]).await
    }

    async fn recent_revisions(&self, limit: usize) -> Result<Vec<Revision>> {
        let n = format!("-n{}", limit);
        self.log(&[n.as_str()]).await
    }

    async fn status(&self) -> Result<Option<RepositoryStatus>> {
        let porcelain = self.git(&["status", "--porcelain"]).await?;
        let branch = self
            .git(&["rev-parse", "--abbrev-ref", "HEAD"])
            .await
            .unwrap_or_else(|_| "main".to_string());
        let current_commit = self
            .git(&["rev-parse", "HEAD"])
            .await
            .map(|h| h.chars().take(8).collect())
            .unwrap_or_default();
        let changed_files = parse_porcelain(&porcelain);

        Ok(Some(RepositoryStatus {
            branch,
            current_commit,
            uncommitted_changes: changed_files.len(),
            changed_files,
            recent_commits: self.recent_revisions(5).await?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log() {
        let out = format!(
            "0123456789abcdef{sep}Checkout: Fire Sword to p1\nfedcba9876543210{sep}Added item: Fire Sword by smith\n",
            sep = FIELD_SEP
        );
        let revs = parse_log(&out);
        assert_eq!(revs.len(), 2);
        assert_eq!(revs[0].short_hash, "0123456");
        assert_eq!(revs[0].message, "Checkout: Fire Sword to p1");
        assert_eq!(revs[1].hash, "fedcba9876543210");
    }

    #[test]
    fn test_parse_log_empty() {
        assert!(parse_log("").is_empty());
    }

    #[test]
    fn test_parse_porcelain() {
        let files = parse_porcelain(" M assets/a.json\n?? assets/b.json\n");
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].status, "M");
        assert_eq!(files[0].file, "assets/a.json");
        assert_eq!(files[1].status, "??");
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_commit_and_history() {
        if !git_available() {
            return;
        }
        use crate::models::asset::NewAsset;

        let temp = tempfile::TempDir::new().unwrap();
        let store = GitStore::new(
            temp.path().join("library"),
            "Tester".into(),
            "tester@example.com".into(),
        );
        assert!(store.init().await.unwrap());
        assert!(!store.init().await.unwrap());

        let asset = NewAsset {
            name: Some("Mana Crystal".into()),
            asset_type: Some("item".into()),
            author: Some("tester".into()),
            ..Default::default()
        }
        .into_asset("https://media", chrono::Utc::now())
        .unwrap();
        store.put(&asset).await.unwrap();

        let status = store.status().await.unwrap().unwrap();
        assert_eq!(status.uncommitted_changes, 1);

        store.commit("Added item: Mana Crystal", &[asset.id]).await.unwrap();
        // Nothing staged: no-op
        store.commit("empty", &[asset.id]).await.unwrap();
        store.commit("empty", &[]).await.unwrap();

        let revisions = store.revisions(asset.id).await.unwrap();
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].message, "Added item: Mana Crystal");

        let status = store.status().await.unwrap().unwrap();
        assert_eq!(status.uncommitted_changes, 0);
        assert_eq!(status.current_commit.len(), 8);
        assert_eq!(status.recent_commits.len(), 1);
    }

    #[tokio::test]
    async fn test_commit_only_touches_given_assets() {
        if !git_available() {
            return;
        }
        use crate::models::asset::NewAsset;

        let temp = tempfile::TempDir::new().unwrap();
        let store = GitStore::new(temp.path().to_path_buf(), "T".into(), "t@e".into());
        store.init().await.unwrap();

        let make = |name: &str| {
            NewAsset {
                name: Some(name.into()),
                asset_type: Some("item".into()),
                author: Some("tester".into()),
                ..Default::default()
            }
            .into_asset("https://media", chrono::Utc::now())
            .unwrap()
        };
        let first = make("First");
        let second = make("Second");
        store.put(&first).await.unwrap();
        store.put(&second).await.unwrap();
        tokio::fs::write(temp.path().join("assets").join("partial.json.tmp"), "{")
            .await
            .unwrap();

        store.commit("Added item: First", &[first.id]).await.unwrap();

        assert_eq!(store.revisions(first.id).await.unwrap().len(), 1);
        assert!(store.revisions(second.id).await.unwrap().is_empty());

        let status = store.status().await.unwrap().unwrap();
        let pending: Vec<&str> = status.changed_files.iter().map(|f| f.file.as_str()).collect();
        assert!(pending.contains(&document_path(second.id).as_str()));
        assert!(pending.contains(&"assets/partial.json.tmp"));
        assert!(!pending.contains(&document_path(first.id).as_str()));

        // Deletions are committed through the same path list
        store.delete(first.id).await.unwrap();
        store.commit("Removed First", &[first.id]).await.unwrap();
        let revisions = store.revisions(first.id).await.unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[0].message, "Removed First");
    }

    #[tokio::test]
    async fn test_history_before_first_commit_is_empty() {
        if !git_available() {
            return;
        }
        let temp = tempfile::TempDir::new().unwrap();
        let store = GitStore::new(temp.path().to_path_buf(), "T".into(), "t@e".into());
        store.init().await.unwrap();
        assert!(store.recent_revisions(5).await.unwrap().is_empty());
        assert!(store.revisions(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
