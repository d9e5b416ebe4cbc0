use git2::{Repository, Sort};
use anyhow::{Result, Context};
use crate::core::{Dag, TrackedInstance};

pub struct GitWalker {
    repo: Repository,
}

impl GitWalker {
    pub fn new(repo_path: Option<&str>) -> Result<Self> {
        let repo = match repo_path {
            Some(path) => Repository::open(path),
            None => Repository::open_from_env(),
        }.context("Failed to open repository")?;

        Ok(Self { repo })
    }

    /// Raw `(parent, child)` pairs for the walked history
    pub fn edge_list(&self, limit: Option<usize>) -> Result<Vec<(String, String)>> {
        let mut edges = Vec::new();
        let mut revwalk = self.repo.revwalk()?;

        // Start from HEAD and all local branches
        if self.repo.head().is_ok() {
            revwalk.push_head()?;
        }
        for branch in self.repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(target) = branch.get().target() {
                revwalk.push(target)?;
            }
        }

        // Newest first, so a limit keeps the most recent history
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        for (count, oid) in revwalk.enumerate() {
            if limit.is_some_and(|limit| count >= limit) {
                break;
            }

            let oid = oid?;
            let commit = self
                .repo
                .find_commit(oid)
                .with_context(|| format!("Failed to load commit {oid}"))?;

            let child = oid.to_string();
            for parent in commit.parent_ids() {
                edges.push((parent.to_string(), child.clone()));
            }
        }

        tracing::debug!(edges = edges.len(), "walked repository history");
        Ok(edges)
    }

    /// Convert repository history to a DAG
    pub fn into_dag(&self, limit: Option<usize>) -> Result<Dag> {
        Ok(Dag::from_edges(self.edge_list(limit)?))
    }

    /// The checked-out commit as a tracked instance, named after its branch
    pub fn head_instance(&self) -> Result<Option<TrackedInstance>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };

        let Some(target) = head.target() else {
            return Ok(None);
        };

        let name = if head.is_branch() {
            head.shorthand().unwrap_or("HEAD").to_string()
        } else {
            "HEAD".to_string()
        };

        let mut instance = TrackedInstance::new(target.to_string(), name);
        if let Some(workdir) = self.repo.workdir() {
            instance
                .extra
                .insert("path".to_string(), workdir.display().to_string().into());
        }

        Ok(Some(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Commit, Oid, Signature};
    use tempfile::TempDir;

    fn create_test_repo() -> Result<(TempDir, Repository)> {
        let dir = TempDir::new()?;
        let repo = Repository::init(dir.path())?;

        // Configure repo
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok((dir, repo))
    }

    fn commit_to_repo(repo: &Repository, message: &str, parents: &[&Commit], update_ref: Option<&str>) -> Result<Oid> {
        let sig = Signature::now("Test User", "test@example.com")?;
        let tree_id = {
            let mut index = repo.index()?;
            index.write_tree()?
        };
        let tree = repo.find_tree(tree_id)?;

        Ok(repo.commit(
            update_ref,
            &sig,
            &sig,
            message,
            &tree,
            parents,
        )?)
    }

    fn walker_for(repo: &Repository) -> Result<GitWalker> {
        GitWalker::new(Some(repo.path().to_str().unwrap()))
    }

    #[test]
    fn test_single_commit_has_no_edges() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;
        let oid = commit_to_repo(&repo, "Initial commit", &[], Some("HEAD"))?;

        let walker = walker_for(&repo)?;
        assert!(walker.edge_list(None)?.is_empty());

        let head = walker.head_instance()?.expect("HEAD is set");
        assert_eq!(head.commit, oid.to_string());

        Ok(())
    }

    #[test]
    fn test_linear_history() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;

        let oid1 = commit_to_repo(&repo, "First commit", &[], Some("HEAD"))?;
        let commit1 = repo.find_commit(oid1)?;

        let oid2 = commit_to_repo(&repo, "Second commit", &[&commit1], Some("HEAD"))?;
        let commit2 = repo.find_commit(oid2)?;

        let oid3 = commit_to_repo(&repo, "Third commit", &[&commit2], Some("HEAD"))?;

        let walker = walker_for(&repo)?;
        let edges = walker.edge_list(None)?;

        assert_eq!(
            edges,
            vec![
                (oid2.to_string(), oid3.to_string()),
                (oid1.to_string(), oid2.to_string()),
            ]
        );

        let dag = walker.into_dag(None)?;
        assert_eq!(dag.vertex_count(), 3);
        assert_eq!(dag.sources().len(), 1);

        Ok(())
    }

    #[test]
    fn test_merge_commit() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;

        // Create base commit
        let base_oid = commit_to_repo(&repo, "Base commit", &[], Some("HEAD"))?;
        let base_commit = repo.find_commit(base_oid)?;

        // Create branch 1
        let branch1_oid = commit_to_repo(&repo, "Branch 1", &[&base_commit], Some("HEAD"))?;
        let branch1_commit = repo.find_commit(branch1_oid)?;

        // Create branch 2 (from base, not HEAD)
        let branch2_oid = commit_to_repo(&repo, "Branch 2", &[&base_commit], None)?;
        let branch2_commit = repo.find_commit(branch2_oid)?;

        // Create merge commit
        let _merge_oid = commit_to_repo(&repo, "Merge", &[&branch1_commit, &branch2_commit], Some("HEAD"))?;

        let dag = walker_for(&repo)?.into_dag(None)?;

        assert_eq!(dag.vertex_count(), 4);
        assert_eq!(dag.edge_count(), 4); // base->b1, base->b2, b1->merge, b2->merge

        let stats = dag.stats();
        assert_eq!(stats.merge_commits, 1);
        assert_eq!(stats.branch_points, 1);
        assert_eq!(stats.root_commits, 1);

        Ok(())
    }

    #[test]
    fn test_limit_truncates_walk() -> Result<()> {
        let (_dir, repo) = create_test_repo()?;

        let mut parent: Option<Oid> = None;
        for i in 0..5 {
            let parents: Vec<Commit> = parent.iter().map(|oid| repo.find_commit(*oid)).collect::<Result<_, _>>()?;
            let refs: Vec<&Commit> = parents.iter().collect();
            parent = Some(commit_to_repo(&repo, &format!("Commit {i}"), &refs, Some("HEAD"))?);
        }

        let walker = walker_for(&repo)?;
        assert_eq!(walker.edge_list(None)?.len(), 4);
        assert_eq!(walker.edge_list(Some(3))?.len(), 3);

        Ok(())
    }
}
