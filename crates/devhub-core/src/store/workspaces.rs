use devhub_proto::entities::{Workspace, WorkspacePatch};

use crate::cache::{Cache, Entity};

/// Workspaces of the user and the one currently selected.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceStore {
    workspaces: Cache<Workspace>,
    current: Option<Workspace>,
}

impl WorkspaceStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Cache<Workspace> {
        &self.workspaces
    }

    /// Replace the workspace list.
    pub fn set_all(&mut self, workspaces: Vec<Workspace>) {
        self.workspaces.set_all(workspaces);
    }

    /// Append unless already present.
    pub fn add(&mut self, workspace: Workspace) -> bool {
        self.workspaces.add(workspace)
    }

    /// Merge fields into a workspace and the current selection.
    pub fn update(&mut self, id: &str, patch: WorkspacePatch) -> bool {
        if let Some(current) = self.current.as_mut().filter(|w| w.id == id) {
            current.apply(patch.clone());
        }
        self.workspaces.update(id, patch)
    }

    /// Currently selected workspace.
    pub fn current_workspace(&self) -> Option<&Workspace> {
        self.current.as_ref()
    }

    /// Select a cached workspace by id. Returns `false` if it is not cached.
    pub fn select(&mut self, id: &str) -> bool {
        self.current = self.workspaces.get(id).cloned();
        self.current.is_some()
    }

    /// Set (or clear) the selection directly.
    pub fn set_current_workspace(&mut self, workspace: Option<Workspace>) {
        self.current = workspace;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(id: &str) -> Workspace {
        Workspace { id: id.to_string(), name: id.to_uppercase(), description: None, owner_id: "u".to_string() }
    }

    #[test]
    fn select_and_update_current() {
        let mut store = WorkspaceStore::new();
        store.set_all(vec![workspace("w1"), workspace("w2")]);

        assert!(store.select("w2"));
        assert!(!store.select("missing"));
        assert!(store.current_workspace().is_none());

        store.select("w1");
        let patch = WorkspacePatch { description: Some("team".to_string()), ..WorkspacePatch::default() };
        store.update("w1", patch);
        assert_eq!(store.current_workspace().unwrap().description.as_deref(), Some("team"));
    }
}
