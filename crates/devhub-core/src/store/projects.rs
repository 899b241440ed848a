use devhub_proto::entities::{Project, ProjectPatch, Topic};

use crate::cache::{Cache, Entity};

/// Projects visible to the user plus the one currently open.
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    projects: Cache<Project>,
    current: Option<Project>,
    current_topics: Vec<Topic>,
}

impl ProjectStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Cache<Project> {
        &self.projects
    }

    /// Replace the project list.
    pub fn set_all(&mut self, projects: Vec<Project>) {
        self.projects.set_all(projects);
    }

    /// Append unless already present.
    pub fn add(&mut self, project: Project) -> bool {
        self.projects.add(project)
    }

    /// Merge fields into a project, and into the current project if it is the
    /// same one.
    pub fn update(&mut self, id: &str, patch: ProjectPatch) -> bool {
        if let Some(current) = self.current.as_mut().filter(|p| p.id == id) {
            current.apply(patch.clone());
        }
        self.projects.update(id, patch)
    }

    /// Drop a project; clears the current project if it is the same one.
    pub fn remove(&mut self, id: &str) -> Option<Project> {
        if self.current.as_ref().is_some_and(|p| p.id == id) {
            self.current = None;
            self.current_topics.clear();
        }
        self.projects.remove(id)
    }

    /// Project currently open.
    pub fn current_project(&self) -> Option<&Project> {
        self.current.as_ref()
    }

    /// Open (or close, with `None`) a project.
    pub fn set_current_project(&mut self, project: Option<Project>) {
        self.current = project;
    }

    /// Topics of the current project, in sidebar order.
    pub fn current_topics(&self) -> &[Topic] {
        &self.current_topics
    }

    /// Replace the topics of the current project.
    pub fn set_current_topics(&mut self, mut topics: Vec<Topic>) {
        topics.sort_by_key(|t| t.position);
        self.current_topics = topics;
    }

    /// Topic of the current project by id.
    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.current_topics.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn project(id: &str, name: &str) -> Project {
        serde_json::from_value(json!({"id": id, "name": name, "owner_id": "u"})).unwrap()
    }

    #[test]
    fn update_reaches_current_project() {
        let mut store = ProjectStore::new();
        store.set_all(vec![project("p1", "Alpha"), project("p2", "Beta")]);
        store.set_current_project(Some(project("p1", "Alpha")));

        let patch = ProjectPatch { name: Some("Renamed".to_string()), ..ProjectPatch::default() };
        assert!(store.update("p1", patch));

        assert_eq!(store.cache().get("p1").unwrap().name, "Renamed");
        assert_eq!(store.current_project().unwrap().name, "Renamed");
        assert_eq!(store.cache().get("p2").unwrap().name, "Beta");
    }

    #[test]
    fn remove_clears_current_project() {
        let mut store = ProjectStore::new();
        store.set_all(vec![project("p1", "Alpha")]);
        store.set_current_project(Some(project("p1", "Alpha")));

        assert!(store.remove("p1").is_some());
        assert!(store.current_project().is_none());
        assert!(store.current_topics().is_empty());
    }

    #[test]
    fn topics_sorted_by_position() {
        let mut store = ProjectStore::new();
        let topics: Vec<Topic> = serde_json::from_value(json!([
            {"id": "b", "project_id": "p", "name": "b", "position": 2},
            {"id": "a", "project_id": "p", "name": "a", "position": 1},
        ]))
        .unwrap();
        store.set_current_topics(topics);

        assert_eq!(store.current_topics()[0].id, "a");
        assert!(store.topic("b").is_some());
    }
}
