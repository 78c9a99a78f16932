use serde::Serialize;

/// A repository returned by discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoInfo {
    pub name: String,
    pub full_name: String,
    pub default_branch: String,
}

/// A recognized dependency table sliced out of a manifest.
///
/// `body` keeps the header line as its first line.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub body: String,
}

impl Section {
    /// Section name with `.` and `/` replaced, safe for file names and source ids.
    pub fn safe_name(&self) -> String {
        safe_section_name(&self.name)
    }
}

pub fn safe_section_name(name: &str) -> String {
    name.replace(['.', '/'], "-")
}

/// A blank-line delimited run of dependency lines within one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// 1-based position among the accepted groups of its section.
    pub index: usize,
    pub text: String,
}

/// Where a group came from: `{repo}/{safe-section}/group{NN}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId {
    pub repo: String,
    pub section: String,
    pub index: usize,
}

impl SourceId {
    pub fn new(repo: &str, section: &str, index: usize) -> Self {
        Self {
            repo: repo.to_string(),
            section: safe_section_name(section),
            index,
        }
    }

    /// File name of the human-readable alias for this group.
    pub fn alias_file_name(&self) -> String {
        format!("{}_{}_group{:02}.toml", self.repo, self.section, self.index)
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/group{:02}", self.repo, self.section, self.index)
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub total_repos: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub sections_extracted: usize,
    pub groups_extracted: usize,
    pub unique_hashes: usize,
    pub duplicates: usize,
    pub write_failures: usize,
    pub repos_with_deps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_format() {
        let id = SourceId::new("rice", "workspace.dependencies", 3);
        assert_eq!(id.to_string(), "rice/workspace-dependencies/group03");
        assert_eq!(id.alias_file_name(), "rice_workspace-dependencies_group03.toml");
    }

    #[test]
    fn test_source_id_wide_index() {
        let id = SourceId::new("rice", "dependencies", 123);
        assert_eq!(id.to_string(), "rice/dependencies/group123");
    }

    #[test]
    fn test_run_stats_serializes_counters() {
        let stats = RunStats {
            total_repos: 2,
            repos_with_deps: vec!["rice".to_string()],
            ..RunStats::default()
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["total_repos"], 2);
        assert_eq!(value["repos_with_deps"][0], "rice");
    }

    #[test]
    fn test_safe_section_name() {
        assert_eq!(safe_section_name("a.b/c"), "a-b-c");
        assert_eq!(safe_section_name("dev-dependencies"), "dev-dependencies");
    }
}
