use std::collections::BTreeMap;

use anyhow::Result;

use crate::extract::{GroupSplitter, SectionExtractor};
use crate::fingerprint::Fingerprint;
use crate::models::{Group, RunStats, Section, SourceId};
use crate::output::Layout;
use crate::registry::{DedupRegistry, HashedStore};

/// Runs extraction, grouping and deduplication for fetched manifests.
///
/// Write failures are logged and counted; they never stop the run.
pub struct Harvester {
    extractor: SectionExtractor,
    splitter: GroupSplitter,
    layout: Layout,
    store: HashedStore,
    stats: RunStats,
    aliases: BTreeMap<String, String>,
}

impl Harvester {
    pub fn new(headers: &[String], layout: Layout) -> Result<Self> {
        Ok(Self {
            extractor: SectionExtractor::new(headers)?,
            splitter: GroupSplitter::new()?,
            store: HashedStore::new(layout.hashed.clone()),
            layout,
            stats: RunStats::default(),
            aliases: BTreeMap::new(),
        })
    }

    /// Count a repository whose manifest could not be fetched.
    pub fn mark_failed(&mut self) {
        self.stats.failed += 1;
    }

    /// Process one fetched manifest end to end.
    pub fn process_repo(&mut self, registry: &mut DedupRegistry, repo: &str, document: &str) {
        self.stats.downloaded += 1;

        if let Err(e) = self.layout.write_document(repo, document) {
            tracing::error!("{:#}", e);
            self.stats.write_failures += 1;
        }

        let sections = self.extractor.extract(document);
        if sections.is_empty() {
            tracing::debug!("{} has no dependency sections", repo);
            return;
        }
        self.stats.repos_with_deps.push(repo.to_string());

        for section in &sections {
            self.stats.sections_extracted += 1;
            match self.layout.write_section(repo, section) {
                Ok(path) => tracing::info!("{}: saved [{}] to {}", repo, section.name, path.display()),
                Err(e) => {
                    tracing::error!("{:#}", e);
                    self.stats.write_failures += 1;
                }
            }

            for group in self.splitter.split(&section.body) {
                self.process_group(registry, repo, section, &group);
            }
        }
    }

    fn process_group(
        &mut self,
        registry: &mut DedupRegistry,
        repo: &str,
        section: &Section,
        group: &Group,
    ) {
        let fingerprint = Fingerprint::of(&group.text);
        let source = SourceId::new(repo, &section.name, group.index);
        let source_id = source.to_string();

        registry.record(&fingerprint, &group.text, &source_id);
        self.stats.groups_extracted += 1;

        let target = match self.store.persist(&fingerprint, &group.text, &[source_id]) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("{:#}", e);
                self.stats.write_failures += 1;
                return;
            }
        };

        self.aliases
            .insert(source.alias_file_name(), fingerprint.short().to_string());

        match self.layout.link_alias(&source, &target) {
            Ok(alias) => tracing::info!(
                "{}: group {} {} -> {}.toml",
                repo,
                group.index,
                alias.display(),
                fingerprint.short()
            ),
            Err(e) => {
                tracing::error!("{:#}", e);
                self.stats.write_failures += 1;
            }
        }
    }

    /// Write the alias index and return the final counters.
    pub fn finish(mut self, registry: &DedupRegistry, total_repos: usize) -> RunStats {
        if let Err(e) = self.layout.write_alias_index(&self.aliases) {
            tracing::error!("{:#}", e);
            self.stats.write_failures += 1;
        }

        self.stats.total_repos = total_repos;
        self.stats.unique_hashes = registry.len();
        self.stats.duplicates = registry.duplicates();
        self.stats
    }
}
