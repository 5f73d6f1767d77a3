//! Grouping of a project's targets into scheme buckets.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::project::{AutomaticSchemes, Project, SchemeGrouping};
use crate::core::target::{Product, Target};

/// Role a target plays in a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Build,
    Test,
    Run,
}

impl Role {
    /// Classify a product.
    pub fn of(product: Product) -> Role {
        if product.is_test_bundle() {
            Role::Test
        } else if product.is_runnable() {
            Role::Run
        } else {
            Role::Build
        }
    }
}

/// Targets that end up in one scheme, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemeBucket {
    pub name: String,
    pub build: BTreeSet<String>,
    pub test: BTreeSet<String>,
    pub run: BTreeSet<String>,
}

impl SchemeBucket {
    pub fn new(name: impl Into<String>) -> Self {
        SchemeBucket {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a target under the set for its role.
    pub fn insert(&mut self, target: &Target) {
        let set = match Role::of(target.product) {
            Role::Build => &mut self.build,
            Role::Test => &mut self.test,
            Role::Run => &mut self.run,
        };
        set.insert(target.name.clone());
    }

    pub fn len(&self) -> usize {
        self.build.len() + self.test.len() + self.run.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn only_target(&self) -> Option<&String> {
        if self.len() != 1 {
            return None;
        }
        self.build
            .iter()
            .chain(self.test.iter())
            .chain(self.run.iter())
            .next()
    }
}

/// Partitions targets into buckets under a [`SchemeGrouping`] policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeGrouper;

impl SchemeGrouper {
    /// Buckets for `project` under `grouping`.
    ///
    /// `NotGrouped` yields no buckets; see [`SchemeGrouper::buckets`] for the
    /// per-target fallback.
    pub fn group(&self, project: &Project, grouping: &SchemeGrouping) -> Vec<SchemeBucket> {
        match grouping {
            SchemeGrouping::SingleScheme => {
                let mut bucket = SchemeBucket::new(&project.name);
                for target in &project.targets {
                    bucket.insert(target);
                }
                if bucket.is_empty() {
                    Vec::new()
                } else {
                    vec![bucket]
                }
            }
            SchemeGrouping::ByNameSuffix { build, test, run } => {
                group_by_suffix(&project.targets, build, test, run)
            }
            SchemeGrouping::NotGrouped => Vec::new(),
        }
    }

    /// Buckets the project's automatic scheme options ask for.
    ///
    /// Disabled schemes yield nothing. `NotGrouped` falls back to one bucket
    /// per target, which also picks up the test bundles depending on it.
    pub fn buckets(&self, project: &Project) -> Vec<SchemeBucket> {
        match &project.options.automatic_schemes {
            AutomaticSchemes::Disabled => Vec::new(),
            AutomaticSchemes::Enabled {
                grouping: SchemeGrouping::NotGrouped,
                ..
            } => per_target_buckets(project),
            AutomaticSchemes::Enabled { grouping, .. } => self.group(project, grouping),
        }
    }
}

/// One bucket per target, named after it.
pub fn per_target_buckets(project: &Project) -> Vec<SchemeBucket> {
    project
        .targets
        .iter()
        .map(|target| {
            let mut bucket = SchemeBucket::new(&target.name);
            bucket.insert(target);
            if !target.product.is_test_bundle() {
                for tests in project
                    .targets
                    .iter()
                    .filter(|t| t.product.is_test_bundle() && t.depends_on(&target.name))
                {
                    bucket.test.insert(tests.name.clone());
                }
            }
            bucket
        })
        .collect()
}

fn group_by_suffix(
    targets: &[Target],
    build_suffixes: &BTreeSet<String>,
    test_suffixes: &BTreeSet<String>,
    run_suffixes: &BTreeSet<String>,
) -> Vec<SchemeBucket> {
    let mut groups: BTreeMap<String, SchemeBucket> = BTreeMap::new();

    // Fixed pass order keeps the run-name rule independent of target order.
    for (role, suffixes) in [
        (Role::Build, build_suffixes),
        (Role::Test, test_suffixes),
        (Role::Run, run_suffixes),
    ] {
        let suffixes = longest_first(suffixes);
        let mut names: Vec<&Target> = targets
            .iter()
            .filter(|t| Role::of(t.product) == role)
            .collect();
        names.sort_by(|a, b| a.name.cmp(&b.name));

        for target in names {
            let key = if role == Role::Run && groups.contains_key(&target.name) {
                target.name.clone()
            } else {
                strip_suffix(&target.name, &suffixes).to_string()
            };
            tracing::debug!("target `{}` grouped under `{}`", target.name, key);
            groups
                .entry(key.clone())
                .or_insert_with(|| SchemeBucket::new(key))
                .insert(target);
        }
    }

    groups
        .into_values()
        .map(|mut bucket| {
            if let Some(only) = bucket.only_target().cloned() {
                bucket.name = only;
            }
            bucket
        })
        .collect()
}

fn longest_first(suffixes: &BTreeSet<String>) -> Vec<&str> {
    let mut sorted: Vec<&str> = suffixes.iter().map(String::as_str).collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted
}

/// Strip the first matching suffix, never leaving an empty name.
fn strip_suffix<'a>(name: &'a str, suffixes: &[&str]) -> &'a str {
    suffixes
        .iter()
        .filter(|s| !s.is_empty() && name.len() > s.len())
        .find_map(|s| name.strip_suffix(s))
        .unwrap_or(name)
}
