//! Bundle collection and cross-bundle ordering
//!
//! Holds every bundle of an application, answers lookups by path and orders
//! bundles so that each one comes after the bundles it references.
//!
//! ## Algorithm
//!
//! Ordering is a depth-first topological sort with three-color marking:
//!
//! 1. **WHITE** (unvisited): bundle hasn't been processed
//! 2. **GRAY** (on the current path): bundle is in the recursion stack
//! 3. **BLACK** (done): bundle and its dependencies are placed
//!
//! Reaching a GRAY bundle again means the references form a cycle. Bundles
//! are visited in collection order, so independent bundles keep their
//! configured order.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::asset::{Asset, AssetReferenceType, path};
use crate::bundle::Bundle;
use crate::error::{Result, bundle as bundle_error};
use crate::pipeline::PipelineSet;

/// Dependency map from lowercased bundle path to the paths it depends on
pub type DependencyList = HashMap<String, Vec<String>>;

#[derive(Debug, Default)]
pub struct BundleCollection {
    bundles: Vec<Bundle>,
}

impl BundleCollection {
    pub fn new(bundles: Vec<Bundle>) -> Self {
        Self { bundles }
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn into_bundles(self) -> Vec<Bundle> {
        self.bundles
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Bundle with exactly this path, ignoring case
    pub fn find_bundle(&self, path: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| path::same_path(b.path(), path))
    }

    /// Like [`BundleCollection::find_bundle`] but failing with `BundleNotFound`
    pub fn get_bundle(&self, path: &str) -> Result<&Bundle> {
        self.find_bundle(path)
            .ok_or_else(|| bundle_error::not_found(path))
    }

    /// Bundle whose path is `path` or that contains an asset at `path`
    pub fn find_bundle_containing_path(&self, path: &str) -> Option<&Bundle> {
        self.find_bundle(path)
            .or_else(|| self.bundles.iter().find(|b| b.find_asset(path).is_some()))
    }

    pub fn find_asset(&self, path: &str) -> Option<&dyn Asset> {
        self.bundles.iter().find_map(|b| b.find_asset(path))
    }

    /// True when some asset references `path` as a raw file
    pub fn raw_file_exists(&self, path: &str) -> bool {
        self.bundles
            .iter()
            .flat_map(|b| b.assets())
            .flat_map(|a| a.references())
            .any(|r| r.kind == AssetReferenceType::RawFilename && path::same_path(&r.path, path))
    }

    /// Every localization key used by any bundle, first occurrence first
    pub fn localized_strings(&self) -> Vec<String> {
        distinct(self.bundles.iter().flat_map(Bundle::localized_strings))
    }

    /// Every A/B flag used by any bundle, first occurrence first
    pub fn ab_configs(&self) -> Vec<String> {
        distinct(self.bundles.iter().flat_map(Bundle::ab_configs))
    }

    /// Process every bundle on the rayon pool.
    ///
    /// # Errors
    ///
    /// Returns the error of a failing bundle; other bundles may be left
    /// unprocessed once one fails.
    pub fn process_all(&mut self, pipelines: &PipelineSet) -> Result<()> {
        self.bundles
            .par_iter_mut()
            .map(|bundle| pipelines.process(bundle))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    /// For each bundle, the bundles it depends on.
    ///
    /// Dependency paths naming a bundle or an asset inside one map to that
    /// bundle. Paths matching nothing are logged and dropped; a link checker
    /// is the place to report them.
    pub fn dependency_list(&self) -> DependencyList {
        let mut deps = DependencyList::new();
        for bundle in &self.bundles {
            let key = bundle.path().to_lowercase();
            let mut targets: Vec<String> = Vec::new();
            for dependency in bundle.dependency_paths() {
                match self.find_bundle_containing_path(&dependency) {
                    Some(target) if !path::same_path(target.path(), bundle.path()) => {
                        let target = target.path().to_lowercase();
                        if !targets.contains(&target) {
                            targets.push(target);
                        }
                    }
                    Some(_) => {}
                    None => tracing::debug!(
                        bundle = bundle.path(),
                        reference = %dependency,
                        "reference does not match any bundle"
                    ),
                }
            }
            deps.insert(key, targets);
        }
        deps
    }

    /// Reorder bundles so dependencies come before their dependents.
    ///
    /// # Errors
    ///
    /// Returns `CircularReference` naming the cycle when bundles reference
    /// each other.
    pub fn sort_by_dependencies(&mut self) -> Result<()> {
        let deps = self.dependency_list();
        let order: Vec<String> = self.bundles.iter().map(|b| b.path().to_lowercase()).collect();
        let sorted = topological_sort(&deps, &order)?;

        let mut by_key: HashMap<String, Bundle> = self
            .bundles
            .drain(..)
            .map(|b| (b.path().to_lowercase(), b))
            .collect();
        self.bundles = sorted.iter().filter_map(|key| by_key.remove(key)).collect();
        Ok(())
    }

    /// Bundles needed to render `path`: its dependencies first, then itself
    pub fn bundles_for(&self, path: &str) -> Result<Vec<&Bundle>> {
        let root = self.get_bundle(path)?;
        let deps = self.dependency_list();
        let order = topological_sort(&deps, &[root.path().to_lowercase()])?;
        Ok(order
            .iter()
            .filter_map(|key| self.find_bundle(key))
            .collect())
    }
}

/// Context for topological sort operations
struct TopoSortContext<'a> {
    /// Dependency map (adjacency list)
    deps: &'a DependencyList,
    /// Visited bundles (BLACK)
    visited: HashSet<String>,
    /// Current path (GRAY), in visiting order for cycle reports
    stack: Vec<String>,
    /// Bundle keys in dependency order
    result: Vec<String>,
}

/// Topologically order `roots` and everything they depend on.
///
/// Returns keys with dependencies first. Roots are visited in the order
/// given, so unrelated bundles keep that order.
pub fn topological_sort(deps: &DependencyList, roots: &[String]) -> Result<Vec<String>> {
    let mut ctx = TopoSortContext {
        deps,
        visited: HashSet::new(),
        stack: Vec::new(),
        result: Vec::new(),
    };

    for name in roots {
        if !ctx.visited.contains(name) {
            topo_dfs(&mut ctx, name)?;
        }
    }

    Ok(ctx.result)
}

fn topo_dfs(ctx: &mut TopoSortContext, name: &str) -> Result<()> {
    if let Some(start) = ctx.stack.iter().position(|n| n == name) {
        let mut chain = ctx.stack[start..].to_vec();
        chain.push(name.to_string());
        return Err(bundle_error::circular(&chain));
    }

    if ctx.visited.contains(name) {
        return Ok(());
    }

    ctx.stack.push(name.to_string());

    if let Some(bundle_deps) = ctx.deps.get(name) {
        for dep_name in bundle_deps {
            topo_dfs(ctx, dep_name)?;
        }
    }

    ctx.stack.pop();
    ctx.visited.insert(name.to_string());

    // post-order: dependencies first
    ctx.result.push(name.to_string());

    Ok(())
}

fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(v.clone())).collect()
}
