//! Provider registry
//!
//! The declarative table mapping a provider name to its source function and
//! the names of the providers it depends on. Built once through
//! [`RegistryBuilder`], validated eagerly, immutable thereafter.
//!
//! Validation happens entirely at [`RegistryBuilder::build`]:
//! duplicate names, redefinitions of built-in names, dependencies that name
//! nothing, and dependency cycles are all construction-time errors. A
//! registry that builds successfully cannot fail structurally at resolution
//! time.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use fbc_domain::{Error, Result, Value};

use crate::builtins::is_builtin;

/// Source function of a provider: pure function of its resolved dependencies,
/// in declared order
pub type ProviderFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// A single provider declaration: name, source, dependency names
#[derive(Clone)]
pub struct ProviderDecl {
    name: String,
    source: ProviderFn,
    dependencies: Vec<String>,
}

impl ProviderDecl {
    /// The provider's unique name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The provider's source function
    pub fn source(&self) -> &ProviderFn {
        &self.source
    }

    /// Dependency names in declared order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// Immutable, insertion-ordered table of provider declarations
pub struct ProviderRegistry {
    decls: Vec<ProviderDecl>,
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a declaration by name
    pub fn get(&self, name: &str) -> Option<&ProviderDecl> {
        self.index.get(name).map(|&i| &self.decls[i])
    }

    /// True if a provider with this name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared provider names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decls.iter().map(|decl| decl.name.as_str())
    }

    /// Number of declared providers
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// True if no providers are declared
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Transitive closure of dependency names reachable from `start`
    ///
    /// Breadth-first expansion: starting from `start`, repeatedly append any
    /// dependency name of an already-included registry provider not yet
    /// included. Built-in names are included verbatim but not expanded.
    /// Every name appears exactly once, in first-seen order.
    pub fn transitive_dependencies<S: AsRef<str>>(&self, start: &[S]) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        for name in start {
            let name = name.as_ref();
            if !all.iter().any(|seen| seen == name) {
                all.push(name.to_string());
            }
        }

        let mut next = 0;
        while next < all.len() {
            if let Some(decl) = self.get(&all[next]) {
                for dependency in &decl.dependencies {
                    if !all.contains(dependency) {
                        all.push(dependency.clone());
                    }
                }
            }
            next += 1;
        }

        all
    }
}

/// Builder collecting provider declarations for validation
#[derive(Default)]
pub struct RegistryBuilder {
    decls: Vec<ProviderDecl>,
}

impl RegistryBuilder {
    /// Declare a provider by name, dependency names, and source function
    pub fn provider(
        mut self,
        name: impl Into<String>,
        dependencies: &[&str],
        source: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.decls.push(ProviderDecl {
            name: name.into(),
            source: Arc::new(source),
            dependencies: dependencies.iter().map(ToString::to_string).collect(),
        });
        self
    }

    /// Validate the declarations and build the registry
    ///
    /// # Errors
    ///
    /// * [`Error::DuplicateProvider`] - a name is declared twice
    /// * [`Error::ReservedProvider`] - a declaration redefines a built-in
    /// * [`Error::UnknownDependency`] - a dependency names nothing
    /// * [`Error::CyclicDependency`] - the dependency graph has a cycle
    pub fn build(self) -> Result<ProviderRegistry> {
        let mut index = HashMap::with_capacity(self.decls.len());
        for (i, decl) in self.decls.iter().enumerate() {
            if is_builtin(&decl.name) {
                return Err(Error::reserved_provider(&decl.name));
            }
            if index.insert(decl.name.clone(), i).is_some() {
                return Err(Error::duplicate_provider(&decl.name));
            }
        }

        for decl in &self.decls {
            for dependency in &decl.dependencies {
                if !is_builtin(dependency) && !index.contains_key(dependency) {
                    return Err(Error::unknown_dependency_for(dependency, &decl.name));
                }
            }
        }

        check_acyclic(&self.decls, &index)?;

        let registry = ProviderRegistry {
            decls: self.decls,
            index,
        };
        info!("Built provider registry with {} providers", registry.len());
        Ok(registry)
    }
}

/// Kahn's algorithm over the non-built-in dependency edges
///
/// A provider's in-degree is the number of declared providers it depends on;
/// nodes left with positive in-degree after the peel are on (or downstream
/// of) a cycle and are reported in declaration order.
fn check_acyclic(decls: &[ProviderDecl], index: &HashMap<String, usize>) -> Result<()> {
    let mut in_degree: Vec<usize> = vec![0; decls.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); decls.len()];

    for (i, decl) in decls.iter().enumerate() {
        for dependency in &decl.dependencies {
            if let Some(&dep_index) = index.get(dependency) {
                in_degree[i] += 1;
                dependents[dep_index].push(i);
            }
        }
    }

    let mut ready: Vec<usize> = (0..decls.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut processed = 0;

    while let Some(i) = ready.pop() {
        processed += 1;
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    if processed != decls.len() {
        let involved = decls
            .iter()
            .enumerate()
            .filter(|&(i, _)| in_degree[i] > 0)
            .map(|(_, decl)| decl.name.clone())
            .collect();
        return Err(Error::cyclic_dependency(involved));
    }

    Ok(())
}
