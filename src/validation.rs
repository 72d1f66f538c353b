//! Registration graph validation.
//!
//! Resolution failures normally surface on first use, possibly deep inside a
//! request path. [`Container::validate`] walks the registered bindings ahead
//! of time using the parameter metadata captured at registration, reporting
//! missing dependencies and statically detectable cycles before anything
//! resolves.

use std::collections::{HashMap, HashSet};

use crate::container::Container;
use crate::factory::{ParameterShape, ParameterSpec};
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;

/// Outcome of a validation pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Defects that will fail at resolution time.
    pub errors: Vec<ValidationError>,
    /// Suspicious constructions that still resolve.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// True when no errors were found (warnings do not count).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A defect guaranteed to fail at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A factory declares a plain parameter with no default binding.
    MissingDependency {
        /// The service whose factory declares the parameter.
        service: &'static str,
        /// The unregistered parameter type.
        dependency: &'static str,
    },
    /// Factory-backed bindings form a cycle.
    DependencyCycle {
        /// The cycle, ending with the repeated type.
        path: Vec<&'static str>,
    },
}

/// A construction that resolves but usually indicates a design slip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A singleton depends on a scoped service. The scoped value captured at
    /// first materialisation outlives its scope inside the singleton.
    CaptiveDependency {
        /// The singleton service.
        service: &'static str,
        /// The scoped dependency it captures.
        dependency: &'static str,
    },
}

struct BindingInfo {
    lifetime: Lifetime,
    params: Option<Vec<ParameterSpec>>,
}

impl Container {
    /// Checks the registration graph without resolving anything.
    ///
    /// Plain factory parameters must have a default binding; sequence and
    /// map parameters are exempt because they fall back to auto-assembly.
    /// Cycles among factory-backed bindings and captive scoped dependencies
    /// of singletons are reported as well.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirebox::{Container, Lifetime};
    /// use std::sync::Arc;
    ///
    /// struct Repo;
    /// struct Service { _repo: Arc<Repo> }
    ///
    /// let container = Container::new();
    /// container.must_register(|repo: Arc<Repo>| Service { _repo: repo }, Lifetime::Transient);
    ///
    /// // Repo was never registered.
    /// let report = container.validate();
    /// assert!(!report.is_valid());
    /// ```
    pub fn validate(&self) -> ValidationReport {
        let bindings: HashMap<ServiceKey, BindingInfo> = self.with_registry(|registry| {
            registry
                .iter_default()
                .map(|(key, binding)| {
                    (
                        *key,
                        BindingInfo {
                            lifetime: binding.lifetime,
                            params: binding.params().map(|params| params.to_vec()),
                        },
                    )
                })
                .collect()
        });

        let mut report = ValidationReport::default();

        for (key, info) in &bindings {
            let Some(params) = &info.params else { continue };
            for spec in params {
                let edge = match spec.shape {
                    ParameterShape::Plain => Some(spec.key),
                    // Collections auto-assemble when unregistered.
                    ParameterShape::Sequence { .. } | ParameterShape::Mapping { .. } => {
                        bindings.contains_key(&spec.key).then_some(spec.key)
                    }
                };
                let Some(edge) = edge else { continue };
                match bindings.get(&edge) {
                    None => report.errors.push(ValidationError::MissingDependency {
                        service: key.display_name(),
                        dependency: edge.display_name(),
                    }),
                    Some(dependency) => {
                        if info.lifetime == Lifetime::Singleton
                            && dependency.lifetime == Lifetime::Scoped
                        {
                            report.warnings.push(ValidationWarning::CaptiveDependency {
                                service: key.display_name(),
                                dependency: edge.display_name(),
                            });
                        }
                    }
                }
            }
        }

        detect_cycles(&bindings, &mut report);
        report
    }
}

/// Graph edges: parameters whose declared type has a binding of its own.
/// Auto-assembled collections contribute no edge.
fn edges_of(info: &BindingInfo, bindings: &HashMap<ServiceKey, BindingInfo>) -> Vec<ServiceKey> {
    let Some(params) = &info.params else {
        return Vec::new();
    };
    params
        .iter()
        .filter(|spec| bindings.contains_key(&spec.key))
        .map(|spec| spec.key)
        .collect()
}

fn detect_cycles(bindings: &HashMap<ServiceKey, BindingInfo>, report: &mut ValidationReport) {
    let mut finished: HashSet<ServiceKey> = HashSet::new();
    let mut reported: HashSet<ServiceKey> = HashSet::new();

    for start in bindings.keys() {
        if finished.contains(start) {
            continue;
        }
        let mut stack: Vec<ServiceKey> = Vec::new();
        let mut on_stack: HashSet<ServiceKey> = HashSet::new();
        walk(
            *start,
            bindings,
            &mut stack,
            &mut on_stack,
            &mut finished,
            &mut reported,
            report,
        );
    }
}

fn walk(
    node: ServiceKey,
    bindings: &HashMap<ServiceKey, BindingInfo>,
    stack: &mut Vec<ServiceKey>,
    on_stack: &mut HashSet<ServiceKey>,
    finished: &mut HashSet<ServiceKey>,
    reported: &mut HashSet<ServiceKey>,
    report: &mut ValidationReport,
) {
    stack.push(node);
    on_stack.insert(node);

    if let Some(info) = bindings.get(&node) {
        for next in edges_of(info, bindings) {
            if on_stack.contains(&next) {
                let from = stack.iter().position(|entry| *entry == next).unwrap_or(0);
                // One report per cycle, not one per node on it.
                if stack[from..].iter().any(|entry| reported.contains(entry)) {
                    continue;
                }
                let mut path: Vec<&'static str> =
                    stack[from..].iter().map(|entry| entry.display_name()).collect();
                path.push(next.display_name());
                for entry in &stack[from..] {
                    reported.insert(*entry);
                }
                report
                    .errors
                    .push(ValidationError::DependencyCycle { path });
            } else if !finished.contains(&next) {
                walk(next, bindings, stack, on_stack, finished, reported, report);
            }
        }
    }

    on_stack.remove(&node);
    stack.pop();
    finished.insert(node);
}
