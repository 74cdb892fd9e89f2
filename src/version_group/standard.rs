//! The default policy: every instance of a dependency uses the same version
//!
//! When the dependency is itself a package of the repository, that package's
//! own version is canonical. Otherwise the highest or lowest version in use
//! wins, unless every instance already agrees.

use std::cmp::Ordering;

use super::PreferVersion;
use crate::context::Context;
use crate::domain::Instance;
use crate::report::Report;
use crate::specifier::{range, Specifier};

pub(super) fn inspect(prefer: PreferVersion, instances: &[&Instance], ctx: &Context) -> Vec<Report> {
    if let Some(local) = instances.iter().find(|instance| instance.is_local()) {
        return inspect_against_local(local, instances, ctx);
    }

    if let Some(first) = instances.first() {
        if instances.iter().all(|instance| instance.raw() == first.raw()) {
            return instances
                .iter()
                .map(|instance| Report::Valid {
                    instance: instance.id,
                    expected: Some(first.raw().to_string()),
                })
                .collect();
        }
    }

    // workspace references resolve against their local package, never against each other
    let comparable: Vec<(&Instance, String)> = instances
        .iter()
        .filter(|instance| instance.specifier.is_semver())
        .filter(|instance| !instance.specifier.is_workspace_protocol())
        .map(|instance| (*instance, ctx.semver_equivalent(instance)))
        .filter(|(_, semver)| range::is_comparable(semver))
        .collect();

    let by_version = |a: &&(&Instance, String), b: &&(&Instance, String)| {
        range::compare(&a.1, &b.1).unwrap_or(Ordering::Equal)
    };
    let preferred = match prefer {
        PreferVersion::HighestSemver => comparable.iter().max_by(by_version),
        PreferVersion::LowestSemver => comparable.iter().min_by(by_version),
    };
    let Some(expected) = preferred.and_then(|(winner, _)| winner.specifier.get_semver().ok())
    else {
        return instances
            .iter()
            .map(|instance| {
                if instance.specifier.is_workspace_protocol() {
                    workspace_reference(instance, ctx)
                } else {
                    Report::UnsupportedMismatch {
                        instance: instance.id,
                    }
                }
            })
            .collect();
    };
    let expected = &expected;

    instances
        .iter()
        .map(|instance| {
            if instance.specifier.is_workspace_protocol() {
                return workspace_reference(instance, ctx);
            }
            if !comparable.iter().any(|(c, _)| c.id == instance.id) {
                return Report::UnsupportedMismatch {
                    instance: instance.id,
                };
            }
            let fixed = instance
                .specifier
                .set_semver(expected)
                .and_then(|specifier| ctx.get_fixed(instance, &specifier));
            match fixed {
                Ok(fix) if fix.raw() == instance.raw() => Report::Valid {
                    instance: instance.id,
                    expected: Some(expected.clone()),
                },
                Ok(fix) => match prefer {
                    PreferVersion::HighestSemver => Report::HighestSemverMismatch {
                        instance: instance.id,
                        expected: expected.clone(),
                        fix,
                    },
                    PreferVersion::LowestSemver => Report::LowestSemverMismatch {
                        instance: instance.id,
                        expected: expected.clone(),
                        fix,
                    },
                },
                Err(_) => Report::UnsupportedMismatch {
                    instance: instance.id,
                },
            }
        })
        .collect()
}

/// Every instance must use the version of the local package
fn inspect_against_local(local: &Instance, instances: &[&Instance], ctx: &Context) -> Vec<Report> {
    // the local package must be publishable for its version to be canonical
    if !matches!(local.specifier, Specifier::Exact { .. }) {
        return unsupported(instances);
    }
    let expected = local.raw().trim().to_string();

    instances
        .iter()
        .map(|instance| {
            if instance.id == local.id || instance.specifier.is_workspace_protocol() {
                return Report::Valid {
                    instance: instance.id,
                    expected: Some(expected.clone()),
                };
            }
            let fixed = instance
                .specifier
                .set_semver(&expected)
                .and_then(|specifier| ctx.get_fixed(instance, &specifier));
            match fixed {
                Ok(fix) if fix.raw() == instance.raw() => Report::Valid {
                    instance: instance.id,
                    expected: Some(expected.clone()),
                },
                Ok(fix) => Report::WorkspaceMismatch {
                    instance: instance.id,
                    expected: expected.clone(),
                    fix,
                },
                Err(_) => Report::UnsupportedMismatch {
                    instance: instance.id,
                },
            }
        })
        .collect()
}

/// A `workspace:` reference follows the local package it points at, which is
/// inspected elsewhere; without one there is nothing to resolve it against
fn workspace_reference(instance: &Instance, ctx: &Context) -> Report {
    if ctx.lookup.is_local(&instance.name) {
        Report::Valid {
            instance: instance.id,
            expected: ctx.lookup.local_version(&instance.name).map(String::from),
        }
    } else {
        Report::UnsupportedMismatch {
            instance: instance.id,
        }
    }
}

fn unsupported(instances: &[&Instance]) -> Vec<Report> {
    instances
        .iter()
        .map(|instance| Report::UnsupportedMismatch {
            instance: instance.id,
        })
        .collect()
}
