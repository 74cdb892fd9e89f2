//! Every range of a dependency must intersect every other range
//!
//! Instances are first checked on their own: each must be semver and use the
//! range its semver group requires. Only when all of them pass are the ranges
//! compared, pair by pair. The local package, if any, is never compared; the
//! others must be compatible with it instead.

use crate::context::Context;
use crate::domain::Instance;
use crate::report::Report;
use crate::specifier::range;

pub(super) fn inspect(instances: &[&Instance], ctx: &Context) -> Vec<Report> {
    let individual: Vec<Report> = instances
        .iter()
        .map(|instance| inspect_individually(instance, ctx))
        .collect();
    if individual.iter().any(Report::is_mismatch) {
        return individual;
    }

    let semvers: Vec<String> = instances
        .iter()
        .map(|instance| ctx.semver_equivalent(instance))
        .collect();

    instances
        .iter()
        .zip(&semvers)
        .zip(individual)
        .map(|((instance, semver), report)| {
            if instance.is_local() {
                return report;
            }
            let mut mismatches: Vec<String> = Vec::new();
            for (other, other_semver) in instances.iter().zip(&semvers) {
                if !range::intersects(semver, other_semver)
                    && !mismatches.iter().any(|raw| raw == other.raw())
                {
                    mismatches.push(other.raw().to_string());
                }
            }
            if mismatches.is_empty() {
                report
            } else {
                Report::SameRangeMismatch {
                    instance: instance.id,
                    mismatches,
                }
            }
        })
        .collect()
}

fn inspect_individually(instance: &Instance, ctx: &Context) -> Report {
    if instance.specifier.get_semver().is_err() {
        return Report::UnsupportedMismatch {
            instance: instance.id,
        };
    }
    match ctx.get_fixed(instance, &instance.specifier) {
        Ok(fixed) if fixed.raw() == instance.raw() => Report::Valid {
            instance: instance.id,
            expected: None,
        },
        Ok(fixed) => Report::SemverRangeMismatch {
            instance: instance.id,
            fix: fixed,
        },
        Err(_) => Report::UnsupportedMismatch {
            instance: instance.id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, reports_for, statuses};
    use crate::report::Report;

    const CONFIG: &str = r#"{ "versionGroups": [{ "policy": "sameRange" }] }"#;

    fn files<'a>(ranges: &[(&'a str, &'a str)]) -> Vec<(String, String)> {
        ranges
            .iter()
            .map(|(pkg, raw)| {
                (
                    format!("{}/package.json", pkg),
                    format!(r#"{{ "name": "{}", "dependencies": {{ "x": "{}" }} }}"#, pkg, raw),
                )
            })
            .collect()
    }

    fn ctx_for(config: &str, ranges: &[(&str, &str)]) -> crate::context::Context {
        let owned = files(ranges);
        let borrowed: Vec<(&str, &str)> = owned
            .iter()
            .map(|(path, text)| (path.as_str(), text.as_str()))
            .collect();
        context(config, &borrowed)
    }

    #[test]
    fn test_intersecting_ranges_are_valid() {
        let ctx = ctx_for(CONFIG, &[("a", "^1.2.0"), ("b", "^1.5.0")]);
        assert_eq!(statuses(&ctx, "x"), vec![("a", "VALID"), ("b", "VALID")]);
    }

    #[test]
    fn test_disjoint_ranges_list_each_other() {
        let ctx = ctx_for(CONFIG, &[("a", "^1.2.0"), ("b", "^2.0.0")]);
        let reports = reports_for(&ctx, "x");
        let mismatches: Vec<_> = reports
            .into_iter()
            .map(|(pkg, report)| match report {
                Report::SameRangeMismatch { mismatches, .. } => (pkg, mismatches),
                other => panic!("unexpected report {:?}", other),
            })
            .collect();
        assert_eq!(
            mismatches,
            vec![
                ("a", vec!["^2.0.0".to_string()]),
                ("b", vec!["^1.2.0".to_string()]),
            ]
        );
    }

    #[test]
    fn test_mismatches_are_deduplicated_in_first_seen_order() {
        let ctx = ctx_for(
            CONFIG,
            &[("a", "^1.0.0"), ("b", "^3.0.0"), ("c", "^2.0.0"), ("d", "^3.0.0")],
        );
        match &reports_for(&ctx, "x")[0].1 {
            Report::SameRangeMismatch { mismatches, .. } => {
                assert_eq!(mismatches, &vec!["^3.0.0".to_string(), "^2.0.0".to_string()])
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_only_direct_pairs_are_compared() {
        // a and c do not intersect, b intersects both
        let ctx = ctx_for(
            CONFIG,
            &[("a", ">=1.0.0 <2.0.0"), ("b", ">=1.5.0 <3.0.0"), ("c", ">=2.0.0 <4.0.0")],
        );
        assert_eq!(
            statuses(&ctx, "x"),
            vec![
                ("a", "SAME_RANGE_MISMATCH"),
                ("b", "VALID"),
                ("c", "SAME_RANGE_MISMATCH"),
            ]
        );
    }

    #[test]
    fn test_individual_failures_skip_cross_checks() {
        let ctx = ctx_for(CONFIG, &[("a", "^1.0.0"), ("b", "latest"), ("c", "^2.0.0")]);
        assert_eq!(
            statuses(&ctx, "x"),
            vec![("a", "VALID"), ("b", "UNSUPPORTED_MISMATCH"), ("c", "VALID")]
        );
    }

    #[test]
    fn test_semver_group_range_is_checked_first() {
        let config = r#"{
            "semverGroups": [{ "range": "^" }],
            "versionGroups": [{ "policy": "sameRange" }]
        }"#;
        let ctx = ctx_for(config, &[("a", "~1.0.0"), ("b", "^2.0.0")]);
        let reports = reports_for(&ctx, "x");
        match &reports[0].1 {
            Report::SemverRangeMismatch { fix, .. } => assert_eq!(fix.raw(), "^1.0.0"),
            other => panic!("unexpected report {:?}", other),
        }
        assert_eq!(reports[1].1.status(), "VALID");
    }

    #[test]
    fn test_local_package_is_exempt() {
        let ctx = context(
            CONFIG,
            &[
                ("a/package.json", r#"{ "name": "a", "dependencies": { "x": "^2.0.0" } }"#),
                ("x/package.json", r#"{ "name": "x", "version": "1.0.0" }"#),
            ],
        );
        assert_eq!(
            statuses(&ctx, "x"),
            vec![("a", "SAME_RANGE_MISMATCH"), ("x", "VALID")]
        );
    }
}
