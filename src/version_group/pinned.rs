//! Every instance must use the pinned version, re-ranged by its semver group

use crate::context::Context;
use crate::domain::Instance;
use crate::report::Report;
use crate::specifier::Specifier;

pub(super) fn inspect(pin: &str, instances: &[&Instance], ctx: &Context) -> Vec<Report> {
    instances
        .iter()
        .map(|instance| {
            // tags, paths and urls are replaced outright
            let base = instance
                .specifier
                .set_semver(pin)
                .unwrap_or_else(|_| Specifier::parse(pin));
            let fixed = ctx.get_fixed(instance, &base).unwrap_or(base);

            if fixed.raw() == instance.raw() {
                Report::Valid {
                    instance: instance.id,
                    expected: Some(pin.to_string()),
                }
            } else {
                Report::PinnedMismatch {
                    instance: instance.id,
                    expected: pin.to_string(),
                    fix: fixed,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, reports_for, statuses};
    use crate::report::Report;

    #[test]
    fn test_already_pinned() {
        let ctx = context(
            r#"{ "versionGroups": [{ "dependencies": ["**"], "packages": ["**"], "pinVersion": "2.2.2" }] }"#,
            &[
                ("a/package.json", r#"{ "name": "a", "dependencies": { "yarn": "2.2.2" } }"#),
                ("b/package.json", r#"{ "name": "b", "devDependencies": { "yarn": "2.2.2" } }"#),
            ],
        );
        assert_eq!(statuses(&ctx, "yarn"), vec![("a", "VALID"), ("b", "VALID")]);
    }

    #[test]
    fn test_pinned_mismatch() {
        let ctx = context(
            r#"{ "versionGroups": [{ "dependencies": ["yarn"], "pinVersion": "2.2.2" }] }"#,
            &[
                ("a/package.json", r#"{ "name": "a", "dependencies": { "yarn": "^3.0.0" } }"#),
                ("b/package.json", r#"{ "name": "b", "dependencies": { "yarn": "latest" } }"#),
                ("c/package.json", r#"{ "name": "c", "dependencies": { "yarn": "npm:berry@1.0.0" } }"#),
            ],
        );
        let fixes: Vec<_> = reports_for(&ctx, "yarn")
            .into_iter()
            .map(|(pkg, report)| match report {
                Report::PinnedMismatch { expected, fix, .. } => {
                    assert_eq!(expected, "2.2.2");
                    (pkg, fix.raw().to_string())
                }
                other => panic!("unexpected report {:?}", other),
            })
            .collect();
        assert_eq!(
            fixes,
            vec![
                ("a", "2.2.2".to_string()),
                ("b", "2.2.2".to_string()),
                ("c", "npm:berry@2.2.2".to_string()),
            ]
        );
    }

    #[test]
    fn test_pin_uses_semver_group_range() {
        let ctx = context(
            r#"{
                "semverGroups": [{ "range": "^" }],
                "versionGroups": [{ "dependencies": ["react"], "pinVersion": "18.2.0" }]
            }"#,
            &[
                ("a/package.json", r#"{ "name": "a", "dependencies": { "react": "^18.2.0" } }"#),
                ("b/package.json", r#"{ "name": "b", "dependencies": { "react": "18.2.0" } }"#),
            ],
        );
        let reports = reports_for(&ctx, "react");
        assert_eq!(reports[0].1.status(), "VALID");
        match &reports[1].1 {
            Report::PinnedMismatch { fix, .. } => assert_eq!(fix.raw(), "^18.2.0"),
            other => panic!("unexpected report {:?}", other),
        }
    }
}
