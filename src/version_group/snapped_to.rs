//! Every instance must use the version found in one of the snapped-to packages

use crate::context::Context;
use crate::domain::Instance;
use crate::report::Report;

pub(super) fn inspect(packages: &[String], instances: &[&Instance], ctx: &Context) -> Vec<Report> {
    instances
        .iter()
        .map(|instance| {
            if packages.iter().any(|p| *p == instance.package_name) {
                return Report::Valid {
                    instance: instance.id,
                    expected: None,
                };
            }
            let unsupported = Report::UnsupportedMismatch {
                instance: instance.id,
            };

            let Some(target) = packages
                .iter()
                .find_map(|package| ctx.lookup.instances_of(package, &instance.name).first())
                .map(|id| ctx.instance(*id))
            else {
                return unsupported;
            };
            let Ok(expected) = target.specifier.get_semver() else {
                return unsupported;
            };

            let fixed = instance
                .specifier
                .set_semver(&expected)
                .and_then(|specifier| ctx.get_fixed(instance, &specifier));
            match fixed {
                Ok(fix) if fix.raw() == instance.raw() => Report::Valid {
                    instance: instance.id,
                    expected: Some(expected),
                },
                Ok(fix) => Report::SnappedToMismatch {
                    instance: instance.id,
                    expected,
                    fix,
                },
                Err(_) => unsupported,
            }
        })
        .collect()
}
