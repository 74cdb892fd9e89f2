//! Semver groups: which range prefix matching instances must use

use crate::config::SemverGroupConfig;
use crate::domain::{Instance, SemverRange};
use crate::error::{ConfigError, SpecifierError};
use crate::group::Selector;
use crate::report::Report;
use crate::specifier::Specifier;

/// The policy of a semver group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemverGroupKind {
    /// Ranges are not enforced
    Ignored,
    /// Every instance must use this range
    WithRange(SemverRange),
}

/// A configured semver group
#[derive(Debug, Clone)]
pub struct SemverGroup {
    pub label: Option<String>,
    pub selector: Selector,
    pub kind: SemverGroupKind,
    /// Whether this is the implicit group matching everything left over
    pub is_catch_all: bool,
}

impl SemverGroup {
    /// Validates the `index`th entry of `semverGroups`
    pub fn from_config(index: usize, config: &SemverGroupConfig) -> Result<Self, ConfigError> {
        let error = |message: String| ConfigError::SemverGroup { index, message };

        let selector = Selector::new(
            config.dependencies.as_deref(),
            config.packages.as_deref(),
            config.dependency_types.as_deref(),
        )
        .map_err(error)?;

        let kind = match (config.is_ignored, config.range.as_deref()) {
            (Some(true), None) => SemverGroupKind::Ignored,
            (Some(true), Some(_)) => {
                return Err(error(
                    "\"isIgnored\" and \"range\" cannot be used together".to_string(),
                ))
            }
            (_, Some(range)) => SemverGroupKind::WithRange(
                SemverRange::parse(range).ok_or_else(|| error(format!("invalid range '{}'", range)))?,
            ),
            (_, None) => {
                return Err(error(
                    "expected either \"range\" or \"isIgnored\": true".to_string(),
                ))
            }
        };

        Ok(Self {
            label: config.label.clone(),
            selector,
            kind,
            is_catch_all: false,
        })
    }

    /// The group of instances not matched by any configured group
    pub fn catch_all() -> Self {
        Self {
            label: None,
            selector: Selector::any(),
            kind: SemverGroupKind::Ignored,
            is_catch_all: true,
        }
    }

    /// Returns `specifier` re-ranged as this group requires.
    ///
    /// Ignored groups and a package's own version return it unchanged. Fails
    /// when the specifier has no semver value. Complex ranges which cannot be
    /// re-ranged are returned unchanged.
    pub fn get_fixed(
        &self,
        instance: &Instance,
        specifier: &Specifier,
    ) -> Result<Specifier, SpecifierError> {
        let range = match self.kind {
            SemverGroupKind::WithRange(range) if !instance.is_local() => range,
            _ => return Ok(specifier.clone()),
        };
        let semver = specifier.get_semver()?;
        match range.apply(&semver) {
            Some(ranged) => specifier.set_semver(&ranged),
            None => Ok(specifier.clone()),
        }
    }

    /// Checks the range of one instance
    pub fn inspect(&self, instance: &Instance) -> Report {
        if self.kind == SemverGroupKind::Ignored {
            return Report::Ignored {
                instance: instance.id,
            };
        }
        match self.get_fixed(instance, &instance.specifier) {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DependencyType;
    use crate::domain::{InstanceId, LOCAL_TYPE};
    use crate::manifest::Strategy;

    fn instance(raw: &str) -> Instance {
        Instance {
            id: InstanceId(0),
            name: "react".to_string(),
            specifier: Specifier::parse(raw),
            package_name: "app".to_string(),
            file: 0,
            dependency_type: DependencyType::new("prod", Strategy::VersionsByName, "dependencies"),
        }
    }

    fn with_range(range: &str) -> SemverGroup {
        SemverGroup::from_config(
            0,
            &SemverGroupConfig {
                range: Some(range.to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_from_config_errors() {
        let ambiguous = SemverGroupConfig {
            range: Some("^".to_string()),
            is_ignored: Some(true),
            ..Default::default()
        };
        assert!(SemverGroup::from_config(0, &ambiguous).is_err());

        let invalid = SemverGroupConfig {
            range: Some("^^".to_string()),
            ..Default::default()
        };
        let err = SemverGroup::from_config(4, &invalid).unwrap_err();
        assert!(format!("{}", err).contains("semver group 4"));

        assert!(SemverGroup::from_config(0, &SemverGroupConfig::default()).is_err());
    }

    #[test]
    fn test_from_config_ignored() {
        let config = SemverGroupConfig {
            is_ignored: Some(true),
            ..Default::default()
        };
        let group = SemverGroup::from_config(0, &config).unwrap();
        assert_eq!(group.kind, SemverGroupKind::Ignored);
        assert!(!group.is_catch_all);
    }

    #[test]
    fn test_get_fixed_applies_range() {
        let group = with_range("~");
        let fixed = group
            .get_fixed(&instance("^1.2.3"), &Specifier::parse("^1.2.3"))
            .unwrap();
        assert_eq!(fixed.raw(), "~1.2.3");

        let exact = with_range("");
        let fixed = exact
            .get_fixed(&instance("^1.2.3"), &Specifier::parse(">=1.2.3-rc.1"))
            .unwrap();
        assert_eq!(fixed.raw(), "1.2.3-rc.1");
    }

    #[test]
    fn test_get_fixed_keeps_wrappers() {
        let group = with_range("^");
        let alias = Specifier::parse("npm:other@1.0.0");
        assert_eq!(
            group.get_fixed(&instance("1.0.0"), &alias).unwrap().raw(),
            "npm:other@^1.0.0"
        );
        let workspace = Specifier::parse("workspace:*");
        assert_eq!(
            group.get_fixed(&instance("1.0.0"), &workspace).unwrap().raw(),
            "workspace:*"
        );
    }

    #[test]
    fn test_get_fixed_fails_for_non_semver() {
        let group = with_range("^");
        let err = group
            .get_fixed(&instance("latest"), &Specifier::parse("latest"))
            .unwrap_err();
        assert_eq!(err, SpecifierError::not_semver("latest"));
    }

    #[test]
    fn test_get_fixed_is_identity_for_ignored_and_local() {
        let ignored = SemverGroup::catch_all();
        let spec = Specifier::parse("latest");
        assert_eq!(ignored.get_fixed(&instance("latest"), &spec).unwrap(), spec);

        let mut local = instance("1.0.0");
        local.dependency_type = DependencyType::new(LOCAL_TYPE, Strategy::NameTildeVersion, "version");
        let spec = Specifier::parse("1.0.0");
        assert_eq!(with_range("^").get_fixed(&local, &spec).unwrap(), spec);
    }

    #[test]
    fn test_inspect() {
        let group = with_range("^");
        assert!(matches!(group.inspect(&instance("^1.0.0")), Report::Valid { .. }));
        assert_eq!(
            group.inspect(&instance("1.0.0")),
            Report::SemverRangeMismatch {
                instance: InstanceId(0),
                fix: Specifier::parse("^1.0.0"),
            }
        );
        assert!(matches!(
            group.inspect(&instance("github:a/b")),
            Report::UnsupportedMismatch { .. }
        ));
        assert!(matches!(
            SemverGroup::catch_all().inspect(&instance("1.0.0")),
            Report::Ignored { .. }
        ));
    }

    #[test]
    fn test_inspect_leaves_complex_ranges_alone() {
        let group = with_range("~");
        assert!(matches!(
            group.inspect(&instance(">=1.0.0 <2.0.0")),
            Report::Valid { .. }
        ));
    }
}
