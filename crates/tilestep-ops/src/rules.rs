//! Ruleset selection: presets, custom rule bundles and extraction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tilestep_core::{ExtractionOptions, GenerationEngine, Preset};
use tracing::{debug, info};

use crate::error::{OpsError, OpsResult};

/// Rules extracted from a sample image, carried by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRuleBundle {
    /// Unique name of the bundle.
    pub name: String,

    /// Parameters the rules were extracted with.
    pub options: ExtractionOptions,

    /// Serialized engine rule data.
    pub rules: String,
}

/// Which ruleset a request wants: a catalog name, a registered custom rule
/// name, or an inline bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RulesetSelector {
    Named(String),
    Custom(CustomRuleBundle),
}

impl RulesetSelector {
    /// Select a custom rule or preset by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Name of the selected ruleset.
    pub fn name(&self) -> &str {
        match self {
            RulesetSelector::Named(name) => name,
            RulesetSelector::Custom(bundle) => &bundle.name,
        }
    }

    /// The preset this selector names, if any.
    pub fn as_preset(&self) -> Option<Preset> {
        match self {
            RulesetSelector::Named(name) => Preset::from_name(name),
            RulesetSelector::Custom(_) => None,
        }
    }
}

impl From<Preset> for RulesetSelector {
    fn from(preset: Preset) -> Self {
        Self::Named(preset.as_str().to_string())
    }
}

impl From<CustomRuleBundle> for RulesetSelector {
    fn from(bundle: CustomRuleBundle) -> Self {
        Self::Custom(bundle)
    }
}

/// Custom rule bundles known to a session, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct CustomRuleRegistry {
    bundles: HashMap<String, CustomRuleBundle>,
}

impl CustomRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole registry. For duplicate names the last bundle wins.
    pub fn replace(&mut self, bundles: impl IntoIterator<Item = CustomRuleBundle>) {
        self.bundles.clear();
        for bundle in bundles {
            self.register(bundle);
        }
        debug!(count = self.bundles.len(), "custom_rules_replaced");
    }

    /// Add or overwrite one bundle, returning the one it replaced.
    pub fn register(&mut self, bundle: CustomRuleBundle) -> Option<CustomRuleBundle> {
        self.bundles.insert(bundle.name.clone(), bundle)
    }

    pub fn get(&self, name: &str) -> Option<&CustomRuleBundle> {
        self.bundles.get(name)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.bundles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Turn a selector into engine rule data.
///
/// Catalog names win over custom rules of the same name.
pub fn resolve<E: GenerationEngine>(
    engine: &E,
    selector: &RulesetSelector,
    registry: &CustomRuleRegistry,
) -> OpsResult<E::Rules> {
    match selector {
        RulesetSelector::Named(name) => {
            if let Some(preset) = Preset::from_name(name) {
                return Ok(engine.preset_rules(preset)?);
            }
            let bundle = registry
                .get(name)
                .ok_or_else(|| OpsError::unknown_ruleset(name))?;
            Ok(engine.deserialize_rules(&bundle.rules)?)
        }
        RulesetSelector::Custom(bundle) => Ok(engine.deserialize_rules(&bundle.rules)?),
    }
}

/// Run the extraction pipeline and package the result as a bundle.
///
/// Independent of any session; the caller registers the bundle.
pub fn extract<E: GenerationEngine>(
    engine: &E,
    name: &str,
    image: &[u8],
    options: ExtractionOptions,
) -> OpsResult<CustomRuleBundle> {
    let rules = engine.extract_rules(image, &options)?;
    info!(name, bytes = image.len(), n = options.n, "custom_rules_extracted");
    Ok(CustomRuleBundle {
        name: name.to_string(),
        options,
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(name: &str, rules: &str) -> CustomRuleBundle {
        CustomRuleBundle {
            name: name.to_string(),
            options: ExtractionOptions::default(),
            rules: rules.to_string(),
        }
    }

    #[test]
    fn selector_accepts_string_or_bundle() {
        let named: RulesetSelector = serde_json::from_str("\"checkers\"").unwrap();
        assert_eq!(named.as_preset(), Some(Preset::Checkers));

        let json = r#"{"name":"mine","options":{"n":2,"periodic_input":false,"symmetry":1},"rules":"{}"}"#;
        let custom: RulesetSelector = serde_json::from_str(json).unwrap();
        assert_eq!(custom.name(), "mine");
        assert_eq!(custom.as_preset(), None);
    }

    #[test]
    fn selector_serializes_names_as_strings() {
        let json = serde_json::to_string(&RulesetSelector::from(Preset::Stripes)).unwrap();
        assert_eq!(json, "\"stripes\"");
    }

    #[test]
    fn registry_replace_is_wholesale_and_last_write_wins() {
        let mut registry = CustomRuleRegistry::new();
        registry.register(bundle("old", "a"));

        registry.replace([bundle("b", "1"), bundle("a", "2"), bundle("b", "3")]);
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.get("b").map(|b| b.rules.as_str()), Some("3"));
        assert!(registry.get("old").is_none());

        registry.replace([]);
        assert!(registry.is_empty());
    }
}
