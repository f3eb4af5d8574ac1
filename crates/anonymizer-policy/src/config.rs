use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use anonymizer_generate::{Faker, LocaleKey};

use crate::errors::PolicyError;
use crate::policy::{AnonymizationPolicy, Directive};
use crate::replacer::Replacer;
use crate::set::PolicySet;

/// TOML policy file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnonymizerConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default, rename = "policy")]
    pub policies: Vec<PolicyConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub record_type: String,
    #[serde(default)]
    pub order: i32,
    pub attributes: Vec<AttributeConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeConfig {
    pub name: String,
    /// Strategy name, or `SKIP`.
    pub replacer: String,
    #[serde(default)]
    pub option: Option<String>,
}

impl AnonymizerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, PolicyError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn locale_key(&self) -> Result<LocaleKey, PolicyError> {
        match self.locale.as_deref() {
            None => Ok(LocaleKey::default()),
            Some(raw) => LocaleKey::parse(raw).ok_or_else(|| {
                PolicyError::Configuration(format!(
                    "unsupported locale '{raw}', expected one of: {}",
                    LocaleKey::ALL
                        .iter()
                        .map(|locale| locale.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            }),
        }
    }

    /// Generation session for this configuration. `seed_override` wins over
    /// the file's seed; without either the session is entropy seeded.
    pub fn faker(&self, seed_override: Option<u64>) -> Result<Faker, PolicyError> {
        let locale = self.locale_key()?;
        let faker = match seed_override.or(self.seed) {
            Some(seed) => Faker::new(seed),
            None => Faker::from_entropy(),
        };
        Ok(faker.with_locale(locale))
    }

    pub fn policy_set(&self) -> PolicySet {
        self.policies
            .iter()
            .fold(PolicySet::new(), |set, policy| set.with(policy.to_policy()))
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> AnonymizationPolicy {
        let directives = self
            .attributes
            .iter()
            .map(|attribute| {
                Directive::new(
                    attribute.name.clone(),
                    Replacer::parse(&attribute.replacer),
                    attribute.option.as_deref(),
                )
            })
            .collect();
        AnonymizationPolicy::new(self.record_type.clone(), directives).with_order(self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
seed = 42
locale = "fr_FR"

[[policy]]
record_type = "person"
order = 5
attributes = [
  { name = "id", replacer = "SKIP" },
  { name = "name", replacer = "simple_pattern", option = "???" },
]

[[policy]]
record_type = "account"
attributes = [{ name = "id", replacer = "SKIP" }]
"#;

    #[test]
    fn parses_policies_and_session_settings() {
        let config = AnonymizerConfig::from_toml_str(SAMPLE).expect("config");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.locale_key().expect("locale"), LocaleKey::FrFr);
        assert_eq!(config.policies.len(), 2);
        assert_eq!(config.policies[0].order, 5);
        assert_eq!(config.policies[1].order, 0);
        assert_eq!(
            config.policies[0].attributes[1].option.as_deref(),
            Some("???")
        );
    }

    #[test]
    fn policy_set_follows_order() {
        let config = AnonymizerConfig::from_toml_str(SAMPLE).expect("config");
        let set = config.policy_set();
        let order: Vec<&str> = set
            .policies()
            .iter()
            .map(AnonymizationPolicy::record_type)
            .collect();
        assert_eq!(order, vec!["account", "person"]);
        assert!(set.policies()[1].directives()[0].replacer.is_skip());
    }

    #[test]
    fn seed_override_wins() {
        let config = AnonymizerConfig::from_toml_str(SAMPLE).expect("config");
        assert_eq!(config.faker(Some(7)).expect("faker").seed(), 7);
        assert_eq!(config.faker(None).expect("faker").seed(), 42);
    }

    #[test]
    fn rejects_unknown_locale_and_keys() {
        let config = AnonymizerConfig::from_toml_str("locale = \"xx_XX\"").expect("config");
        assert!(matches!(
            config.locale_key(),
            Err(PolicyError::Configuration(_))
        ));
        assert!(matches!(
            AnonymizerConfig::from_toml_str("seeds = 1"),
            Err(PolicyError::Toml(_))
        ));
    }
}
