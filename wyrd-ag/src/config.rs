//! Settings resolution for wyrd-ag
//!
//! **Priority:** CLI → ENV → TOML → compiled default, per setting.

use std::path::PathBuf;
use tracing::info;
use wyrd_common::config::{
    default_site_root, default_source_root, resolve_value, SourceMode, TomlConfig, ENV_GITHUB_TOKEN,
    ENV_ORG, ENV_SITE_ROOT, ENV_SOURCE_ROOT,
};
use wyrd_common::ApiLayout;

use crate::collector::{CollectError, Exclusions, GitHubCollector, LocalDirCollector, SourceCollector};
use crate::error::AggregateResult;
use crate::pages::PageRenderer;

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub site_root: Option<PathBuf>,
    pub mode: Option<SourceMode>,
    pub source_root: Option<PathBuf>,
    pub org: Option<String>,
    pub template: Option<PathBuf>,
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct AgSettings {
    pub site_root: PathBuf,
    pub mode: SourceMode,
    pub source_root: PathBuf,
    pub org: String,
    /// Never logged
    pub token: Option<String>,
    pub excluded: Vec<String>,
    pub document: String,
    pub template: Option<PathBuf>,
    pub version: String,
    pub log_level: String,
}

impl AgSettings {
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Self {
        let site_root = resolve_value(cli.site_root, ENV_SITE_ROOT, toml.site_root, default_site_root);
        let source_root = resolve_value(
            cli.source_root,
            ENV_SOURCE_ROOT,
            toml.sources.local_root,
            default_source_root,
        );
        let org = resolve_value(cli.org, ENV_ORG, Some(toml.sources.org), String::new);
        let token = std::env::var(ENV_GITHUB_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty());

        Self {
            site_root,
            mode: cli.mode.unwrap_or(toml.sources.mode),
            source_root,
            org,
            token,
            excluded: toml.sources.excluded,
            document: toml.sources.document,
            template: cli.template.or(toml.site.template),
            version: toml.site.version,
            log_level: toml.logging.level,
        }
    }

    pub fn layout(&self) -> ApiLayout {
        ApiLayout::new(&self.site_root)
    }

    /// Collector for the configured strategy
    pub fn collector(&self) -> Result<Box<dyn SourceCollector>, CollectError> {
        let exclusions = Exclusions::new(self.excluded.iter().cloned());
        match self.mode {
            SourceMode::Local => {
                info!("Source root: {}", self.source_root.display());
                Ok(Box::new(LocalDirCollector::new(
                    &self.source_root,
                    &self.document,
                    exclusions,
                )))
            }
            SourceMode::Remote => {
                if self.org.trim().is_empty() {
                    return Err(CollectError::ListingFailed("no organisation configured".to_string()));
                }
                info!(
                    "Source organisation: {} (token {})",
                    self.org,
                    if self.token.is_some() { "present" } else { "absent" }
                );
                Ok(Box::new(GitHubCollector::new(
                    &self.org,
                    self.token.clone(),
                    &self.document,
                    exclusions,
                )?))
            }
        }
    }

    /// Configured template, or the built-in one
    pub fn renderer(&self) -> AggregateResult<PageRenderer> {
        match &self.template {
            Some(path) => PageRenderer::from_path(path),
            None => Ok(PageRenderer::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [ENV_SITE_ROOT, ENV_SOURCE_ROOT, ENV_ORG, ENV_GITHUB_TOKEN] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_cli_overrides_toml() {
        clear_env();
        let mut toml = TomlConfig::default();
        toml.site_root = Some(PathBuf::from("/from/toml"));
        toml.sources.org = "toml-org".to_string();

        let settings = AgSettings::resolve(
            CliOverrides {
                site_root: Some(PathBuf::from("/from/cli")),
                mode: Some(SourceMode::Remote),
                ..CliOverrides::default()
            },
            toml,
        );

        assert_eq!(settings.site_root, PathBuf::from("/from/cli"));
        assert_eq!(settings.mode, SourceMode::Remote);
        assert_eq!(settings.org, "toml-org");
        assert!(settings.token.is_none());
    }

    #[test]
    #[serial]
    fn test_environment_supplies_org_and_token() {
        clear_env();
        std::env::set_var(ENV_ORG, "env-org");
        std::env::set_var(ENV_GITHUB_TOKEN, "ghp_test");

        let settings = AgSettings::resolve(CliOverrides::default(), TomlConfig::default());
        assert_eq!(settings.org, "env-org");
        assert_eq!(settings.token.as_deref(), Some("ghp_test"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = AgSettings::resolve(CliOverrides::default(), TomlConfig::default());
        assert_eq!(settings.site_root, default_site_root());
        assert_eq!(settings.source_root, default_source_root());
        assert_eq!(settings.mode, SourceMode::Local);
        assert_eq!(settings.document, "api.json");
        assert_eq!(settings.version, "1.0.0");
        assert!(settings.renderer().is_ok());
    }
}
