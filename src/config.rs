use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::reading_time::WORDS_PER_MINUTE;

/// Site configuration for blogdoc
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Fixed page chrome shared by every post
    pub site: SiteChrome,
    pub reading: ReadingConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteChrome {
    pub base_url: String,
    pub author: String,
    pub headshot: String,
    pub logo: String,
    pub twitter: String,
    /// Footer line above the social links
    pub motto: String,
    pub share_icon: String,
    pub stylesheet: String,
    /// Scripts appended to the end of the body, relative to the site root
    pub scripts: Vec<String>,
    pub credit_label: String,
    pub credit_href: String,
    pub credit_title: String,
    pub nav: Vec<NavLink>,
    pub socials: Vec<SocialLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub href: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub json_dir: PathBuf,
    pub pug_dir: PathBuf,
    pub image_dir: PathBuf,
}

impl Default for SiteChrome {
    fn default() -> Self {
        SiteChrome {
            base_url: "https://www.devontaereid.com".to_string(),
            author: "Devontae Reid".to_string(),
            headshot: "https://i.ibb.co/HY4dx9s/headshot.jpg".to_string(),
            logo: "/images/logo.png".to_string(),
            twitter: "@_yodev_".to_string(),
            motto: "Sola Scriptura ( Scripture Alone ), Solus Christus ( Christ Alone ), \
                    Sola fide ( Faith Alone ), Sola Gratia ( Grace Alone ), and \
                    Soli Deo Gloria ( Glory to God Alone )"
                .to_string(),
            share_icon: "/images/share_icon.png".to_string(),
            stylesheet: "style.css".to_string(),
            scripts: vec!["scripts/main.js".to_string(), "scripts/bible.js".to_string()],
            credit_label: "Freepik".to_string(),
            credit_href: "https://www.flaticon.com/authors/freepik".to_string(),
            credit_title: "Freepik".to_string(),
            nav: vec![
                NavLink::new("Projects", "/projects"),
                NavLink::new("Articles", "/articles"),
                NavLink::new("Gospel", "/gospel"),
            ],
            socials: vec![
                SocialLink::new(
                    "linkedin",
                    "https://www.linkedin.com/in/devontaereid/",
                    "/images/websites/linkedin.png",
                ),
                SocialLink::new(
                    "twitter",
                    "https://twitter.com/_yodev_",
                    "/images/websites/twitter.png",
                ),
                SocialLink::new(
                    "github",
                    "https://github.com/y0dev",
                    "/images/websites/github.png",
                ),
            ],
        }
    }
}

impl Default for ReadingConfig {
    fn default() -> Self {
        ReadingConfig {
            words_per_minute: WORDS_PER_MINUTE,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            input_dir: PathBuf::from("input_docs"),
            json_dir: PathBuf::from("output/json"),
            pug_dir: PathBuf::from("output/pug"),
            image_dir: PathBuf::from("output/images"),
        }
    }
}

impl NavLink {
    pub fn new(label: &str, href: &str) -> Self {
        NavLink {
            label: label.to_string(),
            href: href.to_string(),
        }
    }
}

impl SocialLink {
    pub fn new(platform: &str, href: &str, icon: &str) -> Self {
        SocialLink {
            platform: platform.to_string(),
            href: href.to_string(),
            icon: icon.to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from an explicit file, or from the config directory
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// when present and the built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::load_from(path);
        }

        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }

        Ok(SiteConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SiteConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the given path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the default config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blogdoc").join("config.toml"))
    }

    /// Write the default configuration to `path` (or the default location)
    pub fn init_default(path: Option<&Path>) -> Result<PathBuf> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_path()
                .context("Could not determine the configuration directory")?,
        };
        SiteConfig::default().save_to(&target)?;
        Ok(target)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
