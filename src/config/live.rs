//! Deployment variables consulted on every call rather than once at startup.
//!
//! `GRAPHQL_URL`, `GRAPHQL_AUTH_TOKEN` and `SITE_URL` are looked up each time
//! content is fetched or metadata is built. A value present in the environment
//! at that moment wins over the settings resolved at startup.

use std::{fmt, sync::Arc};

use tracing::warn;

use crate::application::seo::SiteSettings;

use super::{ContentSettings, DEFAULT_OG_IMAGE_PATH, LoadError, non_empty, parse_http_url};

pub const GRAPHQL_URL_VAR: &str = "GRAPHQL_URL";
pub const GRAPHQL_AUTH_TOKEN_VAR: &str = "GRAPHQL_AUTH_TOKEN";
pub const SITE_URL_VAR: &str = "SITE_URL";

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

#[derive(Clone)]
pub struct LiveEnv {
    lookup: Arc<Lookup>,
}

impl LiveEnv {
    /// Reads the process environment.
    pub fn process() -> Self {
        Self::from_fn(|name| std::env::var(name).ok())
    }

    /// Reads from `lookup` instead of the process environment.
    pub fn from_fn(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Arc::new(lookup),
        }
    }

    /// Never reports a variable; only startup settings apply.
    pub fn empty() -> Self {
        Self::from_fn(|_| None)
    }

    fn var(&self, name: &str) -> Option<String> {
        non_empty((self.lookup)(name))
    }

    /// Content API settings as of now, layered over `loaded`.
    pub fn content(&self, loaded: &ContentSettings) -> Result<ContentSettings, LoadError> {
        let graphql_url = match self.var(GRAPHQL_URL_VAR) {
            Some(value) => Some(parse_http_url(&value, "GRAPHQL_URL")?),
            None => loaded.graphql_url.clone(),
        };
        let auth_token = self
            .var(GRAPHQL_AUTH_TOKEN_VAR)
            .or_else(|| loaded.auth_token.clone());

        Ok(ContentSettings {
            graphql_url,
            auth_token,
        })
    }

    /// Site settings as of now. An unusable `SITE_URL` keeps `loaded` and is logged.
    pub fn site(&self, loaded: &SiteSettings) -> SiteSettings {
        let Some(value) = self.var(SITE_URL_VAR) else {
            return loaded.clone();
        };
        let url = match parse_http_url(&value, "SITE_URL") {
            Ok(url) => url,
            Err(err) => {
                warn!(target: "presswire::config", error = %err, "Ignoring SITE_URL");
                return loaded.clone();
            }
        };
        if url == loaded.url {
            return loaded.clone();
        }

        let mut site = loaded.clone();
        let derived_image = loaded
            .url
            .join(DEFAULT_OG_IMAGE_PATH)
            .is_ok_and(|image| image.as_str() == loaded.default_image);
        if derived_image && let Ok(image) = url.join(DEFAULT_OG_IMAGE_PATH) {
            site.default_image = image.to_string();
        }
        site.url = url;
        site
    }
}

impl Default for LiveEnv {
    fn default() -> Self {
        Self::process()
    }
}

impl fmt::Debug for LiveEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveEnv").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use url::Url;

    use super::*;

    fn env_with(vars: Arc<RwLock<HashMap<String, String>>>) -> LiveEnv {
        LiveEnv::from_fn(move |name| vars.read().expect("vars lock").get(name).cloned())
    }

    fn site() -> SiteSettings {
        SiteSettings {
            name: "Blog".to_string(),
            description: "Posts".to_string(),
            url: Url::parse("https://old.example.com/").expect("site url"),
            author: "Editorial".to_string(),
            keywords: "blog".to_string(),
            locale: "en-US".to_string(),
            twitter_handle: None,
            default_image: "https://old.example.com/og-image.jpg".to_string(),
            default_image_width: 1200,
            default_image_height: 630,
        }
    }

    #[test]
    fn endpoint_changes_are_seen_on_the_next_call() {
        let vars = Arc::new(RwLock::new(HashMap::new()));
        let env = env_with(Arc::clone(&vars));
        let loaded = ContentSettings::default();

        let before = env.content(&loaded).expect("resolve");
        assert!(before.graphql_url.is_none());

        vars.write().expect("vars lock").insert(
            GRAPHQL_URL_VAR.to_string(),
            "https://cms.example.com/graphql".to_string(),
        );
        vars.write()
            .expect("vars lock")
            .insert(GRAPHQL_AUTH_TOKEN_VAR.to_string(), "rotated".to_string());

        let after = env.content(&loaded).expect("resolve");
        assert_eq!(
            after.graphql_url.map(|url| url.to_string()),
            Some("https://cms.example.com/graphql".to_string())
        );
        assert_eq!(after.auth_token.as_deref(), Some("rotated"));
    }

    #[test]
    fn unset_or_blank_variables_keep_loaded_values() {
        let vars = Arc::new(RwLock::new(HashMap::from([(
            GRAPHQL_AUTH_TOKEN_VAR.to_string(),
            "  ".to_string(),
        )])));
        let loaded = ContentSettings {
            graphql_url: Some(Url::parse("https://file.example.com/graphql").expect("url")),
            auth_token: Some("from-file".to_string()),
        };

        let resolved = env_with(vars).content(&loaded).expect("resolve");
        assert_eq!(resolved.graphql_url, loaded.graphql_url);
        assert_eq!(resolved.auth_token.as_deref(), Some("from-file"));
    }

    #[test]
    fn invalid_endpoint_is_reported() {
        let env = LiveEnv::from_fn(|name| {
            (name == GRAPHQL_URL_VAR).then(|| "ftp://cms.example.com".to_string())
        });
        let err = env
            .content(&ContentSettings::default())
            .expect_err("ftp rejected");
        assert!(matches!(err, LoadError::Invalid { key: "GRAPHQL_URL", .. }));
    }

    #[test]
    fn site_url_rebases_derived_default_image() {
        let env = LiveEnv::from_fn(|name| {
            (name == SITE_URL_VAR).then(|| "https://new.example.com/".to_string())
        });
        let resolved = env.site(&site());
        assert_eq!(resolved.url.as_str(), "https://new.example.com/");
        assert_eq!(resolved.default_image, "https://new.example.com/og-image.jpg");

        let mut custom = site();
        custom.default_image = "https://cdn.example.com/card.png".to_string();
        assert_eq!(env.site(&custom).default_image, "https://cdn.example.com/card.png");
    }

    #[test]
    fn unusable_site_url_keeps_loaded_settings() {
        let env = LiveEnv::from_fn(|name| (name == SITE_URL_VAR).then(|| "not a url".to_string()));
        assert_eq!(env.site(&site()).url.as_str(), "https://old.example.com/");
        assert_eq!(LiveEnv::empty().site(&site()).url.as_str(), "https://old.example.com/");
    }
}
