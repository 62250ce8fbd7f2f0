//! Per-resource action links (self / update / delete)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// HTTP method advertised by a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// How to materialize one relation for a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDefinition {
    pub rel: String,
    /// Appended after `base/id`
    #[serde(default)]
    pub href_suffix: String,
    pub method: LinkMethod,
}

impl LinkDefinition {
    pub fn new(rel: &str, href_suffix: &str, method: LinkMethod) -> Self {
        Self {
            rel: rel.to_string(),
            href_suffix: href_suffix.to_string(),
            method,
        }
    }
}

/// A materialized link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub rel: String,
    pub href: String,
    pub method: LinkMethod,
}

/// Builds a fixed set of links for any resource id under a base path
///
/// # Example
/// ```rust,ignore
/// let links = LinkGenerator::default().generate("123", "/recipes");
/// assert_eq!(links["update"].href, "/recipes/123");
/// ```
#[derive(Debug, Clone)]
pub struct LinkGenerator {
    definitions: IndexMap<String, LinkDefinition>,
}

impl Default for LinkGenerator {
    fn default() -> Self {
        let mut definitions = IndexMap::new();
        definitions.insert(
            "self".to_string(),
            LinkDefinition::new("self", "", LinkMethod::Get),
        );
        definitions.insert(
            "update".to_string(),
            LinkDefinition::new("update", "", LinkMethod::Put),
        );
        definitions.insert(
            "delete".to_string(),
            LinkDefinition::new("delete", "", LinkMethod::Delete),
        );
        Self { definitions }
    }
}

impl LinkGenerator {
    pub fn with_definitions(definitions: IndexMap<String, LinkDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &IndexMap<String, LinkDefinition> {
        &self.definitions
    }

    pub fn generate(&self, resource_id: &str, base_url: &str) -> IndexMap<String, ResourceLink> {
        let base = base_url.trim_end_matches('/');
        self.definitions
            .iter()
            .map(|(name, def)| {
                (
                    name.clone(),
                    ResourceLink {
                        rel: def.rel.clone(),
                        href: format!("{}/{}{}", base, resource_id, def.href_suffix),
                        method: def.method,
                    },
                )
            })
            .collect()
    }
}
