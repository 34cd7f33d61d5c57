//! Resource registration and dispatch.

use std::collections::HashSet;

use crate::context::ServerContext;
use crate::types::{
    McpError, McpResult, ReadResourceResult, RegistrationError, ResourceDefinition,
    ResourceTemplateDefinition,
};

use super::templates::UriTemplate;
use super::{counter, notes, status, COUNTER_URI, NOTES_URI, NOTE_TEMPLATE, STATUS_URI};

/// A resource template together with its parsed form.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub definition: ResourceTemplateDefinition,
    pub template: UriTemplate,
}

pub struct ResourceRegistry {
    resources: Vec<ResourceDefinition>,
    templates: Vec<TemplateEntry>,
}

impl ResourceRegistry {
    /// Build a registry, rejecting duplicate URIs and templates.
    pub fn new(
        resources: Vec<ResourceDefinition>,
        templates: Vec<ResourceTemplateDefinition>,
    ) -> Result<Self, RegistrationError> {
        let mut seen = HashSet::new();
        for r in &resources {
            if !seen.insert(r.uri.as_str()) {
                return Err(RegistrationError::Duplicate {
                    kind: "resource",
                    name: r.uri.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for t in &templates {
            if !seen.insert(t.uri_template.as_str()) {
                return Err(RegistrationError::Duplicate {
                    kind: "resource template",
                    name: t.uri_template.clone(),
                });
            }
        }

        let templates = templates
            .into_iter()
            .map(|definition| TemplateEntry {
                template: UriTemplate::parse(&definition.uri_template),
                definition,
            })
            .collect();

        Ok(Self {
            resources,
            templates,
        })
    }

    pub fn builtin() -> Result<Self, RegistrationError> {
        Self::new(builtin_resources(), builtin_templates())
    }

    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.resources.clone()
    }

    pub fn list_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.templates.iter().map(|t| t.definition.clone()).collect()
    }

    pub fn is_static(&self, uri: &str) -> bool {
        self.resources.iter().any(|r| r.uri == uri)
    }

    /// The template `uri` instantiates, if any.
    pub fn template_for(&self, uri: &str) -> Option<&TemplateEntry> {
        self.templates
            .iter()
            .find(|t| t.template.match_uri(uri).is_some())
    }

    pub fn template(&self, uri_template: &str) -> Option<&TemplateEntry> {
        self.templates
            .iter()
            .find(|t| t.definition.uri_template == uri_template)
    }

    /// Whether `uri` names something a client may subscribe to.
    pub fn is_subscribable(&self, uri: &str) -> bool {
        self.is_static(uri) || self.template_for(uri).is_some()
    }

    pub async fn read(&self, uri: &str, server: &ServerContext) -> McpResult<ReadResourceResult> {
        if self.is_static(uri) {
            return match uri {
                STATUS_URI => status::read_status(uri, server).await,
                NOTES_URI => notes::read_notes(uri, server).await,
                COUNTER_URI => counter::read_counter(uri, server).await,
                _ => Err(McpError::ResourceNotFound(uri.to_string())),
            };
        }

        for entry in &self.templates {
            let Some(bindings) = entry.template.match_uri(uri) else {
                continue;
            };
            if entry.definition.uri_template == NOTE_TEMPLATE {
                let id = bindings.get("id").map(String::as_str).unwrap_or_default();
                return notes::read_note(uri, id, server).await;
            }
        }

        Err(McpError::ResourceNotFound(uri.to_string()))
    }
}

fn builtin_resources() -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition {
            uri: STATUS_URI.to_string(),
            name: "Server Status".to_string(),
            description: Some("Current server status and statistics".to_string()),
            mime_type: Some("application/json".to_string()),
        },
        ResourceDefinition {
            uri: NOTES_URI.to_string(),
            name: "All Notes".to_string(),
            description: Some("Every stored note".to_string()),
            mime_type: Some("application/json".to_string()),
        },
        ResourceDefinition {
            uri: COUNTER_URI.to_string(),
            name: "Counter Value".to_string(),
            description: Some("Current value of the shared counter".to_string()),
            mime_type: Some("text/plain".to_string()),
        },
    ]
}

fn builtin_templates() -> Vec<ResourceTemplateDefinition> {
    vec![ResourceTemplateDefinition {
        uri_template: NOTE_TEMPLATE.to_string(),
        name: "Note by ID".to_string(),
        description: Some("A single note by its numeric ID".to_string()),
        mime_type: Some("application/json".to_string()),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribable_uris() {
        let registry = ResourceRegistry::builtin().unwrap();
        assert!(registry.is_subscribable("server://counter"));
        assert!(registry.is_subscribable("note://3"));
        assert!(!registry.is_subscribable("server://unknown"));
        assert!(!registry.is_subscribable("note://"));
    }

    #[test]
    fn test_duplicate_uri_rejected() {
        let err = ResourceRegistry::new(
            [builtin_resources(), builtin_resources()].concat(),
            vec![],
        )
        .err()
        .unwrap();
        assert!(matches!(err, RegistrationError::Duplicate { kind: "resource", .. }));
    }

    #[tokio::test]
    async fn test_read_counter_and_unknown() {
        let server = ServerContext::default();
        let registry = ResourceRegistry::builtin().unwrap();

        let result = registry.read(COUNTER_URI, &server).await.unwrap();
        assert_eq!(result.contents[0].text.as_deref(), Some("0"));
        assert_eq!(result.contents[0].mime_type.as_deref(), Some("text/plain"));

        assert!(matches!(
            registry.read("server://nope", &server).await,
            Err(McpError::ResourceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_note_template() {
        let server = ServerContext::default();
        server
            .workbench
            .lock()
            .await
            .add_note("hello".into(), vec![])
            .unwrap();
        let registry = ResourceRegistry::builtin().unwrap();

        let result = registry.read("note://1", &server).await.unwrap();
        assert!(result.contents[0].text.as_deref().unwrap().contains("hello"));

        assert!(matches!(
            registry.read("note://9", &server).await,
            Err(McpError::InvalidParams(_))
        ));
        assert!(matches!(
            registry.read("note://abc", &server).await,
            Err(McpError::InvalidParams(_))
        ));
    }
}
