use anyhow::{bail, Result};

use super::registry::{ModelRegistry, ModelSpec};

/// The model a pipeline stage will call, plus a note when it is not the one
/// the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelSpec,
    pub requested: Option<String>,
    pub fallback_reason: Option<String>,
}

impl ModelSelection {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_else(|| ModelRegistry::new(None)),
        }
    }

    /// Honors `requested` when it names a registered model with `capability`,
    /// otherwise picks the first registered model that has it. Blank names
    /// count as no request.
    pub fn select(&self, requested: Option<&str>, capability: &str) -> Result<ModelSelection> {
        let requested = requested.map(str::trim).filter(|name| !name.is_empty());
        if let Some(model) = requested.and_then(|name| self.registry.ensure(name, capability)) {
            return Ok(ModelSelection {
                model,
                requested: requested.map(str::to_string),
                fallback_reason: None,
            });
        }

        let Some(model) = self.registry.by_capability(capability).into_iter().next() else {
            bail!("No models available for capability '{capability}'.");
        };
        let fallback_reason = match requested {
            Some(name) => format!(
                "Requested model '{name}' unavailable for capability '{capability}'; using '{}'.",
                model.name
            ),
            None => format!("No {capability} model specified; using '{}'.", model.name),
        };
        Ok(ModelSelection {
            model,
            requested: requested.map(str::to_string),
            fallback_reason: Some(fallback_reason),
        })
    }
}
