//! Skill trait and registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::SkillError;

/// A named capability that turns an input string into an output string.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Unique name used for lookup.
    fn name(&self) -> &str;

    /// One-line human-readable description.
    fn description(&self) -> &str;

    async fn execute(&self, input: &str) -> Result<String, SkillError>;
}

/// Keyed lookup of registered skills.
#[derive(Default, Clone)]
pub struct SkillRegistry {
    skills: HashMap<String, Arc<dyn Skill>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill under its name, replacing any skill with that name.
    pub fn register(&mut self, skill: Arc<dyn Skill>) {
        let name = skill.name().to_string();
        if self.skills.insert(name.clone(), skill).is_some() {
            warn!(skill = %name, "Replaced previously registered skill");
        } else {
            debug!(skill = %name, "Skill registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Skill>> {
        self.skills.get(name).cloned()
    }

    /// All registered skills, sorted by name.
    pub fn list(&self) -> Vec<Arc<dyn Skill>> {
        let mut skills: Vec<Arc<dyn Skill>> = self.skills.values().cloned().collect();
        skills.sort_by(|a, b| a.name().cmp(b.name()));
        skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Look up `name` and run it with `input`.
    pub async fn execute(&self, name: &str, input: &str) -> Result<String, SkillError> {
        let skill = self
            .get(name)
            .ok_or_else(|| SkillError::NotFound(name.to_string()))?;
        debug!(skill = %name, input_len = input.len(), "Executing skill");
        skill.execute(input).await
    }
}

impl std::fmt::Debug for SkillRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.skills.keys().collect();
        names.sort();
        f.debug_struct("SkillRegistry")
            .field("skills", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoSkill {
        name: &'static str,
    }

    #[async_trait]
    impl Skill for EchoSkill {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        async fn execute(&self, input: &str) -> Result<String, SkillError> {
            Ok(format!("{}: {}", self.name, input))
        }
    }

    struct ShoutSkill;

    #[async_trait]
    impl Skill for ShoutSkill {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Upper-case the input"
        }

        async fn execute(&self, input: &str) -> Result<String, SkillError> {
            Ok(input.to_uppercase())
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SkillRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(EchoSkill { name: "echo" }));

        assert_eq!(registry.len(), 1);
        let skill = registry.get("echo").unwrap();
        assert_eq!(skill.name(), "echo");
        assert_eq!(skill.description(), "Echo the input back");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_list_sorted_by_name() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(EchoSkill { name: "zeta" }));
        registry.register(Arc::new(EchoSkill { name: "alpha" }));
        registry.register(Arc::new(EchoSkill { name: "mid" }));

        let names: Vec<String> = registry
            .list()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_register_replaces_same_name() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(EchoSkill { name: "echo" }));
        registry.register(Arc::new(ShoutSkill));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.execute("echo", "hi").await.unwrap(), "HI");
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_name() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(EchoSkill { name: "one" }));
        registry.register(Arc::new(EchoSkill { name: "two" }));

        assert_eq!(registry.execute("two", "x").await.unwrap(), "two: x");
    }

    #[tokio::test]
    async fn test_execute_unknown_skill() {
        let registry = SkillRegistry::new();
        let err = registry.execute("nope", "x").await.unwrap_err();
        assert!(matches!(err, SkillError::NotFound(ref n) if n == "nope"));
    }

    #[test]
    fn test_debug_lists_names() {
        let mut registry = SkillRegistry::new();
        registry.register(Arc::new(EchoSkill { name: "b" }));
        registry.register(Arc::new(EchoSkill { name: "a" }));
        assert_eq!(
            format!("{:?}", registry),
            r#"SkillRegistry { skills: ["a", "b"] }"#
        );
    }
}
