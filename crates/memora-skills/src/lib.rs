//! Skill registry for Memora.
//!
//! A skill is a named capability with a description and an async `execute`
//! entry point. The registry is a keyed lookup; the built-in `remember` and
//! `recall` skills expose the vector store through it.

pub mod error;
pub mod memory;
pub mod registry;

pub use error::SkillError;
pub use memory::{register_memory_skills, RecallSkill, RememberSkill};
pub use registry::{Skill, SkillRegistry};
