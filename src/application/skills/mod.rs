//! Skill routing service.

mod router;

pub use router::SkillRouter;
