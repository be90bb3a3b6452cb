//! ECS Components для агентов
//!
//! Организация по доменам:
//! - actor: идентичность агента (Agent, AgentKind, Faction, Health, Deactivated)
//! - movement: навигация и физическое тело (NavAgent, BodyMotion)
//! - animation: анимационные сигналы (AnimationCues)
//! - combat: хитбокс ближнего боя (MeleeHitbox)

pub mod actor;
pub mod animation;
pub mod combat;
pub mod movement;

pub use actor::*;
pub use animation::*;
pub use combat::*;
pub use movement::*;
