//! Базовые компоненты агентов: Agent, Faction, Health

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{AnimationCues, BodyMotion, MeleeHitbox, NavAgent};
use crate::ai::HealthProvider;

/// Тег фракции — используется поиском целей и проверкой враждебности
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Reflect, Serialize, Deserialize,
)]
#[reflect(Component)]
pub enum Faction {
    /// Игрок (точка сбора для союзников)
    Player,
    /// Союзный NPC
    Ally,
    /// Враг (обычный или босс)
    Hostile,
    /// Объект, который враги атакуют по умолчанию (груз, ворота)
    Objective,
    #[default]
    Neutral,
}

impl Faction {
    /// Враждебен ли `self` к `other`
    ///
    /// Hostile атакует Player/Ally/Objective; Player/Ally атакуют только Hostile.
    /// Neutral и Objective никого не атакуют.
    pub fn is_hostile_to(self, other: Faction) -> bool {
        match self {
            Faction::Hostile => matches!(other, Faction::Player | Faction::Ally | Faction::Objective),
            Faction::Player | Faction::Ally => other == Faction::Hostile,
            Faction::Objective | Faction::Neutral => false,
        }
    }
}

/// Вариант поведения агента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum AgentKind {
    /// Союзник: следует за игроком, оглушается от урона, может быть поднят
    Ally,
    /// Обычный враг: та же машина состояний, цель по умолчанию — союзники
    #[default]
    Enemy,
    /// Босс: фазы, взвешенный выбор действий, без оглушения, смерть окончательна
    Boss,
}

impl AgentKind {
    pub fn is_boss(self) -> bool {
        self == AgentKind::Boss
    }

    /// Можно ли поднять после Incapacitated
    pub fn is_revivable(self) -> bool {
        !self.is_boss()
    }
}

/// Агент с поведением (союзник, враг, босс)
///
/// Автоматически добавляет Faction, Health, Transform, навигацию, тело,
/// анимационные сигналы и хитбокс ближнего боя через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Faction, Health, Transform, NavAgent, BodyMotion, AnimationCues, MeleeHitbox)]
pub struct Agent {
    pub kind: AgentKind,
}

/// Здоровье
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    /// Доля здоровья [0, 1]; max == 0 считается мёртвым
    pub fn ratio(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}

impl HealthProvider for Health {
    fn current_health(&self) -> f32 {
        self.current as f32
    }

    fn max_health(&self) -> f32 {
        self.max as f32
    }

    fn resurrect(&mut self) {
        self.current = self.max;
    }
}

/// Маркер: entity выключена (не видна поиску целей, цель на неё невалидна)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Deactivated;
