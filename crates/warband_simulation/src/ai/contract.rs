//! Контракт между ядром поведения и миром
//!
//! Ядро (машина состояний, действия) не знает про ECS: всё, что ему нужно,
//! приходит через `BehaviorContext` — набор узких trait-коллабораторов.
//! ECS системы собирают контекст из компонентов агента; тесты — из обычных структур.

use bevy::prelude::*;
use rand::RngCore;

use crate::components::Faction;

/// Источник здоровья агента
pub trait HealthProvider {
    fn current_health(&self) -> f32;
    fn max_health(&self) -> f32;

    /// Восстановить полное здоровье (при подъёме)
    fn resurrect(&mut self);

    fn health_ratio(&self) -> f32 {
        let max = self.max_health();
        if max <= 0.0 {
            0.0
        } else {
            (self.current_health() / max).clamp(0.0, 1.0)
        }
    }
}

/// Навигационный агент (pathfinding)
pub trait Navigator {
    fn set_destination(&mut self, point: Vec3);
    /// Сбросить путь (агент остаётся включённым)
    fn stop(&mut self);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);
    fn set_stopping_distance(&mut self, distance: f32);
    fn destination(&self) -> Option<Vec3>;
}

/// Физическое тело
pub trait PhysicsImpulse {
    fn apply_impulse(&mut self, impulse: Vec3);
    fn set_velocity(&mut self, velocity: Vec3);
    fn velocity(&self) -> Vec3;
    fn set_kinematic(&mut self, kinematic: bool);
    fn is_kinematic(&self) -> bool;
}

/// Анимационные сигналы (флаг держится, триггер одноразовый)
pub trait AnimationSignal {
    fn set_flag(&mut self, name: &'static str, value: bool);
    fn trigger(&mut self, name: &'static str);
}

/// Коллайдер атаки ближнего боя
pub trait AttackCollider {
    fn set_active(&mut self, active: bool);
    fn is_active(&self) -> bool;
}

/// Снимок entity из реестра живых агентов (на момент начала тика)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistryEntry {
    pub entity: Entity,
    pub faction: Faction,
    pub position: Vec3,
    /// None — у entity нет здоровья (объект)
    pub health: Option<f32>,
    /// false — entity выключена
    pub active: bool,
}

impl RegistryEntry {
    pub fn is_alive(&self) -> bool {
        self.health.is_none_or(|hp| hp > 0.0)
    }
}

/// Пространственный реестр (поиск по тегу и радиусу)
pub trait SpatialRegistry {
    /// Все активные entity с тегом
    fn find_by_tag(&self, tag: Faction) -> Vec<RegistryEntry>;
    /// Все активные entity в радиусе от точки
    fn find_within_radius(&self, point: Vec3, radius: f32) -> Vec<RegistryEntry>;
    /// Снимок entity (в том числе выключенной); None — entity нет
    fn lookup(&self, entity: Entity) -> Option<RegistryEntry>;
}

/// Как летит снаряд
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileAim {
    /// Прямой выстрел по направлению
    Direction(Vec3),
    /// Навесной выстрел в точку
    Lob { target: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileHandle(pub u64);

/// Фабрика снарядов
pub trait ProjectileFactory {
    fn spawn(&mut self, origin: Vec3, aim: ProjectileAim, owner: Entity) -> ProjectileHandle;
}

/// Боевые эффекты, затрагивающие других агентов
pub trait CombatEffects {
    /// Отбросить всех (кроме своей фракции) в радиусе от точки
    fn area_knockback(&mut self, source: Entity, center: Vec3, radius: f32, force: f32);
}

/// Время тика
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepClock {
    /// Длина тика (сек)
    pub delta: f32,
    /// Время симуляции на начало тика (сек)
    pub elapsed: f32,
}

/// Здоровье на начало тика (копия, без заимствования компонента)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthReading {
    pub current: f32,
    pub max: f32,
}

impl HealthReading {
    pub fn of(provider: &dyn HealthProvider) -> Self {
        Self {
            current: provider.current_health(),
            max: provider.max_health(),
        }
    }

    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

/// Кто сейчас двигает агента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionAuthority {
    /// Навигация включена, тело кинематическое
    Navigation,
    /// Навигация выключена, тело динамическое
    Physics,
    /// Навигация выключена, тело кинематическое (заморожен)
    Held,
    /// Навигация включена И тело динамическое — нарушение контракта
    Contested,
}

/// Всё, что нужно машине состояний и действиям на один тик одного агента
pub struct BehaviorContext<'a> {
    pub agent: Entity,
    pub faction: Faction,
    pub transform: &'a mut Transform,
    pub health: HealthReading,
    pub navigator: &'a mut dyn Navigator,
    pub body: &'a mut dyn PhysicsImpulse,
    pub animation: &'a mut dyn AnimationSignal,
    pub attack: &'a mut dyn AttackCollider,
    pub registry: &'a dyn SpatialRegistry,
    pub projectiles: &'a mut dyn ProjectileFactory,
    pub effects: &'a mut dyn CombatEffects,
    pub rng: &'a mut dyn RngCore,
    pub clock: StepClock,
    /// Валидированная цель (заполняет машина перед действием)
    pub target: Option<RegistryEntry>,
    /// Точка сбора (позиция игрока для союзников)
    pub rally_point: Option<Vec3>,
}

impl BehaviorContext<'_> {
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.transform.rotation * Vec3::X
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position().distance(point)
    }

    /// Расстояние до цели; None если цели нет
    pub fn target_distance(&self) -> Option<f32> {
        self.target.map(|target| self.distance_to(target.position))
    }

    /// Мгновенно развернуться к точке (только по горизонтали)
    pub fn face_towards(&mut self, point: Vec3) {
        if let Some(rotation) = yaw_towards(self.position(), point) {
            self.transform.rotation = rotation;
        }
    }

    /// Плавно развернуться к точке; `t` — доля пути за этот тик
    pub fn turn_towards(&mut self, point: Vec3, t: f32) {
        if let Some(rotation) = yaw_towards(self.position(), point) {
            self.transform.rotation = self.transform.rotation.slerp(rotation, t.clamp(0.0, 1.0));
        }
    }

    pub fn authority(&self) -> MotionAuthority {
        match (self.navigator.is_enabled(), self.body.is_kinematic()) {
            (true, true) => MotionAuthority::Navigation,
            (false, false) => MotionAuthority::Physics,
            (false, true) => MotionAuthority::Held,
            (true, false) => MotionAuthority::Contested,
        }
    }

    /// Отдать движение навигации: скорость в ноль, тело кинематическое, агент включён
    pub fn claim_navigation(&mut self) {
        self.body.set_velocity(Vec3::ZERO);
        self.body.set_kinematic(true);
        self.navigator.set_enabled(true);
    }

    /// Отдать движение физике: навигация выключена, тело динамическое
    pub fn claim_physics(&mut self) {
        self.navigator.stop();
        self.navigator.set_enabled(false);
        self.body.set_kinematic(false);
    }

    /// Заморозить: никто не двигает (выведен из строя)
    pub fn hold(&mut self) {
        self.navigator.stop();
        self.navigator.set_enabled(false);
        self.body.set_velocity(Vec3::ZERO);
        self.body.set_kinematic(true);
    }
}

/// Классификация действия: сближение или атака в радиусе
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Movement,
    Offensive,
}

/// Чем закончился вызов `execute`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionStatus {
    /// Действие ещё идёт (продолжить на следующем тике)
    Running,
    /// Штатно завершилось
    Completed,
    /// Не выполнено: нет предусловий (цели, кулдауна), без побочных эффектов
    Skipped,
    /// Прервано через `stop`
    Cancelled,
}

impl ActionStatus {
    pub fn is_finished(self) -> bool {
        self != ActionStatus::Running
    }
}

/// Контракт действия
///
/// - `execute` вызывается каждый тик, пока возвращает `Running`; первый вызов начинает запуск.
/// - Завершаясь (штатно или через `stop`), действие обязано вернуть движение навигации
///   и выключить коллайдер атаки.
/// - `stop` синхронный и идемпотентный: повторный вызов, вызов до старта или после
///   завершения ничего не делает.
pub trait Action: Send + Sync + 'static {
    /// Стабильный id (совпадает с id в профиле)
    fn id(&self) -> &'static str;
    fn kind(&self) -> ActionKind;
    fn execute(&mut self, ctx: &mut BehaviorContext) -> ActionStatus;
    fn stop(&mut self, ctx: &mut BehaviorContext);
    fn is_running(&self) -> bool;
}

/// Поворот вокруг Y, при котором -Z смотрит на `to`; None если точки совпадают по горизонтали
pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<Quat> {
    let direction = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    if direction.length_squared() < 1e-6 {
        return None;
    }
    let direction = direction.normalize();
    Some(Quat::from_rotation_y(f32::atan2(-direction.x, -direction.z)))
}
