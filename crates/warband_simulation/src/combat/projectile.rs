//! Запросы на снаряды
//!
//! Баллистика и попадания — забота потребителя события `ProjectileSpawned`
//! (клиент/физика); симуляция только выдаёт handle и публикует запрос.

use bevy::prelude::*;

use crate::ai::{ProjectileAim, ProjectileFactory, ProjectileHandle};

/// Событие: действие выпустило снаряд
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawned {
    pub handle: ProjectileHandle,
    pub owner: Entity,
    pub origin: Vec3,
    pub aim: ProjectileAim,
}

/// Счётчик handle снарядов (монотонный, детерминированный)
#[derive(Resource, Debug, Default)]
pub struct ProjectileIds {
    next: u64,
}

impl ProjectileIds {
    /// Сколько снарядов выпущено за всё время
    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// Накопитель снарядов за тик (реализация ProjectileFactory для BehaviorContext)
#[derive(Debug, Default)]
pub struct ProjectileBatch {
    next: u64,
    pub spawned: Vec<ProjectileSpawned>,
}

impl ProjectileBatch {
    pub fn new(ids: &ProjectileIds) -> Self {
        Self {
            next: ids.next,
            spawned: Vec::new(),
        }
    }

    pub fn commit(self, ids: &mut ProjectileIds, writer: &mut EventWriter<ProjectileSpawned>) {
        ids.next = self.next;
        for projectile in self.spawned {
            writer.write(projectile);
        }
    }
}

impl ProjectileFactory for ProjectileBatch {
    fn spawn(&mut self, origin: Vec3, aim: ProjectileAim, owner: Entity) -> ProjectileHandle {
        let handle = ProjectileHandle(self.next);
        self.next += 1;
        self.spawned.push(ProjectileSpawned {
            handle,
            owner,
            origin,
            aim,
        });
        handle
    }
}
