//! Каталог действий
//!
//! Ядро знает только контракт `Action`; конкретные действия подключаются
//! в пул по id из профиля (см. `build`).
//!
//! Общий шаблон действия:
//! - первый `execute` проверяет предусловия (нет цели → `Skipped`, без побочных эффектов)
//! - длинные шаги хранятся в `TaskCursor`, паузы — через `waiting`
//! - `stop` отменяет курсор и возвращает движение навигации (только если запуск был активен)

pub mod barrage;
pub mod follow;
pub mod leap;
pub mod melee;
pub mod orbit;
pub mod pursue;
pub mod ranged;
pub mod spin;

pub use barrage::MissileBarrage;
pub use follow::Follow;
pub use leap::{ballistic_jump, Leap};
pub use melee::MeleeStrike;
pub use orbit::{strafe_velocity, OrbitFire};
pub use pursue::Pursue;
pub use ranged::RangedBurst;
pub use spin::SpinFire;

use crate::ai::{Action, BehaviorTuning};

/// Все известные id действий
pub const ACTION_IDS: [&str; 8] = [
    "pursue",
    "follow",
    "melee",
    "ranged_burst",
    "leap",
    "orbit_fire",
    "spin_fire",
    "missile_barrage",
];

/// Собрать действие по id; None — id неизвестен
///
/// Дистанции сближения берутся из параметров агента.
pub fn build(id: &str, tuning: &BehaviorTuning) -> Option<Box<dyn Action>> {
    let action: Box<dyn Action> = match id {
        "pursue" => Box::new(Pursue::new(tuning.attack_range)),
        "follow" => Box::new(Follow::new(tuning.stop_follow_range)),
        "melee" => Box::new(MeleeStrike::default()),
        "ranged_burst" => Box::new(RangedBurst::default()),
        "leap" => Box::new(Leap::default()),
        "orbit_fire" => Box::new(OrbitFire::default()),
        "spin_fire" => Box::new(SpinFire::default()),
        "missile_barrage" => Box::new(MissileBarrage::default()),
        _ => return None,
    };
    Some(action)
}
