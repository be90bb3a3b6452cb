//! AgentProfile — всё, что нужно для сборки агента из данных
//!
//! Формат RON (ProfileSet):
//! ```ron
//! {
//!     "scout": (
//!         kind: Ally,
//!         faction: Ally,
//!         move_speed: 4.5,
//!         actions: [(id: "pursue"), (id: "ranged_burst", weight: 2.0)],
//!         regroup_action: Some("follow"),
//!     ),
//! }
//! ```
//! Пропущенные поля берутся из `AgentProfile::default()` (обычный враг).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::ai::{BehaviorTuning, PhaseThreshold, TargetingProfile};
use crate::components::{AgentKind, Faction};

/// Действие в пуле агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub id: String,
    /// Вес для взвешенного выбора (босс)
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// С какой фазы действие доступно
    #[serde(default = "default_phase")]
    pub phase: u32,
}

fn default_weight() -> f32 {
    1.0
}

fn default_phase() -> u32 {
    1
}

impl ActionConfig {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            weight: default_weight(),
            phase: default_phase(),
        }
    }

    pub fn from_phase(mut self, phase: u32) -> Self {
        self.phase = phase;
        self
    }
}

/// Профиль агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub faction: Faction,
    pub max_health: u32,
    pub move_speed: f32,
    pub attack_range: f32,
    pub follow_range: f32,
    pub stop_follow_range: f32,
    pub knockback_power: f32,
    pub knockback_duration: f32,
    pub action_settle: f32,
    pub idle_scan_interval: f32,
    pub no_action_wait: f32,
    pub boss_retarget_wait: f32,
    pub boss_repath_interval: f32,
    pub targeting: TargetingProfile,
    pub actions: Vec<ActionConfig>,
    pub regroup_action: Option<String>,
    pub phases: Vec<PhaseThreshold>,
    pub clear_regroup_on_contact: bool,
    pub corpse_linger: Option<f32>,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self::enemy()
    }
}

impl AgentProfile {
    /// Союзник: бьёт врагов, держится рядом с игроком
    pub fn ally() -> Self {
        Self {
            kind: AgentKind::Ally,
            faction: Faction::Ally,
            targeting: TargetingProfile::new(Faction::Hostile),
            regroup_action: Some("follow".to_string()),
            ..Self::standard()
        }
    }

    /// Обычный враг: идёт на союзников, без них — на игрока поблизости
    pub fn enemy() -> Self {
        Self {
            kind: AgentKind::Enemy,
            faction: Faction::Hostile,
            targeting: TargetingProfile::new(Faction::Ally).with_fallback(30.0, vec![Faction::Player]),
            ..Self::standard()
        }
    }

    /// Босс: атакует объект, фазы 0.7 / 0.3, в третьей фазе разгоняется до 6 м/с
    pub fn boss() -> Self {
        let tuning = BehaviorTuning::boss();
        Self {
            kind: AgentKind::Boss,
            faction: Faction::Hostile,
            max_health: 1000,
            attack_range: tuning.attack_range,
            action_settle: tuning.action_settle,
            corpse_linger: tuning.corpse_linger,
            targeting: TargetingProfile::new(Faction::Objective)
                .with_fallback(50.0, vec![Faction::Player, Faction::Ally]),
            actions: vec![
                ActionConfig::new("leap"),
                ActionConfig::new("orbit_fire").from_phase(2),
                ActionConfig::new("spin_fire").from_phase(3),
                ActionConfig::new("missile_barrage").from_phase(3),
            ],
            regroup_action: None,
            phases: vec![
                PhaseThreshold {
                    health_ratio: 0.7,
                    phase: 2,
                    speed_multiplier: 1.0,
                },
                PhaseThreshold {
                    health_ratio: 0.3,
                    phase: 3,
                    speed_multiplier: 6.0 / tuning.move_speed,
                },
            ],
            ..Self::standard()
        }
    }

    /// Общая база ally/enemy
    fn standard() -> Self {
        let tuning = BehaviorTuning::default();
        Self {
            kind: AgentKind::Enemy,
            faction: Faction::Hostile,
            max_health: 100,
            move_speed: tuning.move_speed,
            attack_range: tuning.attack_range,
            follow_range: tuning.follow_range,
            stop_follow_range: tuning.stop_follow_range,
            knockback_power: tuning.knockback_power,
            knockback_duration: tuning.knockback_duration,
            action_settle: tuning.action_settle,
            idle_scan_interval: tuning.idle_scan_interval,
            no_action_wait: tuning.no_action_wait,
            boss_retarget_wait: tuning.boss_retarget_wait,
            boss_repath_interval: tuning.boss_repath_interval,
            targeting: TargetingProfile::new(Faction::Ally),
            actions: vec![ActionConfig::new("pursue"), ActionConfig::new("melee"), ActionConfig::new("ranged_burst")],
            regroup_action: None,
            phases: Vec::new(),
            clear_regroup_on_contact: tuning.clear_regroup_on_contact,
            corpse_linger: tuning.corpse_linger,
        }
    }

    /// Числовые параметры для BehaviorMachine
    pub fn tuning(&self) -> BehaviorTuning {
        BehaviorTuning {
            move_speed: self.move_speed,
            attack_range: self.attack_range,
            follow_range: self.follow_range,
            stop_follow_range: self.stop_follow_range,
            knockback_power: self.knockback_power,
            knockback_duration: self.knockback_duration,
            action_settle: self.action_settle,
            idle_scan_interval: self.idle_scan_interval,
            no_action_wait: self.no_action_wait,
            boss_retarget_wait: self.boss_retarget_wait,
            boss_repath_interval: self.boss_repath_interval,
            clear_regroup_on_contact: self.clear_regroup_on_contact,
            corpse_linger: self.corpse_linger,
        }
    }

    /// Проверка значений профиля (`name` — для сообщения об ошибке)
    ///
    /// Id действий здесь не проверяются: их знает каталог (`spawn::build_machine`).
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        let invalid = |reason: String| ConfigError::Invalid {
            profile: name.to_string(),
            reason,
        };

        if self.max_health == 0 {
            return Err(invalid("max_health must be positive".into()));
        }

        let positive = [
            ("move_speed", self.move_speed),
            ("attack_range", self.attack_range),
            ("follow_range", self.follow_range),
            ("stop_follow_range", self.stop_follow_range),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{field} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("knockback_power", self.knockback_power),
            ("knockback_duration", self.knockback_duration),
            ("action_settle", self.action_settle),
            ("idle_scan_interval", self.idle_scan_interval),
            ("no_action_wait", self.no_action_wait),
            ("boss_retarget_wait", self.boss_retarget_wait),
            ("boss_repath_interval", self.boss_repath_interval),
            ("corpse_linger", self.corpse_linger.unwrap_or(0.0)),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{field} must not be negative, got {value}")));
            }
        }

        if let Some(fallback) = &self.targeting.fallback {
            if !(fallback.radius > 0.0) || fallback.tags.is_empty() {
                return Err(invalid("targeting fallback needs a positive radius and at least one tag".into()));
            }
        }

        for entry in &self.actions {
            if !(entry.weight.is_finite() && entry.weight >= 0.0) {
                return Err(invalid(format!("action '{}' has negative weight {}", entry.id, entry.weight)));
            }
            if entry.phase == 0 {
                return Err(invalid(format!("action '{}' phase starts at 1", entry.id)));
            }
        }

        self.validate_phases().map_err(invalid)
    }

    fn validate_phases(&self) -> Result<(), String> {
        if !self.kind.is_boss() {
            if self.phases.is_empty() {
                return Ok(());
            }
            return Err("phase thresholds are boss-only".into());
        }
        if self.phases.is_empty() {
            return Err("boss needs at least one phase threshold".into());
        }

        // В порядке записи: фаза растёт, порог здоровья падает
        let mut previous: Option<&PhaseThreshold> = None;
        for threshold in &self.phases {
            if threshold.phase < 2 {
                return Err(format!("threshold phase {} must be >= 2", threshold.phase));
            }
            if !(threshold.health_ratio > 0.0 && threshold.health_ratio <= 1.0) {
                return Err(format!("threshold ratio {} out of (0, 1]", threshold.health_ratio));
            }
            if !(threshold.speed_multiplier.is_finite() && threshold.speed_multiplier > 0.0) {
                return Err(format!("phase {} speed multiplier must be positive", threshold.phase));
            }
            if let Some(previous) = previous {
                if threshold.phase <= previous.phase || threshold.health_ratio >= previous.health_ratio {
                    return Err(format!(
                        "thresholds unsorted: phase {} at {} after phase {} at {}",
                        threshold.phase, threshold.health_ratio, previous.phase, previous.health_ratio
                    ));
                }
            }
            previous = Some(threshold);
        }
        Ok(())
    }
}

/// Набор профилей по имени
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSet {
    profiles: BTreeMap<String, AgentProfile>,
}

impl Default for ProfileSet {
    /// Встроенные профили: "ally", "enemy", "boss"
    fn default() -> Self {
        let profiles = BTreeMap::from([
            ("ally".to_string(), AgentProfile::ally()),
            ("enemy".to_string(), AgentProfile::enemy()),
            ("boss".to_string(), AgentProfile::boss()),
        ]);
        Self { profiles }
    }
}

impl ProfileSet {
    /// Разобрать RON и проверить каждый профиль
    pub fn from_ron_str(source: &str) -> ConfigResult<Self> {
        let set: ProfileSet = ron::from_str(source)?;
        for (name, profile) in &set.profiles {
            profile.validate(name)?;
        }
        Ok(set)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn get(&self, name: &str) -> Option<&AgentProfile> {
        self.profiles.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, profile: AgentProfile) {
        self.profiles.insert(name.into(), profile);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
