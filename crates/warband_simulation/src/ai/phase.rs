//! PhaseController — фазы босса
//!
//! Фаза растёт, когда доля здоровья опускается до порога, и никогда не падает
//! (даже если босса вылечили). Действия фазы открываются через `min_phase`
//! в ActionPool, скорость — через множитель порога.

use serde::{Deserialize, Serialize};

/// Порог фазы
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseThreshold {
    /// Фаза включается при health_ratio <= этого значения
    pub health_ratio: f32,
    pub phase: u32,
    /// Множитель базовой скорости в этой фазе
    pub speed_multiplier: f32,
}

/// Факт перехода фазы
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    pub from: u32,
    pub to: u32,
    pub speed_multiplier: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseController {
    /// Отсортированы по убыванию health_ratio
    thresholds: Vec<PhaseThreshold>,
    phase: u32,
    speed_multiplier: f32,
}

impl PhaseController {
    pub fn new(mut thresholds: Vec<PhaseThreshold>) -> Self {
        thresholds.sort_by(|a, b| b.health_ratio.total_cmp(&a.health_ratio));
        Self {
            thresholds,
            phase: 1,
            speed_multiplier: 1.0,
        }
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn thresholds(&self) -> &[PhaseThreshold] {
        &self.thresholds
    }

    /// Проверить здоровье; Some — фаза выросла.
    ///
    /// Если за один тик пересечено несколько порогов, берётся самый глубокий
    /// (действия промежуточных фаз всё равно открыты через `min_phase`).
    pub fn update(&mut self, health_ratio: f32) -> Option<PhaseChange> {
        let deepest = self
            .thresholds
            .iter()
            .filter(|threshold| health_ratio <= threshold.health_ratio && threshold.phase > self.phase)
            .max_by_key(|threshold| threshold.phase)
            .copied()?;

        let change = PhaseChange {
            from: self.phase,
            to: deepest.phase,
            speed_multiplier: deepest.speed_multiplier,
        };
        self.phase = deepest.phase;
        self.speed_multiplier = deepest.speed_multiplier;
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boss_thresholds() -> Vec<PhaseThreshold> {
        vec![
            PhaseThreshold { health_ratio: 0.3, phase: 3, speed_multiplier: 6.0 / 3.5 },
            PhaseThreshold { health_ratio: 0.7, phase: 2, speed_multiplier: 1.0 },
        ]
    }

    #[test]
    fn test_escalates_once_and_never_lowers() {
        let mut controller = PhaseController::new(boss_thresholds());
        assert_eq!(controller.phase(), 1);

        assert_eq!(controller.update(1.0), None);

        let change = controller.update(0.65);
        assert_eq!(change.map(|c| (c.from, c.to)), Some((1, 2)));
        // Повторно тот же порог не срабатывает
        assert_eq!(controller.update(0.65), None);

        // Лечение не откатывает фазу
        assert_eq!(controller.update(0.8), None);
        assert_eq!(controller.phase(), 2);
    }

    #[test]
    fn test_skips_straight_to_deepest_phase() {
        let mut controller = PhaseController::new(boss_thresholds());
        let change = controller.update(0.1);
        assert_eq!(change.map(|c| (c.from, c.to)), Some((1, 3)));
        assert!((controller.speed_multiplier() - 6.0 / 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_thresholds_sorted_descending() {
        let controller = PhaseController::new(boss_thresholds());
        let ratios: Vec<f32> = controller.thresholds().iter().map(|t| t.health_ratio).collect();
        assert_eq!(ratios, vec![0.7, 0.3]);
    }
}
