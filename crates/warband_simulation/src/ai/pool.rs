//! ActionPool — набор действий агента
//!
//! Каждая запись знает свой вес и фазу, с которой она доступна.
//! Накопительный набор фазы `p` — все записи с `min_phase <= p`,
//! поэтому переход в фазу объединяет её действия с уже открытыми.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore};

use super::contract::{Action, ActionKind};

/// Запись пула
pub struct PoolEntry {
    pub action: Box<dyn Action>,
    pub weight: f32,
    pub min_phase: u32,
}

/// Адрес действия в пуле
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionSlot {
    Entry(usize),
    /// Действие перегруппировки (следование к точке сбора)
    Regroup,
}

#[derive(Default)]
pub struct ActionPool {
    entries: Vec<PoolEntry>,
    regroup: Option<Box<dyn Action>>,
}

impl ActionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить действие (вес 1, доступно с первой фазы)
    pub fn with(mut self, action: impl Action) -> Self {
        self.push(Box::new(action), 1.0, 1);
        self
    }

    pub fn with_regroup(mut self, action: impl Action) -> Self {
        self.regroup = Some(Box::new(action));
        self
    }

    pub fn push(&mut self, action: Box<dyn Action>, weight: f32, min_phase: u32) {
        self.entries.push(PoolEntry {
            action,
            weight: weight.max(0.0),
            min_phase: min_phase.max(1),
        });
    }

    pub fn set_regroup(&mut self, action: Box<dyn Action>) {
        self.regroup = Some(action);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_regroup(&self) -> bool {
        self.regroup.is_some()
    }

    /// Индексы записей нужного вида, открытых к фазе `phase`
    pub fn eligible(&self, kind: ActionKind, phase: u32) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.action.kind() == kind && entry.min_phase <= phase)
            .map(|(index, _)| index)
            .collect()
    }

    /// Равновероятный выбор (одно подходящее — без обращения к RNG)
    pub fn choose_uniform(&self, kind: ActionKind, phase: u32, rng: &mut dyn RngCore) -> Option<ActionSlot> {
        let eligible = self.eligible(kind, phase);
        match eligible.len() {
            0 => None,
            1 => Some(ActionSlot::Entry(eligible[0])),
            n => Some(ActionSlot::Entry(eligible[rng.gen_range(0..n)])),
        }
    }

    /// Взвешенный выбор; все веса нулевые — равновероятный
    pub fn choose_weighted(&self, kind: ActionKind, phase: u32, rng: &mut dyn RngCore) -> Option<ActionSlot> {
        let eligible = self.eligible(kind, phase);
        if eligible.len() <= 1 {
            return eligible.first().map(|&index| ActionSlot::Entry(index));
        }

        let weights = eligible.iter().map(|&index| self.entries[index].weight);
        match WeightedIndex::new(weights) {
            Ok(distribution) => Some(ActionSlot::Entry(eligible[distribution.sample(rng)])),
            Err(_) => Some(ActionSlot::Entry(eligible[rng.gen_range(0..eligible.len())])),
        }
    }

    pub fn get(&self, slot: ActionSlot) -> Option<&dyn Action> {
        match slot {
            ActionSlot::Entry(index) => self.entries.get(index).map(|entry| entry.action.as_ref()),
            ActionSlot::Regroup => self.regroup.as_deref(),
        }
    }

    pub fn get_mut(&mut self, slot: ActionSlot) -> Option<&mut (dyn Action + 'static)> {
        match slot {
            ActionSlot::Entry(index) => self.entries.get_mut(index).map(|entry| entry.action.as_mut()),
            ActionSlot::Regroup => self.regroup.as_deref_mut(),
        }
    }

    /// Сколько действий сейчас в полёте (для проверки инварианта «не больше одного»)
    pub fn running_count(&self) -> usize {
        let entries = self.entries.iter().filter(|entry| entry.action.is_running()).count();
        let regroup = self.regroup.as_ref().is_some_and(|action| action.is_running());
        entries + usize::from(regroup)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.action.id()).collect()
    }
}
