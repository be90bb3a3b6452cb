//! AI Events — внешние команды агентам
//!
//! Приходят от игрока/клиента, обрабатываются в `SimulationSet::React`
//! до решений машины состояний.

use bevy::prelude::*;

/// Кому адресована команда
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    Agent(Entity),
    /// Все союзники
    AllAllies,
}

/// Поднять выведенных из строя
///
/// Невыведенные из строя и неподнимаемые (босс) игнорируются.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviveRequest {
    pub scope: CommandScope,
}

/// Команда перегруппировки
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegroupCommand {
    pub scope: CommandScope,
    /// true — начать (бросить бой, идти к игроку); false — снять флаг команды
    pub start: bool,
}
