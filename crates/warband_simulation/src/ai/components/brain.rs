//! Brain — машина поведения агента как ECS компонент

use bevy::prelude::*;

use crate::ai::{BehaviorMachine, BehaviorState};

/// Компонент: машина поведения
///
/// Состояние машины целиком внутри: системы только собирают контекст
/// и вызывают `tick` / прерывания.
#[derive(Component, Debug)]
pub struct Brain {
    pub machine: BehaviorMachine,
}

impl Brain {
    pub fn new(machine: BehaviorMachine) -> Self {
        Self { machine }
    }

    pub fn state(&self) -> BehaviorState {
        self.machine.state()
    }
}
