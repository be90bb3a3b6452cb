//! Возобновляемая задача (курсор шага + ожидание)
//!
//! Действие длится много тиков. Вместо корутины оно хранит `TaskCursor`:
//! текущий шаг (`P`, обычно enum фаз действия) и оставшееся ожидание.
//! Каждый вызов `execute` продолжает с сохранённого шага.
//!
//! Отмена: `cancel()` сбрасывает курсор. Следующий `execute` начнёт новый запуск,
//! поэтому отменённый запуск не выполнит ни одного шага после отмены.

/// Курсор шага действия
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCursor<P> {
    step: Option<P>,
    wait: f32,
    cancelled: bool,
}

impl<P> Default for TaskCursor<P> {
    fn default() -> Self {
        Self {
            step: None,
            wait: 0.0,
            cancelled: false,
        }
    }
}

impl<P: Copy> TaskCursor<P> {
    pub fn is_running(&self) -> bool {
        self.step.is_some()
    }

    pub fn step(&self) -> Option<P> {
        self.step
    }

    /// Начать новый запуск с шага `step`
    pub fn begin(&mut self, step: P) {
        self.step = Some(step);
        self.wait = 0.0;
        self.cancelled = false;
    }

    /// Начать новый запуск, первый шаг — после ожидания
    pub fn begin_after(&mut self, step: P, seconds: f32) {
        self.begin(step);
        self.wait = seconds.max(0.0);
    }

    /// Перейти к шагу сразу (на следующем вызове)
    pub fn advance(&mut self, step: P) {
        self.step = Some(step);
        self.wait = 0.0;
    }

    /// Перейти к шагу после ожидания
    pub fn advance_after(&mut self, step: P, seconds: f32) {
        self.step = Some(step);
        self.wait = seconds.max(0.0);
    }

    /// Точка приостановки: отсчитать `delta`. true — ещё ждём.
    pub fn waiting(&mut self, delta: f32) -> bool {
        if self.wait <= 0.0 {
            return false;
        }
        self.wait -= delta;
        if self.wait > 1e-5 {
            return true;
        }
        self.wait = 0.0;
        false
    }

    /// Штатное завершение
    pub fn finish(&mut self) {
        self.step = None;
        self.wait = 0.0;
    }

    /// Отменить запуск. true — запуск был активен (первый вызов);
    /// повторная отмена или отмена до старта возвращает false.
    pub fn cancel(&mut self) -> bool {
        if self.step.is_none() {
            return false;
        }
        self.step = None;
        self.wait = 0.0;
        self.cancelled = true;
        true
    }

    /// Последний запуск был отменён (сбрасывается при `begin`)
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}
