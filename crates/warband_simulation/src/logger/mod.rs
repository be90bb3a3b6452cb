//! Настройка логирования
//!
//! Весь крейт пишет через макросы `tracing` со структурными полями.
//! Headless бинарник и тестовые App ставят fmt subscriber отсюда;
//! встраивающее приложение может поставить свой раньше — он сохранится.

use tracing_subscriber::EnvFilter;

/// Фильтр по умолчанию (когда `RUST_LOG` не задан)
pub const DEFAULT_FILTER: &str = "info";

/// Установить fmt subscriber с фильтром по умолчанию.
///
/// Повторный вызов безопасен: уже установленный subscriber не трогаем.
pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER);
}

/// Установить fmt subscriber; `default_directive` используется,
/// если `RUST_LOG` отсутствует или не парсится.
pub fn init_logger_with(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // try_init падает только если глобальный subscriber уже есть
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_idempotent() {
        init_logger();
        init_logger();
        init_logger_with("debug");
        tracing::info!("logger initialised twice without panicking");
    }
}
