use tokio::sync::Mutex as AsyncMutex;

/// Process-wide lock serializing tests that touch `SITELOOM_*` environment
/// variables. Use `.blocking_lock()` in sync tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());
