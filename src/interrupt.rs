use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Ctrl-C latch shared between the signal handler and the blocking points
/// (prompt and child wait).
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// After this, Ctrl-C only sets the flag instead of ending the process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let interrupt = Self::default();
        let flag = interrupt.flag.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
        Ok(interrupt)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}
