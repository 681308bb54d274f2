use std::num::NonZeroUsize;
use std::thread;

pub struct DefaultsConfig {
    pub column: String,
    pub max_active: usize,
    /// Queue bound as a multiple of the worker count.
    pub queue_factor: usize,
    pub counts: bool,
    pub positions: bool,
}

impl DefaultsConfig {
    /// Defaults for a machine, using `threads` workers when given and every
    /// available core otherwise.
    pub fn detect(threads: Option<usize>) -> Self {
        let max_active = threads.filter(|&n| n > 0).unwrap_or_else(|| {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        });
        Self {
            max_active,
            ..Self::default()
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            column: "smiles".to_string(),
            max_active: 1,
            queue_factor: 10,
            counts: false,
            positions: false,
        }
    }
}
