//! Cross-line parse state.

/// Sentinel for "no per-pool section is active".
pub const GLOBAL_BUFFER_POOL: i64 = -1;

/// State carried from one line to the next during a single parse.
///
/// Created fresh for every report; never shared between parses.
#[derive(Debug)]
pub struct ParseContext {
    /// Set once the `Trx id counter` line has been seen.
    pub transaction_section_entered: bool,
    /// Trimmed text of the previous line.
    pub previous_line: String,
    /// Pool id from the last `---BUFFER POOL <n>` header, or [`GLOBAL_BUFFER_POOL`].
    pub active_buffer_pool: i64,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            transaction_section_entered: false,
            previous_line: String::new(),
            active_buffer_pool: GLOBAL_BUFFER_POOL,
        }
    }
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while aggregate buffer-pool lines may be recorded.
    pub fn in_global_pool(&self) -> bool {
        self.active_buffer_pool == GLOBAL_BUFFER_POOL
    }

    pub fn remember_line(&mut self, line: &str) {
        self.previous_line.clear();
        self.previous_line.push_str(line);
    }
}
