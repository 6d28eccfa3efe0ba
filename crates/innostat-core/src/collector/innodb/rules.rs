//! Ordered classification rules for `SHOW ENGINE INNODB STATUS` lines.
//!
//! Rules are tried top to bottom and the first match wins, so order matters
//! wherever prefixes overlap. For example `Pages read ahead` must be caught
//! (and ignored) before `Pages read`, and the single-line `RW-shared` /
//! `RW-excl` format must be caught before the post-5.5.17 split format.
//!
//! Token indices are positions after [`tokenize`](super::tokenizer::tokenize).

use super::aio::extract_pending_normal_aio;
use super::context::{GLOBAL_BUFFER_POOL, ParseContext};
use super::error::LineError;
use super::tokenizer::Line;
use crate::models::InnodbMetrics;

pub(crate) type Predicate = fn(&Line<'_>, &ParseContext) -> bool;
pub(crate) type Extractor =
    fn(&Line<'_>, &mut ParseContext, &mut InnodbMetrics) -> Result<(), LineError>;

/// `(metric name, token index)` pairs.
type Fields = &'static [(&'static str, usize)];

/// When a rule applies to a line.
pub(crate) enum Trigger {
    /// Line starts with the text.
    Prefix(&'static str),
    /// Text occurs after the first character of the line.
    Infix(&'static str),
    When(Predicate),
}

/// What a matching rule records.
pub(crate) enum Action {
    /// Last-write-wins values.
    Gauges(Fields),
    /// Values summed across lines.
    Counters(Fields),
    /// Gauges recorded only outside per-pool sections.
    PoolGauges(Fields),
    Custom(Extractor),
    /// Consume the line without recording anything.
    Ignore,
}

pub(crate) struct Rule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub action: Action,
}

impl Trigger {
    fn matches(&self, line: &Line<'_>, ctx: &ParseContext) -> bool {
        match self {
            Trigger::Prefix(prefix) => line.starts_with(prefix),
            Trigger::Infix(needle) => line.has_infix(needle),
            Trigger::When(predicate) => predicate(line, ctx),
        }
    }
}

impl Rule {
    pub(crate) fn matches(&self, line: &Line<'_>, ctx: &ParseContext) -> bool {
        self.trigger.matches(line, ctx)
    }

    pub(crate) fn apply(
        &self,
        line: &Line<'_>,
        ctx: &mut ParseContext,
        metrics: &mut InnodbMetrics,
    ) -> Result<(), LineError> {
        match self.action {
            Action::Gauges(fields) => {
                for (name, value) in read_fields(line, fields)? {
                    metrics.set(name, value);
                }
            }
            Action::Counters(fields) => {
                for (name, value) in read_fields(line, fields)? {
                    metrics.add(name, value);
                }
            }
            Action::PoolGauges(fields) => {
                if ctx.in_global_pool() {
                    for (name, value) in read_fields(line, fields)? {
                        metrics.set(name, value);
                    }
                }
            }
            Action::Custom(extract) => extract(line, ctx, metrics)?,
            Action::Ignore => {}
        }
        Ok(())
    }
}

/// Parses every field before anything is recorded, so a malformed line
/// leaves the mapping untouched.
fn read_fields(line: &Line<'_>, fields: Fields) -> Result<Vec<(&'static str, i64)>, LineError> {
    fields
        .iter()
        .map(|&(name, index)| Ok((name, line.int(index)?)))
        .collect()
}

/// Returns the first rule matching `line`.
pub(crate) fn classify(line: &Line<'_>, ctx: &ParseContext) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.matches(line, ctx))
}

const fn rule(name: &'static str, trigger: Trigger, action: Action) -> Rule {
    Rule {
        name,
        trigger,
        action,
    }
}

use Action::{Counters, Custom, Gauges, Ignore, PoolGauges};
use Trigger::{Infix, Prefix, When};

pub(crate) static RULES: &[Rule] = &[
    // Section structure
    rule("buffer_pool_header", Prefix("---BUFFER POOL"), Custom(enter_buffer_pool)),
    // Any dash rule ends a `---BUFFER POOL n` section, so pool sections printed
    // ahead of the global summary do not hide it.
    rule("section_separator", When(is_separator), Custom(leave_buffer_pool)),
    // SEMAPHORES
    // Mutex spin waits 79626940, rounds 157459864, OS waits 698719
    rule(
        "mutex_spins",
        Prefix("Mutex spin waits"),
        Gauges(&[
            ("mutex_spin_waits", 3),
            ("mutex_spin_rounds", 5),
            ("mutex_os_waits", 8),
        ]),
    ),
    // RW-shared spins 3859028, OS waits 2100750; RW-excl spins 4641946, OS waits 1530310
    rule(
        "rw_lock_spins",
        When(is_single_line_rw_spins),
        Gauges(&[
            ("s_lock_spin_waits", 2),
            ("x_lock_spin_waits", 8),
            ("s_lock_os_waits", 5),
            ("x_lock_os_waits", 11),
        ]),
    ),
    // RW-shared spins 604733, rounds 8107431, OS waits 241268
    rule(
        "rw_shared_spins",
        When(is_rw_shared_spins),
        Gauges(&[
            ("s_lock_spin_waits", 2),
            ("s_lock_spin_rounds", 4),
            ("s_lock_os_waits", 7),
        ]),
    ),
    // RW-excl spins 604733, rounds 8107431, OS waits 241268
    rule(
        "rw_excl_spins",
        Prefix("RW-excl spins"),
        Gauges(&[
            ("x_lock_spin_waits", 2),
            ("x_lock_spin_rounds", 4),
            ("x_lock_os_waits", 7),
        ]),
    ),
    // --Thread 907205 has waited at handler/ha_innodb.cc line 7156 for 1.00 seconds the semaphore:
    rule(
        "semaphore_wait",
        Infix("seconds the semaphore:"),
        Custom(record_semaphore_wait),
    ),
    // TRANSACTIONS
    rule("trx_id_counter", Prefix("Trx id counter"), Custom(enter_transactions)),
    rule(
        "history_list_length",
        Prefix("History list length"),
        Gauges(&[("history_list_length", 3)]),
    ),
    // ---TRANSACTION 0, not started, process no 13510, OS thread id 1170446656
    rule("transaction", When(is_transaction_header), Custom(count_transaction)),
    rule(
        "read_views",
        Infix("read views open inside InnoDB"),
        Gauges(&[("read_views", 0)]),
    ),
    // mysql tables in use 2, locked 2
    rule(
        "tables_in_use",
        Prefix("mysql tables in use"),
        Counters(&[("tables_in_use", 4), ("locked_tables", 6)]),
    ),
    // LOCK WAIT 12 lock struct(s), heap size 3024, undo log entries 5
    rule("lock_structs", When(is_lock_struct_line), Custom(count_lock_structs)),
    // FILE I/O
    // 8782182 OS file reads, 15635445 OS file writes, 947800 OS fsyncs
    rule(
        "os_file_io",
        Infix(" OS file reads, "),
        Gauges(&[
            ("os_file_reads", 0),
            ("os_file_writes", 4),
            ("os_file_fsyncs", 8),
        ]),
    ),
    rule(
        "pending_normal_aio",
        Prefix("Pending normal aio reads:"),
        Custom(extract_pending_normal_aio),
    ),
    // ibuf aio reads: 0, log i/o's: 0, sync i/o's: 0
    rule(
        "pending_ibuf_aio",
        Prefix("ibuf aio reads"),
        Custom(record_pending_ibuf_aio),
    ),
    rule(
        "pending_flushes",
        Prefix("Pending flushes (fsync)"),
        Custom(record_pending_flushes),
    ),
    // INSERT BUFFER AND ADAPTIVE HASH INDEX
    // Ibuf for space 0: size 1, free list len 887, seg size 889, is not empty
    rule(
        "ibuf_for_space",
        Prefix("Ibuf for space 0: size "),
        Gauges(&[
            ("ibuf_size", 5),
            ("ibuf_free_list", 9),
            ("ibuf_segment_size", 12),
        ]),
    ),
    // Ibuf: size 1, free list len 4634, seg size 4636,
    rule("ibuf_size", Prefix("Ibuf: size "), Custom(record_ibuf_size)),
    // merged operations:
    //  insert 593983, delete mark 387006, delete 73092
    rule(
        "ibuf_merged_operations",
        When(is_merged_operations),
        Custom(record_merged_operations),
    ),
    // 19817685 inserts, 19817684 merged recs, 3552620 merges
    rule(
        "ibuf_merged_recs",
        Infix(" merged recs, "),
        Gauges(&[
            ("ibuf_merged_inserts", 0),
            ("ibuf_merged", 2),
            ("ibuf_merges", 5),
        ]),
    ),
    // Hash table size 4425293, used cells 4229064, ....
    rule("hash_table", Prefix("Hash table size "), Custom(record_hash_table)),
    // LOG
    // 3430041 log i/o's done, 17.44 log i/o's/second
    rule(
        "log_ios",
        Infix(" log i/o's done, "),
        Gauges(&[("log_writes", 0)]),
    ),
    // 0 pending log writes, 0 pending chkp writes
    rule(
        "pending_log_writes",
        Infix(" pending log writes, "),
        Gauges(&[("pending_log_writes", 0), ("pending_checkpoint_writes", 4)]),
    ),
    rule(
        "lsn_current",
        Prefix("Log sequence number"),
        Gauges(&[("lsn_current", 3)]),
    ),
    rule(
        "lsn_flushed",
        Prefix("Log flushed up to"),
        Gauges(&[("lsn_flushed", 4)]),
    ),
    rule(
        "lsn_last_checkpoint",
        Prefix("Last checkpoint at"),
        Gauges(&[("lsn_last_checkpoint", 3)]),
    ),
    // BUFFER POOL AND MEMORY
    // Total memory allocated 29642194944; in additional pool allocated 0
    rule(
        "mem_total",
        When(is_total_memory_line),
        Gauges(&[("mem_total", 3), ("mem_additional_pool", 8)]),
    ),
    // Total large memory allocated 137428992
    rule(
        "mem_total_large",
        Prefix("Total large memory allocated"),
        Gauges(&[("mem_total", 4)]),
    ),
    // Dictionary memory allocated 373255
    rule(
        "mem_dictionary_allocated",
        Prefix("Dictionary memory allocated"),
        Gauges(&[("mem_dictionary", 3)]),
    ),
    // Adaptive hash index 1538240664     (186998824 + 1351241840)
    rule(
        "mem_adaptive_hash",
        Prefix("Adaptive hash index "),
        Gauges(&[("mem_adaptive_hash", 3)]),
    ),
    rule(
        "mem_page_hash",
        Prefix("Page hash           "),
        Gauges(&[("mem_page_hash", 2)]),
    ),
    rule(
        "mem_dictionary",
        Prefix("Dictionary cache    "),
        Gauges(&[("mem_dictionary", 2)]),
    ),
    rule(
        "mem_file_system",
        Prefix("File system         "),
        Gauges(&[("mem_file_system", 2)]),
    ),
    rule(
        "mem_lock_system",
        Prefix("Lock system         "),
        Gauges(&[("mem_lock_system", 2)]),
    ),
    rule(
        "mem_recovery_system",
        Prefix("Recovery system     "),
        Gauges(&[("mem_recovery_system", 2)]),
    ),
    rule(
        "mem_thread_hash",
        Prefix("Threads             "),
        Gauges(&[("mem_thread_hash", 1)]),
    ),
    // Buffer pool size, bytes 28991012864
    rule(
        "buffer_pool_bytes",
        Prefix("Buffer pool size, bytes"),
        PoolGauges(&[("buffer_pool_bytes_total", 4)]),
    ),
    // The trailing space keeps the ", bytes" line above out of this rule.
    rule(
        "buffer_pool_size",
        Prefix("Buffer pool size "),
        PoolGauges(&[("buffer_pool_pages_total", 3)]),
    ),
    rule(
        "free_buffers",
        Prefix("Free buffers"),
        PoolGauges(&[("buffer_pool_pages_free", 2)]),
    ),
    rule(
        "database_pages",
        Prefix("Database pages"),
        PoolGauges(&[("buffer_pool_pages_data", 2)]),
    ),
    rule(
        "modified_db_pages",
        Prefix("Modified db pages"),
        PoolGauges(&[("buffer_pool_pages_dirty", 3)]),
    ),
    // Pages read ahead 0.00/s, evicted without access 0.06/s
    rule("pages_read_ahead", Prefix("Pages read ahead"), Ignore),
    // Pages read 15240822, created 1770238, written 21705836
    rule(
        "pages_read",
        Prefix("Pages read"),
        PoolGauges(&[
            ("pages_read", 2),
            ("pages_created", 4),
            ("pages_written", 6),
        ]),
    ),
    // ROW OPERATIONS
    // Number of rows inserted 50678311, updated 66425915, deleted 20605903, read 454561562
    rule(
        "row_operations",
        Prefix("Number of rows inserted"),
        Gauges(&[
            ("rows_inserted", 4),
            ("rows_updated", 6),
            ("rows_deleted", 8),
            ("rows_read", 10),
        ]),
    ),
    // 0 queries inside InnoDB, 0 queries in queue
    rule(
        "queries_inside",
        Infix(" queries inside InnoDB, "),
        Gauges(&[("queries_inside", 0), ("queries_queued", 4)]),
    ),
];

// ── Predicates ───────────────────────────────────────────────────────────────

/// Dash-only rule lines framing section titles.
fn is_separator(line: &Line<'_>, _ctx: &ParseContext) -> bool {
    line.text.len() >= 3 && line.text.bytes().all(|b| b == b'-')
}

fn is_single_line_rw_spins(line: &Line<'_>, _ctx: &ParseContext) -> bool {
    line.starts_with("RW-shared spins") && line.has_infix(";")
}

fn is_rw_shared_spins(line: &Line<'_>, _ctx: &ParseContext) -> bool {
    line.starts_with("RW-shared spins") && !line.text.contains("; RW-excl spins")
}

fn is_transaction_header(line: &Line<'_>, ctx: &ParseContext) -> bool {
    ctx.transaction_section_entered && line.starts_with("---TRANSACTION")
}

fn is_lock_struct_line(line: &Line<'_>, ctx: &ParseContext) -> bool {
    ctx.transaction_section_entered && line.has_infix("lock struct(s)")
}

fn is_merged_operations(line: &Line<'_>, ctx: &ParseContext) -> bool {
    line.has_infix(", delete mark ") && ctx.previous_line.starts_with("merged operations:")
}

fn is_total_memory_line(line: &Line<'_>, _ctx: &ParseContext) -> bool {
    line.starts_with("Total memory allocated") && line.has_infix("in additional pool allocated")
}

// ── Extractors ───────────────────────────────────────────────────────────────

fn enter_buffer_pool(
    line: &Line<'_>,
    ctx: &mut ParseContext,
    _metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    ctx.active_buffer_pool = line.int(2)?;
    Ok(())
}

fn leave_buffer_pool(
    _line: &Line<'_>,
    ctx: &mut ParseContext,
    _metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    ctx.active_buffer_pool = GLOBAL_BUFFER_POOL;
    Ok(())
}

/// Wait time is accumulated in milliseconds from whole seconds.
fn record_semaphore_wait(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    let seconds = line.float(9)?.trunc() as i64;
    metrics.add("semaphore_waits", 1);
    metrics.add("semaphore_wait_time", seconds.saturating_mul(1000));
    Ok(())
}

fn enter_transactions(
    _line: &Line<'_>,
    ctx: &mut ParseContext,
    _metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    ctx.transaction_section_entered = true;
    Ok(())
}

fn count_transaction(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    metrics.add("current_transactions", 1);
    if line.has_infix("ACTIVE") {
        metrics.add("active_transactions", 1);
    }
    Ok(())
}

// 23 lock struct(s), heap size 3024, undo log entries 27
// LOCK WAIT 12 lock struct(s), heap size 3024, undo log entries 5
// ROLLING BACK 127539 lock struct(s), heap size 15201832, 4411492 row lock(s), undo log entries 1042488
fn count_lock_structs(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    if line.starts_with("LOCK WAIT") {
        metrics.add("lock_structs", line.int(2)?);
        metrics.add("locked_transactions", 1);
    } else if line.starts_with("ROLLING BACK") {
        metrics.add("lock_structs", line.int(2)?);
    } else {
        metrics.add("lock_structs", line.int(0)?);
    }
    Ok(())
}

// ibuf aio reads: 0, log i/o's: 0, sync i/o's: 0
// ibuf aio reads:, log i/o's:, sync i/o's:
fn record_pending_ibuf_aio(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    let (ibuf, log, sync) = match line.tokens.len() {
        10 => (line.int(3)?, line.int(6)?, line.int(9)?),
        7 => (0, 0, 0),
        _ => return Ok(()),
    };
    metrics.set("pending_ibuf_aio_reads", ibuf);
    metrics.set("pending_aio_log_ios", log);
    metrics.set("pending_aio_sync_ios", sync);
    Ok(())
}

// Pending flushes (fsync): 0
// Pending flushes (fsync) log: 0; buffer pool: 0
fn record_pending_flushes(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    if line.tokens.len() == 4 {
        metrics.set("pending_buffer_pool_flushes", line.int(3)?);
    } else {
        let log = line.int(4)?;
        let buffer_pool = line.int(7)?;
        metrics.set("pending_log_flushes", log);
        metrics.set("pending_buffer_pool_flushes", buffer_pool);
    }
    Ok(())
}

fn record_ibuf_size(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    let size = line.int(2)?;
    let free_list = line.int(6)?;
    let segment_size = line.int(9)?;
    let merges = if line.text.contains("merges") {
        Some(line.int(10)?)
    } else {
        None
    };

    metrics.set("ibuf_size", size);
    metrics.set("ibuf_free_list", free_list);
    metrics.set("ibuf_segment_size", segment_size);
    if let Some(merges) = merges {
        metrics.set("ibuf_merges", merges);
    }
    Ok(())
}

fn record_merged_operations(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    let inserts = line.int(1)?;
    let delete_marks = line.int(4)?;
    let deletes = line.int(6)?;
    let merged = inserts
        .checked_add(delete_marks)
        .and_then(|sum| sum.checked_add(deletes))
        .ok_or(LineError::Overflow { first: 1, last: 6 })?;

    metrics.set("ibuf_merged_inserts", inserts);
    metrics.set("ibuf_merged_delete_marks", delete_marks);
    metrics.set("ibuf_merged_deletes", deletes);
    metrics.set("ibuf_merged", merged);
    Ok(())
}

/// Some versions omit the used-cells figure; it is then recorded as zero.
fn record_hash_table(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    let total = line.int(3)?;
    let used = if line.has_infix("used cells") {
        line.int(6)?
    } else {
        0
    };
    metrics.set("hash_index_cells_total", total);
    metrics.set("hash_index_cells_used", used);
    Ok(())
}
