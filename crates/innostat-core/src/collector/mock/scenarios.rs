//! Pre-built mock servers for testing.
//!
//! The status reports are realistic monitor output from three server
//! generations: a 5.6-style single pool, a 5.7-style server with
//! per-pool sections, and a 5.1-plugin-era report with the memory
//! breakdown and the single-line RW spin format.

use serde_json::json;

use super::source::{MockSource, json_row};
use crate::collector::queries::{QUERY_HAS_INNODB, QUERY_INNODB_STATUS, QUERY_TABLE_STATISTICS};
use crate::collector::traits::row;

/// Single buffer pool, one waiting and one idle transaction.
pub const TYPICAL_STATUS: &str = "\
=====================================
2024-03-05 10:15:42 7f1c2c0f9700 INNODB MONITOR OUTPUT
=====================================
Per second averages calculated from the last 12 seconds
-----------------
BACKGROUND THREAD
-----------------
srv_master_thread loops: 1210 srv_active, 0 srv_shutdown, 912870 srv_idle
srv_master_thread log flush and writes: 914080
----------
SEMAPHORES
----------
OS WAIT ARRAY INFO: reservation count 698719
--Thread 140312 has waited at row0ins.cc line 2395 for 2.00 seconds the semaphore:
X-lock on RW-latch at 0x7f1c1c0a8 created in file dict0dict.cc line 2341
OS WAIT ARRAY INFO: signal count 712003
Mutex spin waits 79626940, rounds 157459864, OS waits 698719
RW-shared spins 604733, rounds 8107431, OS waits 241268
RW-excl spins 13302, rounds 1064498, OS waits 14372
Spin rounds per wait: 1.98 mutex, 13.41 RW-shared, 80.03 RW-excl
------------
TRANSACTIONS
------------
Trx id counter 1170664159
Purge done for trx's n:o < 1170664150 undo n:o < 0 state: running but idle
History list length 132
LIST OF TRANSACTIONS FOR EACH SESSION:
---TRANSACTION 0, not started
MySQL thread id 21, OS thread handle 0x7f1c2c0f9700, query id 912 localhost root init
SHOW ENGINE INNODB STATUS
---TRANSACTION 1170664158, ACTIVE 3 sec starting index read
mysql tables in use 1, locked 1
LOCK WAIT 2 lock struct(s), heap size 360, 1 row lock(s)
MySQL thread id 25, OS thread handle 0x7f1c2c0b8700, query id 930 localhost app updating
---TRANSACTION 1170664157, ACTIVE 10 sec
mysql tables in use 2, locked 2
4 lock struct(s), heap size 1184, 3 row lock(s), undo log entries 1
--------
FILE I/O
--------
I/O thread 0 state: waiting for completed aio requests (insert buffer thread)
Pending normal aio reads: 3 [1, 0, 2, 0] , aio writes: 1 [0, 1, 0, 0] ,
 ibuf aio reads: 0, log i/o's: 0, sync i/o's: 0
Pending flushes (fsync) log: 0; buffer pool: 0
8782182 OS file reads, 15635445 OS file writes, 947800 OS fsyncs
0.00 reads/s, 0 avg bytes/read, 3.42 writes/s, 1.08 fsyncs/s
-------------------------------------
INSERT BUFFER AND ADAPTIVE HASH INDEX
-------------------------------------
Ibuf: size 1, free list len 4634, seg size 4636, 3552620 merges
merged operations:
 insert 593983, delete mark 387006, delete 73092
discarded operations:
 insert 0, delete mark 0, delete 0
Hash table size 4425293, node heap has 1213 buffer(s)
0.00 hash searches/s, 4.25 non-hash searches/s
---
LOG
---
Log sequence number 272588624
Log flushed up to   272588624
Pages flushed up to 272580000
Last checkpoint at  272500000
0 pending log writes, 0 pending chkp writes
3430041 log i/o's done, 17.44 log i/o's/second
----------------------
BUFFER POOL AND MEMORY
----------------------
Total memory allocated 29642194944; in additional pool allocated 0
Dictionary memory allocated 145525560
Buffer pool size   1769471
Free buffers       1024
Database pages     1696503
Old database pages 626119
Modified db pages  160602
Pending reads 0
Pending writes: LRU 0, flush list 0, single page 0
Pages made young 5201, not young 312
0.00 youngs/s, 0.00 non-youngs/s
Pages read 15240822, created 1770238, written 21705836
0.00 reads/s, 0.00 creates/s, 3.17 writes/s
Buffer pool hit rate 1000 / 1000, young-making rate 0 / 1000 not 0 / 1000
Pages read ahead 0.00/s, evicted without access 0.00/s, Random read ahead 0.00/s
LRU len: 1696503, unzip_LRU len: 0
I/O sum[0]:cur[0], unzip sum[0]:cur[0]
--------------
ROW OPERATIONS
--------------
0 queries inside InnoDB, 0 queries in queue
1 read views open inside InnoDB
Main thread process no. 13510, id 139760, state: sleeping
Number of rows inserted 50678311, updated 66425915, deleted 20605903, read 454561562
0.00 inserts/s, 0.17 updates/s, 0.00 deletes/s, 0.33 reads/s
----------------------------
END OF INNODB MONITOR OUTPUT
============================
";

/// Two buffer pool instances after the global summary.
pub const MULTI_POOL_STATUS: &str = "\
=====================================
2024-03-05 10:20:01 0x7f3a8c1f7700 INNODB MONITOR OUTPUT
=====================================
Per second averages calculated from the last 7 seconds
----------
SEMAPHORES
----------
OS WAIT ARRAY INFO: reservation count 1510
OS WAIT ARRAY INFO: signal count 1450
RW-shared spins 0, rounds 2210, OS waits 1052
RW-excl spins 0, rounds 8410, OS waits 210
RW-sx spins 12, rounds 330, OS waits 9
Spin rounds per wait: 2210.00 RW-shared, 8410.00 RW-excl, 27.50 RW-sx
------------
TRANSACTIONS
------------
Trx id counter 2307
Purge done for trx's n:o < 2305 undo n:o < 0 state: running but idle
History list length 17
LIST OF TRANSACTIONS FOR EACH SESSION:
---TRANSACTION 421514281358160, not started
0 lock struct(s), heap size 1136, 0 row lock(s)
--------
FILE I/O
--------
Pending normal aio reads: [0, 0, 0, 0] , aio writes: [0, 0, 0, 0] ,
 ibuf aio reads:, log i/o's:, sync i/o's:
Pending flushes (fsync) log: 0; buffer pool: 0
431 OS file reads, 2290 OS file writes, 745 OS fsyncs
-------------------------------------
INSERT BUFFER AND ADAPTIVE HASH INDEX
-------------------------------------
Ibuf: size 1, free list len 0, seg size 2, 0 merges
merged operations:
 insert 0, delete mark 0, delete 0
discarded operations:
 insert 0, delete mark 0, delete 0
Hash table size 34673, node heap has 0 buffer(s)
Hash table size 34673, node heap has 2 buffer(s)
0.00 hash searches/s, 0.00 non-hash searches/s
---
LOG
---
Log sequence number 12819213
Log flushed up to   12819213
Pages flushed up to 12819213
Last checkpoint at  12819204
0 pending log writes, 0 pending chkp writes
520 log i/o's done, 0.00 log i/o's/second
----------------------
BUFFER POOL AND MEMORY
----------------------
Total large memory allocated 274857984
Dictionary memory allocated 116177
Buffer pool size   16382
Free buffers       15860
Database pages     522
Old database pages 0
Modified db pages  3
Pending reads      0
Pending writes: LRU 0, flush list 0, single page 0
Pages made young 0, not young 0
0.00 youngs/s, 0.00 non-youngs/s
Pages read 380, created 142, written 1570
0.00 reads/s, 0.00 creates/s, 0.00 writes/s
No buffer pool page gets since the last printout
Pages read ahead 0.00/s, evicted without access 0.00/s, Random read ahead 0.00/s
LRU len: 522, unzip_LRU len: 0
I/O sum[0]:cur[0], unzip sum[0]:cur[0]
----------------------
INDIVIDUAL BUFFER POOL INFO
----------------------
---BUFFER POOL 0
Buffer pool size   8191
Free buffers       7925
Database pages     266
Old database pages 0
Modified db pages  1
Pages read 190, created 76, written 801
---BUFFER POOL 1
Buffer pool size   8191
Free buffers       7935
Database pages     256
Old database pages 0
Modified db pages  2
Pages read 190, created 66, written 769
--------------
ROW OPERATIONS
--------------
0 queries inside InnoDB, 0 queries in queue
0 read views open inside InnoDB
Process ID=1, Main thread ID=139, state: sleeping
Number of rows inserted 4127, updated 12, deleted 3, read 88012
0.00 inserts/s, 0.00 updates/s, 0.00 deletes/s, 0.00 reads/s
----------------------------
END OF INNODB MONITOR OUTPUT
============================
";

/// Older plugin output: single-line RW spins, merged recs, memory breakdown.
pub const LEGACY_STATUS: &str = "\
=====================================
110805 14:22:31 INNODB MONITOR OUTPUT
=====================================
Per second averages calculated from the last 16 seconds
----------
SEMAPHORES
----------
OS WAIT ARRAY INFO: reservation count 2100750, signal count 2087215
Mutex spin waits 0, rounds 247280272495, OS waits 316513438
RW-shared spins 3859028, OS waits 2100750; RW-excl spins 4641946, OS waits 1530310
------------
TRANSACTIONS
------------
Trx id counter 1170664159
Purge done for trx's n:o < 1170663853 undo n:o < 0
History list length 40
LIST OF TRANSACTIONS FOR EACH SESSION:
---TRANSACTION 1170664158, ACTIVE 2 sec, process no 13510, OS thread id 1170446656 fetching rows
mysql tables in use 1, locked 0
ROLLING BACK 127539 lock struct(s), heap size 15201832, 4411492 row lock(s), undo log entries 1042488
--------
FILE I/O
--------
Pending normal aio reads: 0, aio writes: 0,
 ibuf aio reads: 0, log i/o's: 0, sync i/o's: 0
Pending flushes (fsync): 0
8782182 OS file reads, 15635445 OS file writes, 947800 OS fsyncs
-------------------------------------
INSERT BUFFER AND ADAPTIVE HASH INDEX
-------------------------------------
Ibuf for space 0: size 1, free list len 887, seg size 889, is not empty
19817685 inserts, 19817684 merged recs, 3552620 merges
Hash table size 4425293, used cells 4229064, node heap has 8401 buffer(s)
---
LOG
---
Log sequence number 272588624
Log flushed up to   272588624
Last checkpoint at  272588000
0 pending log writes, 0 pending chkp writes
3430041 log i/o's done, 17.44 log i/o's/second
----------------------
BUFFER POOL AND MEMORY
----------------------
Total memory allocated 29642194944; in additional pool allocated 0
Internal hash tables (constant factor + variable factor)
    Adaptive hash index 1538240664      (186998824 + 1351241840)
    Page hash           11688584
    Dictionary cache    145525560       (140250984 + 5274576)
    File system         313848  (82672 + 231176)
    Lock system         29232616        (29219368 + 13248)
    Recovery system     0       (0 + 0)
    Threads             409336  (406936 + 2400)
Buffer pool size        1769471
Buffer pool size, bytes 28991012864
Free buffers            0
Database pages          1696503
Modified db pages       160602
Pages read 15240822, created 1770238, written 21705836
--------------
ROW OPERATIONS
--------------
0 queries inside InnoDB, 0 queries in queue
1 read views open inside InnoDB
Number of rows inserted 50678311, updated 66425915, deleted 20605903, read 454561562
----------------------------
END OF INNODB MONITOR OUTPUT
============================
";

impl MockSource {
    /// Server with InnoDB enabled, a status report and table statistics.
    pub fn typical_server() -> Self {
        let mut source = Self::with_status(TYPICAL_STATUS);
        source.add_rows(
            QUERY_TABLE_STATISTICS,
            vec![
                json_row(json!({
                    "table_schema": "shop",
                    "table_name": "orders",
                    "rows_read": 1500,
                    "rows_changed": 42,
                })),
                json_row(json!({
                    "table_schema": "shop",
                    "table_name": "customers",
                    "rows_read": 310,
                    "rows_changed": 7,
                })),
            ],
        );
        source
    }

    /// Server with several buffer pool instances.
    pub fn multi_pool_server() -> Self {
        Self::with_status(MULTI_POOL_STATUS)
    }

    /// Server running an older plugin release.
    pub fn legacy_server() -> Self {
        Self::with_status(LEGACY_STATUS)
    }

    /// Server where the engine is disabled or not compiled in.
    pub fn without_innodb() -> Self {
        let mut source = Self::new();
        source.add_rows(QUERY_HAS_INNODB, Vec::new());
        source
    }

    /// Engine enabled but the status query returns nothing.
    pub fn empty_status() -> Self {
        let mut source = Self::new();
        source.add_rows(QUERY_HAS_INNODB, vec![row(&[("engine", "InnoDB")])]);
        source.add_rows(QUERY_INNODB_STATUS, Vec::new());
        source
    }

    /// Every query fails to connect.
    pub fn unreachable() -> Self {
        let mut source = Self::new();
        source.set_connection_error("Can't connect to MySQL server on '127.0.0.1' (111)");
        source
    }

    fn with_status(status: &str) -> Self {
        let mut source = Self::new();
        source.add_rows(QUERY_HAS_INNODB, vec![row(&[("engine", "InnoDB")])]);
        source.add_rows(
            QUERY_INNODB_STATUS,
            vec![row(&[("Type", "InnoDB"), ("Name", ""), ("Status", status)])],
        );
        source
    }
}
