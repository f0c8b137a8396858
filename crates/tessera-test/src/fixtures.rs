//! Shared fixtures for integration tests.

use std::sync::Arc;

use tessera_common::config::EngineConfig;
use tessera_common::memory::HeapBackend;
use tessera_common::types::{CommitId, ItemPointer, Oid, TxnId};
use tessera_executor::{ExecutorContext, SeqScanExecutor};
use tessera_executor::Executor;
use tessera_storage::{Column, DataTable, Schema, Value, ValueType};

/// The transaction id used for fixture inserts.
pub const WRITER: TxnId = TxnId::new(1);

/// Builds an empty table with a single nullable int32 column `a`.
///
/// Tile groups are tiny (the testing config) so multi-group scans need
/// only a handful of rows.
#[must_use]
pub fn int_table(name: &str) -> Arc<DataTable> {
    let schema = Schema::new(vec![Column::nullable("a", ValueType::Integer)]);
    Arc::new(
        DataTable::new(
            Oid::new(1),
            Oid::new(2),
            name,
            schema,
            Arc::new(HeapBackend),
            EngineConfig::for_testing(),
        )
        .expect("table construction failed"),
    )
}

/// Commits an inserted tuple at the given commit point.
pub fn commit(table: &DataTable, location: ItemPointer, cid: CommitId) {
    let group = table
        .tile_group_by_id(location.block)
        .expect("insert location names a group");
    group.header().commit_insert(location.offset.as_u32(), cid);
}

/// Inserts a row and commits it at the given commit point.
pub fn insert_committed(table: &DataTable, values: &[Value], cid: CommitId) -> ItemPointer {
    let location = table.insert_tuple(WRITER, values).expect("insert failed");
    commit(table, location, cid);
    location
}

/// Builds an observer context over database 1.
#[must_use]
pub fn observer(txn_id: u64, last_commit_id: u64) -> ExecutorContext {
    ExecutorContext::new(
        TxnId::new(txn_id),
        CommitId::new(last_commit_id),
        Oid::new(1),
    )
}

/// Drains a scan, returning column 0 of every visible position in
/// emission order.
pub fn collect_column0(executor: &mut SeqScanExecutor) -> Vec<Value> {
    let mut values = Vec::new();
    while executor.execute().expect("scan failed") {
        let tile = executor.output().expect("output follows execute");
        for position in tile.visible_positions() {
            values.push(tile.value_at(0, position).expect("value resolves"));
        }
    }
    values
}
