//! Sequential scan.
//!
//! The scan has two disjoint modes, dispatched by child count:
//!
//! - **Filter mode** (one child): pulls logical tiles from the child
//!   and clears visibility for positions whose predicate result is not
//!   strictly true.
//! - **Base-table mode** (no child): processes one tile group per
//!   `execute` call, building a position list of slots that pass MVCC
//!   visibility and the predicate, then binding the group's tiles into
//!   a logical tile.
//!
//! Within a tile group, scan order is ascending slot id; across groups,
//! ascending group offset. The caller re-enters `execute` until it
//! returns `Ok(false)`.

use std::sync::Arc;

use tessera_storage::DataTable;
use tracing::trace;

use crate::context::ExecutorContext;
use crate::error::{ExecutorError, ExecutorResult};
use crate::executor::Executor;
use crate::expression::{LogicalTileTuple, Predicate, TileGroupTuple};
use crate::logical_tile::LogicalTile;

/// Plan node for a sequential scan.
///
/// Carries the target table (absent when the scan filters a child's
/// stream), the output columns, and an optional predicate. Empty
/// `column_ids` means "all columns".
#[derive(Debug, Clone)]
pub struct SeqScanPlan {
    /// The table to scan; `None` for filter mode.
    pub table: Option<Arc<DataTable>>,
    /// Schema-global output columns; empty selects all.
    pub column_ids: Vec<usize>,
    /// Optional scan predicate.
    pub predicate: Option<Predicate>,
}

impl SeqScanPlan {
    /// Builds a plan scanning every column of a table.
    #[must_use]
    pub fn table_scan(table: Arc<DataTable>, predicate: Option<Predicate>) -> Self {
        Self {
            table: Some(table),
            column_ids: Vec::new(),
            predicate,
        }
    }

    /// Builds a plan filtering a child operator's stream.
    #[must_use]
    pub fn filter(predicate: Option<Predicate>) -> Self {
        Self {
            table: None,
            column_ids: Vec::new(),
            predicate,
        }
    }
}

/// The sequential scan operator.
pub struct SeqScanExecutor {
    plan: SeqScanPlan,
    context: ExecutorContext,
    children: Vec<Box<dyn Executor>>,

    column_ids: Vec<usize>,
    predicate: Option<Predicate>,

    table: Option<Arc<DataTable>>,
    table_tile_group_count: Option<usize>,
    current_tile_group_offset: usize,

    initialized: bool,
    output: Option<LogicalTile>,
}

impl SeqScanExecutor {
    /// Creates a scan executor for the given plan.
    #[must_use]
    pub fn new(plan: SeqScanPlan, context: ExecutorContext) -> Self {
        Self {
            plan,
            context,
            children: Vec::new(),
            column_ids: Vec::new(),
            predicate: None,
            table: None,
            table_tile_group_count: None,
            current_tile_group_offset: 0,
            initialized: false,
            output: None,
        }
    }

    /// Attaches a child operator (switches the scan into filter mode).
    pub fn add_child(&mut self, child: Box<dyn Executor>) {
        self.children.push(child);
    }

    /// Filter mode: pull one logical tile from the child and drop
    /// positions whose predicate result is not strictly true.
    fn execute_filter(&mut self) -> ExecutorResult<bool> {
        debug_assert!(self.plan.table.is_none(), "filter mode has no target table");

        if !self.children[0].execute()? {
            return Ok(false);
        }

        // An empty child output passes through as an empty tile; only
        // child exhaustion ends the stream.
        let mut tile = self.children[0].output().unwrap_or_default();

        if let Some(predicate) = &self.predicate {
            let positions: Vec<usize> = tile.visible_positions().collect();
            let mut dropped = Vec::new();

            for position in positions {
                let row = LogicalTileTuple::new(&tile, position);
                if !predicate.evaluate(&row, None, &self.context)?.is_true() {
                    dropped.push(position);
                }
            }

            for position in dropped {
                tile.remove_visibility(position);
            }
        }

        self.output = Some(tile);
        Ok(true)
    }

    /// Base-table mode: process exactly one tile group.
    fn execute_table_scan(&mut self) -> ExecutorResult<bool> {
        // First call: bind the table, snapshot the group count, fill
        // the column selection.
        if self.table_tile_group_count.is_none() {
            let table = self.plan.table.clone().ok_or(ExecutorError::TableNotBound)?;
            self.table_tile_group_count = Some(table.tile_group_count());
            if self.column_ids.is_empty() {
                self.column_ids = (0..table.schema().column_count()).collect();
            }
            self.table = Some(table);
        }

        let group_count = self.table_tile_group_count.expect("bound above");
        if self.current_tile_group_offset == group_count {
            return Ok(false);
        }

        let table = self.table.as_ref().expect("bound above");
        let tile_group = table
            .tile_group(self.current_tile_group_offset)
            .expect("tile groups are append-only");
        self.current_tile_group_offset += 1;

        let header = tile_group.header();
        let txn_id = self.context.txn_id();
        let last_commit_id = self.context.last_commit_id();
        let active_tuple_count = tile_group.next_tuple_slot();

        // Retain slots that are visible and pass the predicate, in
        // ascending slot order.
        let mut position_list = Vec::new();
        for slot in 0..active_tuple_count {
            if !header.is_visible(slot, txn_id, last_commit_id) {
                continue;
            }

            let keep = match &self.predicate {
                None => true,
                Some(predicate) => {
                    let row = TileGroupTuple::new(&tile_group, slot);
                    predicate.evaluate(&row, None, &self.context)?.is_true()
                }
            };

            if keep {
                position_list.push(slot);
            }
        }

        trace!(
            tile_group = %tile_group.tile_group_id(),
            scanned = active_tuple_count,
            retained = position_list.len(),
            "scanned tile group"
        );

        // One position list; every binding shares it. The tile group
        // keeps its own references to the tiles.
        let mut logical_tile = LogicalTile::new();
        let position_list_index = logical_tile.add_position_list(position_list);

        for &origin_column_id in &self.column_ids {
            let (tile_index, tile_column_id) =
                tile_group.locate(origin_column_id).ok_or_else(|| {
                    ExecutorError::Storage(tessera_storage::StorageError::column_out_of_range(
                        origin_column_id,
                        table.schema().column_count(),
                    ))
                })?;

            let tile = Arc::clone(
                tile_group
                    .tile(tile_index)
                    .expect("locate returns a valid tile index"),
            );
            logical_tile.add_column(tile, tile_column_id, position_list_index);
        }

        self.output = Some(logical_tile);
        Ok(true)
    }
}

impl Executor for SeqScanExecutor {
    fn init(&mut self) -> ExecutorResult<()> {
        // A scan needs a source: a child stream or a bound table.
        if self.children.is_empty() && self.plan.table.is_none() {
            return Err(ExecutorError::TableNotBound);
        }

        for child in &mut self.children {
            child.init()?;
        }

        self.column_ids = self.plan.column_ids.clone();
        self.predicate = self.plan.predicate.clone();
        self.table = None;
        self.table_tile_group_count = None;
        self.current_tile_group_offset = 0;
        self.output = None;
        self.initialized = true;

        Ok(())
    }

    fn execute(&mut self) -> ExecutorResult<bool> {
        if !self.initialized {
            return Err(ExecutorError::NotInitialized);
        }

        debug_assert!(self.children.len() <= 1, "a scan has at most one child");

        if self.children.len() == 1 {
            self.execute_filter()
        } else {
            self.execute_table_scan()
        }
    }

    fn output(&mut self) -> Option<LogicalTile> {
        let output = self.output.take();
        debug_assert!(output.is_some(), "scan output consumed twice");
        output
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Executor>] {
        &mut self.children
    }
}
