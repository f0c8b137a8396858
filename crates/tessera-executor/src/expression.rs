//! Predicate expressions with tri-valued evaluation.
//!
//! Predicates evaluate against tuple-shaped façades through the
//! [`RowView`] trait, so the same tree runs over a physical tile group
//! during a base-table scan and over a logical tile during a
//! filter-over-child scan. Evaluation returns a [`TriBool`]; null
//! propagates per SQL's Kleene semantics, and only strictly-true
//! retains a tuple.

use std::cmp::Ordering;

use tessera_storage::{TileGroup, TriBool, Value};

use crate::context::ExecutorContext;
use crate::error::{ExecutorError, ExecutorResult};
use crate::logical_tile::LogicalTile;

/// Read access to one tuple's columns, however the tuple is stored.
pub trait RowView {
    /// Reads the value of the given column.
    fn value_at(&self, column: usize) -> ExecutorResult<Value>;
}

/// Tuple façade over one slot of a tile group.
///
/// Columns are schema-global and route through the group's column map.
#[derive(Debug, Clone, Copy)]
pub struct TileGroupTuple<'a> {
    tile_group: &'a TileGroup,
    slot: u32,
}

impl<'a> TileGroupTuple<'a> {
    /// Creates a façade over the given slot.
    #[must_use]
    pub fn new(tile_group: &'a TileGroup, slot: u32) -> Self {
        Self { tile_group, slot }
    }
}

impl RowView for TileGroupTuple<'_> {
    fn value_at(&self, column: usize) -> ExecutorResult<Value> {
        Ok(self.tile_group.value_at(self.slot, column)?)
    }
}

/// Tuple façade over one position of a logical tile.
#[derive(Debug, Clone, Copy)]
pub struct LogicalTileTuple<'a> {
    tile: &'a LogicalTile,
    position: usize,
}

impl<'a> LogicalTileTuple<'a> {
    /// Creates a façade over the given position.
    #[must_use]
    pub fn new(tile: &'a LogicalTile, position: usize) -> Self {
        Self { tile, position }
    }
}

impl RowView for LogicalTileTuple<'_> {
    fn value_at(&self, column: usize) -> ExecutorResult<Value> {
        self.tile.value_at(column, self.position)
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    fn apply(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

/// A comparison operand: a column of the left tuple or a constant.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A column of the evaluated tuple.
    Column(usize),
    /// A constant value.
    Constant(Value),
}

impl Operand {
    fn resolve(&self, row: &dyn RowView) -> ExecutorResult<Value> {
        match self {
            Self::Column(index) => row.value_at(*index),
            Self::Constant(value) => Ok(value.clone()),
        }
    }
}

/// A predicate tree.
///
/// # Example
///
/// ```rust
/// use tessera_executor::{CompareOp, Operand, Predicate};
/// use tessera_storage::Value;
///
/// // a > 20
/// let predicate = Predicate::compare(
///     CompareOp::Gt,
///     Operand::Column(0),
///     Operand::Constant(Value::Integer(20)),
/// );
/// assert!(format!("{:?}", predicate).contains("Gt"));
/// ```
#[derive(Debug, Clone)]
pub enum Predicate {
    /// A comparison between two operands.
    Compare {
        /// The comparison operator.
        op: CompareOp,
        /// Left operand.
        left: Operand,
        /// Right operand.
        right: Operand,
    },
    /// Kleene conjunction.
    And(Box<Predicate>, Box<Predicate>),
    /// Kleene disjunction.
    Or(Box<Predicate>, Box<Predicate>),
    /// Kleene negation.
    Not(Box<Predicate>),
    /// Null test; never returns unknown.
    IsNull(Operand),
}

impl Predicate {
    /// Builds a comparison predicate.
    #[must_use]
    pub fn compare(op: CompareOp, left: Operand, right: Operand) -> Self {
        Self::Compare { op, left, right }
    }

    /// Builds a conjunction.
    #[must_use]
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    /// Builds a disjunction.
    #[must_use]
    pub fn or(left: Predicate, right: Predicate) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    /// Builds a negation.
    #[must_use]
    pub fn not(inner: Predicate) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Evaluates the predicate over a tuple.
    ///
    /// `right_row` carries the second tuple for join-shaped predicates;
    /// column operands read the left tuple.
    pub fn evaluate(
        &self,
        row: &dyn RowView,
        right_row: Option<&dyn RowView>,
        context: &ExecutorContext,
    ) -> ExecutorResult<TriBool> {
        match self {
            Self::Compare { op, left, right } => {
                let lhs = left.resolve(row)?;
                let rhs = right.resolve(row)?;
                match lhs.try_cmp(&rhs).map_err(|e| {
                    ExecutorError::expression(format!("comparison failed: {}", e))
                })? {
                    Some(ordering) => Ok(op.apply(ordering).into()),
                    None => Ok(TriBool::Unknown),
                }
            }
            Self::And(left, right) => {
                let lhs = left.evaluate(row, right_row, context)?;
                // Short circuit: false absorbs regardless of the right side.
                if lhs.is_false() {
                    return Ok(TriBool::False);
                }
                Ok(lhs.and(right.evaluate(row, right_row, context)?))
            }
            Self::Or(left, right) => {
                let lhs = left.evaluate(row, right_row, context)?;
                if lhs.is_true() {
                    return Ok(TriBool::True);
                }
                Ok(lhs.or(right.evaluate(row, right_row, context)?))
            }
            Self::Not(inner) => Ok(inner.evaluate(row, right_row, context)?.not()),
            Self::IsNull(operand) => Ok(operand.resolve(row)?.is_null().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_common::types::{CommitId, Oid, TxnId};

    struct FixedRow(Vec<Value>);

    impl RowView for FixedRow {
        fn value_at(&self, column: usize) -> ExecutorResult<Value> {
            self.0
                .get(column)
                .cloned()
                .ok_or_else(|| ExecutorError::expression("column out of range"))
        }
    }

    fn ctx() -> ExecutorContext {
        ExecutorContext::new(TxnId::new(1), CommitId::new(1), Oid::new(1))
    }

    fn gt(column: usize, value: i32) -> Predicate {
        Predicate::compare(
            CompareOp::Gt,
            Operand::Column(column),
            Operand::Constant(Value::Integer(value)),
        )
    }

    #[test]
    fn test_comparison() {
        let row = FixedRow(vec![Value::Integer(30)]);

        assert_eq!(gt(0, 20).evaluate(&row, None, &ctx()).unwrap(), TriBool::True);
        assert_eq!(gt(0, 30).evaluate(&row, None, &ctx()).unwrap(), TriBool::False);
    }

    #[test]
    fn test_null_comparison_is_unknown() {
        let row = FixedRow(vec![Value::Null]);

        // Comparing null is unknown, not false.
        assert_eq!(
            gt(0, 5).evaluate(&row, None, &ctx()).unwrap(),
            TriBool::Unknown
        );
    }

    #[test]
    fn test_kleene_composition() {
        let row = FixedRow(vec![Value::Null, Value::Integer(10)]);

        // unknown AND true = unknown
        let p = Predicate::and(gt(0, 5), gt(1, 5));
        assert_eq!(p.evaluate(&row, None, &ctx()).unwrap(), TriBool::Unknown);

        // unknown AND false = false
        let p = Predicate::and(gt(0, 5), gt(1, 50));
        assert_eq!(p.evaluate(&row, None, &ctx()).unwrap(), TriBool::False);

        // unknown OR true = true
        let p = Predicate::or(gt(0, 5), gt(1, 5));
        assert_eq!(p.evaluate(&row, None, &ctx()).unwrap(), TriBool::True);

        // NOT unknown = unknown
        let p = Predicate::not(gt(0, 5));
        assert_eq!(p.evaluate(&row, None, &ctx()).unwrap(), TriBool::Unknown);
    }

    #[test]
    fn test_is_null() {
        let row = FixedRow(vec![Value::Null, Value::Integer(1)]);

        let p = Predicate::IsNull(Operand::Column(0));
        assert_eq!(p.evaluate(&row, None, &ctx()).unwrap(), TriBool::True);

        let p = Predicate::IsNull(Operand::Column(1));
        assert_eq!(p.evaluate(&row, None, &ctx()).unwrap(), TriBool::False);
    }

    #[test]
    fn test_type_mismatch_propagates() {
        let row = FixedRow(vec![Value::Varchar("x".into())]);

        let err = gt(0, 5).evaluate(&row, None, &ctx());
        assert!(matches!(err, Err(ExecutorError::Expression { .. })));
    }

    #[test]
    fn test_short_circuit_skips_error() {
        // false AND <error> = false without evaluating the right side.
        let row = FixedRow(vec![Value::Integer(1), Value::Varchar("x".into())]);
        let p = Predicate::and(gt(0, 5), gt(1, 5));
        assert_eq!(p.evaluate(&row, None, &ctx()).unwrap(), TriBool::False);
    }
}
