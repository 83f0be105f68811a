//! Demand-driven, memoizing evaluation over a parsed grid.
//!
//! Cells are visited row-major, but a reference to a cell that has not been
//! computed yet evaluates it on the spot, so forward references work in a
//! single pass and every cell is computed at most once. A cell that is
//! re-entered while its own evaluation is still on the stack is a cycle and
//! aborts the pass with [`CalcErrorKind::CyclicReference`].
//!
//! `^^` carries copy state: the copying cell adopts the formula stored by
//! the cell above (which may itself have been adopted), bumps its copy
//! generation, and re-evaluates that formula at its own position. Copying a
//! plain value just repeats the value.

use std::sync::Arc;

use smallvec::SmallVec;

use pipesheet_common::{CalcError, CalcErrorKind, Value};
use pipesheet_parse::{Cell, CellGrid, Expr};

use crate::function::FunctionContext;
use crate::labels::{LabelSnapshot, index_labels};
use crate::registry::{FunctionRegistry, default_registry};

/// One evaluated value per input cell, in the same ragged shape as the
/// parsed grid.
pub type ValueGrid = Vec<Vec<Value>>;

/// Evaluates parsed grids against a function registry.
///
/// The engine itself is stateless across documents; all per-document
/// bookkeeping lives in the pass. `Engine::default()` uses the shared
/// builtin registry.
pub struct Engine {
    registry: Arc<FunctionRegistry>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            registry: default_registry(),
        }
    }
}

impl Engine {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    /// Computes every cell of `grid`. The first fatal error aborts the
    /// whole pass, tagged with the coordinates of the cell it arose in.
    pub fn evaluate(&self, grid: &CellGrid) -> Result<ValueGrid, CalcError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("evaluate_grid", rows = grid.len()).entered();

        let mut state = EvalState::new(grid, self.registry.as_ref());
        state.run()?;
        Ok(state.into_values())
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum CellState {
    #[default]
    Pending,
    /// On the evaluation stack right now; hitting it again is a cycle.
    InProgress,
    Done,
}

/// Memoization slot for one cell.
#[derive(Default)]
struct Slot<'g> {
    state: CellState,
    /// Number of consecutive `^^` hops this cell's formula travelled.
    copy_count: i64,
    /// The formula this cell evaluated, for `^^` in the row below. A cell
    /// whose formula was itself `^^` stores the *adopted* formula here.
    formula: Option<&'g Expr>,
    value: Value,
}

struct EvalState<'g> {
    grid: &'g CellGrid,
    slots: Vec<Vec<Slot<'g>>>,
    labels: Vec<LabelSnapshot>,
    registry: &'g FunctionRegistry,
}

impl<'g> EvalState<'g> {
    fn new(grid: &'g CellGrid, registry: &'g FunctionRegistry) -> Self {
        let slots = grid
            .iter()
            .map(|row| (0..row.len()).map(|_| Slot::default()).collect())
            .collect();
        Self {
            grid,
            slots,
            labels: index_labels(grid),
            registry,
        }
    }

    fn run(&mut self) -> Result<(), CalcError> {
        for row in 0..self.grid.len() {
            for col in 0..self.grid[row].len() {
                self.ensure_done(row, col)?;
            }
        }
        Ok(())
    }

    fn into_values(self) -> ValueGrid {
        self.slots
            .into_iter()
            .map(|row| row.into_iter().map(|slot| slot.value).collect())
            .collect()
    }

    fn ensure_done(&mut self, row: usize, col: usize) -> Result<(), CalcError> {
        match self.slots[row][col].state {
            CellState::Done => Ok(()),
            CellState::InProgress => Err(CalcError::new(CalcErrorKind::CyclicReference)
                .with_message(format!("cell ({row}, {col}) depends on itself"))
                .with_location(row, col)),
            CellState::Pending => self.calc_cell(row, col),
        }
    }

    fn calc_cell(&mut self, row: usize, col: usize) -> Result<(), CalcError> {
        self.slots[row][col].state = CellState::InProgress;
        let grid = self.grid;
        let value = match &grid[row][col] {
            Cell::Int(i) => Value::Int(*i),
            Cell::Float(f) => Value::Float(*f),
            Cell::String(s) => Value::Text(s.clone()),
            Cell::Label(name) => Value::Text(format!("!{name}")),
            Cell::Empty => Value::default(),
            Cell::Formula(expr) => {
                // Stored before evaluation so `^^` below can adopt it.
                self.slots[row][col].formula = Some(expr);
                self.eval_expr(expr, row, col)
                    .map_err(|e| e.with_location(row, col))?
            }
        };
        let slot = &mut self.slots[row][col];
        slot.value = value;
        slot.state = CellState::Done;
        Ok(())
    }

    fn eval_expr(&mut self, expr: &'g Expr, row: usize, col: usize) -> Result<Value, CalcError> {
        match expr {
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Text(s.clone())),
            Expr::Infix { lhs, rhs, op } => {
                let l = self.eval_expr(lhs, row, col)?;
                let r = self.eval_expr(rhs, row, col)?;
                crate::operators::apply(*op, l, r)
            }
            Expr::FunCall { name, args } => self.eval_fun_call(name, args, row, col),
            Expr::CellRef { col: letter, row: ref_row } => {
                let target_row = ref_row.checked_sub(1).ok_or_else(|| {
                    CalcError::new(CalcErrorKind::OutOfBounds)
                        .with_message("cell reference row 0 is out of range (rows are 1-based)")
                })?;
                self.target_value(target_row, col_index(*letter))
            }
            Expr::CopyAbove => self.eval_copy_above(row, col),
            Expr::CopyColumnAbove { col: letter } => {
                if row == 0 {
                    return Err(CalcError::new(CalcErrorKind::OutOfBounds)
                        .with_message(format!("'{letter}^' has no row above row 0")));
                }
                self.target_value(row - 1, col_index(*letter))
            }
            Expr::CopyLastInColumn { col: letter } => self.eval_copy_last(*letter, row),
            Expr::LabelRef { label, offset } => self.eval_label_ref(label, *offset, row),
        }
    }

    /// `^^`: adopt the formula of the cell directly above and re-evaluate
    /// it here, one copy generation further down. A plain value above is
    /// copied as-is.
    fn eval_copy_above(&mut self, row: usize, col: usize) -> Result<Value, CalcError> {
        if row == 0 {
            return Err(CalcError::new(CalcErrorKind::CopyAtRowZero)
                .with_message("'^^' has no cell above in the first row"));
        }
        self.check_bounds(row - 1, col)?;
        self.ensure_done(row - 1, col)?;

        let above = &self.slots[row - 1][col];
        let inherited = above.formula;
        let copy_count = above.copy_count + 1;
        let above_value = above.value.clone();

        let slot = &mut self.slots[row][col];
        slot.copy_count = copy_count;
        slot.formula = inherited;
        match inherited {
            Some(formula) => self.eval_expr(formula, row, col),
            None => Ok(above_value),
        }
    }

    /// `X^v`: value of column X in the nearest row above that is wide
    /// enough to have that column.
    fn eval_copy_last(&mut self, letter: char, row: usize) -> Result<Value, CalcError> {
        let target_col = col_index(letter);
        for target_row in (0..row).rev() {
            if self.grid[target_row].len() > target_col {
                return self.target_value(target_row, target_col);
            }
        }
        Err(CalcError::new(CalcErrorKind::ColumnNotFound)
            .with_message(format!("no row above row {row} has a column {letter}")))
    }

    fn eval_label_ref(&mut self, label: &str, offset: i64, row: usize) -> Result<Value, CalcError> {
        let Some(def) = self.labels[row].get(label).copied() else {
            return Err(CalcError::new(CalcErrorKind::UnresolvedLabel)
                .with_message(format!("label '{label}' is not visible from row {row}")));
        };
        // negative target or i64 overflow
        let target_row = match (def.row as i64).checked_add(offset) {
            Some(target) if target >= 0 => target as usize,
            _ => {
                return Err(CalcError::new(CalcErrorKind::OutOfBounds).with_message(format!(
                    "label '{label}' offset {offset} points outside the grid"
                )));
            }
        };
        self.target_value(target_row, def.col)
    }

    fn eval_fun_call(
        &mut self,
        name: &str,
        args: &'g [Expr],
        row: usize,
        col: usize,
    ) -> Result<Value, CalcError> {
        let mut flat: SmallVec<[Value; 4]> = SmallVec::new();
        for arg in args {
            match self.eval_expr(arg, row, col)? {
                Value::Spread(items) => flat.extend(items),
                v => flat.push(v),
            }
        }
        // The context is taken after the arguments ran: an argument that
        // copies a formula into this cell has already updated copy_count.
        let ctx = FunctionContext {
            row,
            col,
            copy_count: self.slots[row][col].copy_count,
        };
        self.registry.dispatch(name, &flat, &ctx)
    }

    /// Bounds-checked, memoized read of another cell.
    fn target_value(&mut self, row: usize, col: usize) -> Result<Value, CalcError> {
        self.check_bounds(row, col)?;
        self.ensure_done(row, col)?;
        Ok(self.slots[row][col].value.clone())
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), CalcError> {
        if row >= self.grid.len() {
            return Err(CalcError::new(CalcErrorKind::OutOfBounds)
                .with_message(format!("row {row} is outside the grid")));
        }
        if col >= self.grid[row].len() {
            return Err(CalcError::new(CalcErrorKind::OutOfBounds)
                .with_message(format!("column {col} is outside row {row}")));
        }
        Ok(())
    }
}

/// The parser only emits `A..=Z`, but the AST is public; anything else maps
/// past every real row width and fails the ordinary bounds checks.
fn col_index(letter: char) -> usize {
    match letter {
        'A'..='Z' => letter as usize - 'A' as usize,
        _ => usize::MAX,
    }
}
