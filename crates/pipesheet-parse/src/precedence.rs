//! Rebuilds the parser's flat `primary (op primary)*` sequence into a nested
//! tree honoring operator precedence. Classic precedence climbing, after
//! <https://en.wikipedia.org/wiki/Operator-precedence_parser#Pseudocode>.

use smallvec::SmallVec;

use crate::ast::{BinOp, Expr};

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Add | BinOp::Sub => 1,
    }
}

type Primaries = smallvec::IntoIter<[Expr; 4]>;
type Ops = std::iter::Peekable<smallvec::IntoIter<[BinOp; 4]>>;

/// `primaries` holds the operands after `first`; `ops` the operators joining
/// them, in source order. The two are the same length.
pub(crate) fn fold_precedence(
    first: Expr,
    primaries: SmallVec<[Expr; 4]>,
    ops: SmallVec<[BinOp; 4]>,
) -> Expr {
    debug_assert_eq!(primaries.len(), ops.len());
    let mut primaries = primaries.into_iter();
    let mut ops = ops.into_iter().peekable();
    climb(first, &mut primaries, &mut ops, 1)
}

fn climb(mut lhs: Expr, primaries: &mut Primaries, ops: &mut Ops, min_prec: u8) -> Expr {
    while let Some(&op) = ops.peek() {
        if precedence(op) < min_prec {
            break;
        }
        ops.next();
        let Some(mut rhs) = primaries.next() else {
            break;
        };
        // Fold any tighter-binding run into the right-hand side first;
        // `prec + 1` keeps equal-precedence operators left-associative.
        while let Some(&next) = ops.peek() {
            if precedence(next) <= precedence(op) {
                break;
            }
            rhs = climb(rhs, primaries, ops, precedence(op) + 1);
        }
        lhs = Expr::Infix {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            op,
        };
    }
    lhs
}
