//! Typing rules for literals and operators.
//!
//! Numeric promotion follows the JVM model: arithmetic on `Byte` and `Short`
//! is done in `Int`, and a binary operation takes the widest operand type in
//! the order `Double > Float > Long > Int`.

use mica_ir::{BaseTy, BinaryOp, Literal, Ty, TyClass};

pub(crate) fn literal_type(lit: Literal) -> Ty {
    match lit {
        Literal::Int(_) => Ty::INT,
        Literal::Long(_) => Ty::LONG,
        Literal::Float(_) => Ty::FLOAT,
        Literal::Double(_) => Ty::DOUBLE,
        Literal::Char(_) => Ty::CHAR,
        Literal::Bool(_) => Ty::BOOLEAN,
        Literal::String(_) => Ty::STRING,
        Literal::Null => Ty::NULL,
    }
}

fn is_numeric(ty: Ty) -> bool {
    matches!(ty.class(), TyClass::Integral | TyClass::Floating)
}

fn rank(ty: Ty) -> u8 {
    match ty.base {
        BaseTy::Double => 4,
        BaseTy::Float => 3,
        BaseTy::Long => 2,
        _ => 1,
    }
}

/// Result type of unary `+`/`-` on a numeric operand.
pub(crate) fn promote_unary(ty: Ty) -> Option<Ty> {
    if !is_numeric(ty) {
        return None;
    }
    Some(match ty.base {
        BaseTy::Byte | BaseTy::Short => Ty::INT,
        _ => ty,
    })
}

/// Result type of arithmetic on two numeric operands.
pub(crate) fn promote(left: Ty, right: Ty) -> Option<Ty> {
    if !is_numeric(left) || !is_numeric(right) {
        return None;
    }
    let widest = if rank(right) > rank(left) { right } else { left };
    promote_unary(widest)
}

/// Static type of `left op right` for non-assignment operators.
pub(crate) fn binary_type(op: BinaryOp, left: Option<Ty>, right: Option<Ty>) -> Option<Ty> {
    match op {
        BinaryOp::Add if left == Some(Ty::STRING) => Some(Ty::STRING),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            promote(left?, right?)
        }
        // Shift distance does not widen the result.
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr => {
            let (left, right) = (left?, right?);
            if left.is_integral() && right.is_integral() {
                promote_unary(left)
            } else {
                None
            }
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            let (left, right) = (left?, right?);
            if left.is_boolean() && right.is_boolean() {
                Some(Ty::BOOLEAN)
            } else if left.is_integral() && right.is_integral() {
                promote(left, right)
            } else {
                None
            }
        }
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Identity
        | BinaryOp::NotIdentity
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::AndAnd
        | BinaryOp::OrOr
        | BinaryOp::In
        | BinaryOp::NotIn => Some(Ty::BOOLEAN),
        BinaryOp::Elvis => elvis_type(left?, right?),
        BinaryOp::Range => None,
        BinaryOp::Assign
        | BinaryOp::AddAssign
        | BinaryOp::SubAssign
        | BinaryOp::MulAssign
        | BinaryOp::DivAssign
        | BinaryOp::RemAssign => Some(Ty::UNIT),
    }
}

/// `left ?: right`: the non-null left type when the right side agrees with
/// it or never completes.
fn elvis_type(left: Ty, right: Ty) -> Option<Ty> {
    let left = left.non_null();
    if right == left || right == Ty::NOTHING {
        Some(left)
    } else if left == Ty::NOTHING {
        Some(right)
    } else {
        None
    }
}

/// Common type of two branches, when one exists without subtyping.
pub(crate) fn join(a: Option<Ty>, b: Option<Ty>) -> Option<Ty> {
    match (a?, b?) {
        (a, b) if a == b => Some(a),
        (Ty::NOTHING, other) | (other, Ty::NOTHING) => Some(other),
        (Ty::NULL, other) | (other, Ty::NULL) => Some(other.nullable()),
        _ => None,
    }
}
