//! Static types and the oracle that assigns them.
//!
//! The flow builder never infers types itself. It asks a [`TypeOracle`] for
//! the static type of an expression and uses [`Ty::class`] and
//! [`Ty::primitive`] to decide on balancing and implicit conversions.

use std::fmt;

use crate::{DeclId, ExprId, Name};

/// The type constructor part of a [`Ty`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BaseTy {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
    String,
    Unit,
    Any,
    /// Type of `return` and of the `null` literal (as `Nothing?`).
    Nothing,
    /// Any class the oracle knows only by name.
    Named(Name),
}

impl BaseTy {
    /// Map a built-in type name to its base type.
    pub fn from_builtin(name: &str) -> Option<BaseTy> {
        Some(match name {
            "Byte" => BaseTy::Byte,
            "Short" => BaseTy::Short,
            "Int" => BaseTy::Int,
            "Long" => BaseTy::Long,
            "Float" => BaseTy::Float,
            "Double" => BaseTy::Double,
            "Char" => BaseTy::Char,
            "Boolean" => BaseTy::Boolean,
            "String" => BaseTy::String,
            "Unit" => BaseTy::Unit,
            "Any" => BaseTy::Any,
            "Nothing" => BaseTy::Nothing,
            _ => return None,
        })
    }
}

/// Coarse classification used by the builder.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TyClass {
    /// Non-nullable `Byte`, `Short`, `Int` or `Long`.
    Integral,
    /// Non-nullable `Float` or `Double`.
    Floating,
    /// Non-nullable `Boolean`.
    Boolean,
    Other,
}

/// Unboxed machine representation of a non-nullable primitive type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Boolean,
}

impl PrimitiveType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A static type: base type plus nullability.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ty {
    pub base: BaseTy,
    pub nullable: bool,
}

impl Ty {
    pub const BYTE: Ty = Ty::of(BaseTy::Byte);
    pub const SHORT: Ty = Ty::of(BaseTy::Short);
    pub const INT: Ty = Ty::of(BaseTy::Int);
    pub const LONG: Ty = Ty::of(BaseTy::Long);
    pub const FLOAT: Ty = Ty::of(BaseTy::Float);
    pub const DOUBLE: Ty = Ty::of(BaseTy::Double);
    pub const CHAR: Ty = Ty::of(BaseTy::Char);
    pub const BOOLEAN: Ty = Ty::of(BaseTy::Boolean);
    pub const STRING: Ty = Ty::of(BaseTy::String);
    pub const UNIT: Ty = Ty::of(BaseTy::Unit);
    pub const ANY: Ty = Ty::of(BaseTy::Any);
    pub const NOTHING: Ty = Ty::of(BaseTy::Nothing);
    /// Type of the `null` literal.
    pub const NULL: Ty = Ty {
        base: BaseTy::Nothing,
        nullable: true,
    };

    /// Non-nullable type with the given base.
    pub const fn of(base: BaseTy) -> Ty {
        Ty {
            base,
            nullable: false,
        }
    }

    /// Nullable variant of this type.
    #[must_use]
    pub const fn nullable(self) -> Ty {
        Ty {
            base: self.base,
            nullable: true,
        }
    }

    /// Non-nullable variant of this type.
    #[must_use]
    pub const fn non_null(self) -> Ty {
        Ty {
            base: self.base,
            nullable: false,
        }
    }

    pub fn class(self) -> TyClass {
        if self.nullable {
            return TyClass::Other;
        }
        match self.base {
            BaseTy::Byte | BaseTy::Short | BaseTy::Int | BaseTy::Long => TyClass::Integral,
            BaseTy::Float | BaseTy::Double => TyClass::Floating,
            BaseTy::Boolean => TyClass::Boolean,
            _ => TyClass::Other,
        }
    }

    #[inline]
    pub fn is_integral(self) -> bool {
        self.class() == TyClass::Integral
    }

    #[inline]
    pub fn is_boolean(self) -> bool {
        self.class() == TyClass::Boolean
    }

    #[inline]
    pub fn is_double(self) -> bool {
        self == Ty::DOUBLE
    }

    #[inline]
    pub fn is_float(self) -> bool {
        self == Ty::FLOAT
    }

    #[inline]
    pub fn is_long(self) -> bool {
        self == Ty::LONG
    }

    /// Unboxed representation, if this is a non-nullable primitive.
    ///
    /// Nullable primitives are boxed and have no primitive representation.
    pub fn primitive(self) -> Option<PrimitiveType> {
        if self.nullable {
            return None;
        }
        Some(match self.base {
            BaseTy::Byte => PrimitiveType::Byte,
            BaseTy::Short => PrimitiveType::Short,
            BaseTy::Int => PrimitiveType::Int,
            BaseTy::Long => PrimitiveType::Long,
            BaseTy::Float => PrimitiveType::Float,
            BaseTy::Double => PrimitiveType::Double,
            BaseTy::Char => PrimitiveType::Char,
            BaseTy::Boolean => PrimitiveType::Boolean,
            _ => return None,
        })
    }
}

/// Named types print as `<id>` with the raw interned id; use
/// [`ty_to_string`](crate::pretty::ty_to_string) to show the name.
impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.base {
            BaseTy::Byte => "Byte",
            BaseTy::Short => "Short",
            BaseTy::Int => "Int",
            BaseTy::Long => "Long",
            BaseTy::Float => "Float",
            BaseTy::Double => "Double",
            BaseTy::Char => "Char",
            BaseTy::Boolean => "Boolean",
            BaseTy::String => "String",
            BaseTy::Unit => "Unit",
            BaseTy::Any => "Any",
            BaseTy::Nothing => "Nothing",
            BaseTy::Named(name) => {
                write!(f, "<{}>", name.raw())?;
                ""
            }
        };
        f.write_str(base)?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Type-resolution oracle consulted by the flow builder.
///
/// Implementations answer three questions about an already-built
/// [`ExprArena`](crate::ExprArena): the static type of an expression, the
/// declared (or inferred) type of a local declaration, and which local
/// declaration a simple name refers to.
pub trait TypeOracle {
    /// Static type of `expr`, or `None` if unknown.
    fn expr_type(&self, expr: ExprId) -> Option<Ty>;

    /// Declared or inferred type of a local declaration.
    fn decl_type(&self, decl: DeclId) -> Option<Ty>;

    /// The local declaration a simple name expression refers to, if any.
    ///
    /// Returns `None` for names that resolve to anything other than a local
    /// variable or parameter, and for expressions that are not simple names.
    fn resolve_local(&self, expr: ExprId) -> Option<DeclId>;
}
