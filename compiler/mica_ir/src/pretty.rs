//! Indented tree dump of an expression, for debugging and the CLI `parse`
//! command.

use crate::stack::grow_if_needed;
use crate::{BaseTy, DeclKind, ExprArena, ExprId, ExprKind, Literal, StringInterner, Ty};

/// Render the subtree rooted at `root`, one node per line.
pub fn dump_tree(arena: &ExprArena, interner: &StringInterner, root: ExprId) -> String {
    let mut printer = TreePrinter {
        arena,
        interner,
        out: String::new(),
    };
    printer.node(Some(root), 0);
    printer.out
}

/// Render a type with named types spelled out through `interner`.
pub fn ty_to_string(ty: Ty, interner: &StringInterner) -> String {
    match ty.base {
        BaseTy::Named(name) => {
            let suffix = if ty.nullable { "?" } else { "" };
            format!("{}{suffix}", interner.lookup(name))
        }
        _ => ty.to_string(),
    }
}

/// Render a literal the way it would be written in source.
pub fn literal_to_string(lit: Literal, interner: &StringInterner) -> String {
    match lit {
        Literal::Int(v) => v.to_string(),
        Literal::Long(v) => format!("{v}L"),
        Literal::Float(bits) => format!("{:?}f", f32::from_bits(bits)),
        Literal::Double(bits) => format!("{:?}", f64::from_bits(bits)),
        Literal::Char(c) => format!("{c:?}"),
        Literal::Bool(b) => b.to_string(),
        Literal::String(name) => format!("{:?}", interner.lookup(name)),
        Literal::Null => "null".to_owned(),
    }
}

struct TreePrinter<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    out: String,
}

impl TreePrinter<'_> {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn node(&mut self, id: Option<ExprId>, depth: usize) {
        grow_if_needed(|| self.node_inner(id, depth));
    }

    fn node_inner(&mut self, id: Option<ExprId>, depth: usize) {
        let Some(id) = id else {
            self.line(depth, "<absent>");
            return;
        };
        let arena = self.arena;
        let interner = self.interner;
        let name = |n| interner.lookup(n);
        let child = depth + 1;
        match arena.kind(id).clone() {
            ExprKind::Literal(lit) => {
                let text = format!("Literal {}", literal_to_string(lit, interner));
                self.line(depth, &text);
            }
            ExprKind::Ident(n) => self.line(depth, &format!("Ident {}", name(n))),
            ExprKind::This => self.line(depth, "This"),
            ExprKind::Block(range) => {
                self.line(depth, "Block");
                for &stmt in arena.get_expr_list(range) {
                    self.node(Some(stmt), child);
                }
            }
            ExprKind::Paren(inner) => {
                self.line(depth, "Paren");
                self.node(Some(inner), child);
            }
            ExprKind::Return { label, value } => {
                match label {
                    Some(l) => self.line(depth, &format!("Return@{}", name(l))),
                    None => self.line(depth, "Return"),
                }
                if value.is_some() {
                    self.node(value, child);
                }
            }
            ExprKind::Binary { op, left, right } => {
                self.line(depth, &format!("Binary {op}"));
                self.node(left, child);
                self.node(right, child);
            }
            ExprKind::Prefix { op, operand } => {
                self.line(depth, &format!("Prefix {}", op.as_symbol()));
                self.node(operand, child);
            }
            ExprKind::Postfix { op, operand } => {
                self.line(depth, &format!("Postfix {}", op.as_symbol()));
                self.node(Some(operand), child);
            }
            ExprKind::TypeTest {
                operand,
                ty,
                negated,
            } => {
                let ty = ty.map_or_else(|| "?".to_owned(), |t| t.to_string());
                let op = if negated { "!is" } else { "is" };
                self.line(depth, &format!("TypeTest {op} {ty}"));
                self.node(Some(operand), child);
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.line(depth, "If");
                self.node(cond, child);
                self.node(then_branch, child);
                if else_branch.is_some() {
                    self.node(else_branch, child);
                }
            }
            ExprKind::While { cond, body } => {
                self.line(depth, "While");
                self.node(cond, child);
                self.node(body, child);
            }
            ExprKind::DoWhile { body, cond } => {
                self.line(depth, "DoWhile");
                self.node(body, child);
                self.node(cond, child);
            }
            ExprKind::LocalDecl { decl, init } => {
                let decl = *arena.get_decl(decl);
                let keyword = match decl.kind {
                    DeclKind::Local { mutable: true } => "var",
                    DeclKind::Local { mutable: false } => "val",
                    DeclKind::Parameter => "param",
                };
                let mut text = format!("LocalDecl {keyword} {}", name(decl.name));
                if let Some(ty) = decl.ty {
                    text.push_str(&format!(": {}", ty_to_string(ty, interner)));
                }
                self.line(depth, &text);
                if init.is_some() {
                    self.node(init, child);
                }
            }
            ExprKind::Field { receiver, name: member } => {
                self.line(depth, &format!("Field .{}", name(member)));
                self.node(Some(receiver), child);
            }
            ExprKind::Call { callee, args } => {
                self.line(depth, "Call");
                self.node(Some(callee), child);
                for &arg in arena.get_expr_list(args) {
                    self.node(Some(arg), child);
                }
            }
            ExprKind::Labeled { label, body } => {
                self.line(depth, &format!("Labeled {}@", name(label)));
                self.node(Some(body), child);
            }
            ExprKind::Lambda { body } => {
                self.line(depth, "Lambda");
                for &stmt in arena.get_expr_list(body) {
                    self.node(Some(stmt), child);
                }
            }
            ExprKind::Break => self.line(depth, "Break"),
            ExprKind::Continue => self.line(depth, "Continue"),
            ExprKind::Error => self.line(depth, "Error"),
        }
    }
}
