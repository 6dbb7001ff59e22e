use crate::expr::Expr;
use crate::stmt::{Program, Stmt};
use crate::token::TokenType;

/// Renders the AST in a parenthesised prefix form, one statement per line,
/// nested blocks indented by two spaces.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print_program(program: &Program) -> String {
        let mut out = String::new();

        for stmt in &program.statements {
            Self::write_stmt(&mut out, stmt, 0);
        }

        out
    }

    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Int(token) | Expr::Float(token) => token.lexeme.clone(),

            Expr::Str(token) => match &token.token_type {
                TokenType::STRING(s) => format!("{:?}", s),
                _ => token.lexeme.clone(),
            },

            Expr::Bool(token) | Expr::None(token) => token.lexeme.clone(),

            // ── names ───────────────────────────────────────────────────
            Expr::Variable(name) => name.lexeme.clone(),

            Expr::Assign(name, value) => format!("(= {} {})", name.lexeme, Self::print(value)),

            // ── operators ───────────────────────────────────────────────
            Expr::Unary(operator, right) => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            Expr::Binary(left, operator, right) => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            // ── calls and properties ────────────────────────────────────
            Expr::Call(callee, _, arguments) => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get(object, name) => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set(object, name, value) => format!(
                "(.= {} {} {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),
        }
    }

    fn write_block(out: &mut String, block: &[Stmt], depth: usize) {
        for stmt in block {
            Self::write_stmt(out, stmt, depth);
        }
    }

    fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
        let pad: String = "  ".repeat(depth);

        match stmt {
            Stmt::Expression(expr) => {
                out.push_str(&format!("{}{}\n", pad, Self::print(expr)));
            }

            Stmt::Print(expr) => {
                out.push_str(&format!("{}(print {})\n", pad, Self::print(expr)));
            }

            Stmt::Pass => out.push_str(&format!("{}(pass)\n", pad)),

            Stmt::Break(_) => out.push_str(&format!("{}(break)\n", pad)),

            Stmt::Continue(_) => out.push_str(&format!("{}(continue)\n", pad)),

            Stmt::Return(_, value) => match value {
                Some(expr) => out.push_str(&format!("{}(return {})\n", pad, Self::print(expr))),
                None => out.push_str(&format!("{}(return)\n", pad)),
            },

            Stmt::If {
                condition,
                then_branch,
                elif_branches,
                else_branch,
            } => {
                out.push_str(&format!("{}(if {}\n", pad, Self::print(condition)));
                Self::write_block(out, then_branch, depth + 1);

                for (elif_condition, block) in elif_branches {
                    out.push_str(&format!("{}(elif {}\n", pad, Self::print(elif_condition)));
                    Self::write_block(out, block, depth + 1);
                }

                if let Some(block) = else_branch {
                    out.push_str(&format!("{}(else\n", pad));
                    Self::write_block(out, block, depth + 1);
                }
            }

            Stmt::While(condition, body) => {
                out.push_str(&format!("{}(while {}\n", pad, Self::print(condition)));
                Self::write_block(out, body, depth + 1);
            }

            Stmt::Function(name, params, body) => {
                let params: Vec<&str> = params.iter().map(|p| p.lexeme.as_str()).collect();

                out.push_str(&format!(
                    "{}(def {} ({})\n",
                    pad,
                    name.lexeme,
                    params.join(" ")
                ));
                Self::write_block(out, body, depth + 1);
            }

            Stmt::Class(name, body) => {
                out.push_str(&format!("{}(class {}\n", pad, name.lexeme));
                Self::write_block(out, body, depth + 1);
            }
        }
    }
}
