//! Indented tree dump of the AST, used by `--print-ast` and by tests.

use super::ast::{Block, If, Node, Proto};

/// Render a node and its children, two spaces of indent per level.
pub fn print(node: &Node) -> String {
    let mut printer = Printer {
        out: String::new(),
        indent: 0,
    };
    printer.node(node);
    printer.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn node(&mut self, node: &Node) {
        match node {
            Node::Program { body } => {
                self.line("Program:");
                self.nested(|p| {
                    for stmt in body {
                        p.node(stmt);
                    }
                });
            }
            Node::Literal { value, .. } => {
                self.line(&format!("Literal: {}", value));
            }
            Node::VarDecl {
                name,
                ty,
                value,
                constant,
            } => {
                self.line(&format!("VarDecl: {} : {}", name, ty.name));
                self.nested(|p| {
                    p.node(value);
                    p.line(&format!("Constant: {}", constant));
                });
            }
            Node::Assign { name, value } => {
                self.line("Assign:");
                self.nested(|p| {
                    p.line(&format!("Variable: {}", name));
                    p.node(value);
                });
            }
            Node::Variable { name } => {
                self.line(&format!("Variable: {}", name));
            }
            Node::Binary { lhs, rhs, op } => {
                self.line(&format!("Binary: {}", op));
                self.nested(|p| {
                    p.node(lhs);
                    p.node(rhs);
                });
            }
            Node::Unary { operand, op } => {
                self.line(&format!("Unary: {}", op));
                self.nested(|p| p.node(operand));
            }
            Node::Proto(proto) => self.proto(proto),
            Node::Block(block) => self.block(block),
            Node::FuncDecl { proto, body } => {
                self.line("FuncDecl:");
                self.nested(|p| {
                    p.proto(proto);
                    p.block(body);
                });
            }
            Node::Call { callee, args } => {
                self.line("Call:");
                self.nested(|p| {
                    p.line(&format!("Variable: {}", callee));
                    p.line("Args:");
                    p.nested(|p| {
                        for arg in args {
                            p.node(arg);
                        }
                    });
                });
            }
            Node::Return { value } => {
                self.line("Return:");
                self.nested(|p| p.node(value));
            }
            Node::If(if_node) => self.if_node(if_node),
            Node::IfElse {
                if_node,
                else_block,
            } => {
                self.line("IfElse:");
                self.nested(|p| {
                    p.if_node(if_node);
                    p.line("Else:");
                    p.nested(|p| p.block(else_block));
                });
            }
        }
    }

    fn proto(&mut self, proto: &Proto) {
        self.line(&format!("Proto: {}", proto.name));
        self.nested(|p| {
            for param in &proto.params {
                p.line(&format!("Arg: {} : {}", param.name, param.ty.name));
            }
            p.line(&format!("Return: {}", proto.ret.name));
        });
    }

    fn block(&mut self, block: &Block) {
        self.line("Block:");
        self.nested(|p| {
            for stmt in &block.body {
                p.node(stmt);
            }
        });
    }

    fn if_node(&mut self, if_node: &If) {
        self.line("If:");
        self.nested(|p| {
            p.node(&if_node.cond);
            p.block(&if_node.block);
        });
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }
}
