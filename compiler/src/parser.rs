//! Parser — recursive descent over the layout token stream.
//!
//! The parser reads one token of lookahead from the lexer and builds the
//! arena AST. Three mechanisms carry most of the weight:
//!
//! **Layout blocks**: the parser opens an indentation block against the
//! current token's column wherever the grammar starts a statement group
//! (the module itself, expression bodies, `let`/`var` groups, `case`
//! alternatives) and closes it when the group ends. The lexer turns those
//! columns into `EndOfStmt`/`EndOfBlock` tokens.
//!
//! **Backtracking**: `try_parse` snapshots the lexer and the lookahead
//! token, runs a production, and restores both if it returns `None`.
//! Everything else is committed choice, so error messages stay anchored
//! to the production that actually failed.
//!
//! **Fixity deferral**: infix expressions parse into a flat right-leaning
//! tree. The resolver re-parents them from the module's operator table,
//! so the parser never needs precedence information.
//!
//! Error recovery: a failed declaration logs its message and the parser
//! skips to the next statement boundary, so one bad declaration does not
//! take the rest of the file with it.

use crate::ast::{
    Alt, Constr, Convention, Decl, DeclKind, Expr, ExprId, ExprKind, Fixity, FixityKind,
    FormatChunk, FunDecl, Literal, Module, Pat, SimpleType, TupleField, Type, TypeId, TypeKind,
};
use crate::errors::Diagnostic;
use crate::intern::{Id, Interner};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};

pub struct Parser<'src, 'ctx> {
    lexer: Lexer<'src, 'ctx>,
    token: Token,
    last_span: Span,
    module: Module,
    errors: Vec<Diagnostic>,

    // Pre-interned names the grammar gives special meaning.
    star: Id,
    underscore: Id,
    ccall: Id,
    stdcall: Id,
    cpp: Id,
}

impl<'src, 'ctx> Parser<'src, 'ctx> {
    pub fn new(source: &'src str, interner: &'ctx mut Interner) -> Self {
        let star = interner.intern("*");
        let underscore = interner.intern("_");
        let ccall = interner.intern("ccall");
        let stdcall = interner.intern("stdcall");
        let cpp = interner.intern("cpp");
        let mut lexer = Lexer::new(source, interner);
        let token = lexer.next_token();
        Self {
            lexer,
            token,
            last_span: Span::new(0, 0),
            module: Module::default(),
            errors: Vec::new(),
            star,
            underscore,
            ccall,
            stdcall,
            cpp,
        }
    }

    /// Parse a whole module. Returns the module and every diagnostic the
    /// lexer and parser logged, in source order of discovery.
    pub fn parse(mut self) -> (Module, Vec<Diagnostic>) {
        self.parse_module();
        let mut errors = self.lexer.take_errors();
        errors.append(&mut self.errors);
        (self.module, errors)
    }

    // ── Module and declarations ──────────────────────────────────────

    fn parse_module(&mut self) {
        let level = self.open_block();
        self.parse_decl();
        while self.token.kind == TokenKind::EndOfStmt {
            self.eat();
            self.parse_decl();
        }

        if !matches!(self.token.kind, TokenKind::EndOfBlock | TokenKind::Eof) {
            self.report("Expected end of statement block");
            while !matches!(self.token.kind, TokenKind::EndOfBlock | TokenKind::Eof) {
                self.eat();
            }
        }

        self.close_block(level);
        if self.token.kind == TokenKind::EndOfBlock {
            self.eat();
        }
    }

    /// Parse one top-level declaration, recovering to the next statement
    /// boundary on failure.
    fn parse_decl(&mut self) {
        if self.parse_decl_inner().is_none() {
            while !matches!(
                self.token.kind,
                TokenKind::EndOfStmt | TokenKind::EndOfBlock | TokenKind::Eof
            ) {
                self.eat();
            }
        }
    }

    fn parse_decl_inner(&mut self) -> Option<()> {
        match self.token.kind {
            TokenKind::Type => self.parse_type_decl(),
            TokenKind::Data => self.parse_data_decl(),
            TokenKind::Foreign => self.parse_foreign_decl(),
            TokenKind::Infix | TokenKind::InfixL | TokenKind::InfixR | TokenKind::Prefix => {
                self.parse_fixity()
            }
            // An empty declaration slot (blank line, end of module).
            TokenKind::EndOfStmt | TokenKind::EndOfBlock | TokenKind::Eof => Some(()),
            _ => {
                let start = self.token.span;
                if let Some(name) = self.try_parse(|p| p.parse_var()) {
                    self.parse_fun_decl(name, start)
                } else {
                    self.error("Expected a declaration")
                }
            }
        }
    }

    /// The body of a function declaration, after its name. Four forms:
    /// `: args = e`, `= e`, `tupletype [-> type] = e`, and `-> type = e`.
    fn parse_fun_decl(&mut self, name: Id, start: Span) -> Option<()> {
        match self.token.kind {
            TokenKind::Colon => {
                self.eat();

                // Zero or more named arguments.
                let mut fields = Vec::new();
                while let TokenKind::VarId(id) = self.token.kind {
                    fields.push(TupleField {
                        ty: None,
                        name: Some(id),
                        default: None,
                    });
                    self.eat();
                }
                let args = self.ty(TypeKind::Tup(fields), start);

                if self.token.kind != TokenKind::Equals {
                    return self.error("Expected '=' after a function declaration");
                }
                self.eat();
                let Some(body) = self.parse_expr() else {
                    return self.error("Expected a function body expression");
                };
                self.push_fun(name, body, Some(args), None, start);
                Some(())
            }
            TokenKind::Equals => {
                self.eat();
                let Some(body) = self.parse_expr() else {
                    return self.error("Expected a function body expression");
                };
                self.push_fun(name, body, None, None, start);
                Some(())
            }
            TokenKind::BraceL => {
                // The argument list as a tuple type.
                let tup = self.parse_tuple_type()?;
                // `{}` means an empty parameter list, not unit.
                let is_unit = matches!(self.module.ast.ty(tup).kind, TypeKind::Unit);
                let args = if is_unit {
                    self.ty(TypeKind::Tup(Vec::new()), start)
                } else {
                    tup
                };

                let ret = if self.token.kind == TokenKind::ArrowR {
                    self.eat();
                    Some(self.parse_type()?)
                } else {
                    None
                };

                if self.token.kind != TokenKind::Equals {
                    return self.error("Expected '=' after a function signature");
                }
                self.eat();
                let Some(body) = self.parse_expr() else {
                    return self.error("Expected a function body expression");
                };
                self.push_fun(name, body, Some(args), ret, start);
                Some(())
            }
            TokenKind::ArrowR => {
                self.eat();
                let ret = self.parse_type()?;
                if self.token.kind != TokenKind::Equals {
                    return self.error("Expected '=' after a function signature");
                }
                self.eat();
                let Some(body) = self.parse_expr() else {
                    return self.error("Expected a function body expression");
                };
                self.push_fun(name, body, None, Some(ret), start);
                Some(())
            }
            _ => self.error("Expected ':' or '=' after a function name declaration"),
        }
    }

    fn parse_type_decl(&mut self) -> Option<()> {
        let start = self.token.span;
        self.eat(); // 'type'
        let ty = self.parse_simple_type()?;
        if self.token.kind != TokenKind::Equals {
            return self.error("expected '=' after type name");
        }
        self.eat();
        let Some(target) = self.parse_type() else {
            return self.error("expected a type after '='");
        };
        let span = start.merge(self.last_span);
        self.module.decls.push(Decl {
            kind: DeclKind::Type { ty, target },
            span,
        });
        Some(())
    }

    fn parse_data_decl(&mut self) -> Option<()> {
        let start = self.token.span;
        self.eat(); // 'data'
        let ty = self.parse_simple_type()?;
        if self.token.kind != TokenKind::Equals {
            return self.error("expected '=' after type name");
        }
        self.eat();

        let mut constrs = Vec::new();
        match self.parse_constr() {
            Some(c) => constrs.push(c),
            None => return self.error("expected at least one constructor"),
        }
        while self.token.kind == TokenKind::Bar {
            self.eat();
            match self.parse_constr() {
                Some(c) => constrs.push(c),
                None => return self.error("expected a constructor definition"),
            }
        }

        let span = start.merge(self.last_span);
        self.module.decls.push(Decl {
            kind: DeclKind::Data { ty, constrs },
            span,
        });
        Some(())
    }

    fn parse_constr(&mut self) -> Option<Constr> {
        if let TokenKind::ConId(name) = self.token.kind {
            self.eat();
            let mut types = Vec::new();
            while let Some(t) = self.try_parse(|p| p.parse_atype()) {
                types.push(t);
            }
            Some(Constr { name, types })
        } else {
            self.error("expected constructor name")
        }
    }

    fn parse_foreign_decl(&mut self) -> Option<()> {
        let start = self.token.span;
        self.eat(); // 'foreign'
        if self.token.kind != TokenKind::Import {
            return self.error("expected 'import'");
        }
        self.eat();

        // Optional calling convention, defaulting to ccall.
        let mut convention = Convention::CCall;
        if let TokenKind::VarId(id) = self.token.kind {
            convention = if id == self.ccall {
                Convention::CCall
            } else if id == self.stdcall {
                Convention::Stdcall
            } else if id == self.cpp {
                Convention::Cpp
            } else {
                self.report("unknown calling convention");
                Convention::CCall
            };
            self.eat();
        }

        let extern_name = if let TokenKind::Str(id) = self.token.kind {
            self.eat();
            id
        } else {
            return self.error("expected name string");
        };

        let local_name = if let TokenKind::VarId(id) = self.token.kind {
            self.eat();
            id
        } else {
            return self.error("expected an identifier");
        };

        if self.token.kind != TokenKind::Colon {
            return self.error("expected ':'");
        }
        self.eat();

        let ty = self.parse_type()?;
        let span = start.merge(self.last_span);
        self.module.decls.push(Decl {
            kind: DeclKind::Foreign {
                extern_name,
                local_name,
                ty,
                convention,
            },
            span,
        });
        Some(())
    }

    fn parse_fixity(&mut self) -> Option<()> {
        // `infixl` and `infix` both produce left association.
        let kind = match self.token.kind {
            TokenKind::Infix | TokenKind::InfixL => FixityKind::Left,
            TokenKind::InfixR => FixityKind::Right,
            TokenKind::Prefix => FixityKind::Prefix,
            _ => return None,
        };
        self.eat();

        // Optional precedence; the standard default is 9.
        let prec = if let TokenKind::Int(n) = self.token.kind {
            self.eat();
            if (0..=9).contains(&n) {
                n as u8
            } else {
                self.report("operator precedence must be between 0 and 9");
                Fixity::DEFAULT.prec
            }
        } else {
            Fixity::DEFAULT.prec
        };

        let fixity = Fixity { kind, prec };
        self.add_fixity(fixity)?;
        while self.token.kind == TokenKind::Comma {
            self.eat();
            self.add_fixity(fixity)?;
        }
        Some(())
    }

    fn add_fixity(&mut self, fixity: Fixity) -> Option<()> {
        if let TokenKind::VarSym(op) = self.token.kind {
            use std::collections::hash_map::Entry;
            match self.module.operators.entry(op) {
                Entry::Occupied(_) => {
                    self.report("This operator has already had its precedence defined");
                }
                Entry::Vacant(slot) => {
                    slot.insert(fixity);
                }
            }
            self.eat();
            Some(())
        } else {
            self.error("Expected one or more operators after a fixity declaration or ','")
        }
    }

    // ── Expressions ──────────────────────────────────────────────────

    /// `expr := typedexpr (EndOfStmt typedexpr)*` — a layout block that
    /// becomes a `Multi` when it holds two or more statements.
    fn parse_expr(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        let level = self.open_block();
        let Some(first) = self.parse_typed_expr() else {
            self.close_block(level);
            return self.error("Expected an expression");
        };

        if self.token.kind == TokenKind::EndOfStmt {
            let mut stmts = vec![first];
            while self.token.kind == TokenKind::EndOfStmt {
                self.eat();
                let Some(next) = self.parse_typed_expr() else {
                    self.close_block(level);
                    return self.error("Expected an expression");
                };
                stmts.push(next);
            }
            self.close_block(level);
            if self.token.kind == TokenKind::EndOfBlock {
                self.eat();
            }
            let span = start.merge(self.last_span);
            Some(self.expr(ExprKind::Multi(stmts), span))
        } else {
            self.close_block(level);
            if self.token.kind == TokenKind::EndOfBlock {
                self.eat();
            }
            Some(first)
        }
    }

    /// `typedexpr := infixexpr (':' type)?`
    fn parse_typed_expr(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        let expr = self.parse_infix_expr()?;
        if self.token.kind == TokenKind::Colon {
            self.eat();
            let ty = self.parse_type()?;
            let span = start.merge(self.last_span);
            Some(self.expr(ExprKind::Coerce { expr, ty }, span))
        } else {
            Some(expr)
        }
    }

    /// Infix operator application, assignment, and the `$` application
    /// shortcut. Operator chains come out right-leaning; the resolver
    /// re-parents them from the fixity table.
    fn parse_infix_expr(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        let lhs = self.parse_prefix_expr()?;

        match self.token.kind {
            TokenKind::Equals => {
                self.eat();
                let Some(value) = self.parse_infix_expr() else {
                    return self.error("Expected an expression after assignment");
                };
                let span = start.merge(self.last_span);
                Some(self.expr(ExprKind::Assign { target: lhs, value }, span))
            }
            TokenKind::Dollar => {
                self.eat();
                let Some(arg) = self.parse_infix_expr() else {
                    return self.error("Expected a right-hand side for a binary operator");
                };
                let span = start.merge(self.last_span);
                Some(self.expr(
                    ExprKind::App {
                        callee: lhs,
                        args: vec![arg],
                    },
                    span,
                ))
            }
            _ => {
                if let Some(op) = self.try_parse(|p| p.parse_qop()) {
                    let Some(rhs) = self.parse_infix_expr() else {
                        return self.error("Expected a right-hand side for a binary operator");
                    };
                    let span = start.merge(self.last_span);
                    Some(self.expr(
                        ExprKind::Infix {
                            op,
                            left: lhs,
                            right: rhs,
                        },
                        span,
                    ))
                } else {
                    Some(lhs)
                }
            }
        }
    }

    fn parse_prefix_expr(&mut self) -> Option<ExprId> {
        if let TokenKind::VarSym(op) = self.token.kind {
            let start = self.token.span;
            self.eat();
            let Some(arg) = self.parse_left_expr() else {
                return self.error("Expected expression after a prefix operator");
            };
            let span = start.merge(self.last_span);
            Some(self.expr(ExprKind::Prefix { op, arg }, span))
        } else {
            self.parse_left_expr()
        }
    }

    fn parse_left_expr(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        match self.token.kind {
            TokenKind::Let => {
                self.eat();
                self.parse_var_decl_group(true)
            }
            TokenKind::Var => {
                self.eat();
                self.parse_var_decl_group(false)
            }
            TokenKind::Case => {
                self.eat();
                let Some(scrutinee) = self.parse_infix_expr() else {
                    return self.error("Expected an expression after 'case'");
                };
                if self.token.kind != TokenKind::Of {
                    return self.error("Expected 'of' after case-expression");
                }
                self.eat();
                let alts = self.parse_alts()?;
                let span = start.merge(self.last_span);
                Some(self.expr(ExprKind::Case { scrutinee, alts }, span))
            }
            TokenKind::If => {
                self.eat();
                let Some(cond) = self.parse_infix_expr() else {
                    return self.error("Expected an expression after 'if'");
                };
                // Allow a statement end here so then/else may sit at the
                // same indentation as the if itself.
                if self.token.kind == TokenKind::EndOfStmt {
                    self.eat();
                }
                if self.token.kind != TokenKind::Then {
                    return self.error("Expected 'then' after if-expression");
                }
                self.eat();
                let then_branch = self.parse_expr()?;
                let else_branch = self.try_parse(|p| p.parse_else());
                let span = start.merge(self.last_span);
                Some(self.expr(
                    ExprKind::If {
                        cond,
                        then_branch,
                        else_branch,
                    },
                    span,
                ))
            }
            TokenKind::While => {
                self.eat();
                let Some(cond) = self.parse_infix_expr() else {
                    return self.error("Expected expression after 'while'");
                };
                if self.token.kind != TokenKind::Do {
                    return self.error("Expected 'do' after while-expression");
                }
                self.eat();
                let Some(body) = self.parse_expr() else {
                    return self.error("Expected expression after 'do'");
                };
                let span = start.merge(self.last_span);
                Some(self.expr(ExprKind::While { cond, body }, span))
            }
            TokenKind::Backslash => {
                self.eat();
                let mut params = Vec::new();
                while let TokenKind::VarId(id) = self.token.kind {
                    params.push(id);
                    self.eat();
                }
                if params.is_empty() {
                    return self.error("Expected at least one parameter after '\\'");
                }
                if self.token.kind != TokenKind::ArrowR {
                    return self.error("Expected '->' after lambda parameters");
                }
                self.eat();
                let body = self.parse_expr()?;
                let span = start.merge(self.last_span);
                Some(self.expr(ExprKind::Lam { params, body }, span))
            }
            _ => self.parse_call_expr(),
        }
    }

    /// Function application by juxtaposition: `f x y`.
    fn parse_call_expr(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        let callee = self.parse_app_expr()?;

        let mut args = Vec::new();
        while let Some(arg) = self.try_parse(|p| p.parse_app_expr()) {
            args.push(arg);
        }

        if args.is_empty() {
            Some(callee)
        } else {
            let span = start.merge(self.last_span);
            Some(self.expr(ExprKind::App { callee, args }, span))
        }
    }

    /// `appexpr := baseexpr ('.' baseexpr)?` — method-call syntax.
    fn parse_app_expr(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        let base = self.parse_base_expr()?;
        if self.token.kind == TokenKind::Dot {
            self.eat();
            let app = self.parse_base_expr()?;
            let span = start.merge(self.last_span);
            Some(self.expr(ExprKind::Field { base, app }, span))
        } else {
            Some(base)
        }
    }

    fn parse_base_expr(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        if self.token.is_literal() {
            return self.parse_literal();
        }
        match self.token.kind {
            TokenKind::ParenL => {
                self.eat();
                let Some(inner) = self.parse_expr() else {
                    return self.error("Expected expression after '('");
                };
                if self.token.kind != TokenKind::ParenR {
                    return self.error("Expected ')' after '(' and an expression");
                }
                self.eat();
                let span = start.merge(self.last_span);
                // Parenthesized expressions keep their own node to
                // preserve ordering constraints.
                Some(self.expr(ExprKind::Nested(inner), span))
            }
            TokenKind::BraceL => self.parse_tuple_construct(),
            TokenKind::ConId(name) => {
                self.eat();
                let ty = self.ty(TypeKind::Con(name), start);
                Some(self.expr(
                    ExprKind::Construct {
                        ty: Some(ty),
                        fields: Vec::new(),
                    },
                    start,
                ))
            }
            _ => {
                if let Some(name) = self.try_parse(|p| p.parse_var()) {
                    let span = start.merge(self.last_span);
                    Some(self.expr(ExprKind::Var(name), span))
                } else {
                    self.error("Expected an expression")
                }
            }
        }
    }

    fn parse_literal(&mut self) -> Option<ExprId> {
        if matches!(self.token.kind, TokenKind::Str(_)) {
            return self.parse_string_literal();
        }
        let span = self.token.span;
        let lit = match self.token.kind {
            TokenKind::Int(n) => Literal::Int(n),
            TokenKind::Float(n) => Literal::Float(n),
            TokenKind::Char(c) => Literal::Char(c),
            _ => unreachable!("invalid literal kind"),
        };
        self.eat();
        Some(self.expr(ExprKind::Lit(lit), span))
    }

    /// A string literal, reassembling interpolation fragments: after the
    /// opening chunk, each `StartOfFormat` introduces an expression that
    /// must be followed by `EndOfFormat` and the next chunk.
    fn parse_string_literal(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        let TokenKind::Str(string) = self.token.kind else {
            unreachable!("invalid literal kind")
        };
        self.eat();

        if self.token.kind != TokenKind::StartOfFormat {
            return Some(self.expr(ExprKind::Lit(Literal::String(string)), start));
        }

        // The first chunk carries no expression; each later chunk carries
        // the expression that preceded it.
        let mut chunks = vec![FormatChunk { string, expr: None }];
        while self.token.kind == TokenKind::StartOfFormat {
            self.eat();
            let expr = self.parse_infix_expr()?;
            if self.token.kind != TokenKind::EndOfFormat {
                return self.error("Expected end of string format after this expression");
            }
            self.eat();
            let TokenKind::Str(chunk) = self.token.kind else {
                return self.error("Expected a string chunk after a format expression");
            };
            self.eat();
            chunks.push(FormatChunk {
                string: chunk,
                expr: Some(expr),
            });
        }
        let span = start.merge(self.last_span);
        Some(self.expr(ExprKind::Format(chunks), span))
    }

    /// One or more `let`/`var` bindings in their own layout block.
    fn parse_var_decl_group(&mut self, constant: bool) -> Option<ExprId> {
        let start = self.token.span;
        let level = self.open_block();
        let Some(first) = self.parse_decl_expr(constant) else {
            self.close_block(level);
            return self.error("Expected declaration after 'var' or 'let'");
        };

        if self.token.kind == TokenKind::EndOfStmt {
            let mut decls = vec![first];
            while self.token.kind == TokenKind::EndOfStmt {
                self.eat();
                let Some(next) = self.parse_decl_expr(constant) else {
                    self.close_block(level);
                    return self.error("Expected declaration after 'var' or 'let'");
                };
                decls.push(next);
            }
            self.close_block(level);
            if self.token.kind == TokenKind::EndOfBlock {
                self.eat();
            }
            let span = start.merge(self.last_span);
            Some(self.expr(ExprKind::Multi(decls), span))
        } else {
            self.close_block(level);
            if self.token.kind == TokenKind::EndOfBlock {
                self.eat();
            }
            Some(first)
        }
    }

    /// `declexpr := varid ['=' typedexpr]`
    fn parse_decl_expr(&mut self, constant: bool) -> Option<ExprId> {
        let start = self.token.span;
        if let TokenKind::VarId(name) = self.token.kind {
            self.eat();
            if self.token.kind == TokenKind::Equals {
                self.eat();
                let Some(init) = self.parse_typed_expr() else {
                    return self.error("Expected expression");
                };
                let span = start.merge(self.last_span);
                Some(self.expr(
                    ExprKind::Decl {
                        name,
                        init: Some(init),
                        constant,
                    },
                    span,
                ))
            } else {
                Some(self.expr(
                    ExprKind::Decl {
                        name,
                        init: None,
                        constant,
                    },
                    start,
                ))
            }
        } else {
            self.error("Expected identifier")
        }
    }

    /// The optional else-branch; a statement end may precede `else` so it
    /// can share the if's indentation.
    fn parse_else(&mut self) -> Option<ExprId> {
        if self.token.kind == TokenKind::EndOfStmt {
            self.eat();
        }
        if self.token.kind == TokenKind::Else {
            self.eat();
            self.parse_expr()
        } else {
            None
        }
    }

    // ── Case alternatives ────────────────────────────────────────────

    fn parse_alts(&mut self) -> Option<Vec<Alt>> {
        let level = self.open_block();
        let Some(first) = self.parse_alt() else {
            self.close_block(level);
            return self.error("Expected at least one case alternative");
        };

        let mut alts = vec![first];
        while self.token.kind == TokenKind::EndOfStmt {
            self.eat();
            let Some(alt) = self.parse_alt() else {
                self.close_block(level);
                return self.error("Expected a case alternative");
            };
            alts.push(alt);
        }
        self.close_block(level);
        if self.token.kind == TokenKind::EndOfBlock {
            self.eat();
        }
        Some(alts)
    }

    fn parse_alt(&mut self) -> Option<Alt> {
        let pat = self.parse_pattern()?;
        if self.token.kind != TokenKind::ArrowR {
            return self.error("Expected '->' after a case pattern");
        }
        self.eat();
        let body = self.parse_expr()?;
        Some(Alt { pat, body })
    }

    fn parse_pattern(&mut self) -> Option<Pat> {
        if let TokenKind::ConId(name) = self.token.kind {
            self.eat();
            let mut fields = Vec::new();
            while let Some(pat) = self.try_parse(|p| p.parse_apattern()) {
                fields.push(pat);
            }
            Some(Pat::Con(name, fields))
        } else {
            self.parse_apattern()
        }
    }

    fn parse_apattern(&mut self) -> Option<Pat> {
        match self.token.kind {
            TokenKind::VarId(id) if id == self.underscore => {
                self.eat();
                Some(Pat::Wildcard)
            }
            TokenKind::VarId(id) => {
                self.eat();
                Some(Pat::Var(id))
            }
            TokenKind::ConId(id) => {
                self.eat();
                Some(Pat::Con(id, Vec::new()))
            }
            TokenKind::Int(n) => {
                self.eat();
                Some(Pat::Lit(Literal::Int(n)))
            }
            TokenKind::Float(n) => {
                self.eat();
                Some(Pat::Lit(Literal::Float(n)))
            }
            TokenKind::Char(c) => {
                self.eat();
                Some(Pat::Lit(Literal::Char(c)))
            }
            TokenKind::Str(s) => {
                self.eat();
                if self.token.kind == TokenKind::StartOfFormat {
                    return self.error("A format string cannot appear in a pattern");
                }
                Some(Pat::Lit(Literal::String(s)))
            }
            TokenKind::ParenL => {
                self.eat();
                let pat = self.parse_pattern()?;
                if self.token.kind != TokenKind::ParenR {
                    return self.error("Expected ')' after a pattern");
                }
                self.eat();
                Some(pat)
            }
            _ => self.error("Expected a pattern"),
        }
    }

    // ── Variables and operators ──────────────────────────────────────

    /// `var := varid | '(' varsym ')'` — no error is logged; callers
    /// always run this through `try_parse`.
    fn parse_var(&mut self) -> Option<Id> {
        match self.token.kind {
            TokenKind::VarId(id) => {
                self.eat();
                Some(id)
            }
            TokenKind::ParenL => {
                self.eat();
                if let TokenKind::VarSym(id) = self.token.kind {
                    self.eat();
                    if self.token.kind == TokenKind::ParenR {
                        self.eat();
                        return Some(id);
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// `qop := varsym | '`' varid '`'`
    fn parse_qop(&mut self) -> Option<Id> {
        match self.token.kind {
            TokenKind::VarSym(id) => {
                self.eat();
                Some(id)
            }
            TokenKind::Grave => {
                self.eat();
                if let TokenKind::VarId(id) = self.token.kind {
                    self.eat();
                    if self.token.kind == TokenKind::Grave {
                        self.eat();
                        return Some(id);
                    }
                }
                None
            }
            _ => None,
        }
    }

    // ── Types ────────────────────────────────────────────────────────

    fn parse_type(&mut self) -> Option<TypeId> {
        let start = self.token.span;
        match self.token.kind {
            // `*` in type context is the pointer sigil.
            TokenKind::VarSym(id) if id == self.star => {
                self.eat();
                let inner = self.parse_type()?;
                let span = start.merge(self.last_span);
                Some(self.ty(TypeKind::Ptr(inner), span))
            }
            TokenKind::ConId(id) => {
                self.eat();
                let base = self.ty(TypeKind::Con(id), start);

                // A name followed by argument types is a type application.
                let mut args = Vec::new();
                while let Some(arg) = self.try_parse(|p| p.parse_atype()) {
                    args.push(arg);
                }
                if args.is_empty() {
                    Some(base)
                } else {
                    let span = start.merge(self.last_span);
                    Some(self.ty(TypeKind::App { base, args }, span))
                }
            }
            TokenKind::VarId(id) => {
                self.eat();
                Some(self.ty(TypeKind::Gen(id), start))
            }
            TokenKind::BraceL => self.parse_braced_type(start),
            _ => self.error("Expected a type"),
        }
    }

    /// An atomic type: a bare name, a generic parameter, a pointer, or a
    /// braced tuple. Used for constructor fields and type-application
    /// arguments, where application does not extend greedily. No error is
    /// logged; callers run this through `try_parse`.
    fn parse_atype(&mut self) -> Option<TypeId> {
        let start = self.token.span;
        match self.token.kind {
            TokenKind::VarSym(id) if id == self.star => {
                self.eat();
                let inner = self.parse_atype()?;
                let span = start.merge(self.last_span);
                Some(self.ty(TypeKind::Ptr(inner), span))
            }
            TokenKind::ConId(id) => {
                self.eat();
                Some(self.ty(TypeKind::Con(id), start))
            }
            TokenKind::VarId(id) => {
                self.eat();
                Some(self.ty(TypeKind::Gen(id), start))
            }
            TokenKind::BraceL => self.parse_braced_type(start),
            _ => None,
        }
    }

    /// A tuple type, possibly continued by `->` into a function type.
    /// Also handles the unit type; `{}` followed by `->` is a function
    /// type with an empty parameter list.
    fn parse_braced_type(&mut self, start: Span) -> Option<TypeId> {
        let tup = self.parse_tuple_type()?;
        if self.token.kind == TokenKind::ArrowR {
            self.eat();
            let ret = self.parse_type()?;
            let args = match &self.module.ast.ty(tup).kind {
                TypeKind::Tup(fields) => fields.clone(),
                _ => Vec::new(),
            };
            let span = start.merge(self.last_span);
            Some(self.ty(TypeKind::Fun { args, ret }, span))
        } else {
            Some(tup)
        }
    }

    fn parse_simple_type(&mut self) -> Option<SimpleType> {
        if let TokenKind::ConId(name) = self.token.kind {
            self.eat();
            let mut params = Vec::new();
            while let TokenKind::VarId(id) = self.token.kind {
                params.push(id);
                self.eat();
            }
            Some(SimpleType { name, params })
        } else {
            self.error("expected type name")
        }
    }

    /// `tuptype := '{' (tupfield (',' tupfield)*)? '}'` — `{}` is unit.
    fn parse_tuple_type(&mut self) -> Option<TypeId> {
        let start = self.token.span;
        if self.token.kind != TokenKind::BraceL {
            return self.error("Expected '{'");
        }
        self.eat();

        if self.token.kind == TokenKind::BraceR {
            self.eat();
            return Some(self.ty(TypeKind::Unit, start.merge(self.last_span)));
        }

        let mut fields = Vec::new();
        let Some(first) = self.parse_tuple_field() else {
            return self.error("Expected one or more tuple fields");
        };
        fields.push(first);
        while self.token.kind == TokenKind::Comma {
            self.eat();
            let field = self.parse_tuple_field()?;
            fields.push(field);
        }

        if self.token.kind != TokenKind::BraceR {
            return self.error("Expected '}'");
        }
        self.eat();
        Some(self.ty(TypeKind::Tup(fields), start.merge(self.last_span)))
    }

    /// A tuple-type field: `varid : type` (named), a bare `varid`
    /// (generic parameter reference), or a type, optionally followed by
    /// `= typedexpr` as a default value.
    fn parse_tuple_field(&mut self) -> Option<TupleField> {
        let mut ty = None;
        let mut name = None;

        if let TokenKind::VarId(id) = self.token.kind {
            let start = self.token.span;
            self.eat();
            match self.token.kind {
                TokenKind::Colon => {
                    // That was the field name.
                    self.eat();
                    ty = Some(self.parse_type()?);
                    name = Some(id);
                }
                TokenKind::Equals => {
                    name = Some(id);
                }
                _ => {
                    // That was the type.
                    ty = Some(self.module.ast.add_type(Type {
                        kind: TypeKind::Gen(id),
                        span: start,
                    }));
                }
            }
        } else {
            ty = Some(self.parse_type()?);
        }

        let mut default = None;
        if self.token.kind == TokenKind::Equals {
            self.eat();
            default = self.parse_typed_expr();
        }

        if ty.is_none() && default.is_none() {
            return None;
        }
        Some(TupleField { ty, name, default })
    }

    /// Tuple construction: `{typedexpr, name = typedexpr, ...}`; `{}` is
    /// the unit value.
    fn parse_tuple_construct(&mut self) -> Option<ExprId> {
        let start = self.token.span;
        if self.token.kind != TokenKind::BraceL {
            return self.error("Expected '{'");
        }
        self.eat();

        if self.token.kind == TokenKind::BraceR {
            self.eat();
            return Some(self.expr(ExprKind::Unit, start.merge(self.last_span)));
        }

        let mut fields = Vec::new();
        let Some(first) = self.parse_tuple_construct_field() else {
            return self.error("Expected one or more tuple fields");
        };
        fields.push(first);
        while self.token.kind == TokenKind::Comma {
            self.eat();
            let field = self.parse_tuple_construct_field()?;
            fields.push(field);
        }

        if self.token.kind != TokenKind::BraceR {
            return self.error("Expected '}'");
        }
        self.eat();
        let span = start.merge(self.last_span);
        Some(self.expr(ExprKind::Construct { ty: None, fields }, span))
    }

    fn parse_tuple_construct_field(&mut self) -> Option<TupleField> {
        let mut name = None;
        let value = if let TokenKind::VarId(id) = self.token.kind {
            let start = self.token.span;
            self.eat();
            if self.token.kind == TokenKind::Equals {
                name = Some(id);
                self.eat();
                self.parse_typed_expr()?
            } else {
                // A bare name is shorthand for a field holding that variable.
                self.expr(ExprKind::Var(id), start)
            }
        } else {
            self.parse_typed_expr()?
        };
        Some(TupleField {
            ty: None,
            name,
            default: Some(value),
        })
    }

    // ── Infrastructure ───────────────────────────────────────────────

    fn eat(&mut self) {
        self.last_span = self.token.span;
        self.token = self.lexer.next_token();
    }

    /// Run a production speculatively: on `None` the lexer, lookahead,
    /// and error log are restored exactly. Snapshots nest.
    fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let snapshot = self.lexer.save();
        let token = self.token;
        let last_span = self.last_span;
        let errors_len = self.errors.len();
        match f(self) {
            Some(value) => Some(value),
            None => {
                self.lexer.restore(snapshot);
                self.token = token;
                self.last_span = last_span;
                self.errors.truncate(errors_len);
                None
            }
        }
    }

    fn open_block(&mut self) -> usize {
        self.lexer.push_level(self.token.col)
    }

    fn close_block(&mut self, level: usize) {
        self.lexer.close_level(level);
    }

    fn expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.module.ast.add_expr(Expr { kind, span })
    }

    fn ty(&mut self, kind: TypeKind, span: Span) -> TypeId {
        self.module.ast.add_type(Type { kind, span })
    }

    fn push_fun(
        &mut self,
        name: Id,
        body: ExprId,
        args: Option<TypeId>,
        ret: Option<TypeId>,
        start: Span,
    ) {
        let span = start.merge(self.last_span);
        self.module.decls.push(Decl {
            kind: DeclKind::Fun(FunDecl {
                name,
                body,
                args,
                ret,
            }),
            span,
        });
    }

    /// Log a message anchored to the current token.
    fn report(&mut self, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(message, self.token.span));
    }

    /// Log a message and fail the current production.
    fn error<T>(&mut self, message: impl Into<String>) -> Option<T> {
        self.report(message);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_src(source: &str) -> (Module, Vec<Diagnostic>, Interner) {
        let mut interner = Interner::new();
        let (module, errors) = Parser::new(source, &mut interner).parse();
        (module, errors, interner)
    }

    fn parse_ok(source: &str) -> (Module, Interner) {
        let (module, errors, interner) = parse_src(source);
        assert!(errors.is_empty(), "parse errors: {:?}", errors);
        (module, interner)
    }

    fn fun(module: &Module, index: usize) -> &FunDecl {
        match &module.decls[index].kind {
            DeclKind::Fun(f) => f,
            other => panic!("expected a function declaration, got {:?}", other),
        }
    }

    #[test]
    fn value_bindings() {
        let (module, mut interner) = parse_ok("f = 1\ng = f");
        assert_eq!(module.decls.len(), 2);
        let f = interner.intern("f");
        let g = fun(&module, 1);
        assert_eq!(g.name, interner.intern("g"));
        assert!(g.args.is_none());
        assert!(matches!(module.ast.expr(g.body).kind, ExprKind::Var(id) if id == f));
    }

    #[test]
    fn named_arg_function() {
        let (module, mut interner) = parse_ok("const: x y = x");
        let f = fun(&module, 0);
        let args = f.args.expect("argument tuple");
        match &module.ast.ty(args).kind {
            TypeKind::Tup(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].name, Some(interner.intern("x")));
                assert!(fields[0].ty.is_none());
            }
            other => panic!("expected tuple args, got {:?}", other),
        }
    }

    #[test]
    fn signature_function() {
        let (module, _) = parse_ok("add {a: Int, b: Int} -> Int = a");
        let f = fun(&module, 0);
        let args = f.args.expect("argument tuple");
        match &module.ast.ty(args).kind {
            TypeKind::Tup(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected tuple args, got {:?}", other),
        }
        assert!(f.ret.is_some());
    }

    #[test]
    fn return_type_only_signature() {
        let (module, _) = parse_ok("g -> Int = 1");
        let f = fun(&module, 0);
        assert!(f.args.is_none());
        assert!(f.ret.is_some());
    }

    #[test]
    fn operator_binding_name() {
        let (module, mut interner) = parse_ok("(+) {a: Int, b: Int} = a");
        assert_eq!(fun(&module, 0).name, interner.intern("+"));
    }

    #[test]
    fn empty_signature_is_a_tuple_not_unit() {
        let (module, _) = parse_ok("main {} = 1");
        let f = fun(&module, 0);
        let args = f.args.expect("argument tuple");
        assert!(matches!(&module.ast.ty(args).kind, TypeKind::Tup(fields) if fields.is_empty()));
    }

    #[test]
    fn layout_block_body() {
        let source = "f =\n  let x = 1\n      y = 2\n  x";
        let (module, mut interner) = parse_ok(source);
        let f = fun(&module, 0);
        let ExprKind::Multi(stmts) = &module.ast.expr(f.body).kind else {
            panic!("expected a statement block body");
        };
        assert_eq!(stmts.len(), 2);

        let ExprKind::Multi(decls) = &module.ast.expr(stmts[0]).kind else {
            panic!("expected a let group");
        };
        assert_eq!(decls.len(), 2);
        assert!(matches!(
            module.ast.expr(decls[0]).kind,
            ExprKind::Decl { constant: true, .. }
        ));

        let x = interner.intern("x");
        assert!(matches!(module.ast.expr(stmts[1]).kind, ExprKind::Var(id) if id == x));
    }

    #[test]
    fn string_interpolation() {
        let (module, mut interner) = parse_ok("greet = \"hi {name}!\"");
        let f = fun(&module, 0);
        let ExprKind::Format(chunks) = &module.ast.expr(f.body).kind else {
            panic!("expected a format expression");
        };
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].string, interner.intern("hi "));
        assert!(chunks[0].expr.is_none());
        assert_eq!(chunks[1].string, interner.intern("!"));
        let name = interner.intern("name");
        let embedded = chunks[1].expr.expect("embedded expression");
        assert!(matches!(module.ast.expr(embedded).kind, ExprKind::Var(id) if id == name));
    }

    #[test]
    fn if_then_else_share_a_column() {
        let source = "f =\n  if c\n  then 1\n  else 2";
        let (module, _) = parse_ok(source);
        let f = fun(&module, 0);
        let ExprKind::If { else_branch, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected an if expression");
        };
        assert!(else_branch.is_some());
    }

    #[test]
    fn while_do_loop() {
        let (module, _) = parse_ok("spin = while c do step");
        let f = fun(&module, 0);
        assert!(matches!(
            module.ast.expr(f.body).kind,
            ExprKind::While { .. }
        ));
    }

    #[test]
    fn case_alternatives() {
        let source = "f = case m of\n  Just x -> x\n  Nothing -> 0";
        let (module, mut interner) = parse_ok(source);
        let f = fun(&module, 0);
        let ExprKind::Case { alts, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected a case expression");
        };
        assert_eq!(alts.len(), 2);
        let just = interner.intern("Just");
        assert!(matches!(&alts[0].pat, Pat::Con(name, fields) if *name == just && fields.len() == 1));
        assert!(matches!(&alts[1].pat, Pat::Con(_, fields) if fields.is_empty()));
    }

    #[test]
    fn lambda_expression() {
        let (module, _) = parse_ok("add = \\x y -> x");
        let f = fun(&module, 0);
        let ExprKind::Lam { params, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected a lambda");
        };
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn application_by_juxtaposition() {
        let (module, _) = parse_ok("r = f x y");
        let f = fun(&module, 0);
        let ExprKind::App { args, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected an application");
        };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn dollar_is_application() {
        let (module, _) = parse_ok("r = f $ g x");
        let f = fun(&module, 0);
        let ExprKind::App { args, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected an application");
        };
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn infix_chain_leans_right() {
        let (module, _) = parse_ok("r = a - b - c");
        let f = fun(&module, 0);
        let ExprKind::Infix { left, right, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected an infix expression");
        };
        // Flat right-leaning: the right child is the nested chain.
        assert!(matches!(module.ast.expr(*left).kind, ExprKind::Var(_)));
        assert!(matches!(
            module.ast.expr(*right).kind,
            ExprKind::Infix { .. }
        ));
    }

    #[test]
    fn backtick_operator() {
        let (module, mut interner) = parse_ok("r = a `div` b");
        let f = fun(&module, 0);
        let ExprKind::Infix { op, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected an infix expression");
        };
        assert_eq!(*op, interner.intern("div"));
    }

    #[test]
    fn coercion_expression() {
        let (module, _) = parse_ok("r = x : Int");
        let f = fun(&module, 0);
        assert!(matches!(
            module.ast.expr(f.body).kind,
            ExprKind::Coerce { .. }
        ));
    }

    #[test]
    fn prefix_operator() {
        let (module, mut interner) = parse_ok("r = -x");
        let f = fun(&module, 0);
        let ExprKind::Prefix { op, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected a prefix expression");
        };
        assert_eq!(*op, interner.intern("-"));
    }

    #[test]
    fn data_declaration() {
        let (module, mut interner) = parse_ok("data Maybe a = Just a | Nothing");
        let DeclKind::Data { ty, constrs } = &module.decls[0].kind else {
            panic!("expected a data declaration");
        };
        assert_eq!(ty.name, interner.intern("Maybe"));
        assert_eq!(ty.params.len(), 1);
        assert_eq!(constrs.len(), 2);
        assert_eq!(constrs[0].types.len(), 1);
        assert!(constrs[1].types.is_empty());
    }

    #[test]
    fn type_alias_declaration() {
        let (module, _) = parse_ok("type Point = {x: Int, y: Int}");
        let DeclKind::Type { target, .. } = &module.decls[0].kind else {
            panic!("expected a type declaration");
        };
        assert!(matches!(
            &module.ast.ty(*target).kind,
            TypeKind::Tup(fields) if fields.len() == 2
        ));
    }

    #[test]
    fn applied_type_alias() {
        let (module, _) = parse_ok("type P = Pair Int Int");
        let DeclKind::Type { target, .. } = &module.decls[0].kind else {
            panic!("expected a type declaration");
        };
        assert!(matches!(
            &module.ast.ty(*target).kind,
            TypeKind::App { args, .. } if args.len() == 2
        ));
    }

    #[test]
    fn pointer_type_uses_the_star_sigil() {
        let (module, _) = parse_ok("type S = *Char");
        let DeclKind::Type { target, .. } = &module.decls[0].kind else {
            panic!("expected a type declaration");
        };
        assert!(matches!(&module.ast.ty(*target).kind, TypeKind::Ptr(_)));
    }

    #[test]
    fn function_type_with_arrow() {
        let (module, _) = parse_ok("type F = {Int, Int} -> Int");
        let DeclKind::Type { target, .. } = &module.decls[0].kind else {
            panic!("expected a type declaration");
        };
        assert!(matches!(
            &module.ast.ty(*target).kind,
            TypeKind::Fun { args, .. } if args.len() == 2
        ));
    }

    #[test]
    fn tuple_field_default_value() {
        let (module, _) = parse_ok("type C = {retries: Int = 3}");
        let DeclKind::Type { target, .. } = &module.decls[0].kind else {
            panic!("expected a type declaration");
        };
        let TypeKind::Tup(fields) = &module.ast.ty(*target).kind else {
            panic!("expected a tuple type");
        };
        assert!(fields[0].default.is_some());
    }

    #[test]
    fn foreign_import_with_convention() {
        let (module, mut interner) =
            parse_ok("foreign import stdcall \"MessageBeep\" beep : {Int} -> Int");
        let DeclKind::Foreign {
            extern_name,
            local_name,
            convention,
            ..
        } = &module.decls[0].kind
        else {
            panic!("expected a foreign declaration");
        };
        assert_eq!(*extern_name, interner.intern("MessageBeep"));
        assert_eq!(*local_name, interner.intern("beep"));
        assert_eq!(*convention, Convention::Stdcall);
    }

    #[test]
    fn foreign_import_defaults_to_ccall() {
        let (module, _) = parse_ok("foreign import \"puts\" puts : {*Char} -> Int");
        let DeclKind::Foreign { convention, .. } = &module.decls[0].kind else {
            panic!("expected a foreign declaration");
        };
        assert_eq!(*convention, Convention::CCall);
    }

    #[test]
    fn fixity_declaration_registers_operators() {
        let (module, mut interner) = parse_ok("infixl 6 +, -\ninfixr 5 ++\nf = 1");
        let plus = interner.intern("+");
        let minus = interner.intern("-");
        let append = interner.intern("++");
        assert_eq!(
            module.fixity(plus),
            Fixity {
                kind: FixityKind::Left,
                prec: 6
            }
        );
        assert_eq!(module.fixity(minus).prec, 6);
        assert_eq!(module.fixity(append).kind, FixityKind::Right);
    }

    #[test]
    fn unregistered_operator_gets_the_default_fixity() {
        let (module, mut interner) = parse_ok("f = 1");
        let star = interner.intern("**");
        assert_eq!(module.fixity(star), Fixity::DEFAULT);
    }

    #[test]
    fn duplicate_fixity_is_an_error() {
        let (_, errors, _) = parse_src("infixl 6 +\ninfixl 7 +\nf = 1");
        assert!(errors
            .iter()
            .any(|e| e.message.contains("already had its precedence defined")));
    }

    #[test]
    fn assignment_is_right_associative() {
        let (module, _) = parse_ok("f = a = b = c");
        // The body is `a = (b = c)`.
        let f = fun(&module, 0);
        let ExprKind::Assign { value, .. } = &module.ast.expr(f.body).kind else {
            panic!("expected an assignment");
        };
        assert!(matches!(
            module.ast.expr(*value).kind,
            ExprKind::Assign { .. }
        ));
    }

    #[test]
    fn bad_declaration_recovers_at_statement_boundary() {
        let (module, errors, _) = parse_src("f = = 1\ng = 2");
        assert!(!errors.is_empty());
        // The second declaration still parsed.
        assert!(module
            .decls
            .iter()
            .any(|d| matches!(&d.kind, DeclKind::Fun(f) if {
                matches!(module.ast.expr(f.body).kind, ExprKind::Lit(Literal::Int(2)))
            })));
    }

    #[test]
    fn nullary_constructor_is_a_construction() {
        let (module, _) = parse_ok("n = Nothing");
        let f = fun(&module, 0);
        assert!(matches!(
            module.ast.expr(f.body).kind,
            ExprKind::Construct { .. }
        ));
    }

    #[test]
    fn tuple_construction_with_named_fields() {
        let (module, _) = parse_ok("p = {x = 1, y = 2}");
        let f = fun(&module, 0);
        let ExprKind::Construct { ty, fields } = &module.ast.expr(f.body).kind else {
            panic!("expected a construction");
        };
        assert!(ty.is_none());
        assert_eq!(fields.len(), 2);
        assert!(fields[0].name.is_some());
    }

    #[test]
    fn unit_value() {
        let (module, _) = parse_ok("u = {}");
        let f = fun(&module, 0);
        assert!(matches!(module.ast.expr(f.body).kind, ExprKind::Unit));
    }
}
