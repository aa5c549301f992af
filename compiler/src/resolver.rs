//! Resolver — scope construction, name and type resolution, typed IR.
//!
//! The resolver consumes the parsed module read-only and produces a
//! [`ResolvedModule`]: a scope tree, a canonicalized type table, and one
//! typed expression tree per function. Work happens in two ordered
//! passes:
//!
//! 1. **Install**: every top-level declaration registers its name in the
//!    module scope. Variants and aliases are allocated *lazily* — they
//!    point at their declaration and resolve the first time something
//!    looks them up, which lets declarations reference each other in any
//!    order. Functions are installed before any body is visited so
//!    mutual recursion resolves.
//! 2. **Resolve**: foreign signatures, function signatures, and function
//!    bodies resolve in declaration order; at the end every type still
//!    pending in the module scope is forced.
//!
//! Type resolution never mutates the AST; everything it produces lives
//! in the type table. Errors never abort: each one logs a message and
//! substitutes the `Unknown` sentinel, so downstream passes always see a
//! well-formed module.
//!
//! Infix expressions arrive from the parser as flat right-leaning
//! chains; this pass re-parents them using the module's fixity table
//! while lowering.
//!
//! Expression typing is deliberately shallow: literals, variables,
//! declarations, blocks, conditionals, construction, coercions, and
//! calls through known signatures get precise types, and everything else
//! is `Unknown` for later passes to refine.

use std::collections::HashMap;

use crate::ast::{self, DeclKind, ExprKind, FixityKind, Literal, Pat, TypeKind};
use crate::errors::Diagnostic;
use crate::intern::{Id, Interner};
use crate::token::Span;
use crate::types::{
    AliasState, AliasTy, AppTy, FunTy, GenTy, Ty, TyRef, TypeTable, VarCtor, VariantTy,
};

// ── Scopes ───────────────────────────────────────────────────────────

/// Index of a scope in the resolver's scope tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: Id,
    pub ty: TyRef,
    pub constant: bool,
}

#[derive(Debug, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Locally declared bindings.
    pub variables: Vec<Variable>,
    /// Redeclarations of names already visible; preferred in lookup.
    pub shadows: Vec<Variable>,
    pub types: HashMap<Id, TyRef>,
    /// Constructor name to (variant type, constructor index).
    pub constructors: HashMap<Id, (TyRef, u32)>,
    /// Function name to its index in the resolved module.
    pub functions: HashMap<Id, usize>,
}

/// The scope tree, stored flat and addressed by [`ScopeId`]. Scopes are
/// never destroyed individually; they live as long as the module.
#[derive(Debug)]
pub struct Scopes {
    scopes: Vec<Scope>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            scopes: vec![Scope::default()],
        }
    }

    pub fn root() -> ScopeId {
        ScopeId(0)
    }

    pub fn create(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    /// Search shadows first, then locals, then the parent chain.
    pub fn find_var(&self, scope: ScopeId, name: Id) -> Option<&Variable> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let frame = self.get(id);
            if let Some(var) = frame.shadows.iter().rev().find(|v| v.name == name) {
                return Some(var);
            }
            if let Some(var) = frame.variables.iter().rev().find(|v| v.name == name) {
                return Some(var);
            }
            cursor = frame.parent;
        }
        None
    }

    /// Search only the given frame.
    pub fn find_local_var(&self, scope: ScopeId, name: Id) -> Option<&Variable> {
        let frame = self.get(scope);
        frame
            .shadows
            .iter()
            .rev()
            .find(|v| v.name == name)
            .or_else(|| frame.variables.iter().rev().find(|v| v.name == name))
    }

    /// Type names are unique per scope chain; walk to the root.
    pub fn find_type(&self, scope: ScopeId, name: Id) -> Option<TyRef> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let frame = self.get(id);
            if let Some(&ty) = frame.types.get(&name) {
                return Some(ty);
            }
            cursor = frame.parent;
        }
        None
    }

    pub fn find_constructor(&self, scope: ScopeId, name: Id) -> Option<(TyRef, u32)> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let frame = self.get(id);
            if let Some(&ctor) = frame.constructors.get(&name) {
                return Some(ctor);
            }
            cursor = frame.parent;
        }
        None
    }

    pub fn find_function(&self, scope: ScopeId, name: Id) -> Option<usize> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let frame = self.get(id);
            if let Some(&index) = frame.functions.get(&name) {
                return Some(index);
            }
            cursor = frame.parent;
        }
        None
    }

    /// Declare a binding. A name already visible from this scope goes to
    /// the shadow list, which lookup prefers.
    pub fn declare(&mut self, scope: ScopeId, var: Variable) {
        if self.find_var(scope, var.name).is_some() {
            self.get_mut(scope).shadows.push(var);
        } else {
            self.get_mut(scope).variables.push(var);
        }
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

// ── Resolved module ──────────────────────────────────────────────────

#[derive(Debug)]
pub struct ResolvedModule {
    pub functions: Vec<Function>,
    pub foreigns: Vec<ForeignFunction>,
    pub types: TypeTable,
    pub scopes: Scopes,
    pub module_scope: ScopeId,
}

impl ResolvedModule {
    pub fn type_of(&self, name: Id) -> Option<TyRef> {
        self.scopes.get(self.module_scope).types.get(&name).copied()
    }

    pub fn function(&self, name: Id) -> Option<&Function> {
        self.scopes
            .get(self.module_scope)
            .functions
            .get(&name)
            .map(|&index| &self.functions[index])
    }
}

#[derive(Debug)]
pub struct Function {
    pub name: Id,
    pub scope: ScopeId,
    /// The resolved argument tuple, when the declaration had one.
    pub args: Option<TyRef>,
    /// The declared return type, when the declaration had one.
    pub ret: Option<TyRef>,
    /// The function's own type: its value type for nullary bindings, a
    /// function type otherwise.
    pub ty: TyRef,
    pub body: RExpr,
}

#[derive(Debug)]
pub struct ForeignFunction {
    pub extern_name: Id,
    pub local_name: Id,
    pub ty: TyRef,
    pub convention: ast::Convention,
}

/// A resolved expression. Every node carries its type; `Unknown` marks
/// what this front end does not type itself.
#[derive(Debug)]
pub struct RExpr {
    pub kind: RExprKind,
    pub ty: TyRef,
}

#[derive(Debug)]
pub enum RExprKind {
    Lit(Literal),
    Var(Id),
    Prefix {
        op: Id,
        arg: Box<RExpr>,
    },
    Infix {
        op: Id,
        left: Box<RExpr>,
        right: Box<RExpr>,
    },
    App {
        callee: Box<RExpr>,
        args: Vec<RExpr>,
    },
    Field {
        base: Box<RExpr>,
        app: Box<RExpr>,
    },
    Construct {
        fields: Vec<RExpr>,
    },
    If {
        cond: Box<RExpr>,
        then_branch: Box<RExpr>,
        else_branch: Option<Box<RExpr>>,
    },
    While {
        cond: Box<RExpr>,
        body: Box<RExpr>,
    },
    Case {
        scrutinee: Box<RExpr>,
        alts: Vec<RAlt>,
    },
    Multi(Vec<RExpr>),
    Decl {
        name: Id,
        init: Option<Box<RExpr>>,
        constant: bool,
    },
    Assign {
        target: Box<RExpr>,
        value: Box<RExpr>,
    },
    Coerce {
        expr: Box<RExpr>,
    },
    Format(Vec<RFormatChunk>),
    Lam {
        params: Vec<Id>,
        scope: ScopeId,
        body: Box<RExpr>,
    },
    Unit,
}

#[derive(Debug)]
pub struct RAlt {
    pub pat: Pat,
    pub scope: ScopeId,
    pub body: RExpr,
}

#[derive(Debug)]
pub struct RFormatChunk {
    pub string: Id,
    pub expr: Option<RExpr>,
}

/// Resolve a parsed module. Always returns a module; errors are logged
/// and the affected types become `Unknown`.
pub fn resolve(module: &ast::Module, interner: &mut Interner) -> (ResolvedModule, Vec<Diagnostic>) {
    let mut resolver = Resolver::new(module, interner);
    resolver.run();
    resolver.finish()
}

// ── Resolver internals ───────────────────────────────────────────────

struct Resolver<'a, 'ctx> {
    module: &'a ast::Module,
    interner: &'ctx mut Interner,
    types: TypeTable,
    scopes: Scopes,
    module_scope: ScopeId,
    functions: Vec<Function>,
    foreigns: Vec<ForeignFunction>,
    errors: Vec<Diagnostic>,

    // The Bool primitive has hard-coded constructors.
    true_id: Id,
    false_id: Id,
    bool_id: Id,
}

impl<'a, 'ctx> Resolver<'a, 'ctx> {
    fn new(module: &'a ast::Module, interner: &'ctx mut Interner) -> Self {
        let true_id = interner.intern("True");
        let false_id = interner.intern("False");
        let bool_id = interner.intern("Bool");
        let types = TypeTable::new(interner);
        Resolver {
            module,
            interner,
            types,
            scopes: Scopes::new(),
            module_scope: Scopes::root(),
            functions: Vec::new(),
            foreigns: Vec::new(),
            errors: Vec::new(),
            true_id,
            false_id,
            bool_id,
        }
    }

    fn run(&mut self) {
        let module = self.module;

        // Pass 1: install every declared name into the module scope, so
        // bodies may reference declarations in any order.
        for (index, decl) in module.decls.iter().enumerate() {
            match &decl.kind {
                DeclKind::Data { ty, constrs } => self.install_variant(index, ty, constrs),
                DeclKind::Type { ty, .. } => self.install_alias(index, ty),
                DeclKind::Fun(fun) => {
                    let slot = self.functions.len();
                    let unknown = self.types.unknown();
                    self.functions.push(Function {
                        name: fun.name,
                        scope: self.module_scope,
                        args: None,
                        ret: None,
                        ty: unknown,
                        body: RExpr {
                            kind: RExprKind::Unit,
                            ty: unknown,
                        },
                    });
                    self.scopes
                        .get_mut(self.module_scope)
                        .functions
                        .insert(fun.name, slot);
                }
                DeclKind::Foreign { .. } => {}
            }
        }

        // Pass 2: signatures and bodies, in declaration order.
        let mut next_fun = 0;
        for decl in &module.decls {
            match &decl.kind {
                DeclKind::Fun(fun) => {
                    self.resolve_function(next_fun, fun);
                    next_fun += 1;
                }
                DeclKind::Foreign {
                    extern_name,
                    local_name,
                    ty,
                    convention,
                } => {
                    let resolved = self.resolve_type(self.module_scope, *ty, false, None);
                    self.foreigns.push(ForeignFunction {
                        extern_name: *extern_name,
                        local_name: *local_name,
                        ty: resolved,
                        convention: *convention,
                    });
                    self.scopes.declare(
                        self.module_scope,
                        Variable {
                            name: *local_name,
                            ty: resolved,
                            constant: true,
                        },
                    );
                }
                _ => {}
            }
        }

        // Force every type still pending in the module scope.
        let declared: Vec<TyRef> = self
            .scopes
            .get(self.module_scope)
            .types
            .values()
            .copied()
            .collect();
        for ty in declared {
            self.lazy_resolve(ty);
        }
    }

    fn finish(self) -> (ResolvedModule, Vec<Diagnostic>) {
        (
            ResolvedModule {
                functions: self.functions,
                foreigns: self.foreigns,
                types: self.types,
                scopes: self.scopes,
                module_scope: self.module_scope,
            },
            self.errors,
        )
    }

    fn install_variant(&mut self, index: usize, ty: &ast::SimpleType, constrs: &[ast::Constr]) {
        let unknown = self.types.unknown();
        let ctors: Vec<VarCtor> = constrs
            .iter()
            .map(|c| VarCtor {
                name: c.name,
                contents: Vec::new(),
                data_type: unknown,
            })
            .collect();
        let variant = self.types.add(
            Ty::Variant(VariantTy {
                name: ty.name,
                generics: ty.params.len() as u32,
                scope: self.module_scope,
                decl: Some(index),
                ctors,
            }),
            false,
        );
        let scope = self.scopes.get_mut(self.module_scope);
        scope.types.insert(ty.name, variant);
        for (ci, constr) in constrs.iter().enumerate() {
            scope.constructors.insert(constr.name, (variant, ci as u32));
        }
    }

    fn install_alias(&mut self, index: usize, ty: &ast::SimpleType) {
        let alias = self.types.add(
            Ty::Alias(AliasTy {
                name: ty.name,
                generics: ty.params.len() as u32,
                scope: self.module_scope,
                state: AliasState::Unresolved(index),
            }),
            false,
        );
        self.scopes
            .get_mut(self.module_scope)
            .types
            .insert(ty.name, alias);
    }

    // ── Functions ────────────────────────────────────────────────────

    fn resolve_function(&mut self, index: usize, fun: &ast::FunDecl) {
        let scope = self.scopes.create(self.module_scope);

        let args = fun
            .args
            .map(|a| self.resolve_type(self.module_scope, a, false, None));
        let mut arg_tys = Vec::new();
        if let Some(args) = args {
            if let Ty::Tuple(tuple) = &self.types.get(args).kind {
                let fields = tuple.fields.clone();
                for field in fields {
                    arg_tys.push(field.ty);
                    if !field.name.is_none() {
                        self.scopes.declare(
                            scope,
                            Variable {
                                name: field.name,
                                ty: field.ty,
                                constant: false,
                            },
                        );
                    }
                }
            }
        }

        let ret = fun
            .ret
            .map(|r| self.resolve_type(self.module_scope, r, false, None));
        let body = self.resolve_expr(scope, fun.body);

        let ty = if fun.args.is_none() && fun.ret.is_none() {
            // A nullary binding's type is its value's type.
            body.ty
        } else {
            let ret_ty = ret.unwrap_or(body.ty);
            let resolved = arg_tys.iter().all(|&a| self.types.get(a).resolved)
                && self.types.get(ret_ty).resolved;
            self.types.add(
                Ty::Fun(FunTy {
                    args: arg_tys,
                    ret: ret_ty,
                }),
                resolved,
            )
        };

        let function = &mut self.functions[index];
        function.scope = scope;
        function.args = args;
        function.ret = ret;
        function.ty = ty;
        function.body = body;
    }

    // ── Type resolution ──────────────────────────────────────────────

    /// Resolve an AST type under a scope. `constructor` selects the
    /// constructor namespace; `tscope` is the type head whose parameters
    /// bind generic names.
    fn resolve_type(
        &mut self,
        scope: ScopeId,
        ty: ast::TypeId,
        constructor: bool,
        tscope: Option<&ast::SimpleType>,
    ) -> TyRef {
        let module = self.module;
        let node = module.ast.ty(ty);
        match &node.kind {
            TypeKind::Unit => self.types.unit(),
            TypeKind::Ptr(inner) => {
                let inner = self.resolve_type(scope, *inner, constructor, tscope);
                self.types.get_ptr(inner)
            }
            TypeKind::Tup(fields) => self.resolve_tuple(scope, fields, tscope),
            TypeKind::Gen(name) => {
                if let Some(head) = tscope {
                    // The index is the 0-based position in declaration order.
                    if let Some(position) = head.params.iter().position(|&p| p == *name) {
                        return self.types.add(
                            Ty::Gen(GenTy {
                                index: position as u32,
                                constraints: Vec::new(),
                                type_constraint: None,
                            }),
                            false,
                        );
                    }
                }
                self.error("undefined generic type", node.span);
                self.types.unknown()
            }
            TypeKind::App { base, args } => {
                let base_ty = self.resolve_type(scope, *base, constructor, tscope);
                if let Ty::Gen(gen) = &self.types.get(base_ty).kind {
                    // The base is itself a parameter: keep the application
                    // unevaluated until instantiation substitutes it.
                    let base_index = gen.index;
                    self.types.add(
                        Ty::App(AppTy {
                            base_index,
                            apps: args.clone(),
                        }),
                        false,
                    )
                } else {
                    self.instantiate_type(scope, base_ty, args, tscope, node.span)
                }
            }
            TypeKind::Fun { args, ret } => {
                let mut arg_tys = Vec::new();
                for field in args {
                    let t = match field.ty {
                        Some(t) => self.resolve_type(scope, t, false, tscope),
                        None => self.types.unknown(),
                    };
                    arg_tys.push(t);
                }
                let ret = self.resolve_type(scope, *ret, false, tscope);
                let resolved = arg_tys.iter().all(|&t| self.types.get(t).resolved)
                    && self.types.get(ret).resolved;
                self.types.add(Ty::Fun(FunTy { args: arg_tys, ret }), resolved)
            }
            TypeKind::Con(name) => {
                if constructor {
                    if let Some((parent, _)) = self.scopes.find_constructor(scope, *name) {
                        return self.lazy_resolve(parent);
                    }
                    // The Bool primitive has separate constructors.
                    if *name == self.true_id || *name == self.false_id {
                        return self.types.bool_ty();
                    }
                    if *name == self.bool_id {
                        self.error(
                            "'Bool' cannot be used as a constructor; use True or False instead",
                            node.span,
                        );
                        return self.types.unknown();
                    }
                    if let Some(&prim) = self.types.prim_map.get(name) {
                        return prim;
                    }
                    self.types.unknown()
                } else {
                    if let Some(found) = self.scopes.find_type(scope, *name) {
                        return self.lazy_resolve(found);
                    }
                    if let Some(&prim) = self.types.prim_map.get(name) {
                        return prim;
                    }
                    self.types.unknown()
                }
            }
        }
    }

    fn resolve_tuple(
        &mut self,
        scope: ScopeId,
        fields: &[ast::TupleField],
        tscope: Option<&ast::SimpleType>,
    ) -> TyRef {
        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            let ty = match field.ty {
                Some(t) => self.resolve_type(scope, t, false, tscope),
                None => self.types.unknown(),
            };
            resolved.push((field.name.unwrap_or(Id::NONE), ty));
        }
        self.types.get_tuple(&resolved)
    }

    /// Force a pending alias or variant; anything else passes through.
    /// Idempotent: a second call finds nothing pending.
    fn lazy_resolve(&mut self, ty: TyRef) -> TyRef {
        let pending_alias = match &self.types.get(ty).kind {
            Ty::Alias(alias) => matches!(alias.state, AliasState::Unresolved(_)),
            _ => false,
        };
        if pending_alias {
            self.resolve_alias(ty);
            return ty;
        }
        let pending_variant = match &self.types.get(ty).kind {
            Ty::Variant(variant) => variant.decl.is_some(),
            _ => false,
        };
        if pending_variant {
            self.resolve_variant(ty);
        }
        ty
    }

    fn resolve_alias(&mut self, ty: TyRef) {
        let (scope, decl) = match &self.types.get(ty).kind {
            Ty::Alias(alias) => match alias.state {
                AliasState::Unresolved(decl) => (alias.scope, decl),
                AliasState::Resolved(_) => return,
            },
            _ => return,
        };

        // Mark in progress first so a reference cycle terminates.
        let unknown = self.types.unknown();
        if let Ty::Alias(alias) = &mut self.types.get_mut(ty).kind {
            alias.state = AliasState::Resolved(unknown);
        }

        let module = self.module;
        let DeclKind::Type { ty: head, target } = &module.decls[decl].kind else {
            return;
        };
        let target_ty = self.resolve_type(scope, *target, false, Some(head));

        let resolved = self.types.get(target_ty).resolved;
        if let Ty::Alias(alias) = &mut self.types.get_mut(ty).kind {
            alias.state = AliasState::Resolved(target_ty);
        }
        let entry = self.types.get_mut(ty);
        entry.canonical = target_ty;
        entry.resolved = resolved;
    }

    fn resolve_variant(&mut self, ty: TyRef) {
        let (scope, decl) = match &self.types.get(ty).kind {
            Ty::Variant(variant) => match variant.decl {
                Some(decl) => (variant.scope, decl),
                None => return,
            },
            _ => return,
        };

        // Clear the pending marker first; constructor contents may refer
        // back to the variant itself.
        if let Ty::Variant(variant) = &mut self.types.get_mut(ty).kind {
            variant.decl = None;
        }

        let module = self.module;
        let DeclKind::Data { ty: head, constrs } = &module.decls[decl].kind else {
            return;
        };

        let mut all_resolved = true;
        let mut built = Vec::with_capacity(constrs.len());
        for constr in constrs {
            let mut contents = Vec::with_capacity(constr.types.len());
            for &arg in &constr.types {
                let resolved = self.resolve_type(scope, arg, false, Some(head));
                if !self.types.get(resolved).resolved {
                    all_resolved = false;
                }
                contents.push(resolved);
            }
            let data_type = self.ctor_data_type(&contents);
            built.push((contents, data_type));
        }

        if let Ty::Variant(variant) = &mut self.types.get_mut(ty).kind {
            for (ctor, (contents, data_type)) in variant.ctors.iter_mut().zip(built) {
                ctor.contents = contents;
                ctor.data_type = data_type;
            }
        }
        self.types.get_mut(ty).resolved = all_resolved;
    }

    /// Unit for no fields, the field itself for one, a tuple otherwise.
    fn ctor_data_type(&mut self, contents: &[TyRef]) -> TyRef {
        match contents.len() {
            0 => self.types.unit(),
            1 => contents[0],
            _ => {
                let fields: Vec<(Id, TyRef)> = contents.iter().map(|&c| (Id::NONE, c)).collect();
                self.types.get_tuple(&fields)
            }
        }
    }

    /// Instantiate a generic alias or variant with the given arguments.
    /// On arity mismatch the base is returned unchanged after logging.
    fn instantiate_type(
        &mut self,
        scope: ScopeId,
        base: TyRef,
        apps: &[ast::TypeId],
        tscope: Option<&ast::SimpleType>,
        span: Span,
    ) -> TyRef {
        self.lazy_resolve(base);
        let generics = match &self.types.get(base).kind {
            Ty::Alias(alias) => alias.generics,
            Ty::Variant(variant) => variant.generics,
            _ => {
                self.error("must be a generic type", span);
                return base;
            }
        };
        if apps.len() as u32 != generics {
            self.error(
                format!(
                    "generic arity mismatch: the type takes {} arguments but {} were applied",
                    generics,
                    apps.len()
                ),
                span,
            );
            return base;
        }

        let mut subst = Vec::with_capacity(apps.len());
        for &app in apps {
            subst.push(self.resolve_type(scope, app, false, tscope));
        }
        self.map_type(base, &subst, scope, tscope)
    }

    /// Rebuild a type with every generic parameter substituted. Tuples,
    /// pointers, and lvalues re-intern; variant constructor lists are
    /// deep-cloned so constraints on one instantiation cannot leak into
    /// another.
    fn map_type(
        &mut self,
        ty: TyRef,
        subst: &[TyRef],
        scope: ScopeId,
        tscope: Option<&ast::SimpleType>,
    ) -> TyRef {
        let kind = self.types.get(ty).kind.clone();
        match kind {
            Ty::Alias(_) => {
                let target = self.types.canonical(ty);
                if target == ty {
                    return ty;
                }
                self.map_type(target, subst, scope, tscope)
            }
            Ty::Tuple(tuple) => {
                let mut fields = Vec::with_capacity(tuple.fields.len());
                for field in &tuple.fields {
                    fields.push((field.name, self.map_type(field.ty, subst, scope, tscope)));
                }
                self.types.get_tuple(&fields)
            }
            Ty::Variant(variant) => {
                let mut all_resolved = true;
                let mut ctors = Vec::with_capacity(variant.ctors.len());
                for ctor in &variant.ctors {
                    let mut contents = Vec::with_capacity(ctor.contents.len());
                    for &c in &ctor.contents {
                        let mapped = self.map_type(c, subst, scope, tscope);
                        if !self.types.get(mapped).resolved {
                            all_resolved = false;
                        }
                        contents.push(mapped);
                    }
                    let data_type = self.ctor_data_type(&contents);
                    ctors.push(VarCtor {
                        name: ctor.name,
                        contents,
                        data_type,
                    });
                }
                self.types.add(
                    Ty::Variant(VariantTy {
                        name: variant.name,
                        generics: variant.generics,
                        scope: variant.scope,
                        decl: None,
                        ctors,
                    }),
                    all_resolved,
                )
            }
            Ty::Gen(gen) => subst
                .get(gen.index as usize)
                .copied()
                .unwrap_or_else(|| self.types.unknown()),
            Ty::App(app) => {
                let base = subst
                    .get(app.base_index as usize)
                    .copied()
                    .unwrap_or_else(|| self.types.unknown());
                let span = app
                    .apps
                    .first()
                    .map(|&a| self.module.ast.ty(a).span)
                    .unwrap_or(Span::new(0, 0));
                self.instantiate_type(scope, base, &app.apps, tscope, span)
            }
            Ty::Ptr(inner) => {
                let mapped = self.map_type(inner, subst, scope, tscope);
                self.types.get_ptr(mapped)
            }
            Ty::Lvalue(inner) => {
                let mapped = self.map_type(inner, subst, scope, tscope);
                self.types.get_lvalue(mapped)
            }
            Ty::Fun(fun) => {
                let args: Vec<TyRef> = fun
                    .args
                    .iter()
                    .map(|&a| self.map_type(a, subst, scope, tscope))
                    .collect();
                let ret = self.map_type(fun.ret, subst, scope, tscope);
                let resolved = args.iter().all(|&a| self.types.get(a).resolved)
                    && self.types.get(ret).resolved;
                self.types.add(Ty::Fun(FunTy { args, ret }), resolved)
            }
            // Arrays and maps are never produced by this front end.
            _ => ty,
        }
    }

    // ── Expression lowering ──────────────────────────────────────────

    fn resolve_expr(&mut self, scope: ScopeId, expr: ast::ExprId) -> RExpr {
        let module = self.module;
        let node = module.ast.expr(expr);
        match &node.kind {
            ExprKind::Lit(lit) => {
                let ty = match lit {
                    Literal::Int(_) => self.types.int(),
                    Literal::Float(_) => self.types.float(),
                    Literal::Char(_) => self.types.char_ty(),
                    Literal::String(_) => self.types.string(),
                };
                RExpr {
                    kind: RExprKind::Lit(*lit),
                    ty,
                }
            }
            ExprKind::Var(name) => {
                let ty = if let Some(var) = self.scopes.find_var(scope, *name) {
                    var.ty
                } else if let Some(index) = self.scopes.find_function(scope, *name) {
                    self.functions[index].ty
                } else {
                    let message =
                        format!("undefined variable '{}'", self.interner.resolve(*name));
                    self.error(message, node.span);
                    self.types.unknown()
                };
                RExpr {
                    kind: RExprKind::Var(*name),
                    ty,
                }
            }
            ExprKind::Prefix { op, arg } => {
                let arg = self.resolve_expr(scope, *arg);
                RExpr {
                    kind: RExprKind::Prefix {
                        op: *op,
                        arg: Box::new(arg),
                    },
                    ty: self.types.unknown(),
                }
            }
            ExprKind::Infix { .. } => self.resolve_infix(scope, expr),
            ExprKind::App { callee, args } => {
                let callee = self.resolve_expr(scope, *callee);
                let args: Vec<RExpr> = args.iter().map(|&a| self.resolve_expr(scope, a)).collect();
                let canon = self.types.canonical(callee.ty);
                let ty = match &self.types.get(canon).kind {
                    Ty::Fun(fun) => fun.ret,
                    // Applying a constructor produces its variant.
                    Ty::Variant(_) => callee.ty,
                    _ => self.types.unknown(),
                };
                RExpr {
                    kind: RExprKind::App {
                        callee: Box::new(callee),
                        args,
                    },
                    ty,
                }
            }
            ExprKind::Field { base, app } => {
                let base = self.resolve_expr(scope, *base);
                // The right-hand side is a member reference, not a free
                // variable; avoid resolving bare names against the scope.
                let mut app_expr = match &module.ast.expr(*app).kind {
                    ExprKind::Var(name) => RExpr {
                        kind: RExprKind::Var(*name),
                        ty: self.types.unknown(),
                    },
                    _ => self.resolve_expr(scope, *app),
                };

                // Project a named tuple field when statically known.
                let mut ty = self.types.unknown();
                if let RExprKind::Var(name) = &app_expr.kind {
                    let name = *name;
                    let canon = self.types.canonical(base.ty);
                    if let Ty::Tuple(tuple) = &self.types.get(canon).kind {
                        if let Some(field) = tuple.fields.iter().find(|f| f.name == name) {
                            ty = field.ty;
                        }
                    }
                }
                app_expr.ty = ty;
                RExpr {
                    kind: RExprKind::Field {
                        base: Box::new(base),
                        app: Box::new(app_expr),
                    },
                    ty,
                }
            }
            ExprKind::Construct { ty: con, fields } => {
                let values: Vec<RExpr> = fields
                    .iter()
                    .filter_map(|f| f.default)
                    .map(|e| self.resolve_expr(scope, e))
                    .collect();
                let ty = match con {
                    Some(t) => self.resolve_type(scope, *t, true, None),
                    None => {
                        // A tuple literal: its type is the interned tuple
                        // over the field values.
                        let shape: Vec<(Id, TyRef)> = fields
                            .iter()
                            .zip(&values)
                            .map(|(f, v)| (f.name.unwrap_or(Id::NONE), v.ty))
                            .collect();
                        self.types.get_tuple(&shape)
                    }
                };
                RExpr {
                    kind: RExprKind::Construct { fields: values },
                    ty,
                }
            }
            ExprKind::Nested(inner) => self.resolve_expr(scope, *inner),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.resolve_expr(scope, *cond);
                let then_branch = self.resolve_expr(scope, *then_branch);
                let else_branch = else_branch.map(|e| Box::new(self.resolve_expr(scope, e)));
                let ty = if else_branch.is_some() {
                    then_branch.ty
                } else {
                    self.types.unit()
                };
                RExpr {
                    kind: RExprKind::If {
                        cond: Box::new(cond),
                        then_branch: Box::new(then_branch),
                        else_branch,
                    },
                    ty,
                }
            }
            ExprKind::While { cond, body } => {
                let cond = self.resolve_expr(scope, *cond);
                let body = self.resolve_expr(scope, *body);
                RExpr {
                    kind: RExprKind::While {
                        cond: Box::new(cond),
                        body: Box::new(body),
                    },
                    ty: self.types.unit(),
                }
            }
            ExprKind::Case { scrutinee, alts } => {
                let scrutinee = self.resolve_expr(scope, *scrutinee);
                let mut resolved_alts = Vec::with_capacity(alts.len());
                for alt in alts {
                    let alt_scope = self.scopes.create(scope);
                    self.declare_pattern(alt_scope, &alt.pat, scrutinee.ty);
                    let body = self.resolve_expr(alt_scope, alt.body);
                    resolved_alts.push(RAlt {
                        pat: alt.pat.clone(),
                        scope: alt_scope,
                        body,
                    });
                }
                let ty = resolved_alts
                    .first()
                    .map(|a| a.body.ty)
                    .unwrap_or_else(|| self.types.unknown());
                RExpr {
                    kind: RExprKind::Case {
                        scrutinee: Box::new(scrutinee),
                        alts: resolved_alts,
                    },
                    ty,
                }
            }
            ExprKind::Multi(stmts) => {
                let stmts: Vec<RExpr> = stmts.iter().map(|&s| self.resolve_expr(scope, s)).collect();
                let ty = stmts.last().map(|s| s.ty).unwrap_or_else(|| self.types.unit());
                RExpr {
                    kind: RExprKind::Multi(stmts),
                    ty,
                }
            }
            ExprKind::Decl {
                name,
                init,
                constant,
            } => {
                let init = init.map(|e| self.resolve_expr(scope, e));
                let var_ty = init
                    .as_ref()
                    .map(|e| e.ty)
                    .unwrap_or_else(|| self.types.unknown());
                self.scopes.declare(
                    scope,
                    Variable {
                        name: *name,
                        ty: var_ty,
                        constant: *constant,
                    },
                );
                RExpr {
                    kind: RExprKind::Decl {
                        name: *name,
                        init: init.map(Box::new),
                        constant: *constant,
                    },
                    ty: self.types.unit(),
                }
            }
            ExprKind::Assign { target, value } => {
                let target = self.resolve_expr(scope, *target);
                let value = self.resolve_expr(scope, *value);
                RExpr {
                    kind: RExprKind::Assign {
                        target: Box::new(target),
                        value: Box::new(value),
                    },
                    ty: self.types.unit(),
                }
            }
            ExprKind::Coerce { expr, ty } => {
                let inner = self.resolve_expr(scope, *expr);
                let coerced = self.resolve_type(scope, *ty, false, None);
                RExpr {
                    kind: RExprKind::Coerce {
                        expr: Box::new(inner),
                    },
                    ty: coerced,
                }
            }
            ExprKind::Format(chunks) => {
                let chunks: Vec<RFormatChunk> = chunks
                    .iter()
                    .map(|chunk| RFormatChunk {
                        string: chunk.string,
                        expr: chunk.expr.map(|e| self.resolve_expr(scope, e)),
                    })
                    .collect();
                RExpr {
                    kind: RExprKind::Format(chunks),
                    ty: self.types.string(),
                }
            }
            ExprKind::Lam { params, body } => {
                let lam_scope = self.scopes.create(scope);
                let mut param_tys = Vec::with_capacity(params.len());
                for &param in params {
                    let unknown = self.types.unknown();
                    self.scopes.declare(
                        lam_scope,
                        Variable {
                            name: param,
                            ty: unknown,
                            constant: false,
                        },
                    );
                    param_tys.push(unknown);
                }
                let body = self.resolve_expr(lam_scope, *body);
                let ty = self.types.add(
                    Ty::Fun(FunTy {
                        args: param_tys,
                        ret: body.ty,
                    }),
                    false,
                );
                RExpr {
                    kind: RExprKind::Lam {
                        params: params.clone(),
                        scope: lam_scope,
                        body: Box::new(body),
                    },
                    ty,
                }
            }
            ExprKind::Unit => RExpr {
                kind: RExprKind::Unit,
                ty: self.types.unit(),
            },
        }
    }

    /// Bind the variables a pattern introduces into the arm's scope.
    fn declare_pattern(&mut self, scope: ScopeId, pat: &Pat, scrutinee_ty: TyRef) {
        match pat {
            Pat::Var(name) => {
                self.scopes.declare(
                    scope,
                    Variable {
                        name: *name,
                        ty: scrutinee_ty,
                        constant: true,
                    },
                );
            }
            Pat::Con(name, fields) => {
                let contents: Vec<TyRef> = match self.scopes.find_constructor(scope, *name) {
                    Some((variant, index)) => {
                        self.lazy_resolve(variant);
                        match &self.types.get(variant).kind {
                            Ty::Variant(v) => v
                                .ctors
                                .get(index as usize)
                                .map(|c| c.contents.clone())
                                .unwrap_or_default(),
                            _ => Vec::new(),
                        }
                    }
                    None => Vec::new(),
                };
                for (i, sub) in fields.iter().enumerate() {
                    let ty = contents
                        .get(i)
                        .copied()
                        .unwrap_or_else(|| self.types.unknown());
                    self.declare_pattern(scope, sub, ty);
                }
            }
            Pat::Wildcard | Pat::Lit(_) => {}
        }
    }

    /// Re-parent a right-leaning infix chain using the fixity table,
    /// then lower the operands.
    fn resolve_infix(&mut self, scope: ScopeId, expr: ast::ExprId) -> RExpr {
        let module = self.module;

        // Flatten the spine the parser produced.
        let mut operands = Vec::new();
        let mut ops = Vec::new();
        let mut cursor = expr;
        loop {
            match &module.ast.expr(cursor).kind {
                ExprKind::Infix { op, left, right } => {
                    operands.push(*left);
                    ops.push(*op);
                    cursor = *right;
                }
                _ => {
                    operands.push(cursor);
                    break;
                }
            }
        }

        // Shunting-yard: reduce while the stacked operator binds at least
        // as tightly (strictly tighter for right-associative operators).
        let unknown = self.types.unknown();
        let mut out: Vec<RExpr> = Vec::new();
        let mut stack: Vec<Id> = Vec::new();
        let mut operand_iter = operands.into_iter();
        let first = operand_iter.next().expect("an infix chain has an operand");
        out.push(self.resolve_expr(scope, first));

        for op in ops {
            let fixity = module.fixity(op);
            while let Some(&top) = stack.last() {
                let top_fixity = module.fixity(top);
                let reduce = top_fixity.prec > fixity.prec
                    || (top_fixity.prec == fixity.prec && fixity.kind != FixityKind::Right);
                if !reduce {
                    break;
                }
                stack.pop();
                reduce_infix(&mut out, top, unknown);
            }
            stack.push(op);
            let operand = operand_iter.next().expect("one operand per operator");
            out.push(self.resolve_expr(scope, operand));
        }
        while let Some(op) = stack.pop() {
            reduce_infix(&mut out, op, unknown);
        }
        out.pop().expect("the reduction leaves one expression")
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(Diagnostic::new(message, span));
    }
}

fn reduce_infix(out: &mut Vec<RExpr>, op: Id, ty: TyRef) {
    let right = out.pop().expect("infix reduction needs a right operand");
    let left = out.pop().expect("infix reduction needs a left operand");
    out.push(RExpr {
        kind: RExprKind::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        ty,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn resolve_src(source: &str) -> (ResolvedModule, Vec<Diagnostic>, Interner) {
        let mut interner = Interner::new();
        let (module, parse_errors) = Parser::new(source, &mut interner).parse();
        assert!(parse_errors.is_empty(), "parse errors: {:?}", parse_errors);
        let (resolved, errors) = resolve(&module, &mut interner);
        (resolved, errors, interner)
    }

    fn resolve_ok(source: &str) -> (ResolvedModule, Interner) {
        let (resolved, errors, interner) = resolve_src(source);
        assert!(errors.is_empty(), "resolve errors: {:?}", errors);
        (resolved, interner)
    }

    #[test]
    fn value_bindings_resolve_to_the_integer_primitive() {
        let (resolved, mut interner) = resolve_ok("f = 1\ng = f");
        let f = resolved.function(interner.intern("f")).unwrap();
        let g = resolved.function(interner.intern("g")).unwrap();
        assert_eq!(f.ty, resolved.types.int());
        assert_eq!(g.ty, resolved.types.int());
        assert!(matches!(g.body.kind, RExprKind::Var(_)));
    }

    #[test]
    fn structurally_equal_aliases_share_one_tuple() {
        let source = "type A = {x: Int, y: Int}\ntype B = {x: Int, y: Int}\ntype C = {a: Int, b: Int}";
        let (resolved, mut interner) = resolve_ok(source);
        let a = resolved.type_of(interner.intern("A")).unwrap();
        let b = resolved.type_of(interner.intern("B")).unwrap();
        let c = resolved.type_of(interner.intern("C")).unwrap();
        assert_eq!(resolved.types.canonical(a), resolved.types.canonical(b));
        assert_ne!(resolved.types.canonical(a), resolved.types.canonical(c));
    }

    #[test]
    fn variant_constructors_carry_their_data_types() {
        let (resolved, mut interner) = resolve_ok("data Maybe a = Just a | Nothing");
        let maybe = resolved.type_of(interner.intern("Maybe")).unwrap();
        let Ty::Variant(variant) = &resolved.types.get(maybe).kind else {
            panic!("expected a variant type");
        };
        assert_eq!(variant.ctors.len(), 2);

        // `Just a` holds the 0th generic parameter.
        let just = &variant.ctors[0];
        assert!(matches!(
            &resolved.types.get(just.data_type).kind,
            Ty::Gen(gen) if gen.index == 0
        ));

        // `Nothing` holds unit.
        let nothing = &variant.ctors[1];
        assert_eq!(nothing.data_type, resolved.types.unit());

        // The variant itself is still unresolved (it is generic).
        assert!(!resolved.types.get(maybe).resolved);
    }

    #[test]
    fn constructor_lookup_returns_the_variant() {
        let source = "data Maybe a = Just a | Nothing";
        let mut interner = Interner::new();
        let (mut module, parse_errors) = Parser::new(source, &mut interner).parse();
        assert!(parse_errors.is_empty());

        // Build a `Just` reference to resolve in constructor context.
        let just = interner.intern("Just");
        let con = module.ast.add_type(ast::Type {
            kind: TypeKind::Con(just),
            span: Span::new(0, 0),
        });

        let mut resolver = Resolver::new(&module, &mut interner);
        resolver.run();
        let resolved_con = resolver.resolve_type(resolver.module_scope, con, true, None);
        let maybe = resolver
            .scopes
            .get(resolver.module_scope)
            .types
            .values()
            .copied()
            .next()
            .unwrap();
        assert_eq!(resolved_con, maybe);
        assert!(resolver.errors.is_empty());
    }

    #[test]
    fn alias_resolution_is_idempotent() {
        let source = "type A = {x: Int}";
        let mut interner = Interner::new();
        let (module, parse_errors) = Parser::new(source, &mut interner).parse();
        assert!(parse_errors.is_empty());

        let a_name = interner.intern("A");
        let mut resolver = Resolver::new(&module, &mut interner);
        resolver.run();
        let a = resolver.scopes.get(resolver.module_scope).types[&a_name];

        let first = resolver.types.canonical(a);
        resolver.lazy_resolve(a);
        resolver.lazy_resolve(a);
        assert_eq!(resolver.types.canonical(a), first);
        assert!(resolver.errors.is_empty());
    }

    #[test]
    fn generic_instantiation_substitutes_parameters() {
        let source = "type Pair a b = {a, b}\ntype IP = Pair Int Float";
        let (resolved, mut interner) = resolve_ok(source);
        let ip = resolved.type_of(interner.intern("IP")).unwrap();
        let tuple = resolved.types.canonical(ip);
        let Ty::Tuple(t) = &resolved.types.get(tuple).kind else {
            panic!("expected the instantiation to be a tuple");
        };
        assert_eq!(t.fields.len(), 2);
        assert_eq!(t.fields[0].ty, resolved.types.int());
        assert_eq!(t.fields[1].ty, resolved.types.float());
        assert!(resolved.types.get(tuple).resolved);
    }

    #[test]
    fn arity_mismatch_is_logged_and_returns_the_base() {
        let source = "type Pair a b = {a, b}\ntype IP = Pair Int";
        let (resolved, errors, mut interner) = resolve_src(source);
        assert!(errors.iter().any(|e| e.message.contains("arity mismatch")));
        // IP falls back to the unresolved generic base.
        let ip = resolved.type_of(interner.intern("IP")).unwrap();
        let pair = resolved.type_of(interner.intern("Pair")).unwrap();
        assert_eq!(resolved.types.canonical(ip), resolved.types.canonical(pair));
        assert!(!resolved.types.get(ip).resolved);
    }

    #[test]
    fn variant_instantiation_deep_clones_constructors() {
        let source = "data Maybe a = Just a | Nothing\ntype MI = Maybe Int";
        let (resolved, mut interner) = resolve_ok(source);
        let maybe = resolved.type_of(interner.intern("Maybe")).unwrap();
        let mi = resolved.types.canonical(resolved.type_of(interner.intern("MI")).unwrap());
        assert_ne!(mi, maybe);

        let Ty::Variant(instance) = &resolved.types.get(mi).kind else {
            panic!("expected a variant instantiation");
        };
        assert_eq!(instance.ctors[0].contents, vec![resolved.types.int()]);
        assert_eq!(instance.ctors[0].data_type, resolved.types.int());
        assert!(resolved.types.get(mi).resolved);

        // The generic original is untouched.
        let Ty::Variant(original) = &resolved.types.get(maybe).kind else {
            panic!("expected the original variant");
        };
        assert!(matches!(
            &resolved.types.get(original.ctors[0].data_type).kind,
            Ty::Gen(_)
        ));
    }

    #[test]
    fn applying_a_non_generic_type_is_an_error() {
        let (_, errors, _) = resolve_src("type T = Int Int");
        assert!(errors.iter().any(|e| e.message.contains("must be a generic type")));
    }

    #[test]
    fn applying_a_parameterless_alias_is_an_arity_error() {
        let (_, errors, _) = resolve_src("type B = {x: Int}\ntype T = B Int");
        assert!(errors.iter().any(|e| e.message.contains("arity mismatch")));
    }

    #[test]
    fn undefined_generic_parameter_is_an_error() {
        let (_, errors, _) = resolve_src("type T = {x: a}");
        assert!(errors
            .iter()
            .any(|e| e.message.contains("undefined generic type")));
    }

    #[test]
    fn true_and_false_construct_bool() {
        let (resolved, mut interner) = resolve_ok("t = True");
        let t = resolved.function(interner.intern("t")).unwrap();
        assert_eq!(t.ty, resolved.types.bool_ty());
    }

    #[test]
    fn bool_as_a_constructor_is_an_error() {
        let (_, errors, _) = resolve_src("t = Bool");
        assert!(errors
            .iter()
            .any(|e| e.message.contains("cannot be used as a constructor")));
    }

    #[test]
    fn unknown_type_names_fall_back_to_the_sentinel() {
        let (resolved, errors, mut interner) = resolve_src("type T = Mystery");
        assert!(errors.is_empty());
        let t = resolved.type_of(interner.intern("T")).unwrap();
        assert_eq!(resolved.types.canonical(t), resolved.types.unknown());
    }

    #[test]
    fn shadows_are_preferred_in_lookup() {
        let mut interner = Interner::new();
        let table = TypeTable::new(&mut interner);
        let x = interner.intern("x");
        let int = table.int();
        let float = table.float();

        let mut scopes = Scopes::new();
        let root = Scopes::root();
        let inner = scopes.create(root);

        scopes.declare(
            root,
            Variable {
                name: x,
                ty: int,
                constant: true,
            },
        );
        // The inner declaration shadows the outer name.
        scopes.declare(
            inner,
            Variable {
                name: x,
                ty: float,
                constant: true,
            },
        );

        assert_eq!(scopes.find_var(inner, x).unwrap().ty, float);
        assert_eq!(scopes.find_var(root, x).unwrap().ty, int);
        assert!(scopes.get(inner).shadows.len() == 1);
        assert!(scopes.find_local_var(root, x).is_some());
    }

    #[test]
    fn default_fixity_re_parents_left_associative() {
        let (resolved, mut interner) = resolve_ok("a = 1\nb = 2\nc = 3\nr = a - b - c");
        let r = resolved.function(interner.intern("r")).unwrap();
        let RExprKind::Infix { left, right, .. } = &r.body.kind else {
            panic!("expected an infix expression");
        };
        // `(a - b) - c`: the left child is the nested chain.
        assert!(matches!(left.kind, RExprKind::Infix { .. }));
        assert!(matches!(right.kind, RExprKind::Var(_)));
    }

    #[test]
    fn declared_right_associativity_is_respected() {
        let (resolved, mut interner) =
            resolve_ok("infixr 5 ^\na = 1\nb = 2\nc = 3\nr = a ^ b ^ c");
        let r = resolved.function(interner.intern("r")).unwrap();
        let RExprKind::Infix { left, right, .. } = &r.body.kind else {
            panic!("expected an infix expression");
        };
        assert!(matches!(left.kind, RExprKind::Var(_)));
        assert!(matches!(right.kind, RExprKind::Infix { .. }));
    }

    #[test]
    fn precedence_re_parents_mixed_operators() {
        let source = "infixl 6 +\ninfixl 7 *\na = 1\nb = 2\nc = 3\nr = a + b * c";
        let (resolved, mut interner) = resolve_ok(source);
        let plus = interner.intern("+");
        let r = resolved.function(interner.intern("r")).unwrap();
        let RExprKind::Infix { op, right, .. } = &r.body.kind else {
            panic!("expected an infix expression");
        };
        // `a + (b * c)`: the low-precedence operator is the root.
        assert_eq!(*op, plus);
        assert!(matches!(right.kind, RExprKind::Infix { .. }));
    }

    #[test]
    fn function_signatures_bind_parameters() {
        let (resolved, mut interner) = resolve_ok("add {a: Int, b: Int} -> Int = a");
        let add = resolved.function(interner.intern("add")).unwrap();
        let Ty::Fun(fun) = &resolved.types.get(add.ty).kind else {
            panic!("expected a function type");
        };
        assert_eq!(fun.args, vec![resolved.types.int(), resolved.types.int()]);
        assert_eq!(fun.ret, resolved.types.int());
        // The body resolved `a` against the parameter scope.
        assert_eq!(add.body.ty, resolved.types.int());
    }

    #[test]
    fn field_projection_through_an_alias() {
        let source = "type P = {x: Int, y: Int}\ngetx {p: P} = p.x";
        let (resolved, mut interner) = resolve_ok(source);
        let getx = resolved.function(interner.intern("getx")).unwrap();
        let Ty::Fun(fun) = &resolved.types.get(getx.ty).kind else {
            panic!("expected a function type");
        };
        assert_eq!(fun.ret, resolved.types.int());
    }

    #[test]
    fn case_arms_bind_pattern_variables_in_their_own_scope() {
        let source = "pick {m: Int} = case m of\n  0 -> 1\n  x -> x";
        let (resolved, mut interner) = resolve_ok(source);
        let pick = resolved.function(interner.intern("pick")).unwrap();
        let RExprKind::Case { alts, .. } = &pick.body.kind else {
            panic!("expected a case expression");
        };
        assert_eq!(alts.len(), 2);
        // The second arm's `x` took the scrutinee's type.
        assert_eq!(alts[1].body.ty, resolved.types.int());
        assert_ne!(alts[0].scope, alts[1].scope);
    }

    #[test]
    fn foreign_imports_become_callable_bindings() {
        let source = "foreign import \"puts\" puts : {Int} -> Int\nmain = puts";
        let (resolved, mut interner) = resolve_ok(source);
        assert_eq!(resolved.foreigns.len(), 1);
        let main = resolved.function(interner.intern("main")).unwrap();
        assert!(matches!(
            &resolved.types.get(main.ty).kind,
            Ty::Fun(_)
        ));
    }

    #[test]
    fn interpolated_strings_are_string_typed() {
        let (resolved, mut interner) = resolve_ok("name = \"you\"\ngreet = \"hi {name}!\"");
        let greet = resolved.function(interner.intern("greet")).unwrap();
        assert_eq!(greet.ty, resolved.types.string());
        let RExprKind::Format(chunks) = &greet.body.kind else {
            panic!("expected a format expression");
        };
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].expr.is_none());
        assert!(chunks[1].expr.is_some());
    }

    #[test]
    fn lambdas_get_a_function_type() {
        let (resolved, mut interner) = resolve_ok("id = \\x -> x");
        let id = resolved.function(interner.intern("id")).unwrap();
        assert!(matches!(&resolved.types.get(id.ty).kind, Ty::Fun(f) if f.args.len() == 1));
    }

    #[test]
    fn let_bindings_are_visible_to_later_statements() {
        let source = "f =\n  let x = 1\n      y = 2\n  x";
        let (resolved, mut interner) = resolve_ok(source);
        let f = resolved.function(interner.intern("f")).unwrap();
        // The block's value is the final `x`, typed from its declaration.
        assert_eq!(f.ty, resolved.types.int());
        let RExprKind::Multi(stmts) = &f.body.kind else {
            panic!("expected a statement block");
        };
        assert_eq!(stmts.len(), 2);
    }
}
