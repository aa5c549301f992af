//! Resolved types — the arena and hash-cons tables behind the resolver.
//!
//! Every resolved type lives in the [`TypeTable`] arena and is addressed
//! by a [`TyRef`]. Structural types are canonicalized on construction:
//!
//! - **Tuples** are hash-consed over their ordered (field type, field
//!   name) sequence, so two structurally identical tuples are the *same*
//!   `TyRef` and equality is reference equality. Two tuples with the same
//!   field types but different names stay distinct. Collisions under one
//!   hash are resolved by structural comparison, never by identity.
//! - **Pointers** and **lvalues** are interned against their inner type.
//!
//! Aliases and variants resolve lazily: they are allocated pointing at
//! their declaration and filled in the first time something looks them
//! up. The pending/done distinction is a tagged state, so "resolved but
//! still carrying a declaration" cannot be represented.
//!
//! Each type carries a `resolved` flag (false while it still contains
//! generic parameters or pending references) and a `canonical` reference
//! which points through aliases to their target once known, and to the
//! type itself otherwise.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::ast;
use crate::intern::{Id, Interner};
use crate::resolver::ScopeId;

/// Reference to a resolved type in the [`TypeTable`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TyRef(u32);

/// One resolved type.
#[derive(Debug, Clone)]
pub struct Type {
    pub kind: Ty,
    pub resolved: bool,
    /// Points through a resolved alias to its target; self otherwise.
    pub canonical: TyRef,
}

#[derive(Debug, Clone)]
pub enum Ty {
    Unit,
    /// The sentinel substituted for anything that failed to resolve.
    Unknown,
    Bool,
    Prim(Prim),
    Ptr(TyRef),
    Array(TyRef),
    Map(TyRef, TyRef),
    Tuple(TupleTy),
    Alias(AliasTy),
    Variant(VariantTy),
    Gen(GenTy),
    App(AppTy),
    Lvalue(TyRef),
    Fun(FunTy),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    Int,
    Float,
    String,
    Char,
}

#[derive(Debug, Clone)]
pub struct TupleTy {
    pub fields: Vec<FieldTy>,
}

#[derive(Debug, Clone)]
pub struct FieldTy {
    /// `Id::NONE` when the field is unnamed.
    pub name: Id,
    pub index: u32,
    pub ty: TyRef,
    pub parent: TyRef,
    pub default: Option<ast::ExprId>,
    pub resolved: bool,
}

#[derive(Debug, Clone)]
pub struct AliasTy {
    pub name: Id,
    pub generics: u32,
    pub scope: ScopeId,
    pub state: AliasState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasState {
    /// Index of the declaring `type` item; resolution is pending.
    Unresolved(usize),
    /// Resolution finished (or is underway); the target is canonical.
    Resolved(TyRef),
}

#[derive(Debug, Clone)]
pub struct VariantTy {
    pub name: Id,
    pub generics: u32,
    pub scope: ScopeId,
    /// Index of the declaring `data` item while resolution is pending.
    pub decl: Option<usize>,
    pub ctors: Vec<VarCtor>,
}

/// One alternative of a variant type.
#[derive(Debug, Clone)]
pub struct VarCtor {
    pub name: Id,
    pub contents: Vec<TyRef>,
    /// Unit for a nullary constructor, the single field type otherwise,
    /// or the tuple aggregate of all field types.
    pub data_type: TyRef,
}

#[derive(Debug, Clone)]
pub struct GenTy {
    /// 0-based position in the declaring type head's parameter list.
    pub index: u32,
    pub constraints: Vec<Constraint>,
    pub type_constraint: Option<TyRef>,
}

/// A named constraint attached to a generic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub name: Id,
}

/// An application whose base is itself a generic parameter, kept
/// unevaluated until the surrounding type is instantiated.
#[derive(Debug, Clone)]
pub struct AppTy {
    pub base_index: u32,
    pub apps: Vec<ast::TypeId>,
}

#[derive(Debug, Clone)]
pub struct FunTy {
    pub args: Vec<TyRef>,
    pub ret: TyRef,
}

/// Arena and canonicalization tables for resolved types.
#[derive(Debug)]
pub struct TypeTable {
    types: Vec<Type>,
    tuples: HashMap<u64, Vec<TyRef>>,
    ptrs: HashMap<TyRef, TyRef>,
    lvalues: HashMap<TyRef, TyRef>,

    unit: TyRef,
    unknown: TyRef,
    bool_ty: TyRef,
    int: TyRef,
    float: TyRef,
    string: TyRef,
    char_ty: TyRef,

    /// Primitive type names (`Int`, `Bool`, ...) to their types.
    pub prim_map: HashMap<Id, TyRef>,
}

impl TypeTable {
    pub fn new(interner: &mut Interner) -> Self {
        let mut table = TypeTable {
            types: Vec::new(),
            tuples: HashMap::new(),
            ptrs: HashMap::new(),
            lvalues: HashMap::new(),
            unit: TyRef(0),
            unknown: TyRef(0),
            bool_ty: TyRef(0),
            int: TyRef(0),
            float: TyRef(0),
            string: TyRef(0),
            char_ty: TyRef(0),
            prim_map: HashMap::new(),
        };
        table.unit = table.add(Ty::Unit, true);
        table.unknown = table.add(Ty::Unknown, false);
        table.bool_ty = table.add(Ty::Bool, true);
        table.int = table.add(Ty::Prim(Prim::Int), true);
        table.float = table.add(Ty::Prim(Prim::Float), true);
        table.string = table.add(Ty::Prim(Prim::String), true);
        table.char_ty = table.add(Ty::Prim(Prim::Char), true);

        let prims = [
            ("Int", table.int),
            ("Float", table.float),
            ("String", table.string),
            ("Char", table.char_ty),
            ("Bool", table.bool_ty),
        ];
        for (name, ty) in prims {
            let id = interner.intern(name);
            table.prim_map.insert(id, ty);
        }
        table
    }

    pub fn add(&mut self, kind: Ty, resolved: bool) -> TyRef {
        let r = TyRef(self.types.len() as u32);
        self.types.push(Type {
            kind,
            resolved,
            canonical: r,
        });
        r
    }

    pub fn get(&self, r: TyRef) -> &Type {
        &self.types[r.0 as usize]
    }

    pub fn get_mut(&mut self, r: TyRef) -> &mut Type {
        &mut self.types[r.0 as usize]
    }

    pub fn unit(&self) -> TyRef {
        self.unit
    }

    pub fn unknown(&self) -> TyRef {
        self.unknown
    }

    pub fn bool_ty(&self) -> TyRef {
        self.bool_ty
    }

    pub fn int(&self) -> TyRef {
        self.int
    }

    pub fn float(&self) -> TyRef {
        self.float
    }

    pub fn string(&self) -> TyRef {
        self.string
    }

    pub fn char_ty(&self) -> TyRef {
        self.char_ty
    }

    pub fn is_generic(&self, r: TyRef) -> bool {
        matches!(self.get(r).kind, Ty::Gen(_))
    }

    /// Follow canonical references through resolved aliases. Bounded so a
    /// malformed alias cycle cannot hang the compiler.
    pub fn canonical(&self, r: TyRef) -> TyRef {
        let mut cur = r;
        for _ in 0..self.types.len() {
            let t = self.get(cur);
            if t.canonical == cur {
                return cur;
            }
            cur = t.canonical;
        }
        cur
    }

    // ── Canonicalizing constructors ──────────────────────────────────

    pub fn get_ptr(&mut self, inner: TyRef) -> TyRef {
        if let Some(&r) = self.ptrs.get(&inner) {
            return r;
        }
        let resolved = self.get(inner).resolved;
        let r = self.add(Ty::Ptr(inner), resolved);
        self.ptrs.insert(inner, r);
        r
    }

    pub fn get_lvalue(&mut self, inner: TyRef) -> TyRef {
        if let Some(&r) = self.lvalues.get(&inner) {
            return r;
        }
        let resolved = self.get(inner).resolved;
        let r = self.add(Ty::Lvalue(inner), resolved);
        self.lvalues.insert(inner, r);
        r
    }

    /// Canonicalize a tuple over its ordered (name, type) fields. Returns
    /// the existing representative when one matches structurally.
    pub fn get_tuple(&mut self, fields: &[(Id, TyRef)]) -> TyRef {
        let hash = Self::tuple_hash(fields);
        if let Some(existing) = self.find_tuple(hash, fields) {
            return existing;
        }

        let resolved = fields.iter().all(|&(_, t)| self.get(t).resolved);
        let r = self.add(Ty::Tuple(TupleTy { fields: Vec::new() }), resolved);
        let built: Vec<FieldTy> = fields
            .iter()
            .enumerate()
            .map(|(i, &(name, ty))| FieldTy {
                name,
                index: i as u32,
                ty,
                parent: r,
                default: None,
                resolved: true,
            })
            .collect();
        if let Ty::Tuple(tuple) = &mut self.types[r.0 as usize].kind {
            tuple.fields = built;
        }
        self.tuples.entry(hash).or_default().push(r);
        r
    }

    /// Fold the field types and present field names. Names participate so
    /// that tuples with one memory layout but different names differ.
    fn tuple_hash(fields: &[(Id, TyRef)]) -> u64 {
        let mut hasher = DefaultHasher::new();
        for &(name, ty) in fields {
            ty.0.hash(&mut hasher);
            if !name.is_none() {
                name.raw().hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    fn find_tuple(&self, hash: u64, fields: &[(Id, TyRef)]) -> Option<TyRef> {
        let candidates = self.tuples.get(&hash)?;
        'candidates: for &candidate in candidates {
            let Ty::Tuple(tuple) = &self.get(candidate).kind else {
                continue;
            };
            if tuple.fields.len() != fields.len() {
                continue;
            }
            for (field, &(name, ty)) in tuple.fields.iter().zip(fields) {
                if field.ty != ty || field.name != name {
                    continue 'candidates;
                }
            }
            return Some(candidate);
        }
        None
    }

    // ── Constraints ──────────────────────────────────────────────────

    /// Add a named constraint to a generic type. Calling this on a
    /// non-generic type is a front-end bug.
    pub fn constrain(&mut self, t: TyRef, constraint: Constraint) {
        let canon = self.canonical(t);
        match &mut self.get_mut(canon).kind {
            Ty::Gen(gen) => gen.constraints.push(constraint),
            _ => debug_assert!(false, "constraint applied to a non-generic type"),
        }
    }

    /// Set or merge the type constraint on a generic type. Returns false
    /// when the new bound conflicts with an existing one.
    pub fn constrain_type(&mut self, t: TyRef, bound: TyRef) -> bool {
        let canon = self.canonical(t);
        match &mut self.get_mut(canon).kind {
            Ty::Gen(gen) => match gen.type_constraint {
                None => {
                    gen.type_constraint = Some(bound);
                    true
                }
                Some(existing) => existing == bound,
            },
            _ => {
                debug_assert!(false, "constraint applied to a non-generic type");
                false
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Human-readable rendering for diagnostics and the CLI dump.
    pub fn display(&self, r: TyRef, interner: &Interner) -> String {
        match &self.get(r).kind {
            Ty::Unit => "{}".to_string(),
            Ty::Unknown => "?".to_string(),
            Ty::Bool => "Bool".to_string(),
            Ty::Prim(Prim::Int) => "Int".to_string(),
            Ty::Prim(Prim::Float) => "Float".to_string(),
            Ty::Prim(Prim::String) => "String".to_string(),
            Ty::Prim(Prim::Char) => "Char".to_string(),
            Ty::Ptr(inner) => format!("*{}", self.display(*inner, interner)),
            Ty::Array(inner) => format!("[{}]", self.display(*inner, interner)),
            Ty::Map(key, value) => format!(
                "[{} -> {}]",
                self.display(*key, interner),
                self.display(*value, interner)
            ),
            Ty::Tuple(tuple) => {
                let fields: Vec<String> = tuple
                    .fields
                    .iter()
                    .map(|f| {
                        if f.name.is_none() {
                            self.display(f.ty, interner)
                        } else {
                            format!("{}: {}", interner.resolve(f.name), self.display(f.ty, interner))
                        }
                    })
                    .collect();
                format!("{{{}}}", fields.join(", "))
            }
            Ty::Alias(alias) => interner.resolve(alias.name).to_string(),
            Ty::Variant(variant) => interner.resolve(variant.name).to_string(),
            Ty::Gen(gen) => gen_name(gen.index),
            Ty::App(app) => format!("{} …", gen_name(app.base_index)),
            Ty::Lvalue(inner) => format!("&{}", self.display(*inner, interner)),
            Ty::Fun(fun) => {
                let args: Vec<String> =
                    fun.args.iter().map(|&a| self.display(a, interner)).collect();
                format!("{{{}}} -> {}", args.join(", "), self.display(fun.ret, interner))
            }
        }
    }
}

fn gen_name(index: u32) -> String {
    if index < 26 {
        ((b'a' + index as u8) as char).to_string()
    } else {
        format!("t{}", index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> (TypeTable, Interner) {
        let mut interner = Interner::new();
        let table = TypeTable::new(&mut interner);
        (table, interner)
    }

    #[test]
    fn pointers_are_interned() {
        let (mut table, _) = table();
        let int = table.int();
        let a = table.get_ptr(int);
        let b = table.get_ptr(int);
        assert_eq!(a, b);
        let c = table.get_ptr(table.float());
        assert_ne!(a, c);
    }

    #[test]
    fn lvalues_are_interned() {
        let (mut table, _) = table();
        let int = table.int();
        assert_eq!(table.get_lvalue(int), table.get_lvalue(int));
    }

    #[test]
    fn structurally_equal_tuples_are_one_object() {
        let (mut table, mut interner) = table();
        let x = interner.intern("x");
        let y = interner.intern("y");
        let int = table.int();

        let a = table.get_tuple(&[(x, int), (y, int)]);
        let b = table.get_tuple(&[(x, int), (y, int)]);
        assert_eq!(a, b);
    }

    #[test]
    fn field_names_distinguish_tuples() {
        let (mut table, mut interner) = table();
        let x = interner.intern("x");
        let y = interner.intern("y");
        let int = table.int();

        let named = table.get_tuple(&[(x, int), (y, int)]);
        let other = table.get_tuple(&[(x, int), (Id::NONE, int)]);
        let positional = table.get_tuple(&[(Id::NONE, int), (Id::NONE, int)]);
        assert_ne!(named, other);
        assert_ne!(named, positional);
        assert_ne!(other, positional);
    }

    #[test]
    fn tuple_fields_record_their_parent_and_index() {
        let (mut table, mut interner) = table();
        let x = interner.intern("x");
        let int = table.int();
        let tup = table.get_tuple(&[(x, int), (Id::NONE, table.float())]);

        let Ty::Tuple(tuple) = &table.get(tup).kind else {
            panic!("expected a tuple");
        };
        assert_eq!(tuple.fields[0].parent, tup);
        assert_eq!(tuple.fields[1].index, 1);
    }

    #[test]
    fn constraints_accumulate_on_generics() {
        let (mut table, mut interner) = table();
        let show = interner.intern("Show");
        let gen = table.add(
            Ty::Gen(GenTy {
                index: 0,
                constraints: Vec::new(),
                type_constraint: None,
            }),
            false,
        );

        table.constrain(gen, Constraint { name: show });
        let Ty::Gen(g) = &table.get(gen).kind else {
            panic!("expected a generic type");
        };
        assert_eq!(g.constraints, vec![Constraint { name: show }]);
    }

    #[test]
    fn type_constraints_set_once_and_reject_conflicts() {
        let (mut table, _) = table();
        let gen = table.add(
            Ty::Gen(GenTy {
                index: 0,
                constraints: Vec::new(),
                type_constraint: None,
            }),
            false,
        );
        let int = table.int();
        let float = table.float();

        assert!(table.constrain_type(gen, int));
        assert!(table.constrain_type(gen, int));
        assert!(!table.constrain_type(gen, float));
    }

    #[test]
    fn display_renders_compound_types() {
        let (mut table, mut interner) = table();
        let x = interner.intern("x");
        let int = table.int();
        let tup = table.get_tuple(&[(x, int)]);
        let ptr = table.get_ptr(tup);
        assert_eq!(table.display(ptr, &interner), "*{x: Int}");
    }
}
