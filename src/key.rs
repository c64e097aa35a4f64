//! Identity of units, interceptors and the shapes they operate on.

use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
};

use crate::unit::Unit;

/// A runtime type identity that stays printable.
///
/// Equality and hashing go through the [`TypeId`] alone; the name is carried
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The input and output types a unit transforms between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeArgs {
    input: TypeKey,
    output: TypeKey,
}

impl ShapeArgs {
    pub fn of<I: 'static, O: 'static>() -> Self {
        Self {
            input: TypeKey::of::<I>(),
            output: TypeKey::of::<O>(),
        }
    }

    pub fn input(&self) -> TypeKey {
        self.input
    }

    pub fn output(&self) -> TypeKey {
        self.output
    }
}

impl fmt::Display for ShapeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)
    }
}

/// Identifies a unit either by its implementation type or by the
/// transformation it performs.
///
/// The second form is how callers ask for "whatever handles `I -> O`"
/// without naming the implementation, which may well be unnameable (a
/// closure-carrying type, for instance).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitId {
    /// A concrete unit implementation type.
    Concrete(TypeKey),
    /// The transformation shape, optionally bound to an input/output pair.
    Shape(Option<ShapeArgs>),
}

impl UnitId {
    /// Identifier of the concrete implementation type `T`.
    ///
    /// Any `'static` type can be named here. Whether it actually identifies
    /// a unit is decided by the [`ShapeIndex`] at resolution time.
    pub fn of<T: 'static>() -> Self {
        Self::Concrete(TypeKey::of::<T>())
    }

    /// Identifier of the unit registered for the `I -> O` transformation.
    pub fn transform<I: 'static, O: 'static>() -> Self {
        Self::Shape(Some(ShapeArgs::of::<I, O>()))
    }

    /// Identifier of a unit of any shape, left for the provider to pick.
    pub fn any_transform() -> Self {
        Self::Shape(None)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(key) => write!(f, "{key}"),
            Self::Shape(Some(args)) => write!(f, "transform({args})"),
            Self::Shape(None) => write!(f, "transform(..)"),
        }
    }
}

/// Identifies an interceptor.
///
/// `Open` names a parametric kind that still needs input/output types;
/// [`InterceptorId::instantiate`] closes it against a unit's [`ShapeArgs`],
/// yielding the `Bound` form under which factories are keyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptorId {
    /// A concrete interceptor type, usable as-is.
    Concrete(TypeKey),
    /// A parametric interceptor kind, not yet bound to types.
    Open(TypeKey),
    /// A parametric kind bound to an input/output pair.
    Bound(TypeKey, ShapeArgs),
}

impl InterceptorId {
    /// Identifier of the concrete interceptor type `T`.
    pub fn of<T: 'static>() -> Self {
        Self::Concrete(TypeKey::of::<T>())
    }

    /// Identifier of the parametric kind marked by `K`.
    pub fn open<K: 'static>() -> Self {
        Self::Open(TypeKey::of::<K>())
    }

    /// Closes an open identifier against `args`. Concrete and already bound
    /// identifiers pass through unchanged.
    pub fn instantiate(self, args: ShapeArgs) -> Self {
        match self {
            Self::Open(kind) => Self::Bound(kind, args),
            other => other,
        }
    }
}

impl fmt::Display for InterceptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(key) => write!(f, "{key}"),
            Self::Open(kind) => write!(f, "{kind}<_, _>"),
            Self::Bound(kind, args) => write!(f, "{kind}<{}, {}>", args.input(), args.output()),
        }
    }
}

/// What a unit instance says about itself: who it is and what it transforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitMeta {
    id: UnitId,
    args: ShapeArgs,
}

impl UnitMeta {
    pub fn of<M: Unit>() -> Self {
        Self {
            id: UnitId::of::<M>(),
            args: ShapeArgs::of::<M::Input, M::Output>(),
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn args(&self) -> ShapeArgs {
        self.args
    }
}

/// The set of types known to be units, built up at registration time.
///
/// Classification is membership: an identifier nobody inserted is not a
/// unit, no matter how plausible it looks. Shape identifiers are always
/// recognized since they can only be formed out of unit vocabulary.
#[derive(Debug, Default)]
pub struct ShapeIndex {
    units: HashMap<TypeKey, UnitMeta>,
}

impl ShapeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<M: Unit>(&mut self) {
        let meta = UnitMeta::of::<M>();
        if let UnitId::Concrete(key) = meta.id() {
            self.units.insert(key, meta);
        }
    }

    pub fn get(&self, key: &TypeKey) -> Option<&UnitMeta> {
        self.units.get(key)
    }

    pub fn recognizes(&self, id: &UnitId) -> bool {
        match id {
            UnitId::Concrete(key) => self.units.contains_key(key),
            UnitId::Shape(_) => true,
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitMeta> {
        self.units.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn instantiate_only_touches_open_identifiers() {
        let args = ShapeArgs::of::<i32, String>();

        let concrete = InterceptorId::of::<Marker>();
        assert_eq!(concrete.instantiate(args), concrete);

        let open = InterceptorId::open::<Marker>();
        let bound = open.instantiate(args);
        assert_ne!(bound, open);
        assert_eq!(bound, InterceptorId::Bound(TypeKey::of::<Marker>(), args));

        // Binding again is a no-op.
        assert_eq!(bound.instantiate(ShapeArgs::of::<u8, u8>()), bound);
    }

    #[test]
    fn type_keys_compare_by_type() {
        assert_eq!(TypeKey::of::<i32>(), TypeKey::of::<i32>());
        assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<u32>());
    }

    #[test]
    fn shape_identifiers_are_always_recognized() {
        let index = ShapeIndex::new();
        assert!(index.recognizes(&UnitId::transform::<i32, i32>()));
        assert!(index.recognizes(&UnitId::any_transform()));
        assert!(!index.recognizes(&UnitId::of::<Marker>()));
    }

    #[test]
    fn display_names_are_readable() {
        assert_eq!(
            UnitId::transform::<i32, String>().to_string(),
            "transform(i32 -> alloc::string::String)"
        );
        assert_eq!(UnitId::any_transform().to_string(), "transform(..)");
    }
}
