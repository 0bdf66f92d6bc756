use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// TypeKind

/// How a type is represented in the value tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Booleans, numbers, characters and strings, passed through as scalars.
    Scalar,
    /// Field-less enums, stored by variant name.
    Enum,
    /// Types that need a registered converter, such as `Uuid`.
    Opaque,
    /// A concrete persisted struct, stored as a nested mapping.
    Object,
    /// `Box<dyn Persist>`, stored as a nested mapping carrying a type tag.
    Dynamic,
    List,
    Set,
    Array,
    Optional,
    /// An unbounded type that can never be persisted.
    Wildcard,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.pad("Scalar"),
            Self::Enum => f.pad("Enum"),
            Self::Opaque => f.pad("Opaque"),
            Self::Object => f.pad("Object"),
            Self::Dynamic => f.pad("Dynamic"),
            Self::List => f.pad("List"),
            Self::Set => f.pad("Set"),
            Self::Array => f.pad("Array"),
            Self::Optional => f.pad("Optional"),
            Self::Wildcard => f.pad("Wildcard"),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Static description of a persisted type.
///
/// `generics` holds the declared type arguments that the value tree
/// cares about: the element type of collections and arrays, and the
/// inner type of options.
///
/// # Examples
///
/// ```
/// use stow_persist::info::{TypeKind, Typed};
///
/// let info = <Vec<Option<u8>>>::type_info();
/// assert_eq!(info.kind(), TypeKind::List);
///
/// let elem = info.element().unwrap();
/// assert_eq!(elem.kind(), TypeKind::Optional);
/// assert!(elem.element().unwrap().is::<u8>());
/// ```
#[derive(Debug)]
pub struct TypeInfo {
    type_id: TypeId,
    type_name: &'static str,
    kind: TypeKind,
    generics: Box<[&'static TypeInfo]>,
}

impl TypeInfo {
    /// Creates the info of `T` without generics.
    #[inline]
    pub fn new<T: Any + ?Sized>(kind: TypeKind) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            kind,
            generics: Box::new([]),
        }
    }

    /// Replaces the declared type arguments.
    #[inline]
    pub fn with_generics<const N: usize>(mut self, generics: [&'static TypeInfo; N]) -> Self {
        self.generics = Box::new(generics);
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn generics(&self) -> &[&'static TypeInfo] {
        &self.generics
    }

    /// The first type argument, if any.
    #[inline]
    pub fn element(&self) -> Option<&'static TypeInfo> {
        self.generics.first().copied()
    }

    #[inline]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Finds the first [`Wildcard`](TypeKind::Wildcard) in this type or its arguments.
    pub fn find_wildcard(&'static self) -> Option<&'static TypeInfo> {
        if self.kind == TypeKind::Wildcard {
            return Some(self);
        }
        self.generics.iter().find_map(|info| info.find_wildcard())
    }
}
