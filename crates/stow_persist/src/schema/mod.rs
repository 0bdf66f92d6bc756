//! Field schemas: the flattened, validated view of a struct and its bases.
//!
//! A [`Schema`] lists the persisted fields of a type level by level, from the
//! most-derived struct down through every `#[persist(parent)]` base. It is
//! built once per type by [`SchemaCache::get_or_resolve`] and shared.

use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use core::time::Duration;

use stow_os::sync::{Arc, DEFAULT_LOCK_TIMEOUT, TimedRwLock};
use stow_utils::TypeIdMap;
use stow_utils::hash::HashMap;

use crate::info::{FieldInfo, LevelInfo, ParentInfo, TypeInfo, TypeKind};
use crate::{PersistError, Reflect, SchemaError, TYPE_TAG_KEY};

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One persisted field, with its declared type resolved.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    owner: &'static str,
    declared: &'static TypeInfo,
    optional: bool,
    info: &'static FieldInfo,
}

impl FieldDescriptor {
    fn new(owner: &'static str, info: &'static FieldInfo) -> Self {
        let mut declared = info.type_info();
        let optional = declared.kind() == TypeKind::Optional;
        if optional && let Some(inner) = declared.element() {
            declared = inner;
        }
        Self {
            owner,
            declared,
            optional,
            info,
        }
    }

    /// Short name of the struct declaring the field.
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.info.name()
    }

    #[inline]
    pub fn key(&self) -> &'static str {
        self.info.key()
    }

    /// The declared type, with one level of `Option` removed.
    #[inline]
    pub fn declared(&self) -> &'static TypeInfo {
        self.declared
    }

    /// The declared type arguments; the element type for collections and arrays.
    #[inline]
    pub fn generics(&self) -> &'static [&'static TypeInfo] {
        let declared: &'static TypeInfo = self.declared;
        declared.generics()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.declared.kind() == TypeKind::Array
    }

    /// Whether the field is declared as `Option<_>`.
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub(crate) fn get<'a>(&self, owner: &'a dyn Any) -> Result<&'a dyn Reflect, SchemaError> {
        self.info
            .get(owner)
            .ok_or(SchemaError::ParentMismatch { owner: self.owner })
    }

    pub(crate) fn get_mut<'a>(
        &self,
        owner: &'a mut dyn Any,
    ) -> Result<&'a mut dyn Reflect, SchemaError> {
        self.info
            .get_mut(owner)
            .ok_or(SchemaError::ParentMismatch { owner: self.owner })
    }
}

// -----------------------------------------------------------------------------
// SchemaLevel

/// The fields declared directly on one struct of the chain.
#[derive(Debug, Clone)]
pub struct SchemaLevel {
    owner: &'static str,
    fields: Vec<FieldDescriptor>,
    parent: Option<&'static ParentInfo>,
}

impl SchemaLevel {
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Descends from this level's struct to its embedded base.
    ///
    /// Returns `Ok(None)` at the end of the chain.
    pub(crate) fn parent_of<'a>(
        &self,
        owner: &'a dyn Any,
    ) -> Result<Option<&'a dyn Any>, SchemaError> {
        match self.parent {
            None => Ok(None),
            Some(parent) => parent
                .get(owner)
                .map(Some)
                .ok_or(SchemaError::ParentMismatch { owner: self.owner }),
        }
    }

    pub(crate) fn parent_of_mut<'a>(
        &self,
        owner: &'a mut dyn Any,
    ) -> Result<Option<&'a mut dyn Any>, SchemaError> {
        match self.parent {
            None => Ok(None),
            Some(parent) => parent
                .get_mut(owner)
                .map(Some)
                .ok_or(SchemaError::ParentMismatch { owner: self.owner }),
        }
    }
}

// -----------------------------------------------------------------------------
// Schema

/// The persisted fields of one concrete type across its whole base chain.
///
/// # Examples
///
/// ```
/// use stow_persist::{Persist, PersistObject};
/// use stow_persist::schema::Schema;
///
/// #[derive(Persist, Default)]
/// struct Base {
///     #[persist]
///     id: u32,
/// }
///
/// #[derive(Persist, Default)]
/// struct Derived {
///     #[persist(parent)]
///     base: Base,
///     #[persist(key = "label")]
///     name: String,
/// }
///
/// let schema = Schema::resolve(Derived::object_level()).unwrap();
/// let keys: Vec<_> = schema.fields().map(|f| f.key()).collect();
/// assert_eq!(keys, ["label", "id"]);
/// assert_eq!(schema.levels()[1].owner(), "Base");
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    type_id: TypeId,
    type_name: &'static str,
    levels: Vec<SchemaLevel>,
}

impl Schema {
    /// Walks `level` and its bases, most-derived first, and validates the fields.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateKey`] if two fields anywhere in the chain share a key.
    /// - [`SchemaError::ReservedKey`] if a field uses [`TYPE_TAG_KEY`].
    /// - [`SchemaError::Wildcard`] if a declared type contains an unbounded type.
    pub fn resolve(level: &'static LevelInfo) -> Result<Self, SchemaError> {
        let mut levels = Vec::new();
        let mut current = Some(level);

        while let Some(level) = current {
            let owner = level.owner();
            let fields: Vec<FieldDescriptor> = level
                .fields()
                .iter()
                .map(|info| FieldDescriptor::new(owner, info))
                .collect();

            for field in &fields {
                if field.key() == TYPE_TAG_KEY {
                    return Err(SchemaError::ReservedKey {
                        owner,
                        field: field.name(),
                        key: TYPE_TAG_KEY,
                    });
                }
                if let Some(wildcard) = field.info.type_info().find_wildcard() {
                    return Err(SchemaError::Wildcard {
                        owner,
                        field: field.name(),
                        type_name: wildcard.type_name(),
                    });
                }
            }

            levels.push(SchemaLevel {
                owner,
                fields,
                parent: level.parent(),
            });
            current = level.parent().map(ParentInfo::level);
        }

        check_unique_keys(level.owner(), &levels)?;

        Ok(Self {
            type_id: level.type_id(),
            type_name: level.type_name(),
            levels,
        })
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Levels from the most-derived struct to the end of the chain.
    #[inline]
    pub fn levels(&self) -> &[SchemaLevel] {
        &self.levels
    }

    /// All fields in level order.
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.levels.iter().flat_map(|level| level.fields.iter())
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|field| field.key() == key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.iter().map(|level| level.fields.len()).sum()
    }
}

fn check_unique_keys(type_name: &'static str, levels: &[SchemaLevel]) -> Result<(), SchemaError> {
    let mut seen: HashMap<&'static str, &FieldDescriptor> = HashMap::default();
    for field in levels.iter().flat_map(|level| level.fields.iter()) {
        if let Some(first) = seen.insert(field.key(), field) {
            return Err(SchemaError::DuplicateKey {
                type_name,
                key: field.key(),
                owner: field.owner(),
                field: field.name(),
                first_owner: first.owner(),
                first_field: first.name(),
            });
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// SchemaCache

/// Schemas keyed by type.
///
/// Resolution runs outside the lock; concurrent resolutions of the same
/// type publish equivalent schemas and the first one published is kept.
/// Failed resolutions are not cached.
pub struct SchemaCache {
    schemas: TimedRwLock<TypeIdMap<Arc<Schema>>>,
}

impl SchemaCache {
    #[inline]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    #[inline]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            schemas: TimedRwLock::new("schema cache", timeout, TypeIdMap::new()),
        }
    }

    /// Returns the cached schema of `type_id`, if it was resolved before.
    pub fn get(&self, type_id: TypeId) -> Result<Option<Arc<Schema>>, PersistError> {
        Ok(self
            .schemas
            .with_read(|schemas| schemas.get(&type_id).cloned())?)
    }

    /// Returns the schema of the type `level` describes, resolving it on first use.
    pub fn get_or_resolve(&self, level: &'static LevelInfo) -> Result<Arc<Schema>, PersistError> {
        if let Some(schema) = self.get(level.type_id())? {
            return Ok(schema);
        }

        let schema = Arc::new(Schema::resolve(level)?);
        log::debug!(
            "resolved the schema of `{}`: {} fields in {} levels",
            schema.type_name(),
            schema.len(),
            schema.levels().len(),
        );

        Ok(self.schemas.with_write(|schemas| {
            Arc::clone(schemas.get_or_insert(level.type_id(), || schema))
        })?)
    }

    #[inline]
    pub fn len(&self) -> Result<usize, PersistError> {
        Ok(self.schemas.with_read(|schemas| schemas.len())?)
    }
}

impl Default for SchemaCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_list();
        if let Ok(schemas) = self.schemas.read() {
            dbg.entries(schemas.values().map(|s| s.type_name()));
        }
        dbg.finish()
    }
}
