use alloc::borrow::Cow;
use core::fmt;

use stow_os::sync::LockTimeoutError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// SchemaError

/// A type cannot be persisted as declared.
///
/// Detected while resolving a [`Schema`](crate::schema::Schema), so it
/// surfaces at the first serialize or deserialize call for that type
/// and is never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error(
        "duplicate key `{key}` in `{type_name}`: `{owner}::{field}` collides with `{first_owner}::{first_field}`"
    )]
    DuplicateKey {
        type_name: &'static str,
        key: &'static str,
        owner: &'static str,
        field: &'static str,
        first_owner: &'static str,
        first_field: &'static str,
    },

    #[error("field `{owner}::{field}` declares the unbounded type `{type_name}`")]
    Wildcard {
        owner: &'static str,
        field: &'static str,
        type_name: &'static str,
    },

    #[error("field `{owner}::{field}` uses the reserved key `{key}`")]
    ReservedKey {
        owner: &'static str,
        field: &'static str,
        key: &'static str,
    },

    #[error("field accessor of `{owner}` was called on a value of another type")]
    ParentMismatch { owner: &'static str },
}

// -----------------------------------------------------------------------------
// ConversionError

/// A value could not be converted between its typed and tree forms.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("no converter is registered for `{type_name}`")]
    NoConverter { type_name: &'static str },

    #[error("polymorphic mapping has no type tag")]
    MissingTag,

    #[error("expected a sequence of {expected} elements, found {found}")]
    Length { expected: usize, found: usize },

    #[error("sequence elements cannot be absent")]
    AbsentElement,

    #[error("{value} is out of range for `{type_name}`")]
    OutOfRange {
        type_name: &'static str,
        value: Cow<'static, str>,
    },

    #[error("invalid `{type_name}`: {reason}")]
    InvalidScalar {
        type_name: &'static str,
        reason: Cow<'static, str>,
    },

    #[error("`{enum_name}` has no variant named `{name}`")]
    UnknownVariant {
        enum_name: &'static str,
        name: alloc::string::String,
    },
}

// -----------------------------------------------------------------------------
// PersistError

/// The direction of the call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Serialize,
    Deserialize,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize => f.pad("serialize"),
            Self::Deserialize => f.pad("deserialize"),
        }
    }
}

/// Error returned by every engine operation.
///
/// Failures inside a field are wrapped in [`PersistError::Field`], once per
/// nesting level, so the message reads as a path from the outermost object
/// down to the offending value. Use [`root`](Self::root) to reach the
/// underlying category.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("no type is registered under the tag `{tag}`")]
    UnknownTag { tag: alloc::string::String },

    #[error(transparent)]
    LockTimeout(#[from] LockTimeoutError),

    #[error("failed to {op} `{owner}::{field}` (key `{key}`): {source}")]
    Field {
        op: Operation,
        owner: &'static str,
        field: &'static str,
        key: &'static str,
        source: alloc::boxed::Box<PersistError>,
    },
}

impl PersistError {
    /// Strips every [`Field`](Self::Field) wrapper.
    pub fn root(&self) -> &PersistError {
        let mut err = self;
        while let Self::Field { source, .. } = err {
            err = source;
        }
        err
    }

    #[inline]
    pub fn is_schema_error(&self) -> bool {
        matches!(self.root(), Self::Schema(_))
    }

    #[inline]
    pub fn is_unknown_tag(&self) -> bool {
        matches!(self.root(), Self::UnknownTag { .. })
    }

    #[inline]
    pub fn is_lock_timeout(&self) -> bool {
        matches!(self.root(), Self::LockTimeout(_))
    }

    pub(crate) fn in_field(
        self,
        op: Operation,
        owner: &'static str,
        field: &'static str,
        key: &'static str,
    ) -> Self {
        Self::Field {
            op,
            owner,
            field,
            key,
            source: alloc::boxed::Box::new(self),
        }
    }
}
