//! Error types surfaced by the engine.
//!
//! Every public operation returns [`BeanError`], which is one of four kinds:
//!
//! - [`ResolutionError`]: a property has no reader or writer, or a path
//!   cannot be walked.
//! - [`DescriptorConflictError`]: accessor types of one property disagree.
//! - [`ConversionError`]: a value could not be coerced to a target type.
//! - [`SerializationError`]: a tree did not match the expected shape, or a
//!   runtime shape could not be serialized.
//!
//! [`InvokeError`] is produced inside accessor bodies and never leaves the
//! engine unwrapped.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;

// -----------------------------------------------------------------------------
// ErrorKind

/// The four error classes reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Resolution,
    DescriptorConflict,
    Conversion,
    Serialization,
}

// -----------------------------------------------------------------------------
// BeanError

/// The error returned by every engine entry point.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BeanError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    DescriptorConflict(#[from] DescriptorConflictError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

impl BeanError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::DescriptorConflict(_) => ErrorKind::DescriptorConflict,
            Self::Conversion(_) => ErrorKind::Conversion,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Returns the path of the offending type, when known.
    pub fn type_path(&self) -> Option<&str> {
        match self {
            Self::Resolution(e) => Some(&e.type_path),
            Self::DescriptorConflict(e) => Some(e.type_path),
            Self::Conversion(e) => e.owner.as_deref(),
            Self::Serialization(e) => e.cause.as_ref().and_then(|c| c.type_path()),
        }
    }

    /// Returns the offending property name, when known.
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::Resolution(e) => Some(&e.property),
            Self::DescriptorConflict(e) => Some(&e.property),
            Self::Conversion(e) => e.property.as_deref(),
            Self::Serialization(e) => e.cause.as_ref().and_then(|c| c.property()),
        }
    }

    /// Attaches the owning type and property to a conversion error that
    /// does not carry them yet. Other kinds are returned unchanged.
    pub(crate) fn in_property(self, owner: &'static str, property: &str) -> Self {
        match self {
            Self::Conversion(mut e) if e.owner.is_none() => {
                e.owner = Some(owner.into());
                e.property = Some(property.into());
                Self::Conversion(e)
            }
            other => other,
        }
    }

    /// Maps an accessor failure on `owner.property` to the matching kind.
    pub(crate) fn from_invoke(err: InvokeError, owner: &'static str, property: &str) -> Self {
        match err {
            InvokeError::NotInvocable(_) | InvokeError::WrongReceiver { .. } => {
                ResolutionError::new(ResolutionKind::NotInvocable, owner, property).into()
            }
            InvokeError::Mismatch { expected, found } => ConversionError {
                target: expected.into(),
                source_type: found.into(),
                owner: Some(owner.into()),
                property: Some(property.into()),
                cause: None,
            }
            .into(),
            InvokeError::Custom(message) => ConversionError {
                target: Cow::Borrowed("?"),
                source_type: Cow::Borrowed("?"),
                owner: Some(owner.into()),
                property: Some(property.into()),
                cause: Some(CoercionError::new(message)),
            }
            .into(),
        }
    }
}

// -----------------------------------------------------------------------------
// ResolutionError

/// What went wrong while resolving a property or path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionKind {
    /// The property has no reader.
    NoReader,
    /// The property has no writer.
    NoWriter,
    /// A path hop landed on a value that is not a bean.
    NotTraversable,
    /// The accessor was declared without a body.
    NotInvocable,
    /// The path is empty or contains an empty segment.
    InvalidPath,
    /// No type is registered under the requested name.
    UnknownType,
    /// The type has no zero-argument constructor.
    NotConstructible,
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoReader => "no reader",
            Self::NoWriter => "no writer",
            Self::NotTraversable => "cannot traverse",
            Self::NotInvocable => "accessor is not invocable",
            Self::InvalidPath => "invalid path",
            Self::UnknownType => "unknown type",
            Self::NotConstructible => "no constructor",
        })
    }
}

/// A property, path or type name could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} for `{property}` on `{type_path}`")]
pub struct ResolutionError {
    pub kind: ResolutionKind,
    pub type_path: Cow<'static, str>,
    pub property: String,
}

impl ResolutionError {
    pub fn new(
        kind: ResolutionKind,
        type_path: impl Into<Cow<'static, str>>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            type_path: type_path.into(),
            property: property.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// DescriptorConflictError

/// Reader, writer and field of one property declare different types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("incompatible accessors for property `{property}` on `{type_path}`: `{left}` vs `{right}`")]
pub struct DescriptorConflictError {
    pub type_path: &'static str,
    pub property: String,
    pub left: String,
    pub right: String,
}

// -----------------------------------------------------------------------------
// ConversionError

/// Failure reported by a [`ScalarConverter`](crate::convert::ScalarConverter)
/// or a [`ValueFormatter`](crate::convert::ValueFormatter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CoercionError {
    pub message: String,
}

impl CoercionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ConversionError {
    pub target: Cow<'static, str>,
    pub source_type: Cow<'static, str>,
    pub owner: Option<Cow<'static, str>>,
    pub property: Option<String>,
    #[source]
    pub cause: Option<CoercionError>,
}

impl ConversionError {
    pub fn new(
        target: impl Into<Cow<'static, str>>,
        source_type: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            target: target.into(),
            source_type: source_type.into(),
            owner: None,
            property: None,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: CoercionError) -> Self {
        self.cause = Some(cause);
        self
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert `{}` to `{}`", self.source_type, self.target)?;
        if let (Some(owner), Some(property)) = (&self.owner, &self.property) {
            write!(f, " for property `{property}` on `{owner}`")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// SerializationError

/// A bean graph could not be written to, or read from, a tree.
///
/// `trail` lists the `Type.property` hops taken from the root to the
/// failing position.
#[derive(Debug, Error)]
pub struct SerializationError {
    pub message: String,
    pub trail: Vec<String>,
    #[source]
    pub cause: Option<Box<BeanError>>,
}

impl SerializationError {
    pub fn new(message: impl Into<String>, trail: Vec<String>) -> Self {
        Self {
            message: message.into(),
            trail,
            cause: None,
        }
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        let mut iter = self.trail.iter();
        if let Some(first) = iter.next() {
            write!(f, " (at `{first}`")?;
            for hop in iter {
                write!(f, " -> `{hop}`")?;
            }
            f.write_str(")")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// InvokeError

/// Failure raised by an accessor body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvokeError {
    #[error("expected a `{expected}` value, found `{found}`")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("receiver is not a `{expected}`")]
    WrongReceiver { expected: &'static str },
    #[error("accessor `{0}` has no body")]
    NotInvocable(String),
    #[error("{0}")]
    Custom(String),
}

/// Shorthand for results of engine operations.
pub type BeanResult<T> = Result<T, BeanError>;

// -----------------------------------------------------------------------------
// Tests
