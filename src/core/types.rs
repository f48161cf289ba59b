//! Key/value type tags
//!
//! The execution engine moves records between stages as serialized keys and
//! values. A [`TypeTag`] names one of those wire types; the [`Writable`]
//! trait ties a Rust marker type to its tag so phase implementations can
//! declare their signatures with ordinary associated types.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Name of a key or value type understood by the execution engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(Cow<'static, str>);

impl TypeTag {
    /// Create a tag from a static name
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a tag from an owned name
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Tag of a [`Writable`] marker type
    pub fn of<W: Writable>() -> Self {
        Self::from_static(W::TYPE_NAME)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A serializable key or value type
pub trait Writable: 'static {
    /// Name the engine uses for this type
    const TYPE_NAME: &'static str;
}

macro_rules! writables {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $name;

            impl Writable for $name {
                const TYPE_NAME: &'static str = stringify!($name);
            }
        )*
    };
}

writables! {
    /// UTF-8 text
    Text,
    /// 32-bit signed integer
    IntWritable,
    /// 64-bit signed integer
    LongWritable,
    FloatWritable,
    DoubleWritable,
    BooleanWritable,
    /// Raw bytes
    BytesWritable,
    /// Placeholder for an absent key or value
    NullWritable,
}
