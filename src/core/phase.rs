//! Map and reduce phases and their type inference
//!
//! A phase declares four key/value type parameters, in order:
//! input key, input value, output key, output value. Phases written in Rust
//! implement [`Mapper`] or [`Reducer`] and declare them as associated types,
//! so the builder reads them off the trait instead of asking the caller to
//! repeat them. Phases implemented outside this process (referenced only by
//! class name) carry an explicit [`Signature`] that may leave parameters
//! unbound; inference on an unbound parameter fails.

use crate::core::error::BuildError;
use crate::core::types::{TypeTag, Writable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the four phase type parameters, by position
pub const TYPE_PARAMS: [&str; 4] = ["KEYIN", "VALUEIN", "KEYOUT", "VALUEOUT"];

/// Which half of a stage a phase implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Map,
    Reduce,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Map => f.write_str("map"),
            PhaseKind::Reduce => f.write_str("reduce"),
        }
    }
}

/// A map phase implementation
///
/// ```
/// use mrchain::core::phase::Mapper;
/// use mrchain::core::types::{IntWritable, LongWritable, Text};
///
/// struct TokenMapper;
///
/// impl Mapper for TokenMapper {
///     type KeyIn = LongWritable;
///     type ValueIn = Text;
///     type KeyOut = Text;
///     type ValueOut = IntWritable;
/// }
/// ```
pub trait Mapper: Send + Sync + 'static {
    type KeyIn: Writable;
    type ValueIn: Writable;
    type KeyOut: Writable;
    type ValueOut: Writable;

    /// Reference the execution engine uses to locate this implementation
    fn class_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// A reduce phase implementation
pub trait Reducer: Send + Sync + 'static {
    type KeyIn: Writable;
    type ValueIn: Writable;
    type KeyOut: Writable;
    type ValueOut: Writable;

    /// Reference the execution engine uses to locate this implementation
    fn class_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Declared type parameters of a phase; `None` marks an unbound parameter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature([Option<TypeTag>; 4]);

impl Signature {
    /// Signature with every parameter bound
    pub fn bound(key_in: TypeTag, value_in: TypeTag, key_out: TypeTag, value_out: TypeTag) -> Self {
        Self([Some(key_in), Some(value_in), Some(key_out), Some(value_out)])
    }

    pub fn from_params(params: [Option<TypeTag>; 4]) -> Self {
        Self(params)
    }

    /// Signature with every parameter unbound
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn param(&self, index: usize) -> Option<&TypeTag> {
        self.0.get(index).and_then(Option::as_ref)
    }

    fn of_mapper<M: Mapper>() -> Self {
        Self::bound(
            TypeTag::of::<M::KeyIn>(),
            TypeTag::of::<M::ValueIn>(),
            TypeTag::of::<M::KeyOut>(),
            TypeTag::of::<M::ValueOut>(),
        )
    }

    fn of_reducer<R: Reducer>() -> Self {
        Self::bound(
            TypeTag::of::<R::KeyIn>(),
            TypeTag::of::<R::ValueIn>(),
            TypeTag::of::<R::KeyOut>(),
            TypeTag::of::<R::ValueOut>(),
        )
    }
}

/// A phase reduced to what the builder and engine need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    kind: PhaseKind,
    class_name: String,
    signature: Signature,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    fn resolve(&self, index: usize) -> Result<TypeTag, BuildError> {
        self.signature
            .param(index)
            .cloned()
            .ok_or_else(|| BuildError::TypeInference {
                class_name: self.class_name.clone(),
                kind: self.kind,
                parameter: TYPE_PARAMS[index],
            })
    }
}

/// A phase that can be attached with `mapper`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPhase(Phase);

impl MapPhase {
    /// A map phase implemented outside this process
    pub fn external(class_name: impl Into<String>, signature: Signature) -> Self {
        Self(Phase {
            kind: PhaseKind::Map,
            class_name: class_name.into(),
            signature,
        })
    }

    pub fn phase(&self) -> &Phase {
        &self.0
    }
}

impl<M: Mapper> From<M> for MapPhase {
    fn from(mapper: M) -> Self {
        Self::external(mapper.class_name(), Signature::of_mapper::<M>())
    }
}

/// A phase that can be attached with `reducer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducePhase(Phase);

impl ReducePhase {
    /// A reduce phase implemented outside this process
    pub fn external(class_name: impl Into<String>, signature: Signature) -> Self {
        Self(Phase {
            kind: PhaseKind::Reduce,
            class_name: class_name.into(),
            signature,
        })
    }

    pub fn phase(&self) -> &Phase {
        &self.0
    }
}

impl<R: Reducer> From<R> for ReducePhase {
    fn from(reducer: R) -> Self {
        Self::external(reducer.class_name(), Signature::of_reducer::<R>())
    }
}

/// Inferred types of a reduce phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceTypes {
    pub input_key: TypeTag,
    pub input_value: TypeTag,
    pub output_key: TypeTag,
    pub output_value: TypeTag,
}

/// Output key and value types of a map phase
pub fn infer_map_types(phase: &MapPhase) -> Result<(TypeTag, TypeTag), BuildError> {
    let phase = phase.phase();
    Ok((phase.resolve(2)?, phase.resolve(3)?))
}

/// All four key/value types of a reduce phase
pub fn infer_reduce_types(phase: &ReducePhase) -> Result<ReduceTypes, BuildError> {
    let phase = phase.phase();
    Ok(ReduceTypes {
        input_key: phase.resolve(0)?,
        input_value: phase.resolve(1)?,
        output_key: phase.resolve(2)?,
        output_value: phase.resolve(3)?,
    })
}
