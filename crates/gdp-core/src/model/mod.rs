//! Model module for building hierarchical disjunctive models.
//!
//! This module provides the core [`Model`] type: a tree of blocks holding
//! named, optionally indexed components.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`builder`]: Methods for declaring variables, constraints, blocks, disjuncts and disjunctions
//! - [`storage`]: Lookup, naming and activation of stored components
//! - [`info`]: Transformation info side tables
//! - [`traverse`]: Deterministic block traversal
//! - [`repn`]: Linear canonical representation of expressions

mod builder;
mod error;
mod info;
mod repn;
mod storage;
mod traverse;

use crate::index::Index;
use crate::types::{ConstraintData, Objective, Suffix, Variable};
use gdp_expr::ids::{BlockId, ComponentId, VariableId};
use std::collections::BTreeMap;

pub use error::ModelError;
pub use info::{BlockInfo, DisjunctInfo, RelaxedBlockInfo, TransformationInfo};
pub use repn::LinearRepn;
pub use storage::Found;

/// Name of the indicator variable declared on every disjunct.
pub const INDICATOR_VAR_NAME: &str = "indicator_var";

/// A hierarchical model: blocks own components, some components own blocks.
///
/// Variables, components and block data live in arenas addressed by id.
/// `BlockId::ROOT` is the top-level block.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub(crate) variables: Vec<Variable>,
    pub(crate) components: Vec<Component>,
    pub(crate) blocks: Vec<BlockData>,
    pub(crate) info: TransformationInfo,
}

/// One block datum: the root, a scalar block, a block member or a disjunct member.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockData {
    pub(crate) owner: Option<(ComponentId, Index)>,
    pub(crate) parent: Option<BlockId>,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) names: BTreeMap<String, ComponentId>,
    pub(crate) active: bool,
    pub(crate) indicator: Option<VariableId>,
}

impl BlockData {
    fn new(parent: Option<BlockId>, owner: Option<(ComponentId, Index)>) -> Self {
        Self {
            owner,
            parent,
            components: Vec::new(),
            names: BTreeMap::new(),
            active: true,
            indicator: None,
        }
    }

    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn owner(&self) -> Option<&(ComponentId, Index)> {
        self.owner.as_ref()
    }

    /// Components in declaration order.
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Indicator variable, present only on disjunct data.
    pub fn indicator(&self) -> Option<VariableId> {
        self.indicator
    }
}

/// One member of a (possibly indexed) disjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct DisjunctionData {
    pub disjuncts: Vec<BlockId>,
    pub active: bool,
}

/// Kind-specific payload of a component, members keyed by index.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    Variable(BTreeMap<Index, VariableId>),
    Constraint(BTreeMap<Index, ConstraintData>),
    Block(BTreeMap<Index, BlockId>),
    Disjunct(BTreeMap<Index, BlockId>),
    Disjunction {
        xor: bool,
        members: BTreeMap<Index, DisjunctionData>,
    },
    Suffix(Suffix),
    Param(BTreeMap<Index, f64>),
    Set(Vec<Index>),
    Connector(BTreeMap<String, VariableId>),
    Objective(Objective),
}

/// The closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Variable,
    Constraint,
    Block,
    Disjunct,
    Disjunction,
    Suffix,
    Param,
    Set,
    Connector,
    Objective,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Variable => "variable",
            ComponentKind::Constraint => "constraint",
            ComponentKind::Block => "block",
            ComponentKind::Disjunct => "disjunct",
            ComponentKind::Disjunction => "disjunction",
            ComponentKind::Suffix => "suffix",
            ComponentKind::Param => "param",
            ComponentKind::Set => "set",
            ComponentKind::Connector => "connector",
            ComponentKind::Objective => "objective",
        }
    }
}

/// A named component declared on a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub(crate) name: String,
    pub(crate) parent: BlockId,
    pub(crate) indexed: bool,
    pub(crate) active: bool,
    pub(crate) data: ComponentData,
}

impl Component {
    /// Local name on the owning block.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> BlockId {
        self.parent
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn data(&self) -> &ComponentData {
        &self.data
    }

    pub fn kind(&self) -> ComponentKind {
        match self.data {
            ComponentData::Variable(_) => ComponentKind::Variable,
            ComponentData::Constraint(_) => ComponentKind::Constraint,
            ComponentData::Block(_) => ComponentKind::Block,
            ComponentData::Disjunct(_) => ComponentKind::Disjunct,
            ComponentData::Disjunction { .. } => ComponentKind::Disjunction,
            ComponentData::Suffix(_) => ComponentKind::Suffix,
            ComponentData::Param(_) => ComponentKind::Param,
            ComponentData::Set(_) => ComponentKind::Set,
            ComponentData::Connector(_) => ComponentKind::Connector,
            ComponentData::Objective(_) => ComponentKind::Objective,
        }
    }

    /// Indices of all members, sorted.
    pub fn indices(&self) -> Vec<Index> {
        match &self.data {
            ComponentData::Variable(m) => m.keys().cloned().collect(),
            ComponentData::Constraint(m) => m.keys().cloned().collect(),
            ComponentData::Block(m) | ComponentData::Disjunct(m) => m.keys().cloned().collect(),
            ComponentData::Disjunction { members, .. } => members.keys().cloned().collect(),
            ComponentData::Param(m) => m.keys().cloned().collect(),
            ComponentData::Set(_)
            | ComponentData::Suffix(_)
            | ComponentData::Connector(_)
            | ComponentData::Objective(_) => vec![Index::scalar()],
        }
    }

    /// Block data owned by a block or disjunct component, by index.
    pub fn block_members(&self) -> Option<&BTreeMap<Index, BlockId>> {
        match &self.data {
            ComponentData::Block(members) | ComponentData::Disjunct(members) => Some(members),
            _ => None,
        }
    }
}

impl Model {
    /// Create a new model holding only the root block.
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            components: Vec::new(),
            blocks: vec![BlockData::new(None, None)],
            info: TransformationInfo::default(),
        }
    }

    /// The top-level block.
    pub fn root(&self) -> BlockId {
        BlockId::ROOT
    }

    pub(crate) fn ensure_block_exists(&self, id: BlockId) -> Result<(), ModelError> {
        if id.index() < self.blocks.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidBlockId(id))
        }
    }

    pub(crate) fn ensure_variable_exists(&self, id: VariableId) -> Result<(), ModelError> {
        if id.index() < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::InvalidVariableId(id))
        }
    }

    pub(crate) fn wrong_kind(&self, id: ComponentId, expected: &'static str) -> ModelError {
        match self.components.get(id.index()) {
            Some(component) => ModelError::WrongComponentKind {
                component: self.component_name(id),
                expected,
                found: component.kind().as_str(),
            },
            None => ModelError::InvalidComponentId(id),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
