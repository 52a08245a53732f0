//! Transformation info side tables.
//!
//! Records are keyed by stable ids and hold ids, never references, so a
//! relaxed block can point back at its source disjunct and vice versa.
//! Tables are allocated on first write; a missing record means the
//! corresponding object has not been transformed.

use std::collections::BTreeMap;

use gdp_expr::ids::{BlockId, ComponentId};
use serde::Serialize;

use crate::model::Model;
use crate::model::error::ModelError;

/// Relaxation state of one disjunct datum.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisjunctInfo {
    pub relaxed: bool,
    /// Block holding the Big-M relaxation of this disjunct.
    pub bigm: Option<BlockId>,
    /// Original constraint component -> relaxed constraint component.
    pub relaxed_constraints: BTreeMap<ComponentId, ComponentId>,
}

/// Back link from a relaxed block to the disjunct it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelaxedBlockInfo {
    pub src: BlockId,
}

/// Per-block record of selection constraints declared for its disjunctions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockInfo {
    /// Disjunction component -> selection constraint component.
    pub selection_constraints: BTreeMap<ComponentId, ComponentId>,
}

/// All side tables written by transformations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bigm_area: Option<BlockId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disjuncts: Option<BTreeMap<BlockId, DisjunctInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relaxed_blocks: Option<BTreeMap<BlockId, RelaxedBlockInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<BTreeMap<BlockId, BlockInfo>>,
}

impl Model {
    pub fn transformation_info(&self) -> &TransformationInfo {
        &self.info
    }

    /// Export the side tables as JSON.
    pub fn transformation_info_json(&self) -> Result<serde_json::Value, ModelError> {
        serde_json::to_value(&self.info).map_err(|err| ModelError::Serialization(err.to_string()))
    }

    /// Block holding Big-M relaxations, if a previous call created one.
    pub fn bigm_area(&self) -> Option<BlockId> {
        self.info.bigm_area
    }

    pub fn set_bigm_area(&mut self, block: BlockId) -> Result<(), ModelError> {
        self.ensure_block_exists(block)?;
        self.info.bigm_area = Some(block);
        Ok(())
    }

    pub fn disjunct_info(&self, disjunct: BlockId) -> Option<&DisjunctInfo> {
        self.info
            .disjuncts
            .as_ref()
            .and_then(|table| table.get(&disjunct))
    }

    /// Record for a disjunct datum, created empty on first access.
    pub fn disjunct_info_mut(&mut self, disjunct: BlockId) -> Result<&mut DisjunctInfo, ModelError> {
        self.indicator_var(disjunct)?;
        Ok(self
            .info
            .disjuncts
            .get_or_insert_with(BTreeMap::new)
            .entry(disjunct)
            .or_default())
    }

    pub fn relaxed_block_info(&self, block: BlockId) -> Option<&RelaxedBlockInfo> {
        self.info
            .relaxed_blocks
            .as_ref()
            .and_then(|table| table.get(&block))
    }

    pub fn set_relaxed_block_info(
        &mut self,
        block: BlockId,
        info: RelaxedBlockInfo,
    ) -> Result<(), ModelError> {
        self.ensure_block_exists(block)?;
        self.ensure_block_exists(info.src)?;
        self.info
            .relaxed_blocks
            .get_or_insert_with(BTreeMap::new)
            .insert(block, info);
        Ok(())
    }

    pub fn block_info(&self, block: BlockId) -> Option<&BlockInfo> {
        self.info.blocks.as_ref().and_then(|table| table.get(&block))
    }

    /// Record for a block, created empty on first access.
    pub fn block_info_mut(&mut self, block: BlockId) -> Result<&mut BlockInfo, ModelError> {
        self.ensure_block_exists(block)?;
        Ok(self
            .info
            .blocks
            .get_or_insert_with(BTreeMap::new)
            .entry(block)
            .or_default())
    }
}
