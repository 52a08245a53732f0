//! Lookup, naming and activation of stored components.

use crate::index::Index;
use crate::types::{ConstraintData, Suffix, SuffixKey, SuffixValue, Variable};
use crate::uid::ComponentUid;
use gdp_expr::ids::{BlockId, ComponentId, VariableId};

use super::error::ModelError;
use super::{BlockData, Component, ComponentData, DisjunctionData, Model};

/// Result of resolving a [`ComponentUid`] against a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    /// A whole component (scalar or indexed).
    Component(ComponentId),
    /// One member of an indexed component.
    Data(ComponentId, Index),
}

impl Model {
    /// Get the number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Get the number of components across all blocks
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Get the number of block data, the root included
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Get a variable by ID.
    pub fn variable(&self, id: VariableId) -> Result<&Variable, ModelError> {
        self.variables
            .get(id.index())
            .ok_or(ModelError::InvalidVariableId(id))
    }

    /// Get a component by ID.
    pub fn component(&self, id: ComponentId) -> Result<&Component, ModelError> {
        self.components
            .get(id.index())
            .ok_or(ModelError::InvalidComponentId(id))
    }

    /// Get a block datum by ID.
    pub fn block(&self, id: BlockId) -> Result<&BlockData, ModelError> {
        self.blocks
            .get(id.index())
            .ok_or(ModelError::InvalidBlockId(id))
    }

    /// Lookup a component declared directly on `block`.
    pub fn find_child(&self, block: BlockId, name: &str) -> Option<ComponentId> {
        self.blocks
            .get(block.index())
            .and_then(|data| data.names.get(name).copied())
    }

    /// Block datum owned by a block or disjunct component at `index`.
    pub fn block_member(&self, id: ComponentId, index: &Index) -> Result<BlockId, ModelError> {
        let Some(members) = self.component(id)?.block_members() else {
            return Err(self.wrong_kind(id, "block or disjunct"));
        };
        members
            .get(index)
            .copied()
            .ok_or_else(|| self.missing_index(id, index))
    }

    /// Scalar sub-block or disjunct declared on `block` under `name`.
    pub fn child_block(&self, block: BlockId, name: &str) -> Option<BlockId> {
        let id = self.find_child(block, name)?;
        self.block_member(id, &Index::scalar()).ok()
    }

    pub fn variable_member(&self, id: ComponentId, index: &Index) -> Result<VariableId, ModelError> {
        match &self.component(id)?.data {
            ComponentData::Variable(members) => members
                .get(index)
                .copied()
                .ok_or_else(|| self.missing_index(id, index)),
            _ => Err(self.wrong_kind(id, "variable")),
        }
    }

    pub fn constraint(&self, id: ComponentId, index: &Index) -> Result<&ConstraintData, ModelError> {
        match &self.component(id)?.data {
            ComponentData::Constraint(members) => members
                .get(index)
                .ok_or_else(|| self.missing_index(id, index)),
            _ => Err(self.wrong_kind(id, "constraint")),
        }
    }

    pub fn disjunction(
        &self,
        id: ComponentId,
        index: &Index,
    ) -> Result<&DisjunctionData, ModelError> {
        match &self.component(id)?.data {
            ComponentData::Disjunction { members, .. } => members
                .get(index)
                .ok_or_else(|| self.missing_index(id, index)),
            _ => Err(self.wrong_kind(id, "disjunction")),
        }
    }

    /// Whether a disjunction means "exactly one" (`true`) or "at least one".
    pub fn disjunction_xor(&self, id: ComponentId) -> Result<bool, ModelError> {
        match &self.component(id)?.data {
            ComponentData::Disjunction { xor, .. } => Ok(*xor),
            _ => Err(self.wrong_kind(id, "disjunction")),
        }
    }

    pub fn suffix(&self, id: ComponentId) -> Result<&Suffix, ModelError> {
        match &self.component(id)?.data {
            ComponentData::Suffix(suffix) => Ok(suffix),
            _ => Err(self.wrong_kind(id, "suffix")),
        }
    }

    /// Value stored in a suffix under `key`, if any.
    pub fn suffix_value(
        &self,
        suffix: ComponentId,
        key: &SuffixKey,
    ) -> Result<Option<&SuffixValue>, ModelError> {
        Ok(self.suffix(suffix)?.get(key))
    }

    /// Suffix declared on `block` under `name`; other component kinds are ignored.
    pub fn find_suffix(&self, block: BlockId, name: &str) -> Option<&Suffix> {
        let id = self.find_child(block, name)?;
        self.suffix(id).ok()
    }

    /// Indicator variable of a disjunct datum.
    pub fn indicator_var(&self, block: BlockId) -> Result<VariableId, ModelError> {
        self.block(block)?
            .indicator
            .ok_or(ModelError::NotADisjunct(block))
    }

    fn missing_index(&self, id: ComponentId, index: &Index) -> ModelError {
        ModelError::MissingIndex {
            component: self.component_name(id),
            index: index.to_string(),
        }
    }

    // ── Naming ──────────────────────────────────────────────

    /// Fully qualified name of a block datum; the root renders as `model`.
    pub fn block_name(&self, id: BlockId) -> String {
        if id == BlockId::ROOT {
            return "model".to_string();
        }
        self.block_uid(id).to_string()
    }

    /// Fully qualified name of a component, e.g. `b[1].d.c`.
    pub fn component_name(&self, id: ComponentId) -> String {
        self.component_uid(id).to_string()
    }

    /// Fully qualified name of a component member, e.g. `b[1].c[2]`.
    pub fn member_name(&self, id: ComponentId, index: &Index) -> String {
        self.member_uid(id, index).to_string()
    }

    pub fn block_uid(&self, id: BlockId) -> ComponentUid {
        ComponentUid::new(self.block_segments(id))
    }

    pub fn component_uid(&self, id: ComponentId) -> ComponentUid {
        self.member_uid(id, &Index::scalar())
    }

    pub fn member_uid(&self, id: ComponentId, index: &Index) -> ComponentUid {
        let Some(component) = self.components.get(id.index()) else {
            return ComponentUid::new(vec![(format!("<component {}>", id.inner()), index.clone())]);
        };
        let mut segments = self.block_segments(component.parent);
        segments.push((component.name.clone(), index.clone()));
        ComponentUid::new(segments)
    }

    fn block_segments(&self, id: BlockId) -> Vec<(String, Index)> {
        let mut segments = Vec::new();
        let mut current = self.blocks.get(id.index());
        while let Some(BlockData {
            owner: Some((owner, index)),
            parent,
            ..
        }) = current
        {
            if let Some(component) = self.components.get(owner.index()) {
                segments.push((component.name.clone(), index.clone()));
            }
            current = parent.and_then(|p| self.blocks.get(p.index()));
        }
        segments.reverse();
        segments
    }

    /// Resolve a path against the model.
    ///
    /// Intermediate segments must name block or disjunct members. A final
    /// segment without an index resolves to the whole component.
    pub fn find_component(&self, uid: &ComponentUid) -> Option<Found> {
        let (last, init) = uid.segments().split_last()?;
        let mut block = BlockId::ROOT;
        for (name, index) in init {
            let id = self.find_child(block, name)?;
            block = *self.components[id.index()].block_members()?.get(index)?;
        }
        let (name, index) = last;
        let id = self.find_child(block, name)?;
        if index.is_scalar() {
            return Some(Found::Component(id));
        }
        self.components[id.index()]
            .indices()
            .contains(index)
            .then(|| Found::Data(id, index.clone()))
    }

    /// `base` if free on `block`, otherwise the first free `base_1`, `base_2`, ...
    pub fn unique_name(&self, block: BlockId, base: &str) -> String {
        let Some(data) = self.blocks.get(block.index()) else {
            return base.to_string();
        };
        if !data.names.contains_key(base) {
            return base.to_string();
        }
        let mut counter = 1usize;
        loop {
            let candidate = format!("{base}_{counter}");
            if !data.names.contains_key(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    // ── Activation ──────────────────────────────────────────

    /// A scalar component is active when both the component and its only
    /// member are; an indexed component only looks at its own flag.
    pub fn is_component_active(&self, id: ComponentId) -> bool {
        let Some(component) = self.components.get(id.index()) else {
            return false;
        };
        if !component.active {
            return false;
        }
        if component.indexed {
            return true;
        }
        let scalar = Index::scalar();
        match &component.data {
            ComponentData::Constraint(members) => members.get(&scalar).is_some_and(|c| c.active),
            ComponentData::Block(members) | ComponentData::Disjunct(members) => members
                .get(&scalar)
                .is_some_and(|block| self.is_block_active(*block)),
            ComponentData::Disjunction { members, .. } => {
                members.get(&scalar).is_some_and(|d| d.active)
            }
            _ => true,
        }
    }

    pub fn is_block_active(&self, id: BlockId) -> bool {
        self.blocks.get(id.index()).is_some_and(|block| block.active)
    }

    /// Deactivate a component together with every member it owns.
    pub fn deactivate_component(&mut self, id: ComponentId) -> Result<(), ModelError> {
        let component = self
            .components
            .get_mut(id.index())
            .ok_or(ModelError::InvalidComponentId(id))?;
        component.active = false;
        let mut member_blocks = Vec::new();
        match &mut component.data {
            ComponentData::Constraint(members) => {
                members.values_mut().for_each(|data| data.active = false);
            }
            ComponentData::Disjunction { members, .. } => {
                members.values_mut().for_each(|data| data.active = false);
            }
            ComponentData::Block(members) | ComponentData::Disjunct(members) => {
                member_blocks.extend(members.values().copied());
            }
            _ => {}
        }
        for block in member_blocks {
            self.deactivate_block(block)?;
        }
        Ok(())
    }

    pub fn deactivate_block(&mut self, id: BlockId) -> Result<(), ModelError> {
        let block = self
            .blocks
            .get_mut(id.index())
            .ok_or(ModelError::InvalidBlockId(id))?;
        block.active = false;
        Ok(())
    }

    pub fn deactivate_constraint(
        &mut self,
        id: ComponentId,
        index: &Index,
    ) -> Result<(), ModelError> {
        self.constraint(id, index)?;
        if let ComponentData::Constraint(members) = &mut self.components[id.index()].data {
            if let Some(data) = members.get_mut(index) {
                data.active = false;
            }
        }
        Ok(())
    }

    pub fn deactivate_disjunction(
        &mut self,
        id: ComponentId,
        index: &Index,
    ) -> Result<(), ModelError> {
        self.disjunction(id, index)?;
        if let ComponentData::Disjunction { members, .. } = &mut self.components[id.index()].data {
            if let Some(data) = members.get_mut(index) {
                data.active = false;
            }
        }
        Ok(())
    }

    /// Reactivate one disjunction member and its owning component.
    pub fn activate_disjunction(
        &mut self,
        id: ComponentId,
        index: &Index,
    ) -> Result<(), ModelError> {
        self.disjunction(id, index)?;
        let component = &mut self.components[id.index()];
        component.active = true;
        if let ComponentData::Disjunction { members, .. } = &mut component.data {
            if let Some(data) = members.get_mut(index) {
                data.active = true;
            }
        }
        Ok(())
    }

    /// Fix a variable to a value. Bounds are left untouched.
    pub fn fix_variable(&mut self, id: VariableId, value: f64) -> Result<(), ModelError> {
        let variable = self
            .variables
            .get_mut(id.index())
            .ok_or(ModelError::InvalidVariableId(id))?;
        variable.fixed = Some(value);
        tracing::debug!(
            component = "model",
            operation = "fix_variable",
            status = "success",
            variable = id.inner(),
            value,
            "Fixed variable"
        );
        Ok(())
    }
}
