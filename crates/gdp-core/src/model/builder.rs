//! Model builder methods for declaring components on blocks.

use std::collections::BTreeMap;

use crate::index::Index;
use crate::types::{Bounds, ConstraintData, Objective, Suffix, SuffixKey, SuffixValue, Variable};
use gdp_expr::expr::{ConstraintExpr, Expr};
use gdp_expr::ids::{BlockId, ComponentId, VariableId};

use crate::model::error::ModelError;
use crate::model::{
    BlockData, Component, ComponentData, DisjunctionData, INDICATOR_VAR_NAME, Model,
};

impl Model {
    pub(crate) fn check_name_free(&self, block: BlockId, name: &str) -> Result<(), ModelError> {
        self.ensure_block_exists(block)?;
        if self.blocks[block.index()].names.contains_key(name) {
            return Err(ModelError::DuplicateComponent {
                block: self.block_name(block),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Register a component on a block. The name must be free.
    pub(crate) fn declare(
        &mut self,
        block: BlockId,
        name: &str,
        indexed: bool,
        data: ComponentData,
    ) -> Result<ComponentId, ModelError> {
        self.check_name_free(block, name)?;
        let id = ComponentId::new(self.components.len() as u32);
        self.components.push(Component {
            name: name.to_string(),
            parent: block,
            indexed,
            active: true,
            data,
        });
        let block_data = &mut self.blocks[block.index()];
        block_data.components.push(id);
        block_data.names.insert(name.to_string(), id);
        Ok(id)
    }

    fn push_variable(&mut self, variable: Variable) -> Result<VariableId, ModelError> {
        if !variable.bounds.is_valid() {
            return Err(ModelError::InvalidVariableBounds {
                lower: variable.bounds.lower,
                upper: variable.bounds.upper,
            });
        }
        let id = VariableId::new(self.variables.len() as u32);
        self.variables.push(variable);
        Ok(id)
    }

    fn validate_constraint(&self, body: &Expr, bounds: Bounds) -> Result<(), ModelError> {
        if !bounds.is_valid() {
            return Err(ModelError::InvalidConstraintBounds {
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }
        for var_id in body.variables() {
            self.ensure_variable_exists(var_id)?;
        }
        Ok(())
    }

    /// Add a scalar variable to a block.
    pub fn add_variable(
        &mut self,
        block: BlockId,
        name: &str,
        variable: Variable,
    ) -> Result<VariableId, ModelError> {
        self.check_name_free(block, name)?;
        let id = self.push_variable(variable)?;
        let members = BTreeMap::from([(Index::scalar(), id)]);
        self.declare(block, name, false, ComponentData::Variable(members))?;
        Ok(id)
    }

    /// Add an indexed variable; every member starts from the same template.
    pub fn add_indexed_variable<I>(
        &mut self,
        block: BlockId,
        name: &str,
        indices: I,
        variable: Variable,
    ) -> Result<ComponentId, ModelError>
    where
        I: IntoIterator<Item = Index>,
    {
        self.check_name_free(block, name)?;
        let mut members = BTreeMap::new();
        for index in indices {
            let id = self.push_variable(variable)?;
            members.insert(index, id);
        }
        self.declare(block, name, true, ComponentData::Variable(members))
    }

    /// Add a scalar constraint from a comparison expression (e.g., `x + y <= 10`).
    pub fn add_constraint(
        &mut self,
        block: BlockId,
        name: &str,
        constraint: ConstraintExpr,
    ) -> Result<ComponentId, ModelError> {
        let (body, lower, upper) = constraint.into_bounded();
        self.add_bounded_constraint(block, name, body, Bounds::new(lower, upper))
    }

    /// Add a scalar constraint `lower <= body <= upper`.
    pub fn add_bounded_constraint(
        &mut self,
        block: BlockId,
        name: &str,
        body: Expr,
        bounds: Bounds,
    ) -> Result<ComponentId, ModelError> {
        self.validate_constraint(&body, bounds)?;
        let members = BTreeMap::from([(Index::scalar(), ConstraintData::new(body, bounds))]);
        self.declare(block, name, false, ComponentData::Constraint(members))
    }

    /// Add an empty indexed constraint; members are added with [`Model::add_constraint_member`].
    pub fn add_indexed_constraint(
        &mut self,
        block: BlockId,
        name: &str,
    ) -> Result<ComponentId, ModelError> {
        self.declare(block, name, true, ComponentData::Constraint(BTreeMap::new()))
    }

    /// Add one member to an indexed constraint.
    pub fn add_constraint_member(
        &mut self,
        constraint: ComponentId,
        index: Index,
        body: Expr,
        bounds: Bounds,
    ) -> Result<(), ModelError> {
        self.validate_constraint(&body, bounds)?;
        match self.components.get(constraint.index()) {
            Some(Component {
                indexed: true,
                data: ComponentData::Constraint(members),
                ..
            }) => {
                if members.contains_key(&index) {
                    return Err(ModelError::DuplicateIndex {
                        component: self.component_name(constraint),
                        index: index.to_string(),
                    });
                }
            }
            Some(_) => return Err(self.wrong_kind(constraint, "indexed constraint")),
            None => return Err(ModelError::InvalidComponentId(constraint)),
        }
        if let ComponentData::Constraint(members) = &mut self.components[constraint.index()].data {
            members.insert(index, ConstraintData::new(body, bounds));
        }
        Ok(())
    }

    /// Overwrite the body and bounds of an existing constraint member and
    /// make it active again.
    pub fn replace_constraint(
        &mut self,
        constraint: ComponentId,
        index: &Index,
        body: Expr,
        bounds: Bounds,
    ) -> Result<(), ModelError> {
        self.validate_constraint(&body, bounds)?;
        self.constraint(constraint, index)?;
        if let ComponentData::Constraint(members) = &mut self.components[constraint.index()].data {
            members.insert(index.clone(), ConstraintData::new(body, bounds));
        }
        Ok(())
    }

    /// Add a scalar sub-block.
    pub fn add_block(&mut self, parent: BlockId, name: &str) -> Result<BlockId, ModelError> {
        let id = self.declare(parent, name, false, ComponentData::Block(BTreeMap::new()))?;
        self.attach_block_member(id, Index::scalar())
    }

    /// Add an empty indexed block; members are added with [`Model::add_block_member`].
    pub fn add_indexed_block(
        &mut self,
        parent: BlockId,
        name: &str,
    ) -> Result<ComponentId, ModelError> {
        self.declare(parent, name, true, ComponentData::Block(BTreeMap::new()))
    }

    pub fn add_block_member(
        &mut self,
        block: ComponentId,
        index: Index,
    ) -> Result<BlockId, ModelError> {
        self.attach_block_member(block, index)
    }

    /// Add a scalar disjunct with its indicator variable.
    pub fn add_disjunct(&mut self, parent: BlockId, name: &str) -> Result<BlockId, ModelError> {
        let id = self.declare(parent, name, false, ComponentData::Disjunct(BTreeMap::new()))?;
        self.attach_block_member(id, Index::scalar())
    }

    /// Add an empty indexed disjunct; members are added with [`Model::add_disjunct_member`].
    pub fn add_indexed_disjunct(
        &mut self,
        parent: BlockId,
        name: &str,
    ) -> Result<ComponentId, ModelError> {
        self.declare(parent, name, true, ComponentData::Disjunct(BTreeMap::new()))
    }

    pub fn add_disjunct_member(
        &mut self,
        disjunct: ComponentId,
        index: Index,
    ) -> Result<BlockId, ModelError> {
        self.attach_block_member(disjunct, index)
    }

    fn attach_block_member(
        &mut self,
        owner: ComponentId,
        index: Index,
    ) -> Result<BlockId, ModelError> {
        let component = self
            .components
            .get(owner.index())
            .ok_or(ModelError::InvalidComponentId(owner))?;
        let is_disjunct = matches!(component.data, ComponentData::Disjunct(_));
        let Some(members) = component.block_members() else {
            return Err(self.wrong_kind(owner, "block or disjunct"));
        };
        if members.contains_key(&index) {
            return Err(ModelError::DuplicateIndex {
                component: self.component_name(owner),
                index: index.to_string(),
            });
        }
        let parent = component.parent;

        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks
            .push(BlockData::new(Some(parent), Some((owner, index.clone()))));
        if let ComponentData::Block(members) | ComponentData::Disjunct(members) =
            &mut self.components[owner.index()].data
        {
            members.insert(index, id);
        }

        if is_disjunct {
            let indicator = self.add_variable(id, INDICATOR_VAR_NAME, Variable::binary())?;
            self.blocks[id.index()].indicator = Some(indicator);
        }
        Ok(id)
    }

    /// Add a scalar disjunction over existing disjunct data.
    ///
    /// `xor` selects "exactly one" semantics, otherwise "at least one".
    pub fn add_disjunction(
        &mut self,
        parent: BlockId,
        name: &str,
        disjuncts: Vec<BlockId>,
        xor: bool,
    ) -> Result<ComponentId, ModelError> {
        self.ensure_disjuncts(&disjuncts)?;
        let members = BTreeMap::from([(
            Index::scalar(),
            DisjunctionData {
                disjuncts,
                active: true,
            },
        )]);
        self.declare(
            parent,
            name,
            false,
            ComponentData::Disjunction { xor, members },
        )
    }

    /// Add an empty indexed disjunction; members are added with
    /// [`Model::add_disjunction_member`].
    pub fn add_indexed_disjunction(
        &mut self,
        parent: BlockId,
        name: &str,
        xor: bool,
    ) -> Result<ComponentId, ModelError> {
        self.declare(
            parent,
            name,
            true,
            ComponentData::Disjunction {
                xor,
                members: BTreeMap::new(),
            },
        )
    }

    pub fn add_disjunction_member(
        &mut self,
        disjunction: ComponentId,
        index: Index,
        disjuncts: Vec<BlockId>,
    ) -> Result<(), ModelError> {
        self.ensure_disjuncts(&disjuncts)?;
        match self.components.get(disjunction.index()) {
            Some(Component {
                indexed: true,
                data: ComponentData::Disjunction { members, .. },
                ..
            }) => {
                if members.contains_key(&index) {
                    return Err(ModelError::DuplicateIndex {
                        component: self.component_name(disjunction),
                        index: index.to_string(),
                    });
                }
            }
            Some(_) => return Err(self.wrong_kind(disjunction, "indexed disjunction")),
            None => return Err(ModelError::InvalidComponentId(disjunction)),
        }
        if let ComponentData::Disjunction { members, .. } =
            &mut self.components[disjunction.index()].data
        {
            members.insert(
                index,
                DisjunctionData {
                    disjuncts,
                    active: true,
                },
            );
        }
        Ok(())
    }

    fn ensure_disjuncts(&self, disjuncts: &[BlockId]) -> Result<(), ModelError> {
        for id in disjuncts {
            self.indicator_var(*id)?;
        }
        Ok(())
    }

    /// Add an empty suffix to a block.
    pub fn add_suffix(&mut self, block: BlockId, name: &str) -> Result<ComponentId, ModelError> {
        self.declare(block, name, false, ComponentData::Suffix(Suffix::new()))
    }

    /// Insert or replace a suffix entry.
    pub fn set_suffix_value(
        &mut self,
        suffix: ComponentId,
        key: SuffixKey,
        value: impl Into<SuffixValue>,
    ) -> Result<(), ModelError> {
        let component = self
            .components
            .get_mut(suffix.index())
            .ok_or(ModelError::InvalidComponentId(suffix))?;
        if let ComponentData::Suffix(entries) = &mut component.data {
            entries.set(key, value.into());
            return Ok(());
        }
        Err(self.wrong_kind(suffix, "suffix"))
    }

    pub fn add_param(
        &mut self,
        block: BlockId,
        name: &str,
        value: f64,
    ) -> Result<ComponentId, ModelError> {
        let members = BTreeMap::from([(Index::scalar(), value)]);
        self.declare(block, name, false, ComponentData::Param(members))
    }

    pub fn add_set(
        &mut self,
        block: BlockId,
        name: &str,
        members: Vec<Index>,
    ) -> Result<ComponentId, ModelError> {
        self.declare(block, name, false, ComponentData::Set(members))
    }

    pub fn add_connector(
        &mut self,
        block: BlockId,
        name: &str,
        members: BTreeMap<String, VariableId>,
    ) -> Result<ComponentId, ModelError> {
        for var_id in members.values() {
            self.ensure_variable_exists(*var_id)?;
        }
        self.declare(block, name, false, ComponentData::Connector(members))
    }

    pub fn add_objective(
        &mut self,
        block: BlockId,
        name: &str,
        objective: Objective,
    ) -> Result<ComponentId, ModelError> {
        for var_id in objective.expr.variables() {
            self.ensure_variable_exists(var_id)?;
        }
        self.declare(block, name, false, ComponentData::Objective(objective))
    }
}
