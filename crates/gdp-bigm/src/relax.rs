//! Disjunct and constraint relaxation.

use gdp_core::{Bounds, ComponentData, ComponentKind, Index, Model, RelaxedBlockInfo};
use gdp_expr::Expr;
use gdp_expr::ids::{BlockId, ComponentId, VariableId};

use crate::config::BigMArgs;
use crate::error::GdpError;
use crate::resolve::resolve_m;

/// Index tags of the lower and upper relaxed inequalities.
pub const LOWER_TAG: &str = "lb";
pub const UPPER_TAG: &str = "ub";

/// Blocks receiving the output of one transformation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransformationArea {
    pub(crate) block: BlockId,
    /// Indexed block with one member per relaxed disjunct.
    pub(crate) relaxed_disjuncts: ComponentId,
}

pub(crate) struct Relaxer<'a> {
    pub(crate) model: &'a mut Model,
    pub(crate) area: TransformationArea,
    pub(crate) big_m: Option<&'a BigMArgs>,
}

impl Relaxer<'_> {
    /// Relax one disjunct datum into a fresh member of `relaxed_disjuncts`.
    ///
    /// A disjunct deactivated by the user is dropped from the model by
    /// fixing its indicator to zero. A disjunct left half relaxed by a failed
    /// call resumes on the block it was given then.
    pub(crate) fn relax_disjunct(&mut self, disjunct: BlockId) -> Result<(), GdpError> {
        let indicator = self.model.indicator_var(disjunct)?;
        let (relaxed, bigm) = self
            .model
            .disjunct_info(disjunct)
            .map_or((false, None), |info| (info.relaxed, info.bigm));
        if relaxed {
            return Ok(());
        }

        if !self.model.is_block_active(disjunct) {
            self.model.fix_variable(indicator, 0.0)?;
            tracing::debug!(
                component = "gdp.bigm",
                operation = "relax_disjunct",
                status = "skipped",
                disjunct = %self.model.block_name(disjunct),
                "Fixed indicator of deactivated disjunct"
            );
            return Ok(());
        }

        let relaxed_block = match bigm {
            Some(block) => block,
            None => {
                let slot = self
                    .model
                    .component(self.area.relaxed_disjuncts)?
                    .indices()
                    .len();
                let block = self
                    .model
                    .add_block_member(self.area.relaxed_disjuncts, Index::from(slot as i64))?;
                self.model
                    .set_relaxed_block_info(block, RelaxedBlockInfo { src: disjunct })?;
                self.model.disjunct_info_mut(disjunct)?.bigm = Some(block);
                block
            }
        };

        self.relax_block_components(disjunct, disjunct, indicator, relaxed_block)?;

        self.model.deactivate_block(disjunct)?;
        self.model.disjunct_info_mut(disjunct)?.relaxed = true;
        tracing::debug!(
            component = "gdp.bigm",
            operation = "relax_disjunct",
            status = "success",
            disjunct = %self.model.block_name(disjunct),
            relaxed_block = %self.model.block_name(relaxed_block),
            resumed = bigm.is_some(),
            "Relaxed disjunct"
        );
        Ok(())
    }

    /// Dispatch every active component of `block`, which is `disjunct` itself
    /// or a block nested inside it.
    fn relax_block_components(
        &mut self,
        block: BlockId,
        disjunct: BlockId,
        indicator: VariableId,
        relaxed_block: BlockId,
    ) -> Result<(), GdpError> {
        let components = self.model.block(block)?.components().to_vec();
        for id in components {
            if !self.model.is_component_active(id) {
                continue;
            }
            match self.model.component(id)?.kind() {
                ComponentKind::Constraint => {
                    self.relax_constraint(id, disjunct, indicator, relaxed_block)?;
                }
                ComponentKind::Variable
                | ComponentKind::Connector
                | ComponentKind::Suffix
                | ComponentKind::Param
                | ComponentKind::Set => {}
                ComponentKind::Block => {
                    for child in self.active_block_members(id)? {
                        self.relax_block_components(child, disjunct, indicator, relaxed_block)?;
                    }
                }
                ComponentKind::Disjunction => {
                    if let Some(index) = self.first_active_disjunction(id)? {
                        return Err(GdpError::UntransformedDisjunction {
                            disjunction: self.model.member_name(id, &index),
                            disjunct: self.model.block_name(disjunct),
                        });
                    }
                }
                ComponentKind::Disjunct => {
                    if let Some(nested) = self.active_block_members(id)?.first() {
                        return Err(GdpError::ActiveNestedDisjunct {
                            nested: self.model.block_name(*nested),
                            disjunct: self.model.block_name(disjunct),
                        });
                    }
                }
                kind @ ComponentKind::Objective => {
                    return Err(GdpError::UnsupportedComponent {
                        component: self.model.component_name(id),
                        kind: kind.as_str(),
                    });
                }
            }
        }
        Ok(())
    }

    fn active_block_members(&self, id: ComponentId) -> Result<Vec<BlockId>, GdpError> {
        let component = self.model.component(id)?;
        Ok(component
            .block_members()
            .map(|members| {
                members
                    .values()
                    .copied()
                    .filter(|block| self.model.is_block_active(*block))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn first_active_disjunction(&self, id: ComponentId) -> Result<Option<Index>, GdpError> {
        let component = self.model.component(id)?;
        let ComponentData::Disjunction { members, .. } = component.data() else {
            return Ok(None);
        };
        Ok(members
            .iter()
            .find(|(_, datum)| datum.active)
            .map(|(index, _)| index.clone()))
    }

    /// Replace each active member of a constraint by its relaxed inequalities
    /// on `relaxed_block`, keyed by the original index plus a bound tag.
    ///
    /// A member is deactivated only once its rows exist, so an estimation
    /// error leaves it in place for the next call.
    fn relax_constraint(
        &mut self,
        constraint: ComponentId,
        disjunct: BlockId,
        indicator: VariableId,
        relaxed_block: BlockId,
    ) -> Result<(), GdpError> {
        let recorded = self
            .model
            .disjunct_info(disjunct)
            .and_then(|info| info.relaxed_constraints.get(&constraint).copied());
        let relaxed = match recorded {
            Some(relaxed) => relaxed,
            None => {
                let name = self
                    .model
                    .unique_name(relaxed_block, self.model.component(constraint)?.name());
                let relaxed = self.model.add_indexed_constraint(relaxed_block, &name)?;
                self.model
                    .disjunct_info_mut(disjunct)?
                    .relaxed_constraints
                    .insert(constraint, relaxed);
                relaxed
            }
        };

        for index in self.model.component(constraint)?.indices() {
            let data = self.model.constraint(constraint, &index)?.clone();
            if !data.active {
                continue;
            }
            let label = self.model.member_name(constraint, &index);
            let (m_lo, m_hi) =
                resolve_m(self.model, self.big_m, constraint, &index, &data, &label)?;

            if let (Some(lower), Some(m)) = (data.bounds.lower_bound(), m_lo) {
                self.model.add_constraint_member(
                    relaxed,
                    index.with(LOWER_TAG),
                    relax_body(&data.body, indicator, m),
                    Bounds::at_least(lower),
                )?;
            }
            if let (Some(upper), Some(m)) = (data.bounds.upper_bound(), m_hi) {
                self.model.add_constraint_member(
                    relaxed,
                    index.with(UPPER_TAG),
                    relax_body(&data.body, indicator, m),
                    Bounds::at_most(upper),
                )?;
            }
            self.model.deactivate_constraint(constraint, &index)?;
        }
        Ok(())
    }
}

/// `body - m * (1 - indicator)`
fn relax_body(body: &Expr, indicator: VariableId, m: f64) -> Expr {
    body.add(&Expr::term(indicator, m)).add_constant(-m)
}
