//! Disjunction relaxation and selection constraints.

use gdp_core::{Bounds, Index};
use gdp_expr::ids::ComponentId;
use gdp_expr::{Expr, linear_sum};

use crate::error::GdpError;
use crate::relax::Relaxer;

/// Prefix of selection constraint names.
pub const SELECTION_PREFIX: &str = "_gdp_bigm_relaxation_";

impl Relaxer<'_> {
    /// Relax every active member of a disjunction component, then deactivate it.
    pub(crate) fn relax_disjunction(&mut self, disjunction: ComponentId) -> Result<(), GdpError> {
        let indices = self.model.component(disjunction)?.indices();
        for index in indices {
            self.relax_disjunction_datum(disjunction, &index)?;
        }
        self.model.deactivate_component(disjunction)?;
        Ok(())
    }

    /// Relax the disjuncts of one disjunction member and add its selection
    /// constraint row. Inactive members are left alone.
    pub(crate) fn relax_disjunction_datum(
        &mut self,
        disjunction: ComponentId,
        index: &Index,
    ) -> Result<(), GdpError> {
        let datum = self.model.disjunction(disjunction, index)?;
        if !datum.active {
            return Ok(());
        }
        let disjuncts = datum.disjuncts.clone();
        let xor = self.model.disjunction_xor(disjunction)?;

        let mut indicators = Vec::with_capacity(disjuncts.len());
        for disjunct in &disjuncts {
            indicators.push(Expr::var(self.model.indicator_var(*disjunct)?));
            self.relax_disjunct(*disjunct)?;
        }
        let bounds = if xor {
            Bounds::equal_to(1.0)
        } else {
            Bounds::at_least(1.0)
        };
        self.add_selection_row(disjunction, index, linear_sum(indicators), bounds)?;
        self.model.deactivate_disjunction(disjunction, index)?;

        tracing::debug!(
            component = "gdp.bigm",
            operation = "relax_disjunction",
            status = "success",
            disjunction = %self.model.member_name(disjunction, index),
            disjuncts = disjuncts.len(),
            xor,
            "Relaxed disjunction"
        );
        Ok(())
    }

    /// Add the row for `index` to the disjunction's selection constraint.
    ///
    /// The constraint lives on the disjunction's block and is recorded in
    /// that block's info so later calls extend the same component. A scalar
    /// disjunction gets a scalar constraint. A row already present, left by a
    /// disjunction that was reactivated after relaxation, is rebuilt.
    fn add_selection_row(
        &mut self,
        disjunction: ComponentId,
        index: &Index,
        body: Expr,
        bounds: Bounds,
    ) -> Result<(), GdpError> {
        let component = self.model.component(disjunction)?;
        let parent = component.parent();
        let indexed = component.is_indexed();
        let suffix = if self.model.disjunction_xor(disjunction)? {
            "_xor"
        } else {
            "_or"
        };
        let base = format!("{SELECTION_PREFIX}{}{suffix}", component.name());

        let existing = self
            .model
            .block_info(parent)
            .and_then(|info| info.selection_constraints.get(&disjunction).copied());

        let selection = match existing {
            Some(selection) if self.model.component(selection)?.indices().contains(index) => {
                self.model.replace_constraint(selection, index, body, bounds)?;
                selection
            }
            Some(selection) => {
                self.model
                    .add_constraint_member(selection, index.clone(), body, bounds)?;
                selection
            }
            None if indexed => {
                let name = self.model.unique_name(parent, &base);
                let selection = self.model.add_indexed_constraint(parent, &name)?;
                self.model
                    .add_constraint_member(selection, index.clone(), body, bounds)?;
                selection
            }
            None => {
                let name = self.model.unique_name(parent, &base);
                self.model
                    .add_bounded_constraint(parent, &name, body, bounds)?
            }
        };
        self.model
            .block_info_mut(parent)?
            .selection_constraints
            .insert(disjunction, selection);
        Ok(())
    }
}
