//! Entry point of the Big-M transformation.

use std::time::Instant;

use gdp_core::{ComponentKind, ComponentUid, Found, Index, Model};
use gdp_expr::ids::BlockId;

use crate::config::TransformConfig;
use crate::error::GdpError;
use crate::relax::{LOWER_TAG, Relaxer, TransformationArea, UPPER_TAG};

/// Base name of the block holding relaxed disjuncts.
pub const AREA_NAME: &str = "_gdp_bigm_relaxation";
pub const RELAXED_DISJUNCTS_NAME: &str = "relaxed_disjuncts";
pub const LBUB_NAME: &str = "lbub";

/// The Big-M relaxation of generalized disjunctive programs.
///
/// Each disjunct constraint `lower <= body <= upper` guarded by indicator
/// `y` becomes `lower <= body - M_lo (1 - y)` and `body - M_hi (1 - y) <= upper`
/// on a block of the transformation area, and each disjunction gains a
/// constraint on the sum of its indicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigM;

impl BigM {
    /// Relax the configured targets of `model` in place.
    ///
    /// On error the model may be left partially transformed; a later call
    /// resumes the disjuncts left unfinished.
    pub fn apply(model: &mut Model, config: &TransformConfig) -> Result<(), GdpError> {
        let started = Instant::now();
        let area = transformation_area(model)?;
        let mut relaxer = Relaxer {
            model,
            area,
            big_m: config.big_m.as_ref(),
        };

        match &config.targets {
            None => {
                let root = relaxer.model.root();
                relaxer.relax_nested(root)?;
            }
            Some(targets) => {
                for target in targets {
                    relaxer.relax_target(target)?;
                }
            }
        }

        let relaxed_disjuncts = relaxer
            .model
            .component(area.relaxed_disjuncts)?
            .indices()
            .len();
        tracing::debug!(
            component = "gdp.bigm",
            operation = "apply",
            status = "success",
            area = %relaxer.model.block_name(area.block),
            targets = config.targets.as_ref().map_or(0, Vec::len),
            relaxed_disjuncts,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Applied Big-M transformation"
        );
        Ok(())
    }
}

/// Reuse the area recorded by an earlier call, or declare a new one on the root.
fn transformation_area(model: &mut Model) -> Result<TransformationArea, GdpError> {
    if let Some(block) = model.bigm_area() {
        if let Some(relaxed_disjuncts) = model.find_child(block, RELAXED_DISJUNCTS_NAME) {
            return Ok(TransformationArea {
                block,
                relaxed_disjuncts,
            });
        }
    }

    let root = model.root();
    let name = model.unique_name(root, AREA_NAME);
    let block = model.add_block(root, &name)?;
    let relaxed_disjuncts = model.add_indexed_block(block, RELAXED_DISJUNCTS_NAME)?;
    model.add_set(
        block,
        LBUB_NAME,
        vec![Index::from(LOWER_TAG), Index::from(UPPER_TAG)],
    )?;
    model.set_bigm_area(block)?;
    tracing::debug!(
        component = "gdp.bigm",
        operation = "create_area",
        status = "success",
        name = name.as_str(),
        "Declared transformation area"
    );
    Ok(TransformationArea {
        block,
        relaxed_disjuncts,
    })
}

impl Relaxer<'_> {
    fn relax_target(&mut self, target: &ComponentUid) -> Result<(), GdpError> {
        let found = self
            .model
            .find_component(target)
            .ok_or_else(|| GdpError::TargetNotFound(target.to_string()))?;

        match found {
            Found::Data(id, index) => {
                let kind = self.model.component(id)?.kind();
                match kind {
                    ComponentKind::Disjunction => {
                        if self.model.disjunction(id, &index)?.active {
                            self.relax_disjunction_datum(id, &index)?;
                        }
                    }
                    ComponentKind::Block | ComponentKind::Disjunct => {
                        let block = self.model.block_member(id, &index)?;
                        if self.model.is_block_active(block) {
                            self.relax_nested(block)?;
                        }
                    }
                    other => {
                        return Err(GdpError::InvalidTarget {
                            target: self.model.member_name(id, &index),
                            kind: other.as_str(),
                        });
                    }
                }
            }
            Found::Component(id) => {
                if !self.model.is_component_active(id) {
                    return Ok(());
                }
                let component = self.model.component(id)?;
                match component.kind() {
                    ComponentKind::Disjunction => self.relax_disjunction(id)?,
                    ComponentKind::Block | ComponentKind::Disjunct => {
                        let blocks: Vec<BlockId> = component
                            .block_members()
                            .map(|members| members.values().copied().collect())
                            .unwrap_or_default();
                        for block in blocks {
                            if self.model.is_block_active(block) {
                                self.relax_nested(block)?;
                            }
                        }
                    }
                    other => {
                        return Err(GdpError::InvalidTarget {
                            target: self.model.component_name(id),
                            kind: other.as_str(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Relax every active disjunction inside `block`, innermost first.
    fn relax_nested(&mut self, block: BlockId) -> Result<(), GdpError> {
        for (id, index) in self.model.active_disjunctions_postorder(block) {
            self.relax_disjunction_datum(id, &index)?;
        }
        Ok(())
    }
}
