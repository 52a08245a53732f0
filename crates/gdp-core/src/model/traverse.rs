//! Deterministic traversal of the block tree.

use gdp_expr::ids::{BlockId, ComponentId};

use crate::index::Index;
use crate::model::{ComponentData, Model};

impl Model {
    /// Active disjunction data reachable from `block`, innermost first.
    ///
    /// Sub-blocks and disjuncts are visited in declaration order with their
    /// members in index order; a block's own disjunctions come after
    /// everything nested below it. Inactive blocks and disjuncts are not
    /// descended into.
    pub fn active_disjunctions_postorder(&self, block: BlockId) -> Vec<(ComponentId, Index)> {
        let mut out = Vec::new();
        self.collect_disjunctions(block, &mut out);
        out
    }

    fn collect_disjunctions(&self, block: BlockId, out: &mut Vec<(ComponentId, Index)>) {
        let Some(data) = self.blocks.get(block.index()) else {
            return;
        };
        if !data.active {
            return;
        }
        for id in &data.components {
            let component = &self.components[id.index()];
            if !component.active {
                continue;
            }
            if let ComponentData::Block(members) | ComponentData::Disjunct(members) =
                &component.data
            {
                for child in members.values() {
                    self.collect_disjunctions(*child, out);
                }
            }
        }
        for id in &data.components {
            let component = &self.components[id.index()];
            if !component.active {
                continue;
            }
            if let ComponentData::Disjunction { members, .. } = &component.data {
                out.extend(
                    members
                        .iter()
                        .filter(|(_, datum)| datum.active)
                        .map(|(index, _)| (*id, index.clone())),
                );
            }
        }
    }

    /// `block` followed by each enclosing block up to the root.
    pub fn ancestors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        std::iter::successors(
            self.blocks.get(block.index()).map(|_| block),
            move |current| self.blocks.get(current.index()).and_then(|data| data.parent),
        )
    }
}
