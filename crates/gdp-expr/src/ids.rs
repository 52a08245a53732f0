macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Get the inner u32 value.
            pub fn inner(self) -> u32 {
                self.0
            }

            /// Create an ID from a u32 value.
            pub fn new(value: u32) -> Self {
                Self(value)
            }

            /// Position of this ID in its owning arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id_type!(VariableId);
define_id_type!(ComponentId);
define_id_type!(BlockId);

impl BlockId {
    /// The top-level block of every model.
    pub const ROOT: BlockId = BlockId(0);
}

#[cfg(test)]
mod tests {
    use super::{BlockId, ComponentId, VariableId};

    #[test]
    fn variable_id_roundtrip() {
        let id = VariableId::new(7);
        assert_eq!(id.inner(), 7);
        assert_eq!(id.index(), 7);
    }

    #[test]
    fn component_id_roundtrip() {
        let id = ComponentId::new(11);
        assert_eq!(id.inner(), 11);
    }

    #[test]
    fn root_block_is_zero() {
        assert_eq!(BlockId::ROOT, BlockId::new(0));
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let rendered = serde_json::to_string(&BlockId::new(3)).unwrap();
        assert_eq!(rendered, "3");
    }
}
