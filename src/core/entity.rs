//! Entity trait defining the core abstraction for all lab records

/// Base trait for every persisted record kind.
///
/// All entities have a store-assigned integer id and a pair of resource names
/// used for routing and error messages.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "batches")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "batch")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> i64;

    /// Set the identifier (called by the store on insert/update)
    fn set_id(&mut self, id: i64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct TestEntity {
        id: i64,
    }

    impl Entity for TestEntity {
        fn resource_name() -> &'static str {
            "test_entities"
        }

        fn resource_name_singular() -> &'static str {
            "test_entity"
        }

        fn id(&self) -> i64 {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = id;
        }
    }

    #[test]
    fn test_entity_metadata() {
        assert_eq!(TestEntity::resource_name(), "test_entities");
        assert_eq!(TestEntity::resource_name_singular(), "test_entity");
    }

    #[test]
    fn test_set_id() {
        let mut entity = TestEntity { id: 0 };
        entity.set_id(42);
        assert_eq!(entity.id(), 42);
    }
}
