//! Macros for reducing boilerplate when defining lab entities

/// Implement [`Entity`](crate::core::entity::Entity) for a struct with an `id: i64` field
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Machine {
///     pub id: i64,
///     pub name: String,
/// }
///
/// impl_lab_entity!(Machine, "machine", "machines");
/// ```
#[macro_export]
macro_rules! impl_lab_entity {
    ($type:ident, $singular:expr, $plural:expr) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        }
    };
}

/// Define the static [`QuerySpec`](crate::core::query::QuerySpec) of an entity
///
/// The spec is built on first use and shared for the life of the process.
///
/// ```rust,ignore
/// impl_query_model!(Machine, || {
///     QuerySpec::new("machine")
///         .filter(FilterDef::contains("machineName", |m: &Machine| Some(m.name.as_str())))
/// });
/// ```
#[macro_export]
macro_rules! impl_query_model {
    ($type:ident, $build:expr) => {
        impl $crate::core::query::QueryModel for $type {
            fn query_spec() -> &'static $crate::core::query::QuerySpec<Self> {
                static SPEC: ::std::sync::OnceLock<$crate::core::query::QuerySpec<$type>> =
                    ::std::sync::OnceLock::new();
                SPEC.get_or_init($build)
            }
        }
    };
}
