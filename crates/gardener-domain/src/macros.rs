//! Registry infrastructure macros
//!
//! Used by the `registry/` modules for provider auto-registration via
//! `linkme` distributed slices.

/// Implement the lookup surface for one provider family.
///
/// Generates the entry type, the distributed slice, and map-indexed
/// resolve/list functions. Providers register with
/// `#[linkme::distributed_slice(SLICE)]` from the providers crate; the
/// name index over the slice is built once, on first lookup.
#[macro_export]
macro_rules! impl_registry {
    (
        provider_trait: $trait:path,
        config_type: $config:ty,
        entry_type: $entry:ident,
        slice_name: $slice:ident,
        resolve_fn: $resolve:ident,
        list_fn: $list:ident
    ) => {
        /// Registry entry for one provider implementation
        pub struct $entry {
            /// Unique provider name selected by configuration
            pub name: &'static str,
            /// One-line summary shown in provider listings
            pub summary: &'static str,
            /// Constructor; failures are reported as strings and mapped
            /// into configuration errors by the resolver
            pub build: fn(&$config) -> std::result::Result<std::sync::Arc<dyn $trait>, String>,
        }

        /// All registered providers of this family.
        #[linkme::distributed_slice]
        pub static $slice: [$entry] = [..];

        fn registry_index()
        -> &'static std::collections::BTreeMap<&'static str, &'static $entry> {
            static INDEX: std::sync::OnceLock<
                std::collections::BTreeMap<&'static str, &'static $entry>,
            > = std::sync::OnceLock::new();
            INDEX.get_or_init(|| $slice.iter().map(|entry| (entry.name, entry)).collect())
        }

        /// Resolve a provider by the name in `config`.
        ///
        /// # Errors
        ///
        /// Returns a configuration error when the name is unknown or the
        /// provider constructor fails.
        pub fn $resolve(config: &$config) -> $crate::error::Result<std::sync::Arc<dyn $trait>> {
            let index = registry_index();
            let Some(entry) = index.get(config.provider.as_str()) else {
                let known: Vec<&str> = index.keys().copied().collect();
                return Err($crate::error::Error::config(format!(
                    "no registered provider matches '{}'; known: {}",
                    config.provider,
                    known.join(", ")
                )));
            };
            (entry.build)(config).map_err($crate::error::Error::config)
        }

        /// Registered `(name, summary)` pairs, ordered by name.
        pub fn $list() -> Vec<(&'static str, &'static str)> {
            registry_index()
                .values()
                .map(|entry| (entry.name, entry.summary))
                .collect()
        }
    };
}

/// Generate `new()` plus `with_*` builder methods for a provider config.
///
/// Every builder method accepts `impl Into<T>`, so string fields take
/// `&str` and owned values alike, and plain types pass through the
/// identity conversion.
#[macro_export]
macro_rules! impl_config_builder {
    (
        $config:ident {
            $(
                $(#[doc = $doc:literal])*
                $field:ident : $method:ident ( $ty:ty )
            ),* $(,)?
        }
    ) => {
        impl $config {
            /// Select the named provider with otherwise default options.
            pub fn new(provider: impl Into<String>) -> Self {
                Self {
                    provider: provider.into(),
                    ..Self::default()
                }
            }

            $(
                $(#[doc = $doc])*
                #[must_use]
                pub fn $method(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}
