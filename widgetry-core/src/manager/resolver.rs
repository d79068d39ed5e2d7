//! Widget Type Resolvers
//!
//! A resolver maps a widget type id onto a constructible [`WidgetType`]. The
//! manager does not care where types come from; hosts inject one of:
//!
//! - [`AsyncFnResolver`]: any async lookup, e.g. loading a plugin on demand
//! - [`CatalogResolver`]: a table of types registered up front
//! - [`FixedResolver`]: the same type for every id, for tests and demos

use std::future::Future;

use dashmap::DashMap;
use futures_util::future::{self, BoxFuture, FutureExt};

use crate::error::ResolveError;
use crate::widget::{WidgetType, WidgetTypeId};

/// Asynchronously maps type ids to widget types.
pub trait WidgetResolver: Send + Sync {
    /// Look up the widget type registered under `type_id`.
    fn resolve(&self, type_id: &WidgetTypeId) -> BoxFuture<'static, Result<WidgetType, ResolveError>>;
}

/// Resolver backed by an async closure.
pub struct AsyncFnResolver<F> {
    resolve: F,
}

impl<F, Fut> AsyncFnResolver<F>
where
    F: Fn(WidgetTypeId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<WidgetType, ResolveError>> + Send + 'static,
{
    pub fn new(resolve: F) -> Self {
        Self { resolve }
    }
}

impl<F, Fut> WidgetResolver for AsyncFnResolver<F>
where
    F: Fn(WidgetTypeId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<WidgetType, ResolveError>> + Send + 'static,
{
    fn resolve(&self, type_id: &WidgetTypeId) -> BoxFuture<'static, Result<WidgetType, ResolveError>> {
        (self.resolve)(type_id.clone()).boxed()
    }
}

/// Resolver that looks types up in a registered table.
///
/// Lookups complete immediately; unknown ids fail with
/// [`ResolveError::NotFound`].
#[derive(Debug, Default)]
pub struct CatalogResolver {
    types: DashMap<WidgetTypeId, WidgetType>,
}

impl CatalogResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, returning the one it replaced.
    pub fn register(&self, type_id: impl Into<WidgetTypeId>, ty: WidgetType) -> Option<WidgetType> {
        self.types.insert(type_id.into(), ty)
    }

    /// Register a [`BasicWidget`](crate::widget::BasicWidget) type under its own name.
    pub fn register_basic(&self, name: &str) -> Option<WidgetType> {
        self.register(name, WidgetType::basic(name))
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(self, type_id: impl Into<WidgetTypeId>, ty: WidgetType) -> Self {
        self.register(type_id, ty);
        self
    }

    pub fn unregister(&self, type_id: &str) -> Option<WidgetType> {
        self.types.remove(type_id).map(|(_, ty)| ty)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl WidgetResolver for CatalogResolver {
    fn resolve(&self, type_id: &WidgetTypeId) -> BoxFuture<'static, Result<WidgetType, ResolveError>> {
        let resolved = self
            .types
            .get(type_id.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ResolveError::NotFound {
                type_id: type_id.clone(),
            });
        future::ready(resolved).boxed()
    }
}

/// Resolver returning one fixed type for every id.
#[derive(Debug, Clone)]
pub struct FixedResolver {
    ty: WidgetType,
}

impl FixedResolver {
    pub fn new(ty: WidgetType) -> Self {
        Self { ty }
    }
}

impl WidgetResolver for FixedResolver {
    fn resolve(&self, _type_id: &WidgetTypeId) -> BoxFuture<'static, Result<WidgetType, ResolveError>> {
        future::ready(Ok(self.ty.clone())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_resolves_registered_types() {
        let catalog = CatalogResolver::new().with("X", WidgetType::basic("XWidget"));
        catalog.register_basic("Y");
        assert_eq!(catalog.len(), 2);

        let ty = catalog.resolve(&"X".into()).await.unwrap();
        assert_eq!(ty.name(), "XWidget");

        let err = catalog.resolve(&"Z".into()).await.unwrap_err();
        assert_eq!(err, ResolveError::NotFound { type_id: "Z".into() });
    }

    #[tokio::test]
    async fn catalog_unregister_removes_type() {
        let catalog = CatalogResolver::new();
        catalog.register_basic("X");
        assert!(catalog.contains("X"));

        assert!(catalog.unregister("X").is_some());
        assert!(catalog.is_empty());
        assert!(catalog.resolve(&"X".into()).await.is_err());
    }

    #[tokio::test]
    async fn fixed_resolver_ignores_id() {
        let resolver = FixedResolver::new(WidgetType::basic("TestWidget"));
        for id in ["A", "B"] {
            let ty = resolver.resolve(&id.into()).await.unwrap();
            assert_eq!(ty.name(), "TestWidget");
        }
    }

    #[tokio::test]
    async fn async_fn_resolver_runs_closure() {
        let resolver = AsyncFnResolver::new(|type_id: WidgetTypeId| async move {
            tokio::task::yield_now().await;
            if type_id.as_str().ends_with("Widget") {
                Ok(WidgetType::basic(type_id.as_str()))
            } else {
                Err(ResolveError::Failed {
                    type_id,
                    message: "module not found".into(),
                })
            }
        });

        assert_eq!(resolver.resolve(&"FirstWidget".into()).await.unwrap().name(), "FirstWidget");
        let err = resolver.resolve(&"nope".into()).await.unwrap_err();
        assert!(err.to_string().contains("module not found"));
    }
}
