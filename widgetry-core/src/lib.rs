//! Widgetry Core
//!
//! This crate lazily attaches widgets to the nodes of a DOM-like tree.
//! It implements:
//!
//! - A widget lifecycle state machine with externally signaled completion
//! - A manager that keeps one instance per widget type
//! - Concurrent initialization walks that never initialize a type twice
//! - Destruction sweeps that cancel initializations still in flight
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `tree`: the node capability the manager walks, plus an in-memory DOM
//! - `widget`: the widget contract, lifecycle and a basic widget
//! - `manager`: the registry, type resolvers and tree walks
//! - `config`: manager settings, loadable from JSON
//! - `error`: error types shared by all of the above
//!
//! # Example
//!
//! ```rust,ignore
//! use widgetry_core::manager::{CatalogResolver, WidgetManager};
//! use widgetry_core::tree::{Element, TreeNode};
//!
//! let catalog = CatalogResolver::new();
//! catalog.register_basic("Clock");
//! let manager = WidgetManager::new(catalog);
//!
//! let root = Element::div().with_widget("Clock").into_shared();
//! manager.spawn_init(root.clone(), |initialized, errors| {
//!     println!("initialized {initialized} widgets, errors: {errors:?}");
//! });
//!
//! // Later, once the clock has whatever it needs:
//! root.widget_instance().unwrap().done();
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod tree;
pub mod widget;

pub use config::ManagerConfig;
pub use error::{ConfigError, ResolveError, WidgetError};
pub use manager::{InitReport, WidgetManager};
pub use tree::{Element, NodeRef, TreeNode};
pub use widget::{BasicWidget, Widget, WidgetLifecycle, WidgetState, WidgetType, WidgetTypeId};
