//! Widget Trees
//!
//! This module defines the capability the manager needs from the tree it walks,
//! plus an in-memory implementation.
//!
//! # Overview
//!
//! The manager never owns the tree. It only asks a node for:
//!
//! - the attribute holding its widget type id
//! - its ordered children
//! - a slot where the initializing widget leaves a weak back-reference
//!
//! Widgets additionally tag nodes with status classes and attach a content
//! element while they are alive.
//!
//! Hosts that already have a document model implement [`TreeNode`] for their
//! own node type. [`Element`] is a small thread-safe DOM used by tests,
//! benchmarks and hosts without one.

mod element;
mod node;

pub use element::{Element, ElementSpec};
pub use node::{same_node, ContentElement, NodeRef, TreeNode};
