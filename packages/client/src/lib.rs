//! Lexpanel client - typed access to the legal-services admin backend.
//!
//! This crate holds everything a console screen needs that is not HTTP
//! serving: the backend contract, one generic list abstraction, row and
//! bulk actions, form drafts, and exports.
//!
//! # Example
//!
//! ```
//! use lexpanel_client::export::{format_records, to_csv};
//! use lexpanel_client::slug::slugify;
//!
//! assert_eq!(slugify("Privacy & Cookies!!"), "privacy-cookies");
//!
//! let rows = format_records(&[serde_json::json!({ "a": "x,y", "b": 1 })], &[]).unwrap();
//! assert_eq!(to_csv(&rows).unwrap(), "a,b\n\"x,y\",1\n");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Environment-driven client configuration
//! - [`error`]: Error types and Result alias
//! - [`models`]: Response contracts for every endpoint
//! - [`api`]: HTTP client for the backend
//! - [`resource`]: Generic list state, filters and stale-response guard
//! - [`mutation`]: Row and bulk actions followed by a refetch
//! - [`form`]: Create/edit drafts and submission
//! - [`export`]: CSV and JSON export
//! - [`slug`]: Title to slug conversion
//! - [`notice`]: User-facing notices
//! - [`cli`]: Command-line interface

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod models;
pub mod mutation;
pub mod notice;
pub mod resource;
pub mod slug;

pub use api::BackendClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use models::{
    Activity, AiReporterSettings, Article, ArticleStatus, ContentItem, ContentStatus, Lawyer,
    Policy, PolicyStatus, RecordId, Role, SessionUser, Stats, Transaction, User,
};
pub use mutation::{Mutation, MutationSink, Selection};
pub use resource::{ListController, ListQuery, ListSource, Resource, ResourceKind, ResourceList};
