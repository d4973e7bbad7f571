//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization, through the extractors in [`crate::api::extract`]
//! - Calling the matching service on [`crate::AppState`]
//! - Wrapping the result in the `{message, data}` envelope
//!
//! # Handler Modules
//!
//! - [`campaigns`]: Campaign CRUD, CPC overwrite and refresh
//! - [`ad_groups`]: Ad groups of a campaign, CPC overwrite and refresh
//! - [`keywords`]: Keywords of an ad group, CPC and metrics refresh
//! - [`demographics`]: Per-user demographics, aggregates and batch refreshes
//! - [`info`]: Service banner at the API root
//!
//! # Identity
//!
//! Listing and creating campaigns require the user ID header (see
//! [`crate::auth::current_user::CurrentUser`]). Other routes address resources by ID.

pub mod ad_groups;
pub mod campaigns;
pub mod demographics;
pub mod info;
pub mod keywords;
