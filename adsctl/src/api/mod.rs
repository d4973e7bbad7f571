//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`extract`]**: Extractors that turn malformed input into `400` error envelopes
//!
//! # API Structure
//!
//! Every route is nested under `/api/v1`:
//!
//! - **Campaigns** (`/campaigns/*`): Campaigns of the identified user and their ad groups
//! - **Ad groups** (`/adgroups/*`): Ad groups and their keywords
//! - **Keywords** (`/keywords/*`): Keyword CPC and performance metrics
//! - **Demographics** (`/demographics/*`): Per-user demographics and batch refreshes
//!
//! Successful responses are wrapped as `{"message": ..., "data": ...}`; failures as
//! `{"error": ...}`.
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod extract;
pub mod handlers;
pub mod models;
