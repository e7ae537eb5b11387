//! Web server for browser-based reconciliation.
//!
//! This module provides an upload form using Axum. Users upload a transaction
//! table and a delivery table and download the annotated workbook.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! fuel-recon serve
//!
//! # Custom port and auto-open browser
//! fuel-recon serve --port 3000 --open
//!
//! # Bind to all interfaces, reading transactions from a named sheet
//! fuel-recon serve --address 0.0.0.0 --transaction-sheet รถมีนา
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Upload form
//! - `POST /process` - Reconcile `transaction_file` against `delivery_file`
//!   (multipart form) and return `result.xlsx`

pub mod format_detection;
pub mod server;
