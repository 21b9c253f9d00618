//! Warehouse cell monitor.
//!
//! Serves the live status of storage cells from a SQL Server table to LAN
//! clients as a small JSON API plus a static web app. The host drives the
//! service through [`Service::start`] and [`Service::stop`].
//!
//! All JSON routes live under the `/api` prefix: `GET /api/cells`,
//! `GET /api/stats` and `GET /api/health`. Every other path is answered from
//! the static directory.

pub mod cells;
pub mod config;
pub mod db;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use cells::{Cell, StatsSummary};
pub use config::ServiceConfig;
pub use lifecycle::{Service, ServiceError, ServiceState};
