//! # Universal Data Connector
//!
//! A read-only query layer that lets voice assistants and LLM function calls
//! reach business data (CRM customers, support tickets, analytics metrics)
//! through one uniform interface.
//!
//! Every query returns the same envelope: the page of records, a data-type
//! classification, pagination state and, in voice mode, a one-sentence
//! spoken summary with a freshness note and a follow-up suggestion.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────────────────────┐
//! │ RecordStore  │──▶│ Connectors  │──▶│ DataService                  │
//! │ JSON blobs   │   │ crm/support │   │ classify → paginate → voice  │
//! └──────────────┘   │ /analytics  │   └──────────────┬───────────────┘
//!                    └─────────────┘                  │
//!                                     ┌───────────────┤
//!                                     ▼               ▼
//!                                ┌──────────┐   ┌──────────┐
//!                                │   CLI    │   │   HTTP   │
//!                                │  (udc)   │   │  (axum)  │
//!                                └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! udc generate --seed 7            # write mock data to ./data
//! udc sources                      # check what is available
//! udc query crm --param status=active
//! udc serve                        # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Envelope, pagination and voice types |
//! | [`store`] | Blob storage and record loading |
//! | [`records`] | Field access and sorting helpers |
//! | [`params`] | Parameter schemas and validation |
//! | [`traits`] | `Connector`/`Source` traits and the source registry |
//! | [`connector_crm`] | Customer records |
//! | [`connector_support`] | Support tickets |
//! | [`connector_analytics`] | Metric time series |
//! | [`classify`] | Result-set shape detection |
//! | [`rules`] | Pagination and limits |
//! | [`voice`] | Spoken summaries and freshness |
//! | [`query`] | Query orchestration |
//! | [`server`] | HTTP server |
//! | [`sources`] | Source status listing |
//! | [`mockdata`] | Mock data generation |
//! | [`logging`] | Tracing subscriber setup |

pub mod classify;
pub mod config;
pub mod connector_analytics;
pub mod connector_crm;
pub mod connector_support;
pub mod logging;
pub mod mockdata;
pub mod models;
pub mod params;
pub mod query;
pub mod records;
pub mod rules;
pub mod server;
pub mod sources;
pub mod store;
pub mod traits;
pub mod voice;
