//! Script Panels Core Library
//!
//! This crate provides the core of script panels: small UIs that each wrap a
//! shell script, collect a single argument, run the script and stream its
//! combined output back into a text view.
//!
//! # Key Features
//!
//! - **Script Definitions**: Load panels from YAML or discover `*.sh` scripts in a directory
//! - **Process Runner**: Launch `<interpreter> <script> <argument>` and stream merged stdout/stderr
//! - **Panel Controller**: The idle/running/finished/failed state machine behind one panel
//! - **Configuration Management**: Resolve definition, script and interpreter paths
//! - **Error Handling**: One error type for every failure mode
//!
//! # Examples
//!
//! Running a panel to completion:
//!
//! ```no_run
//! use script_panels_core::file_handling::get_script_definitions;
//! use script_panels_core::panel::{PanelController, RunRequest};
//! use script_panels_core::runner::ProcessRunner;
//!
//! # async fn run() -> script_panels_core::error::Result<()> {
//! let definitions = get_script_definitions("scripts.yml")?;
//! let mut panel = PanelController::new(definitions[0].clone(), ProcessRunner::default());
//!
//! if let RunRequest::Started(mut events) = panel.request_run("Ada") {
//!     while let Some(update) = events.recv().await {
//!         panel.apply(update);
//!     }
//! }
//! println!("{}\n{}", panel.output_text(), panel.status_text());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod file_handling;
pub mod panel;
pub mod runner;
pub mod script_definitions;
