//! Command-line presentation layer.
//!
//! - `session`: the Register / Login / Dashboard state machine
//! - `render`: text dashboard
//! - `commands`: subcommand handlers over the application services

mod commands;
mod render;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::domain::Role;

pub use commands::{assess_document, read_password, run};
pub use render::{render_assessment, render_dashboard, render_patient_list, RenderOptions};
pub use session::{CurrentUser, Page, SessionContext, TransitionError};

/// vitalwatch - vital-sign alerting dashboard
#[derive(Parser, Debug)]
#[command(name = "vitalwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// User store (overrides VITALWATCH_USERS_FILE)
    #[arg(long, global = true)]
    pub users_file: Option<PathBuf>,

    /// Vitals document (overrides VITALWATCH_VITALS_FILE)
    #[arg(long, global = true)]
    pub vitals_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Apply command-line path overrides on top of the environment.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(path) = &self.users_file {
            config.users_file.clone_from(path);
        }
        if let Some(path) = &self.vitals_file {
            config.vitals_file.clone_from(path);
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a new user (password read from stdin)
    Register {
        username: String,

        /// doctor, health_worker or viewer
        #[arg(long)]
        role: Option<Role>,
    },

    /// Sign in and show the dashboard (password read from stdin)
    Login {
        username: String,

        /// Show only this patient
        #[arg(short, long)]
        patient: Option<String>,
    },

    /// Evaluate readings and print the assessments as JSON
    Assess {
        /// Evaluate only this patient
        #[arg(short, long)]
        patient: Option<String>,
    },

    /// List patients with their worst alert level
    #[command(alias = "ls")]
    Patients,

    /// Export one patient's reading as JSON
    Export {
        patient: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
