//! CLI infrastructure for the facility location game toolkit
//!
//! This module provides the command-line interface for running simulations
//! and inspecting generated environments.

pub mod commands;
pub mod output;
