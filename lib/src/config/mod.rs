//! Configuration module for support generation settings.
//!
//! This module provides the [`SupportConfig`] type controlling the overhang
//! threshold, Z gaps, interface layers and grid resolution.

mod support_config;

pub use support_config::{SupportConfig, COS_ANGLE_TOLERANCE, DEFAULT_GRID_CELL_SIZE};
