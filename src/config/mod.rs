// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process configuration loaded from the environment at startup

pub mod settings;

pub use settings::{ConfigError, Settings, VectorStoreBackend};
