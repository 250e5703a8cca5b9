// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Chat API Module
//!
//! POST {prefix}/chat: answers a message with retrieved support context and
//! keeps the exchange in a server-side session.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::chat_handler;
pub use request::ChatRequest;
pub use response::ChatResponse;
