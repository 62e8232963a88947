// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 导航模块
//!
//! 结果面板与详情页之间往返的状态机与控制循环

pub mod controller;
pub mod state;

pub use controller::{NavigationController, RecordOutcome, RecordSink, RunReport};
pub use state::{transition, NavEvent, NavigationError, NavigationState};
