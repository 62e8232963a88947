// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 页面驱动模块
//!
//! 封装浏览器自动化细节，向导航控制器暴露统一的页面操作接口

pub mod chromium;
pub mod selectors;
pub mod traits;

pub use traits::{DriverError, DriverFactory, ElementHandle, ListingLink, PageDriver};
