// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 导航状态
///
/// 结果面板与详情页之间往返的有限状态机。
/// Aborted 为吸收态，进入后任何事件不再改变状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    /// 停留在结果面板
    AtResults,
    /// 停留在某个详情页
    AtDetail,
    /// 正在从详情页返回结果面板
    Returning,
    /// 正在执行恢复导航
    Recovering,
    /// 已放弃，会话不可恢复或恢复次数耗尽
    Aborted,
}

/// 导航事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// 详情页打开成功
    ListingOpened,
    /// 详情页打开失败
    OpenFailed,
    /// 详情页提取完成
    ExtractionComplete,
    /// 回退成功并确认回到结果面板
    WentBack,
    /// 回退失败或回退后不在结果面板
    GoBackFailed,
    /// 恢复导航成功
    Recovered,
    /// 恢复导航失败
    RecoveryFailed,
    /// 浏览器会话已关闭
    SessionClosed,
}

/// 导航错误类型
#[derive(Error, Debug, Clone)]
pub enum NavigationError {
    /// 浏览器会话已关闭
    #[error("Browser session closed")]
    SessionClosed,
    /// 导航操作失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 恢复次数耗尽
    #[error("Recovery exhausted after consecutive failures")]
    RecoveryExhausted,
}

/// 状态转换函数
///
/// 纯函数，不产生副作用。会话关闭事件从任何状态直达 Aborted；
/// 未定义的组合保持当前状态不变，由调用方保证事件顺序合法。
pub fn transition(state: NavigationState, event: NavEvent) -> NavigationState {
    use NavEvent::*;
    use NavigationState::*;

    if state == Aborted {
        return Aborted;
    }
    if event == SessionClosed {
        return Aborted;
    }

    match (state, event) {
        (AtResults, ListingOpened) => AtDetail,
        (AtResults, OpenFailed) => Recovering,
        (AtDetail, ExtractionComplete) => Returning,
        (Returning, WentBack) => AtResults,
        (Returning, GoBackFailed) => Recovering,
        (Recovering, Recovered) => AtResults,
        (Recovering, RecoveryFailed) => Aborted,
        (current, _) => current,
    }
}
