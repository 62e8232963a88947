// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::settings::ScraperSettings;
use crate::domain::models::business::BusinessRecord;
use crate::driver::selectors;
use crate::driver::{DriverError, PageDriver};
use crate::extraction::pipeline::ExtractionPipeline;
use crate::navigation::state::{transition, NavEvent, NavigationError, NavigationState};

/// 记录接收结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 记录已接受并计入进度
    Accepted,
    /// 记录被去重过滤器拦截
    Duplicate,
}

/// 记录接收器特质
///
/// 导航控制器与任务工作器之间的接口，
/// 工作器在接收侧完成去重、存储与进度推进。
#[async_trait]
pub trait RecordSink: Send {
    async fn accept(&mut self, record: BusinessRecord) -> anyhow::Result<RecordOutcome>;
}

/// 一次运行的汇总报告
#[derive(Debug, Default)]
pub struct RunReport {
    /// 成功打开的详情页数
    pub visited: u32,
    /// 已接受的记录数
    pub accepted: u32,
    /// 被拦截的重复记录数
    pub duplicates: u32,
    /// 因缺少名称或提取失败而跳过的详情页数
    pub skipped: u32,
    /// 运行中途放弃时的原因
    pub aborted: Option<NavigationError>,
}

/// 导航控制器
///
/// 驱动结果面板与详情页之间的往返循环。每次转换失败最多尝试一次
/// 恢复导航；紧随恢复之后的再次失败直接放弃，剩余列表不再访问。
pub struct NavigationController {
    settings: ScraperSettings,
    pipeline: ExtractionPipeline,
    query: String,
    max_results: u32,
}

impl NavigationController {
    pub fn new(settings: ScraperSettings, query: impl Into<String>, max_results: u32) -> Self {
        Self {
            settings,
            pipeline: ExtractionPipeline::new(),
            query: query.into(),
            max_results,
        }
    }

    /// 执行完整的抓取循环
    ///
    /// 接收器返回的错误视为任务级故障直接上抛；
    /// 页面级故障走恢复路径并反映在报告中。
    pub async fn run(
        &self,
        driver: &dyn PageDriver,
        sink: &mut dyn RecordSink,
    ) -> anyhow::Result<RunReport> {
        let mut report = RunReport::default();

        if let Err(e) = driver.open_search(&self.query).await {
            warn!(error = %e, "failed to open search results");
            report.aborted = Some(Self::map_driver_error(e));
            return Ok(report);
        }

        // Over-collect so duplicates do not starve the target count.
        let candidate_cap = (self.max_results as usize).saturating_mul(2);
        let links = match driver.collect_listing_links(candidate_cap).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "failed to collect listing links");
                report.aborted = Some(Self::map_driver_error(e));
                return Ok(report);
            }
        };
        info!(collected = links.len(), "collected listing links");

        let mut state = NavigationState::AtResults;
        let mut recovered_recently = false;

        for (index, link) in links.iter().enumerate() {
            if report.accepted >= self.max_results || state == NavigationState::Aborted {
                break;
            }

            // A session that died between listings is caught before any
            // navigation is attempted.
            if driver.is_closed().await {
                state = transition(state, NavEvent::SessionClosed);
                report.aborted = Some(NavigationError::SessionClosed);
                break;
            }

            debug!(url = %link.url, "opening listing");
            match driver.navigate(&link.url).await {
                Ok(()) => {
                    state = transition(state, NavEvent::ListingOpened);
                }
                Err(DriverError::SessionClosed) => {
                    state = transition(state, NavEvent::SessionClosed);
                    report.aborted = Some(NavigationError::SessionClosed);
                    break;
                }
                Err(e) => {
                    warn!(url = %link.url, error = %e, "failed to open listing");
                    state = transition(state, NavEvent::OpenFailed);
                    match self.recover(driver, &mut recovered_recently).await {
                        Ok(()) => {
                            state = transition(state, NavEvent::Recovered);
                            continue;
                        }
                        Err(err) => {
                            state = transition(state, NavEvent::RecoveryFailed);
                            report.aborted = Some(err);
                            break;
                        }
                    }
                }
            }

            report.visited += 1;

            match self.pipeline.extract(driver, &self.query).await {
                Ok(Some(record)) => match sink.accept(record).await? {
                    RecordOutcome::Accepted => report.accepted += 1,
                    RecordOutcome::Duplicate => report.duplicates += 1,
                },
                Ok(None) => {
                    report.skipped += 1;
                }
                Err(DriverError::SessionClosed) => {
                    state = transition(state, NavEvent::SessionClosed);
                    report.aborted = Some(NavigationError::SessionClosed);
                    break;
                }
                Err(e) => {
                    warn!(url = %link.url, error = %e, "extraction failed, skipping listing");
                    report.skipped += 1;
                }
            }
            state = transition(state, NavEvent::ExtractionComplete);

            // No listing left to visit, the return transition is skipped so
            // a navigation failure here cannot taint a finished run.
            if report.accepted >= self.max_results || index + 1 == links.len() {
                break;
            }

            let back_ok = match driver.go_back().await {
                Ok(()) => matches!(
                    driver.find_first(selectors::RESULTS_VIEW).await,
                    Ok(Some(_))
                ),
                Err(DriverError::SessionClosed) => {
                    state = transition(state, NavEvent::SessionClosed);
                    report.aborted = Some(NavigationError::SessionClosed);
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "go back failed");
                    false
                }
            };

            if back_ok {
                state = transition(state, NavEvent::WentBack);
                recovered_recently = false;
            } else {
                state = transition(state, NavEvent::GoBackFailed);
                match self.recover(driver, &mut recovered_recently).await {
                    Ok(()) => {
                        state = transition(state, NavEvent::Recovered);
                    }
                    Err(err) => {
                        state = transition(state, NavEvent::RecoveryFailed);
                        report.aborted = Some(err);
                        break;
                    }
                }
            }
        }

        info!(
            visited = report.visited,
            accepted = report.accepted,
            duplicates = report.duplicates,
            skipped = report.skipped,
            aborted = report.aborted.is_some(),
            "navigation run finished"
        );
        Ok(report)
    }

    /// 执行一次恢复导航
    ///
    /// 上一次恢复尚未被成功往返清除时不再重试，直接判定耗尽
    async fn recover(
        &self,
        driver: &dyn PageDriver,
        recovered_recently: &mut bool,
    ) -> Result<(), NavigationError> {
        if *recovered_recently {
            return Err(NavigationError::RecoveryExhausted);
        }
        *recovered_recently = true;

        if driver.is_closed().await {
            return Err(NavigationError::SessionClosed);
        }

        let url = self.settings.search_url(&self.query);
        info!(%url, "attempting recovery navigation");
        match driver.navigate(&url).await {
            Ok(()) => match driver.find_first(selectors::RESULTS_VIEW).await {
                Ok(Some(_)) => Ok(()),
                Ok(None) => Err(NavigationError::Navigation(
                    "results view missing after recovery".to_string(),
                )),
                Err(DriverError::SessionClosed) => Err(NavigationError::SessionClosed),
                Err(e) => Err(NavigationError::Navigation(e.to_string())),
            },
            Err(DriverError::SessionClosed) => Err(NavigationError::SessionClosed),
            Err(e) => Err(NavigationError::Navigation(e.to_string())),
        }
    }

    fn map_driver_error(e: DriverError) -> NavigationError {
        match e {
            DriverError::SessionClosed => NavigationError::SessionClosed,
            other => NavigationError::Navigation(other.to_string()),
        }
    }
}
