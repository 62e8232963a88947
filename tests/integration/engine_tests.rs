// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use leadrs::domain::models::business::BusinessRecord;
use leadrs::domain::services::dedup::DuplicateFilter;
use leadrs::navigation::{NavigationController, NavigationError, RecordOutcome, RecordSink};
use leadrs::store::{MemoryRecordStore, RecordStore, StoreError};

use crate::helpers::mock_driver::{MockDriver, MockListing, MockScript, MockStats};
use crate::helpers::test_scraper_settings;

/// 带去重的收集接收器，镜像工作器的接受路径
struct CollectingSink {
    filter: DuplicateFilter,
    store: Arc<MemoryRecordStore>,
    accepted: Vec<BusinessRecord>,
    duplicates: u32,
}

impl CollectingSink {
    fn new(query: &str) -> Self {
        Self {
            filter: DuplicateFilter::new(query),
            store: Arc::new(MemoryRecordStore::new()),
            accepted: Vec::new(),
            duplicates: 0,
        }
    }
}

#[async_trait]
impl RecordSink for CollectingSink {
    async fn accept(&mut self, record: BusinessRecord) -> anyhow::Result<RecordOutcome> {
        if self.filter.is_duplicate(&record, self.store.as_ref()).await? {
            self.duplicates += 1;
            return Ok(RecordOutcome::Duplicate);
        }
        self.filter.remember(&record);
        match self.store.insert(record.clone()).await {
            Ok(()) | Err(StoreError::Conflict) => {}
            Err(e) => return Err(e.into()),
        }
        self.accepted.push(record);
        Ok(RecordOutcome::Accepted)
    }
}

fn run_setup(script: MockScript) -> (MockDriver, Arc<MockStats>) {
    let stats = Arc::new(MockStats::default());
    (MockDriver::new(script, stats.clone()), stats)
}

#[tokio::test]
async fn test_happy_path_collects_all_listings() {
    let script = MockScript::with_listings(vec![
        MockListing::named("Plomero Express")
            .phone("011 4123-4567")
            .website("https://www.plomeroexpress.com.ar/")
            .rating("4,5 estrellas 123 opiniones")
            .address("Av. Corrientes 1234, CABA"),
        MockListing::named("Destapaciones Sur")
            .tel("tel:+5491155554444")
            .messaging("https://wa.me/5491155554444"),
        MockListing::named("Gasista Matriculado Norte")
            .phone("011 4777-8899")
            .email("mailto:contacto@gasistanorte.com.ar")
            .social("https://www.instagram.com/gasista.norte/"),
    ]);
    let (driver, stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "plomero, caba", 10);
    let mut sink = CollectingSink::new("plomero, caba");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    assert!(report.aborted.is_none());
    assert_eq!(report.visited, 3);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.duplicates, 0);
    assert_eq!(stats.detail_visits.load(Ordering::SeqCst), 3);

    let first = &sink.accepted[0];
    assert_eq!(first.name, "Plomero Express");
    assert_eq!(first.phone.as_deref(), Some("01141234567"));
    assert_eq!(first.rating.as_deref(), Some("4.5"));
    assert_eq!(first.reviews, Some(123));
    assert_eq!(first.address.as_deref(), Some("Av. Corrientes 1234, CABA"));

    // Identical digits behind a tel link and a messaging link collapse in
    // favor of the messaging classification.
    let second = &sink.accepted[1];
    assert_eq!(second.phone, None);
    assert_eq!(second.messaging_phone.as_deref(), Some("5491155554444"));

    let third = &sink.accepted[2];
    assert_eq!(third.email.as_deref(), Some("contacto@gasistanorte.com.ar"));
    assert_eq!(
        third.social_profile.as_deref(),
        Some("https://instagram.com/gasista.norte")
    );
}

#[tokio::test]
async fn test_single_failure_recovers_and_continues() {
    let mut script = MockScript::with_listings(vec![
        MockListing::named("Cerrajería Centro").phone("011 4000-1111"),
        MockListing::named("Cerrajería Palermo").phone("011 4000-2222"),
        MockListing::named("Cerrajería Flores").phone("011 4000-3333"),
    ]);
    script.fail_open = HashSet::from([1]);
    let (driver, stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "cerrajero, caba", 10);
    let mut sink = CollectingSink::new("cerrajero, caba");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    // The unreachable listing is skipped after one recovery, the rest of
    // the batch is still processed.
    assert!(report.aborted.is_none());
    assert_eq!(report.accepted, 2);
    assert_eq!(stats.recoveries.load(Ordering::SeqCst), 1);
    assert_eq!(sink.accepted[0].name, "Cerrajería Centro");
    assert_eq!(sink.accepted[1].name, "Cerrajería Flores");
}

#[tokio::test]
async fn test_consecutive_failures_abort_run() {
    let mut script = MockScript::with_listings(vec![
        MockListing::named("Electricista Uno").phone("011 4111-0001"),
        MockListing::named("Electricista Dos").phone("011 4111-0002"),
        MockListing::named("Electricista Tres").phone("011 4111-0003"),
    ]);
    script.fail_open = HashSet::from([0, 1]);
    let (driver, stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "electricista", 10);
    let mut sink = CollectingSink::new("electricista");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    // Second failure right after a recovery gives up instead of retrying.
    assert!(matches!(
        report.aborted,
        Some(NavigationError::RecoveryExhausted)
    ));
    assert_eq!(report.accepted, 0);
    assert_eq!(stats.open_attempts.load(Ordering::SeqCst), 2);
    assert_eq!(stats.recoveries.load(Ordering::SeqCst), 1);
    assert_eq!(stats.detail_visits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_go_back_failure_recovers() {
    let mut script = MockScript::with_listings(vec![
        MockListing::named("Pintor Oeste").phone("011 4222-0001"),
        MockListing::named("Pintor Este").phone("011 4222-0002"),
    ]);
    script.fail_go_back_from = HashSet::from([0]);
    let (driver, stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "pintor", 10);
    let mut sink = CollectingSink::new("pintor");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    assert!(report.aborted.is_none());
    assert_eq!(report.accepted, 2);
    assert_eq!(stats.recoveries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_blank_heading_does_not_shadow_name() {
    // The highest-priority name selector matches an element with empty
    // text; the real name sits behind the next selector in the catalog.
    let script = MockScript::with_listings(vec![MockListing::named("Plomero Express")
        .phone("011 1234-5678")
        .name_at_rank(1)]);
    let (driver, _stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "plomero, caba", 10);
    let mut sink = CollectingSink::new("plomero, caba");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    assert!(report.aborted.is_none());
    assert_eq!(report.skipped, 0);
    assert_eq!(report.accepted, 1);
    assert_eq!(sink.accepted[0].name, "Plomero Express");
}

#[tokio::test]
async fn test_final_listing_skips_return_navigation() {
    let mut script = MockScript::with_listings(vec![
        MockListing::named("Fletes Centro").phone("011 4666-0001"),
        MockListing::named("Fletes Oeste").phone("011 4666-0002"),
    ]);
    // Going back from the last listing would fail and so would the
    // recovery, but neither should be attempted once the batch is done.
    script.fail_go_back_from = HashSet::from([1]);
    script.fail_recovery = true;
    let (driver, stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "fletes", 10);
    let mut sink = CollectingSink::new("fletes");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    assert!(report.aborted.is_none());
    assert_eq!(report.accepted, 2);
    assert_eq!(stats.recoveries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_duplicate_listings_are_filtered() {
    let script = MockScript::with_listings(vec![
        MockListing::named("Plomero Express").phone("011 1234-5678"),
        // Same business again under slightly different formatting.
        MockListing::named("  plomero express ").phone("01112345678"),
        MockListing::named("Plomería Integral").phone("011 9999-0000"),
    ]);
    let (driver, _stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "plomero, caba", 10);
    let mut sink = CollectingSink::new("plomero, caba");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    assert!(report.aborted.is_none());
    assert_eq!(report.visited, 3);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(sink.duplicates, 1);
}

#[tokio::test]
async fn test_unnamed_listing_is_skipped() {
    let script = MockScript::with_listings(vec![
        MockListing::unnamed().phone("011 4333-0001"),
        MockListing::named("Vidriería San Telmo").phone("011 4333-0002"),
    ]);
    let (driver, _stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "vidriería", 10);
    let mut sink = CollectingSink::new("vidriería");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    assert!(report.aborted.is_none());
    assert_eq!(report.skipped, 1);
    assert_eq!(report.accepted, 1);
    assert_eq!(sink.accepted[0].name, "Vidriería San Telmo");
}

#[tokio::test]
async fn test_session_close_keeps_partial_results() {
    let mut script = MockScript::with_listings(vec![
        MockListing::named("Mudanzas Rápidas").phone("011 4444-0001"),
        MockListing::named("Mudanzas del Sur").phone("011 4444-0002"),
        MockListing::named("Mudanzas Norte").phone("011 4444-0003"),
    ]);
    script.close_after_visits = Some(1);
    let (driver, _stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "mudanzas", 10);
    let mut sink = CollectingSink::new("mudanzas");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    // The first record survives the dead session.
    assert!(matches!(
        report.aborted,
        Some(NavigationError::SessionClosed)
    ));
    assert_eq!(report.accepted, 1);
    assert_eq!(sink.accepted[0].name, "Mudanzas Rápidas");
}

#[tokio::test]
async fn test_stops_at_max_results() {
    let script = MockScript::with_listings(vec![
        MockListing::named("Taller Uno").phone("011 4555-0001"),
        MockListing::named("Taller Dos").phone("011 4555-0002"),
        MockListing::named("Taller Tres").phone("011 4555-0003"),
    ]);
    let (driver, stats) = run_setup(script);

    let controller = NavigationController::new(test_scraper_settings(), "taller mecánico", 2);
    let mut sink = CollectingSink::new("taller mecánico");
    let report = controller.run(&driver, &mut sink).await.unwrap();

    assert!(report.aborted.is_none());
    assert_eq!(report.accepted, 2);
    assert_eq!(stats.detail_visits.load(Ordering::SeqCst), 2);
}
