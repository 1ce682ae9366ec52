//! Ctrl-C handling around in-flight queries.
#![cfg(feature = "cli")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use agent_relay::agent::AgentSessionManager;
use agent_relay::cli::Interrupt;
use agent_relay::types::Role;
use common::{test_config, MockRuntime};
use pretty_assertions::assert_eq;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};

#[tokio::test(start_paused = true)]
async fn interrupted_query_still_releases_the_agent() {
    let runtime = Arc::new(MockRuntime::new());
    runtime.delay_responses(Duration::from_secs(120));
    let mut manager = AgentSessionManager::new(test_config(), runtime.clone());
    manager.initialize().await.unwrap();

    let (tx, rx) = watch::channel(false);
    let mut interrupt = Interrupt::from_receiver(rx);
    let started = Instant::now();

    let (result, ()) = tokio::join!(interrupt.guard(manager.ask("slow question")), async {
        sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
    });

    assert!(result.is_none());
    assert!(started.elapsed() < Duration::from_secs(60));
    assert!(manager.is_ready());
    let roles: Vec<Role> = manager.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User]);

    manager.shutdown().await;
    assert_eq!(runtime.create_count(), 1);
    assert_eq!(runtime.delete_count(), 1);
}

#[tokio::test]
async fn interrupt_before_a_query_skips_it_without_any_call() {
    let runtime = Arc::new(MockRuntime::new());
    let mut manager = AgentSessionManager::new(test_config(), runtime.clone());
    manager.initialize().await.unwrap();

    let (tx, rx) = watch::channel(false);
    let mut interrupt = Interrupt::from_receiver(rx);
    tx.send(true).unwrap();

    assert!(interrupt.guard(manager.ask("never sent")).await.is_none());
    assert!(runtime.requests().is_empty());

    manager.shutdown().await;
    assert_eq!(runtime.delete_count(), 1);
}
