// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Allocation accounting: every allocation site fails cleanly, nothing leaks,
//! and stepping never allocates.

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use moore_core::{identity_output, MooreError, MooreResult, Network, NetworkConfig};
use moore_dry_tests::{
    copy_input, counter, hold, measure, ring, sweep_faults, toggle, AllocStats, CountingAlloc,
};

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

const MAX_SITES: usize = 64;

/// Runs every operation once outside any measurement window so lazily
/// initialized runtime state is not attributed to the code under test.
fn warm_up() {
    let mut net = Network::new();
    let a = net.create_simple(1, 1, copy_input).expect("warm create");
    let b = net.create_simple(1, 1, copy_input).expect("warm create");
    net.connect(a, 0, b, 0, 1).expect("warm connect");
    net.disconnect(a, 0, 1).expect("warm disconnect");
    net.step(&[a, b]).expect("warm step");
    net.delete(b).expect("warm delete");
}

fn expect_clean_oom(k: usize, err: MooreError, stats: AllocStats) {
    assert_eq!(err, MooreError::OutOfMemory, "site {k}");
    assert_eq!(stats.failed, 1, "site {k}");
    assert_eq!(stats.live, 0, "site {k} leaked {} blocks", stats.live);
}

#[test]
fn create_full_on_fresh_network_fails_cleanly_at_every_site() {
    warm_up();
    let sweep = sweep_faults(
        MAX_SITES,
        || {
            let mut net = Network::new();
            let id = net.create_full(130, 70, 70, hold, identity_output, &[7, 9])?;
            Ok::<_, MooreError>((net, id))
        },
        expect_clean_oom,
    )
    .expect("create_full eventually succeeds");
    // input, state, output, scratch, sources, arena slots.
    assert_eq!(sweep.sites, 6);
    assert_eq!(sweep.stats.calls, 6);
    assert_eq!(sweep.stats.live, 6);
    let (net, id) = sweep.value;
    assert_eq!(net.get_state(id).expect("state"), &[7, 9]);
}

#[test]
fn create_with_spare_capacity_leaves_network_unchanged_on_failure() {
    warm_up();
    let mut net = Network::with_config(NetworkConfig::default().with_initial_capacity(8))
        .expect("network");
    let sweep = sweep_faults(
        MAX_SITES,
        || net.create_full(130, 70, 70, hold, identity_output, &[7, 9]),
        expect_clean_oom,
    )
    .expect("create_full eventually succeeds");
    assert_eq!(sweep.sites, 5);
    assert_eq!(net.len(), 1);
    assert!(net.contains(sweep.value));
}

#[test]
fn preallocated_registry_adds_two_sites() {
    warm_up();
    let cfg = NetworkConfig::default()
        .with_initial_capacity(8)
        .with_registry_capacity(4);
    let mut net = Network::with_config(cfg).expect("network");
    let sweep = sweep_faults(
        MAX_SITES,
        || net.create_full(130, 70, 70, hold, identity_output, &[7, 9]),
        expect_clean_oom,
    )
    .expect("create_full eventually succeeds");
    assert_eq!(sweep.sites, 7);
    assert_eq!(net.len(), 1);
}

#[test]
fn create_simple_without_inputs_fails_cleanly() {
    warm_up();
    let sweep = sweep_faults(
        MAX_SITES,
        || {
            let mut net = Network::new();
            let id = net.create_simple(0, 1, toggle)?;
            Ok::<_, MooreError>((net, id))
        },
        expect_clean_oom,
    )
    .expect("create_simple eventually succeeds");
    // state, output, scratch, arena slots. No input or source buffers.
    assert_eq!(sweep.sites, 4);
}

#[test]
fn with_config_fails_cleanly() {
    warm_up();
    let cfg = NetworkConfig::default().with_initial_capacity(8);
    let sweep = sweep_faults(MAX_SITES, || Network::with_config(cfg), expect_clean_oom)
        .expect("with_config eventually succeeds");
    assert_eq!(sweep.sites, 1);

    let (result, stats) = measure(None, || {
        Network::with_config(NetworkConfig::default().with_initial_capacity(usize::MAX))
            .map(|_| ())
    });
    assert_eq!(result, Err(MooreError::OutOfMemory));
    assert_eq!(stats.live, 0);
}

#[test]
fn connect_is_all_or_nothing_under_allocation_failure() {
    warm_up();
    let mut net = Network::new();
    let src = net.create_simple(0, 4, counter).expect("src");
    let dst = net.create_simple(4, 4, copy_input).expect("dst");

    // One set on each side of the new edge; failing the second rolls back
    // the first.
    for k in 0..2 {
        let (result, stats) = measure(Some(k), || net.connect(dst, 0, src, 0, 4));
        assert_eq!(result, Err(MooreError::OutOfMemory), "site {k}");
        assert_eq!(stats.live, 0, "site {k}");
        assert!(net.parents(dst).expect("parents").is_empty(), "site {k}");
        assert!(net.children(src).expect("children").is_empty(), "site {k}");
        assert_eq!(net.source_of(dst, 0).expect("source"), None, "site {k}");
    }

    let (result, stats) = measure(Some(2), || net.connect(dst, 0, src, 0, 4));
    result.expect("connect");
    assert_eq!(stats.calls, 2);
    assert_eq!(stats.live, 2);
    assert_eq!(net.parents(dst).expect("parents"), vec![src]);
    assert_eq!(net.children(src).expect("children"), vec![dst]);

    // Re-wiring an existing pair needs no new allocation.
    let (result, stats) = measure(None, || net.connect(dst, 1, src, 3, 1));
    result.expect("connect");
    assert_eq!(stats.calls, 0);
}

#[test]
fn failed_connect_keeps_the_previous_source() {
    warm_up();
    let mut net = Network::new();
    let old = net.create_simple(0, 2, counter).expect("old");
    let new = net.create_simple(0, 2, counter).expect("new");
    let dst = net.create_simple(2, 2, copy_input).expect("dst");
    net.connect(dst, 0, old, 0, 2).expect("connect old");

    let (result, stats) = measure(Some(0), || net.connect(dst, 0, new, 0, 2));
    assert_eq!(result, Err(MooreError::OutOfMemory));
    assert_eq!(stats.live, 0);
    assert!(net.feeds(old, dst).expect("feeds"));
    assert!(!net.feeds(new, dst).expect("feeds"));
    assert_eq!(net.parents(dst).expect("parents"), vec![old]);
    assert!(net.children(new).expect("children").is_empty());

    net.connect(dst, 0, new, 0, 2).expect("connect new");
    assert!(net.feeds(new, dst).expect("feeds"));
}

#[test]
fn step_never_allocates() {
    warm_up();
    let mut net = Network::new();
    let ids = ring(&mut net, 16, 130).expect("ring");
    let (result, stats) = measure(None, || net.step(&ids));
    result.expect("step");
    assert_eq!(stats, AllocStats::default());

    // An armed fault has nothing to hit.
    let (result, stats) = measure(Some(0), || net.step(&ids));
    result.expect("step");
    assert_eq!(stats.failed, 0);
}

#[test]
fn delete_releases_every_buffer_of_the_automaton() {
    warm_up();
    let mut net = Network::new();
    let b = net.create_simple(1, 1, copy_input).expect("b");
    let c = net.create_simple(1, 1, copy_input).expect("c");
    net.connect(c, 0, b, 0, 1).expect("c <- b");

    let (result, stats) = measure(None, || net.delete(b));
    result.expect("delete");
    // input, state, output, scratch, sources, child set.
    assert_eq!(stats.live, -6);
    assert_eq!(stats.calls, 0);
    assert!(net.parents(c).expect("parents").is_empty());
}

fn lifecycle() -> MooreResult<()> {
    let mut net = Network::new();
    let a = net.create_simple(0, 8, counter)?;
    let b = net.create_full(8, 8, 8, copy_input, identity_output, &[0])?;
    let c = net.create_simple(70, 70, copy_input)?;
    net.connect(b, 0, a, 0, 8)?;
    net.connect(c, 0, b, 0, 8)?;
    net.connect(c, 8, c, 0, 62)?;
    net.step(&[a, b, c])?;
    net.delete(b)?;
    net.step(&[a, c])?;
    net.delete(a)?;
    net.delete(c)?;
    Ok(())
}

#[test]
fn whole_lifecycle_leaks_nothing_under_any_single_fault() {
    warm_up();
    let sweep = sweep_faults(MAX_SITES, lifecycle, expect_clean_oom)
        .expect("lifecycle eventually succeeds");
    assert!(sweep.sites > 0);
    assert_eq!(sweep.stats.live, 0);
}
