//! Concurrent callers against one KvmService.
//!
//! Delays really sleep here, so without the service lock the journal
//! would show presses from different threads interleaving.

use std::sync::Arc;
use std::thread;

use crate::mock_hw::{Journal, MockDelay, MockKvm, RecordingSink, Step};

use kvmswitch::app::controller::SwitchController;
use kvmswitch::app::service::KvmService;
use kvmswitch::kvm::{Port, SwitchTiming};

fn shared_service(journal: &Journal) -> Arc<KvmService<MockKvm, MockDelay, RecordingSink>> {
    let controller = SwitchController::new(
        MockKvm::new(journal.clone(), Port::One),
        MockDelay::sleeping(journal.clone()),
        SwitchTiming::default(),
    );
    Arc::new(KvmService::new(controller, RecordingSink::default()))
}

/// Split the journal into per-switch blocks and check each is complete.
fn assert_sequential(steps: &[Step]) -> usize {
    let mut switches = 0;
    let mut i = 0;
    while i < steps.len() {
        match steps[i] {
            Step::Press(p) => {
                assert_eq!(
                    &steps[i..i + 5],
                    &[
                        Step::Press(p),
                        Step::Delay(100),
                        Step::Release(p),
                        Step::Delay(50),
                        Step::Read(p),
                    ],
                    "interleaved switch at step {i}: {steps:?}"
                );
                switches += 1;
                i += 5;
            }
            Step::Read(_) => i += 1,
            other => panic!("unexpected {other:?} outside a switch at step {i}"),
        }
    }
    switches
}

#[test]
fn concurrent_switches_never_interleave() {
    let journal = Journal::default();
    let svc = shared_service(&journal);

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || {
                for k in 0..3 {
                    let port = ((t + k) % 4 + 1) as i64;
                    assert_eq!(svc.switch_to(port).map(Port::number), Ok(port as u8));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(assert_sequential(&journal.steps()), 24);
    assert_eq!(svc.switch_count(), 24);
}

#[test]
fn queries_wait_for_running_switch() {
    let journal = Journal::default();
    let svc = shared_service(&journal);

    let switcher = {
        let svc = Arc::clone(&svc);
        thread::spawn(move || {
            for port in [2, 3, 4, 1] {
                svc.switch_to(port).unwrap();
            }
        })
    };
    let reader = {
        let svc = Arc::clone(&svc);
        thread::spawn(move || {
            for _ in 0..20 {
                svc.current_port();
            }
        })
    };
    switcher.join().unwrap();
    reader.join().unwrap();

    assert_eq!(assert_sequential(&journal.steps()), 4);
}

#[test]
fn invalid_requests_from_many_threads_never_actuate() {
    let journal = Journal::default();
    let svc = shared_service(&journal);

    let workers: Vec<_> = [0i64, 5, -3, 99]
        .into_iter()
        .map(|n| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || svc.switch_to(n).is_err())
        })
        .collect();
    for w in workers {
        assert!(w.join().unwrap());
    }
    assert_eq!(journal.actuations(), 0);
}
