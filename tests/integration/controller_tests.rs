//! SwitchController against the mock KVM: ordering, validation and
//! the "report what the LEDs say" rule.

use crate::mock_hw::{Journal, MockKvm, Reaction, Step, controller};

use kvmswitch::error::InvalidPort;
use kvmswitch::kvm::Port;

#[test]
fn valid_switch_pulses_one_line_then_reads_after_settle() {
    let journal = Journal::default();
    let mut c = controller(&journal, MockKvm::new(journal.clone(), Port::One));

    assert_eq!(c.switch_to(2), Ok(Port::Two));
    assert_eq!(
        journal.steps(),
        vec![
            Step::Press(Port::Two),
            Step::Delay(100),
            Step::Release(Port::Two),
            Step::Delay(50),
            Step::Read(Port::Two),
        ]
    );
}

#[test]
fn out_of_range_requests_never_actuate() {
    let journal = Journal::default();
    let mut c = controller(&journal, MockKvm::new(journal.clone(), Port::One));

    for n in [0, 5, -1, 100, i64::MAX, i64::MIN] {
        assert_eq!(c.switch_to(n), Err(InvalidPort), "request {n}");
    }
    for arg in ["", "x", "3x", "0x3", "1e0", "٣"] {
        assert_eq!(c.switch_to_arg(arg), Err(InvalidPort), "request {arg:?}");
    }
    assert!(journal.steps().is_empty());
}

#[test]
fn returns_sensor_value_even_when_kvm_diverts() {
    let journal = Journal::default();
    let kvm = MockKvm::new(journal.clone(), Port::One).with_reaction(Reaction::Divert(Port::Four));
    let mut c = controller(&journal, kvm);

    assert_eq!(c.switch_to(2), Ok(Port::Four));
    assert_eq!(journal.presses(), vec![Port::Two]);
}

#[test]
fn ignored_press_reports_unchanged_port() {
    let journal = Journal::default();
    let kvm = MockKvm::new(journal.clone(), Port::Three).with_reaction(Reaction::Ignore);
    let mut c = controller(&journal, kvm);

    assert_eq!(c.switch_to(1), Ok(Port::Three));
}

#[test]
fn switching_to_current_port_is_idempotent() {
    let journal = Journal::default();
    let mut c = controller(&journal, MockKvm::new(journal.clone(), Port::Two));

    let first = c.switch_to(2);
    let second = c.switch_to(2);
    assert_eq!(first, Ok(Port::Two));
    assert_eq!(first, second);
    assert_eq!(journal.presses(), vec![Port::Two, Port::Two]);
}

#[test]
fn end_to_end_lines_one_to_three() {
    let journal = Journal::default();
    let mut kvm = MockKvm::new(journal.clone(), Port::One);
    kvm.set_lines(false, false);
    let mut c = controller(&journal, kvm);

    assert_eq!(c.active_port(), Port::One);
    assert_eq!(c.switch_to(3), Ok(Port::Three));
    assert_eq!(c.hardware().lines(), (false, true));

    let steps = journal.steps();
    let press = steps.iter().position(|s| *s == Step::Press(Port::Three));
    let release = steps.iter().position(|s| *s == Step::Release(Port::Three));
    assert!(matches!((press, release), (Some(p), Some(r)) if r == p + 2));
    assert_eq!(steps[press.unwrap() + 1], Step::Delay(100));
    assert_eq!(steps.last(), Some(&Step::Read(Port::Three)));
}

#[test]
fn physical_press_is_seen_by_next_query() {
    let journal = Journal::default();
    let mut c = controller(&journal, MockKvm::new(journal.clone(), Port::One));

    // Port 4 is code 0b11.
    c.hardware_mut().set_lines(true, true);
    assert_eq!(c.active_port(), Port::Four);
    assert!(journal.presses().is_empty());
}
