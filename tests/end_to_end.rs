//! Host messages in, state reports out.

mod common;

use common::{
    frame_level, new_signals, BufferTransport, MockBank, MockScheduler, RecordingProbe, TimerOp,
};
use heapless::Vec as HVec;
use loadcell_sampler::encoding::encode_int;
use loadcell_sampler::error::{DecodeError, Error};
use loadcell_sampler::protocol::MESSAGE_MAX;
use loadcell_sampler::{
    hx711_task, Command, Hx711Table, MessageIds, SampleSignal, StateReport, TimerAction, Timing,
};

const DATA_PIN: u32 = 4;
const CLOCK_PIN: u32 = 5;

fn message(fields: &[i64]) -> HVec<u8, MESSAGE_MAX> {
    let mut out = HVec::new();
    for &field in fields {
        encode_int(&mut out, field as u32).unwrap();
    }
    out
}

#[test]
fn one_frame_one_report() {
    let ids = MessageIds::default();
    let signals: [SampleSignal; 4] = new_signals();
    let mut bank = MockBank::default();
    let data = bank.line(DATA_PIN);
    let mut table = Hx711Table::new(bank, &signals, Timing::default());
    let mut sched = MockScheduler::default();
    let mut probe = RecordingProbe::default();
    let mut transport = BufferTransport::default();

    let config = message(&[ids.config_hx711.into(), 3, DATA_PIN.into(), CLOCK_PIN.into(), 1, 1]);
    table
        .dispatch(Command::decode(&ids, &config).unwrap(), 0, &mut sched)
        .unwrap();
    let query = message(&[ids.query_hx711.into(), 3, 1, -1]);
    table
        .dispatch(Command::decode(&ids, &query).unwrap(), 0, &mut sched)
        .unwrap();
    assert_eq!(sched.ops, vec![TimerOp::Cancel(3), TimerOp::Schedule(3, 200)]);

    // chip still converting for a while
    data.set(true);
    let mut now = 200;
    for _ in 0..3 {
        assert_eq!(table.on_timer(3, now), TimerAction::Reschedule(now + 200));
        now += 200;
        assert_eq!(hx711_task(&signals, &ids, &mut probe, &mut transport), 0);
    }

    let mut last = TimerAction::Done;
    for index in 0..50 {
        data.set(frame_level(0x80_0000, index));
        last = table.on_timer(3, now);
        if index < 49 {
            assert_eq!(last, TimerAction::Reschedule(now + 40));
            now += 40;
        }
    }
    assert_eq!(last, TimerAction::Reschedule(now + 12_500));

    assert_eq!(hx711_task(&signals, &ids, &mut probe, &mut transport), 1);
    assert_eq!(hx711_task(&signals, &ids, &mut probe, &mut transport), 0);
    assert!(probe.samples.is_empty());
    assert_eq!(transport.messages.len(), 1);

    let report = StateReport::decode(&ids, &transport.messages[0]).unwrap();
    assert_eq!(
        report,
        StateReport {
            oid: 3,
            clock: now + 12_500,
            value: -8_388_608,
        }
    );
    assert_eq!(table.device(3).unwrap().latest(), -8_388_608);
}

#[test]
fn linked_probe_sees_every_sample() {
    let ids = MessageIds::default();
    let signals: [SampleSignal; 2] = new_signals();
    let mut bank = MockBank::default();
    let data = bank.line(DATA_PIN);
    let mut table = Hx711Table::new(bank, &signals, Timing::default());
    let mut sched = MockScheduler::default();
    let mut probe = RecordingProbe::default();
    let mut transport = BufferTransport::default();

    let config = message(&[ids.config_hx711.into(), 0, DATA_PIN.into(), CLOCK_PIN.into(), 2, -1]);
    table
        .dispatch(Command::decode(&ids, &config).unwrap(), 0, &mut sched)
        .unwrap();
    let query = message(&[ids.query_hx711.into(), 0, 1, 6]);
    table
        .dispatch(Command::decode(&ids, &query).unwrap(), 0, &mut sched)
        .unwrap();

    let mut now = 200;
    let mut stamps = Vec::new();
    for (frame, pattern) in [0x00_0100u32, 0x00_0200].into_iter().enumerate() {
        for index in 0..52 {
            data.set(frame_level(pattern, index));
            match table.on_timer(0, now) {
                TimerAction::Reschedule(next) => {
                    if index == 51 {
                        stamps.push(next);
                    }
                    now = next;
                }
                TimerAction::Done => panic!("stopped in frame {}", frame),
            }
        }
        assert_eq!(hx711_task(&signals, &ids, &mut probe, &mut transport), 1);
    }

    assert_eq!(
        probe.samples,
        vec![(6, -0x100, stamps[0]), (6, -0x200, stamps[1])]
    );
    let values: Vec<i32> = transport
        .messages
        .iter()
        .map(|m| StateReport::decode(&ids, m).unwrap().value)
        .collect();
    assert_eq!(values, vec![-0x100, -0x200]);
}

#[test]
fn disable_reports_in_flight_frame_then_stops() {
    let ids = MessageIds::default();
    let signals: [SampleSignal; 1] = new_signals();
    let mut bank = MockBank::default();
    let data = bank.line(DATA_PIN);
    let mut table = Hx711Table::new(bank, &signals, Timing::default());
    let mut sched = MockScheduler::default();
    let mut transport = BufferTransport::default();

    let config = message(&[ids.config_hx711.into(), 1, DATA_PIN.into(), CLOCK_PIN.into(), 1, 1]);
    table
        .handle_message(&ids, &config, 0, &mut sched)
        .unwrap();
    let enable = message(&[ids.query_hx711.into(), 1, 1, -1]);
    table
        .handle_message(&ids, &enable, 0, &mut sched)
        .unwrap();

    let mut now = 200;
    for index in 0..20 {
        data.set(frame_level(0x00_0007, index));
        table.on_timer(1, now);
        now += 40;
    }
    let disable = message(&[ids.query_hx711.into(), 1, 0, -1]);
    table
        .handle_message(&ids, &disable, now, &mut sched)
        .unwrap();

    let mut actions = Vec::new();
    for index in 20..50 {
        data.set(frame_level(0x00_0007, index));
        actions.push(table.on_timer(1, now));
        now += 40;
    }
    assert_eq!(actions.last(), Some(&TimerAction::Done));
    assert_eq!(
        actions.iter().filter(|a| **a == TimerAction::Done).count(),
        1
    );
    assert_eq!(hx711_task(&signals, &ids, &mut (), &mut transport), 1);
    assert_eq!(hx711_task(&signals, &ids, &mut (), &mut transport), 0);
    assert_eq!(
        StateReport::decode(&ids, &transport.messages[0]).unwrap().value,
        7
    );
    assert!(!table.device(1).unwrap().is_running());
}

#[test]
fn malformed_messages_are_rejected() {
    let ids = MessageIds::default();
    let signals: [SampleSignal; 1] = new_signals();
    let mut table = Hx711Table::new(MockBank::default(), &signals, Timing::default());
    let mut sched = MockScheduler::default();

    assert_eq!(
        table.handle_message(&ids, &message(&[ids.config_hx711.into(), 1, 4]), 0, &mut sched),
        Err(Error::Decode(DecodeError::Truncated))
    );
    assert_eq!(
        table.handle_message(&ids, &message(&[99, 1]), 0, &mut sched),
        Err(Error::Decode(DecodeError::UnknownMessage(99)))
    );
    assert_eq!(
        table.handle_message(&ids, &message(&[ids.query_hx711.into(), 1, 1, -1]), 0, &mut sched),
        Err(Error::UnknownOid(1))
    );
    assert!(table.is_empty());
    assert!(sched.ops.is_empty());
}
