use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use slirc_meetbot::command::{is_startmeeting, CommandDispatcher};
use slirc_meetbot::error::WriteError;
use slirc_meetbot::location::{Location, Locations};
use slirc_meetbot::writer::MeetingWriter;
use slirc_meetbot::{Config, Context, Meeting, Message, TrackedMessage};
use std::path::PathBuf;
use std::sync::Arc;

// Measures the per-line cost of the hot path: recognizing and dispatching
// one channel message against an active meeting. The writer is never hit.

struct NullContext;

impl Context for NullContext {
    fn send_reply(&mut self, _text: &str) {}
    fn send_message(&mut self, _text: &str) {}
    fn set_topic(&mut self, _text: &str) {}
}

struct NullWriter;

impl MeetingWriter for NullWriter {
    fn write_meeting(&self, _meeting: &Meeting) -> Result<Locations, WriteError> {
        let location = |name: &str| Location {
            path: PathBuf::from(name),
            url: format!("/{name}"),
        };
        Ok(Locations {
            raw_log: location("bench.log.json"),
            formatted_log: location("bench.log.html"),
            formatted_minutes: location("bench.html"),
        })
    }
}

fn tracked(payload: &str) -> TrackedMessage {
    let mut scratch = Meeting::new("alice", "#dev", "libera");
    scratch.track_message(&Message::new("alice", "#dev", "libera", payload))
}

fn dispatch_benchmark(c: &mut Criterion) {
    let dispatcher = CommandDispatcher::new(Arc::new(Config::default()), Arc::new(NullWriter));
    let mut meeting = Meeting::new("alice", "#dev", "libera");
    meeting.active = true;
    let mut ctx = NullContext;

    let info = tracked("#info builds are green");
    let unknown = tracked("#bogus nothing here");
    let chat = tracked("nothing to see here at all");

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("info_item", |b| {
        b.iter(|| {
            dispatcher.dispatch(&mut meeting, &mut ctx, &info);
            meeting.pop_event()
        })
    });

    group.bench_function("unknown_command", |b| {
        b.iter(|| dispatcher.dispatch(&mut meeting, &mut ctx, &unknown))
    });

    group.bench_function("plain_chat", |b| {
        b.iter(|| dispatcher.dispatch(&mut meeting, &mut ctx, &chat))
    });

    group.finish();
}

fn recognition_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("recognition");
    group.throughput(Throughput::Elements(1));

    group.bench_function("startmeeting_hit", |b| {
        b.iter(|| is_startmeeting("  #startmeeting weekly kickoff"))
    });

    group.bench_function("startmeeting_miss", |b| {
        b.iter(|| is_startmeeting("just talking about #startmeetings in general"))
    });

    group.finish();
}

criterion_group!(benches, dispatch_benchmark, recognition_benchmark);
criterion_main!(benches);
