//! 엔트리 처리 단계 벤치마크
//!
//! 정제, 레벨 판별, 포맷, 프레임 인코딩, journalctl JSON 디코딩의 처리량을 측정합니다.
//! 네트워크 I/O는 포함하지 않습니다.

use std::time::SystemTime;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use journalpost_core::types::{Level, Protocol, SyslogFormat};
use journalpost_forwarder::{
    Destination, LevelResolver, MessageMeta, MessageSanitizer, ResilientTransport,
    SyslogFormatter, TransportConfig, parse_journal_line,
};

/// 색상 코드가 포함된 Home Assistant 코어 로그
const HA_COLORED: &str = "\x1b[31m2024-01-15 12:00:00.123 ERROR (MainThread) [homeassistant.components.sensor] Error adding entity sensor.living_room_temperature for domain sensor with platform mqtt\x1b[0m";

/// traceback 연속 라인
const HA_CONTINUATION: &str = "  File \"/usr/src/homeassistant/homeassistant/helpers/entity_platform.py\", line 593, in _async_add_entity";

/// 여러 줄 호스트 메시지
const HOST_MULTILINE: &str = "kernel: BUG: unable to handle page fault\nCall Trace:\n <TASK>\n do_syscall_64+0x5c/0x90\r\n";

/// journalctl JSON 한 줄
const JOURNAL_LINE: &str = r#"{"__REALTIME_TIMESTAMP":"1705320000123456","PRIORITY":"6","_PID":"812","SYSLOG_IDENTIFIER":"NetworkManager","MESSAGE":"<info>  [1705320000.1234] device (wlan0): state change: activated -> deactivating"}"#;

fn bench_sanitize(c: &mut Criterion) {
    let legacy = MessageSanitizer::new(false).unwrap();
    let single_line = MessageSanitizer::new(true).unwrap();

    let mut group = c.benchmark_group("sanitize");
    group.throughput(Throughput::Elements(1));

    group.bench_function("container_colored", |b| {
        b.iter(|| legacy.sanitize(black_box(HA_COLORED), true).len())
    });

    group.bench_function("host_multiline_single_line", |b| {
        b.iter(|| single_line.sanitize(black_box(HOST_MULTILINE), false).len())
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut resolver = LevelResolver::new().unwrap();
    let sanitizer = MessageSanitizer::new(false).unwrap();
    let clean = sanitizer.sanitize(HA_COLORED, true).into_owned();

    let mut group = c.benchmark_group("resolve");
    group.throughput(Throughput::Elements(1));

    group.bench_function("structured_prefix", |b| {
        b.iter(|| resolver.resolve(black_box(&clean), Some("homeassistant"), None))
    });

    group.bench_function("structured_carry_over", |b| {
        b.iter(|| resolver.resolve(black_box(HA_CONTINUATION), Some("homeassistant"), None))
    });

    group.bench_function("host_priority", |b| {
        b.iter(|| resolver.resolve(black_box("any"), None, Some(black_box(4))))
    });

    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let now = SystemTime::now();
    let meta = MessageMeta::new(now).program(Some("homeassistant")).pid(Some(812));

    let mut group = c.benchmark_group("format");
    group.throughput(Throughput::Elements(1000));

    for format in [SyslogFormat::Rfc3164, SyslogFormat::Rfc5424] {
        let formatter = SyslogFormatter::new(format, "homeassistant");
        group.bench_with_input(
            BenchmarkId::new("format", format.to_string()),
            &formatter,
            |b, formatter| {
                b.iter(|| {
                    for _ in 0..1000 {
                        black_box(formatter.format(Level::Error, black_box(HA_CONTINUATION), &meta));
                    }
                })
            },
        );
    }

    group.finish();
}

fn bench_encode_frame(c: &mut Criterion) {
    let transport = ResilientTransport::new(TransportConfig::new(
        Destination::Inet {
            host: "127.0.0.1".to_owned(),
            port: 514,
        },
        Protocol::Udp,
    ))
    .unwrap();
    let formatter = SyslogFormatter::new(SyslogFormat::Rfc5424, "homeassistant");
    let message = formatter.format(Level::Warning, HA_CONTINUATION, &MessageMeta::new(SystemTime::now()));

    c.bench_function("encode_frame", |b| {
        b.iter(|| transport.encode_frame(black_box(&message)))
    });
}

fn bench_journal_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("journal_json");
    group.throughput(Throughput::Elements(1));
    group.bench_function("parse_line", |b| {
        b.iter(|| parse_journal_line(black_box(JOURNAL_LINE)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_sanitize,
    bench_resolve,
    bench_format,
    bench_encode_frame,
    bench_journal_json
);
criterion_main!(benches);
