#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use journalpost_core::types::Level;
use journalpost_forwarder::LevelResolver;

/// 퍼저용 구조적 입력: 엔트리 시퀀스 (최대 32개)
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    entries: Vec<FuzzEntry>,
}

#[derive(Arbitrary, Debug)]
struct FuzzEntry {
    origin: FuzzOrigin,
    message: String,
    priority: Option<u8>,
}

#[derive(Arbitrary, Debug)]
enum FuzzOrigin {
    Host,
    Core,
    Supervisor,
    Addon,
}

impl FuzzOrigin {
    fn container(&self) -> Option<&'static str> {
        match self {
            Self::Host => None,
            Self::Core => Some("homeassistant"),
            Self::Supervisor => Some("hassio_supervisor"),
            Self::Addon => Some("addon_core_mosquitto"),
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let Ok(mut resolver) = LevelResolver::new() else {
        return;
    };

    for entry in input.entries.iter().take(32) {
        let container = entry.origin.container();
        let level = resolver.resolve(&entry.message, container, entry.priority);

        match entry.origin {
            FuzzOrigin::Host => {
                assert_eq!(level, LevelResolver::host_level(entry.priority));
            }
            FuzzOrigin::Addon => assert_eq!(level, Level::Info),
            FuzzOrigin::Core | FuzzOrigin::Supervisor => {}
        }
    }

    // 비구조화 컨테이너와 호스트는 상태를 남기지 않음
    assert!(resolver.state().last_level("addon_core_mosquitto").is_none());
});
