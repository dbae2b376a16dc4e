// Every #[test] runs on its own thread, so each starts from a fresh ambient system.
use stanza_core::simulate::{ambient, SimulationState};
use stanza_core::{Arch, MacOSCodename, OsId, PlatformTag, SimulatedSystem, StanzaError};

const SONOMA: OsId = OsId::Codename(MacOSCodename::Sonoma);

#[test]
fn nested_scopes_restore_their_own_snapshot() {
    let outer = ambient::with(Some(OsId::Linux), None, || {
        let inner = ambient::with(Some(OsId::Macos), None, ambient::current_os).unwrap();
        assert_eq!(inner, OsId::Macos);
        ambient::current_os()
    })
    .unwrap();

    assert_eq!(outer, OsId::Linux);
    assert_eq!(ambient::current_os(), OsId::Generic);
    assert_eq!(ambient::state(), SimulationState::NoOverride);
}

#[test]
fn nested_scopes_on_an_explicit_system() {
    let mut system = SimulatedSystem::new();
    let seen = system
        .with(Some(OsId::Linux), None, |outer| {
            let inner = outer
                .with(Some(OsId::Macos), Some(Arch::Arm), |inner| inner.current_tag())
                .unwrap();
            (inner, outer.current_os(), outer.arch())
        })
        .unwrap();

    assert_eq!(seen.0, PlatformTag::new(OsId::Macos, Arch::Arm));
    assert_eq!(seen.1, OsId::Linux);
    assert_eq!(seen.2, None);
    assert_eq!(system.current_os(), OsId::Generic);
}

#[test]
fn current_tag_without_overrides_is_the_baseline() {
    assert_eq!(
        ambient::current_tag(),
        PlatformTag::new(OsId::Generic, Arch::host())
    );
}

#[test]
fn empty_scope_request_changes_nothing() {
    ambient::set_arch(Arch::Arm).unwrap();
    let err = ambient::with(None, None, || unreachable!()).map(|()| ()).unwrap_err();
    assert!(matches!(err, StanzaError::InvalidScopeRequest));
    assert_eq!(ambient::arch(), Some(Arch::Arm));
    assert_eq!(ambient::os(), None);
}

#[test]
fn scope_restores_after_body_error() {
    let result: Result<Result<(), StanzaError>, StanzaError> =
        ambient::with(Some(SONOMA), None, || {
            assert!(ambient::is_simulating_or_running_on_macos());
            ambient::set_arch(Arch::Dunno)
        });

    assert!(matches!(result, Ok(Err(StanzaError::InvalidArchValue(_)))));
    assert_eq!(ambient::state(), SimulationState::NoOverride);
}

#[test]
fn scope_restores_after_panic() {
    ambient::set_os(OsId::Linux).unwrap();
    let outcome = std::panic::catch_unwind(|| {
        ambient::with(Some(SONOMA), Some(Arch::Intel), || panic!("boom")).map(|()| ())
    });
    assert!(outcome.is_err());
    assert_eq!(ambient::os(), Some(OsId::Linux));
    assert_eq!(ambient::arch(), None);
}

#[test]
fn scope_restores_explicit_assignments_made_inside() {
    ambient::with(None, Some(Arch::Intel), || {
        ambient::set_os(OsId::Linux).unwrap();
        assert!(ambient::is_simulating_or_running_on_linux());
    })
    .unwrap();
    assert_eq!(ambient::os(), None);
}

#[test]
fn with_tag_applies_both_halves() {
    let tag: PlatformTag = "arm64_sonoma".parse().unwrap();
    let (os, arch) =
        ambient::with_tag(&tag, || (ambient::current_os(), ambient::current_arch())).unwrap();
    assert_eq!(os, SONOMA);
    assert_eq!(arch, Arch::Arm);
}

#[test]
fn with_tag_rejects_impossible_combinations() {
    let tag = PlatformTag::new(OsId::Codename(MacOSCodename::Catalina), Arch::Arm);
    let err = ambient::with_tag(&tag, || ()).unwrap_err();
    assert!(matches!(err, StanzaError::InvalidTag(t) if t == "arm64_catalina"));
    assert_eq!(ambient::state(), SimulationState::NoOverride);
}

#[test]
fn clear_removes_both_overrides() {
    ambient::set_os(SONOMA).unwrap();
    ambient::set_arch(Arch::Intel).unwrap();
    assert_eq!(ambient::state(), SimulationState::BothOverridden);
    assert_eq!(ambient::current_tag().to_string(), "sonoma");

    ambient::clear();
    assert_eq!(ambient::state(), SimulationState::NoOverride);
    assert!(!ambient::is_simulating_or_running_on_macos());
}

#[test]
fn ambient_system_can_be_replaced() {
    let previous = ambient::replace(SimulatedSystem::for_host().with_host_arch(Arch::Intel));
    assert_eq!(previous, SimulatedSystem::new());
    assert_eq!(ambient::current_os(), OsId::host());
    assert_eq!(ambient::current_arch(), Arch::Intel);
}

#[test]
fn threads_do_not_share_overrides() {
    ambient::set_os(OsId::Linux).unwrap();
    let other = std::thread::spawn(ambient::os).join().unwrap();
    assert_eq!(other, None);
    assert_eq!(ambient::os(), Some(OsId::Linux));
}
